//! `/residence/{rfid}/room/{id}/thermostat/` routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy;
use crate::models::{Thermostat, ThermostatInput};
use crate::serializers::{represent_all, Represent, ThermostatRepr};
use crate::urls::Links;
use crate::AppState;

use super::{ROOM, THERMOSTAT};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{ROOM}/thermostat/"), get(list).post(create))
        .route(
            &format!("{THERMOSTAT}/"),
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    Path((rfid, room_id)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<ThermostatRepr>>> {
    // ---
    info!("GET /residence/{}/room/{}/thermostat/", rfid, room_id);

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    let thermostats = sqlx::query_as::<_, Thermostat>(&format!(
        "{} WHERE th.room_id = $1 ORDER BY th.rfid",
        Thermostat::SELECT
    ))
    .bind(room.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(represent_all(&thermostats, &links)))
}

async fn create(
    Path((rfid, room_id)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<ThermostatInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ThermostatRepr>)> {
    // ---
    info!("POST /residence/{}/room/{}/thermostat/", rfid, room_id);

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    let Json(input) = payload?;
    let thermostat = input.validate(&room)?;

    sqlx::query("INSERT INTO thermostat (rfid, name, room_id) VALUES ($1, $2, $3)")
        .bind(&thermostat.rfid)
        .bind(&thermostat.name)
        .bind(thermostat.room_id)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(thermostat.represent(&links))))
}

async fn retrieve(
    Path((rfid, room_id, thermostat_rfid)): Path<(String, String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<ThermostatRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    Ok(Json(thermostat.represent(&links)))
}

async fn update(
    Path((rfid, room_id, thermostat_rfid)): Path<(String, String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<ThermostatInput>, JsonRejection>,
) -> ApiResult<Json<ThermostatRepr>> {
    // ---
    info!(
        "PUT /residence/{}/room/{}/thermostat/{}/",
        rfid, room_id, thermostat_rfid
    );

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    let current = hierarchy::thermostat_in(&pool, &room, &thermostat_rfid).await?;
    let Json(input) = payload?;
    let thermostat = input.validate(&room)?;

    // Readings, meta entries and schedule follow through ON UPDATE CASCADE
    let result =
        sqlx::query("UPDATE thermostat SET rfid = $1, name = $2 WHERE rfid = $3 AND room_id = $4")
            .bind(&thermostat.rfid)
            .bind(&thermostat.name)
            .bind(&current.rfid)
            .bind(current.room_id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Thermostat"));
    }
    Ok(Json(thermostat.represent(&links)))
}

async fn destroy(
    Path((rfid, room_id, thermostat_rfid)): Path<(String, String, String)>,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!(
        "DELETE /residence/{}/room/{}/thermostat/{}/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let result = sqlx::query("DELETE FROM thermostat WHERE rfid = $1 AND room_id = $2")
        .bind(&thermostat.rfid)
        .bind(thermostat.room_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Thermostat"));
    }
    Ok(StatusCode::NO_CONTENT)
}
