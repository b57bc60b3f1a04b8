//! `.../thermostat/{rfid}/heating_table/` routes.
//!
//! The heating table maps each (day, time) slot of a week to a target
//! temperature. Day 0 is Monday and day 6 is Sunday. Entries are listed in
//! schedule order.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy::{self, parse_id};
use crate::models::{HeatingTableEntry, HeatingTableInput, Thermostat};
use crate::serializers::{represent_all, HeatingTableEntryRepr, Represent};
use crate::urls::Links;
use crate::AppState;

use super::THERMOSTAT;

type ThermostatPath = Path<(String, String, String)>;
type EntryPath = Path<(String, String, String, String)>;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{THERMOSTAT}/heating_table/"), get(list).post(create))
        .route(
            &format!("{THERMOSTAT}/heating_table/{{id}}/"),
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<HeatingTableEntryRepr>>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/heating_table/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entries = sqlx::query_as::<_, HeatingTableEntry>(&format!(
        "{} WHERE h.thermostat_rfid = $1 ORDER BY h.day, h.time",
        HeatingTableEntry::SELECT
    ))
    .bind(&thermostat.rfid)
    .fetch_all(&pool)
    .await?;

    Ok(Json(represent_all(&entries, &links)))
}

async fn create(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, config)): State<AppState>,
    links: Links,
    payload: Result<Json<HeatingTableInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<HeatingTableEntryRepr>)> {
    // ---
    info!(
        "POST /residence/{}/room/{}/thermostat/{}/heating_table/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let Json(input) = payload?;
    let fields = input.validate(&config.heating_bounds)?;

    // A second entry for the same (day, time) slot violates the unique constraint
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO heating_table_entry (day, time, temperature, thermostat_rfid) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(fields.day.index())
    .bind(fields.time)
    .bind(fields.temperature)
    .bind(&thermostat.rfid)
    .fetch_one(&pool)
    .await?;

    let entry = fields.into_entry(id, &thermostat);
    Ok((StatusCode::CREATED, Json(entry.represent(&links))))
}

async fn fetch(pool: &PgPool, thermostat: &Thermostat, key: &str) -> ApiResult<HeatingTableEntry> {
    // ---
    let id = parse_id(key, "HeatingTableEntry")?;

    sqlx::query_as::<_, HeatingTableEntry>(&format!(
        "{} WHERE h.thermostat_rfid = $1 AND h.id = $2",
        HeatingTableEntry::SELECT
    ))
    .bind(&thermostat.rfid)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("HeatingTableEntry"))
}

async fn retrieve(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<HeatingTableEntryRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/heating_table/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entry = fetch(&pool, &thermostat, &key).await?;
    Ok(Json(entry.represent(&links)))
}

async fn update(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, config)): State<AppState>,
    links: Links,
    payload: Result<Json<HeatingTableInput>, JsonRejection>,
) -> ApiResult<Json<HeatingTableEntryRepr>> {
    // ---
    info!(
        "PUT /residence/{}/room/{}/thermostat/{}/heating_table/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let current = fetch(&pool, &thermostat, &key).await?;
    let Json(input) = payload?;
    let fields = input.validate(&config.heating_bounds)?;

    let result = sqlx::query(
        "UPDATE heating_table_entry SET day = $1, time = $2, temperature = $3 \
         WHERE id = $4 AND thermostat_rfid = $5",
    )
    .bind(fields.day.index())
    .bind(fields.time)
    .bind(fields.temperature)
    .bind(current.id)
    .bind(&current.thermostat_rfid)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("HeatingTableEntry"));
    }
    Ok(Json(fields.into_entry(current.id, &thermostat).represent(&links)))
}

async fn destroy(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!(
        "DELETE /residence/{}/room/{}/thermostat/{}/heating_table/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entry = fetch(&pool, &thermostat, &key).await?;

    sqlx::query("DELETE FROM heating_table_entry WHERE id = $1 AND thermostat_rfid = $2")
        .bind(entry.id)
        .bind(&entry.thermostat_rfid)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
