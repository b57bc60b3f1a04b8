//! `/residence/` collection and detail routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy;
use crate::models::{Residence, ResidenceInput};
use crate::serializers::{represent_all, Represent, ResidenceRepr};
use crate::urls::Links;
use crate::AppState;

use super::RESIDENCE;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/residence/", get(list).post(create))
        .route(&format!("{RESIDENCE}/"), get(retrieve).put(update).delete(destroy))
}

async fn list(
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<ResidenceRepr>>> {
    // ---
    info!("GET /residence/");

    let residences = sqlx::query_as::<_, Residence>(&format!("{} ORDER BY rfid", Residence::SELECT))
        .fetch_all(&pool)
        .await?;

    Ok(Json(represent_all(&residences, &links)))
}

async fn create(
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<ResidenceInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ResidenceRepr>)> {
    // ---
    let Json(input) = payload?;
    let residence = input.validate()?;
    info!("POST /residence/ - rfid={}", residence.rfid);

    sqlx::query("INSERT INTO residence (rfid) VALUES ($1)")
        .bind(&residence.rfid)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(residence.represent(&links))))
}

async fn retrieve(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<ResidenceRepr>> {
    // ---
    info!("GET /residence/{}/", rfid);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    Ok(Json(residence.represent(&links)))
}

async fn update(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<ResidenceInput>, JsonRejection>,
) -> ApiResult<Json<ResidenceRepr>> {
    // ---
    info!("PUT /residence/{}/", rfid);

    let current = hierarchy::residence(&pool, &rfid).await?;
    let Json(input) = payload?;
    let residence = input.validate()?;

    // Children follow through ON UPDATE CASCADE
    let result = sqlx::query("UPDATE residence SET rfid = $1 WHERE rfid = $2")
        .bind(&residence.rfid)
        .bind(&current.rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Residence"));
    }

    Ok(Json(residence.represent(&links)))
}

async fn destroy(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!("DELETE /residence/{}/", rfid);

    let result = sqlx::query("DELETE FROM residence WHERE rfid = $1")
        .bind(&rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Residence"));
    }
    Ok(StatusCode::NO_CONTENT)
}
