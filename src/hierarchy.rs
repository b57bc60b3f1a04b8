//! Hierarchical path resolution.
//!
//! Resolves the ancestor identifiers of a request path in order
//! (residence → room → thermostat) and fails with not-found on the first one
//! that is missing or belongs to a different parent. Read and write routes
//! call the same functions, so no resource is reachable through a path that
//! does not own it.

use sqlx::PgPool;
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::models::{Residence, Room, Thermostat};

// ---

/// Parse an integer path key; anything else cannot match a row.
pub fn parse_id(raw: &str, model: &str) -> ApiResult<i32> {
    raw.trim().parse::<i32>().map_err(|_| ApiError::no_match(model))
}

#[instrument(skip(pool))]
pub async fn residence(pool: &PgPool, rfid: &str) -> ApiResult<Residence> {
    // ---
    sqlx::query_as::<_, Residence>(&format!("{} WHERE rfid = $1", Residence::SELECT))
        .bind(rfid)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::no_match("Residence"))
}

#[instrument(skip(pool))]
pub async fn room(pool: &PgPool, residence_rfid: &str, room_id: &str) -> ApiResult<Room> {
    // ---
    let residence = residence(pool, residence_rfid).await?;
    let room_id = parse_id(room_id, "Room")?;

    sqlx::query_as::<_, Room>(&format!(
        "{} WHERE residence_rfid = $1 AND id = $2",
        Room::SELECT
    ))
    .bind(&residence.rfid)
    .bind(room_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("Room"))
}

#[instrument(skip(pool))]
pub async fn thermostat(
    pool: &PgPool,
    residence_rfid: &str,
    room_id: &str,
    thermostat_rfid: &str,
) -> ApiResult<Thermostat> {
    // ---
    let room = room(pool, residence_rfid, room_id).await?;
    thermostat_in(pool, &room, thermostat_rfid).await
}

/// Thermostat below an already resolved room.
pub async fn thermostat_in(
    pool: &PgPool,
    room: &Room,
    thermostat_rfid: &str,
) -> ApiResult<Thermostat> {
    // ---
    sqlx::query_as::<_, Thermostat>(&format!(
        "{} WHERE th.room_id = $1 AND th.rfid = $2",
        Thermostat::SELECT
    ))
    .bind(room.id)
    .bind(thermostat_rfid)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("Thermostat"))
}
