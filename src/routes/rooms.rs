//! `/residence/{rfid}/room/` routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy;
use crate::models::{Room, RoomInput};
use crate::serializers::{represent_all, Represent, RoomRepr};
use crate::urls::Links;
use crate::AppState;

use super::{RESIDENCE, ROOM};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{RESIDENCE}/room/"), get(list).post(create))
        .route(&format!("{ROOM}/"), get(retrieve).put(update).delete(destroy))
}

async fn list(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<RoomRepr>>> {
    // ---
    info!("GET /residence/{}/room/", rfid);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let rooms = sqlx::query_as::<_, Room>(&format!(
        "{} WHERE residence_rfid = $1 ORDER BY name, id",
        Room::SELECT
    ))
    .bind(&residence.rfid)
    .fetch_all(&pool)
    .await?;

    Ok(Json(represent_all(&rooms, &links)))
}

async fn create(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<RoomInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RoomRepr>)> {
    // ---
    info!("POST /residence/{}/room/", rfid);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let id: i32 =
        sqlx::query_scalar("INSERT INTO room (name, residence_rfid) VALUES ($1, $2) RETURNING id")
            .bind(&fields.name)
            .bind(&residence.rfid)
            .fetch_one(&pool)
            .await?;

    let room = fields.into_room(id, &residence);
    Ok((StatusCode::CREATED, Json(room.represent(&links))))
}

async fn retrieve(
    Path((rfid, room_id)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<RoomRepr>> {
    // ---
    info!("GET /residence/{}/room/{}/", rfid, room_id);

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    Ok(Json(room.represent(&links)))
}

async fn update(
    Path((rfid, room_id)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<RoomInput>, JsonRejection>,
) -> ApiResult<Json<RoomRepr>> {
    // ---
    info!("PUT /residence/{}/room/{}/", rfid, room_id);

    let current = hierarchy::room(&pool, &rfid, &room_id).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let result = sqlx::query("UPDATE room SET name = $1 WHERE id = $2 AND residence_rfid = $3")
        .bind(&fields.name)
        .bind(current.id)
        .bind(&current.residence_rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Room"));
    }

    let room = Room {
        name: fields.name,
        ..current
    };
    Ok(Json(room.represent(&links)))
}

async fn destroy(
    Path((rfid, room_id)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!("DELETE /residence/{}/room/{}/", rfid, room_id);

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    let result = sqlx::query("DELETE FROM room WHERE id = $1 AND residence_rfid = $2")
        .bind(room.id)
        .bind(&room.residence_rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Room"));
    }
    Ok(StatusCode::NO_CONTENT)
}
