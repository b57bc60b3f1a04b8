//! `/residence/{rfid}/user/` routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy;
use crate::models::{Residence, User, UserInput};
use crate::serializers::{represent_all, Represent, UserRepr};
use crate::urls::Links;
use crate::AppState;

use super::RESIDENCE;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{RESIDENCE}/user/"), get(list).post(create))
        .route(
            &format!("{RESIDENCE}/user/{{imei}}/"),
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<UserRepr>>> {
    // ---
    info!("GET /residence/{}/user/", rfid);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let users = sqlx::query_as::<_, User>(&format!(
        "{} WHERE residence_rfid = $1 ORDER BY imei",
        User::SELECT
    ))
    .bind(&residence.rfid)
    .fetch_all(&pool)
    .await?;

    Ok(Json(represent_all(&users, &links)))
}

async fn create(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserRepr>)> {
    // ---
    info!("POST /residence/{}/user/", rfid);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let Json(input) = payload?;
    let user = input.validate(&residence)?;

    sqlx::query("INSERT INTO app_user (imei, name, residence_rfid) VALUES ($1, $2, $3)")
        .bind(&user.imei)
        .bind(&user.name)
        .bind(&user.residence_rfid)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(user.represent(&links))))
}

async fn fetch(pool: &PgPool, residence: &Residence, imei: &str) -> ApiResult<User> {
    // ---
    sqlx::query_as::<_, User>(&format!(
        "{} WHERE residence_rfid = $1 AND imei = $2",
        User::SELECT
    ))
    .bind(&residence.rfid)
    .bind(imei)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("User"))
}

async fn retrieve(
    Path((rfid, imei)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<UserRepr>> {
    // ---
    info!("GET /residence/{}/user/{}/", rfid, imei);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let user = fetch(&pool, &residence, &imei).await?;
    Ok(Json(user.represent(&links)))
}

async fn update(
    Path((rfid, imei)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<Json<UserRepr>> {
    // ---
    info!("PUT /residence/{}/user/{}/", rfid, imei);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let current = fetch(&pool, &residence, &imei).await?;
    let Json(input) = payload?;
    let user = input.validate(&residence)?;

    let result = sqlx::query(
        "UPDATE app_user SET imei = $1, name = $2 WHERE imei = $3 AND residence_rfid = $4",
    )
    .bind(&user.imei)
    .bind(&user.name)
    .bind(&current.imei)
    .bind(&current.residence_rfid)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("User"));
    }
    Ok(Json(user.represent(&links)))
}

async fn destroy(
    Path((rfid, imei)): Path<(String, String)>,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!("DELETE /residence/{}/user/{}/", rfid, imei);

    let residence = hierarchy::residence(&pool, &rfid).await?;
    let result = sqlx::query("DELETE FROM app_user WHERE imei = $1 AND residence_rfid = $2")
        .bind(&imei)
        .bind(&residence.rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("User"));
    }
    Ok(StatusCode::NO_CONTENT)
}
