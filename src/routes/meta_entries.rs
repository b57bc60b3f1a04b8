//! `.../thermostat/{rfid}/meta_entry/` routes.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy::{self, parse_id};
use crate::models::{MetaEntry, MetaEntryInput, Model, Thermostat};
use crate::pagination::{MetaEntryLinks, PageParams, Paginated};
use crate::serializers::{represent_all, MetaEntryRepr, Represent};
use crate::urls::Links;
use crate::AppState;

use super::THERMOSTAT;

type ThermostatPath = Path<(String, String, String)>;
type EntryPath = Path<(String, String, String, String)>;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{THERMOSTAT}/meta_entry/"), get(list).post(create))
        .route(&format!("{THERMOSTAT}/meta_entry/latest/"), get(latest))
        .route(
            &format!("{THERMOSTAT}/meta_entry/{{id}}/"),
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    Query(params): Query<PageParams>,
    State((pool, config)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Paginated<MetaEntryRepr, MetaEntryLinks>>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/meta_entry/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let page = params.resolve(config.page_size);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM thermostat_meta_entry WHERE thermostat_rfid = $1")
            .bind(&thermostat.rfid)
            .fetch_one(&pool)
            .await?;

    let entries = sqlx::query_as::<_, MetaEntry>(&format!(
        "{} WHERE m.thermostat_rfid = $1 ORDER BY m.datetime LIMIT $2 OFFSET $3",
        MetaEntry::SELECT
    ))
    .bind(&thermostat.rfid)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&pool)
    .await?;

    let parent = thermostat.recursive_keys();
    let extra = MetaEntryLinks {
        latest_entry_url: links.action::<MetaEntry>(&parent, "latest"),
    };
    let list_url = links.collection::<MetaEntry>(&parent);

    Ok(Json(Paginated::new(
        page,
        &list_url,
        count,
        extra,
        represent_all(&entries, &links),
    )))
}

async fn create(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<MetaEntryInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MetaEntryRepr>)> {
    // ---
    info!(
        "POST /residence/{}/room/{}/thermostat/{}/meta_entry/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO thermostat_meta_entry (datetime, rssi, uptime, battery, thermostat_rfid) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(fields.datetime)
    .bind(fields.rssi)
    .bind(fields.uptime)
    .bind(fields.battery)
    .bind(&thermostat.rfid)
    .fetch_one(&pool)
    .await?;

    let entry = fields.into_entry(id, &thermostat);
    Ok((StatusCode::CREATED, Json(entry.represent(&links))))
}

async fn fetch(pool: &PgPool, thermostat: &Thermostat, key: &str) -> ApiResult<MetaEntry> {
    // ---
    let id = parse_id(key, "ThermostatMetaEntry")?;

    sqlx::query_as::<_, MetaEntry>(&format!(
        "{} WHERE m.thermostat_rfid = $1 AND m.id = $2",
        MetaEntry::SELECT
    ))
    .bind(&thermostat.rfid)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("ThermostatMetaEntry"))
}

async fn retrieve(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<MetaEntryRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/meta_entry/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entry = fetch(&pool, &thermostat, &key).await?;
    Ok(Json(entry.represent(&links)))
}

async fn update(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<MetaEntryInput>, JsonRejection>,
) -> ApiResult<Json<MetaEntryRepr>> {
    // ---
    info!(
        "PUT /residence/{}/room/{}/thermostat/{}/meta_entry/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let current = fetch(&pool, &thermostat, &key).await?;
    let Json(input) = payload?;
    let fields = input.validate()?;

    let result = sqlx::query(
        "UPDATE thermostat_meta_entry SET datetime = $1, rssi = $2, uptime = $3, battery = $4 \
         WHERE id = $5 AND thermostat_rfid = $6",
    )
    .bind(fields.datetime)
    .bind(fields.rssi)
    .bind(fields.uptime)
    .bind(fields.battery)
    .bind(current.id)
    .bind(&current.thermostat_rfid)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("ThermostatMetaEntry"));
    }
    Ok(Json(fields.into_entry(current.id, &thermostat).represent(&links)))
}

async fn destroy(
    Path((rfid, room_id, thermostat_rfid, key)): EntryPath,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!(
        "DELETE /residence/{}/room/{}/thermostat/{}/meta_entry/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entry = fetch(&pool, &thermostat, &key).await?;

    sqlx::query("DELETE FROM thermostat_meta_entry WHERE id = $1 AND thermostat_rfid = $2")
        .bind(entry.id)
        .bind(&entry.thermostat_rfid)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn latest(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<MetaEntryRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/meta_entry/latest/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let entry = sqlx::query_as::<_, MetaEntry>(&format!(
        "{} WHERE m.thermostat_rfid = $1 ORDER BY m.datetime DESC LIMIT 1",
        MetaEntry::SELECT
    ))
    .bind(&thermostat.rfid)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("There are no meta entries.".into()))?;

    Ok(Json(entry.represent(&links)))
}
