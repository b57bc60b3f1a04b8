//! `.../thermostat/{rfid}/temperature/` routes.
//!
//! Readings are keyed by their RFC 3339 timestamp. The list is paginated and
//! links to the `latest` and `chart` views of the same thermostat.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::hierarchy;
use crate::models::{Model, Temperature, TemperatureInput, Thermostat};
use crate::pagination::{PageParams, Paginated, TemperatureLinks};
use crate::serializers::{represent_all, ChartRepr, Represent, TemperatureRepr};
use crate::urls::Links;
use crate::validation::parse_datetime;
use crate::AppState;

use super::THERMOSTAT;

type ThermostatPath = Path<(String, String, String)>;
type TemperaturePath = Path<(String, String, String, String)>;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(&format!("{THERMOSTAT}/temperature/"), get(list).post(create))
        .route(&format!("{THERMOSTAT}/temperature/latest/"), get(latest))
        .route(&format!("{THERMOSTAT}/temperature/chart/"), get(chart))
        .route(
            &format!("{THERMOSTAT}/temperature/{{datetime}}/"),
            get(retrieve).put(update).delete(destroy),
        )
}

async fn list(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    Query(params): Query<PageParams>,
    State((pool, config)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Paginated<TemperatureRepr, TemperatureLinks>>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/temperature/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let page = params.resolve(config.page_size);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM temperature WHERE thermostat_rfid = $1")
            .bind(&thermostat.rfid)
            .fetch_one(&pool)
            .await?;

    let temperatures = sqlx::query_as::<_, Temperature>(&format!(
        "{} WHERE t.thermostat_rfid = $1 ORDER BY t.datetime LIMIT $2 OFFSET $3",
        Temperature::SELECT
    ))
    .bind(&thermostat.rfid)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&pool)
    .await?;

    let parent = thermostat.recursive_keys();
    let extra = TemperatureLinks {
        latest_temperature_url: links.action::<Temperature>(&parent, "latest"),
        chart_url: links.action::<Temperature>(&parent, "chart"),
    };
    let list_url = links.collection::<Temperature>(&parent);

    Ok(Json(Paginated::new(
        page,
        &list_url,
        count,
        extra,
        represent_all(&temperatures, &links),
    )))
}

async fn create(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, config)): State<AppState>,
    links: Links,
    payload: Result<Json<TemperatureInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TemperatureRepr>)> {
    // ---
    info!(
        "POST /residence/{}/room/{}/thermostat/{}/temperature/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let Json(input) = payload?;
    let temperature = input.validate(&thermostat, &config.temperature_bounds)?;

    sqlx::query("INSERT INTO temperature (datetime, value, thermostat_rfid) VALUES ($1, $2, $3)")
        .bind(temperature.datetime)
        .bind(temperature.value)
        .bind(&temperature.thermostat_rfid)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(temperature.represent(&links))))
}

/// Reading of `thermostat` at the timestamp in the URL key.
async fn fetch(pool: &PgPool, thermostat: &Thermostat, key: &str) -> ApiResult<Temperature> {
    // ---
    let datetime = parse_datetime(key).ok_or_else(|| ApiError::no_match("Temperature"))?;

    sqlx::query_as::<_, Temperature>(&format!(
        "{} WHERE t.thermostat_rfid = $1 AND t.datetime = $2",
        Temperature::SELECT
    ))
    .bind(&thermostat.rfid)
    .bind(datetime)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::no_match("Temperature"))
}

async fn retrieve(
    Path((rfid, room_id, thermostat_rfid, key)): TemperaturePath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<TemperatureRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/temperature/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let temperature = fetch(&pool, &thermostat, &key).await?;
    Ok(Json(temperature.represent(&links)))
}

async fn update(
    Path((rfid, room_id, thermostat_rfid, key)): TemperaturePath,
    State((pool, config)): State<AppState>,
    links: Links,
    payload: Result<Json<TemperatureInput>, JsonRejection>,
) -> ApiResult<Json<TemperatureRepr>> {
    // ---
    info!(
        "PUT /residence/{}/room/{}/thermostat/{}/temperature/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let current = fetch(&pool, &thermostat, &key).await?;
    let Json(input) = payload?;
    let temperature = input.validate(&thermostat, &config.temperature_bounds)?;

    let result = sqlx::query(
        "UPDATE temperature SET datetime = $1, value = $2 \
         WHERE datetime = $3 AND thermostat_rfid = $4",
    )
    .bind(temperature.datetime)
    .bind(temperature.value)
    .bind(current.datetime)
    .bind(&current.thermostat_rfid)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match("Temperature"));
    }
    Ok(Json(temperature.represent(&links)))
}

async fn destroy(
    Path((rfid, room_id, thermostat_rfid, key)): TemperaturePath,
    State((pool, _)): State<AppState>,
) -> ApiResult<StatusCode> {
    // ---
    info!(
        "DELETE /residence/{}/room/{}/thermostat/{}/temperature/{}/",
        rfid, room_id, thermostat_rfid, key
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let temperature = fetch(&pool, &thermostat, &key).await?;

    sqlx::query("DELETE FROM temperature WHERE datetime = $1 AND thermostat_rfid = $2")
        .bind(temperature.datetime)
        .bind(&temperature.thermostat_rfid)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn latest(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<TemperatureRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/temperature/latest/",
        rfid, room_id, thermostat_rfid
    );

    let thermostat = hierarchy::thermostat(&pool, &rfid, &room_id, &thermostat_rfid).await?;
    let temperature = sqlx::query_as::<_, Temperature>(&format!(
        "{} WHERE t.thermostat_rfid = $1 ORDER BY t.datetime DESC LIMIT 1",
        Temperature::SELECT
    ))
    .bind(&thermostat.rfid)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("There are no temperatures.".into()))?;

    Ok(Json(temperature.represent(&links)))
}

async fn chart(
    Path((rfid, room_id, thermostat_rfid)): ThermostatPath,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<ChartRepr>> {
    // ---
    info!(
        "GET /residence/{}/room/{}/thermostat/{}/temperature/chart/",
        rfid, room_id, thermostat_rfid
    );

    let room = hierarchy::room(&pool, &rfid, &room_id).await?;
    let thermostat = hierarchy::thermostat_in(&pool, &room, &thermostat_rfid).await?;
    let temperatures = sqlx::query_as::<_, Temperature>(&format!(
        "{} WHERE t.thermostat_rfid = $1 ORDER BY t.datetime",
        Temperature::SELECT
    ))
    .bind(&thermostat.rfid)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ChartRepr {
        room: room.summary(&links),
        thermostat: thermostat.summary(&links),
        temperatures: temperatures.iter().map(Temperature::chart_point).collect(),
    }))
}
