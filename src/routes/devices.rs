//! `/device/raspberry/` and `/device/thermostat/` routes.
//!
//! Both device tables share one set of generic handlers, mounted once per
//! [`DeviceTable`]. A device's hierarchy links are resolved on every read by
//! matching its RFID against residences or thermostats.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{
    Device, DeviceInput, DeviceTable, LinkTarget, RaspberryTable, Residence, Thermostat,
    ThermostatDevice, ThermostatDeviceTable,
};
use crate::serializers::{thermostat_device_summaries, DeviceLinks, DeviceRepr};
use crate::urls::Links;
use crate::validation::REQUIRED;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LookupParams {
    mac: Option<String>,
}

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .merge(device_router::<RaspberryTable>())
        .merge(device_router::<ThermostatDeviceTable>())
}

fn device_router<T: DeviceTable>() -> Router<AppState> {
    // ---
    let prefix = format!("/{}", T::SEGMENTS.join("/"));
    Router::new()
        .route(&format!("{prefix}/"), get(list::<T>).post(create::<T>))
        .route(&format!("{prefix}/lookup/"), get(lookup::<T>))
        .route(
            &format!("{prefix}/{{rfid}}/"),
            get(retrieve::<T>).put(update::<T>).delete(destroy::<T>),
        )
}

async fn resolve_links<T: DeviceTable>(
    pool: &PgPool,
    links: &Links,
    device: &Device<T>,
) -> ApiResult<DeviceLinks> {
    // ---
    match T::LINKS_TO {
        LinkTarget::Residence => {
            let residence = sqlx::query_as::<_, Residence>(&format!(
                "{} WHERE rfid = $1",
                Residence::SELECT
            ))
            .bind(&device.rfid)
            .fetch_optional(pool)
            .await?;

            let Some(residence) = residence else {
                return Ok(DeviceLinks::Raspberry {
                    residence: None,
                    thermostat_devices: None,
                });
            };

            let thermostat_devices = sqlx::query_as::<_, ThermostatDevice>(
                "SELECT d.rfid, d.mac FROM thermostat_device d \
                 JOIN thermostat th ON th.rfid = d.rfid \
                 JOIN room r ON r.id = th.room_id \
                 WHERE r.residence_rfid = $1 ORDER BY d.rfid",
            )
            .bind(&residence.rfid)
            .fetch_all(pool)
            .await?;

            Ok(DeviceLinks::Raspberry {
                residence: Some(links.detail(&residence)),
                thermostat_devices: Some(thermostat_device_summaries(&thermostat_devices, links)),
            })
        }
        LinkTarget::Thermostat => {
            let thermostat = sqlx::query_as::<_, Thermostat>(&format!(
                "{} WHERE th.rfid = $1",
                Thermostat::SELECT
            ))
            .bind(&device.rfid)
            .fetch_optional(pool)
            .await?;

            Ok(DeviceLinks::Thermostat {
                thermostat: thermostat.map(|th| links.detail(&th)),
            })
        }
    }
}

async fn represent<T: DeviceTable>(
    pool: &PgPool,
    links: &Links,
    device: &Device<T>,
) -> ApiResult<DeviceRepr> {
    // ---
    Ok(DeviceRepr {
        device: device.summary(links),
        links: resolve_links(pool, links, device).await?,
    })
}

async fn fetch<T: DeviceTable>(pool: &PgPool, rfid: &str) -> ApiResult<Device<T>> {
    // ---
    sqlx::query_as::<_, Device<T>>(&format!("{} WHERE rfid = $1", Device::<T>::select()))
        .bind(rfid)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::no_match(T::NAME))
}

async fn list<T: DeviceTable>(
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<Vec<DeviceRepr>>> {
    // ---
    info!("GET {}", links.collection::<Device<T>>(&[]));

    let devices = sqlx::query_as::<_, Device<T>>(&format!(
        "{} ORDER BY rfid",
        Device::<T>::select()
    ))
    .fetch_all(&pool)
    .await?;

    let mut reprs = Vec::with_capacity(devices.len());
    for device in &devices {
        reprs.push(represent(&pool, &links, device).await?);
    }
    Ok(Json(reprs))
}

async fn create<T: DeviceTable>(
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<DeviceInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DeviceRepr>)> {
    // ---
    info!("POST {}", links.collection::<Device<T>>(&[]));

    let Json(input) = payload?;
    let device = input.validate::<T>()?;

    sqlx::query(&format!("INSERT INTO {} (rfid, mac) VALUES ($1, $2)", T::TABLE))
        .bind(&device.rfid)
        .bind(&device.mac)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(represent(&pool, &links, &device).await?)))
}

async fn retrieve<T: DeviceTable>(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<DeviceRepr>> {
    // ---
    info!("GET {}{}/", links.collection::<Device<T>>(&[]), rfid);

    let device = fetch::<T>(&pool, &rfid).await?;
    Ok(Json(represent(&pool, &links, &device).await?))
}

async fn update<T: DeviceTable>(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
    payload: Result<Json<DeviceInput>, JsonRejection>,
) -> ApiResult<Json<DeviceRepr>> {
    // ---
    info!("PUT {}{}/", links.collection::<Device<T>>(&[]), rfid);

    let current = fetch::<T>(&pool, &rfid).await?;
    let Json(input) = payload?;
    let device = input.validate::<T>()?;

    let result = sqlx::query(&format!(
        "UPDATE {} SET rfid = $1, mac = $2 WHERE rfid = $3",
        T::TABLE
    ))
    .bind(&device.rfid)
    .bind(&device.mac)
    .bind(&current.rfid)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match(T::NAME));
    }
    Ok(Json(represent(&pool, &links, &device).await?))
}

async fn destroy<T: DeviceTable>(
    Path(rfid): Path<String>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<StatusCode> {
    // ---
    info!("DELETE {}{}/", links.collection::<Device<T>>(&[]), rfid);

    let result = sqlx::query(&format!("DELETE FROM {} WHERE rfid = $1", T::TABLE))
        .bind(&rfid)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::no_match(T::NAME));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn lookup<T: DeviceTable>(
    Query(params): Query<LookupParams>,
    State((pool, _)): State<AppState>,
    links: Links,
) -> ApiResult<Json<DeviceRepr>> {
    // ---
    info!("GET {}lookup/ mac={:?}", links.collection::<Device<T>>(&[]), params.mac);

    let mac = params
        .mac
        .filter(|mac| !mac.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(FieldErrors::single("mac", REQUIRED)))?;

    let device = sqlx::query_as::<_, Device<T>>(&format!(
        "{} WHERE mac = $1",
        Device::<T>::select()
    ))
    .bind(mac.trim())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::no_match(T::NAME))?;

    Ok(Json(represent(&pool, &links, &device).await?))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_lookup_params_accept_missing_mac() {
        // ---
        let params: LookupParams = serde_json::from_str("{}").unwrap();
        assert!(params.mac.is_none());
    }
}
