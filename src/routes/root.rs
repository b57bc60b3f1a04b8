//! `GET /`: entry links to the top-level collections.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::models::{RaspberryDevice, Residence, ThermostatDevice};
use crate::urls::Links;
use crate::AppState;

#[derive(Debug, Serialize)]
struct ApiRoot {
    residence: String,
    #[serde(rename = "device/raspberry")]
    raspberry_devices: String,
    #[serde(rename = "device/thermostat")]
    thermostat_devices: String,
}

impl ApiRoot {
    fn new(links: &Links) -> Self {
        Self {
            residence: links.collection::<Residence>(&[]),
            raspberry_devices: links.collection::<RaspberryDevice>(&[]),
            thermostat_devices: links.collection::<ThermostatDevice>(&[]),
        }
    }
}

async fn api_root(links: Links) -> Json<ApiRoot> {
    // ---
    info!("GET /");
    Json(ApiRoot::new(&links))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(api_root))
}
