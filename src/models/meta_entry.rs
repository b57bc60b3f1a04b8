use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Model, Thermostat};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Telemetry sample reported by a thermostat.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MetaEntry {
    pub id: i32,
    pub datetime: DateTime<Utc>,
    /// Received signal strength
    pub rssi: Option<i32>,
    pub uptime: Option<i32>,
    pub battery: Option<i32>,
    pub thermostat_rfid: String,
    pub room_id: i32,
    pub residence_rfid: String,
}

impl MetaEntry {
    pub const SELECT: &'static str =
        "SELECT m.id, m.datetime, m.rssi, m.uptime, m.battery, \
                m.thermostat_rfid, th.room_id, r.residence_rfid \
         FROM thermostat_meta_entry m \
         JOIN thermostat th ON th.rfid = m.thermostat_rfid \
         JOIN room r ON r.id = th.room_id";
}

impl Model for MetaEntry {
    const SEGMENTS: &'static [&'static str] = &["residence", "room", "thermostat", "meta_entry"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![
            self.residence_rfid.clone(),
            self.room_id.to_string(),
            self.thermostat_rfid.clone(),
            self.id.to_string(),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MetaEntryInput {
    pub datetime: Option<String>,
    pub rssi: Option<i32>,
    pub uptime: Option<i32>,
    pub battery: Option<i32>,
}

/// Writable meta entry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEntryFields {
    pub datetime: DateTime<Utc>,
    pub rssi: Option<i32>,
    pub uptime: Option<i32>,
    pub battery: Option<i32>,
}

impl MetaEntryInput {
    pub fn validate(self) -> ApiResult<MetaEntryFields> {
        // ---
        let mut errors = FieldErrors::new();
        match validation::datetime(&mut errors, "datetime", self.datetime) {
            Some(datetime) => errors.finish(MetaEntryFields {
                datetime,
                rssi: self.rssi,
                uptime: self.uptime,
                battery: self.battery,
            }),
            None => Err(ApiError::Validation(errors)),
        }
    }
}

impl MetaEntryFields {
    pub fn into_entry(self, id: i32, thermostat: &Thermostat) -> MetaEntry {
        MetaEntry {
            id,
            datetime: self.datetime,
            rssi: self.rssi,
            uptime: self.uptime,
            battery: self.battery,
            thermostat_rfid: thermostat.rfid.clone(),
            room_id: thermostat.room_id,
            residence_rfid: thermostat.residence_rfid.clone(),
        }
    }
}
