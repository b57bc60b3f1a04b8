use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{format_datetime, Model, Thermostat};
use crate::config::Bounds;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Temperature reading, keyed by its timestamp.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Temperature {
    pub datetime: DateTime<Utc>,
    pub value: f64,
    pub thermostat_rfid: String,
    pub room_id: i32,
    pub residence_rfid: String,
}

impl Temperature {
    pub const SELECT: &'static str =
        "SELECT t.datetime, t.value, t.thermostat_rfid, th.room_id, r.residence_rfid \
         FROM temperature t \
         JOIN thermostat th ON th.rfid = t.thermostat_rfid \
         JOIN room r ON r.id = th.room_id";

    /// `[epoch_ms, value]` point for client-side charts.
    pub fn chart_point(&self) -> (i64, f64) {
        (self.datetime.timestamp_millis(), self.value)
    }
}

impl Model for Temperature {
    const SEGMENTS: &'static [&'static str] =
        &["residence", "room", "thermostat", "temperature"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![
            self.residence_rfid.clone(),
            self.room_id.to_string(),
            self.thermostat_rfid.clone(),
            format_datetime(&self.datetime),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TemperatureInput {
    pub datetime: Option<String>,
    pub value: Option<f64>,
}

impl TemperatureInput {
    /// Validate against `bounds` and attach the reading to `thermostat`.
    pub fn validate(self, thermostat: &Thermostat, bounds: &Bounds) -> ApiResult<Temperature> {
        // ---
        let mut errors = FieldErrors::new();
        let datetime = validation::datetime(&mut errors, "datetime", self.datetime);
        let value = validation::bounded(&mut errors, "value", self.value, bounds);

        match (datetime, value) {
            (Some(datetime), Some(value)) => errors.finish(Temperature {
                datetime,
                value,
                thermostat_rfid: thermostat.rfid.clone(),
                room_id: thermostat.room_id,
                residence_rfid: thermostat.residence_rfid.clone(),
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn thermostat() -> Thermostat {
        Thermostat {
            rfid: "5".into(),
            name: "Hallway".into(),
            room_id: 1,
            residence_rfid: "3".into(),
        }
    }

    fn input(value: f64) -> TemperatureInput {
        TemperatureInput {
            datetime: Some("2015-05-13T07:00:00+00:00".into()),
            value: Some(value),
        }
    }

    #[test]
    fn test_unbounded_by_default() {
        // ---
        let reading = input(36.1).validate(&thermostat(), &Bounds::default()).unwrap();

        assert_eq!(reading.datetime, Utc.with_ymd_and_hms(2015, 5, 13, 7, 0, 0).unwrap());
        assert_eq!(reading.value, 36.1);
        assert_eq!(reading.thermostat_rfid, "5");
    }

    #[test]
    fn test_configured_bounds_inclusive() {
        // ---
        let bounds = Bounds::new(Some(5.0), Some(30.0));

        assert!(input(5.0).validate(&thermostat(), &bounds).is_ok());
        assert!(input(30.0).validate(&thermostat(), &bounds).is_ok());
        assert!(input(36.1).validate(&thermostat(), &bounds).is_err());
        assert!(input(4.99).validate(&thermostat(), &bounds).is_err());
    }

    #[test]
    fn test_chart_point_in_millis() {
        // ---
        let reading = input(21.5).validate(&thermostat(), &Bounds::default()).unwrap();
        assert_eq!(reading.chart_point(), (1_431_500_400_000, 21.5));
    }
}
