use chrono::NaiveTime;
use serde::Deserialize;

use super::{Model, Thermostat};
use crate::config::Bounds;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Day of the weekly schedule. Monday is 0, Sunday is 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub fn from_index(index: i64) -> Option<Self> {
        Some(match index {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            6 => Self::Sunday,
            _ => return None,
        })
    }

    pub fn index(self) -> i16 {
        self as i16
    }
}

/// One slot of a thermostat's recurring weekly schedule.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct HeatingTableEntry {
    pub id: i32,
    pub day: i16,
    pub time: NaiveTime,
    /// Target temperature
    pub temperature: f64,
    pub thermostat_rfid: String,
    pub room_id: i32,
    pub residence_rfid: String,
}

impl HeatingTableEntry {
    pub const SELECT: &'static str =
        "SELECT h.id, h.day, h.time, h.temperature, \
                h.thermostat_rfid, th.room_id, r.residence_rfid \
         FROM heating_table_entry h \
         JOIN thermostat th ON th.rfid = h.thermostat_rfid \
         JOIN room r ON r.id = th.room_id";
}

impl Model for HeatingTableEntry {
    const SEGMENTS: &'static [&'static str] =
        &["residence", "room", "thermostat", "heating_table"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![
            self.residence_rfid.clone(),
            self.room_id.to_string(),
            self.thermostat_rfid.clone(),
            self.id.to_string(),
        ]
    }
}

/// Request body. `day` accepts both `0` and `"0"`.
#[derive(Debug, Default, Deserialize)]
pub struct HeatingTableInput {
    pub day: Option<serde_json::Value>,
    pub time: Option<String>,
    pub temperature: Option<f64>,
}

/// Writable heating table fields.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatingTableFields {
    pub day: Weekday,
    pub time: NaiveTime,
    pub temperature: f64,
}

impl HeatingTableInput {
    /// Validate against the heating temperature `bounds`.
    pub fn validate(self, bounds: &Bounds) -> ApiResult<HeatingTableFields> {
        // ---
        let mut errors = FieldErrors::new();
        let day = validation::required(&mut errors, "day", self.day).and_then(|raw| {
            let index = match &raw {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            let day = index.and_then(Weekday::from_index);
            if day.is_none() {
                errors.add("day", format!("{raw} is not a valid choice."));
            }
            day
        });
        let time = validation::time_of_day(&mut errors, "time", self.time);
        let temperature =
            validation::bounded(&mut errors, "temperature", self.temperature, bounds);

        match (day, time, temperature) {
            (Some(day), Some(time), Some(temperature)) => errors.finish(HeatingTableFields {
                day,
                time,
                temperature,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

impl HeatingTableFields {
    pub fn into_entry(self, id: i32, thermostat: &Thermostat) -> HeatingTableEntry {
        HeatingTableEntry {
            id,
            day: self.day.index(),
            time: self.time,
            temperature: self.temperature,
            thermostat_rfid: thermostat.rfid.clone(),
            room_id: thermostat.room_id,
            residence_rfid: thermostat.residence_rfid.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn bounds() -> Bounds {
        Bounds::new(Some(5.0), Some(30.0))
    }

    fn input(day: serde_json::Value, temperature: f64) -> HeatingTableInput {
        HeatingTableInput {
            day: Some(day),
            time: Some("13:45:00".into()),
            temperature: Some(temperature),
        }
    }

    #[test]
    fn test_accepts_temperature_between_5_and_30() {
        // ---
        assert!(input(json!(0), 5.0).validate(&bounds()).is_ok());
        assert!(input(json!(0), 30.0).validate(&bounds()).is_ok());
        assert!(input(json!(0), 25.67).validate(&bounds()).is_ok());
    }

    #[test]
    fn test_rejects_temperature_out_of_range() {
        // ---
        for temperature in [4.95, 30.05] {
            match input(json!(0), temperature).validate(&bounds()) {
                Err(ApiError::Validation(errors)) => assert!(errors.get("temperature").is_some()),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_day_choices() {
        // ---
        let fields = input(json!("6"), 20.0).validate(&bounds()).unwrap();
        assert_eq!(fields.day, Weekday::Sunday);

        match input(json!(7), 20.0).validate(&bounds()) {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(
                    errors.get("day"),
                    Some(&["7 is not a valid choice.".to_string()][..])
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_weekday_ordering_matches_index() {
        // ---
        assert!(Weekday::Monday < Weekday::Tuesday);
        assert_eq!(Weekday::from_index(4), Some(Weekday::Friday));
        assert_eq!(Weekday::Friday.index(), 4);
        assert_eq!(Weekday::from_index(-1), None);
    }
}
