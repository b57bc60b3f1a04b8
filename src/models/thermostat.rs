use serde::Deserialize;

use super::{Model, Room};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Wireless thermostat mounted in a room.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Thermostat {
    pub rfid: String,
    pub name: String,
    pub room_id: i32,
    pub residence_rfid: String,
}

impl Thermostat {
    pub const SELECT: &'static str = "SELECT th.rfid, th.name, th.room_id, r.residence_rfid \
         FROM thermostat th JOIN room r ON r.id = th.room_id";
}

impl Model for Thermostat {
    const SEGMENTS: &'static [&'static str] = &["residence", "room", "thermostat"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![
            self.residence_rfid.clone(),
            self.room_id.to_string(),
            self.rfid.clone(),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ThermostatInput {
    pub rfid: Option<String>,
    pub name: Option<String>,
}

impl ThermostatInput {
    /// Validate and attach the thermostat to `room`.
    pub fn validate(self, room: &Room) -> ApiResult<Thermostat> {
        // ---
        let mut errors = FieldErrors::new();
        let rfid = validation::key(&mut errors, "rfid", self.rfid);
        let name = validation::text(&mut errors, "name", self.name, validation::NAME_MAX_LENGTH);

        match (rfid, name) {
            (Some(rfid), Some(name)) => errors.finish(Thermostat {
                rfid,
                name,
                room_id: room.id,
                residence_rfid: room.residence_rfid.clone(),
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_validate_inherits_room_ancestry() {
        // ---
        let room = Room {
            id: 2,
            name: "Office".into(),
            residence_rfid: "3".into(),
        };
        let thermostat = ThermostatInput {
            rfid: Some("7e".into()),
            name: Some("test".into()),
        }
        .validate(&room)
        .unwrap();

        assert_eq!(
            thermostat.recursive_keys(),
            vec!["3".to_string(), "2".to_string(), "7e".to_string()]
        );
    }

    #[test]
    fn test_name_may_not_be_blank() {
        // ---
        let room = Room {
            id: 2,
            name: "Office".into(),
            residence_rfid: "3".into(),
        };
        let result = ThermostatInput {
            rfid: Some("7e".into()),
            name: Some(" ".into()),
        }
        .validate(&room);

        match result {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.get("name"), Some(&[validation::BLANK.to_string()][..]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
