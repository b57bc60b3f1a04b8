use serde::Deserialize;

use super::{Model, Residence};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Group of thermostats inside a residence. `id` is assigned by the database.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Room {
    pub id: i32,
    pub name: String,
    pub residence_rfid: String,
}

impl Room {
    pub const SELECT: &'static str = "SELECT id, name, residence_rfid FROM room";
}

impl Model for Room {
    const SEGMENTS: &'static [&'static str] = &["residence", "room"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![self.residence_rfid.clone(), self.id.to_string()]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomInput {
    pub name: Option<String>,
}

/// Writable room fields; the id is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomFields {
    pub name: String,
}

impl RoomInput {
    pub fn validate(self) -> ApiResult<RoomFields> {
        // ---
        let mut errors = FieldErrors::new();
        match validation::text(&mut errors, "name", self.name, validation::NAME_MAX_LENGTH) {
            Some(name) => errors.finish(RoomFields { name }),
            None => Err(ApiError::Validation(errors)),
        }
    }
}

impl RoomFields {
    pub fn into_room(self, id: i32, residence: &Residence) -> Room {
        Room {
            id,
            name: self.name,
            residence_rfid: residence.rfid.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_validate_name() {
        // ---
        let fields = RoomInput {
            name: Some("Dining Room".into()),
        }
        .validate()
        .unwrap();

        let room = fields.into_room(1, &Residence { rfid: "3".into() });
        assert_eq!(room.name, "Dining Room");
        assert_eq!(room.recursive_keys(), vec!["3".to_string(), "1".to_string()]);

        assert!(RoomInput::default().validate().is_err());
        assert!(RoomInput { name: Some("".into()) }.validate().is_err());
    }
}
