use serde::Deserialize;

use super::{Model, Residence};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Occupant of a residence, identified by the IMEI of their phone.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub imei: String,
    pub name: String,
    pub residence_rfid: String,
}

impl User {
    pub const SELECT: &'static str = "SELECT imei, name, residence_rfid FROM app_user";
}

impl Model for User {
    const SEGMENTS: &'static [&'static str] = &["residence", "user"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![self.residence_rfid.clone(), self.imei.clone()]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserInput {
    pub imei: Option<String>,
    pub name: Option<String>,
}

impl UserInput {
    /// Validate and attach the user to `residence`.
    pub fn validate(self, residence: &Residence) -> ApiResult<User> {
        // ---
        let mut errors = FieldErrors::new();
        let imei = validation::key(&mut errors, "imei", self.imei);
        let name = validation::text(&mut errors, "name", self.name, validation::NAME_MAX_LENGTH);

        match (imei, name) {
            (Some(imei), Some(name)) => errors.finish(User {
                imei,
                name,
                residence_rfid: residence.rfid.clone(),
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
    fn test_validate_attaches_residence() {
        // ---
        let residence = Residence { rfid: "3".into() };
        let input = UserInput {
            imei: Some("123".into()),
            name: Some("Le Me".into()),
        };

        let user = input.validate(&residence).unwrap();
        assert_eq!(user.residence_rfid, "3");
        assert_eq!(user.recursive_keys(), vec!["3".to_string(), "123".to_string()]);
    }

    #[test]
    fn test_validate_reports_all_fields() {
        // ---
        let residence = Residence { rfid: "3".into() };
        let input = UserInput {
            imei: Some("12-3".into()),
            name: None,
        };

        match input.validate(&residence) {
            Err(ApiError::Validation(errors)) => {
                assert!(errors.get("imei").is_some());
                assert!(errors.get("name").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
