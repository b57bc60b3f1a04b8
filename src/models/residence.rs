use serde::Deserialize;

use super::Model;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Root of the hierarchy, identified by the RFID of its gateway.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Residence {
    pub rfid: String,
}

impl Residence {
    pub const SELECT: &'static str = "SELECT rfid FROM residence";
}

impl Model for Residence {
    const SEGMENTS: &'static [&'static str] = &["residence"];

    fn recursive_keys(&self) -> Vec<String> {
        vec![self.rfid.clone()]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResidenceInput {
    pub rfid: Option<String>,
}

impl ResidenceInput {
    pub fn validate(self) -> ApiResult<Residence> {
        // ---
        let mut errors = FieldErrors::new();
        let rfid = validation::key(&mut errors, "rfid", self.rfid);
        match rfid {
            Some(rfid) => errors.finish(Residence { rfid }),
            None => Err(ApiError::Validation(errors)),
        }
    }
}
