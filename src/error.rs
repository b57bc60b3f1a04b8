//! API error type and its HTTP mapping.
//!
//! Every handler returns [`ApiResult`]. Not-found and validation failures are
//! client errors with a JSON body; database failures other than constraint
//! violations are logged and reported as a generic 500.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Result type alias for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name used for errors that span several fields.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field-level validation messages, serialized as `{field: [messages]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(value)` when no errors were collected.
    pub fn finish<T>(self, value: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// Main error type for request handling
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource or one of its ancestors does not exist
    #[error("{0}")]
    NotFound(String),

    /// Payload failed field validation or a uniqueness constraint
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Request body is not valid JSON for the endpoint
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl ApiError {
    /// Not-found error for a missing model instance.
    pub fn no_match(model: &str) -> Self {
        Self::NotFound(format!("No {model} matches the given query."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Translate a violated constraint name into field-level messages.
///
/// Names follow PostgreSQL defaults for the tables created in `schema.rs`.
fn constraint_errors(constraint: &str) -> Option<FieldErrors> {
    // ---
    let (field, message) = match constraint {
        "residence_pkey" => ("rfid", "residence with this rfid already exists."),
        "app_user_pkey" => ("imei", "user with this imei already exists."),
        "thermostat_pkey" => ("rfid", "thermostat with this rfid already exists."),
        "temperature_pkey" => ("datetime", "temperature with this datetime already exists."),
        "raspberry_device_pkey" => ("rfid", "raspberry device with this rfid already exists."),
        "raspberry_device_mac_key" => ("mac", "raspberry device with this mac already exists."),
        "thermostat_device_pkey" => ("rfid", "thermostat device with this rfid already exists."),
        "thermostat_device_mac_key" => ("mac", "thermostat device with this mac already exists."),
        "thermostat_meta_entry_thermostat_rfid_datetime_key" => (
            NON_FIELD_ERRORS,
            "The fields thermostat, datetime must make a unique set.",
        ),
        "heating_table_entry_day_time_thermostat_rfid_key" => (
            NON_FIELD_ERRORS,
            "The fields day, time, thermostat must make a unique set.",
        ),
        _ => return None,
    };
    Some(FieldErrors::single(field, message))
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // ---
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() || db_err.is_check_violation() {
                if let Some(errors) = db_err.constraint().and_then(constraint_errors) {
                    return Self::Validation(errors);
                }
            }
        }
        Self::Database(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        match self {
            Self::NotFound(detail) | Self::MalformedBody(detail) => {
                (status, Json(json!({ "detail": detail }))).into_response()
            }
            Self::Validation(errors) => (status, Json(errors)).into_response(),
            Self::Database(err) => {
                tracing::error!("Database error: {}", err);
                (status, Json(json!({ "detail": "A server error occurred." }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        // ---
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        // ---
        let (status, body) = body_of(ApiError::no_match("Room")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "No Room matches the given query." }));
    }

    #[tokio::test]
    async fn test_validation_body_is_field_map() {
        // ---
        let mut errors = FieldErrors::new();
        errors.add("rfid", "Only alphanumeric characters are allowed.");
        errors.add("rfid", "Ensure this field has no more than 100 characters.");
        errors.add("name", "This field is required.");

        let (status, body) = body_of(ApiError::Validation(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "name": ["This field is required."],
                "rfid": [
                    "Only alphanumeric characters are allowed.",
                    "Ensure this field has no more than 100 characters."
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        // ---
        let (status, body) = body_of(ApiError::Database(sqlx::Error::PoolTimedOut)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "A server error occurred." }));
    }

    #[test]
    fn test_unique_constraints_name_fields() {
        // ---
        let errors = constraint_errors("heating_table_entry_day_time_thermostat_rfid_key").unwrap();
        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["The fields day, time, thermostat must make a unique set.".to_string()][..])
        );

        let errors = constraint_errors("thermostat_device_mac_key").unwrap();
        assert!(errors.get("mac").is_some());

        assert!(constraint_errors("room_residence_rfid_fkey").is_none());
    }

    #[test]
    fn test_row_not_found_is_server_error() {
        // ---
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_finish() {
        // ---
        assert_eq!(FieldErrors::new().finish(7).unwrap(), 7);

        let err = FieldErrors::single("mac", "This field is required.")
            .finish(())
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
