//! Device link tables mapping a hardware MAC address to an RFID.
//!
//! Raspberry Pi gateways and thermostats are registered here before they are
//! provisioned into the hierarchy. Both tables share one row shape; the
//! [`DeviceTable`] marker selects the table and URL prefix.

use std::marker::PhantomData;

use serde::Deserialize;
use sqlx::{postgres::PgRow, FromRow, Row};

use super::Model;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::validation;

// ---

/// Hierarchy entity that shares its RFID with a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Residence,
    Thermostat,
}

/// Static description of one device table.
pub trait DeviceTable: Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const SEGMENTS: &'static [&'static str];
    /// Name used in not-found messages.
    const NAME: &'static str;
    const LINKS_TO: LinkTarget;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaspberryTable;

impl DeviceTable for RaspberryTable {
    const TABLE: &'static str = "raspberry_device";
    const SEGMENTS: &'static [&'static str] = &["device/raspberry"];
    const NAME: &'static str = "RaspberryDevice";
    const LINKS_TO: LinkTarget = LinkTarget::Residence;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermostatDeviceTable;

impl DeviceTable for ThermostatDeviceTable {
    const TABLE: &'static str = "thermostat_device";
    const SEGMENTS: &'static [&'static str] = &["device/thermostat"];
    const NAME: &'static str = "ThermostatDevice";
    const LINKS_TO: LinkTarget = LinkTarget::Thermostat;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device<T> {
    pub rfid: String,
    pub mac: String,
    table: PhantomData<T>,
}

pub type RaspberryDevice = Device<RaspberryTable>;
pub type ThermostatDevice = Device<ThermostatDeviceTable>;

impl<T: DeviceTable> Device<T> {
    pub fn new(rfid: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            rfid: rfid.into(),
            mac: mac.into(),
            table: PhantomData,
        }
    }

    pub fn select() -> String {
        format!("SELECT rfid, mac FROM {}", T::TABLE)
    }
}

impl<'r, T> FromRow<'r, PgRow> for Device<T> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            rfid: row.try_get("rfid")?,
            mac: row.try_get("mac")?,
            table: PhantomData,
        })
    }
}

impl<T: DeviceTable> Model for Device<T> {
    const SEGMENTS: &'static [&'static str] = T::SEGMENTS;

    fn recursive_keys(&self) -> Vec<String> {
        vec![self.rfid.clone()]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceInput {
    pub rfid: Option<String>,
    pub mac: Option<String>,
}

impl DeviceInput {
    pub fn validate<T: DeviceTable>(self) -> ApiResult<Device<T>> {
        // ---
        let mut errors = FieldErrors::new();
        let rfid = validation::key(&mut errors, "rfid", self.rfid);
        let mac = validation::text(&mut errors, "mac", self.mac, validation::MAC_MAX_LENGTH);

        match (rfid, mac) {
            (Some(rfid), Some(mac)) => errors.finish(Device::new(rfid, mac)),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_validate_device() {
        // ---
        let device = DeviceInput {
            rfid: Some("42".into()),
            mac: Some("b8:27:eb:00:11:22".into()),
        }
        .validate::<RaspberryTable>()
        .unwrap();

        assert_eq!(device, RaspberryDevice::new("42", "b8:27:eb:00:11:22"));
        assert_eq!(device.recursive_keys(), vec!["42".to_string()]);
    }

    #[test]
    fn test_mac_length_limited() {
        // ---
        let result = DeviceInput {
            rfid: Some("42".into()),
            mac: Some("b8:27:eb:00:11:22:33".into()),
        }
        .validate::<ThermostatDeviceTable>();

        match result {
            Err(ApiError::Validation(errors)) => assert!(errors.get("mac").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn assert_row_bounds<R: Send + Unpin + 'static>() {}

    #[test]
    fn test_device_rows_are_fetchable() {
        // ---
        // sqlx fetches require `Send + Unpin` rows
        assert_row_bounds::<RaspberryDevice>();
        assert_row_bounds::<ThermostatDevice>();
    }

    #[test]
    fn test_tables_differ() {
        // ---
        assert_eq!(RaspberryDevice::select(), "SELECT rfid, mac FROM raspberry_device");
        assert_eq!(
            <ThermostatDevice as Model>::SEGMENTS,
            &["device/thermostat"][..]
        );
    }
}
