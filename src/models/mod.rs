//! Persistence models for the heating hierarchy.
//!
//! Residence → Room → Thermostat → {Temperature, MetaEntry, HeatingTableEntry},
//! plus Users below residences and the two device link tables at the root.
//!
//! Row types derive [`sqlx::FromRow`] and carry the keys of all their
//! ancestors, so [`Model::recursive_keys`] never needs another query.
//! `*Input` types are the deserialized request bodies; their `validate`
//! methods produce the row (or row fields) to persist.

use chrono::{DateTime, SecondsFormat, Utc};

mod device;
mod heating_table;
mod meta_entry;
mod residence;
mod room;
mod temperature;
mod thermostat;
mod user;

pub use device::{
    Device, DeviceInput, DeviceTable, LinkTarget, RaspberryDevice, RaspberryTable,
    ThermostatDevice, ThermostatDeviceTable,
};
pub use heating_table::{HeatingTableEntry, HeatingTableInput};
pub use meta_entry::{MetaEntry, MetaEntryInput};
pub use residence::{Residence, ResidenceInput};
pub use room::{Room, RoomInput};
pub use temperature::{Temperature, TemperatureInput};
pub use thermostat::{Thermostat, ThermostatInput};
pub use user::{User, UserInput};

// ---

/// A resource addressed by a chain of primary keys.
pub trait Model {
    /// Collection names from the root down to this model.
    const SEGMENTS: &'static [&'static str];

    /// Keys of all ancestors followed by this model's own key.
    fn recursive_keys(&self) -> Vec<String>;

    /// Keys of the ancestors only.
    fn parent_keys(&self) -> Vec<String> {
        let mut keys = self.recursive_keys();
        keys.pop();
        keys
    }
}

/// Wire and URL form of a timestamp, e.g. `2015-05-13T07:00:00Z`.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
