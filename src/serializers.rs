//! JSON representations of the models.
//!
//! Every representation carries its own absolute `url` and a summary of its
//! parent (key + URL), all derived from [`Model::recursive_keys`].

use serde::Serialize;

use crate::models::{
    format_datetime, Device, DeviceTable, HeatingTableEntry, MetaEntry, Model, Residence, Room,
    Temperature, Thermostat, ThermostatDevice, User,
};
use crate::urls::Links;

// ---

/// Conversion of a model into its wire representation.
pub trait Represent {
    type Repr: Serialize;

    fn represent(&self, links: &Links) -> Self::Repr;
}

/// Represent every item of a slice.
pub fn represent_all<M: Represent>(items: &[M], links: &Links) -> Vec<M::Repr> {
    items.iter().map(|item| item.represent(links)).collect()
}

#[derive(Debug, Serialize)]
pub struct ResidenceSummary {
    pub rfid: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RoomSummary {
    pub id: i32,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ThermostatSummary {
    pub rfid: String,
    pub url: String,
}

/// Summary of the residence owning a model, from its parent keys.
fn residence_summary<M: Model>(links: &Links, model: &M) -> ResidenceSummary {
    let keys = model.parent_keys();
    ResidenceSummary {
        rfid: keys.last().cloned().unwrap_or_default(),
        url: links.path(Residence::SEGMENTS, &keys),
    }
}

/// Summary of the thermostat owning a model, from its parent keys.
fn thermostat_summary<M: Model>(links: &Links, model: &M) -> ThermostatSummary {
    let keys = model.parent_keys();
    ThermostatSummary {
        rfid: keys.last().cloned().unwrap_or_default(),
        url: links.path(Thermostat::SEGMENTS, &keys),
    }
}

impl Room {
    pub fn summary(&self, links: &Links) -> RoomSummary {
        RoomSummary {
            id: self.id,
            url: links.detail(self),
        }
    }
}

impl Thermostat {
    pub fn summary(&self, links: &Links) -> ThermostatSummary {
        ThermostatSummary {
            rfid: self.rfid.clone(),
            url: links.detail(self),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResidenceRepr {
    pub rfid: String,
    pub url: String,
    pub rooms_url: String,
    pub users_url: String,
}

impl Represent for Residence {
    type Repr = ResidenceRepr;

    fn represent(&self, links: &Links) -> ResidenceRepr {
        let keys = self.recursive_keys();
        ResidenceRepr {
            rfid: self.rfid.clone(),
            url: links.detail(self),
            rooms_url: links.collection::<Room>(&keys),
            users_url: links.collection::<User>(&keys),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserRepr {
    pub imei: String,
    pub url: String,
    pub name: String,
    pub residence: ResidenceSummary,
}

impl Represent for User {
    type Repr = UserRepr;

    fn represent(&self, links: &Links) -> UserRepr {
        UserRepr {
            imei: self.imei.clone(),
            url: links.detail(self),
            name: self.name.clone(),
            residence: residence_summary(links, self),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomRepr {
    pub id: i32,
    pub url: String,
    pub name: String,
    pub residence: ResidenceSummary,
    pub thermostats_url: String,
}

impl Represent for Room {
    type Repr = RoomRepr;

    fn represent(&self, links: &Links) -> RoomRepr {
        let keys = self.recursive_keys();
        RoomRepr {
            id: self.id,
            url: links.detail(self),
            name: self.name.clone(),
            residence: residence_summary(links, self),
            thermostats_url: links.collection::<Thermostat>(&keys),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThermostatRepr {
    pub rfid: String,
    pub url: String,
    pub name: String,
    pub room: RoomSummary,
    pub temperatures_url: String,
    pub meta_entries_url: String,
    pub heating_table_url: String,
}

impl Represent for Thermostat {
    type Repr = ThermostatRepr;

    fn represent(&self, links: &Links) -> ThermostatRepr {
        let keys = self.recursive_keys();
        ThermostatRepr {
            rfid: self.rfid.clone(),
            url: links.detail(self),
            name: self.name.clone(),
            room: RoomSummary {
                id: self.room_id,
                url: links.path(Room::SEGMENTS, &self.parent_keys()),
            },
            temperatures_url: links.collection::<Temperature>(&keys),
            meta_entries_url: links.collection::<MetaEntry>(&keys),
            heating_table_url: links.collection::<HeatingTableEntry>(&keys),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemperatureRepr {
    pub url: String,
    pub datetime: String,
    pub value: f64,
    pub thermostat: ThermostatSummary,
}

impl Represent for Temperature {
    type Repr = TemperatureRepr;

    fn represent(&self, links: &Links) -> TemperatureRepr {
        TemperatureRepr {
            url: links.detail(self),
            datetime: format_datetime(&self.datetime),
            value: self.value,
            thermostat: thermostat_summary(links, self),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetaEntryRepr {
    pub id: i32,
    pub url: String,
    pub datetime: String,
    pub rssi: Option<i32>,
    pub uptime: Option<i32>,
    pub battery: Option<i32>,
    pub thermostat: ThermostatSummary,
}

impl Represent for MetaEntry {
    type Repr = MetaEntryRepr;

    fn represent(&self, links: &Links) -> MetaEntryRepr {
        MetaEntryRepr {
            id: self.id,
            url: links.detail(self),
            datetime: format_datetime(&self.datetime),
            rssi: self.rssi,
            uptime: self.uptime,
            battery: self.battery,
            thermostat: thermostat_summary(links, self),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HeatingTableEntryRepr {
    pub id: i32,
    pub url: String,
    pub day: i16,
    pub time: String,
    pub temperature: f64,
    pub thermostat: ThermostatSummary,
}

impl Represent for HeatingTableEntry {
    type Repr = HeatingTableEntryRepr;

    fn represent(&self, links: &Links) -> HeatingTableEntryRepr {
        HeatingTableEntryRepr {
            id: self.id,
            url: links.detail(self),
            day: self.day,
            time: self.time.format("%H:%M:%S").to_string(),
            temperature: self.temperature,
            thermostat: thermostat_summary(links, self),
        }
    }
}

/// Chart data of one thermostat: `[epoch_ms, value]` pairs in time order.
#[derive(Debug, Serialize)]
pub struct ChartRepr {
    pub room: RoomSummary,
    pub thermostat: ThermostatSummary,
    pub temperatures: Vec<(i64, f64)>,
}

/// `rfid`, `mac` and `url` of a device, without links into the hierarchy.
#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub rfid: String,
    pub mac: String,
    pub url: String,
}

impl<T: DeviceTable> Device<T> {
    pub fn summary(&self, links: &Links) -> DeviceSummary {
        DeviceSummary {
            rfid: self.rfid.clone(),
            mac: self.mac.clone(),
            url: links.detail(self),
        }
    }
}

/// Hierarchy links of a device, resolved by the device routes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DeviceLinks {
    /// `thermostat_devices` is null while no residence shares the rfid.
    Raspberry {
        residence: Option<String>,
        thermostat_devices: Option<Vec<DeviceSummary>>,
    },
    Thermostat {
        thermostat: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct DeviceRepr {
    #[serde(flatten)]
    pub device: DeviceSummary,
    #[serde(flatten)]
    pub links: DeviceLinks,
}

/// Thermostat devices listed below a Raspberry Pi.
pub fn thermostat_device_summaries(
    devices: &[ThermostatDevice],
    links: &Links,
) -> Vec<DeviceSummary> {
    devices.iter().map(|device| device.summary(links)).collect()
}
