// ── Entity adapters ──
//
// Thin adapters a host framework maps onto its own entity model. Each
// entity holds a coordinator clone, derives its state from the current
// snapshot on every read, and re-evaluates availability instead of
// caching it.

mod lawn_mower;
mod sensor;

pub use lawn_mower::LawnMowerEntity;
pub use sensor::{
    EntityCategory, MOWER_SENSORS, SensorDescription, SensorDeviceClass, SensorEntity,
    SensorKind, SensorStateClass, SensorValue,
};

use mowerlink_link::{BleAddress, DeviceIdentity};

/// Device registration data shared by all entities of one mower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub address: BleAddress,
    pub manufacturer: String,
    pub model: String,
    pub serial: Option<String>,
}

impl DeviceInfo {
    pub fn new(address: BleAddress, identity: &DeviceIdentity) -> Self {
        Self {
            address,
            manufacturer: identity.manufacturer.clone(),
            model: identity.model.clone(),
            serial: identity.serial.clone(),
        }
    }
}
