// ── Sensor entities ──
//
// One entity per row of `MOWER_SENSORS`. Snapshot fields are extracted
// by kind, not by string key: direct fields first, statistics counters
// as an explicit second step. Enum-coded fields render through the
// decoded enum's `Display`.

use chrono::{DateTime, Utc};

use mowerlink_link::stats;

use crate::coordinator::Coordinator;
use crate::entity::DeviceInfo;

/// What a sensor reads from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    BatteryLevel,
    NextStartTime,
    Mode,
    State,
    Activity,
    /// A counter out of the statistics map.
    Statistic(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorDeviceClass {
    Battery,
    Duration,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStateClass {
    Measurement,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Diagnostic,
}

/// Rendered sensor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorValue {
    Integer(u64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// Static metadata for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: SensorKind,
    pub unit: Option<&'static str>,
    pub device_class: Option<SensorDeviceClass>,
    pub state_class: Option<SensorStateClass>,
    pub entity_category: Option<EntityCategory>,
    pub icon: &'static str,
}

/// The full sensor table of one mower.
pub const MOWER_SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: "battery_level",
        name: "Battery Level",
        kind: SensorKind::BatteryLevel,
        unit: Some("%"),
        device_class: Some(SensorDeviceClass::Battery),
        state_class: Some(SensorStateClass::Measurement),
        entity_category: None,
        icon: "mdi:battery",
    },
    SensorDescription {
        key: "next_start_time",
        name: "Next Start Time",
        kind: SensorKind::NextStartTime,
        unit: None,
        device_class: Some(SensorDeviceClass::Timestamp),
        state_class: None,
        entity_category: None,
        icon: "mdi:timer",
    },
    SensorDescription {
        key: "mode",
        name: "Mode",
        kind: SensorKind::Mode,
        unit: None,
        device_class: None,
        state_class: None,
        entity_category: None,
        icon: "mdi:robot",
    },
    SensorDescription {
        key: "state",
        name: "State",
        kind: SensorKind::State,
        unit: None,
        device_class: None,
        state_class: None,
        entity_category: None,
        icon: "mdi:state-machine",
    },
    SensorDescription {
        key: "activity",
        name: "Activity",
        kind: SensorKind::Activity,
        unit: None,
        device_class: None,
        state_class: None,
        entity_category: None,
        icon: "mdi:run",
    },
    SensorDescription {
        key: "total_running_time",
        name: "Total Running Time",
        kind: SensorKind::Statistic(stats::TOTAL_RUNNING_TIME),
        unit: Some("s"),
        device_class: Some(SensorDeviceClass::Duration),
        state_class: Some(SensorStateClass::Total),
        entity_category: Some(EntityCategory::Diagnostic),
        icon: "mdi:timer",
    },
    SensorDescription {
        key: "total_cutting_time",
        name: "Total Cutting Time",
        kind: SensorKind::Statistic(stats::TOTAL_CUTTING_TIME),
        unit: Some("s"),
        device_class: Some(SensorDeviceClass::Duration),
        state_class: Some(SensorStateClass::Total),
        entity_category: Some(EntityCategory::Diagnostic),
        icon: "mdi:timer",
    },
    SensorDescription {
        key: "remaining_charging_time",
        name: "Remaining Charging Time",
        kind: SensorKind::Statistic(stats::REMAINING_CHARGING_TIME),
        unit: Some("s"),
        device_class: Some(SensorDeviceClass::Duration),
        state_class: Some(SensorStateClass::Total),
        entity_category: Some(EntityCategory::Diagnostic),
        icon: "mdi:power-plug-battery",
    },
];

/// One sensor of one mower.
pub struct SensorEntity {
    coordinator: Coordinator,
    device: DeviceInfo,
    description: &'static SensorDescription,
    unique_id: String,
}

impl SensorEntity {
    pub fn new(
        coordinator: Coordinator,
        device: DeviceInfo,
        description: &'static SensorDescription,
    ) -> Self {
        let unique_id = format!("automower_{}_{}", device.address, description.key);
        Self {
            coordinator,
            device,
            description,
            unique_id,
        }
    }

    /// Build the full sensor set for one mower.
    pub fn all(coordinator: &Coordinator, device: &DeviceInfo) -> Vec<Self> {
        MOWER_SENSORS
            .iter()
            .map(|description| Self::new(coordinator.clone(), device.clone(), description))
            .collect()
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn description(&self) -> &'static SensorDescription {
        self.description
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    /// Current value, extracted from the latest snapshot.
    pub fn value(&self) -> Option<SensorValue> {
        let snapshot = self.coordinator.snapshot()?;
        match self.description.kind {
            SensorKind::BatteryLevel => {
                Some(SensorValue::Integer(u64::from(snapshot.battery_level)))
            }
            SensorKind::NextStartTime => snapshot.next_start_time.map(SensorValue::Timestamp),
            SensorKind::Mode => Some(SensorValue::Text(snapshot.mode.to_string())),
            SensorKind::State => Some(SensorValue::Text(snapshot.state.to_string())),
            SensorKind::Activity => Some(SensorValue::Text(snapshot.activity.to_string())),
            SensorKind::Statistic(key) => snapshot.statistic(key).map(SensorValue::Integer),
        }
    }

    /// Available iff a value can be produced from a snapshot that is
    /// still inside the staleness window.
    pub fn available(&self) -> bool {
        self.value().is_some() && self.coordinator.is_fresh()
    }
}
