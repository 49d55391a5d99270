// mowerlink-core: reactive layer between the device link and consumers.
//
// Owns the polling coordinator, the derived-activity mapping, the entity
// adapters a host framework subscribes to, and the pairing flow that
// produces persisted profiles.

pub mod activity;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod pairing;
pub mod snapshot;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activity::{DisplayActivity, derive_activity};
pub use config::MowerConfig;
pub use coordinator::Coordinator;
pub use entity::{DeviceInfo, LawnMowerEntity, MOWER_SENSORS, SensorEntity, SensorValue};
pub use error::CoreError;
pub use pairing::{PairedMower, PairingError, PairingInput, generate_channel_id, pair_device};
pub use snapshot::Snapshot;
pub use stream::SnapshotStream;

// Re-export the link-boundary types consumers need at the crate root.
pub use mowerlink_link::{
    BleAddress, DeviceHandle, DeviceIdentity, DeviceLink, Discovery, LinkError, LinkFactory,
    LinkSettings, MowerActivity, MowerCommand, MowerError, MowerMode, MowerState, ResponseResult,
    stats,
};
