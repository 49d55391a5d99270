// ── DeviceLink capability trait ──
//
// The proprietary mower protocol (GATT framing, PIN handshake, command
// encoding) lives in an external backend crate. This trait is the
// entire surface mowerlink consumes from it. One DeviceLink == one
// stateful session with one physical mower; it is NOT safe for two
// concurrent in-flight operations (the coordinator serializes access).

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::address::BleAddress;
use crate::discovery::DeviceHandle;
use crate::error::LinkError;
use crate::protocol::{
    MowerActivity, MowerCommand, MowerError, MowerMode, MowerState, ResponseResult,
};

/// Identity of one paired mower session.
///
/// The channel id is a random 32-bit value generated once at pairing
/// time and persisted alongside the address; the device associates the
/// PIN grant with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub address: BleAddress,
    pub channel_id: u32,
    pub pin: Option<u32>,
}

/// Static device identity, read during setup and pairing probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial: Option<String>,
}

impl DeviceIdentity {
    /// Human-facing title, e.g. `"Husqvarna Automower 305"`.
    pub fn title(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }
}

/// Capability interface to one mower protocol session.
///
/// Every method is a potentially-blocking radio operation; callers are
/// expected to bound each call with a timeout and to treat expiry like
/// any other link error.
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Open a session against a resolved device. A non-[`Ok`] result
    /// code (including an auth rejection) leaves the link disconnected.
    ///
    /// [`Ok`]: ResponseResult::Ok
    async fn connect(&self, device: DeviceHandle) -> Result<ResponseResult, LinkError>;

    /// Tear down the session. Safe to call when already disconnected.
    async fn disconnect(&self) -> Result<(), LinkError>;

    fn is_connected(&self) -> bool;

    // ── Field getters ───────────────────────────────────────────────

    /// Battery charge percentage, 0–100.
    async fn battery_level(&self) -> Result<u8, LinkError>;

    async fn is_charging(&self) -> Result<bool, LinkError>;

    async fn mode(&self) -> Result<MowerMode, LinkError>;

    async fn state(&self) -> Result<MowerState, LinkError>;

    async fn activity(&self) -> Result<MowerActivity, LinkError>;

    async fn error_code(&self) -> Result<MowerError, LinkError>;

    /// Next scheduled start, or `None` when nothing is scheduled.
    async fn next_start_time(&self) -> Result<Option<DateTime<Utc>>, LinkError>;

    /// Lifetime statistics counters keyed per [`crate::protocol::stats`].
    async fn statistics(&self) -> Result<BTreeMap<String, u64>, LinkError>;

    // ── Commands ────────────────────────────────────────────────────

    /// Issue a command verb over the open session.
    async fn send_command(&self, command: MowerCommand) -> Result<ResponseResult, LinkError>;

    // ── Identity ────────────────────────────────────────────────────

    /// Model and serial, read once at setup for device registration.
    async fn device_identity(&self) -> Result<DeviceIdentity, LinkError>;
}

/// Builds protocol sessions. Pairing generates a fresh channel id and
/// needs a link for it; embedders supply a factory backed by their
/// protocol crate.
pub trait LinkFactory: Send + Sync {
    fn create(&self, settings: LinkSettings) -> std::sync::Arc<dyn DeviceLink>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_title_joins_manufacturer_and_model() {
        let identity = DeviceIdentity {
            manufacturer: "Husqvarna".into(),
            model: "Automower 305".into(),
            serial: Some("123456".into()),
        };
        assert_eq!(identity.title(), "Husqvarna Automower 305");
    }
}
