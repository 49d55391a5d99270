// ── Runtime coordinator configuration ──
//
// Describes one mower and the coordinator's timing behavior. Carries
// pairing data and tuning, but never touches disk -- the CLI or an
// embedding bridge builds a `MowerConfig` from a persisted profile and
// hands it in.

use std::time::Duration;

use mowerlink_link::{BleAddress, LinkSettings};

/// Configuration for one mower's coordinator.
#[derive(Debug, Clone)]
pub struct MowerConfig {
    /// BLE hardware address of the mower.
    pub address: BleAddress,
    /// Random 32-bit channel id generated at pairing time.
    pub channel_id: u32,
    /// Operator PIN; `None` means the device is not PIN-protected.
    pub pin: Option<u32>,
    /// How often the poll timer fires. Zero disables the timer
    /// (on-demand refresh only).
    pub poll_interval: Duration,
    /// Pause between a command write and the forced refresh, so the
    /// device has processed the command before the next read.
    pub settle_delay: Duration,
    /// Maximum age of the last successful poll for which entity data
    /// is considered available.
    pub staleness_window: Duration,
    /// Upper bound applied to every individual device-link call.
    pub link_timeout: Duration,
}

impl MowerConfig {
    /// Link identity for this mower (address, channel id, PIN).
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            address: self.address.clone(),
            channel_id: self.channel_id,
            pin: self.pin,
        }
    }

    /// Defaults for everything except identity.
    pub fn for_address(address: BleAddress, channel_id: u32, pin: Option<u32>) -> Self {
        Self {
            address,
            channel_id,
            pin,
            poll_interval: Duration::from_secs(60),
            settle_delay: Duration::from_secs(2),
            staleness_window: Duration::from_secs(12 * 60),
            link_timeout: Duration::from_secs(30),
        }
    }
}
