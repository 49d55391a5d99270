// ── Link-layer error type ──
//
// Failure modes at the device boundary: the BLE transport, timeouts
// wrapped around any link call, and session errors raised by the
// protocol backend. mowerlink-core maps these into its own taxonomy;
// consumers never see btleplug types directly.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the `mowerlink-link` crate.
#[derive(Debug, Error)]
pub enum LinkError {
    // ── Transport ───────────────────────────────────────────────────
    /// BLE transport error (adapter missing, connect refused, GATT I/O).
    #[error("BLE transport error: {0}")]
    Ble(#[from] btleplug::Error),

    /// A bounded link call did not complete in time. Treated the same
    /// as a transport error by callers.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// No BLE adapter is available on this host.
    #[error("no Bluetooth adapter available")]
    NoAdapter,

    // ── Session ─────────────────────────────────────────────────────
    /// A field read or command was attempted without an open session.
    #[error("device link is not connected")]
    NotConnected,

    /// Error raised inside the protocol backend's session handling.
    #[error("protocol session error: {message}")]
    Session { message: String },

    // ── GATT probing ────────────────────────────────────────────────
    /// A required GATT characteristic was not offered by the device.
    #[error("characteristic {uuid} not found on device")]
    CharacteristicNotFound { uuid: Uuid },
}

impl LinkError {
    /// Returns `true` for failures worth retrying on the next poll:
    /// radio hiccups and timeouts, as opposed to protocol/session bugs.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Ble(_) | Self::Timeout(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
