// ── Core error taxonomy ──
//
// User-facing failures from mowerlink-core. Consumers never see
// btleplug or protocol-session errors directly; `From<LinkError>` and
// the per-operation constructors translate boundary errors into the
// four categories the coordinator signals upward.

use thiserror::Error;

use mowerlink_link::{BleAddress, LinkError, MowerCommand, ResponseResult};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// Discovery could not resolve the address to a connectable device.
    #[error("cannot find device {address}")]
    DeviceNotFound { address: BleAddress },

    /// The device answered the connect attempt with a non-OK result
    /// code. Auth rejections land here and are surfaced distinctly to
    /// the pairing flow; steady-state polling treats them like any
    /// other connect failure.
    #[error("device {address} rejected connection: {result}")]
    ConnectRejected {
        address: BleAddress,
        result: ResponseResult,
    },

    /// The connect attempt itself failed at the link layer.
    #[error("failed to connect to device {address}")]
    ConnectFailed {
        address: BleAddress,
        #[source]
        source: LinkError,
    },

    // ── Poll errors ──────────────────────────────────────────────────
    /// A field read failed mid-poll; the poll is aborted and no
    /// snapshot is published.
    #[error("reading {field} from device failed")]
    ReadFailed {
        field: &'static str,
        #[source]
        source: LinkError,
    },

    // ── Command errors ───────────────────────────────────────────────
    /// The device answered a command with a non-OK result code.
    #[error("device rejected command {command}: {result}")]
    CommandRejected {
        command: MowerCommand,
        result: ResponseResult,
    },

    /// A command write failed at the link layer.
    #[error("command {command} failed")]
    CommandFailed {
        command: MowerCommand,
        #[source]
        source: LinkError,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    /// The coordinator is shutting down; no further polls are accepted.
    #[error("coordinator is shutting down")]
    ShuttingDown,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl CoreError {
    /// Returns `true` when the failure is an explicit auth rejection
    /// (wrong PIN / session not allowed) rather than a radio problem.
    pub fn is_auth_rejection(&self) -> bool {
        match self {
            Self::ConnectRejected { result, .. } => result.is_auth_rejection(),
            _ => false,
        }
    }

    /// Returns `true` for failures a later poll may recover from
    /// without operator intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DeviceNotFound { .. } => true,
            Self::ConnectFailed { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::CommandFailed { source, .. } => source.is_transient(),
            Self::ConnectRejected { result, .. } => !result.is_auth_rejection(),
            Self::CommandRejected { .. } | Self::ShuttingDown | Self::Unexpected(_) => false,
        }
    }
}
