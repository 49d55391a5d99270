use thiserror::Error;

use mowerlink_config::ConfigError;
use mowerlink_core::LinkError;
use mowerlink_core::pairing::PairingError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Link(#[from] LinkError),

    #[error("{0}")]
    Pairing(#[from] PairingError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device found at {address}")]
    DeviceNotFound { address: String },
}

impl CliError {
    /// Shell exit code: usage/validation problems get 2, everything
    /// else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::Pairing(e)
                if matches!(
                    e,
                    PairingError::InvalidAddressFormat { .. }
                        | PairingError::InvalidPinFormat { .. }
                ) =>
            {
                2
            }
            _ => 1,
        }
    }
}
