// ── Pairing flow ──
//
// Config-flow analogue: validates user input, resolves and verifies a
// device, generates the persistent channel id, and emits the data a
// profile store persists. Every failure maps to a stable form-error
// key, so a host can re-render its setup form without string-matching
// error text.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, warn};

use mowerlink_link::{
    BleAddress, DeviceIdentity, Discovery, LinkError, LinkFactory, LinkSettings,
};

use crate::error::CoreError;

/// Raw user input to the pairing form.
#[derive(Debug, Clone, Default)]
pub struct PairingInput {
    pub address: String,
    /// PIN as typed; empty or absent means the device has no PIN.
    pub pin: Option<String>,
}

/// Pairing failure, one variant per user-facing form error.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("'{input}' is not a valid BLE address (expected XX:XX:XX:XX:XX:XX)")]
    InvalidAddressFormat { input: String },

    #[error("'{input}' is not a valid PIN (expected a non-negative integer)")]
    InvalidPinFormat { input: String },

    #[error("no device found at {address}")]
    DeviceNotFound { address: BleAddress },

    #[error("could not connect to device at {address}")]
    CannotConnect { address: BleAddress },

    #[error("device at {address} rejected the PIN")]
    InvalidAuth { address: BleAddress },

    #[error("unexpected pairing failure: {message}")]
    Unexpected { message: String },
}

impl PairingError {
    /// Stable key a setup form renders against.
    pub fn form_key(&self) -> &'static str {
        match self {
            Self::InvalidAddressFormat { .. } => "invalid_address_format",
            Self::InvalidPinFormat { .. } => "invalid_pin_format",
            Self::DeviceNotFound { .. } => "device_not_found",
            Self::CannotConnect { .. } => "cannot_connect",
            Self::InvalidAuth { .. } => "invalid_auth",
            Self::Unexpected { .. } => "exception",
        }
    }
}

/// Outcome of a successful pairing: everything a profile store needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedMower {
    pub address: BleAddress,
    pub pin: Option<u32>,
    /// Random 32-bit session id the device will associate the pairing
    /// with; persisted for the life of the entry.
    pub channel_id: u32,
    pub identity: DeviceIdentity,
    /// Human-facing entry title, e.g. `"Husqvarna Automower 305"`.
    pub title: String,
}

/// Validate the raw form input without touching the radio.
pub fn validate_input(input: &PairingInput) -> Result<(BleAddress, Option<u32>), PairingError> {
    let address =
        BleAddress::parse(&input.address).map_err(|e| PairingError::InvalidAddressFormat {
            input: e.input,
        })?;

    let pin = match input.pin.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| PairingError::InvalidPinFormat {
            input: raw.to_owned(),
        })?),
    };

    Ok((address, pin))
}

/// Generate the persistent channel id: any non-zero 32-bit value.
pub fn generate_channel_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..=u32::MAX)
}

/// Run the full pairing flow: validate, resolve, connect-verify,
/// read the device identity, disconnect.
pub async fn pair_device(
    discovery: &dyn Discovery,
    factory: &dyn LinkFactory,
    input: &PairingInput,
) -> Result<PairedMower, PairingError> {
    let (address, pin) = validate_input(input)?;

    let device = match discovery.resolve_connectable_device(&address).await {
        Ok(Some(device)) => device,
        Ok(None) => {
            error!(address = %address, "pairing: device not found");
            return Err(PairingError::DeviceNotFound { address });
        }
        Err(e) => {
            error!(error = %e, address = %address, "pairing: device resolution failed");
            return Err(PairingError::CannotConnect { address });
        }
    };

    let channel_id = generate_channel_id(&mut rand::thread_rng());
    debug!(address = %address, channel_id, "pairing: verifying connection");

    let link = factory.create(LinkSettings {
        address: address.clone(),
        channel_id,
        pin,
    });

    match link.connect(device).await {
        Ok(result) if result.is_ok() => {}
        Ok(result) if result.is_auth_rejection() => {
            error!(address = %address, %result, "pairing: device rejected the PIN");
            return Err(PairingError::InvalidAuth { address });
        }
        Ok(result) => {
            error!(address = %address, %result, "pairing: connect rejected");
            return Err(PairingError::CannotConnect { address });
        }
        Err(e @ (LinkError::Ble(_) | LinkError::Timeout(_))) => {
            error!(error = %e, address = %address, "pairing: connect failed");
            return Err(PairingError::CannotConnect { address });
        }
        Err(e) => {
            error!(error = %e, address = %address, "pairing: unexpected connect failure");
            return Err(PairingError::Unexpected {
                message: e.to_string(),
            });
        }
    }

    let identity = match link.device_identity().await {
        Ok(identity) => identity,
        Err(e) => {
            error!(error = %e, address = %address, "pairing: identity probe failed");
            if let Err(e) = link.disconnect().await {
                warn!(error = %e, "pairing: disconnect after failed probe also failed");
            }
            return Err(match e {
                LinkError::Ble(_) | LinkError::Timeout(_) => {
                    PairingError::CannotConnect { address }
                }
                other => PairingError::Unexpected {
                    message: other.to_string(),
                },
            });
        }
    };

    if let Err(e) = link.disconnect().await {
        warn!(error = %e, address = %address, "pairing: disconnect failed");
    }

    let title = identity.title();
    debug!(address = %address, title = %title, "pairing: verified");

    Ok(PairedMower {
        address,
        pin,
        channel_id,
        identity,
        title,
    })
}

impl From<CoreError> for PairingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeviceNotFound { address } => Self::DeviceNotFound { address },
            CoreError::ConnectRejected { address, result } if result.is_auth_rejection() => {
                Self::InvalidAuth { address }
            }
            CoreError::ConnectRejected { address, .. }
            | CoreError::ConnectFailed { address, .. } => Self::CannotConnect { address },
            other => Self::Unexpected {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validates_address_and_pin() {
        let input = PairingInput {
            address: "aa:bb:cc:dd:ee:ff".into(),
            pin: Some("1234".into()),
        };
        let (address, pin) = validate_input(&input).unwrap();
        assert_eq!(address.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(pin, Some(1234));
    }

    #[test]
    fn empty_pin_means_no_pin() {
        let input = PairingInput {
            address: "AA:BB:CC:DD:EE:FF".into(),
            pin: Some("  ".into()),
        };
        let (_, pin) = validate_input(&input).unwrap();
        assert_eq!(pin, None);
    }

    #[test]
    fn malformed_address_maps_to_form_key() {
        let input = PairingInput {
            address: "not-an-address".into(),
            pin: None,
        };
        let err = validate_input(&input).unwrap_err();
        assert_eq!(err.form_key(), "invalid_address_format");
    }

    #[test]
    fn negative_pin_maps_to_form_key() {
        let input = PairingInput {
            address: "AA:BB:CC:DD:EE:FF".into(),
            pin: Some("-4".into()),
        };
        let err = validate_input(&input).unwrap_err();
        assert_eq!(err.form_key(), "invalid_pin_format");
    }

    #[test]
    fn channel_id_is_never_zero() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            assert_ne!(generate_channel_id(&mut rng), 0);
        }
    }

    #[test]
    fn auth_rejection_translates_from_core_error() {
        let err = CoreError::ConnectRejected {
            address: BleAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(),
            result: mowerlink_link::ResponseResult::InvalidPin,
        };
        assert_eq!(PairingError::from(err).form_key(), "invalid_auth");
    }
}
