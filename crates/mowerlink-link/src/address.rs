// ── BLE hardware address ──
//
// Strict `XX:XX:XX:XX:XX:XX` parsing. The pairing flow must tell a
// malformed address apart from a missing device, so unlike a permissive
// MAC helper this type rejects anything that isn't six colon-separated
// hex octets. Normalized to uppercase, matching btleplug's `BDAddr`
// rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A malformed BLE address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid BLE address '{input}': expected XX:XX:XX:XX:XX:XX")]
pub struct AddressParseError {
    pub input: String,
}

/// BLE hardware address of a mower, normalized to uppercase
/// colon-separated form (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BleAddress(String);

impl BleAddress {
    /// Parse and normalize an address string.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let candidate = raw.trim();
        let octets: Vec<&str> = candidate.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));

        if !well_formed {
            return Err(AddressParseError {
                input: raw.to_owned(),
            });
        }

        Ok(Self(candidate.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BleAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<BleAddress> for String {
    fn from(addr: BleAddress) -> Self {
        addr.0
    }
}

impl TryFrom<String> for BleAddress {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}
