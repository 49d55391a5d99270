// mowerlink-link: device boundary between mowerlink and the mower itself.
//
// Everything that touches a radio or speaks for one lives here: the BLE
// address type, the decoded protocol field enums, the `DeviceLink`
// capability trait implemented by an external protocol backend, and the
// btleplug-backed `Discovery` used to resolve and probe devices.

pub mod address;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use address::{AddressParseError, BleAddress};
pub use discovery::{
    Advertisement, BleDiscovery, DeviceHandle, Discovery, HUSQVARNA_MANUFACTURER_ID,
    MOWER_SERVICE_UUID, is_supported_mower,
};
pub use error::LinkError;
pub use protocol::{
    MowerActivity, MowerCommand, MowerError, MowerMode, MowerState, ResponseResult, stats,
};
pub use session::{DeviceIdentity, DeviceLink, LinkFactory, LinkSettings};
