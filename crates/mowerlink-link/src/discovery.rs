// ── Device discovery and GATT probing ──
//
// Resolution strategy mirrors the platform-cache-then-scan fallback the
// coordinator expects: look for the address among peripherals the
// adapter already knows, and only if that misses run an active scan.
// The Device Information Service probe reads standard GATT
// characteristics only -- the proprietary protocol stays behind
// `DeviceLink`.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central as _, Manager as _, Peripheral as _, ScanFilter, bleuuid::uuid_from_u16,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tracing::{debug, warn};
use uuid::{Uuid, uuid};

use crate::address::BleAddress;
use crate::error::LinkError;
use crate::session::DeviceIdentity;

/// Bluetooth SIG company identifier for Husqvarna AB.
pub const HUSQVARNA_MANUFACTURER_ID: u16 = 1062;

/// Primary GATT service advertised by Automower devices.
pub const MOWER_SERVICE_UUID: Uuid = uuid!("98bd0001-0b0e-421a-84e5-ddbf75dc6de4");

// Device Information Service characteristics used by the probe.
const DIS_MANUFACTURER_NAME: Uuid = uuid_from_u16(0x2A29);
const DIS_MODEL_NUMBER: Uuid = uuid_from_u16(0x2A24);
const DIS_SERIAL_NUMBER: Uuid = uuid_from_u16(0x2A25);

/// How long the scan fallback listens before giving up on an address.
const RESOLVE_SCAN_WINDOW: Duration = Duration::from_secs(10);

// ── Advertisement matching ──────────────────────────────────────────

/// One observed BLE advertisement, reduced to the fields the matcher
/// and the `scan` command care about.
#[derive(Debug, Clone)]
pub struct Advertisement {
    pub address: BleAddress,
    pub local_name: Option<String>,
    pub rssi: Option<i16>,
    pub manufacturer_ids: Vec<u16>,
    pub service_uuids: Vec<Uuid>,
}

/// Decide whether an advertising device is a supported mower: the
/// Husqvarna manufacturer id AND the mower service must both be present.
pub fn is_supported_mower(adv: &Advertisement) -> bool {
    let manufacturer = adv
        .manufacturer_ids
        .iter()
        .any(|id| *id == HUSQVARNA_MANUFACTURER_ID);
    let service = adv.service_uuids.iter().any(|s| *s == MOWER_SERVICE_UUID);
    manufacturer && service
}

// ── Device handle ───────────────────────────────────────────────────

/// A connectable device resolved by a [`Discovery`] implementation and
/// handed to [`DeviceLink::connect`](crate::session::DeviceLink::connect).
///
/// Detached handles (address only) exist so tests and embedders with
/// their own transport can construct one without a live adapter.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    address: BleAddress,
    peripheral: Option<Peripheral>,
}

impl DeviceHandle {
    /// Handle backed by a live btleplug peripheral.
    pub fn new(address: BleAddress, peripheral: Peripheral) -> Self {
        Self {
            address,
            peripheral: Some(peripheral),
        }
    }

    /// Detached handle carrying only the address.
    pub fn from_address(address: BleAddress) -> Self {
        Self {
            address,
            peripheral: None,
        }
    }

    pub fn address(&self) -> &BleAddress {
        &self.address
    }

    pub fn peripheral(&self) -> Option<&Peripheral> {
        self.peripheral.as_ref()
    }
}

// ── Discovery capability ────────────────────────────────────────────

/// Address-to-device resolution capability consumed by the coordinator
/// and the pairing flow.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Resolve a hardware address to a connectable handle, or `None`
    /// when the device is not reachable right now.
    async fn resolve_connectable_device(
        &self,
        address: &BleAddress,
    ) -> Result<Option<DeviceHandle>, LinkError>;
}

/// btleplug-backed [`Discovery`] over the host's first BLE adapter.
pub struct BleDiscovery {
    adapter: Adapter,
}

impl BleDiscovery {
    /// Open the first available adapter.
    pub async fn new() -> Result<Self, LinkError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(LinkError::NoAdapter)?;
        Ok(Self { adapter })
    }

    /// Look for the address among peripherals the adapter already knows
    /// about, without scanning.
    async fn known_peripheral(
        &self,
        address: &BleAddress,
    ) -> Result<Option<Peripheral>, LinkError> {
        for peripheral in self.adapter.peripherals().await? {
            if peripheral.address().to_string().eq_ignore_ascii_case(address.as_str()) {
                return Ok(Some(peripheral));
            }
        }
        Ok(None)
    }

    /// Actively scan and report every advertising device, flagging the
    /// supported mowers. Used by the CLI `scan` command.
    pub async fn scan_for_mowers(
        &self,
        window: Duration,
    ) -> Result<Vec<Advertisement>, LinkError> {
        self.adapter.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(window).await;

        let mut found = Vec::new();
        for peripheral in self.adapter.peripherals().await? {
            let Ok(address) = BleAddress::parse(&peripheral.address().to_string()) else {
                continue;
            };
            let properties = peripheral.properties().await?;
            let Some(props) = properties else { continue };
            found.push(Advertisement {
                address,
                local_name: props.local_name,
                rssi: props.rssi,
                manufacturer_ids: props.manufacturer_data.keys().copied().collect(),
                service_uuids: props.services,
            });
        }

        if let Err(e) = self.adapter.stop_scan().await {
            warn!(error = %e, "failed to stop BLE scan");
        }
        Ok(found)
    }

    /// Read the standard Device Information Service off a resolved
    /// device: connect, read, always disconnect -- even on error.
    pub async fn probe_device_info(
        &self,
        handle: &DeviceHandle,
    ) -> Result<DeviceIdentity, LinkError> {
        let Some(peripheral) = handle.peripheral() else {
            return Err(LinkError::NotConnected);
        };

        peripheral.connect().await?;
        let result = Self::read_device_info(peripheral).await;
        if let Err(e) = peripheral.disconnect().await {
            warn!(error = %e, address = %handle.address(), "failed to disconnect after probe");
        }
        result
    }

    async fn read_device_info(peripheral: &Peripheral) -> Result<DeviceIdentity, LinkError> {
        peripheral.discover_services().await?;

        let manufacturer = Self::read_string_characteristic(peripheral, DIS_MANUFACTURER_NAME)
            .await?
            .ok_or(LinkError::CharacteristicNotFound {
                uuid: DIS_MANUFACTURER_NAME,
            })?;
        let model = Self::read_string_characteristic(peripheral, DIS_MODEL_NUMBER)
            .await?
            .ok_or(LinkError::CharacteristicNotFound {
                uuid: DIS_MODEL_NUMBER,
            })?;
        // Serial is optional: not every firmware exposes it.
        let serial = Self::read_string_characteristic(peripheral, DIS_SERIAL_NUMBER).await?;

        Ok(DeviceIdentity {
            manufacturer,
            model,
            serial,
        })
    }

    async fn read_string_characteristic(
        peripheral: &Peripheral,
        uuid: Uuid,
    ) -> Result<Option<String>, LinkError> {
        let Some(characteristic) = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
        else {
            return Ok(None);
        };

        let raw = peripheral.read(&characteristic).await?;
        let text = String::from_utf8_lossy(&raw)
            .trim_end_matches('\0')
            .trim()
            .to_owned();
        Ok(Some(text))
    }
}

#[async_trait]
impl Discovery for BleDiscovery {
    async fn resolve_connectable_device(
        &self,
        address: &BleAddress,
    ) -> Result<Option<DeviceHandle>, LinkError> {
        // Fast path: the adapter has already seen this address.
        if let Some(peripheral) = self.known_peripheral(address).await? {
            debug!(address = %address, "resolved device from adapter cache");
            return Ok(Some(DeviceHandle::new(address.clone(), peripheral)));
        }

        // Fallback: active scan for the address.
        debug!(address = %address, "device not cached, scanning");
        self.adapter.start_scan(ScanFilter::default()).await?;
        let deadline = tokio::time::Instant::now() + RESOLVE_SCAN_WINDOW;
        let found = loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            if let Some(peripheral) = self.known_peripheral(address).await? {
                break Some(peripheral);
            }
            if tokio::time::Instant::now() >= deadline {
                break None;
            }
        };
        if let Err(e) = self.adapter.stop_scan().await {
            warn!(error = %e, "failed to stop BLE scan");
        }

        Ok(found.map(|peripheral| DeviceHandle::new(address.clone(), peripheral)))
    }
}
