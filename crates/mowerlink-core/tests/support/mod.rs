// Scriptable test doubles for the device boundary: a `FakeLink` whose
// behavior is driven by a mutable plan, a `FakeDiscovery` that can be
// switched between resolving and not, and a `FakeFactory` recording the
// settings the pairing flow creates links with.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mowerlink_core::{
    BleAddress, DeviceHandle, DeviceIdentity, DeviceLink, Discovery, LinkError, LinkFactory,
    LinkSettings, MowerActivity, MowerCommand, MowerConfig, MowerError, MowerMode, MowerState,
    ResponseResult, stats,
};

pub const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

pub fn address() -> BleAddress {
    BleAddress::parse(ADDRESS).expect("test address is well-formed")
}

pub fn test_config() -> MowerConfig {
    MowerConfig::for_address(address(), 0x1234_5678, None)
}

// ── FakeLink ────────────────────────────────────────────────────────

/// Mutable script for the fake device.
pub struct FakePlan {
    pub connect_result: ResponseResult,
    /// Fail the connect attempt at the link layer instead of returning
    /// a result code.
    pub connect_error: bool,
    pub battery_level: u8,
    pub is_charging: bool,
    pub mode: MowerMode,
    pub state: MowerState,
    pub activity: MowerActivity,
    pub error: MowerError,
    pub next_start_time: Option<DateTime<Utc>>,
    pub statistics: BTreeMap<String, u64>,
    /// Fail every read once this many reads have succeeded.
    pub fail_after_reads: Option<usize>,
    pub command_result: ResponseResult,
    pub command_error: bool,
    /// Sleep inserted into every read, for concurrency observation.
    pub read_delay: Duration,
    pub identity: DeviceIdentity,
    pub identity_error: Option<fn() -> LinkError>,
}

impl Default for FakePlan {
    fn default() -> Self {
        let mut statistics = BTreeMap::new();
        statistics.insert(stats::TOTAL_RUNNING_TIME.to_owned(), 7200);
        statistics.insert(stats::TOTAL_CUTTING_TIME.to_owned(), 5400);

        Self {
            connect_result: ResponseResult::Ok,
            connect_error: false,
            battery_level: 55,
            is_charging: false,
            mode: MowerMode::MainArea,
            state: MowerState::InOperation,
            activity: MowerActivity::Mowing,
            error: MowerError::NoError,
            next_start_time: None,
            statistics,
            fail_after_reads: None,
            command_result: ResponseResult::Ok,
            command_error: false,
            read_delay: Duration::ZERO,
            identity: DeviceIdentity {
                manufacturer: "Husqvarna".into(),
                model: "Automower 305".into(),
                serial: Some("190200123".into()),
            },
            identity_error: None,
        }
    }
}

/// In-memory `DeviceLink` with call counters and a concurrency probe.
#[derive(Default)]
pub struct FakeLink {
    plan: Mutex<FakePlan>,
    connected: AtomicBool,
    reads: AtomicUsize,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub commands: Mutex<Vec<MowerCommand>>,
    active_ops: AtomicUsize,
    pub max_concurrent_ops: AtomicUsize,
}

impl FakeLink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_plan(plan: FakePlan) -> Arc<Self> {
        let link = Self::default();
        *link.plan.lock().expect("plan lock") = plan;
        Arc::new(link)
    }

    pub fn update_plan(&self, update: impl FnOnce(&mut FakePlan)) {
        update(&mut self.plan.lock().expect("plan lock"));
    }

    pub fn commands_sent(&self) -> Vec<MowerCommand> {
        self.commands.lock().expect("commands lock").clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrent_ops.load(Ordering::SeqCst)
    }

    fn begin_op(&self) -> OpGuard<'_> {
        let active = self.active_ops.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_ops.fetch_max(active, Ordering::SeqCst);
        OpGuard { link: self }
    }

    async fn read<T>(&self, value: impl FnOnce(&FakePlan) -> T) -> Result<T, LinkError> {
        let _op = self.begin_op();
        if !self.connected.load(Ordering::SeqCst) {
            return Err(LinkError::NotConnected);
        }

        let (delay, fail_after) = {
            let plan = self.plan.lock().expect("plan lock");
            (plan.read_delay, plan.fail_after_reads)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let done = self.reads.fetch_add(1, Ordering::SeqCst);
        if fail_after.is_some_and(|limit| done >= limit) {
            return Err(LinkError::Timeout(Duration::from_secs(1)));
        }

        Ok(value(&self.plan.lock().expect("plan lock")))
    }
}

struct OpGuard<'a> {
    link: &'a FakeLink,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.link.active_ops.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceLink for FakeLink {
    async fn connect(&self, _device: DeviceHandle) -> Result<ResponseResult, LinkError> {
        let _op = self.begin_op();
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let (error, result) = {
            let plan = self.plan.lock().expect("plan lock");
            (plan.connect_error, plan.connect_result)
        };
        if error {
            return Err(LinkError::Timeout(Duration::from_secs(1)));
        }
        if result.is_ok() {
            self.connected.store(true, Ordering::SeqCst);
        }
        Ok(result)
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        let _op = self.begin_op();
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn battery_level(&self) -> Result<u8, LinkError> {
        self.read(|plan| plan.battery_level).await
    }

    async fn is_charging(&self) -> Result<bool, LinkError> {
        self.read(|plan| plan.is_charging).await
    }

    async fn mode(&self) -> Result<MowerMode, LinkError> {
        self.read(|plan| plan.mode).await
    }

    async fn state(&self) -> Result<MowerState, LinkError> {
        self.read(|plan| plan.state).await
    }

    async fn activity(&self) -> Result<MowerActivity, LinkError> {
        self.read(|plan| plan.activity).await
    }

    async fn error_code(&self) -> Result<MowerError, LinkError> {
        self.read(|plan| plan.error).await
    }

    async fn next_start_time(&self) -> Result<Option<DateTime<Utc>>, LinkError> {
        self.read(|plan| plan.next_start_time).await
    }

    async fn statistics(&self) -> Result<BTreeMap<String, u64>, LinkError> {
        self.read(|plan| plan.statistics.clone()).await
    }

    async fn send_command(&self, command: MowerCommand) -> Result<ResponseResult, LinkError> {
        let _op = self.begin_op();
        if !self.connected.load(Ordering::SeqCst) {
            return Err(LinkError::NotConnected);
        }
        let (error, result) = {
            let plan = self.plan.lock().expect("plan lock");
            (plan.command_error, plan.command_result)
        };
        if error {
            return Err(LinkError::Timeout(Duration::from_secs(1)));
        }
        self.commands
            .lock()
            .expect("commands lock")
            .push(command);
        Ok(result)
    }

    async fn device_identity(&self) -> Result<DeviceIdentity, LinkError> {
        let _op = self.begin_op();
        let plan = self.plan.lock().expect("plan lock");
        if let Some(make_error) = plan.identity_error {
            return Err(make_error());
        }
        Ok(plan.identity.clone())
    }
}

// ── FakeDiscovery ───────────────────────────────────────────────────

pub struct FakeDiscovery {
    resolves: AtomicBool,
    pub resolve_calls: AtomicUsize,
}

impl FakeDiscovery {
    pub fn resolving() -> Arc<Self> {
        Arc::new(Self {
            resolves: AtomicBool::new(true),
            resolve_calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            resolves: AtomicBool::new(false),
            resolve_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_resolves(&self, resolves: bool) {
        self.resolves.store(resolves, Ordering::SeqCst);
    }
}

#[async_trait]
impl Discovery for FakeDiscovery {
    async fn resolve_connectable_device(
        &self,
        address: &BleAddress,
    ) -> Result<Option<DeviceHandle>, LinkError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.resolves.load(Ordering::SeqCst) {
            Ok(Some(DeviceHandle::from_address(address.clone())))
        } else {
            Ok(None)
        }
    }
}

// ── FakeFactory ─────────────────────────────────────────────────────

pub struct FakeFactory {
    pub link: Arc<FakeLink>,
    pub last_settings: Mutex<Option<LinkSettings>>,
}

impl FakeFactory {
    pub fn new(link: Arc<FakeLink>) -> Self {
        Self {
            link,
            last_settings: Mutex::new(None),
        }
    }

    pub fn created_settings(&self) -> Option<LinkSettings> {
        self.last_settings.lock().expect("settings lock").clone()
    }
}

impl LinkFactory for FakeFactory {
    fn create(&self, settings: LinkSettings) -> Arc<dyn DeviceLink> {
        *self.last_settings.lock().expect("settings lock") = Some(settings);
        Arc::clone(&self.link) as Arc<dyn DeviceLink>
    }
}
