// ── Polling coordinator ──
//
// Maintains a best-effort, periodically refreshed view of one mower
// while minimizing connection hold time: the BLE radio is a shared
// resource, so the link is released after every poll unless a command
// is mid-flight. One coordinator owns one `DeviceLink`; all operations
// against it are serialized through `poll_lock` because the session is
// not safe for concurrent use.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use mowerlink_link::{DeviceIdentity, DeviceLink, Discovery, LinkError, MowerCommand};

use crate::config::MowerConfig;
use crate::error::CoreError;
use crate::snapshot::Snapshot;
use crate::stream::SnapshotStream;

/// Timestamp pair recorded on every successful poll: a monotonic
/// instant for staleness arithmetic and a wall clock for display.
#[derive(Debug, Clone, Copy)]
struct PollStamp {
    instant: Instant,
    wall: DateTime<Utc>,
}

/// Clears the command-in-flight flag on every exit path, including
/// early returns and unwinds.
struct CommandFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CommandFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for CommandFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Each paired mower gets exactly one
/// coordinator, created and owned by whoever set the entry up -- there
/// is no ambient registry. Entities hold clones.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: MowerConfig,
    link: Arc<dyn DeviceLink>,
    discovery: Arc<dyn Discovery>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    last_success: watch::Sender<Option<PollStamp>>,
    /// Serializes polls and command writes -- the device link is a
    /// single stateful session.
    poll_lock: Mutex<()>,
    /// True while a command-plus-refresh cycle runs; gates the
    /// disconnect-on-idle tail so a command's session isn't torn down
    /// by a concurrently finishing poll.
    command_in_flight: AtomicBool,
    cancel: CancellationToken,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Does not connect and does not start the
    /// poll timer -- call [`initialize`](Self::initialize) and
    /// [`start`](Self::start).
    pub fn new(
        config: MowerConfig,
        link: Arc<dyn DeviceLink>,
        discovery: Arc<dyn Discovery>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (last_success, _) = watch::channel(None);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                link,
                discovery,
                snapshot_tx,
                last_success,
                poll_lock: Mutex::new(()),
                command_in_flight: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                poll_task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &MowerConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// First contact with the device: connect, read its identity, and
    /// run the first poll. Failures here mean "not ready, retry later"
    /// -- BLE devices are often transiently unreachable.
    pub async fn initialize(&self) -> Result<(DeviceIdentity, Arc<Snapshot>), CoreError> {
        let _poll = self.inner.poll_lock.lock().await;
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShuttingDown);
        }

        let outcome = async {
            if !self.inner.link.is_connected() {
                self.ensure_connected().await?;
            }
            let identity = self
                .bounded_read("device_identity", self.inner.link.device_identity())
                .await?;
            let snapshot = self.poll_fields().await?;
            Ok((identity, snapshot))
        }
        .await;

        self.release_link_if_idle().await;

        match outcome {
            Ok((identity, snapshot)) => {
                debug!(model = %identity.model, "initialized coordinator");
                Ok((identity, self.publish(snapshot)))
            }
            Err(e) => {
                warn!(error = %e, "coordinator initialization failed");
                Err(e)
            }
        }
    }

    /// Start the periodic poll timer. A zero poll interval leaves the
    /// coordinator on-demand only. Calling twice is a no-op.
    pub async fn start(&self) {
        if self.inner.config.poll_interval.is_zero() {
            return;
        }
        let mut task = self.inner.poll_task.lock().await;
        if task.is_some() {
            return;
        }
        let coordinator = self.clone();
        let period = self.inner.config.poll_interval;
        let cancel = self.inner.cancel.clone();
        *task = Some(tokio::spawn(refresh_task(coordinator, period, cancel)));
    }

    /// Cancel the poll timer and release the device link. Idempotent;
    /// waits out any in-flight poll so teardown is bounded by one poll.
    pub async fn shutdown(&self) {
        debug!("shutting down coordinator");
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.poll_task.lock().await.take() {
            let _ = handle.await;
        }

        let _poll = self.inner.poll_lock.lock().await;
        if self.inner.link.is_connected() {
            if let Err(e) = self.inner.link.disconnect().await {
                warn!(error = %e, "disconnect during shutdown failed");
            }
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Poll the device for a fresh snapshot.
    ///
    /// Serialized per coordinator: a concurrent caller waits for the
    /// in-flight poll to finish. The snapshot is published only when
    /// every field read succeeds; any failure aborts the poll and the
    /// previous snapshot stays in place. The link is released
    /// afterwards unless a command is mid-flight.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let _poll = self.inner.poll_lock.lock().await;
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShuttingDown);
        }

        debug!("polling device");
        let outcome = async {
            if !self.inner.link.is_connected() {
                self.ensure_connected().await?;
            }
            self.poll_fields().await
        }
        .await;

        self.release_link_if_idle().await;

        match outcome {
            Ok(snapshot) => Ok(self.publish(snapshot)),
            Err(e) => {
                warn!(error = %e, "poll failed");
                Err(e)
            }
        }
    }

    /// Fire-and-forget refresh for callers that only care about the
    /// published snapshot (entities, the poll timer).
    pub async fn request_refresh(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "requested refresh failed");
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Issue one command, wait the settle delay, then force a refresh.
    pub async fn execute_command_with_refresh(
        &self,
        command: MowerCommand,
    ) -> Result<Arc<Snapshot>, CoreError> {
        self.execute_with_refresh(std::slice::from_ref(&command))
            .await
    }

    /// Issue a short command sequence over one session, wait the settle
    /// delay, then force a refresh.
    ///
    /// The in-flight flag is set for the whole cycle and cleared on
    /// every exit path, so a concurrently finishing poll never tears
    /// down the session a command is still using.
    pub async fn execute_with_refresh(
        &self,
        commands: &[MowerCommand],
    ) -> Result<Arc<Snapshot>, CoreError> {
        let _flight = CommandFlight::begin(&self.inner.command_in_flight);

        {
            let _poll = self.inner.poll_lock.lock().await;
            if self.inner.cancel.is_cancelled() {
                return Err(CoreError::ShuttingDown);
            }
            if !self.inner.link.is_connected() {
                self.ensure_connected().await?;
            }
            for &command in commands {
                debug!(%command, "issuing command");
                self.send_command(command).await?;
            }
        }

        // Give the device time to act on the command before reading
        // state back.
        tokio::time::sleep(self.inner.config.settle_delay).await;
        self.refresh().await
    }

    // ── State observation ────────────────────────────────────────────

    /// Latest published snapshot, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Subscribe as a [`SnapshotStream`] for `StreamExt` combinators.
    pub fn snapshot_stream(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.snapshot_tx.subscribe())
    }

    /// Wall-clock time of the last successful poll.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.inner.last_success.borrow().map(|stamp| stamp.wall)
    }

    /// Whether the last successful poll is within the staleness
    /// window. Exactly at the boundary counts as stale. Re-evaluated on
    /// every call, never cached.
    pub fn is_fresh(&self) -> bool {
        self.inner
            .last_success
            .borrow()
            .is_some_and(|stamp| stamp.instant.elapsed() < self.inner.config.staleness_window)
    }

    /// Whether a command-plus-refresh cycle is currently running.
    pub fn command_in_flight(&self) -> bool {
        self.inner.command_in_flight.load(Ordering::SeqCst)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Resolve the device and open the protocol session.
    ///
    /// Resolution failure and connect failure are distinct for
    /// diagnostics, but both abort the poll.
    async fn ensure_connected(&self) -> Result<(), CoreError> {
        let address = self.inner.config.address.clone();
        let timeout = self.inner.config.link_timeout;

        let resolved = match tokio::time::timeout(
            timeout,
            self.inner.discovery.resolve_connectable_device(&address),
        )
        .await
        {
            Ok(Ok(device)) => device,
            Ok(Err(e)) => {
                error!(error = %e, address = %address, "device resolution failed");
                None
            }
            Err(_) => {
                error!(address = %address, "device resolution timed out");
                None
            }
        };
        let Some(device) = resolved else {
            return Err(CoreError::DeviceNotFound { address });
        };

        match tokio::time::timeout(timeout, self.inner.link.connect(device)).await {
            Ok(Ok(result)) if result.is_ok() => {
                debug!(address = %address, "device link connected");
                Ok(())
            }
            Ok(Ok(result)) => Err(CoreError::ConnectRejected { address, result }),
            Ok(Err(source)) => Err(CoreError::ConnectFailed { address, source }),
            Err(_) => Err(CoreError::ConnectFailed {
                address,
                source: LinkError::Timeout(timeout),
            }),
        }
    }

    /// Read the full field set sequentially. Any failure aborts the
    /// poll -- there is no partial snapshot.
    async fn poll_fields(&self) -> Result<Snapshot, CoreError> {
        let link = &self.inner.link;

        let battery_level = self
            .bounded_read("battery_level", link.battery_level())
            .await?;
        let is_charging = self.bounded_read("is_charging", link.is_charging()).await?;
        let mode = self.bounded_read("mode", link.mode()).await?;
        let state = self.bounded_read("state", link.state()).await?;
        let activity = self.bounded_read("activity", link.activity()).await?;
        let error = self.bounded_read("error", link.error_code()).await?;
        let next_start_time = self
            .bounded_read("next_start_time", link.next_start_time())
            .await?;
        let statistics = self.bounded_read("statistics", link.statistics()).await?;

        Ok(Snapshot {
            battery_level,
            is_charging,
            mode,
            state,
            activity,
            error,
            next_start_time,
            statistics,
        })
    }

    /// Bound a single link call by the configured timeout; expiry is a
    /// link error like any other.
    async fn bounded_read<T>(
        &self,
        field: &'static str,
        read: impl Future<Output = Result<T, LinkError>> + Send,
    ) -> Result<T, CoreError> {
        let timeout = self.inner.config.link_timeout;
        match tokio::time::timeout(timeout, read).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(CoreError::ReadFailed { field, source }),
            Err(_) => Err(CoreError::ReadFailed {
                field,
                source: LinkError::Timeout(timeout),
            }),
        }
    }

    async fn send_command(&self, command: MowerCommand) -> Result<(), CoreError> {
        let timeout = self.inner.config.link_timeout;
        let result = match tokio::time::timeout(timeout, self.inner.link.send_command(command))
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => return Err(CoreError::CommandFailed { command, source }),
            Err(_) => {
                return Err(CoreError::CommandFailed {
                    command,
                    source: LinkError::Timeout(timeout),
                });
            }
        };
        if result.is_ok() {
            Ok(())
        } else {
            Err(CoreError::CommandRejected { command, result })
        }
    }

    /// Release the radio unless a command still needs the session.
    async fn release_link_if_idle(&self) {
        if self.inner.command_in_flight.load(Ordering::SeqCst) {
            return;
        }
        if self.inner.link.is_connected() {
            if let Err(e) = self.inner.link.disconnect().await {
                warn!(error = %e, "failed to release device link after poll");
            }
        }
    }

    fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let published = Arc::clone(&snapshot);
        self.inner
            .snapshot_tx
            .send_modify(|current| *current = Some(published));
        self.inner.last_success.send_modify(|stamp| {
            *stamp = Some(PollStamp {
                instant: Instant::now(),
                wall: Utc::now(),
            });
        });
        debug!(battery = snapshot.battery_level, state = %snapshot.state, "published snapshot");
        snapshot
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
