// ── Lawn-mower entity ──

use tracing::debug;

use mowerlink_link::MowerCommand;

use crate::activity::{DisplayActivity, derive_activity};
use crate::coordinator::Coordinator;
use crate::entity::DeviceInfo;
use crate::error::CoreError;

/// The single lawn-mower entity of one mower.
///
/// Exposes the derived display activity plus the command verbs a host
/// framework's lawn-mower domain expects. All commands run through the
/// coordinator's command-plus-refresh cycle.
pub struct LawnMowerEntity {
    coordinator: Coordinator,
    device: DeviceInfo,
    unique_id: String,
}

impl LawnMowerEntity {
    pub fn new(coordinator: Coordinator, device: DeviceInfo) -> Self {
        let unique_id = format!(
            "automower_{}_{}",
            device.model.to_lowercase().replace(' ', "_"),
            device.address
        );
        Self {
            coordinator,
            device,
            unique_id,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.device.model
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    /// Current derived activity, or `None` before the first snapshot.
    pub fn activity(&self) -> Option<DisplayActivity> {
        let snapshot = self.coordinator.snapshot()?;
        derive_activity(Some(snapshot.state), Some(snapshot.activity))
    }

    /// Availability is the triple condition: a snapshot exists, the
    /// derived activity is concrete, and the last successful poll is
    /// inside the staleness window. Never cached.
    pub fn available(&self) -> bool {
        self.activity().is_some() && self.coordinator.is_fresh()
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Start mowing. A docked mower additionally needs a schedule
    /// override or it would stay in the station until the next
    /// scheduled window.
    pub async fn start_mowing(&self) -> Result<(), CoreError> {
        debug!("starting mower");
        let commands: &[MowerCommand] = if self.activity() == Some(DisplayActivity::Docked) {
            &[MowerCommand::Resume, MowerCommand::OverrideSchedule]
        } else {
            &[MowerCommand::Resume]
        };
        self.coordinator.execute_with_refresh(commands).await?;
        Ok(())
    }

    /// Pause wherever the mower currently is.
    pub async fn pause(&self) -> Result<(), CoreError> {
        debug!("pausing mower");
        self.coordinator
            .execute_command_with_refresh(MowerCommand::Pause)
            .await?;
        Ok(())
    }

    /// Send the mower back to the charging station.
    pub async fn dock(&self) -> Result<(), CoreError> {
        debug!("docking mower");
        self.coordinator
            .execute_command_with_refresh(MowerCommand::Park)
            .await?;
        Ok(())
    }

    /// Park until further notice, ignoring the schedule.
    pub async fn park_indefinitely(&self) -> Result<(), CoreError> {
        debug!("parking mower indefinitely");
        self.coordinator
            .execute_command_with_refresh(MowerCommand::ParkIndefinitely)
            .await?;
        Ok(())
    }

    /// Return to automatic schedule operation.
    pub async fn resume_schedule(&self) -> Result<(), CoreError> {
        debug!("resuming mower schedule");
        self.coordinator
            .execute_command_with_refresh(MowerCommand::Auto)
            .await?;
        Ok(())
    }
}
