// ── Decoded protocol field types ──
//
// The wire protocol itself is owned by the external backend; what
// crosses the `DeviceLink` boundary are raw `u8` codes. Each field gets
// a total decode function: every code maps to a variant, unknown codes
// land in an explicit `Unknown(u8)` instead of panicking or being
// string-matched downstream.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Statistics map keys published by the protocol backend.
///
/// The sensor table consumes a subset of these; the full map is carried
/// through the snapshot untouched.
pub mod stats {
    pub const TOTAL_RUNNING_TIME: &str = "totalRunningTime";
    pub const TOTAL_CUTTING_TIME: &str = "totalCuttingTime";
    pub const TOTAL_CHARGING_TIME: &str = "totalChargingTime";
    pub const TOTAL_SEARCHING_TIME: &str = "totalSearchingTime";
    pub const NUMBER_OF_COLLISIONS: &str = "numberOfCollisions";
    pub const NUMBER_OF_CHARGING_CYCLES: &str = "numberOfChargingCycles";
    pub const REMAINING_CHARGING_TIME: &str = "remainingChargingTime";
}

/// Result code returned by the device for connect attempts and commands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ResponseResult {
    Ok,
    Error,
    /// The PIN sent during the auth handshake was rejected.
    InvalidPin,
    /// The device refused the operation (wrong operator state).
    NotAllowed,
    InvalidState,
    Busy,
    Unknown(u8),
}

impl ResponseResult {
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::InvalidPin,
            3 => Self::NotAllowed,
            4 => Self::InvalidState,
            5 => Self::Busy,
            other => Self::Unknown(other),
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Codes that indicate a rejected PIN / disallowed session rather
    /// than a radio problem. Pairing surfaces these as `invalid_auth`.
    pub fn is_auth_rejection(self) -> bool {
        matches!(self, Self::InvalidPin | Self::NotAllowed)
    }
}

/// Top-level operating state of the mower.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MowerState {
    Off,
    WaitForSafetyPin,
    Stopped,
    FatalError,
    PendingStart,
    Paused,
    InOperation,
    Restricted,
    Error,
    Unknown(u8),
}

impl MowerState {
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::Off,
            1 => Self::WaitForSafetyPin,
            2 => Self::Stopped,
            3 => Self::FatalError,
            4 => Self::PendingStart,
            5 => Self::Paused,
            6 => Self::InOperation,
            7 => Self::Restricted,
            8 => Self::Error,
            other => Self::Unknown(other),
        }
    }
}

/// What the mower is physically doing right now.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MowerActivity {
    None,
    Charging,
    GoingOut,
    Mowing,
    GoingHome,
    Parked,
    StoppedInGarden,
    Unknown(u8),
}

impl MowerActivity {
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Charging,
            2 => Self::GoingOut,
            3 => Self::Mowing,
            4 => Self::GoingHome,
            5 => Self::Parked,
            6 => Self::StoppedInGarden,
            other => Self::Unknown(other),
        }
    }
}

/// Configured mode of operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MowerMode {
    MainArea,
    SecondaryArea,
    Home,
    Demo,
    Unknown(u8),
}

impl MowerMode {
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::MainArea,
            1 => Self::SecondaryArea,
            2 => Self::Home,
            3 => Self::Demo,
            other => Self::Unknown(other),
        }
    }
}

/// Device error register. Only the codes the entity layer cares to name
/// get variants; everything else is carried through as `Unknown`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MowerError {
    NoError,
    OutsideWorkingArea,
    NoLoopSignal,
    WrongLoopSignal,
    LoopSensorProblemFront,
    LoopSensorProblemRear,
    Trapped,
    UpsideDown,
    LowBattery,
    BatteryEmpty,
    NoDrive,
    LiftedUp,
    WrongPinCode,
    CollisionSensorProblem,
    ChargingStationBlocked,
    Unknown(u8),
}

impl MowerError {
    pub fn from_raw(code: u8) -> Self {
        match code {
            0 => Self::NoError,
            1 => Self::OutsideWorkingArea,
            2 => Self::NoLoopSignal,
            3 => Self::WrongLoopSignal,
            4 => Self::LoopSensorProblemFront,
            5 => Self::LoopSensorProblemRear,
            6 => Self::Trapped,
            7 => Self::UpsideDown,
            8 => Self::LowBattery,
            9 => Self::BatteryEmpty,
            10 => Self::NoDrive,
            11 => Self::LiftedUp,
            12 => Self::WrongPinCode,
            13 => Self::CollisionSensorProblem,
            14 => Self::ChargingStationBlocked,
            other => Self::Unknown(other),
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Self::NoError)
    }
}

/// Command verbs the device accepts over an established session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MowerCommand {
    /// Resume the current operation.
    Resume,
    /// Pause wherever the mower currently is.
    Pause,
    /// Return to and stay at the charging station until the next
    /// scheduled start.
    Park,
    /// Return to the charging station and stay until further notice.
    ParkIndefinitely,
    /// Override the schedule and mow now.
    OverrideSchedule,
    /// Return to automatic schedule operation.
    Auto,
}
