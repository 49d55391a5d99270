// ── Derived display activity ──
//
// Pure mapping from raw (state, activity) codes to the small activity
// enum the lawn-mower entity shows. There is no literal "stopped"
// display state, so stopped-like raw states map to `Error`. Absent
// inputs yield `None` ("unknown"), which is distinct from `Error`
// ("known bad state").

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use mowerlink_link::{MowerActivity, MowerState};

/// User-facing activity shown by the lawn-mower entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum DisplayActivity {
    Paused,
    Mowing,
    Docked,
    Returning,
    Error,
}

/// Map raw state/activity codes to a display activity.
///
/// First match wins; any combination outside the table is `Error`.
pub fn derive_activity(
    state: Option<MowerState>,
    activity: Option<MowerActivity>,
) -> Option<DisplayActivity> {
    let (Some(state), Some(activity)) = (state, activity) else {
        return None;
    };

    let derived = match state {
        MowerState::Paused => DisplayActivity::Paused,
        MowerState::Stopped | MowerState::Off | MowerState::WaitForSafetyPin => {
            DisplayActivity::Error
        }
        MowerState::Restricted | MowerState::InOperation | MowerState::PendingStart => {
            match activity {
                MowerActivity::Charging | MowerActivity::Parked | MowerActivity::None => {
                    DisplayActivity::Docked
                }
                MowerActivity::GoingOut | MowerActivity::Mowing => DisplayActivity::Mowing,
                MowerActivity::GoingHome => DisplayActivity::Returning,
                _ => DisplayActivity::Error,
            }
        }
        _ => DisplayActivity::Error,
    };

    Some(derived)
}
