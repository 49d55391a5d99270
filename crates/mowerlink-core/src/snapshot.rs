// ── Poll snapshot ──
//
// The immutable record one successful poll produces. Replaced wholesale
// on every successful poll; a failed poll leaves the previous snapshot
// untouched. Subscribers never see a half-updated record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mowerlink_link::{MowerActivity, MowerError, MowerMode, MowerState};

/// State of one mower as of a single successful poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Battery charge percentage, 0–100.
    pub battery_level: u8,
    pub is_charging: bool,
    pub mode: MowerMode,
    pub state: MowerState,
    pub activity: MowerActivity,
    pub error: MowerError,
    /// Next scheduled start, absent when nothing is scheduled.
    pub next_start_time: Option<DateTime<Utc>>,
    /// Lifetime statistics counters as published by the device.
    pub statistics: BTreeMap<String, u64>,
}

impl Snapshot {
    /// Look up a statistics counter by key.
    pub fn statistic(&self, key: &str) -> Option<u64> {
        self.statistics.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mowerlink_link::stats;

    #[test]
    fn statistic_lookup() {
        let mut statistics = BTreeMap::new();
        statistics.insert(stats::TOTAL_RUNNING_TIME.to_owned(), 3600);

        let snapshot = Snapshot {
            battery_level: 80,
            is_charging: true,
            mode: MowerMode::MainArea,
            state: MowerState::InOperation,
            activity: MowerActivity::Charging,
            error: MowerError::NoError,
            next_start_time: None,
            statistics,
        };

        assert_eq!(snapshot.statistic(stats::TOTAL_RUNNING_TIME), Some(3600));
        assert_eq!(snapshot.statistic(stats::TOTAL_CUTTING_TIME), None);
    }
}
