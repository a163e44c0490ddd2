use serde::{Deserialize, Serialize};
use std::fmt;

use crate::partition::Timestamp;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub fn seconds(self) -> i64 {
        match self {
            Self::Minute => MINUTE,
            Self::Hour => HOUR,
            Self::Day => DAY,
        }
    }

    /// single-letter suffix understood by Prometheus duration strings
    pub fn suffix(self) -> char {
        match self {
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
        }
    }
}

/// Width of one chart bucket. `amount` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Granularity {
    pub amount: u32,
    pub unit: TimeUnit,
}

impl Granularity {
    pub const fn new(amount: u32, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn seconds(&self) -> i64 {
        i64::from(self.amount.max(1)) * self.unit.seconds()
    }

    pub fn step_string(&self) -> String {
        step_string(*self)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

// (inclusive upper bound of the span in seconds, granularity)
const STEP_TABLE: [(i64, Granularity); 6] = [
    (60 * MINUTE + 30, Granularity::new(5, TimeUnit::Minute)),
    (3 * HOUR + 30 * MINUTE, Granularity::new(15, TimeUnit::Minute)),
    (12 * HOUR + 30 * MINUTE, Granularity::new(1, TimeUnit::Hour)),
    (24 * HOUR + 30 * MINUTE, Granularity::new(2, TimeUnit::Hour)),
    (3 * DAY + 12 * HOUR, Granularity::new(6, TimeUnit::Hour)),
    (7 * DAY + 12 * HOUR, Granularity::new(12, TimeUnit::Hour)),
];
const WIDEST_STEP: Granularity = Granularity::new(24, TimeUnit::Hour);

/// Picks a bucket width for `[start, end]` so a chart gets a readable number
/// of points. Empty and inverted spans land in the narrowest band.
pub fn select_step(start: Timestamp, end: Timestamp) -> Granularity {
    let span = end.saturating_sub(start);
    STEP_TABLE
        .iter()
        .find(|(limit, _)| span <= *limit)
        .map(|(_, g)| *g)
        .unwrap_or(WIDEST_STEP)
}

pub fn step_string(granularity: Granularity) -> String {
    granularity.to_string()
}

/// chrono format string for x-axis labels at this granularity
pub fn axis_format(granularity: Granularity) -> &'static str {
    let secs = granularity.seconds();
    if secs < 6 * HOUR {
        "%H:%M"
    } else if secs < DAY {
        "%d-%m-%y %H:%M"
    } else {
        "%d-%m-%Y"
    }
}
