use eventchart_common::{EventChartError, Result};
use serde::{Deserialize, Serialize};

use crate::step::Granularity;

/// epoch seconds
pub type Timestamp = i64;

/// Half-open `[start, end)` range. [`TimeInterval::new`] enforces `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// One sub-interval produced by [`partition`].
pub type Bucket = TimeInterval;

impl TimeInterval {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start > end {
            return Err(EventChartError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[now - span_secs, now]`, clamped so a negative span gives an empty interval
    pub fn last(span_secs: i64, now: Timestamp) -> Self {
        Self {
            start: now.saturating_sub(span_secs.max(0)),
            end: now,
        }
    }

    /// 0 for an inverted interval
    pub fn len_secs(&self) -> i64 {
        self.end.saturating_sub(self.start).max(0)
    }
}

/// Splits `interval` into contiguous buckets of `granularity` width.
///
/// Every cursor position still within `[start, end]` opens a bucket, so the
/// last bucket may run past `end` by less than one step, and a zero-length
/// interval still yields one bucket. An inverted interval (possible when built
/// by struct literal rather than [`TimeInterval::new`]) is treated as
/// zero-length at `start`. Bucket ends saturate at `i64::MAX`.
pub fn partition(interval: TimeInterval, granularity: Granularity) -> Vec<Bucket> {
    if interval.end < interval.start {
        log::warn!("inverted interval [{}, {}], treating as zero-length", interval.start, interval.end);
    }
    let end = interval.end.max(interval.start);
    let step = granularity.seconds();
    let count = interval.len_secs() / step + 1;
    let buckets: Vec<Bucket> = (0..count)
        .map(|i| interval.start.saturating_add(i.saturating_mul(step)))
        .take_while(|s| *s <= end)
        .map(|s| Bucket { start: s, end: s.saturating_add(step) })
        .collect();
    log::debug!(
        "partitioned [{}, {}] into {} buckets of {}",
        interval.start,
        interval.end,
        buckets.len(),
        granularity
    );
    buckets
}
