use eventchart_common::Result;
use futures::future::join_all;

use crate::partition::{Bucket, TimeInterval};
use crate::series::DataPoint;
use crate::source::{RangeResponse, RemoteSource};
use crate::step::Granularity;

/// What one bucket's count request came back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOutcome {
    Counted(u64),
    Failed,
}

impl BucketOutcome {
    /// Chart point for `bucket`. Failed buckets keep `t` in seconds; this
    /// unit mismatch is what dashboards built on this data expect.
    pub fn to_point(self, bucket: &Bucket) -> DataPoint {
        match self {
            Self::Counted(n) => DataPoint::new(bucket.start * 1000, n as f64),
            Self::Failed => DataPoint::new(bucket.start, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCounts {
    pub points: Vec<DataPoint>, // one per bucket, bucket order
    pub failed: usize,
}

/// Issues one count request per bucket, all at once, and assembles the
/// results by bucket index. A failed bucket becomes a zero point.
pub async fn fetch_event_counts<S: RemoteSource>(source: &S, buckets: &[Bucket]) -> EventCounts {
    log::debug!("requesting event counts for {} buckets", buckets.len());
    let requests: Vec<_> = buckets.iter().map(|bucket| count_bucket(source, bucket)).collect();
    let outcomes = join_all(requests).await;
    let failed = outcomes.iter().filter(|o| **o == BucketOutcome::Failed).count();
    let points = outcomes
        .into_iter()
        .zip(buckets)
        .map(|(outcome, bucket)| outcome.to_point(bucket))
        .collect();
    EventCounts { points, failed }
}

async fn count_bucket<S: RemoteSource>(source: &S, bucket: &Bucket) -> BucketOutcome {
    match source.count_in_range(bucket.start, bucket.end).await {
        Ok(n) => BucketOutcome::Counted(n),
        Err(e) => {
            log::warn!("event count for [{}, {}) failed: {e}", bucket.start, bucket.end);
            BucketOutcome::Failed
        }
    }
}

/// Runs `expression` as one range query over the whole interval.
pub async fn fetch_alerts<S: RemoteSource>(
    source: &S,
    interval: TimeInterval,
    granularity: Granularity,
    expression: &str,
) -> Result<Vec<DataPoint>> {
    let step = granularity.step_string();
    log::debug!("range query {expression:?} over [{}, {}] step {step}", interval.start, interval.end);
    let resp = source
        .query_range(interval.start, interval.end, &step, expression)
        .await
        .inspect_err(|e| log::warn!("alert range query failed: {e}"))?;
    Ok(flatten_range(&resp))
}

/// All samples of all result series, timestamps truncated to whole seconds
/// and scaled to milliseconds. Series without `values` add nothing.
pub fn flatten_range(resp: &RangeResponse) -> Vec<DataPoint> {
    resp.data
        .result
        .iter()
        .filter_map(|series| series.values.as_ref())
        .flatten()
        .map(|(ts, value)| DataPoint::new(ts.trunc() as i64 * 1000, parse_value(value)))
        .collect()
}

// unparseable samples are kept as NaN rather than dropped
fn parse_value(raw: &serde_json::Value) -> f64 {
    match raw {
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
