use eventchart_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

use crate::partition::Timestamp;

/// The remote side of an aggregation: an event counter and a
/// Prometheus-style range query endpoint.
///
/// Implementations own transport concerns such as timeouts and retries;
/// callers issue each request once and accept its outcome.
pub trait RemoteSource: Sync {
    /// number of events in `[start, end)`
    fn count_in_range(&self, start: Timestamp, end: Timestamp) -> impl Future<Output = Result<u64>> + Send;

    /// evaluate `expression` over `[start, end]` at `step` resolution
    fn query_range(
        &self,
        start: Timestamp,
        end: Timestamp,
        step: &str,
        expression: &str,
    ) -> impl Future<Output = Result<RangeResponse>> + Send;
}

/// Body of a range query response: `{ "data": { "result": [ { "values": [[ts, "v"], ...] } ] } }`.
/// Other top-level fields (`status`, `resultType`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeResponse {
    pub data: RangeData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeData {
    #[serde(default)]
    pub result: Vec<RangeSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    /// `(timestamp seconds, value)`; absent for series with no samples.
    /// Values are normally strings but any JSON is accepted here and
    /// interpreted when flattening.
    #[serde(default)]
    pub values: Option<Vec<(f64, serde_json::Value)>>,
}

impl RangeResponse {
    /// convenience for building responses in tests and fakes
    pub fn from_series(series: Vec<Vec<(f64, String)>>) -> Self {
        let result = series
            .into_iter()
            .map(|values| RangeSeries {
                metric: HashMap::new(),
                values: Some(values.into_iter().map(|(ts, v)| (ts, serde_json::Value::String(v))).collect()),
            })
            .collect();
        Self { data: RangeData { result } }
    }
}
