use eventchart_common::EventChartError;
use thiserror::Error;

use crate::fetch::{fetch_alerts, fetch_event_counts};
use crate::partition::{partition, TimeInterval};
use crate::series::Series;
use crate::source::RemoteSource;
use crate::step::select_step;

pub const DEFAULT_ALERT_EXPRESSION: &str = "sum(ALERTS)";

/// Why an aggregation degraded. Both variants render as the same
/// user-facing notification text.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// some bucket counts failed and were zero-filled
    #[error("Error getting event counts")]
    Buckets { failed: usize, total: usize },
    /// the alert range query failed; both series were discarded
    #[error("Error getting event counts")]
    Alerts(#[source] EventChartError),
}

/// Builds the `(alerts, events)` chart series for `interval`.
///
/// Event buckets and the alert range query are fetched concurrently on the
/// calling task. A failed bucket is zero-filled; a failed alert query empties
/// *both* series. `on_error` runs at most once per call.
pub async fn aggregate<S, F>(interval: TimeInterval, source: &S, on_error: F) -> (Series, Series)
where
    S: RemoteSource,
    F: FnOnce(FetchFailure),
{
    aggregate_with_expression(interval, source, DEFAULT_ALERT_EXPRESSION, on_error).await
}

pub async fn aggregate_with_expression<S, F>(
    interval: TimeInterval,
    source: &S,
    expression: &str,
    on_error: F,
) -> (Series, Series)
where
    S: RemoteSource,
    F: FnOnce(FetchFailure),
{
    let granularity = select_step(interval.start, interval.end);
    let buckets = partition(interval, granularity);

    let (events, alerts) = futures::join!(
        fetch_event_counts(source, &buckets),
        fetch_alerts(source, interval, granularity, expression),
    );

    let alerts = match alerts {
        Ok(points) => points,
        Err(e) => {
            // event data is dropped too, even when every bucket succeeded
            on_error(FetchFailure::Alerts(e));
            return (Series::alerts(Vec::new()), Series::events(Vec::new()));
        }
    };
    if events.failed > 0 {
        on_error(FetchFailure::Buckets { failed: events.failed, total: buckets.len() });
    }
    log::info!(
        "aggregated {} alert points and {} event buckets ({} failed)",
        alerts.len(),
        events.points.len(),
        events.failed
    );
    (Series::alerts(alerts), Series::events(events.points))
}

/// A [`RemoteSource`] paired with the alert expression to chart.
#[derive(Debug, Clone)]
pub struct Aggregator<S> {
    source: S,
    alert_expression: String,
}

impl<S: RemoteSource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source, alert_expression: DEFAULT_ALERT_EXPRESSION.into() }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.alert_expression = expression.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn aggregate<F: FnOnce(FetchFailure)>(&self, interval: TimeInterval, on_error: F) -> (Series, Series) {
        aggregate_with_expression(interval, &self.source, &self.alert_expression, on_error).await
    }
}
