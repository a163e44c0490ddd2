pub mod aggregate;
pub mod client;
pub mod export;
pub mod fetch;
pub mod partition;
pub mod series;
pub mod source;
pub mod step;

pub use eventchart_common::{EventChartError, Result};
pub use aggregate::{aggregate, aggregate_with_expression, Aggregator, FetchFailure, DEFAULT_ALERT_EXPRESSION};
pub use client::{iso_timestamp, MagmaClient};
pub use export::{export_json, print_summary, render_summary};
pub use fetch::{fetch_alerts, fetch_event_counts, flatten_range, BucketOutcome, EventCounts};
pub use partition::{partition, Bucket, TimeInterval, Timestamp};
pub use series::{DataPoint, Series, SeriesStyle};
pub use source::{RangeData, RangeResponse, RangeSeries, RemoteSource};
pub use step::{axis_format, select_step, step_string, Granularity, TimeUnit};
