use eventchart_core::{
    aggregate, partition, select_step, Aggregator, DataPoint, EventChartError, FetchFailure,
    RangeResponse, RemoteSource, Result, TimeInterval, Timestamp,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory source: bucket counts keyed by bucket start, `None` meaning the
/// request fails. `alerts: None` makes the range query fail.
#[derive(Default)]
struct ScriptedSource {
    counts: HashMap<Timestamp, Option<u64>>,
    alerts: Option<RangeResponse>,
    delay_ms: HashMap<Timestamp, u64>,
    alert_delay_ms: u64,
    // count requests still outstanding when the range query answered
    counts_pending_at_alert: AtomicUsize,
    count_calls: Mutex<Vec<(Timestamp, Timestamp)>>,
    range_calls: Mutex<Vec<(Timestamp, Timestamp, String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    fn with_counts(starts: impl IntoIterator<Item = Timestamp>, counts: &[Option<u64>]) -> Self {
        Self {
            counts: starts.into_iter().zip(counts.iter().copied()).collect(),
            alerts: Some(RangeResponse::from_series(Vec::new())),
            ..Default::default()
        }
    }
}

impl RemoteSource for ScriptedSource {
    async fn count_in_range(&self, start: Timestamp, end: Timestamp) -> Result<u64> {
        self.count_calls.lock().unwrap().push((start, end));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delay_ms.get(&start).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.counts.get(&start).copied().flatten() {
            Some(n) => Ok(n),
            None => Err(EventChartError::Remote { status: 503, body: "unavailable".into() }),
        }
    }

    async fn query_range(&self, start: Timestamp, end: Timestamp, step: &str, expression: &str) -> Result<RangeResponse> {
        self.range_calls.lock().unwrap().push((start, end, step.to_owned(), expression.to_owned()));
        tokio::time::sleep(Duration::from_millis(self.alert_delay_ms)).await;
        self.counts_pending_at_alert.store(self.in_flight.load(Ordering::SeqCst), Ordering::SeqCst);
        self.alerts.clone().ok_or_else(|| EventChartError::Other("prometheus down".into()))
    }
}

fn starts(interval: TimeInterval) -> Vec<Timestamp> {
    partition(interval, select_step(interval.start, interval.end)).iter().map(|b| b.start).collect()
}

// just under two hours: 15 minute buckets, 8 of them
const T0: Timestamp = 1_600_000_200;
fn two_hours() -> TimeInterval {
    TimeInterval::new(T0, T0 + 7_199).unwrap()
}

#[tokio::test]
async fn all_buckets_succeed() {
    let iv = two_hours();
    let counts: Vec<Option<u64>> = (1..=8).map(Some).collect();
    let src = ScriptedSource::with_counts(starts(iv), &counts);
    let mut failures = Vec::new();
    let (alerts, events) = aggregate(iv, &src, |f| failures.push(f)).await;
    assert!(failures.is_empty());
    assert!(alerts.is_empty());
    assert_eq!(alerts.label, "Alerts");
    assert_eq!(events.label, "Events");
    assert_eq!(events.len(), 8);
    for (i, p) in events.data.iter().enumerate() {
        assert_eq!(p.t, (T0 + i as i64 * 900) * 1000);
        assert_eq!(p.y, (i + 1) as f64);
    }
    assert!(events.data.windows(2).all(|w| w[0].t < w[1].t));
}

#[tokio::test]
async fn failed_bucket_is_zero_filled_in_seconds() {
    let iv = two_hours();
    let counts = [Some(10), Some(12), Some(9), None, Some(11), Some(8), Some(14), Some(13)];
    let src = ScriptedSource::with_counts(starts(iv), &counts);
    let mut failures = Vec::new();
    let (_, events) = aggregate(iv, &src, |f| failures.push(f)).await;
    let ys: Vec<f64> = events.data.iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![10.0, 12.0, 9.0, 0.0, 11.0, 8.0, 14.0, 13.0]);
    // the zero-filled point keeps seconds, every other point is millis
    assert_eq!(events.data[3], DataPoint::new(T0 + 2_700, 0.0));
    assert_eq!(events.data[2].t, (T0 + 1_800) * 1000);
    assert_eq!(events.data[4].t, (T0 + 3_600) * 1000);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], FetchFailure::Buckets { failed: 1, total: 8 }));
    assert_eq!(failures[0].to_string(), "Error getting event counts");
}

#[tokio::test]
async fn alert_failure_discards_event_data() {
    let iv = two_hours();
    let counts: Vec<Option<u64>> = (0..8).map(|_| Some(5)).collect();
    let mut src = ScriptedSource::with_counts(starts(iv), &counts);
    src.alerts = None;
    let mut failures = Vec::new();
    let (alerts, events) = aggregate(iv, &src, |f| failures.push(f)).await;
    assert!(alerts.is_empty());
    assert!(events.is_empty());
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], FetchFailure::Alerts(_)));
    // the bucket requests still ran
    assert_eq!(src.count_calls.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn alert_and_bucket_failures_notify_once() {
    let iv = two_hours();
    let mut src = ScriptedSource::with_counts(starts(iv), &[None, None, Some(1)]);
    src.alerts = None;
    let mut calls = 0;
    let (alerts, events) = aggregate(iv, &src, |_| calls += 1).await;
    assert_eq!(calls, 1);
    assert!(alerts.is_empty() && events.is_empty());
}

#[tokio::test]
async fn three_of_five_failing_notifies_once() {
    // 20 minutes: 5 minute buckets at +0, +300, ..., +1200
    let iv = TimeInterval::new(0, 1_200).unwrap();
    let src = ScriptedSource::with_counts(starts(iv), &[Some(1), None, None, Some(4), None]);
    let mut failures = Vec::new();
    let (_, events) = aggregate(iv, &src, |f| failures.push(f)).await;
    assert_eq!(events.len(), 5);
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], FetchFailure::Buckets { failed: 3, total: 5 }));
    let zeros: Vec<usize> = events.data.iter().enumerate().filter(|(_, p)| p.y == 0.0).map(|(i, _)| i).collect();
    assert_eq!(zeros, vec![1, 2, 4]);
}

#[tokio::test]
async fn alert_series_merges_all_results_in_millis() {
    let iv = two_hours();
    let mut src = ScriptedSource::with_counts(starts(iv), &[Some(0); 8]);
    src.alerts = Some(RangeResponse::from_series(vec![
        vec![(T0 as f64, "1".into()), ((T0 + 900) as f64, "2".into())],
        vec![((T0 + 450) as f64 + 0.75, "3".into())],
    ]));
    let (alerts, _) = aggregate(iv, &src, |_| panic!("no failure expected")).await;
    assert_eq!(
        alerts.data,
        vec![
            DataPoint::new(T0 * 1000, 1.0),
            DataPoint::new((T0 + 900) * 1000, 2.0),
            DataPoint::new((T0 + 450) * 1000, 3.0),
        ]
    );
}

#[tokio::test]
async fn range_query_covers_whole_interval_with_step() {
    let iv = two_hours();
    let src = ScriptedSource::with_counts(starts(iv), &[Some(1); 8]);
    aggregate(iv, &src, |_| {}).await;
    let calls = src.range_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (iv.start, iv.end, "15m".to_string(), "sum(ALERTS)".to_string()));
}

#[tokio::test]
async fn aggregator_uses_configured_expression() {
    let iv = two_hours();
    let src = ScriptedSource::with_counts(starts(iv), &[Some(1); 8]);
    let agg = Aggregator::new(src).with_expression("sum(ALERTS{severity=\"critical\"})");
    let (_, events) = agg.aggregate(iv, |_| {}).await;
    assert_eq!(events.len(), 8);
    let calls = agg.source().range_calls.lock().unwrap();
    assert_eq!(calls[0].3, "sum(ALERTS{severity=\"critical\"})");
}

#[tokio::test]
async fn zero_length_interval_issues_one_count() {
    let iv = TimeInterval::new(T0, T0).unwrap();
    let src = ScriptedSource::with_counts([T0], &[Some(42)]);
    let (_, events) = aggregate(iv, &src, |_| {}).await;
    assert_eq!(events.data, vec![DataPoint::new(T0 * 1000, 42.0)]);
    assert_eq!(*src.count_calls.lock().unwrap(), vec![(T0, T0 + 300)]);
}

#[test_log::test(tokio::test)]
async fn order_follows_buckets_not_completion() {
    let iv = two_hours();
    let bucket_starts = starts(iv);
    let counts: Vec<Option<u64>> = (0..8).map(|i| Some(i * 100)).collect();
    let mut src = ScriptedSource::with_counts(bucket_starts.clone(), &counts);
    // earliest bucket answers last
    src.delay_ms = bucket_starts.iter().enumerate().map(|(i, s)| (*s, (8 - i as u64) * 5)).collect();
    let (_, events) = aggregate(iv, &src, |_| {}).await;
    let ys: Vec<f64> = events.data.iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0]);
    // every request was in flight before any completed
    assert_eq!(src.max_in_flight.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn alert_query_runs_alongside_bucket_requests() {
    let iv = two_hours();
    let bucket_starts = starts(iv);
    let mut src = ScriptedSource::with_counts(bucket_starts.clone(), &[Some(1); 8]);
    src.delay_ms = bucket_starts.iter().map(|s| (*s, 60)).collect();
    src.alert_delay_ms = 10;
    let (_, events) = aggregate(iv, &src, |_| panic!("no failure expected")).await;
    assert_eq!(events.len(), 8);
    // run one after the other, the range query would see no outstanding counts
    assert_eq!(src.counts_pending_at_alert.load(Ordering::SeqCst), 8);
    assert_eq!(src.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn export_json_writes_both_series() {
    let iv = two_hours();
    let src = ScriptedSource::with_counts(starts(iv), &[Some(3); 8]);
    let (alerts, events) = aggregate(iv, &src, |_| {}).await;
    let tmp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    eventchart_core::export_json(tmp.path(), &alerts, &events).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(tmp.path()).unwrap()).unwrap();
    assert_eq!(doc["alerts"]["label"], "Alerts");
    assert_eq!(doc["events"]["label"], "Events");
    assert_eq!(doc["events"]["data"].as_array().unwrap().len(), 8);
    assert_eq!(doc["events"]["data"][0]["t"], (T0 * 1000));
}
