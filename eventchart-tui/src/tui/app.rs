use crate::tui::theme::Theme;
use eventchart_common::Config;
use eventchart_core::{select_step, FetchFailure, Granularity, Series, TimeInterval, Timestamp};
use std::sync::mpsc::Receiver;

/// range presets bound to keys 1-6
pub const RANGE_PRESETS: [(&str, i64); 6] = [
    ("1h", 3_600),
    ("3h", 3 * 3_600),
    ("12h", 12 * 3_600),
    ("24h", 24 * 3_600),
    ("3d", 3 * 86_400),
    ("7d", 7 * 86_400),
];

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Chart,
    Help,
}

/// Result of one background aggregation.
#[derive(Debug)]
pub struct ChartUpdate {
    pub interval: TimeInterval,
    pub alerts: Series,
    pub events: Series,
    pub failure: Option<String>,
}

pub struct App {
    pub network_id: String,
    pub alert_expression: String,
    pub interval: TimeInterval,
    pub granularity: Granularity,
    pub range_label: String,
    pub range_secs: Option<i64>, // None when the interval is fixed (--start/--end)
    pub alerts: Series,
    pub events: Series,
    pub loading: bool,
    pub view: View,
    pub status_msg: String,
    pub status_is_error: bool,
    pub pending_refresh: bool,
    pub update_rx: Option<Receiver<ChartUpdate>>,
    pub should_quit: bool,
    pub theme: Theme,
}

impl App {
    pub fn new(network_id: String, interval: TimeInterval, range_secs: Option<i64>, config: &Config) -> Self {
        let range_label = match range_secs {
            Some(secs) => range_label(secs),
            None => "custom".into(),
        };
        Self {
            network_id,
            alert_expression: config.query.alert_expression.clone(),
            interval,
            granularity: select_step(interval.start, interval.end),
            range_label,
            range_secs,
            alerts: Series::alerts(Vec::new()),
            events: Series::events(Vec::new()),
            loading: true,
            view: View::Chart,
            status_msg: String::from("Loading..."),
            status_is_error: false,
            pending_refresh: true,
            update_rx: None,
            should_quit: false,
            theme: Theme::from_name(&config.display.theme),
        }
    }

    /// Switches to a relative range ending at `now` and schedules a fetch.
    pub fn select_preset(&mut self, index: usize, now: Timestamp) {
        let Some((label, secs)) = RANGE_PRESETS.get(index) else { return; };
        self.range_secs = Some(*secs);
        self.range_label = (*label).to_owned();
        self.set_interval(TimeInterval::last(*secs, now));
    }

    /// Re-anchors a relative range at `now`; fixed intervals are refetched as-is.
    pub fn refresh(&mut self, now: Timestamp) {
        let interval = match self.range_secs {
            Some(secs) => TimeInterval::last(secs, now),
            None => self.interval,
        };
        self.set_interval(interval);
    }

    fn set_interval(&mut self, interval: TimeInterval) {
        self.interval = interval;
        self.granularity = select_step(interval.start, interval.end);
        self.loading = true;
        self.pending_refresh = true;
        self.status_msg = "Loading...".into();
        self.status_is_error = false;
    }

    /// Applies a finished aggregation. Updates for a superseded interval are dropped.
    pub fn apply_update(&mut self, update: ChartUpdate) {
        if update.interval != self.interval {
            log::debug!("dropping stale update for {:?}", update.interval);
            return;
        }
        self.alerts = update.alerts;
        self.events = update.events;
        self.loading = false;
        match update.failure {
            Some(msg) => {
                self.status_msg = msg;
                self.status_is_error = true;
            }
            None => {
                self.status_msg = format!(
                    "Ready: {} alert points, {} event buckets",
                    self.alerts.len(),
                    self.events.len()
                );
                self.status_is_error = false;
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.view = if self.view == View::Help { View::Chart } else { View::Help };
    }
}

/// Status line for a degraded aggregation. Zero-filled buckets carry
/// second timestamps and land off the millisecond axis, so say so.
pub fn failure_status(failure: &FetchFailure) -> String {
    match failure {
        FetchFailure::Buckets { failed, total } => {
            format!("{failure}: {failed} of {total} buckets missing, gaps in the event line")
        }
        FetchFailure::Alerts(_) => format!("{failure}: alert query failed, nothing to chart"),
    }
}

pub fn range_label(secs: i64) -> String {
    if secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}m", secs / 60)
    }
}
