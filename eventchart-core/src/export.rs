use std::path::Path;
use eventchart_common::Result;
use crate::partition::TimeInterval;
use crate::series::Series;
use crate::step::Granularity;

// --- headless summary output ---

pub fn print_summary(interval: &TimeInterval, granularity: Granularity, alerts: &Series, events: &Series) {
    print!("{}", render_summary(interval, granularity, alerts, events));
}

pub fn render_summary(interval: &TimeInterval, granularity: Granularity, alerts: &Series, events: &Series) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<16} {} .. {}\n", "Interval:", interval.start, interval.end));
    out.push_str(&format!("{:<16} {}\n", "Step:", granularity));
    for s in [alerts, events] {
        // fold from +0.0; an empty f64 sum is -0.0 and would print as "-0"
        let total = s.data.iter().map(|p| p.y).filter(|y| y.is_finite()).fold(0.0, |acc, y| acc + y);
        let peak = s.max_y().map(|m| format!("{m}")).unwrap_or_else(|| "-".into());
        out.push_str(&format!("{:<16} {} points, total {}, peak {}\n", format!("{}:", s.label), s.len(), total, peak));
    }
    out
}

// --- JSON export ---

pub fn export_json(output_path: &Path, alerts: &Series, events: &Series) -> Result<()> {
    let doc = serde_json::json!({
        "alerts": alerts,
        "events": events,
    });
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &doc)?;
    Ok(())
}
