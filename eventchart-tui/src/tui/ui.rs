use chrono::{DateTime, Utc};
use eventchart_core::{axis_format, Series};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use crate::tui::app::{App, View};
use crate::tui::theme::Theme;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    render_topbar(frame, app, chunks[0], theme);
    if app.loading {
        render_loading(frame, chunks[1]);
    } else {
        render_chart(frame, app, chunks[1], theme);
    }
    render_bottombar(frame, app, chunks[2], theme);
    if app.view == View::Help { render_help(frame, area); }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let badge = Span::styled(format!("[{}]", app.range_label), Style::default().fg(theme.highlight));
    let info = format!(
        " {} | {} .. {} | step {} | {}",
        app.network_id,
        fmt_ts(app.interval.start, "%Y-%m-%d %H:%M"),
        fmt_ts(app.interval.end, "%Y-%m-%d %H:%M"),
        app.granularity,
        app.alert_expression
    );
    let line = Line::from(vec![badge, Span::raw(info)]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL).title("Events & Alerts")), area);
}

/// (x, y) pairs in chart units; x stays as the raw point timestamp
pub fn chart_points(series: &Series) -> Vec<(f64, f64)> {
    series.data.iter().filter(|p| p.y.is_finite()).map(|p| (p.t as f64, p.y)).collect()
}

/// y range with some headroom; never collapses to zero height
pub fn y_bounds(alerts: &Series, events: &Series) -> [f64; 2] {
    let max = alerts.max_y().into_iter().chain(events.max_y()).fold(0.0_f64, f64::max);
    [0.0, if max > 0.0 { (max + (max / 10.0).max(1.0)).ceil() } else { 1.0 }]
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let alert_points = chart_points(&app.alerts);
    let event_points = chart_points(&app.events);
    let datasets = vec![
        Dataset::default()
            .name(app.alerts.label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.series_color(&app.alerts.style.color)))
            .data(&alert_points),
        Dataset::default()
            .name(app.events.label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.series_color(&app.events.style.color)))
            .data(&event_points),
    ];

    let x_min = app.interval.start * 1000;
    let x_max = (app.interval.end * 1000).max(x_min + 1);
    let fmt = axis_format(app.granularity);
    let x_labels: Vec<Span> = [app.interval.start, (app.interval.start + app.interval.end) / 2, app.interval.end]
        .iter()
        .map(|ts| Span::raw(fmt_ts(*ts, fmt)))
        .collect();
    let [y_min, y_max] = y_bounds(&app.alerts, &app.events);
    let y_labels: Vec<Span> = [y_min, y_max / 2.0, y_max].iter().map(|v| Span::raw(format!("{v:.0}"))).collect();

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Events & Alerts"))
        .x_axis(Axis::default().style(Style::default().fg(theme.axis)).bounds([x_min as f64, x_max as f64]).labels(x_labels))
        .y_axis(Axis::default().title("count").style(Style::default().fg(theme.axis)).bounds([y_min, y_max]).labels(y_labels));
    frame.render_widget(chart, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Keybindings", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  q        Quit"),
        Line::from("  ?        Toggle help"),
        Line::from("  r        Refresh"),
        Line::from("  1..6     Last 1h / 3h / 12h / 24h / 3d / 7d"),
        Line::from("  Esc      Close help"),
    ];
    let popup = centered_rect(50, 40, area);
    frame.render_widget(ratatui::widgets::Clear, popup);
    frame.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help (?)")), popup);
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status_style = if app.status_is_error { Style::default().fg(theme.error).add_modifier(Modifier::BOLD) } else { Style::default().fg(theme.fg) };
    let line = Line::from(vec![
        Span::styled(format!(" {}", app.status_msg), status_style),
        Span::raw(" | q:quit ?:help r:refresh 1-6:range"),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg)), area);
}

fn centered_rect(px: u16, py: u16, r: Rect) -> Rect {
    let v = Layout::default().direction(Direction::Vertical).constraints([Constraint::Percentage((100-py)/2), Constraint::Percentage(py), Constraint::Percentage((100-py)/2)]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([Constraint::Percentage((100-px)/2), Constraint::Percentage(px), Constraint::Percentage((100-px)/2)]).split(v[1])[1]
}

fn fmt_ts(secs: i64, fmt: &str) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(fmt).to_string()).unwrap_or_else(|| secs.to_string())
}
