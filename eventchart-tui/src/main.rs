mod tui;

use clap::{Args, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::Path, sync::mpsc::Sender, time::Duration};
use tui::app::{failure_status, App, ChartUpdate};
use tui::events::handle_key;
use tui::ui::render;
use eventchart_common::Config;
use eventchart_core::{
    export_json, print_summary, select_step, Aggregator, MagmaClient, TimeInterval, Timestamp,
};

fn parse_range(s: &str) -> Result<i64, String> { // "<n>m", "<n>h" or "<n>d" to seconds
    let s = s.trim();
    let Some((split, _)) = s.char_indices().last() else { return Err("empty duration".into()); };
    let (num, unit) = s.split_at(split);
    let n: i64 = num.parse().map_err(|_| format!("not a duration: {s} (use e.g. 15m, 3h, 7d)"))?;
    let mult = match unit { "m" => 60, "h" => 3_600, "d" => 86_400, _ => return Err(format!("unknown unit in {s} (use m, h or d)")) };
    if n <= 0 { return Err(format!("duration must be positive, got {s}")); }
    n.checked_mul(mult).ok_or_else(|| format!("duration too large: {s}"))
}

fn parse_time(s: &str) -> Result<i64, String> {
    chrono::DateTime::parse_from_rfc3339(s).map(|dt| dt.timestamp()).map_err(|e| format!("not an RFC 3339 time: {s} ({e})"))
}

fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

#[derive(Parser)]
#[command(name = "eventchart", version, about = "Network events and alerts dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct RangeArgs {
    /// relative range ending now, e.g. 3h
    #[arg(long, value_parser = parse_range, conflicts_with_all = ["start", "end"])]
    last: Option<i64>,
    #[arg(long, value_parser = parse_time, requires = "end")]
    start: Option<i64>,
    #[arg(long, value_parser = parse_time, requires = "start")]
    end: Option<i64>,
}

impl RangeArgs {
    /// interval plus its relative span, if any; falls back to `default_range`
    fn resolve(&self, default_range: &str, now: Timestamp) -> anyhow::Result<(TimeInterval, Option<i64>)> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            return Ok((TimeInterval::new(start, end)?, None));
        }
        let secs = match self.last {
            Some(secs) => secs,
            None => parse_range(default_range).map_err(|e| anyhow::anyhow!("query.default_range: {e}"))?,
        };
        Ok((TimeInterval::last(secs, now), Some(secs)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// interactive events/alerts chart
    Chart {
        #[arg(long)] network: Option<String>,
        #[command(flatten)] range: RangeArgs,
    },
    /// fetch once and print a summary, or write JSON with --output
    Dump {
        #[arg(long)] network: Option<String>,
        #[command(flatten)] range: RangeArgs,
        #[arg(long)] output: Option<String>,
    },
    /// write a default config file if none exists
    InitConfig,
    Completions { shell: clap_complete::Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Chart { .. }));
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("{e}; using default config");
        Config::default()
    });
    match cli.command {
        Commands::Chart { network, range } => run_tui(network, range, config)?,
        Commands::Dump { network, range, output } => run_dump(network, range, output, config).await?,
        Commands::InitConfig => {
            let path = Config::config_path();
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                Config::default().save()?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "eventchart", &mut io::stdout());
        }
    }
    Ok(())
}

/// RUST_LOG-driven logging; the TUI logs to a file so the screen stays clean
fn init_logging(to_file: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if to_file {
        match log_file() {
            Some(file) => { builder.target(env_logger::Target::Pipe(Box::new(file))); }
            None => { builder.filter_level(log::LevelFilter::Off); }
        }
    }
    let _ = builder.try_init();
}

fn log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join("eventchart");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new().create(true).append(true).open(dir.join("eventchart.log")).ok()
}

fn build_aggregator(network: Option<&str>, config: &Config) -> anyhow::Result<Aggregator<MagmaClient>> {
    let client = MagmaClient::from_config(&config.remote, network)?;
    Ok(Aggregator::new(client).with_expression(config.query.alert_expression.clone()))
}

async fn run_dump(network: Option<String>, range: RangeArgs, output: Option<String>, config: Config) -> anyhow::Result<()> {
    let (interval, _) = range.resolve(&config.query.default_range, now())?;
    let agg = build_aggregator(network.as_deref(), &config)?;
    let mut failure = None;
    let (alerts, events) = agg.aggregate(interval, |f| failure = Some(f)).await;
    if let Some(f) = failure {
        log::warn!("{f:?}");
        eprintln!("{f}");
    }
    match output {
        Some(path) => {
            export_json(Path::new(&path), &alerts, &events)?;
            println!("Exported to {path}");
        }
        None => print_summary(&interval, select_step(interval.start, interval.end), &alerts, &events),
    }
    Ok(())
}

fn spawn_fetch(agg: Aggregator<MagmaClient>, interval: TimeInterval, tx: Sender<ChartUpdate>) {
    tokio::spawn(async move {
        let mut failure = None;
        let (alerts, events) = agg.aggregate(interval, |f| failure = Some(failure_status(&f))).await;
        let _ = tx.send(ChartUpdate { interval, alerts, events, failure }); // receiver gone = superseded
    });
}

fn run_tui(network: Option<String>, range: RangeArgs, config: Config) -> anyhow::Result<()> {
    let (interval, range_secs) = range.resolve(&config.query.default_range, now())?;
    let agg = build_aggregator(network.as_deref(), &config)?;
    let tick = Duration::from_millis(config.display.tick_ms);
    let mut app = App::new(agg.source().network_id().to_owned(), interval, range_secs, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| render(f, &app))?;
        if app.pending_refresh {
            app.pending_refresh = false;
            let (tx, rx) = std::sync::mpsc::channel();
            app.update_rx = Some(rx);
            spawn_fetch(agg.clone(), app.interval, tx);
        }
        let update = app.update_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        if let Some(update) = update {
            app.update_rx = None;
            app.apply_update(update);
        }
        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? { handle_key(&mut app, key, now()); }
        }
        if app.should_quit { break; }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
