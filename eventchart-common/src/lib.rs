pub mod config;
pub use config::{Config, DisplayConfig, QueryConfig, RemoteConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventChartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("remote returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: i64, end: i64 },
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EventChartError>;
