use chrono::{DateTime, SecondsFormat, Utc};
use eventchart_common::{EventChartError, RemoteConfig, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::partition::Timestamp;
use crate::source::{RangeResponse, RemoteSource};

/// REST client for one network on the management API.
#[derive(Debug, Clone)]
pub struct MagmaClient {
    http: reqwest::Client,
    base_url: String,
    network_id: String,
    token: Option<String>,
}

impl MagmaClient {
    pub fn new(base_url: &str, network_id: &str) -> Result<Self> {
        Self::from_config(&RemoteConfig { base_url: base_url.into(), ..Default::default() }, Some(network_id))
    }

    /// `network_id` overrides `cfg.network_id`; one of them must be set
    pub fn from_config(cfg: &RemoteConfig, network_id: Option<&str>) -> Result<Self> {
        let network_id = network_id
            .map(str::to_owned)
            .or_else(|| cfg.network_id.clone())
            .ok_or_else(|| EventChartError::Config("no network id configured".into()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            network_id,
            token: cfg.token.clone(),
        })
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn events_count_url(&self) -> String {
        format!("{}/magma/v1/events/{}/about/count", self.base_url, self.network_id)
    }

    pub fn query_range_url(&self) -> String {
        format!("{}/magma/v1/networks/{}/prometheus/query_range", self.base_url, self.network_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        log::trace!("GET {url} {query:?}");
        let mut req = self.http.get(url).query(query);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EventChartError::Remote { status: status.as_u16(), body });
        }
        Ok(resp.json::<T>().await?)
    }
}

impl RemoteSource for MagmaClient {
    async fn count_in_range(&self, start: Timestamp, end: Timestamp) -> Result<u64> {
        let query = [("start", iso_timestamp(start)?), ("end", iso_timestamp(end)?)];
        self.get_json(&self.events_count_url(), &query).await
    }

    async fn query_range(
        &self,
        start: Timestamp,
        end: Timestamp,
        step: &str,
        expression: &str,
    ) -> Result<RangeResponse> {
        let query = [
            ("query", expression.to_owned()),
            ("start", iso_timestamp(start)?),
            ("end", iso_timestamp(end)?),
            ("step", step.to_owned()),
        ];
        self.get_json(&self.query_range_url(), &query).await
    }
}

/// epoch seconds as `YYYY-MM-DDTHH:MM:SS.sssZ`
pub fn iso_timestamp(ts: Timestamp) -> Result<String> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| EventChartError::Other(format!("timestamp out of range: {ts}")))
}
