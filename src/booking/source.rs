//! Where station availability comes from.
//!
//! The form only sees [`StationSource`]. The built-in source filters a fixed
//! set of stations in process; the HTTP source asks a remote endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr};
use tracing::debug;

use crate::booking::catalog;
use crate::booking::model::{Station, StationsResponse};
use crate::config::SourceConfig;

/// Answers "which stations offer this service?".
#[async_trait]
pub trait StationSource: Send + Sync {
    /// Short name for logs and command status.
    fn name(&self) -> &'static str;

    async fn stations(&self, car_type: &str, service: &str) -> Result<StationsResponse>;
}

/// Stations offering `service`. An empty service matches every station.
///
/// The car type plays no part in filtering.
pub fn filter_stations(stations: &[Station], service: &str) -> Vec<Station> {
    if service.is_empty() {
        return stations.to_vec();
    }
    stations
        .iter()
        .filter(|s| s.offers(service))
        .cloned()
        .collect()
}

fn echo(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// In-process source backed by the built-in station list.
pub struct MockStationSource {
    stations: Vec<Station>,
    latency: Duration,
}

impl MockStationSource {
    pub fn new(latency: Duration) -> Result<Self> {
        Ok(Self::with_stations(catalog::stations()?, latency))
    }

    pub const fn with_stations(stations: Vec<Station>, latency: Duration) -> Self {
        Self { stations, latency }
    }
}

#[async_trait]
impl StationSource for MockStationSource {
    fn name(&self) -> &'static str {
        "built-in"
    }

    async fn stations(&self, car_type: &str, service: &str) -> Result<StationsResponse> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let stations = filter_stations(&self.stations, service);
        debug!(car_type, service, count = stations.len(), "Filtered built-in stations");

        Ok(StationsResponse {
            car_type: echo(car_type),
            service_type: echo(service),
            stations,
        })
    }
}

/// Source that queries `GET <endpoint>?carType=..&service=..`.
pub struct HttpStationSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStationSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl StationSource for HttpStationSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn stations(&self, car_type: &str, service: &str) -> Result<StationsResponse> {
        debug!(endpoint = %self.endpoint, car_type, service, "Requesting stations");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("carType", car_type), ("service", service)])
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach {}", self.endpoint))?
            .error_for_status()
            .wrap_err("Station lookup was rejected")?;

        response
            .json::<StationsResponse>()
            .await
            .wrap_err("Invalid station payload")
    }
}

/// Pick the source for this run: an endpoint wins unless `force_mock` is set.
pub fn from_config(
    config: &SourceConfig,
    endpoint: Option<String>,
    force_mock: bool,
) -> Result<Arc<dyn StationSource>> {
    let endpoint = endpoint.or_else(|| config.endpoint.clone());
    match endpoint {
        Some(url) if !force_mock => Ok(Arc::new(HttpStationSource::new(url))),
        _ => Ok(Arc::new(MockStationSource::new(Duration::from_millis(
            config.mock_latency_ms,
        ))?)),
    }
}
