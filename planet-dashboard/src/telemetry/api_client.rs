//! HTTP client for the ephemeris service
use async_trait::async_trait;
use anyhow::Context;
use planet_common::{ObserverLocation, PlanetsResponse, SolarSystemResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::source::TelemetrySource;
use crate::config::EphemerisConfig;
use crate::error::{TelemetryError, TelemetryResult};

/// Talks to `/planets` and `/solar_system`. Cheap to clone.
#[derive(Clone)]
pub struct EphemerisClient {
    client: Client,
    base_url: String,
}

impl EphemerisClient {
    pub fn new(config: &EphemerisConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "planet-dashboard/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn planets_url(&self, location: &ObserverLocation) -> String {
        format!(
            "{}/planets?lat={}&lon={}",
            self.base_url, location.latitude, location.longitude
        )
    }

    pub fn solar_system_url(&self) -> String {
        format!("{}/solar_system", self.base_url)
    }

    pub async fn fetch_planets(&self, location: &ObserverLocation) -> TelemetryResult<PlanetsResponse> {
        self.get_json(&self.planets_url(location)).await
    }

    pub async fn fetch_solar_system(&self) -> TelemetryResult<SolarSystemResponse> {
        self.get_json(&self.solar_system_url()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> TelemetryResult<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(TelemetryError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TelemetrySource<ObserverLocation, PlanetsResponse> for EphemerisClient {
    async fn fetch(&self, location: ObserverLocation) -> TelemetryResult<PlanetsResponse> {
        self.fetch_planets(&location).await
    }
}

#[async_trait]
impl TelemetrySource<(), SolarSystemResponse> for EphemerisClient {
    async fn fetch(&self, _params: ()) -> TelemetryResult<SolarSystemResponse> {
        self.fetch_solar_system().await
    }
}
