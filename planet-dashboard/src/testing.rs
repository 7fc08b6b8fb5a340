//! Stub telemetry sources and fixtures shared by the unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use planet_common::{BodyPosition, HeliocentricBody, PlanetsResponse, SolarSystemResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::error::{TelemetryError, TelemetryResult};
use crate::relay::AnnouncementSink;
use crate::telemetry::TelemetrySource;

pub type Reply<T> = oneshot::Sender<TelemetryResult<T>>;

/// Every fetch blocks until the test answers it through the request channel,
/// so tests choose completion order.
pub struct GatedSource<P, T> {
    requests: mpsc::UnboundedSender<(P, Reply<T>)>,
}

impl<P, T> GatedSource<P, T> {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(P, Reply<T>)>) {
        let (requests, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { requests }), rx)
    }
}

#[async_trait]
impl<P, T> TelemetrySource<P, T> for GatedSource<P, T>
where
    P: Send + 'static,
    T: Send + 'static,
{
    async fn fetch(&self, params: P) -> TelemetryResult<T> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send((params, tx))
            .map_err(|_| TelemetryError::Network("test harness gone".to_string()))?;
        rx.await
            .unwrap_or_else(|_| Err(TelemetryError::Network("reply dropped".to_string())))
    }
}

/// Answers every fetch at once with the same payload
pub struct StaticSource<T> {
    payload: T,
}

impl<T> StaticSource<T> {
    pub fn new(payload: T) -> Arc<Self> {
        Arc::new(Self { payload })
    }
}

#[async_trait]
impl<P, T> TelemetrySource<P, T> for StaticSource<T>
where
    P: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, _params: P) -> TelemetryResult<T> {
        Ok(self.payload.clone())
    }
}

/// Keeps every utterance instead of speaking it
#[derive(Default)]
pub struct RecordingSink {
    pub spoken: Mutex<Vec<String>>,
}

impl AnnouncementSink for RecordingSink {
    fn speak(&self, utterance: &str) -> anyhow::Result<()> {
        self.spoken.lock().push(utterance.to_string());
        Ok(())
    }
}

pub fn body_position(name: &str, alt: f64, az: f64) -> BodyPosition {
    BodyPosition {
        name: name.to_string(),
        altitude_degrees: alt,
        azimuth_degrees: az,
        is_visible: alt > 0.0,
    }
}

/// Three planets, two of them above the horizon
pub fn planets_response(time_utc: &str, lat: f64, lon: f64) -> PlanetsResponse {
    PlanetsResponse {
        time_utc: time_utc.to_string(),
        lat,
        lon,
        planets: vec![
            body_position("Mars", 12.5, 101.25),
            body_position("Jupiter", 40.2, 180.0),
            body_position("Venus", -8.7, 265.0),
        ],
    }
}

pub fn inner_solar_system(time_utc: &str) -> SolarSystemResponse {
    let body = |name: &str, x: f64, y: f64, r: f64| HeliocentricBody {
        name: name.to_string(),
        x,
        y,
        true_radius_au: r,
    };
    SolarSystemResponse {
        time_utc: time_utc.to_string(),
        bodies: vec![
            body("Mercury", 0.3, 0.25, 0.39),
            body("Venus", -0.7, 0.17, 0.72),
            body("Earth", 0.9, -0.44, 1.0),
        ],
    }
}

/// Run every ready task to completion without reaching a poll tick.
/// Needs a paused clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
