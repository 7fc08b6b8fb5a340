use chrono::{DateTime, Utc};
use planet_common::{PlanetsResponse, SolarSystemResponse};
use serde::Serialize;

use crate::error::ErrorKind;

/// Identity of one poll cycle.
///
/// `generation` changes on every stop/restart of a poller; `seq` increases
/// for every cycle a poller ever issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CycleId {
    pub generation: u64,
    pub seq: u64,
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}#{}", self.generation, self.seq)
    }
}

/// Payloads that carry the ephemeris time they were computed for
pub trait Stamped {
    fn time_utc(&self) -> &str;
}

impl Stamped for PlanetsResponse {
    fn time_utc(&self) -> &str {
        &self.time_utc
    }
}

impl Stamped for SolarSystemResponse {
    fn time_utc(&self) -> &str {
        &self.time_utc
    }
}

/// Latest reconciled result of one feed.
///
/// Before the first cycle completes both `payload` and `last_error` are
/// `None`; afterwards exactly one of them is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot<T> {
    pub payload: Option<T>,
    pub timestamp_utc_text: Option<String>,
    pub last_error: Option<ErrorKind>,
    pub cycle: Option<CycleId>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> TelemetrySnapshot<T> {
    pub fn awaiting() -> Self {
        Self {
            payload: None,
            timestamp_utc_text: None,
            last_error: None,
            cycle: None,
            fetched_at: None,
        }
    }

    pub fn failure(cycle: CycleId, kind: ErrorKind) -> Self {
        Self {
            payload: None,
            timestamp_utc_text: None,
            last_error: Some(kind),
            cycle: Some(cycle),
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.payload.is_none() && self.last_error.is_none()
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }
}

impl<T: Stamped> TelemetrySnapshot<T> {
    pub fn success(cycle: CycleId, payload: T) -> Self {
        Self {
            timestamp_utc_text: Some(payload.time_utc().to_string()),
            payload: Some(payload),
            last_error: None,
            cycle: Some(cycle),
            fetched_at: Some(Utc::now()),
        }
    }
}

impl<T> Default for TelemetrySnapshot<T> {
    fn default() -> Self {
        Self::awaiting()
    }
}
