//! Telemetry feeds
//!
//! - `source`: the data-source seam pollers fetch through
//! - `api_client`: the HTTP implementation against the ephemeris service
//! - `poller`: recurring fetch cycles with stale-result suppression
//! - `snapshot`: what a poller hands to its owner after each applied cycle

pub mod api_client;
pub mod poller;
pub mod snapshot;
pub mod source;

pub use api_client::EphemerisClient;
pub use poller::{PollerHandle, PollerStatus};
pub use snapshot::{CycleId, Stamped, TelemetrySnapshot};
pub use source::TelemetrySource;
