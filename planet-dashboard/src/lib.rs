pub mod config;
pub mod error;
pub mod logging;
pub mod projection;
pub mod relay;
pub mod server;
pub mod telemetry;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
