use planet_dashboard::config;
use planet_dashboard::relay::{sink_from_config, InteractionRelay};
use planet_dashboard::server::{self, AppState};
use planet_dashboard::telemetry::EphemerisClient;
use planet_dashboard::view::{SyncSettings, ViewSynchronizer};

use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = planet_dashboard::logging::init_logging(
        &config.log_dir,
        "planet-dashboard",
        &config.log_level,
    )?;

    tracing::info!("Planet dashboard starting...");
    tracing::info!("Ephemeris service at {}", config.ephemeris.base_url);

    let client = Arc::new(EphemerisClient::new(&config.ephemeris)?);
    let dashboard = Arc::new(ViewSynchronizer::mount(
        config.initial_location()?,
        SyncSettings::from(config),
        client.clone(),
        client,
    ));

    // Log what the render surface would redraw
    let mut updates = dashboard.updates();
    let update_logger = tokio::spawn(async move {
        while let Some(view) = updates.next().await {
            tracing::debug!("{} | {}", view.header_text(), view.display_text());
        }
    });

    let state = AppState {
        dashboard: dashboard.clone(),
        relay: InteractionRelay::new(sink_from_config(&config.speech)),
        locations: Arc::new(config.locations.clone()),
        canvas_size_px: config.display.canvas_size_px,
    };

    let result = server::serve(&config.server_address(), state).await;

    update_logger.abort();
    drop(dashboard);
    tracing::info!("Planet dashboard stopped");

    result
}
