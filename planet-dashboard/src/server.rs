//! JSON render surface for presentation code
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use planet_common::{LocationError, ObserverLocation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::relay::{utterance, InteractionRelay};
use crate::view::{RenderedView, ViewSynchronizer};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<ViewSynchronizer>,
    pub relay: InteractionRelay,
    pub locations: Arc<Vec<ObserverLocation>>,
    pub canvas_size_px: f64,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(#[from] LocationError),

    #[error("latitude and longitude must be given together")]
    PartialCoordinates,

    #[error("No planet named {0} in the current telemetry")]
    UnknownBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownLocation(_) | ApiError::UnknownBody(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidLocation(_) | ApiError::PartialCoordinates => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AnnounceResponse {
    pub utterance: String,
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn view(State(state): State<AppState>) -> Json<RenderedView> {
    Json(state.dashboard.current().render(state.canvas_size_px))
}

async fn locations(State(state): State<AppState>) -> Json<Vec<ObserverLocation>> {
    Json(state.locations.as_ref().clone())
}

async fn select_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<ObserverLocation>, ApiError> {
    let location = match (request.latitude, request.longitude) {
        (Some(latitude), Some(longitude)) => {
            ObserverLocation::new(request.name, latitude, longitude)?
        }
        (None, None) => state
            .locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(&request.name))
            .cloned()
            .ok_or(ApiError::UnknownLocation(request.name))?,
        _ => return Err(ApiError::PartialCoordinates),
    };

    state.dashboard.select_location(location.clone());
    Ok(Json(location))
}

async fn announce(
    State(state): State<AppState>,
    Json(request): Json<AnnounceRequest>,
) -> Result<(StatusCode, Json<AnnounceResponse>), ApiError> {
    let view = state.dashboard.current();
    let body = view
        .find_planet(&request.name)
        .ok_or(ApiError::UnknownBody(request.name.clone()))?;

    state.relay.announce(body);
    Ok((
        StatusCode::ACCEPTED,
        Json(AnnounceResponse {
            utterance: utterance(body),
        }),
    ))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/view", get(view))
        .route("/api/locations", get(locations))
        .route("/api/location", put(select_location))
        .route("/api/announce", post(announce))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C
pub async fn serve(address: &str, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Render surface listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
