use planet_common::{BodyPosition, ObserverLocation, PlanetsResponse, SolarSystemResponse};
use serde::Serialize;

use crate::projection::{project, ProjectedBody};
use crate::telemetry::TelemetrySnapshot;

pub const AWAITING_TEXT: &str = "Linking to ephemeris...";
pub const LINK_LOST_TEXT: &str = "Telemetry link lost. Retrying...";
pub const SOLAR_SYSTEM_LOADING_TEXT: &str = "Loading solar system...";

/// Everything the dashboard renders, reconciled from both feeds
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    location: ObserverLocation,
    observer: TelemetrySnapshot<PlanetsResponse>,
    solar_system: TelemetrySnapshot<SolarSystemResponse>,
    /// Last good layout; a failed solar-system cycle keeps it
    projected: Vec<ProjectedBody>,
    solar_time_utc: Option<String>,
    max_screen_radius_px: f64,
}

impl ViewState {
    pub fn new(location: ObserverLocation, max_screen_radius_px: f64) -> Self {
        Self {
            location,
            observer: TelemetrySnapshot::awaiting(),
            solar_system: TelemetrySnapshot::awaiting(),
            projected: Vec::new(),
            solar_time_utc: None,
            max_screen_radius_px,
        }
    }

    pub fn location(&self) -> &ObserverLocation {
        &self.location
    }

    pub fn observer(&self) -> &TelemetrySnapshot<PlanetsResponse> {
        &self.observer
    }

    pub fn solar_system(&self) -> &TelemetrySnapshot<SolarSystemResponse> {
        &self.solar_system
    }

    /// Planets in service order; empty unless the latest observer cycle succeeded
    pub fn planets(&self) -> &[BodyPosition] {
        self.observer
            .payload()
            .map(|p| p.planets.as_slice())
            .unwrap_or_default()
    }

    pub fn find_planet(&self, name: &str) -> Option<&BodyPosition> {
        self.planets()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn visible_count(&self) -> usize {
        self.planets().iter().filter(|p| p.is_visible).count()
    }

    pub fn display_text(&self) -> String {
        match (&self.observer.payload, &self.observer.last_error) {
            (Some(data), _) => format!(
                "UTC {}  •  LAT {:.4}  •  LON {:.4}",
                data.time_utc, data.lat, data.lon
            ),
            (None, Some(_)) => LINK_LOST_TEXT.to_string(),
            (None, None) => AWAITING_TEXT.to_string(),
        }
    }

    /// e.g. "Mission target: Paris • Visible bodies: 2"
    pub fn header_text(&self) -> String {
        format!(
            "Mission target: {} • Visible bodies: {}",
            self.location.name,
            self.visible_count()
        )
    }

    pub fn projected_bodies(&self) -> &[ProjectedBody] {
        &self.projected
    }

    pub fn solar_time_text(&self) -> String {
        match &self.solar_time_utc {
            Some(time) => format!("Ephemeris time: {}", time),
            None => SOLAR_SYSTEM_LOADING_TEXT.to_string(),
        }
    }

    /// New selection: the old location's telemetry no longer applies
    pub(crate) fn select_location(&mut self, location: ObserverLocation) {
        self.location = location;
        self.observer = TelemetrySnapshot::awaiting();
    }

    pub(crate) fn apply_observer(&mut self, snapshot: TelemetrySnapshot<PlanetsResponse>) {
        self.observer = snapshot;
    }

    pub(crate) fn apply_solar_system(&mut self, snapshot: TelemetrySnapshot<SolarSystemResponse>) {
        if let Some(data) = snapshot.payload() {
            self.projected = project(&data.bodies, self.max_screen_radius_px);
            self.solar_time_utc = Some(data.time_utc.clone());
        }
        self.solar_system = snapshot;
    }

    /// Serializable form for the render surface, laid out on a square canvas
    pub fn render(&self, canvas_size_px: f64) -> RenderedView {
        let center = (canvas_size_px / 2.0, canvas_size_px / 2.0);

        RenderedView {
            location: self.location.clone(),
            header_text: self.header_text(),
            visible_count: self.visible_count(),
            display_text: self.display_text(),
            planets: self
                .planets()
                .iter()
                .map(|body| RenderedPlanet {
                    status: body.status_label(),
                    meta: body.meta_text(),
                    body: body.clone(),
                })
                .collect(),
            solar_time_text: self.solar_time_text(),
            canvas_size_px,
            bodies: self
                .projected
                .iter()
                .map(|body| {
                    let (x, y) = body.screen_point(center);
                    RenderedBody {
                        tooltip: body.tooltip(),
                        orbit_radius_px: body.screen_radius_px,
                        x,
                        y,
                        body: body.clone(),
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPlanet {
    #[serde(flatten)]
    pub body: BodyPosition,
    pub status: &'static str,
    pub meta: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedBody {
    #[serde(flatten)]
    pub body: ProjectedBody,
    pub orbit_radius_px: f64,
    pub x: f64,
    pub y: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub location: ObserverLocation,
    pub header_text: String,
    pub visible_count: usize,
    pub display_text: String,
    pub planets: Vec<RenderedPlanet>,
    pub solar_time_text: String,
    pub canvas_size_px: f64,
    pub bodies: Vec<RenderedBody>,
}
