use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two telemetry feeds the dashboard polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feed {
    #[serde(rename = "observer")]
    Observer,
    #[serde(rename = "solar_system")]
    SolarSystem,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Observer => "observer",
            Feed::SolarSystem => "solar_system",
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("location name must not be empty")]
    EmptyName,
}

/// A ground station the planets are observed from.
///
/// Locations are replaced wholesale when the selection changes, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub name: String,
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
}

impl ObserverLocation {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let location = Self {
            name: name.into(),
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<(), LocationError> {
        if self.name.trim().is_empty() {
            return Err(LocationError::EmptyName);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(LocationError::Latitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(LocationError::Longitude(self.longitude));
        }
        Ok(())
    }
}

impl std::fmt::Display for ObserverLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.4}, {:.4})", self.name, self.latitude, self.longitude)
    }
}

/// Built-in ground stations, in picker order
pub fn default_locations() -> Vec<ObserverLocation> {
    [
        ("Paris", 48.8566, 2.3522),
        ("London", 51.5074, -0.1278),
        ("Washington D.C.", 38.9072, -77.0369),
        ("Cairo", 30.0444, 31.2357),
        ("Glasgow", 55.8642, -4.2518),
        ("Wellington (NZ)", -41.2865, 174.7762),
    ]
    .into_iter()
    .map(|(name, latitude, longitude)| ObserverLocation {
        name: name.to_string(),
        latitude,
        longitude,
    })
    .collect()
}

/// Apparent position of one planet for one observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub name: String,
    #[serde(rename = "alt")]
    pub altitude_degrees: f64,
    #[serde(rename = "az")]
    pub azimuth_degrees: f64,
    /// Computed upstream as altitude > 0
    #[serde(rename = "visible")]
    pub is_visible: bool,
}

impl BodyPosition {
    pub fn status_label(&self) -> &'static str {
        if self.is_visible { "IN VIEW" } else { "BELOW HORIZON" }
    }

    /// e.g. "ALT 12.34° • AZ 100.00°"
    pub fn meta_text(&self) -> String {
        format!(
            "ALT {:.2}° • AZ {:.2}°",
            self.altitude_degrees, self.azimuth_degrees
        )
    }
}

/// Heliocentric position of one planet, in AU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeliocentricBody {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "r")]
    pub true_radius_au: f64,
}

impl HeliocentricBody {
    /// True orbital angle in the ecliptic plane
    pub fn angle_radians(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// Response of `GET /planets?lat=..&lon=..`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetsResponse {
    pub time_utc: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub planets: Vec<BodyPosition>,
}

/// Response of `GET /solar_system`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarSystemResponse {
    pub time_utc: String,
    /// Ordered from the sun outwards
    #[serde(default)]
    pub bodies: Vec<HeliocentricBody>,
}
