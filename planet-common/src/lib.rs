pub mod types;

pub use types::{
    default_locations, BodyPosition, Feed, HeliocentricBody, LocationError, ObserverLocation,
    PlanetsResponse, SolarSystemResponse,
};
