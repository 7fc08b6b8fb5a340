//! Top-down schematic layout of the solar system
//!
//! Angles come straight from the ephemeris. Radii do not: true-to-scale
//! distances would bury the inner planets inside the sun's disc, so each body
//! gets an evenly spaced orbit ring chosen by its position in the list.

use planet_common::HeliocentricBody;
use serde::Serialize;

/// A body placed on the schematic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedBody {
    pub name: String,
    pub screen_angle_radians: f64,
    pub screen_radius_px: f64,
    /// Kept for tooltips only
    pub true_radius_au: f64,
}

impl ProjectedBody {
    /// Screen position around `center`. The y axis points down on screen, so
    /// increasing angle turns counter-clockwise visually.
    pub fn screen_point(&self, center: (f64, f64)) -> (f64, f64) {
        let (cx, cy) = center;
        (
            cx + self.screen_radius_px * self.screen_angle_radians.cos(),
            cy - self.screen_radius_px * self.screen_angle_radians.sin(),
        )
    }

    pub fn tooltip(&self) -> String {
        format!("{} (r={:.2} AU)", self.name, self.true_radius_au)
    }
}

/// Lay out `bodies` (ordered from the sun outwards) inside `max_screen_radius_px`.
///
/// Body `i` of `n` sits on the ring `max * (i + 1) / (n + 1)`, so radii are
/// strictly increasing and never reach the edge.
pub fn project(bodies: &[HeliocentricBody], max_screen_radius_px: f64) -> Vec<ProjectedBody> {
    let slots = (bodies.len() + 1) as f64;

    bodies
        .iter()
        .enumerate()
        .map(|(index, body)| ProjectedBody {
            name: body.name.clone(),
            screen_angle_radians: body.angle_radians(),
            screen_radius_px: max_screen_radius_px * (index + 1) as f64 / slots,
            true_radius_au: body.true_radius_au,
        })
        .collect()
}
