//! Common test utilities for integration tests.
//!
//! Everything is in natural units (G = 1) so flights stay short.

#![allow(dead_code)]

use bevy::math::DVec2;
use gravity::body::{Body, BodyId, BodyKind};
use gravity::config::{FlightConfig, IntegratorConfig, PlayArea};
use gravity::physics::GravityField;
use gravity::session::FlightSession;

/// Mass of the test planet.
pub const MASS: f64 = 1000.0;

/// Radius of the test planet.
pub const RADIUS: f64 = 10.0;

/// The test planet, resting at the origin.
pub fn planet() -> Body {
    Body::new(BodyId(0), BodyKind::Normal, MASS, RADIUS, DVec2::ZERO)
}

/// A single static planet at the origin.
pub fn single_planet() -> GravityField {
    GravityField::new(vec![planet()], 1.0).with_epsilon(1e-9)
}

/// Flight configuration in natural units with a disc-shaped play area of
/// radius `bound` and a step size capped at `max_dt`.
pub fn config(bound: f64, max_dt: f64) -> FlightConfig {
    FlightConfig {
        gravity: 1.0,
        field_epsilon: 1e-9,
        integrator: IntegratorConfig {
            initial_dt: max_dt.min(0.01),
            min_dt: 1e-5,
            max_dt,
            error_tolerance: 0.05,
            ..Default::default()
        },
        play_area: PlayArea::centered(bound),
        max_segments: 1_000_000,
        max_flight_length: 1e9,
        ..Default::default()
    }
}

/// A session on the single planet, rocket resting at surface angle 0.
pub fn session(bound: f64, max_dt: f64) -> FlightSession {
    FlightSession::new(vec![planet()], config(bound, max_dt), BodyId(0), 0.0)
        .expect("valid test session")
}

/// Escape speed from the surface of the test planet.
pub fn escape_speed() -> f64 {
    (2.0 * MASS / RADIUS).sqrt()
}

/// Specific orbital energy around the test planet.
pub fn orbital_energy(pos: DVec2, vel: DVec2) -> f64 {
    0.5 * vel.length_squared() - MASS / pos.length()
}
