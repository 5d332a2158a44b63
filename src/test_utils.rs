//! Test utilities for flight simulation tests.
//!
//! Provides fixtures for small gravity fields in natural units (G = 1) and
//! assertions for physical invariants like energy conservation.

use bevy::math::DVec2;

use crate::body::{Body, BodyId, BodyKind};
use crate::config::{FlightConfig, IntegratorConfig, PlayArea};
use crate::physics::GravityField;

/// Fixtures for creating test fields and configurations.
pub mod fixtures {
    use super::*;

    /// Mass of the fixture planet.
    pub const MASS: f64 = 1000.0;

    /// Radius of the fixture planet.
    pub const RADIUS: f64 = 10.0;

    /// A single static planet of mass [`MASS`] and radius [`RADIUS`] at the
    /// origin.
    pub fn single_planet_bodies() -> Vec<Body> {
        vec![Body::new(BodyId(0), BodyKind::Normal, MASS, RADIUS, DVec2::ZERO)]
    }

    /// [`single_planet_bodies`] in a field with G = 1.
    pub fn single_planet() -> GravityField {
        GravityField::from_config(single_planet_bodies(), &config(1000.0))
    }

    /// A planet at the origin and a black hole 200 m to its right, wide
    /// enough that a rocket flying along the axis cannot step over it.
    pub fn planet_and_black_hole_bodies() -> Vec<Body> {
        vec![
            Body::new(BodyId(0), BodyKind::Normal, MASS, RADIUS, DVec2::ZERO),
            Body::black_hole(BodyId(1), 0.5 * MASS, RADIUS, DVec2::new(200.0, 0.0)),
        ]
    }

    /// [`planet_and_black_hole_bodies`] in a field with G = 1.
    pub fn planet_and_black_hole() -> GravityField {
        GravityField::from_config(planet_and_black_hole_bodies(), &config(1000.0))
    }

    /// Flight configuration in natural units with a disc-shaped play area of
    /// radius `bound` around the origin.
    pub fn config(bound: f64) -> FlightConfig {
        FlightConfig {
            gravity: 1.0,
            field_epsilon: 1e-9,
            integrator: IntegratorConfig {
                initial_dt: 0.01,
                min_dt: 1e-5,
                max_dt: 0.5,
                error_tolerance: 0.05,
                ..Default::default()
            },
            play_area: PlayArea::centered(bound),
            max_segments: 500_000,
            max_flight_length: 1e9,
            launch_clearance: 1e-6,
            ..Default::default()
        }
    }

    /// Escape speed from the surface of the fixture planet.
    pub fn surface_escape_speed() -> f64 {
        (2.0 * MASS / RADIUS).sqrt()
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Specific orbital energy around a point mass `gm` at the origin.
    ///
    /// E = v²/2 - GM/r
    pub fn orbital_energy(pos: DVec2, vel: DVec2, gm: f64) -> f64 {
        0.5 * vel.length_squared() - gm / pos.length()
    }

    /// Specific angular momentum (2D scalar).
    pub fn angular_momentum(pos: DVec2, vel: DVec2) -> f64 {
        pos.x * vel.y - pos.y * vel.x
    }

    /// Assert that two vectors agree within a relative tolerance.
    ///
    /// # Panics
    /// Panics if the vectors differ by more than `tolerance * |expected|`.
    pub fn assert_vec_close(actual: DVec2, expected: DVec2, tolerance: f64) {
        let scale = expected.length().max(1e-300);
        let diff = (actual - expected).length();
        assert!(
            diff <= tolerance * scale,
            "vectors differ: actual={actual:?}, expected={expected:?}, relative diff={:.3e}",
            diff / scale
        );
    }
}

/// Utilities for creating headless Bevy apps for testing.
pub mod bevy_test {
    use bevy::prelude::*;

    /// Create a minimal Bevy app for testing without rendering.
    ///
    /// This app uses MinimalPlugins for a lightweight test environment.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixture_config_is_valid() {
        assert_eq!(fixtures::config(1000.0).validate(), Ok(()));
    }

    #[test]
    fn test_escape_speed_matches_body() {
        let field = fixtures::single_planet();
        let body = &field.bodies()[0];
        assert_relative_eq!(
            body.surface_escape_speed(field.gravity()),
            fixtures::surface_escape_speed()
        );
    }

    #[test]
    fn test_escape_speed_has_zero_energy() {
        let pos = DVec2::new(fixtures::RADIUS, 0.0);
        let vel = DVec2::new(fixtures::surface_escape_speed(), 0.0);
        let energy = assertions::orbital_energy(pos, vel, fixtures::MASS);
        assert_relative_eq!(energy, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angular_momentum_perpendicular() {
        let l = assertions::angular_momentum(DVec2::new(2.0, 0.0), DVec2::new(0.0, 3.0));
        assert_relative_eq!(l, 6.0);
    }
}
