//! Property-based tests for the gravity field and integrator using proptest.
//!
//! These tests verify invariants across a wide range of body layouts and
//! rocket states.

use bevy::math::DVec2;
use proptest::prelude::*;

use super::{step, GravityField};
use crate::body::{Body, BodyId, BodyKind};
use crate::config::IntegratorConfig;
use crate::test_utils::assertions;
use crate::types::RocketState;

fn field_with_masses(masses: &[f64], gravity: f64) -> GravityField {
    let bodies = masses
        .iter()
        .enumerate()
        .map(|(i, &mass)| {
            let angle = i as f64 * 2.1;
            Body::new(
                BodyId(i),
                BodyKind::Normal,
                mass,
                1.0,
                DVec2::new(angle.cos(), angle.sin()) * (50.0 + 20.0 * i as f64),
            )
            .with_orbit(5.0 + i as f64, 0.01 * (i as f64 - 1.0), angle)
        })
        .collect();
    GravityField::new(bodies, gravity).with_epsilon(1e-9)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A body stays on its orbital circle at all times.
    #[test]
    fn prop_position_on_orbit_circle(
        cx in -1e6f64..1e6,
        cy in -1e6f64..1e6,
        orbit_radius in 0.0f64..1e5,
        angular_velocity in -1.0f64..1.0,
        phase in -10.0f64..10.0,
        t in -1e4f64..1e4,
    ) {
        let center = DVec2::new(cx, cy);
        let body = Body::new(BodyId(0), BodyKind::Normal, 1.0, 1.0, center)
            .with_orbit(orbit_radius, angular_velocity, phase);

        let distance = (body.position_at(t) - center).length();
        let tolerance = 1e-9 * orbit_radius.max(1.0) + 1e-9 * center.length();
        prop_assert!(
            (distance - orbit_radius).abs() <= tolerance,
            "distance {} from center, orbit radius {}",
            distance, orbit_radius
        );
    }

    /// Scaling every mass by k scales the acceleration by k.
    #[test]
    fn prop_acceleration_linear_in_mass(
        k in 0.01f64..100.0,
        px in -200.0f64..200.0,
        py in -200.0f64..200.0,
        t in 0.0f64..1000.0,
    ) {
        let masses = [300.0, 1200.0, 50.0];
        let scaled: Vec<f64> = masses.iter().map(|m| m * k).collect();

        let pos = DVec2::new(px, py);
        let base = field_with_masses(&masses, 1.0).acceleration_at(pos, t);
        let heavy = field_with_masses(&scaled, 1.0).acceleration_at(pos, t);

        assertions::assert_vec_close(heavy, base * k, 1e-6);
    }

    /// Repeated evaluation gives bit-identical results.
    #[test]
    fn prop_acceleration_idempotent(
        px in -200.0f64..200.0,
        py in -200.0f64..200.0,
        t in 0.0f64..1000.0,
    ) {
        let field = field_with_masses(&[300.0, 1200.0, 50.0], 1.0);
        let pos = DVec2::new(px, py);
        let first = field.acceleration_at(pos, t);
        let second = field.acceleration_at(pos, t);
        prop_assert_eq!(first.x.to_bits(), second.x.to_bits());
        prop_assert_eq!(first.y.to_bits(), second.y.to_bits());
    }

    /// Every step advances time within the configured bounds and suggests a
    /// next step within them too.
    #[test]
    fn prop_step_respects_dt_bounds(
        px in -200.0f64..200.0,
        py in -200.0f64..200.0,
        vx in -20.0f64..20.0,
        vy in -20.0f64..20.0,
        hint in -10.0f64..10.0,
        tolerance in 1e-6f64..10.0,
    ) {
        let field = field_with_masses(&[300.0, 1200.0, 50.0], 1.0);
        let config = IntegratorConfig {
            initial_dt: 0.1,
            min_dt: 1e-3,
            max_dt: 2.0,
            error_tolerance: tolerance,
            ..Default::default()
        };
        let s0 = RocketState::in_flight(DVec2::new(px, py), DVec2::new(vx, vy), 3.0);
        let result = step(&field, &s0, hint, None, &config);

        let dt = result.segment.dt;
        prop_assert!(dt >= config.min_dt && dt <= config.max_dt, "dt {} out of bounds", dt);
        prop_assert!(result.next_dt >= config.min_dt && result.next_dt <= config.max_dt);
        prop_assert!(result.attempts >= 1 && result.attempts <= config.max_retries + 1);
        prop_assert!(result.segment.end.time > s0.time);
        prop_assert!(result.segment.end.distance >= s0.distance);
        prop_assert_eq!(result.underflow, result.segment.error > tolerance);
    }
}

#[cfg(test)]
mod deterministic_tests {
    use super::*;

    #[test]
    fn test_field_fixture_has_distinct_bodies() {
        let field = field_with_masses(&[1.0, 2.0, 3.0], 1.0);
        assert_eq!(field.bodies().len(), 3);
        assert_ne!(field.bodies()[0].position_at(0.0), field.bodies()[1].position_at(0.0));
    }
}
