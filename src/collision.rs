//! Event detection for a rocket in flight.
//!
//! After every accepted segment the end state is checked, in this order:
//! - Landing: the rocket is on or inside a body (a black hole captures it)
//! - Out of bounds: the rocket left the play area
//! - Path limit: the flight used up its segment or length budget
//!
//! Only the end state of a segment is checked, so a fast rocket may tunnel
//! through a small body within one segment.

use std::f64::consts::TAU;

use bevy::math::DVec2;

use crate::body::{Body, BodyId};
use crate::config::FlightConfig;
use crate::physics::{GravityField, Segment};
use crate::types::RocketState;

/// Event that ends a flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightEvent {
    /// Reached the surface of a planet.
    Touchdown(BodyId),
    /// Fell into a black hole.
    Captured(BodyId),
    /// Left the play area.
    OutOfBounds,
    /// Used up the segment or length budget.
    PathLimit,
}

/// How much of its budget the current flight has used.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightProgress {
    /// Segments accepted so far.
    pub segments: usize,
    /// Distance flown so far (meters).
    pub distance: f64,
}

/// Check the end state of a segment for an event that ends the flight.
pub fn detect_event(
    field: &GravityField,
    config: &FlightConfig,
    state: &RocketState,
    progress: FlightProgress,
) -> Option<FlightEvent> {
    if let Some(body) = field.containing_body(state.pos, state.time) {
        return Some(if body.is_black_hole() {
            FlightEvent::Captured(body.id())
        } else {
            FlightEvent::Touchdown(body.id())
        });
    }

    if !config.play_area.contains(state.pos) {
        return Some(FlightEvent::OutOfBounds);
    }

    if progress.segments > config.max_segments || progress.distance > config.max_flight_length {
        return Some(FlightEvent::PathLimit);
    }

    None
}

/// Fraction of the way from `start` to `end` at which the straight line
/// enters a circle.
///
/// Returns `None` if `start` is already inside the circle or the line misses
/// it within `[start, end]`.
pub fn entry_fraction(start: DVec2, end: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    let from_center = start - center;
    let travel = end - start;

    let a = travel.length_squared();
    let b = 2.0 * from_center.dot(travel);
    let c = from_center.length_squared() - radius * radius;
    if c <= 0.0 || a == 0.0 {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    // Smaller root: where the line first crosses the circle
    let d = (-b - discriminant.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&d).then_some(d)
}

/// A landing segment cut back to the point where it meets the planet surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Touchdown {
    /// The segment, ending on the surface with zero velocity.
    pub segment: Segment,
    /// Touchdown point in the planet's rotating frame.
    pub surface_angle: f64,
    /// Speed just before touchdown.
    pub impact_speed: f64,
}

/// Clip a segment that ends inside `body` to the body's surface.
///
/// The circle is taken at the body's position at the end of the segment.
/// Time and distance are interpolated by the same fraction as the position.
/// A segment that starts inside the body is left at full length.
pub fn clip_to_surface(segment: &Segment, body: &Body) -> Touchdown {
    let start = &segment.start;
    let end = &segment.end;
    let center = body.position_at(end.time);
    let d = entry_fraction(start.pos, end.pos, center, body.radius()).unwrap_or(1.0);

    let time = start.time + segment.dt * d;
    let pos = start.pos.lerp(end.pos, d);
    let delta = pos - center;
    let surface_angle = (delta.y.atan2(delta.x) - body.angular_velocity() * time).rem_euclid(TAU);

    let clipped = Segment {
        start: start.clone(),
        end: RocketState {
            pos,
            vel: DVec2::ZERO,
            time,
            fuel_used: end.fuel_used,
            distance: start.distance + (end.distance - start.distance) * d,
            resting_on: Some(body.id()),
        },
        dt: segment.dt * d,
        error: segment.error,
    };

    Touchdown {
        segment: clipped,
        surface_angle,
        impact_speed: end.vel.length(),
    }
}
