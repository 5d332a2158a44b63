//! Core physics types and constants for the launch simulation.

use bevy::math::DVec2;

use crate::body::BodyId;

/// Physical constants (SI units)

/// Gravitational constant (m³·kg⁻¹·s⁻²)
pub const G: f64 = 6.67408e-11;

/// Radius of a normal planet in meters (earth radius)
pub const PLANET_RADIUS: f64 = 6_371_000.0;

/// Shared planet density in kg/m³.
///
/// A hundred times earth's density, so that planets a few radii apart
/// visibly bend a trajectory.
pub const PLANET_DENSITY: f64 = 551_000.0;

/// Mean planet rotation in rad/s (earth's sidereal rate)
pub const PLANET_ROTATION: f64 = 7.292_115e-5;

/// Width of the default play area in meters
pub const PLAY_AREA_WIDTH: f64 = 4e8;

/// Height of the default play area in meters
pub const PLAY_AREA_HEIGHT: f64 = 2.8e8;

/// Kinematic state of the rocket.
///
/// A state with `resting_on == Some(_)` describes a rocket sitting on a
/// body surface; every in-flight state has `resting_on == None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RocketState {
    /// Position in meters
    pub pos: DVec2,
    /// Velocity in meters per second
    pub vel: DVec2,
    /// Simulated time in seconds
    pub time: f64,
    /// Fuel used up to this state (speed units, see [`crate::config::FuelPolicy`])
    pub fuel_used: f64,
    /// Distance flown up to this state in meters
    pub distance: f64,
    /// Body the rocket is resting on, if it is not in flight
    pub resting_on: Option<BodyId>,
}

impl RocketState {
    /// Create an in-flight state.
    pub fn in_flight(pos: DVec2, vel: DVec2, time: f64) -> Self {
        Self {
            pos,
            vel,
            time,
            ..Default::default()
        }
    }

    /// Whether the rocket is moving (not resting on a body).
    pub fn is_in_flight(&self) -> bool {
        self.resting_on.is_none()
    }

    /// Speed in m/s
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}
