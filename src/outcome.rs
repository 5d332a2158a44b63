//! Terminal states of a flight.
//!
//! Every flight ends in exactly one outcome:
//! - Landed: the rocket touched down on a planet and rests there
//! - Lost: the rocket fell into a black hole, left the play area, or flew
//!   past the configured path limit

use bevy::math::DVec2;

use crate::body::BodyId;

/// Why a rocket was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// Swallowed by a black hole.
    Collision(BodyId),
    /// Left the play area.
    OutOfBounds,
    /// Exceeded the segment or flight length budget of a single flight.
    PathLimit,
}

/// Outcome of a flight.
#[derive(Clone, Debug, PartialEq)]
pub enum FlightOutcome {
    /// The rocket rests on a planet.
    Landed {
        /// Planet landed on.
        body: BodyId,
        /// Simulation time of touchdown (seconds).
        time: f64,
        /// Touchdown point (meters).
        position: DVec2,
        /// Touchdown point in the planet's rotating frame (radians).
        surface_angle: f64,
        /// Speed just before touchdown (m/s).
        impact_speed: f64,
    },

    /// The rocket is gone.
    Lost {
        /// What happened to it.
        reason: LossReason,
        /// Simulation time of the loss (seconds).
        time: f64,
        /// Last known position (meters).
        position: DVec2,
    },
}

impl FlightOutcome {
    /// Returns true if the rocket landed.
    pub fn is_landed(&self) -> bool {
        matches!(self, FlightOutcome::Landed { .. })
    }

    /// Returns true if the rocket was lost.
    pub fn is_lost(&self) -> bool {
        matches!(self, FlightOutcome::Lost { .. })
    }

    /// Planet the rocket landed on, if it landed.
    pub fn landed_on(&self) -> Option<BodyId> {
        match self {
            FlightOutcome::Landed { body, .. } => Some(*body),
            FlightOutcome::Lost { .. } => None,
        }
    }

    /// Reason of the loss, if the rocket was lost.
    pub fn loss_reason(&self) -> Option<LossReason> {
        match self {
            FlightOutcome::Lost { reason, .. } => Some(*reason),
            FlightOutcome::Landed { .. } => None,
        }
    }

    /// Simulation time at which the flight ended.
    pub fn time(&self) -> f64 {
        match self {
            FlightOutcome::Landed { time, .. } | FlightOutcome::Lost { time, .. } => *time,
        }
    }

    /// Final position of the rocket.
    pub fn position(&self) -> DVec2 {
        match self {
            FlightOutcome::Landed { position, .. } | FlightOutcome::Lost { position, .. } => {
                *position
            }
        }
    }
}
