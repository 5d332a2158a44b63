//! Adaptive step integrator for rocket trajectories.
//!
//! Each call to [`step`] produces one segment of the trajectory polyline.
//! The scheme is a midpoint predictor: the gravity at the start of the
//! segment and at a predicted end point are averaged and applied over the
//! step. The step size follows the curvature of the path, measured as the
//! area spanned by the displacement and the velocity change of the segment.

use bevy::log::debug;
use bevy::math::DVec2;

use super::gravity::GravityField;
use crate::body::BodyId;
use crate::config::IntegratorConfig;
use crate::types::RocketState;

/// One accepted step of a trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// State at the start of the step.
    pub start: RocketState,
    /// State at the end of the step.
    pub end: RocketState,
    /// Step size in seconds.
    pub dt: f64,
    /// Curvature error estimate of the accepted step.
    pub error: f64,
}

impl Segment {
    /// Distance covered by the segment.
    ///
    /// Taken from the displacement, not from the cumulative distances, which
    /// lose precision as a session grows.
    pub fn length(&self) -> f64 {
        self.start.pos.distance(self.end.pos)
    }

    /// Whether `time` lies within the segment (inclusive).
    pub fn contains_time(&self, time: f64) -> bool {
        self.start.time <= time && time <= self.end.time
    }

    /// Position at `time`, interpolated linearly along the segment.
    ///
    /// Times outside the segment are clamped to its end points.
    pub fn position_at(&self, time: f64) -> DVec2 {
        let span = self.end.time - self.start.time;
        if span <= 0.0 {
            return self.end.pos;
        }
        let d = ((time - self.start.time) / span).clamp(0.0, 1.0);
        self.start.pos.lerp(self.end.pos, d)
    }
}

/// Result of one integrator call.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// The accepted segment.
    pub segment: Segment,
    /// Suggested step size for the next call, already clamped.
    pub next_dt: f64,
    /// Number of attempts, including the accepted one.
    pub attempts: u32,
    /// Whether the step was accepted over tolerance because the minimum step
    /// or the retry cap was reached.
    pub underflow: bool,
}

/// Curvature error of a step.
///
/// Half the area of the parallelogram spanned by the displacement `vel * dt`
/// and the velocity change `acc * dt`. Zero on a straight path, largest when
/// gravity acts perpendicular to the motion.
#[inline]
pub fn curvature_error(vel: DVec2, acc: DVec2, dt: f64) -> f64 {
    (vel * dt).perp_dot(acc * dt).abs() * 0.5
}

/// A trial of one step size.
struct Trial {
    dt: f64,
    acc: DVec2,
    error: f64,
}

/// Evaluate averaged gravity and error for step size `dt`.
#[inline]
fn attempt(field: &GravityField, s0: &RocketState, g0: DVec2, dt: f64) -> Trial {
    // Predict with a unit-time impulse of the start gravity
    let predicted_vel = s0.vel + g0;
    let predicted_pos = s0.pos + predicted_vel * dt;

    let g1 = field.acceleration(predicted_pos, s0.time + dt, None);
    let acc = (g0 + g1) * 0.5;

    Trial {
        dt,
        acc,
        error: curvature_error(s0.vel, acc, dt),
    }
}

/// Advance `s0` by one segment.
///
/// `dt_hint` is clamped to the configured bounds before use. A step that
/// exceeds the error tolerance is retried with a smaller step, at most
/// `max_retries` times and never below `min_dt`; when neither helps the step
/// is accepted anyway and flagged as an underflow, so a flight always makes
/// progress.
///
/// `excluded_at_start` removes one body from the gravity at the start point
/// only; it is the launch body right after lift-off.
pub fn step(
    field: &GravityField,
    s0: &RocketState,
    dt_hint: f64,
    excluded_at_start: Option<BodyId>,
    config: &IntegratorConfig,
) -> StepResult {
    let g0 = field.acceleration(s0.pos, s0.time, excluded_at_start);

    let mut trial = attempt(field, s0, g0, config.clamp_dt(dt_hint));
    let mut retries = 0;
    while trial.error > config.error_tolerance
        && trial.dt > config.min_dt
        && retries < config.max_retries
    {
        retries += 1;
        let dt = (trial.dt * config.shrink_factor).max(config.min_dt);
        trial = attempt(field, s0, g0, dt);
    }

    let underflow = trial.error > config.error_tolerance;
    if underflow {
        debug!(
            "step underflow at t={:.3}: error {:.3e} over tolerance {:.3e} with dt={:.3e}",
            s0.time, trial.error, config.error_tolerance, trial.dt
        );
    }

    // Lengthen steps on gently curving arcs, but only if the first guess was
    // good enough
    let next_dt = if retries == 0 && trial.error < config.error_tolerance * config.growth_threshold
    {
        trial.dt * config.growth_factor
    } else {
        trial.dt
    };

    let dt = trial.dt;
    let vel = s0.vel + trial.acc * dt;
    let pos = s0.pos + vel * dt;
    let end = RocketState {
        pos,
        vel,
        time: s0.time + dt,
        fuel_used: s0.fuel_used,
        distance: s0.distance + (pos - s0.pos).length(),
        resting_on: None,
    };

    StepResult {
        segment: Segment {
            start: s0.clone(),
            end,
            dt,
            error: trial.error,
        },
        next_dt: config.clamp_dt(next_dt),
        attempts: retries + 1,
        underflow,
    }
}

// =============================================================================
// Tests
// =============================================================================
