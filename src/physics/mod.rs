//! Physics of a rocket flight.
//!
//! The gravity field sums the pull of every body at a point in space and
//! time; the integrator turns that field into trajectory segments with an
//! adaptive step size.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

pub use gravity::{GravityField, GravityGrid};
pub use integrator::{curvature_error, step, Segment, StepResult};
