//! Gravity - Rocket Launch Simulator
//!
//! A library crate simulating a rocket's flight through the gravity field of
//! rotating planets and black holes: adaptive-step trajectory integration,
//! landing and loss detection, and per-game telemetry.

pub mod body;
pub mod collision;
pub mod config;
pub mod outcome;
pub mod physics;
pub mod session;
pub mod trajectory;
pub mod types;

#[cfg(test)]
pub mod test_utils;
