//! Flight configuration.
//!
//! All values are plain numbers in SI units. An embedding application
//! (settings dialog, config file loader) changes them through
//! [`FlightConfig::set_option`], which enforces a per-option range and keeps
//! the configuration consistent as a whole.

use bevy::math::DVec2;
use bevy::prelude::Resource;

use crate::types::{G, PLAY_AREA_HEIGHT, PLAY_AREA_WIDTH};

/// Base of the exponential thrust scale.
pub const THRUST_BASE: f64 = 1.3;

/// Thrust settings range over `[-THRUST_SCALE, THRUST_SCALE]`.
pub const THRUST_SCALE: f64 = 2.5;

/// Launch speed for a thrust setting, relative to a body's escape speed.
///
/// Setting 0 launches at exactly escape speed; every unit multiplies the
/// speed by [`THRUST_BASE`]. The setting is clamped to the thrust range.
pub fn thrust_speed(escape_speed: f64, setting: f64) -> f64 {
    escape_speed * THRUST_BASE.powf(setting.clamp(-THRUST_SCALE, THRUST_SCALE))
}

/// Configuration errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no such option: {0}")]
    UnknownOption(String),

    #[error("value {value} for {name} is not a finite number")]
    NotFinite { name: &'static str, value: f64 },

    #[error("value {value} for {name} out of range ({min}, {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid step bounds: min_dt {min} must be positive and not above max_dt {max}")]
    InvalidDtBounds { min: f64, max: f64 },

    #[error("invalid play area: {0}")]
    InvalidPlayArea(&'static str),
}

/// Configuration for the adaptive step integrator.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegratorConfig {
    /// Step size of the first segment of a flight in seconds. Default: 1.
    pub initial_dt: f64,
    /// Minimum allowed step in seconds. Default: 1e-3.
    pub min_dt: f64,
    /// Maximum allowed step in seconds. Default: 60.
    pub max_dt: f64,
    /// Largest accepted curvature error per segment. Default: 5e5.
    pub error_tolerance: f64,
    /// Step multiplier on a rejected attempt. Default: 0.5.
    pub shrink_factor: f64,
    /// Step multiplier after an easy segment. Default: 1.5.
    pub growth_factor: f64,
    /// A first attempt with `error < error_tolerance * growth_threshold`
    /// grows the next step. Default: 0.5.
    pub growth_threshold: f64,
    /// Maximum number of shrink-and-retry rounds per segment. Default: 32.
    pub max_retries: u32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            initial_dt: 1.0,
            min_dt: 1e-3,
            max_dt: 60.0,
            error_tolerance: 5e5,
            shrink_factor: 0.5,
            growth_factor: 1.5,
            growth_threshold: 0.5,
            max_retries: 32,
        }
    }
}

impl IntegratorConfig {
    /// Clamp a step to the configured bounds.
    ///
    /// NaN, infinite and non-positive steps fall back to `min_dt`, so the
    /// integrator always advances.
    #[inline]
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            dt.clamp(self.min_dt, self.max_dt)
        } else {
            self.min_dt
        }
    }
}

/// How much fuel a launch costs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FuelPolicy {
    /// Every launch costs the same amount.
    Fixed(f64),
    /// A launch costs `factor * speed`.
    ProportionalToSpeed(f64),
}

impl Default for FuelPolicy {
    fn default() -> Self {
        FuelPolicy::ProportionalToSpeed(1.0)
    }
}

impl FuelPolicy {
    /// Fuel charged for a launch at `speed`.
    pub fn cost(&self, speed: f64) -> f64 {
        match *self {
            FuelPolicy::Fixed(amount) => amount,
            FuelPolicy::ProportionalToSpeed(factor) => factor * speed,
        }
    }

    fn value(&self) -> f64 {
        match *self {
            FuelPolicy::Fixed(v) | FuelPolicy::ProportionalToSpeed(v) => v,
        }
    }

    fn set_value(&mut self, value: f64) {
        match self {
            FuelPolicy::Fixed(v) | FuelPolicy::ProportionalToSpeed(v) => *v = value,
        }
    }
}

/// Region a rocket may fly in before it counts as lost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayArea {
    /// Axis-aligned rectangle (inclusive).
    Rect { min: DVec2, max: DVec2 },
    /// Disc around a center (inclusive).
    Circle { center: DVec2, radius: f64 },
}

impl Default for PlayArea {
    fn default() -> Self {
        PlayArea::Rect {
            min: DVec2::ZERO,
            max: DVec2::new(PLAY_AREA_WIDTH, PLAY_AREA_HEIGHT),
        }
    }
}

impl PlayArea {
    /// Disc of `radius` around the origin.
    pub fn centered(radius: f64) -> Self {
        PlayArea::Circle {
            center: DVec2::ZERO,
            radius,
        }
    }

    pub fn contains(&self, pos: DVec2) -> bool {
        match *self {
            PlayArea::Rect { min, max } => {
                pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
            }
            PlayArea::Circle { center, radius } => {
                (pos - center).length_squared() <= radius * radius
            }
        }
    }

    /// Width and height of the area's bounding box.
    pub fn size(&self) -> DVec2 {
        match *self {
            PlayArea::Rect { min, max } => max - min,
            PlayArea::Circle { radius, .. } => DVec2::splat(2.0 * radius),
        }
    }

    /// Lower-left corner of the area's bounding box.
    pub fn origin(&self) -> DVec2 {
        match *self {
            PlayArea::Rect { min, .. } => min,
            PlayArea::Circle { center, radius } => center - DVec2::splat(radius),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            PlayArea::Rect { min, max } => {
                if !(min.is_finite() && max.is_finite()) || min.x >= max.x || min.y >= max.y {
                    return Err(ConfigError::InvalidPlayArea("rectangle must have positive size"));
                }
            }
            PlayArea::Circle { center, radius } => {
                if !center.is_finite() || !(radius.is_finite() && radius > 0.0) {
                    return Err(ConfigError::InvalidPlayArea("circle must have positive radius"));
                }
            }
        }
        Ok(())
    }
}

/// Name and accepted range of a numeric option.
#[derive(Clone, Copy, Debug)]
pub struct OptionRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

const fn option(name: &'static str, min: f64, max: f64) -> OptionRange {
    OptionRange { name, min, max }
}

/// Configuration of a flight, read-only while a rocket is in the air.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct FlightConfig {
    /// Gravitational constant. Default: 6.67408e-11.
    pub gravity: f64,
    /// Distance below which a body exerts no force, in meters. Default: 1.
    pub field_epsilon: f64,
    /// Step size control.
    pub integrator: IntegratorConfig,
    /// Launch cost.
    pub fuel: FuelPolicy,
    /// Region the rocket must stay in.
    pub play_area: PlayArea,
    /// Segments per flight before the rocket is given up. Default: 200 000.
    pub max_segments: usize,
    /// Flight length before the rocket is given up, in meters.
    /// Default: ten play area widths.
    pub max_flight_length: f64,
    /// Launch height above the surface, relative to the body radius.
    /// Default: 1e-6.
    pub launch_clearance: f64,
    /// Whether a launched rocket keeps the surface velocity of its launch
    /// site. Default: true.
    pub inherit_body_velocity: bool,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            gravity: G,
            field_epsilon: 1.0,
            integrator: IntegratorConfig::default(),
            fuel: FuelPolicy::default(),
            play_area: PlayArea::default(),
            max_segments: 200_000,
            max_flight_length: PLAY_AREA_WIDTH * 10.0,
            launch_clearance: 1e-6,
            inherit_body_velocity: true,
        }
    }
}

impl FlightConfig {
    /// Numeric options accepted by [`FlightConfig::set_option`].
    pub const OPTIONS: &'static [OptionRange] = &[
        option("gravity", f64::MIN_POSITIVE, f64::MAX),
        option("field_epsilon", 0.0, f64::MAX),
        option("initial_dt", f64::MIN_POSITIVE, f64::MAX),
        option("min_dt", f64::MIN_POSITIVE, f64::MAX),
        option("max_dt", f64::MIN_POSITIVE, f64::MAX),
        option("error_tolerance", f64::MIN_POSITIVE, f64::MAX),
        option("shrink_factor", 0.05, 0.95),
        option("growth_factor", 1.0, 10.0),
        option("growth_threshold", 0.0, 1.0),
        option("max_retries", 1.0, 1000.0),
        option("fuel_cost", 0.0, f64::MAX),
        option("max_segments", 1.0, 1e9),
        option("max_flight_length", f64::MIN_POSITIVE, f64::MAX),
        option("launch_clearance", 0.0, 1.0),
    ];

    /// Range of a named option.
    pub fn option_range(name: &str) -> Option<&'static OptionRange> {
        Self::OPTIONS.iter().find(|o| o.name == name)
    }

    /// Read a named option.
    pub fn get_option(&self, name: &str) -> Result<f64, ConfigError> {
        let value = match name {
            "gravity" => self.gravity,
            "field_epsilon" => self.field_epsilon,
            "initial_dt" => self.integrator.initial_dt,
            "min_dt" => self.integrator.min_dt,
            "max_dt" => self.integrator.max_dt,
            "error_tolerance" => self.integrator.error_tolerance,
            "shrink_factor" => self.integrator.shrink_factor,
            "growth_factor" => self.integrator.growth_factor,
            "growth_threshold" => self.integrator.growth_threshold,
            "max_retries" => self.integrator.max_retries as f64,
            "fuel_cost" => self.fuel.value(),
            "max_segments" => self.max_segments as f64,
            "max_flight_length" => self.max_flight_length,
            "launch_clearance" => self.launch_clearance,
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        };
        Ok(value)
    }

    /// Set a named option.
    ///
    /// The value must be finite and inside the option's range, and the
    /// resulting configuration must pass [`FlightConfig::validate`].
    /// On error the configuration is unchanged.
    pub fn set_option(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let range =
            Self::option_range(name).ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        if !value.is_finite() {
            return Err(ConfigError::NotFinite {
                name: range.name,
                value,
            });
        }
        if value < range.min || value > range.max {
            return Err(ConfigError::OutOfRange {
                name: range.name,
                value,
                min: range.min,
                max: range.max,
            });
        }

        let mut updated = self.clone();
        match range.name {
            "gravity" => updated.gravity = value,
            "field_epsilon" => updated.field_epsilon = value,
            "initial_dt" => updated.integrator.initial_dt = value,
            "min_dt" => updated.integrator.min_dt = value,
            "max_dt" => updated.integrator.max_dt = value,
            "error_tolerance" => updated.integrator.error_tolerance = value,
            "shrink_factor" => updated.integrator.shrink_factor = value,
            "growth_factor" => updated.integrator.growth_factor = value,
            "growth_threshold" => updated.integrator.growth_threshold = value,
            "max_retries" => updated.integrator.max_retries = value.round() as u32,
            "fuel_cost" => updated.fuel.set_value(value),
            "max_segments" => updated.max_segments = value.round() as usize,
            "max_flight_length" => updated.max_flight_length = value,
            "launch_clearance" => updated.launch_clearance = value,
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-option consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for range in Self::OPTIONS {
            let value = self.get_option(range.name)?;
            if !value.is_finite() {
                return Err(ConfigError::NotFinite {
                    name: range.name,
                    value,
                });
            }
            if value < range.min || value > range.max {
                return Err(ConfigError::OutOfRange {
                    name: range.name,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let integrator = &self.integrator;
        if integrator.min_dt > integrator.max_dt {
            return Err(ConfigError::InvalidDtBounds {
                min: integrator.min_dt,
                max: integrator.max_dt,
            });
        }
        self.play_area.validate()
    }
}
