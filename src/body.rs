//! Gravitating bodies: planets the rocket can land on and black holes that
//! swallow it.
//!
//! A body never changes after construction. Only its derived position moves
//! with time, along a circle around its orbital center, and its surface spins
//! with the same angular velocity.

use std::f64::consts::TAU;
use std::fmt;

use bevy::math::DVec2;

/// Index of a body within its [`crate::physics::GravityField`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Size class of a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Small,
    Normal,
    Large,
    BlackHole,
}

impl BodyKind {
    /// Radius relative to a normal planet.
    pub fn radius_factor(self) -> f64 {
        match self {
            BodyKind::Small => 0.66,
            BodyKind::Normal => 1.0,
            BodyKind::Large => 1.5,
            BodyKind::BlackHole => 0.5,
        }
    }

    /// Density relative to the shared planet density.
    pub fn density_factor(self) -> f64 {
        match self {
            BodyKind::BlackHole => 500.0,
            _ => 1.0,
        }
    }

    /// Whether a rocket reaching the surface lands (planets) or is lost
    /// (black holes).
    pub fn allows_landing(self) -> bool {
        !matches!(self, BodyKind::BlackHole)
    }
}

/// A planet or black hole moving on a circle.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    id: BodyId,
    kind: BodyKind,
    mass: f64,
    radius: f64,
    orbit_center: DVec2,
    orbit_radius: f64,
    angular_velocity: f64,
    phase: f64,
}

impl Body {
    /// Create a static, non-rotating body sitting at `center`.
    pub fn new(id: BodyId, kind: BodyKind, mass: f64, radius: f64, center: DVec2) -> Self {
        Self {
            id,
            kind,
            mass,
            radius,
            orbit_center: center,
            orbit_radius: 0.0,
            angular_velocity: 0.0,
            phase: 0.0,
        }
    }

    /// Create a body whose radius and density derive from the shared planet
    /// parameters and its size class.
    ///
    /// `mass = density · 4/3 · π · r³`
    pub fn planet(
        id: BodyId,
        kind: BodyKind,
        base_radius: f64,
        base_density: f64,
        center: DVec2,
    ) -> Self {
        let radius = base_radius * kind.radius_factor();
        let density = base_density * kind.density_factor();
        let mass = density * 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3);
        Self::new(id, kind, mass, radius, center)
    }

    /// Create a black hole with a configured mass and capture radius.
    pub fn black_hole(id: BodyId, mass: f64, capture_radius: f64, center: DVec2) -> Self {
        Self::new(id, BodyKind::BlackHole, mass, capture_radius, center)
    }

    /// Put the body on a circular path around its center.
    ///
    /// The same angular velocity spins the surface.
    pub fn with_orbit(mut self, orbit_radius: f64, angular_velocity: f64, phase: f64) -> Self {
        self.orbit_radius = orbit_radius;
        self.angular_velocity = angular_velocity;
        self.phase = phase;
        self
    }

    /// Spin the body in place.
    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub(crate) fn with_id(mut self, id: BodyId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Landing radius for planets, capture radius for black holes.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn orbit_center(&self) -> DVec2 {
        self.orbit_center
    }

    pub fn orbit_radius(&self) -> f64 {
        self.orbit_radius
    }

    /// Angular velocity in rad/s, counterclockwise positive.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn is_black_hole(&self) -> bool {
        !self.kind.allows_landing()
    }

    /// Angle of the orbital radius vector at time `t`.
    #[inline]
    fn orbit_angle_at(&self, t: f64) -> f64 {
        self.phase + self.angular_velocity * t
    }

    /// Position of the body center at time `t`.
    #[inline]
    pub fn position_at(&self, t: f64) -> DVec2 {
        if self.orbit_radius == 0.0 {
            return self.orbit_center;
        }
        let angle = self.orbit_angle_at(t);
        self.orbit_center + self.orbit_radius * DVec2::new(angle.cos(), angle.sin())
    }

    /// Velocity of the body center at time `t`.
    pub fn velocity_at(&self, t: f64) -> DVec2 {
        let angle = self.orbit_angle_at(t);
        self.orbit_radius * self.angular_velocity * DVec2::new(-angle.sin(), angle.cos())
    }

    /// World angle of a surface point that sits at `surface_angle` in the
    /// body frame.
    fn world_angle(&self, surface_angle: f64, t: f64) -> f64 {
        surface_angle + self.angular_velocity * t
    }

    /// Outward unit normal at a surface point at time `t`.
    pub fn up_direction(&self, surface_angle: f64, t: f64) -> DVec2 {
        let angle = self.world_angle(surface_angle, t);
        DVec2::new(angle.cos(), angle.sin())
    }

    /// Position of a surface point at time `t`.
    pub fn surface_point(&self, surface_angle: f64, t: f64) -> DVec2 {
        self.position_at(t) + self.up_direction(surface_angle, t) * self.radius
    }

    /// Velocity of a surface point at time `t` (orbital motion plus spin).
    pub fn surface_velocity(&self, surface_angle: f64, t: f64) -> DVec2 {
        let up = self.up_direction(surface_angle, t);
        self.velocity_at(t) + DVec2::new(-up.y, up.x) * (self.angular_velocity * self.radius)
    }

    /// Body-frame angle of the direction from the center to `point` at time
    /// `t`, in `[0, 2π)`.
    pub fn surface_angle_of(&self, point: DVec2, t: f64) -> f64 {
        let delta = point - self.position_at(t);
        (delta.y.atan2(delta.x) - self.angular_velocity * t).rem_euclid(TAU)
    }

    /// Whether `point` is on or inside the body at time `t`.
    pub fn contains(&self, point: DVec2, t: f64) -> bool {
        (point - self.position_at(t)).length_squared() <= self.radius * self.radius
    }

    /// Minimal speed needed to leave the body's gravity from `distance`.
    ///
    /// `v = sqrt(2·G·M/d)`, independent of direction.
    pub fn escape_speed(&self, gravity: f64, distance: f64) -> f64 {
        (2.0 * gravity * self.mass / distance).sqrt()
    }

    /// Escape speed from the surface.
    pub fn surface_escape_speed(&self, gravity: f64) -> f64 {
        self.escape_speed(gravity, self.radius)
    }

    /// Speed of a circular orbit at `distance` from the center.
    pub fn orbital_speed(&self, gravity: f64, distance: f64) -> f64 {
        (gravity * self.mass / distance).sqrt()
    }
}
