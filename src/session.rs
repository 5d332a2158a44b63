//! Flight session: launches, flights and the counters of a game.
//!
//! A session owns the gravity field and configuration for the lifetime of a
//! game. The rocket is either resting on a planet or flying; a flight is
//! computed segment by segment until it lands or is lost. A lost rocket is
//! replaced by a new one at the launch site, so there is always a rocket
//! ready for the next launch.

use bevy::log::{debug, info, warn};
use bevy::math::DVec2;
use bevy::prelude::*;

use crate::body::{Body, BodyId};
use crate::collision::{clip_to_surface, detect_event, FlightEvent, FlightProgress};
use crate::config::{thrust_speed, ConfigError, FlightConfig};
use crate::outcome::{FlightOutcome, LossReason};
use crate::physics::{step, GravityField, Segment};
use crate::trajectory::Trajectory;
use crate::types::RocketState;

/// Plugin providing the flight configuration and game counters as
/// resources.
///
/// Changes to the [`FlightConfig`] resource reach a [`FlightSession`]
/// resource once its rocket is back on the ground.
pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightConfig>()
            .init_resource::<Telemetry>()
            .add_systems(PostUpdate, sync_flight_config);
    }
}

/// Copy a changed configuration resource into the session between flights.
fn sync_flight_config(
    config: Res<FlightConfig>,
    session: Option<ResMut<FlightSession>>,
    mut pending: Local<bool>,
) {
    if config.is_changed() && !config.is_added() {
        *pending = true;
    }
    let Some(mut session) = session else {
        return;
    };
    if !*pending || session.is_in_flight() {
        return;
    }
    *pending = false;
    if session.config() == &*config {
        return;
    }
    if let Err(e) = session.set_config((*config).clone()) {
        warn!("Configuration not applied: {e}");
    }
}

/// Reasons a session or a launch is refused.
///
/// A refused launch leaves the session untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LaunchError {
    #[error("rocket is already in flight")]
    AlreadyInFlight,

    #[error("rocket rests on body {resting}, not on body {requested}")]
    NotRestingOn { requested: BodyId, resting: BodyId },

    #[error("no body {0} in the gravity field")]
    UnknownBody(BodyId),

    #[error("launch speed {0} must be finite and not negative")]
    InvalidSpeed(f64),

    #[error("launch time {0} is not a finite number")]
    InvalidInstant(f64),

    #[error("cannot start on black hole {0}")]
    BlackHoleStart(BodyId),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Game counters. They only grow until the session is reset.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    /// Fuel charged by all launches.
    pub used_fuel: f64,
    /// Accepted launches.
    pub launches: u64,
    /// Distance flown by all flights, lost ones included (meters).
    pub flight_length: f64,
    /// Rockets that fell into a black hole, left the play area or hit the
    /// path limit.
    pub lost_ships: u64,
    /// Flights that ended on a planet.
    pub landings: u64,
}

/// Integrator statistics, reset together with the telemetry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Segments accepted over tolerance at the minimum step or retry cap.
    pub step_underflows: u64,
    /// Segments produced.
    pub segments_computed: u64,
    /// Step sizes rejected before a segment was accepted.
    pub rejected_attempts: u64,
}

/// A point on a body surface, fixed in the body's rotating frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Site {
    body: BodyId,
    surface_angle: f64,
}

#[derive(Clone, Debug, PartialEq)]
enum Rocket {
    Resting(Site),
    InFlight {
        state: RocketState,
        dt_hint: f64,
        /// Body left out of the gravity at the start of the next segment.
        excluded: Option<BodyId>,
    },
}

/// A game: rocket, flights and counters in one gravity field.
#[derive(Resource, Clone, Debug)]
pub struct FlightSession {
    field: GravityField,
    config: FlightConfig,
    start: Site,
    launch_site: Site,
    rocket: Rocket,
    trajectory: Trajectory,
    /// Telemetry distance at the start of the current flight.
    flight_start_distance: f64,
    telemetry: Telemetry,
    diagnostics: Diagnostics,
    outcome: Option<FlightOutcome>,
}

impl FlightSession {
    /// Start a game with the rocket resting on `start_body` at
    /// `surface_angle` (radians, body frame).
    ///
    /// Bodies are renumbered by position; the field takes G and epsilon from
    /// `config`.
    pub fn new(
        bodies: Vec<Body>,
        config: FlightConfig,
        start_body: BodyId,
        surface_angle: f64,
    ) -> Result<Self, LaunchError> {
        config.validate()?;
        let field = GravityField::from_config(bodies, &config);
        let body = field
            .body(start_body)
            .ok_or(LaunchError::UnknownBody(start_body))?;
        if body.is_black_hole() {
            return Err(LaunchError::BlackHoleStart(start_body));
        }

        let start = Site {
            body: start_body,
            surface_angle,
        };
        Ok(Self {
            field,
            config,
            start,
            launch_site: start,
            rocket: Rocket::Resting(start),
            trajectory: Trajectory::new(),
            flight_start_distance: 0.0,
            telemetry: Telemetry::default(),
            diagnostics: Diagnostics::default(),
            outcome: None,
        })
    }

    pub fn field(&self) -> &GravityField {
        &self.field
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Replace the configuration between flights.
    ///
    /// The gravity field is rebuilt with the new G and epsilon. Counters are
    /// kept. Refused while the rocket is flying.
    pub fn set_config(&mut self, config: FlightConfig) -> Result<(), LaunchError> {
        if self.is_in_flight() {
            return Err(LaunchError::AlreadyInFlight);
        }
        config.validate()?;
        self.field = GravityField::from_config(self.field.bodies().to_vec(), &config);
        self.config = config;
        debug!("Flight configuration updated");
        Ok(())
    }

    /// Set a named option between flights.
    ///
    /// See [`FlightConfig::set_option`]. On error nothing changes.
    pub fn set_option(&mut self, name: &str, value: f64) -> Result<(), LaunchError> {
        if self.is_in_flight() {
            return Err(LaunchError::AlreadyInFlight);
        }
        let mut config = self.config.clone();
        config.set_option(name, value)?;
        self.set_config(config)
    }

    /// Path of the current or last flight.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Outcome of the last finished flight, `None` while flying or before
    /// the first flight.
    pub fn outcome(&self) -> Option<&FlightOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.rocket, Rocket::InFlight { .. })
    }

    /// Body the rocket is resting on, `None` while in flight.
    pub fn resting_body(&self) -> Option<BodyId> {
        match self.rocket {
            Rocket::Resting(site) => Some(site.body),
            Rocket::InFlight { .. } => None,
        }
    }

    /// Surface angle of the resting rocket, `None` while in flight.
    pub fn resting_angle(&self) -> Option<f64> {
        match self.rocket {
            Rocket::Resting(site) => Some(site.surface_angle),
            Rocket::InFlight { .. } => None,
        }
    }

    /// Gravitational acceleration at `pos` and `time`.
    pub fn acceleration_at(&self, pos: DVec2, time: f64) -> DVec2 {
        self.field.acceleration_at(pos, time)
    }

    /// Position of the rocket at `time`.
    ///
    /// A resting rocket turns with its body. A flying rocket is looked up on
    /// the trajectory; times past the computed part give its last position.
    pub fn rocket_position(&self, time: f64) -> DVec2 {
        match &self.rocket {
            Rocket::Resting(site) => self.site_position(site, time),
            Rocket::InFlight { state, .. } => {
                self.trajectory.position_at(time).unwrap_or(state.pos)
            }
        }
    }

    fn site_position(&self, site: &Site, time: f64) -> DVec2 {
        self.field
            .body(site.body)
            .map_or(DVec2::ZERO, |body| body.surface_point(site.surface_angle, time))
    }

    /// Launch speed for a thrust setting from the body the rocket rests on.
    ///
    /// Setting 0 is the body's surface escape speed. `None` while in flight.
    pub fn launch_speed(&self, setting: f64) -> Option<f64> {
        let body = self.field.body(self.resting_body()?)?;
        Some(thrust_speed(body.surface_escape_speed(self.field.gravity()), setting))
    }

    /// Launch from `body` at `speed` at time `instant` and fly until the
    /// rocket lands or is lost.
    pub fn launch(
        &mut self,
        body: BodyId,
        speed: f64,
        instant: f64,
    ) -> Result<FlightOutcome, LaunchError> {
        self.begin_launch(body, speed, instant)?;
        loop {
            if let Some(outcome) = self.advance() {
                return Ok(outcome);
            }
        }
    }

    /// Launch without computing any segment yet.
    ///
    /// The flight is then computed with [`advance`](Self::advance),
    /// [`advance_until`](Self::advance_until) or
    /// [`run_to_end`](Self::run_to_end).
    pub fn begin_launch(
        &mut self,
        body: BodyId,
        speed: f64,
        instant: f64,
    ) -> Result<(), LaunchError> {
        let site = self
            .check_launch(body, speed, instant)
            .inspect_err(|e| warn!("Launch rejected: {e}"))?;
        let Some(launch_body) = self.field.body(site.body) else {
            return Err(LaunchError::UnknownBody(site.body));
        };

        let up = launch_body.up_direction(site.surface_angle, instant);
        let pos = launch_body.surface_point(site.surface_angle, instant)
            + up * (self.config.launch_clearance * launch_body.radius());
        let mut vel = up * speed;
        if self.config.inherit_body_velocity {
            vel += launch_body.surface_velocity(site.surface_angle, instant);
        }

        self.telemetry.launches += 1;
        self.telemetry.used_fuel += self.config.fuel.cost(speed);

        let state = RocketState {
            pos,
            vel,
            time: instant,
            fuel_used: self.telemetry.used_fuel,
            distance: self.telemetry.flight_length,
            resting_on: None,
        };

        info!(
            "Launch #{} from body {} at t={:.1}s: speed {:.1} m/s, angle {:.1} deg",
            self.telemetry.launches,
            site.body,
            instant,
            speed,
            site.surface_angle.to_degrees()
        );

        self.launch_site = site;
        self.trajectory.clear();
        self.outcome = None;
        self.flight_start_distance = self.telemetry.flight_length;
        self.rocket = Rocket::InFlight {
            state,
            dt_hint: self.config.integrator.initial_dt,
            excluded: Some(site.body),
        };
        Ok(())
    }

    fn check_launch(&self, body: BodyId, speed: f64, instant: f64) -> Result<Site, LaunchError> {
        let Rocket::Resting(site) = self.rocket else {
            return Err(LaunchError::AlreadyInFlight);
        };
        if self.field.body(body).is_none() {
            return Err(LaunchError::UnknownBody(body));
        }
        if site.body != body {
            return Err(LaunchError::NotRestingOn {
                requested: body,
                resting: site.body,
            });
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(LaunchError::InvalidSpeed(speed));
        }
        if !instant.is_finite() {
            return Err(LaunchError::InvalidInstant(instant));
        }
        Ok(site)
    }

    /// Compute the next segment of the flight.
    ///
    /// Returns the outcome if this segment ended the flight. Does nothing and
    /// returns `None` if the rocket is not flying.
    pub fn advance(&mut self) -> Option<FlightOutcome> {
        let Rocket::InFlight {
            state,
            dt_hint,
            excluded,
        } = &self.rocket
        else {
            return None;
        };
        let result = step(&self.field, state, *dt_hint, *excluded, &self.config.integrator);

        self.diagnostics.segments_computed += 1;
        self.diagnostics.rejected_attempts += u64::from(result.attempts.saturating_sub(1));
        if result.underflow {
            self.diagnostics.step_underflows += 1;
        }

        let segment = result.segment;
        let progress = FlightProgress {
            segments: self.trajectory.len() + 1,
            distance: segment.end.distance - self.flight_start_distance,
        };
        match detect_event(&self.field, &self.config, &segment.end, progress) {
            Some(event) => Some(self.finish_flight(segment, event)),
            None => {
                self.telemetry.flight_length += segment.length();
                self.rocket = Rocket::InFlight {
                    state: segment.end.clone(),
                    dt_hint: result.next_dt,
                    excluded: None,
                };
                self.trajectory.push(segment);
                None
            }
        }
    }

    /// Compute segments until the flight reaches `time` or ends.
    ///
    /// Returns the outcome if the flight ended.
    pub fn advance_until(&mut self, time: f64) -> Option<FlightOutcome> {
        while let Rocket::InFlight { state, .. } = &self.rocket {
            if state.time >= time {
                break;
            }
            if let Some(outcome) = self.advance() {
                return Some(outcome);
            }
        }
        None
    }

    /// Finish the current flight.
    ///
    /// Returns the outcome of the last flight, `None` if there never was one.
    pub fn run_to_end(&mut self) -> Option<FlightOutcome> {
        while self.is_in_flight() {
            if let Some(outcome) = self.advance() {
                return Some(outcome);
            }
        }
        self.outcome.clone()
    }

    fn finish_flight(&mut self, segment: Segment, event: FlightEvent) -> FlightOutcome {
        let outcome = match event {
            FlightEvent::Touchdown(id) => {
                let touchdown = clip_to_surface(&segment, &self.field.bodies()[id.0]);
                let end = touchdown.segment.end.clone();
                self.telemetry.flight_length += touchdown.segment.length();
                self.telemetry.landings += 1;
                self.trajectory.push(touchdown.segment);
                self.rocket = Rocket::Resting(Site {
                    body: id,
                    surface_angle: touchdown.surface_angle,
                });
                info!(
                    "Landed on body {} at t={:.1}s, impact speed {:.1} m/s",
                    id, end.time, touchdown.impact_speed
                );
                FlightOutcome::Landed {
                    body: id,
                    time: end.time,
                    position: end.pos,
                    surface_angle: touchdown.surface_angle,
                    impact_speed: touchdown.impact_speed,
                }
            }
            FlightEvent::Captured(_) | FlightEvent::OutOfBounds | FlightEvent::PathLimit => {
                let reason = match event {
                    FlightEvent::Captured(id) => LossReason::Collision(id),
                    FlightEvent::PathLimit => LossReason::PathLimit,
                    _ => LossReason::OutOfBounds,
                };
                let (time, position) = (segment.end.time, segment.end.pos);
                self.telemetry.flight_length += segment.length();
                self.telemetry.lost_ships += 1;
                self.trajectory.push(segment);
                self.rocket = Rocket::Resting(self.launch_site);
                info!("Rocket lost at t={:.1}s: {:?}", time, reason);
                FlightOutcome::Lost {
                    reason,
                    time,
                    position,
                }
            }
        };

        debug!(
            "Flight finished after {} segments, length {:.3e} m, mean error {:.3e}",
            self.trajectory.len(),
            self.trajectory.length(),
            self.trajectory.mean_error()
        );
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Drop the current flight and put the rocket back on its launch site.
    ///
    /// Counters keep what the flight already used. Returns false if the
    /// rocket was not flying.
    pub fn abandon(&mut self) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        self.rocket = Rocket::Resting(self.launch_site);
        self.trajectory.clear();
        self.outcome = None;
        info!("Flight abandoned, rocket back on body {}", self.launch_site.body);
        true
    }

    /// Start a new game: counters zeroed, rocket back on the start body.
    pub fn reset(&mut self) {
        info!("Resetting flight session...");
        self.rocket = Rocket::Resting(self.start);
        self.launch_site = self.start;
        self.trajectory.clear();
        self.outcome = None;
        self.flight_start_distance = 0.0;
        self.telemetry = Telemetry::default();
        self.diagnostics = Diagnostics::default();
    }
}
