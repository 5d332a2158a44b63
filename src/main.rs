//! Gravity - Rocket Launch Simulator
//!
//! Headless demo: builds a small universe, launches a rocket with a few
//! thrust settings and logs how each flight ends.

use bevy::log::LogPlugin;
use bevy::math::DVec2;
use bevy::prelude::*;

use gravity::body::{Body, BodyId, BodyKind};
use gravity::config::FlightConfig;
use gravity::session::{FlightPlugin, FlightSession, Telemetry};
use gravity::types::{
    PLANET_DENSITY, PLANET_RADIUS, PLANET_ROTATION, PLAY_AREA_HEIGHT, PLAY_AREA_WIDTH,
};

/// Thrust settings tried by the demo, weakest first.
const THRUST_SETTINGS: [f64; 4] = [-2.5, -1.0, 0.0, 1.5];

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), FlightPlugin))
        .add_systems(Startup, run_demo_flights);
    app.update();

    let telemetry = app.world().resource::<Telemetry>();
    info!(
        "Demo finished: {} launches, {} landings, {} lost, fuel {:.3e}, flight length {:.3e} m",
        telemetry.launches,
        telemetry.landings,
        telemetry.lost_ships,
        telemetry.used_fuel,
        telemetry.flight_length
    );
}

/// A home planet, two neighbours and a black hole spread over the play area.
fn demo_universe() -> Vec<Body> {
    let middle = DVec2::new(PLAY_AREA_WIDTH, PLAY_AREA_HEIGHT) * 0.5;
    let planet = |kind, offset: DVec2| {
        Body::planet(BodyId(0), kind, PLANET_RADIUS, PLANET_DENSITY, middle + offset)
            .with_angular_velocity(PLANET_ROTATION)
    };
    vec![
        planet(BodyKind::Normal, DVec2::new(-8e7, 0.0)),
        planet(BodyKind::Large, DVec2::new(6e7, 5e7)),
        planet(BodyKind::Small, DVec2::new(2e7, -4e7)).with_orbit(2e7, 2e-6, 1.0),
        Body::planet(
            BodyId(0),
            BodyKind::BlackHole,
            PLANET_RADIUS,
            PLANET_DENSITY,
            middle + DVec2::new(1.2e8, -6e7),
        ),
    ]
}

fn run_demo_flights(config: Res<FlightConfig>, mut telemetry: ResMut<Telemetry>) {
    let mut session = match FlightSession::new(demo_universe(), config.clone(), BodyId(0), 0.3) {
        Ok(session) => session,
        Err(e) => {
            error!("Cannot start demo: {e}");
            return;
        }
    };

    let mut instant = 0.0;
    for setting in THRUST_SETTINGS {
        let Some(body) = session.resting_body() else {
            break;
        };
        let Some(speed) = session.launch_speed(setting) else {
            break;
        };
        match session.launch(body, speed, instant) {
            Ok(outcome) => {
                info!(
                    "Thrust {:+.1}: {:?} after {} segments",
                    setting,
                    outcome,
                    session.trajectory().len()
                );
                instant = outcome.time();
            }
            Err(e) => warn!("Thrust {:+.1}: {e}", setting),
        }
    }

    *telemetry = session.telemetry().clone();
}
