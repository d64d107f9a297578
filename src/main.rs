//! Headless demo: a scripted drive through the arena
//!
//! Usage: `vehicle-combat [config.ron|config.json]`. Set `RUST_LOG=debug` to
//! see one-shot actions and projectile expiry.

use vehicle_combat::prelude::*;

/// Fixed simulation step
const DT: f32 = 1.0 / 60.0;
/// Ticks to simulate
const DURATION: u64 = 600;

/// Key events fed to the keyboard at a given tick
const SCRIPT: &[(u64, KeyCode, ElementState)] = &[
    (120, KeyCode::KeyW, ElementState::Pressed),
    (200, KeyCode::KeyD, ElementState::Pressed),
    (240, KeyCode::KeyD, ElementState::Released),
    (250, KeyCode::KeyM, ElementState::Pressed),
    (251, KeyCode::KeyM, ElementState::Released),
    (260, KeyCode::KeyN, ElementState::Pressed),
    (262, KeyCode::KeyN, ElementState::Released),
    (300, KeyCode::KeyW, ElementState::Released),
    (300, KeyCode::KeyS, ElementState::Pressed),
    (380, KeyCode::KeyS, ElementState::Released),
    (400, KeyCode::KeyI, ElementState::Pressed),
    (401, KeyCode::KeyI, ElementState::Released),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading vehicle config from {path}");
            VehicleConfig::load(&path)?
        }
        None => VehicleConfig::default(),
    };

    let mut arena = Arena::new(ArenaConfig::default());
    let handle = arena.spawn_vehicle(&config.tuning);
    let mut controller = {
        let vehicle = arena
            .vehicle(handle)
            .ok_or(VehicleError::MissingPhysicsVehicle)?;
        VehicleController::new(config, &vehicle)?
    };

    let mut keyboard = KeyboardInput::new(InputMapper::with_defaults(), controller.input_queue());
    let mut events = EventQueue::new();

    for tick in 0..DURATION {
        for &(_, key, state) in SCRIPT.iter().filter(|(at, ..)| *at == tick) {
            keyboard.process_keyboard(key, state);
        }

        let mut vehicle = arena
            .vehicle(handle)
            .ok_or(VehicleError::MissingPhysicsVehicle)?;
        controller.tick(&mut vehicle, &mut events);
        arena.step(DT, &mut events);

        events.swap();
        for event in events.iter() {
            log::info!("tick {tick}: {event:?}");
        }

        if tick % 60 == 0 {
            let chassis = controller.visuals().chassis;
            log::info!(
                "tick {tick}: chassis at {:.2}, steering {:.2}",
                chassis.position,
                controller.state().steering
            );
        }
    }

    log::info!(
        "Done after {} ticks, {} projectiles in flight",
        arena.tick(),
        arena.projectile_count()
    );
    Ok(())
}
