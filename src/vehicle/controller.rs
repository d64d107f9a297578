//! Per-tick vehicle control
//!
//! [`VehicleController`] turns the current [`ActionState`] into engine,
//! brake and steering commands, fires one-shot maneuvers and weapons, and
//! mirrors the physics transforms onto the visual nodes.
//!
//! # Tick order
//!
//! 1. Drain queued input into the action state
//! 2. Reset engine and brake force (steering persists)
//! 3. Longitudinal control from speed and accelerate/brake
//! 4. Steering ramp, or snap to zero when no steer action is held
//! 5. Nudge impulses (one per press)
//! 6. Fire (one per press)
//! 7. Trail latch
//! 8. Commit forces to the wheels
//! 9. Resync visual nodes
//!
//! # Example
//!
//! ```ignore
//! let vehicle = arena.vehicle(handle).ok_or(VehicleError::MissingPhysicsVehicle)?;
//! let mut controller = VehicleController::new(config, &vehicle)?;
//! let mut keyboard = KeyboardInput::new(InputMapper::with_defaults(), controller.input_queue());
//!
//! loop {
//!     let mut vehicle = arena.vehicle(handle).ok_or(VehicleError::MissingPhysicsVehicle)?;
//!     controller.tick(&mut vehicle, &mut events);
//!     arena.step(dt, &mut events);
//! }
//! ```

use glam::{Quat, Vec3};

use crate::core::{ControllerConfig, EventQueue, VehicleConfig, VehicleError, VehicleEvent, VehicleTuning};
use crate::input::{ActionQueue, ActionState, VehicleAction};

use super::{PhysicsVehicle, Scene, TrailHandle, VehicleVisuals, WheelPosition, WorldTransform};

/// Number of wheels the controller drives.
pub const WHEEL_COUNT: usize = 4;

/// Actions that give an air thrust, highest priority first
const AIR_THRUST_ACTIONS: [VehicleAction; 2] = [VehicleAction::Accelerate, VehicleAction::Brake];

/// Values derived by the controller, updated every tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleRuntimeState {
    /// Engine force applied to each front wheel this tick
    pub engine_force: f32,
    /// Rear brake force this tick (front wheels get half)
    pub braking_force: f32,
    /// Front wheel steering angle, kept between ticks
    pub steering: f32,
    /// Whether a trail is latched on
    pub trail_active: bool,
    /// Ticks left before the trail latch releases
    pub trail_lock: u32,
    /// Ticks run so far
    pub tick: u64,
}

/// Drives one vehicle from its action state.
#[derive(Debug)]
pub struct VehicleController {
    tuning: VehicleTuning,
    config: ControllerConfig,
    actions: ActionState,
    input: ActionQueue,
    state: VehicleRuntimeState,
    visuals: VehicleVisuals,
    trail: Option<TrailHandle>,
    /// Set once an action's air thrust fired; cleared by release or a new press
    air_thrust_spent: [bool; 2],
    wheel_correction: Quat,
    chassis_correction: Quat,
}

impl VehicleController {
    /// Create a controller for `vehicle`.
    ///
    /// # Errors
    ///
    /// Fails if the tuning is invalid or the vehicle does not have four wheels.
    pub fn new<P: PhysicsVehicle + ?Sized>(
        config: VehicleConfig,
        vehicle: &P,
    ) -> Result<Self, VehicleError> {
        config.tuning.validate()?;

        let found = vehicle.wheel_count();
        if found != WHEEL_COUNT {
            return Err(VehicleError::WheelLayout {
                expected: WHEEL_COUNT,
                found,
            });
        }

        let VehicleConfig { tuning, controller } = config;
        log::info!(
            "Vehicle controller ready (engine {}, brake {}, steering ±{})",
            tuning.max_engine_force,
            tuning.max_braking_force,
            tuning.steering_clamp
        );

        Ok(Self {
            wheel_correction: controller.wheel_correction.to_quat(),
            chassis_correction: controller.chassis_correction.to_quat(),
            tuning,
            config: controller,
            actions: ActionState::new(),
            input: ActionQueue::new(),
            state: VehicleRuntimeState::default(),
            visuals: VehicleVisuals::new(WHEEL_COUNT),
            trail: None,
            air_thrust_spent: [false; 2],
        })
    }

    /// Queue feeding this controller. Clones may be handed to input sources.
    pub fn input_queue(&self) -> ActionQueue {
        self.input.clone()
    }

    pub fn actions(&self) -> &ActionState {
        &self.actions
    }

    /// Direct access to the action state, bypassing the queue
    pub fn actions_mut(&mut self) -> &mut ActionState {
        &mut self.actions
    }

    pub fn state(&self) -> &VehicleRuntimeState {
        &self.state
    }

    pub fn visuals(&self) -> &VehicleVisuals {
        &self.visuals
    }

    pub fn tuning(&self) -> &VehicleTuning {
        &self.tuning
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The trail this vehicle has laid, if any
    pub fn trail(&self) -> Option<TrailHandle> {
        self.trail
    }

    /// Run one simulation tick.
    ///
    /// # Panics
    ///
    /// Panics if the vehicle's wheel count changed since construction.
    pub fn tick<W>(&mut self, world: &mut W, events: &mut EventQueue)
    where
        W: PhysicsVehicle + Scene + ?Sized,
    {
        assert_eq!(
            world.wheel_count(),
            self.visuals.wheels.len(),
            "physics vehicle wheel count changed"
        );

        self.input.drain_into(&mut self.actions);
        self.state.tick += 1;

        self.state.engine_force = 0.0;
        self.state.braking_force = 0.0;

        let chassis = world.chassis_world_transform();
        let airborne = self.is_airborne(&chassis);

        self.update_longitudinal(world, &chassis, airborne, events);
        self.update_steering(airborne);
        self.apply_nudges(world, chassis.position, events);
        self.update_fire(world, &chassis, events);
        self.update_trail(world, events);

        self.commit(world);
        self.sync_visuals(world);

        self.actions.end_tick();

        log::trace!(
            "tick {}: engine {:.1} brake {:.1} steering {:.3}",
            self.state.tick,
            self.state.engine_force,
            self.state.braking_force,
            self.state.steering
        );
    }

    fn is_airborne(&self, chassis: &WorldTransform) -> bool {
        self.config
            .airborne_height
            .is_some_and(|height| chassis.position.y.abs() > height)
    }

    fn update_longitudinal<W>(
        &mut self,
        world: &mut W,
        chassis: &WorldTransform,
        airborne: bool,
        events: &mut EventQueue,
    ) where
        W: PhysicsVehicle + ?Sized,
    {
        for (spent, action) in self.air_thrust_spent.iter_mut().zip(AIR_THRUST_ACTIONS) {
            if self.actions.was_pressed(action) || !self.actions.is_held(action) {
                *spent = false;
            }
        }

        if airborne {
            // Accelerate wins while it still has a thrust to give
            let armed = AIR_THRUST_ACTIONS
                .iter()
                .zip(self.air_thrust_spent)
                .position(|(&action, spent)| {
                    !spent && (self.actions.is_held(action) || self.actions.was_pressed(action))
                });
            if let Some(slot) = armed {
                let action = AIR_THRUST_ACTIONS[slot];
                self.actions.take_press(action);
                self.air_thrust_spent[slot] = true;

                let magnitude = match action {
                    VehicleAction::Brake => -self.config.air_thrust_impulse,
                    _ => self.config.air_thrust_impulse,
                };
                let impulse = chassis.rotation * Vec3::Z * magnitude;
                world.apply_impulse(impulse, chassis.position);
                events.push(VehicleEvent::AirThrust { impulse });
                log::debug!("Air thrust {impulse} from {action:?}");
            }
            return;
        }

        let speed = world.current_speed();
        let threshold = self.config.reverse_speed_threshold;

        if self.actions.is_held(VehicleAction::Accelerate) {
            if speed < -threshold {
                self.state.braking_force = self.tuning.max_braking_force;
            } else {
                self.state.engine_force = self.tuning.max_engine_force;
            }
        } else if self.actions.is_held(VehicleAction::Brake) {
            if speed > threshold {
                self.state.braking_force = self.tuning.max_braking_force;
            } else {
                self.state.engine_force = -self.tuning.max_engine_force;
            }
        }
    }

    fn update_steering(&mut self, airborne: bool) {
        let clamp = self.tuning.steering_clamp;
        let increment = self.tuning.steering_increment;
        let steering = &mut self.state.steering;

        let right = self.actions.is_held(VehicleAction::SteerRight);
        let left = self.actions.is_held(VehicleAction::SteerLeft);

        if !right && !left {
            *steering = 0.0;
            return;
        }

        // Wheels hold their angle in the air
        if airborne {
            return;
        }

        if right {
            if *steering < clamp {
                *steering += increment;
            }
        } else if *steering > -clamp {
            *steering -= increment;
        }
        *steering = steering.clamp(-clamp, clamp);
    }

    fn apply_nudges<W>(&mut self, world: &mut W, at_point: Vec3, events: &mut EventQueue)
    where
        W: PhysicsVehicle + ?Sized,
    {
        let n = self.config.nudge_impulse;
        let nudges = [
            (VehicleAction::NudgeUp, Vec3::new(0.0, n, 0.0)),
            (VehicleAction::NudgeDown, Vec3::new(0.0, -n, 0.0)),
            (VehicleAction::NudgeLeft, Vec3::new(n, 0.0, 0.0)),
            (VehicleAction::NudgeRight, Vec3::new(-n, 0.0, 0.0)),
        ];

        for (action, impulse) in nudges {
            if self.actions.take_press(action) {
                world.apply_impulse(impulse, at_point);
                events.push(VehicleEvent::Nudged { impulse });
                log::debug!("{action:?}: impulse {impulse}");
            }
        }
    }

    fn update_fire<W>(&mut self, world: &mut W, chassis: &WorldTransform, events: &mut EventQueue)
    where
        W: PhysicsVehicle + Scene + ?Sized,
    {
        if !self.actions.take_press(VehicleAction::Fire) {
            return;
        }

        let aim = chassis.transform_point(self.config.aim_offset);
        let mut velocity = aim - chassis.position;
        velocity.y = self.config.projectile_lift;
        velocity *= self.config.projectile_speed_scale;

        let projectile = world.spawn_projectile(chassis.position, velocity);
        world.apply_impulse(-velocity, chassis.position);

        events.push(VehicleEvent::Fired {
            origin: chassis.position,
            velocity,
        });
        log::debug!("Fired {projectile:?} with velocity {velocity}");
    }

    fn update_trail<W>(&mut self, world: &mut W, events: &mut EventQueue)
    where
        W: Scene + ?Sized,
    {
        if self.actions.take_press(VehicleAction::LayTrail) {
            let trail = match self.trail {
                Some(trail) => trail,
                None => {
                    let chassis = world.chassis_ref();
                    let trail = world.create_or_get_trail(chassis);
                    self.trail = Some(trail);
                    trail
                }
            };
            world.start_trail(trail);

            self.state.trail_active = true;
            self.state.trail_lock = self.config.trail_latch_ticks;
            events.push(VehicleEvent::TrailStarted);
            log::debug!(
                "Trail {trail:?} latched for {} ticks",
                self.config.trail_latch_ticks
            );
            return;
        }

        if !self.state.trail_active {
            return;
        }

        if self.state.trail_lock == 0 {
            if let Some(trail) = self.trail {
                world.stop_trail(trail);
            }
            self.state.trail_active = false;
            events.push(VehicleEvent::TrailStopped);
            log::debug!("Trail released");
        } else {
            self.state.trail_lock -= 1;
        }
    }

    fn commit<W>(&self, world: &mut W)
    where
        W: PhysicsVehicle + ?Sized,
    {
        let VehicleRuntimeState {
            engine_force,
            braking_force,
            steering,
            ..
        } = self.state;

        for wheel in WheelPosition::FRONT {
            world.set_engine_force(wheel.index(), engine_force);
            world.set_brake(wheel.index(), braking_force / 2.0);
            world.set_steering(wheel.index(), steering);
        }
        for wheel in WheelPosition::REAR {
            world.set_brake(wheel.index(), braking_force);
        }
    }

    fn sync_visuals<W>(&mut self, world: &W)
    where
        W: PhysicsVehicle + ?Sized,
    {
        for (i, node) in self.visuals.wheels.iter_mut().enumerate() {
            node.sync_from(world.wheel_world_transform(i), self.wheel_correction);
        }
        self.visuals
            .chassis
            .sync_from(world.chassis_world_transform(), self.chassis_correction);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSource;
    use crate::vehicle::{ChassisRef, ProjectileHandle, RigidBody};
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Records every command the controller issues
    #[derive(Debug)]
    struct FakeWorld {
        speed: f32,
        wheels: usize,
        chassis: WorldTransform,
        engine: [f32; 4],
        brake: [f32; 4],
        steering: [f32; 4],
        impulses: Vec<(Vec3, Vec3)>,
        projectiles: Vec<(Vec3, Vec3)>,
        trails_created: u32,
        trail_starts: u32,
        trail_stops: u32,
        trail_running: bool,
    }

    impl FakeWorld {
        fn new() -> Self {
            Self {
                speed: 0.0,
                wheels: 4,
                chassis: WorldTransform::new(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY),
                engine: [0.0; 4],
                brake: [0.0; 4],
                steering: [0.0; 4],
                impulses: Vec::new(),
                projectiles: Vec::new(),
                trails_created: 0,
                trail_starts: 0,
                trail_stops: 0,
                trail_running: false,
            }
        }

        fn wheel_position(index: usize) -> Vec3 {
            Vec3::new(index as f32, 0.0, 0.0)
        }
    }

    impl RigidBody for FakeWorld {
        fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3) {
            self.impulses.push((impulse, at_point));
        }
    }

    impl PhysicsVehicle for FakeWorld {
        fn current_speed(&self) -> f32 {
            self.speed
        }

        fn set_engine_force(&mut self, wheel: usize, force: f32) {
            self.engine[wheel] = force;
        }

        fn set_brake(&mut self, wheel: usize, force: f32) {
            self.brake[wheel] = force;
        }

        fn set_steering(&mut self, wheel: usize, angle: f32) {
            self.steering[wheel] = angle;
        }

        fn wheel_count(&self) -> usize {
            self.wheels
        }

        fn wheel_world_transform(&self, wheel: usize) -> WorldTransform {
            assert!(wheel < self.wheels, "wheel index {wheel} out of range");
            WorldTransform::new(Self::wheel_position(wheel), Quat::IDENTITY)
        }

        fn chassis_world_transform(&self) -> WorldTransform {
            self.chassis
        }
    }

    impl Scene for FakeWorld {
        fn chassis_ref(&self) -> ChassisRef {
            ChassisRef(7)
        }

        fn spawn_projectile(&mut self, position: Vec3, velocity: Vec3) -> ProjectileHandle {
            self.projectiles.push((position, velocity));
            ProjectileHandle(self.projectiles.len() as u64)
        }

        fn create_or_get_trail(&mut self, chassis: ChassisRef) -> TrailHandle {
            assert_eq!(chassis, ChassisRef(7));
            self.trails_created += 1;
            TrailHandle(1)
        }

        fn start_trail(&mut self, _trail: TrailHandle) {
            self.trail_starts += 1;
            self.trail_running = true;
        }

        fn stop_trail(&mut self, _trail: TrailHandle) {
            self.trail_stops += 1;
            self.trail_running = false;
        }
    }

    fn controller(world: &FakeWorld) -> VehicleController {
        VehicleController::new(VehicleConfig::default(), world).unwrap()
    }

    fn run(controller: &mut VehicleController, world: &mut FakeWorld, ticks: usize) {
        let mut events = EventQueue::new();
        for _ in 0..ticks {
            controller.tick(world, &mut events);
        }
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[test]
    fn test_new_rejects_wrong_wheel_count() {
        let mut world = FakeWorld::new();
        world.wheels = 3;

        let err = VehicleController::new(VehicleConfig::default(), &world).unwrap_err();
        assert_eq!(
            err,
            VehicleError::WheelLayout {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let world = FakeWorld::new();
        let mut config = VehicleConfig::default();
        config.tuning.mass = 0.0;

        let err = VehicleController::new(config, &world).unwrap_err();
        assert!(matches!(err, VehicleError::InvalidTuning(_)));
    }

    // ------------------------------------------------------------------------
    // Longitudinal control
    // ------------------------------------------------------------------------

    #[test]
    fn test_accelerate_while_rolling_back_brakes() {
        let mut world = FakeWorld::new();
        world.speed = -5.0;
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);

        assert_eq!(controller.state().braking_force, 10.0);
        assert_eq!(controller.state().engine_force, 0.0);
    }

    #[test]
    fn test_accelerate_while_moving_forward_drives() {
        let mut world = FakeWorld::new();
        world.speed = 10.0;
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);

        assert_eq!(controller.state().engine_force, 500.0);
        assert_eq!(controller.state().braking_force, 0.0);
        assert_eq!(world.engine[0], 500.0);
        assert_eq!(world.engine[1], 500.0);
    }

    #[test]
    fn test_brake_then_reverse() {
        let mut world = FakeWorld::new();
        world.speed = 5.0;
        let mut controller = controller(&world);
        controller.actions_mut().press(VehicleAction::Brake);

        run(&mut controller, &mut world, 1);
        assert_eq!(controller.state().braking_force, 10.0);
        assert_eq!(controller.state().engine_force, 0.0);

        world.speed = 0.5;
        run(&mut controller, &mut world, 1);
        assert_eq!(controller.state().braking_force, 0.0);
        assert_eq!(controller.state().engine_force, -500.0);
    }

    #[test]
    fn test_forces_reset_every_tick() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);
        assert_eq!(world.engine[0], 500.0);

        controller.actions_mut().release(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);
        assert_eq!(controller.state().engine_force, 0.0);
        assert_eq!(world.engine[0], 0.0);
        assert_eq!(world.brake, [0.0; 4]);
    }

    #[test]
    fn test_reverse_threshold_is_tunable() {
        let mut world = FakeWorld::new();
        world.speed = -5.0;
        let config = VehicleConfig::new(
            VehicleTuning::default(),
            ControllerConfig::default().with_reverse_speed_threshold(10.0),
        );
        let mut controller = VehicleController::new(config, &world).unwrap();

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);

        assert_eq!(controller.state().engine_force, 500.0);
    }

    #[test]
    fn test_brake_distribution() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        controller.actions_mut().press(VehicleAction::Accelerate);

        for speed in [-2.0, -30.0, -100.0] {
            world.speed = speed;
            run(&mut controller, &mut world, 1);

            let front = world.brake[WheelPosition::FrontLeft.index()];
            assert_eq!(world.brake[WheelPosition::FrontRight.index()], front);
            assert_eq!(world.brake[WheelPosition::RearLeft.index()], 2.0 * front);
            assert_eq!(world.brake[WheelPosition::RearRight.index()], 2.0 * front);
            assert_eq!(world.brake[WheelPosition::RearLeft.index()], 10.0);
        }
    }

    // ------------------------------------------------------------------------
    // Steering
    // ------------------------------------------------------------------------

    #[test]
    fn test_steering_snaps_to_zero_without_input() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::SteerRight);
        run(&mut controller, &mut world, 5);
        assert!(controller.state().steering > 0.0);

        controller.actions_mut().release(VehicleAction::SteerRight);
        run(&mut controller, &mut world, 1);
        assert_eq!(controller.state().steering, 0.0);
        assert_eq!(world.steering[0], 0.0);
    }

    #[test]
    fn test_steering_clamps_instead_of_overshooting() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        controller.state.steering = 0.19;

        controller.actions_mut().press(VehicleAction::SteerRight);
        run(&mut controller, &mut world, 3);

        assert_eq!(controller.state().steering, 0.2);
        assert_eq!(world.steering[0], 0.2);
        assert_eq!(world.steering[1], 0.2);
    }

    #[test]
    fn test_steering_left_stays_in_range() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::SteerLeft);
        for _ in 0..50 {
            run(&mut controller, &mut world, 1);
            let steering = controller.state().steering;
            assert!((-0.2..=0.2).contains(&steering), "{steering}");
        }
        assert_eq!(controller.state().steering, -0.2);
    }

    #[test]
    fn test_right_wins_when_both_held() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::SteerLeft);
        controller.actions_mut().press(VehicleAction::SteerRight);
        run(&mut controller, &mut world, 2);

        assert!(controller.state().steering > 0.0);
    }

    // ------------------------------------------------------------------------
    // One-shot actions
    // ------------------------------------------------------------------------

    #[test]
    fn test_nudge_fires_once_per_press() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        let mut input = controller.input_queue();

        input.on_down(VehicleAction::NudgeUp);
        run(&mut controller, &mut world, 1);
        // Key auto-repeat while still held
        input.on_down(VehicleAction::NudgeUp);
        run(&mut controller, &mut world, 5);

        assert_eq!(world.impulses, vec![(Vec3::new(0.0, 50.0, 0.0), world.chassis.position)]);
    }

    #[test]
    fn test_nudge_directions() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        for action in [
            VehicleAction::NudgeDown,
            VehicleAction::NudgeLeft,
            VehicleAction::NudgeRight,
        ] {
            controller.actions_mut().press(action);
        }
        run(&mut controller, &mut world, 1);

        let impulses: Vec<_> = world.impulses.iter().map(|(i, _)| *i).collect();
        assert_eq!(
            impulses,
            vec![
                Vec3::new(0.0, -50.0, 0.0),
                Vec3::new(50.0, 0.0, 0.0),
                Vec3::new(-50.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_fire_spawns_projectile_with_recoil() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        let mut events = EventQueue::new();

        controller.actions_mut().press(VehicleAction::Fire);
        controller.tick(&mut world, &mut events);
        controller.tick(&mut world, &mut events);

        // Aim point (0, 0, 2) ahead, lift 1, scale 3
        let expected = Vec3::new(0.0, 3.0, 6.0);
        assert_eq!(world.projectiles, vec![(world.chassis.position, expected)]);
        assert_eq!(world.impulses, vec![(-expected, world.chassis.position)]);

        events.swap();
        assert!(events.iter().any(|e| matches!(
            e,
            VehicleEvent::Fired { velocity, .. } if *velocity == expected
        )));
    }

    #[test]
    fn test_fire_follows_chassis_heading() {
        let mut world = FakeWorld::new();
        world.chassis.rotation = Quat::from_rotation_y(FRAC_PI_2);
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Fire);
        run(&mut controller, &mut world, 1);

        let (_, velocity) = world.projectiles[0];
        assert!((velocity - Vec3::new(6.0, 3.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_trail_latch_outlasts_input() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        let mut input = controller.input_queue();

        input.on_down(VehicleAction::LayTrail);
        run(&mut controller, &mut world, 1);
        input.on_up(VehicleAction::LayTrail);
        assert!(controller.state().trail_active);
        assert_eq!(controller.state().trail_lock, 100);

        for tick in 1..=100 {
            run(&mut controller, &mut world, 1);
            assert!(controller.state().trail_active, "released early at {tick}");
            assert!(world.trail_running);
        }

        run(&mut controller, &mut world, 1);
        assert!(!controller.state().trail_active);
        assert!(!world.trail_running);
        assert_eq!(world.trails_created, 1);
        assert_eq!(world.trail_starts, 1);
        assert_eq!(world.trail_stops, 1);
    }

    #[test]
    fn test_trail_reuses_existing_strip() {
        let mut world = FakeWorld::new();
        let config = VehicleConfig::new(
            VehicleTuning::default(),
            ControllerConfig::default().with_trail_latch_ticks(2),
        );
        let mut controller = VehicleController::new(config, &world).unwrap();

        for _ in 0..2 {
            controller.actions_mut().press(VehicleAction::LayTrail);
            controller.actions_mut().release(VehicleAction::LayTrail);
            run(&mut controller, &mut world, 5);
        }

        assert_eq!(world.trails_created, 1);
        assert_eq!(world.trail_starts, 2);
        assert_eq!(world.trail_stops, 2);
        assert_eq!(controller.trail(), Some(TrailHandle(1)));
    }

    // ------------------------------------------------------------------------
    // Air control
    // ------------------------------------------------------------------------

    #[test]
    fn test_airborne_accelerate_fires_single_thrust() {
        let mut world = FakeWorld::new();
        world.chassis.position.y = 5.0;
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 10);

        assert_eq!(controller.state().engine_force, 0.0);
        assert_eq!(world.impulses.len(), 1);
        assert_eq!(world.impulses[0].0, Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn test_air_thrust_prefers_accelerate() {
        let mut world = FakeWorld::new();
        world.chassis.position.y = 5.0;
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Brake);
        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);
        assert_eq!(world.impulses, vec![(Vec3::new(0.0, 0.0, 50.0), world.chassis.position)]);

        // Brake is still held and unspent, so it gets its own thrust next
        run(&mut controller, &mut world, 5);
        assert_eq!(world.impulses.len(), 2);
        assert_eq!(world.impulses[1].0, Vec3::new(0.0, 0.0, -50.0));
    }

    #[test]
    fn test_held_accelerate_thrusts_once_on_leaving_ground() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 3);
        assert_eq!(controller.state().engine_force, 500.0);
        assert!(world.impulses.is_empty());

        world.chassis.position.y = 5.0;
        run(&mut controller, &mut world, 5);
        assert_eq!(world.impulses.len(), 1);
        assert_eq!(world.impulses[0].0, Vec3::new(0.0, 0.0, 50.0));

        controller.actions_mut().release(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);
        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 2);
        assert_eq!(world.impulses.len(), 2);
    }

    #[test]
    fn test_airborne_steering_holds_angle() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        controller.actions_mut().press(VehicleAction::SteerLeft);
        run(&mut controller, &mut world, 3);
        let angle = controller.state().steering;

        world.chassis.position.y = 5.0;
        run(&mut controller, &mut world, 3);
        assert_eq!(controller.state().steering, angle);

        controller.actions_mut().release(VehicleAction::SteerLeft);
        run(&mut controller, &mut world, 1);
        assert_eq!(controller.state().steering, 0.0);
    }

    #[test]
    fn test_air_control_can_be_disabled() {
        let mut world = FakeWorld::new();
        world.chassis.position.y = 5.0;
        let config = VehicleConfig::new(
            VehicleTuning::default(),
            ControllerConfig::default().without_air_control(),
        );
        let mut controller = VehicleController::new(config, &world).unwrap();

        controller.actions_mut().press(VehicleAction::Accelerate);
        run(&mut controller, &mut world, 1);

        assert_eq!(controller.state().engine_force, 500.0);
        assert!(world.impulses.is_empty());
    }

    // ------------------------------------------------------------------------
    // Visual sync
    // ------------------------------------------------------------------------

    #[test]
    fn test_visuals_follow_physics_with_correction() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        run(&mut controller, &mut world, 1);

        let visuals = controller.visuals();
        for (i, wheel) in visuals.wheels.iter().enumerate() {
            assert_eq!(wheel.position, FakeWorld::wheel_position(i));
            let expected = Quat::from_rotation_z(FRAC_PI_2);
            assert!(wheel.rotation.angle_between(expected) < 1e-4);
        }

        assert_eq!(visuals.chassis.position, world.chassis.position);
        let expected = Quat::from_rotation_x(PI);
        assert!(visuals.chassis.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    #[should_panic(expected = "wheel count changed")]
    fn test_tick_panics_on_lost_wheel() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);

        world.wheels = 2;
        run(&mut controller, &mut world, 1);
    }

    #[test]
    fn test_queued_input_applied_at_tick_start() {
        let mut world = FakeWorld::new();
        let mut controller = controller(&world);
        let mut input = controller.input_queue();

        input.on_down(VehicleAction::Accelerate);
        assert!(!controller.actions().is_held(VehicleAction::Accelerate));

        run(&mut controller, &mut world, 1);
        assert!(controller.actions().is_held(VehicleAction::Accelerate));
        assert_eq!(controller.state().tick, 1);
    }
}
