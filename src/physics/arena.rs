//! Arena: the rapier world, its vehicles and their spawned effects
//!
//! Projectiles and trails are `hecs` entities. [`ArenaVehicle`] is a
//! short-lived view over one vehicle that implements both [`PhysicsVehicle`]
//! and [`Scene`], so a controller can drive it in a single tick call.

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::{Physics, RaycastVehicle};
use crate::core::{EventQueue, VehicleEvent, VehicleTuning};
use crate::vehicle::{
    ChassisRef, Lifetime, PROJECTILE_MAX_AGE, PhysicsVehicle, ProjectileHandle, RigidBody, Scene,
    TrailHandle, WorldTransform,
};

// ============================================================================
// Configuration
// ============================================================================

/// World parameters of an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub gravity: Vec3,
    /// Half the side length of the square ground slab
    pub ground_half_extent: f32,
    pub projectile_radius: f32,
    pub projectile_mass: f32,
    /// Ticks a projectile survives
    pub projectile_max_age: u32,
    /// Oldest trail points are dropped past this count
    pub trail_max_points: usize,
    /// Minimum distance between two trail points
    pub trail_point_spacing: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            ground_half_extent: 230.0,
            projectile_radius: 0.125,
            projectile_mass: 0.1,
            projectile_max_age: PROJECTILE_MAX_AGE,
            trail_max_points: 512,
            trail_point_spacing: 0.25,
        }
    }
}

// ============================================================================
// Components
// ============================================================================

/// A live projectile body
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub body: RigidBodyHandle,
    pub life: Lifetime,
}

/// A ground strip laid behind a chassis
#[derive(Debug, Clone)]
pub struct Trail {
    pub chassis: ChassisRef,
    pub emitting: bool,
    pub points: VecDeque<Vec3>,
}

impl Trail {
    fn new(chassis: ChassisRef) -> Self {
        Self {
            chassis,
            emitting: false,
            points: VecDeque::new(),
        }
    }

    /// Append `point` unless it is closer than `spacing` to the last one
    fn extend(&mut self, point: Vec3, spacing: f32, max_points: usize) {
        if let Some(last) = self.points.back() {
            if last.distance(point) < spacing {
                return;
            }
        }
        self.points.push_back(point);
        while self.points.len() > max_points {
            self.points.pop_front();
        }
    }
}

fn chassis_ref(body: RigidBodyHandle) -> ChassisRef {
    let (index, generation) = body.into_raw_parts();
    ChassisRef((u64::from(generation) << 32) | u64::from(index))
}

fn chassis_body(chassis: ChassisRef) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(chassis.0 as u32, (chassis.0 >> 32) as u32)
}

fn entity_bits(entity: Entity) -> u64 {
    entity.to_bits().get()
}

// ============================================================================
// Arena
// ============================================================================

/// Id of a vehicle inside an [`Arena`]. Stale once the vehicle is despawned,
/// even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleHandle {
    index: usize,
    generation: u32,
}

struct VehicleSlot {
    generation: u32,
    vehicle: Option<RaycastVehicle>,
}

/// A rapier world with a ground slab, raycast vehicles and their effects
pub struct Arena {
    physics: Physics,
    entities: hecs::World,
    vehicles: Vec<VehicleSlot>,
    config: ArenaConfig,
    tick: u64,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        let mut physics = Physics::with_gravity(config.gravity);
        let ground = physics.create_static_body(Vec3::ZERO);
        physics.add_ground_plane(ground, config.ground_half_extent);

        log::info!(
            "Arena created: ground {0}x{0}, gravity {1}",
            config.ground_half_extent * 2.0,
            config.gravity
        );

        Self {
            physics,
            entities: hecs::World::new(),
            vehicles: Vec::new(),
            config,
            tick: 0,
        }
    }

    /// Build a raycast vehicle from `tuning`
    pub fn spawn_vehicle(&mut self, tuning: &VehicleTuning) -> VehicleHandle {
        let vehicle = Some(RaycastVehicle::build(&mut self.physics, tuning));
        let index = match self.vehicles.iter().position(|slot| slot.vehicle.is_none()) {
            Some(index) => {
                self.vehicles[index].vehicle = vehicle;
                index
            }
            None => {
                self.vehicles.push(VehicleSlot {
                    generation: 0,
                    vehicle,
                });
                self.vehicles.len() - 1
            }
        };

        let handle = VehicleHandle {
            index,
            generation: self.vehicles[index].generation,
        };
        log::info!("Spawned vehicle {handle:?}");
        handle
    }

    /// Remove a vehicle, its chassis body and its trails. Returns `false` if
    /// it was already gone.
    pub fn despawn_vehicle(&mut self, handle: VehicleHandle) -> bool {
        let Some(slot) = self
            .vehicles
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
        else {
            return false;
        };
        let Some(vehicle) = slot.vehicle.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);

        let chassis = chassis_ref(vehicle.chassis());
        self.physics.remove_body(vehicle.chassis());

        let trails: Vec<Entity> = self
            .entities
            .query::<&Trail>()
            .iter()
            .filter(|(_, trail)| trail.chassis == chassis)
            .map(|(entity, _)| entity)
            .collect();
        for entity in trails {
            if self.entities.despawn(entity).is_ok() {
                log::debug!("Removed trail {entity:?} of {chassis:?}");
            }
        }

        log::info!("Despawned vehicle {handle:?}");
        true
    }

    /// Borrow a vehicle as a controllable view, or `None` if it does not exist
    pub fn vehicle(&mut self, handle: VehicleHandle) -> Option<ArenaVehicle<'_>> {
        let Arena {
            physics,
            entities,
            vehicles,
            config,
            ..
        } = self;
        let vehicle = vehicles
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)?
            .vehicle
            .as_mut()?;
        Some(ArenaVehicle {
            vehicle,
            physics,
            entities,
            config,
        })
    }

    /// Advance the world by `dt` seconds.
    ///
    /// Vehicles apply their wheel forces, the physics steps, projectiles age
    /// and expire, and emitting trails extend.
    pub fn step(&mut self, dt: f32, events: &mut EventQueue) {
        for vehicle in self.vehicles.iter_mut().filter_map(|slot| slot.vehicle.as_mut()) {
            vehicle.update(&mut self.physics, dt);
        }
        self.physics.step(dt);
        self.tick += 1;

        self.age_projectiles(events);
        self.extend_trails();
    }

    fn age_projectiles(&mut self, events: &mut EventQueue) {
        let mut expired = Vec::new();
        for (entity, projectile) in self.entities.query_mut::<&mut Projectile>() {
            if projectile.life.advance() {
                expired.push((entity, projectile.body, projectile.life.age()));
            }
        }

        for (entity, body, age) in expired {
            self.physics.remove_body(body);
            if self.entities.despawn(entity).is_ok() {
                events.push(VehicleEvent::ProjectileExpired { age });
                log::debug!("Projectile {entity:?} expired at age {age}");
            }
        }
    }

    fn extend_trails(&mut self) {
        let spacing = self.config.trail_point_spacing;
        let max_points = self.config.trail_max_points;

        for (_, trail) in self.entities.query_mut::<&mut Trail>() {
            if !trail.emitting {
                continue;
            }
            let Some(position) = self.physics.get_position(chassis_body(trail.chassis)) else {
                continue;
            };
            trail.extend(Vec3::new(position.x, 0.0, position.z), spacing, max_points);
        }
    }

    /// Number of live projectiles
    pub fn projectile_count(&self) -> usize {
        self.entities.query::<&Projectile>().iter().count()
    }

    /// Points laid by a trail so far
    pub fn trail_points(&self, trail: TrailHandle) -> Option<Vec<Vec3>> {
        let entity = Entity::from_bits(trail.0)?;
        let trail = self.entities.get::<&Trail>(entity).ok()?;
        Some(trail.points.iter().copied().collect())
    }

    /// Steps taken so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

// ============================================================================
// Vehicle view
// ============================================================================

/// Mutable view of one arena vehicle and the world around it
pub struct ArenaVehicle<'a> {
    vehicle: &'a mut RaycastVehicle,
    physics: &'a mut Physics,
    entities: &'a mut hecs::World,
    config: &'a ArenaConfig,
}

impl ArenaVehicle<'_> {
    fn trail_mut(&mut self, trail: TrailHandle) -> Option<hecs::RefMut<'_, Trail>> {
        let entity = Entity::from_bits(trail.0)?;
        self.entities.get::<&mut Trail>(entity).ok()
    }

    fn set_emitting(&mut self, trail: TrailHandle, emitting: bool) {
        match self.trail_mut(trail) {
            Some(mut t) => t.emitting = emitting,
            None => log::warn!("Unknown trail {trail:?}"),
        }
    }
}

impl RigidBody for ArenaVehicle<'_> {
    fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3) {
        self.physics
            .apply_impulse_at_point(self.vehicle.chassis(), impulse, at_point);
    }
}

impl PhysicsVehicle for ArenaVehicle<'_> {
    fn current_speed(&self) -> f32 {
        self.vehicle.speed_kmh()
    }

    fn set_engine_force(&mut self, wheel: usize, force: f32) {
        self.vehicle.set_engine_force(wheel, force);
    }

    fn set_brake(&mut self, wheel: usize, force: f32) {
        self.vehicle.set_brake(wheel, force);
    }

    fn set_steering(&mut self, wheel: usize, angle: f32) {
        self.vehicle.set_steering(wheel, angle);
    }

    fn wheel_count(&self) -> usize {
        self.vehicle.wheel_count()
    }

    fn wheel_world_transform(&self, wheel: usize) -> WorldTransform {
        let chassis = self.chassis_world_transform();
        let (position, rotation) = self.vehicle.wheel_transform(wheel, chassis.rotation);
        WorldTransform::new(position, rotation)
    }

    fn chassis_world_transform(&self) -> WorldTransform {
        let body = self.vehicle.chassis();
        let position = self.physics.get_position(body);
        let rotation = self.physics.get_rotation(body);
        match position.zip(rotation) {
            Some((position, rotation)) => WorldTransform::new(position, rotation),
            None => panic!("chassis body of a live vehicle was removed"),
        }
    }
}

impl Scene for ArenaVehicle<'_> {
    fn chassis_ref(&self) -> ChassisRef {
        chassis_ref(self.vehicle.chassis())
    }

    fn spawn_projectile(&mut self, position: Vec3, velocity: Vec3) -> ProjectileHandle {
        let body = self.physics.create_projectile_body(position, velocity);
        self.physics.add_projectile_collider(
            body,
            self.config.projectile_radius,
            self.config.projectile_mass,
        );

        let entity = self.entities.spawn((Projectile {
            body,
            life: Lifetime::new(self.config.projectile_max_age),
        },));
        log::debug!("Spawned projectile {entity:?} at {position}");
        ProjectileHandle(entity_bits(entity))
    }

    fn create_or_get_trail(&mut self, chassis: ChassisRef) -> TrailHandle {
        let existing = self
            .entities
            .query::<&Trail>()
            .iter()
            .find(|(_, trail)| trail.chassis == chassis)
            .map(|(entity, _)| entity);

        let entity = existing.unwrap_or_else(|| {
            let entity = self.entities.spawn((Trail::new(chassis),));
            log::debug!("Created trail {entity:?} for {chassis:?}");
            entity
        });
        TrailHandle(entity_bits(entity))
    }

    fn start_trail(&mut self, trail: TrailHandle) {
        self.set_emitting(trail, true);
    }

    fn stop_trail(&mut self, trail: TrailHandle) {
        self.set_emitting(trail, false);
    }
}
