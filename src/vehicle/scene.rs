//! Scene collaborator for spawned effects
//!
//! Projectiles and trails are created by one-shot actions and owned by the
//! scene. Projectiles expire on their own after a fixed number of ticks.

use glam::Vec3;

/// Ticks a projectile lives before it is disposed.
pub const PROJECTILE_MAX_AGE: u32 = 200;

/// Opaque id of a spawned projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectileHandle(pub u64);

/// Opaque id of a trail strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailHandle(pub u64);

/// Opaque id of the chassis a trail follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChassisRef(pub u64);

/// Spawns and controls effects in the world.
pub trait Scene {
    /// The chassis that trails spawned by this vehicle follow
    fn chassis_ref(&self) -> ChassisRef;

    /// Launch a self-expiring projectile
    fn spawn_projectile(&mut self, position: Vec3, velocity: Vec3) -> ProjectileHandle;

    /// Return the trail following `chassis`, creating it on first use
    fn create_or_get_trail(&mut self, chassis: ChassisRef) -> TrailHandle;

    fn start_trail(&mut self, trail: TrailHandle);

    fn stop_trail(&mut self, trail: TrailHandle);
}

/// Tick-counted lifetime.
///
/// `advance` is called once per tick; the owner is disposed on the tick the
/// age first exceeds `max_age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    age: u32,
    max_age: u32,
}

impl Lifetime {
    pub fn new(max_age: u32) -> Self {
        Self { age: 0, max_age }
    }

    /// Count one tick. Returns `true` once expired.
    pub fn advance(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        self.is_expired()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age > self.max_age
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }
}
