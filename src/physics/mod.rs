//! Physics backend module
//!
//! Built on top of rapier3d: the world wrapper, a raycast vehicle and the
//! arena that hosts vehicles, projectiles and trails.

mod arena;
mod raycast;
mod world;

pub use arena::{Arena, ArenaConfig, ArenaVehicle, Projectile, Trail, VehicleHandle};
pub use raycast::RaycastVehicle;
pub use world::{CHASSIS_GROUP, PROJECTILE_GROUP, Physics};
