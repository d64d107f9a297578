//! Vehicle control module
//!
//! The engine-independent control loop and the traits it drives.

mod controller;
mod physics;
mod scene;
mod visual;

pub use controller::{VehicleController, VehicleRuntimeState, WHEEL_COUNT};
pub use physics::{PhysicsVehicle, RigidBody, WheelPosition, WorldTransform};
pub use scene::{ChassisRef, Lifetime, PROJECTILE_MAX_AGE, ProjectileHandle, Scene, TrailHandle};
pub use visual::{Transform, VehicleVisuals};
