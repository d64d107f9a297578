//! Input-to-force control for ground vehicles
//!
//! This crate provides:
//! - An engine-independent vehicle controller driven once per tick
//! - Edge-triggered vehicle actions fed from keyboard or any input source
//! - Physics, scene and rigid body traits the controller talks through
//! - A rapier3d backend with projectiles and ground trails

pub mod core;
pub mod input;
pub mod physics;
pub mod vehicle;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        ControllerConfig, EventQueue, VehicleConfig, VehicleError, VehicleEvent, VehicleTuning,
    };
    pub use crate::input::{ActionQueue, ActionState, InputMapper, InputSource, KeyboardInput, VehicleAction};
    pub use crate::physics::{Arena, ArenaConfig, VehicleHandle};
    pub use crate::vehicle::{PhysicsVehicle, RigidBody, Scene, VehicleController};
    pub use glam::{Quat, Vec3};
    pub use winit::event::ElementState;
    pub use winit::keyboard::KeyCode;
}
