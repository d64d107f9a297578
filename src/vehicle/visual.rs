//! Visual nodes mirrored from the physics vehicle

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use super::WorldTransform;

/// World placement of a visual node
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Copy a physics transform, then rotate by `correction` in local space
    pub fn sync_from(&mut self, physics: WorldTransform, correction: Quat) {
        self.position = physics.position;
        self.rotation = (physics.rotation * correction).normalize();
    }
}

/// Chassis and wheel nodes of one vehicle
#[derive(Debug, Clone, Default)]
pub struct VehicleVisuals {
    pub chassis: Transform,
    pub wheels: SmallVec<[Transform; 4]>,
}

impl VehicleVisuals {
    /// Create nodes for a vehicle with `wheel_count` wheels
    pub fn new(wheel_count: usize) -> Self {
        Self {
            chassis: Transform::default(),
            wheels: SmallVec::from_elem(Transform::default(), wheel_count),
        }
    }
}
