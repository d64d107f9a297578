//! Capability traits for the physics side of a vehicle
//!
//! The controller only talks to the physics engine through these traits, so
//! any raycast-vehicle implementation (or a test double) can back it.

use glam::{Quat, Vec3};

/// Wheel slots of a four-wheel vehicle, in physics wheel-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelPosition {
    FrontLeft = 0,
    FrontRight = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::RearLeft,
        Self::RearRight,
    ];

    pub const FRONT: [WheelPosition; 2] = [Self::FrontLeft, Self::FrontRight];
    pub const REAR: [WheelPosition; 2] = [Self::RearLeft, Self::RearRight];

    /// Physics wheel index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    /// Side sign along the chassis X axis (left is +X)
    #[must_use]
    pub const fn side(self) -> f32 {
        match self {
            Self::FrontLeft | Self::RearLeft => 1.0,
            Self::FrontRight | Self::RearRight => -1.0,
        }
    }
}

/// Position and orientation in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Transform a point from local to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A body that accepts impulses
pub trait RigidBody {
    /// Apply an instantaneous momentum change at a world-space point
    fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3);
}

/// A raycast vehicle exposed by a physics engine.
///
/// Wheel indices out of range are programming errors; implementations panic
/// on them.
pub trait PhysicsVehicle: RigidBody {
    /// Signed forward speed (negative when rolling backward)
    fn current_speed(&self) -> f32;

    fn set_engine_force(&mut self, wheel: usize, force: f32);

    fn set_brake(&mut self, wheel: usize, force: f32);

    /// Steering angle in radians
    fn set_steering(&mut self, wheel: usize, angle: f32);

    fn wheel_count(&self) -> usize;

    fn wheel_world_transform(&self, wheel: usize) -> WorldTransform;

    fn chassis_world_transform(&self) -> WorldTransform;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_indices() {
        for (i, wheel) in WheelPosition::ALL.iter().enumerate() {
            assert_eq!(wheel.index(), i);
        }
        assert!(WheelPosition::FRONT.iter().all(|w| w.is_front()));
        assert!(WheelPosition::REAR.iter().all(|w| !w.is_front()));
    }

    #[test]
    fn test_transform_point() {
        let t = WorldTransform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let p = t.transform_point(Vec3::Z);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }
}
