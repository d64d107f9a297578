//! Raycast vehicle built on rapier's dynamic vehicle controller

use glam::{Quat, Vec3};
use rapier3d::control::{DynamicRayCastVehicleController, WheelTuning};
use rapier3d::prelude::*;

use super::world::{from_point, to_point, to_vector};
use super::Physics;
use crate::core::VehicleTuning;
use crate::vehicle::WheelPosition;

/// Suspension rays point down the chassis
const WHEEL_DIRECTION: Vec3 = Vec3::NEG_Y;
/// Wheels spin around the chassis -X axis
const WHEEL_AXLE: Vec3 = Vec3::NEG_X;
/// Index of the chassis forward axis (+Z)
const FORWARD_AXIS: usize = 2;

/// A four-wheeled raycast vehicle living in a [`Physics`] world
pub struct RaycastVehicle {
    controller: DynamicRayCastVehicleController,
}

impl RaycastVehicle {
    /// Create the chassis body and collider, then attach one wheel per
    /// [`WheelPosition`] in index order.
    pub fn build(physics: &mut Physics, tuning: &VehicleTuning) -> Self {
        let chassis = physics.create_chassis_body(tuning.spawn_position);
        physics.add_chassis_collider(
            chassis,
            tuning.chassis_size * 0.5,
            tuning.mass_offset,
            tuning.mass,
            tuning.center_of_mass,
        );

        let suspension = &tuning.suspension;
        let wheel_tuning = WheelTuning {
            suspension_stiffness: suspension.stiffness,
            suspension_compression: suspension.compression,
            suspension_damping: suspension.damping,
            friction_slip: suspension.friction_slip,
            max_suspension_force: suspension.max_force,
            ..WheelTuning::default()
        };

        let mut controller = DynamicRayCastVehicleController::new(chassis);
        controller.index_up_axis = 1;
        controller.index_forward_axis = FORWARD_AXIS;

        for wheel in WheelPosition::ALL {
            let axle = if wheel.is_front() { &tuning.front } else { &tuning.rear };
            let connection = Vec3::new(
                wheel.side() * axle.half_track,
                axle.axle_height,
                axle.position,
            );
            controller.add_wheel(
                to_point(connection),
                to_vector(WHEEL_DIRECTION),
                to_vector(WHEEL_AXLE),
                suspension.rest_length,
                axle.radius,
                &wheel_tuning,
            );
        }

        log::debug!(
            "Raycast vehicle built at {} with {} wheels",
            tuning.spawn_position,
            controller.wheels().len()
        );

        Self { controller }
    }

    /// Handle of the chassis rigid body
    pub fn chassis(&self) -> RigidBodyHandle {
        self.controller.chassis
    }

    /// Signed forward speed in km/h
    pub fn speed_kmh(&self) -> f32 {
        self.controller.current_vehicle_speed * 3.6
    }

    pub fn wheel_count(&self) -> usize {
        self.controller.wheels().len()
    }

    /// # Panics
    ///
    /// Panics if `wheel` is out of range.
    pub fn set_engine_force(&mut self, wheel: usize, force: f32) {
        self.controller.wheels_mut()[wheel].engine_force = force;
    }

    /// # Panics
    ///
    /// Panics if `wheel` is out of range.
    pub fn set_brake(&mut self, wheel: usize, force: f32) {
        self.controller.wheels_mut()[wheel].brake = force;
    }

    /// # Panics
    ///
    /// Panics if `wheel` is out of range.
    pub fn set_steering(&mut self, wheel: usize, angle: f32) {
        self.controller.wheels_mut()[wheel].steering = angle;
    }

    pub fn engine_force(&self, wheel: usize) -> f32 {
        self.controller.wheels()[wheel].engine_force
    }

    pub fn brake(&self, wheel: usize) -> f32 {
        self.controller.wheels()[wheel].brake
    }

    pub fn steering(&self, wheel: usize) -> f32 {
        self.controller.wheels()[wheel].steering
    }

    /// World position and rotation of a wheel's hub.
    ///
    /// The rotation is the chassis rotation, then the steering yaw, then the
    /// wheel's spin around its axle.
    pub fn wheel_transform(&self, wheel: usize, chassis_rotation: Quat) -> (Vec3, Quat) {
        let w = &self.controller.wheels()[wheel];
        let steer = Quat::from_rotation_y(w.steering);
        let spin = Quat::from_axis_angle(WHEEL_AXLE, w.rotation);
        (from_point(&w.center()), chassis_rotation * steer * spin)
    }

    /// Cast the wheel rays and apply suspension and tire forces
    pub fn update(&mut self, physics: &mut Physics, dt: f32) {
        physics.update_vehicle(&mut self.controller, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_adds_four_wheels() {
        let mut physics = Physics::default();
        let vehicle = RaycastVehicle::build(&mut physics, &VehicleTuning::default());

        assert_eq!(vehicle.wheel_count(), 4);
        assert!(physics.contains(vehicle.chassis()));
        assert_eq!(vehicle.speed_kmh(), 0.0);
    }

    #[test]
    fn test_wheel_setters() {
        let mut physics = Physics::default();
        let mut vehicle = RaycastVehicle::build(&mut physics, &VehicleTuning::default());

        vehicle.set_engine_force(0, 500.0);
        vehicle.set_brake(3, 10.0);
        vehicle.set_steering(1, -0.2);

        assert_eq!(vehicle.engine_force(0), 500.0);
        assert_eq!(vehicle.engine_force(1), 0.0);
        assert_eq!(vehicle.brake(3), 10.0);
        assert_eq!(vehicle.steering(1), -0.2);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_wheel_panics() {
        let mut physics = Physics::default();
        let mut vehicle = RaycastVehicle::build(&mut physics, &VehicleTuning::default());
        vehicle.set_brake(4, 1.0);
    }
}
