//! Physics world using rapier3d

use glam::{Quat, Vec3};
use rapier3d::control::DynamicRayCastVehicleController;
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

/// Collision group of vehicle chassis colliders
pub const CHASSIS_GROUP: Group = Group::GROUP_1;
/// Collision group of projectiles; they never hit a chassis, including the shooter's
pub const PROJECTILE_GROUP: Group = Group::GROUP_2;

/// Convert glam Vec3 to a rapier vector
pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

/// Convert a rapier vector to glam Vec3
pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_point(p: Vec3) -> Point<Real> {
    point![p.x, p.y, p.z]
}

pub(crate) fn from_point(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Convert rapier3d UnitQuaternion to glam Quat
pub(crate) fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for vehicle wheel raycasts
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create a new physics world with the given gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &to_vector(self.gravity),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Cast the wheel rays of a raycast vehicle and apply its suspension and
    /// tire forces to the chassis. Call before [`Physics::step`].
    pub fn update_vehicle(&mut self, vehicle: &mut DynamicRayCastVehicleController, dt: f32) {
        let filter = QueryFilter::default().exclude_rigid_body(vehicle.chassis);
        vehicle.update_vehicle(
            dt,
            &mut self.rigid_body_set,
            &self.collider_set,
            &self.query_pipeline,
            filter,
        );
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(position))
            .build();

        self.rigid_body_set.insert(body)
    }

    /// Create a dynamic rigid body that never sleeps
    pub fn create_chassis_body(&mut self, position: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .can_sleep(false)
            .build();

        self.rigid_body_set.insert(body)
    }

    /// Create a fast-moving dynamic body with continuous collision detection
    pub fn create_projectile_body(&mut self, position: Vec3, velocity: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .linvel(to_vector(velocity))
            .ccd_enabled(true)
            .build();

        self.rigid_body_set.insert(body)
    }

    /// Add the chassis box collider, offset from the body origin.
    ///
    /// The whole chassis `mass` sits at `center_of_mass` (body space), with
    /// the box's inertia.
    pub fn add_chassis_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec3,
        offset: Vec3,
        mass: f32,
        center_of_mass: Vec3,
    ) -> ColliderHandle {
        let size = half_extents * 2.0;
        let inertia = vector![
            mass / 12.0 * (size.y * size.y + size.z * size.z),
            mass / 12.0 * (size.x * size.x + size.z * size.z),
            mass / 12.0 * (size.x * size.x + size.y * size.y)
        ];
        // Collider-local, so shift back by the collider offset
        let mass_properties = MassProperties::new(to_point(center_of_mass - offset), mass, inertia);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(offset))
            .mass_properties(mass_properties)
            .collision_groups(InteractionGroups::new(CHASSIS_GROUP, Group::ALL))
            .build();

        self.collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set)
    }

    /// Centre of mass of a body in world space
    pub fn get_center_of_mass(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body)
            .map(|rb| from_point(rb.center_of_mass()))
    }

    /// Add a projectile sphere collider
    pub fn add_projectile_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
        mass: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .mass(mass)
            .restitution(0.3)
            .friction(0.5)
            .collision_groups(InteractionGroups::new(PROJECTILE_GROUP, !CHASSIS_GROUP))
            .build();

        self.collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set)
    }

    /// Add a square ground slab centered on the body
    pub fn add_ground_plane(&mut self, body: RigidBodyHandle, half_extent: f32) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extent, 0.1, half_extent)
            .translation(vector![0.0, -0.1, 0.0])
            .friction(5.0)
            .restitution(0.7)
            .build();

        self.collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set)
    }

    /// Get the position of a rigid body
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body)
            .map(|rb| from_vector(rb.translation()))
    }

    /// Get the rotation of a rigid body
    pub fn get_rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(body)
            .map(|rb| rapier_to_quat(rb.rotation()))
    }

    /// Get the linear velocity of a body
    pub fn get_linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body)
            .map(|rb| from_vector(rb.linvel()))
    }

    /// Apply an impulse at a world-space point of a dynamic body
    pub fn apply_impulse_at_point(&mut self, body: RigidBodyHandle, impulse: Vec3, point: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            rb.apply_impulse_at_point(to_vector(impulse), to_point(point), true);
        }
    }

    /// Check if a body is still in the world
    pub fn contains(&self, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(body)
    }

    /// Number of rigid bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.rigid_body_set.remove(
            body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::with_gravity(Vec3::new(0.0, -10.0, 0.0))
    }
}
