//! Vehicle configuration
//!
//! Tuning and controller parameters, loadable from RON (Rusty Object Notation)
//! or JSON files.

use std::f32::consts::{FRAC_PI_2, PI};
use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::VehicleError;

/// Geometry of one axle (both wheels share it)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxleGeometry {
    /// Longitudinal position of the axle in chassis space
    pub position: f32,
    /// Wheel radius
    pub radius: f32,
    /// Wheel width
    pub width: f32,
    /// Half the distance between the two wheels
    pub half_track: f32,
    /// Height of the wheel connection point
    pub axle_height: f32,
}

impl AxleGeometry {
    fn front() -> Self {
        Self {
            position: 1.0,
            radius: 0.8,
            width: 0.3,
            half_track: 1.0,
            axle_height: 0.4,
        }
    }

    fn rear() -> Self {
        Self {
            position: -1.0,
            ..Self::front()
        }
    }
}

/// Suspension parameters shared by every wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suspension {
    pub stiffness: f32,
    pub damping: f32,
    pub compression: f32,
    pub rest_length: f32,
    pub max_force: f32,
    pub friction_slip: f32,
    pub roll_influence: f32,
}

impl Default for Suspension {
    fn default() -> Self {
        Self {
            stiffness: 10.0,
            damping: 0.3,
            compression: 4.4,
            rest_length: 0.6,
            max_force: 600_000.0,
            friction_slip: 40.0,
            roll_influence: 1.0,
        }
    }
}

/// Physical vehicle parameters.
///
/// Fixed once the vehicle is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Chassis box size (width, height, length)
    pub chassis_size: Vec3,
    /// Chassis mass
    pub mass: f32,
    /// Chassis collider offset from the body origin
    pub mass_offset: Vec3,
    /// Centre of mass relative to the body origin.
    ///
    /// Braking and drive impulses act at the wheel contacts, so the height of
    /// this point above the contacts sets how far the chassis pitches.
    pub center_of_mass: Vec3,
    /// Initial chassis position
    pub spawn_position: Vec3,
    pub front: AxleGeometry,
    pub rear: AxleGeometry,
    pub suspension: Suspension,
    /// Steering change per tick while a steer action is held
    pub steering_increment: f32,
    /// Steering angle limit (radians, both directions)
    pub steering_clamp: f32,
    pub max_engine_force: f32,
    pub max_braking_force: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            chassis_size: Vec3::new(2.0, 0.7, 4.0),
            mass: 100.0,
            mass_offset: Vec3::new(0.0, 0.4, 0.0),
            center_of_mass: Vec3::new(0.0, -0.45, 0.0),
            spawn_position: Vec3::new(5.0, 15.0, 0.0),
            front: AxleGeometry::front(),
            rear: AxleGeometry::rear(),
            suspension: Suspension::default(),
            steering_increment: 0.01,
            steering_clamp: 0.2,
            max_engine_force: 500.0,
            max_braking_force: 10.0,
        }
    }
}

impl VehicleTuning {
    /// Set the steering increment and clamp
    pub fn with_steering(mut self, increment: f32, clamp: f32) -> Self {
        self.steering_increment = increment;
        self.steering_clamp = clamp;
        self
    }

    /// Set the engine and braking force limits
    pub fn with_forces(mut self, max_engine_force: f32, max_braking_force: f32) -> Self {
        self.max_engine_force = max_engine_force;
        self.max_braking_force = max_braking_force;
        self
    }

    /// Set the spawn position
    pub fn with_spawn_position(mut self, position: Vec3) -> Self {
        self.spawn_position = position;
        self
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`VehicleError::InvalidTuning`] naming the first bad field.
    pub fn validate(&self) -> Result<(), VehicleError> {
        let positive = [
            ("mass", self.mass),
            ("front.radius", self.front.radius),
            ("rear.radius", self.rear.radius),
            ("suspension.rest_length", self.suspension.rest_length),
            ("steering_increment", self.steering_increment),
            ("steering_clamp", self.steering_clamp),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(VehicleError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("max_engine_force", self.max_engine_force),
            ("max_braking_force", self.max_braking_force),
            ("suspension.max_force", self.suspension.max_force),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(VehicleError::InvalidTuning(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !self.chassis_size.is_finite() || self.chassis_size.min_element() <= 0.0 {
            return Err(VehicleError::InvalidTuning(format!(
                "chassis_size must be positive, got {}",
                self.chassis_size
            )));
        }

        if !self.mass_offset.is_finite() || !self.center_of_mass.is_finite() {
            return Err(VehicleError::InvalidTuning(
                "mass_offset and center_of_mass must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// A rotation expressed as an axis and an angle in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    pub axis: Vec3,
    pub angle: f32,
}

impl AxisAngle {
    pub fn new(axis: Vec3, angle: f32) -> Self {
        Self { axis, angle }
    }

    /// Convert to a quaternion
    pub fn to_quat(self) -> Quat {
        Quat::from_axis_angle(self.axis.try_normalize().unwrap_or(Vec3::Y), self.angle)
    }
}

/// Controller behavior parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Speed beyond which accelerate/brake act as brakes against the motion.
    /// Expressed in the units the physics vehicle reports.
    pub reverse_speed_threshold: f32,
    /// Magnitude of the nudge impulses
    pub nudge_impulse: f32,
    /// Chassis height above which the vehicle counts as airborne (None disables air control)
    pub airborne_height: Option<f32>,
    /// Forward/backward impulse fired by accelerate/brake while airborne
    pub air_thrust_impulse: f32,
    /// Aim point in chassis space
    pub aim_offset: Vec3,
    /// Vertical component of the launch vector before scaling
    pub projectile_lift: f32,
    /// Launch vector scale
    pub projectile_speed_scale: f32,
    /// Ticks a trail stays active after being triggered
    pub trail_latch_ticks: u32,
    /// Applied on top of each wheel's physics orientation
    pub wheel_correction: AxisAngle,
    /// Applied on top of the chassis physics orientation
    pub chassis_correction: AxisAngle,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reverse_speed_threshold: 1.0,
            nudge_impulse: 50.0,
            airborne_height: Some(1.5),
            air_thrust_impulse: 50.0,
            aim_offset: Vec3::new(0.0, 0.0, 2.0),
            projectile_lift: 1.0,
            projectile_speed_scale: 3.0,
            trail_latch_ticks: 100,
            wheel_correction: AxisAngle::new(Vec3::Z, FRAC_PI_2),
            chassis_correction: AxisAngle::new(Vec3::X, PI),
        }
    }
}

impl ControllerConfig {
    /// Disable the airborne thrust/steering-freeze behavior
    pub fn without_air_control(mut self) -> Self {
        self.airborne_height = None;
        self
    }

    /// Set the reverse/brake speed threshold
    pub fn with_reverse_speed_threshold(mut self, threshold: f32) -> Self {
        self.reverse_speed_threshold = threshold;
        self
    }

    /// Set the trail latch duration
    pub fn with_trail_latch_ticks(mut self, ticks: u32) -> Self {
        self.trail_latch_ticks = ticks;
        self
    }
}

/// Complete configuration for one vehicle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub tuning: VehicleTuning,
    pub controller: ControllerConfig,
}

impl VehicleConfig {
    /// Create a config from its parts
    pub fn new(tuning: VehicleTuning, controller: ControllerConfig) -> Self {
        Self { tuning, controller }
    }

    /// Load a config, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, unreadable files or bad content
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::load_ron(path),
            Some("json") => Self::load_json(path),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = self.to_ron()?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Serialize to a pretty RON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Parse from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid config
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }
}

/// Errors that can occur while loading or saving configs
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: {ext:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}
