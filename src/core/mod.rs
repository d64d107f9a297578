//! Core module
//!
//! Configuration, errors and the event queue shared by the other modules

mod config;
mod error;
mod events;

pub use config::{
    AxisAngle, AxleGeometry, ConfigError, ControllerConfig, Suspension, VehicleConfig,
    VehicleTuning,
};
pub use error::VehicleError;
pub use events::{EventQueue, VehicleEvent};
