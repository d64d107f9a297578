//! Vehicle construction errors

/// Errors that abort vehicle creation.
///
/// There is no recoverable error during a tick: a bad wheel index or a
/// vanished chassis is a bug and panics in the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleError {
    /// The physics backend has no vehicle for the requested handle
    MissingPhysicsVehicle,
    /// The physics vehicle does not have the expected wheel layout
    WheelLayout {
        /// Wheels the controller drives
        expected: usize,
        /// Wheels the physics vehicle reports
        found: usize,
    },
    /// A tuning parameter is out of range
    InvalidTuning(String),
}

impl std::fmt::Display for VehicleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPhysicsVehicle => write!(f, "physics vehicle is not available"),
            Self::WheelLayout { expected, found } => {
                write!(f, "expected {expected} wheels, physics vehicle has {found}")
            }
            Self::InvalidTuning(e) => write!(f, "invalid tuning: {e}"),
        }
    }
}

impl std::error::Error for VehicleError {}
