//! Input handling module
//!
//! Vehicle actions, their per-tick state, key bindings and the queue that
//! carries input into the simulation loop.

mod action;
mod mapper;
mod source;

pub use action::{ActionState, VehicleAction};
pub use mapper::{InputMapper, KeyboardInput};
pub use source::{ActionEvent, ActionQueue, InputSource};
