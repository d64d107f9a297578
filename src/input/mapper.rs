//! Key Bindings for Vehicle Actions
//!
//! Physical keys map to [`VehicleAction`]s, never to behavior directly, so
//! controls can be rebound at runtime and the controller never sees a key
//! code.
//!
//! # Example
//!
//! ```ignore
//! let queue = ActionQueue::new();
//! let mut keyboard = KeyboardInput::new(InputMapper::with_defaults(), queue.clone());
//!
//! // In the window event handler
//! keyboard.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
//!
//! // In the simulation loop
//! controller.tick(&mut vehicle, &mut events); // drains `queue`
//! ```

use rustc_hash::FxHashMap;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use super::{InputSource, VehicleAction};

// ============================================================================
// Input Mapper
// ============================================================================

/// WASD or arrows drive, IJKL nudges, M fires and N lays a trail
const DEFAULT_BINDINGS: [(KeyCode, VehicleAction); 14] = [
    (KeyCode::KeyW, VehicleAction::Accelerate),
    (KeyCode::KeyS, VehicleAction::Brake),
    (KeyCode::KeyA, VehicleAction::SteerLeft),
    (KeyCode::KeyD, VehicleAction::SteerRight),
    (KeyCode::ArrowUp, VehicleAction::Accelerate),
    (KeyCode::ArrowDown, VehicleAction::Brake),
    (KeyCode::ArrowLeft, VehicleAction::SteerLeft),
    (KeyCode::ArrowRight, VehicleAction::SteerRight),
    (KeyCode::KeyI, VehicleAction::NudgeUp),
    (KeyCode::KeyK, VehicleAction::NudgeDown),
    (KeyCode::KeyJ, VehicleAction::NudgeLeft),
    (KeyCode::KeyL, VehicleAction::NudgeRight),
    (KeyCode::KeyM, VehicleAction::Fire),
    (KeyCode::KeyN, VehicleAction::LayTrail),
];

/// Maps physical keys to vehicle actions. Several keys may share an action.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    bindings: FxHashMap<KeyCode, VehicleAction>,
}

impl InputMapper {
    /// Mapper with no keys bound
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper with the default driving layout
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            bindings: DEFAULT_BINDINGS.into_iter().collect(),
        }
    }

    /// Bind `key` to `action`, returning the action it was bound to before
    pub fn bind(&mut self, key: KeyCode, action: VehicleAction) -> Option<VehicleAction> {
        let previous = self.bindings.insert(key, action);
        log::debug!("Bound {key:?} to {action:?}");
        previous
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<VehicleAction> {
        self.bindings.remove(&key)
    }

    #[must_use]
    pub fn action(&self, key: KeyCode) -> Option<VehicleAction> {
        self.bindings.get(&key).copied()
    }
}

// ============================================================================
// Keyboard Input
// ============================================================================

/// Translates raw keyboard events into actions for an [`InputSource`].
#[derive(Debug)]
pub struct KeyboardInput<S: InputSource> {
    mapper: InputMapper,
    sink: S,
}

impl<S: InputSource> KeyboardInput<S> {
    pub fn new(mapper: InputMapper, sink: S) -> Self {
        Self { mapper, sink }
    }

    /// Process a keyboard event.
    ///
    /// Returns the action the key is bound to, if any. Unbound keys are ignored.
    pub fn process_keyboard(
        &mut self,
        key_code: KeyCode,
        state: ElementState,
    ) -> Option<VehicleAction> {
        let action = self.mapper.action(key_code)?;
        self.sink
            .on_action_changed(action, state == ElementState::Pressed);
        Some(action)
    }
}

// ============================================================================
// Tests
// ============================================================================
