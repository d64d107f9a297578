//! Input sources and the action event queue
//!
//! Devices report action changes through [`InputSource`]. The
//! [`ActionQueue`] implementation buffers them until the controller drains
//! the queue at the start of its tick, so producers may live on another
//! thread than the simulation loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ActionState, VehicleAction};

/// A change in the held status of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub action: VehicleAction,
    pub held: bool,
}

impl ActionEvent {
    pub fn down(action: VehicleAction) -> Self {
        Self { action, held: true }
    }

    pub fn up(action: VehicleAction) -> Self {
        Self {
            action,
            held: false,
        }
    }
}

/// Receiver of device input, already translated to actions.
pub trait InputSource {
    /// An action became held
    fn on_down(&mut self, action: VehicleAction);

    /// An action was released
    fn on_up(&mut self, action: VehicleAction);

    /// Route a held/not-held change
    fn on_action_changed(&mut self, action: VehicleAction, held: bool) {
        if held {
            self.on_down(action);
        } else {
            self.on_up(action);
        }
    }
}

impl InputSource for ActionState {
    fn on_down(&mut self, action: VehicleAction) {
        self.press(action);
    }

    fn on_up(&mut self, action: VehicleAction) {
        self.release(action);
    }
}

/// Shared FIFO of [`ActionEvent`]s.
///
/// Clones share the same buffer. Events are applied in arrival order, so
/// the last write for an action wins.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    events: Arc<Mutex<VecDeque<ActionEvent>>>,
}

impl ActionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is recovered; the buffer only holds plain events
    fn lock(&self) -> MutexGuard<'_, VecDeque<ActionEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event
    pub fn push(&self, event: ActionEvent) {
        self.lock().push_back(event);
    }

    /// Apply every queued event to `state`, oldest first.
    ///
    /// Returns the number of events applied.
    pub fn drain_into(&self, state: &mut ActionState) -> usize {
        let mut events = self.lock();
        let count = events.len();
        for event in events.drain(..) {
            state.set(event.action, event.held);
        }
        count
    }

    /// Number of events waiting
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no events are waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard all waiting events
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl InputSource for ActionQueue {
    fn on_down(&mut self, action: VehicleAction) {
        self.push(ActionEvent::down(action));
    }

    fn on_up(&mut self, action: VehicleAction) {
        self.push(ActionEvent::up(action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = ActionQueue::new();
        let mut state = ActionState::new();

        queue.on_down(VehicleAction::Accelerate);
        queue.on_up(VehicleAction::Accelerate);
        queue.on_down(VehicleAction::Brake);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain_into(&mut state), 3);
        assert!(queue.is_empty());
        assert!(!state.is_held(VehicleAction::Accelerate));
        assert!(state.is_held(VehicleAction::Brake));
    }

    #[test]
    fn test_clones_share_buffer() {
        let producer = ActionQueue::new();
        let consumer = producer.clone();

        producer.push(ActionEvent::down(VehicleAction::Fire));
        assert_eq!(consumer.len(), 1);

        consumer.clear();
        assert!(producer.is_empty());
    }

    #[test]
    fn test_push_from_other_thread() {
        let queue = ActionQueue::new();
        let mut remote = queue.clone();

        std::thread::spawn(move || {
            remote.on_action_changed(VehicleAction::SteerLeft, true);
        })
        .join()
        .unwrap();

        let mut state = ActionState::new();
        queue.drain_into(&mut state);
        assert!(state.is_held(VehicleAction::SteerLeft));
    }

    #[test]
    fn test_action_state_as_source() {
        let mut state = ActionState::new();
        state.on_action_changed(VehicleAction::NudgeLeft, true);
        assert!(state.take_press(VehicleAction::NudgeLeft));
        state.on_action_changed(VehicleAction::NudgeLeft, false);
        assert!(!state.is_held(VehicleAction::NudgeLeft));
    }
}
