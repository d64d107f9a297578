//! Vehicle actions and their per-tick state

/// Logical actions a vehicle responds to.
///
/// These represent what the driver wants, independent of the device that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleAction {
    // -------------------------------------------------------------------------
    // Driving (held)
    // -------------------------------------------------------------------------
    /// Drive forward, or brake while rolling backward
    Accelerate,
    /// Brake, or reverse once nearly stopped
    Brake,
    SteerLeft,
    SteerRight,

    // -------------------------------------------------------------------------
    // Maneuvers (one-shot)
    // -------------------------------------------------------------------------
    NudgeUp,
    NudgeDown,
    NudgeLeft,
    NudgeRight,

    // -------------------------------------------------------------------------
    // Weapons (one-shot)
    // -------------------------------------------------------------------------
    /// Launch a projectile
    Fire,
    /// Lay a trail behind the vehicle
    LayTrail,
}

impl VehicleAction {
    /// Number of actions.
    pub const COUNT: usize = 10;

    /// Every action, in declaration order.
    pub const ALL: [VehicleAction; Self::COUNT] = [
        Self::Accelerate,
        Self::Brake,
        Self::SteerLeft,
        Self::SteerRight,
        Self::NudgeUp,
        Self::NudgeDown,
        Self::NudgeLeft,
        Self::NudgeRight,
        Self::Fire,
        Self::LayTrail,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// Whether the action fires once per press rather than acting while held.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(
            self,
            Self::NudgeUp
                | Self::NudgeDown
                | Self::NudgeLeft
                | Self::NudgeRight
                | Self::Fire
                | Self::LayTrail
        )
    }
}

/// Held and just-pressed status of every [`VehicleAction`].
///
/// A press only counts as an edge when the action was not already held, so
/// key auto-repeat does not refire one-shot actions. Edges that nobody takes
/// during a tick are dropped by [`ActionState::end_tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionState {
    held: [bool; VehicleAction::COUNT],
    pressed: [bool; VehicleAction::COUNT],
}

impl ActionState {
    /// Create a state with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press
    pub fn press(&mut self, action: VehicleAction) {
        let i = action.index();
        if !self.held[i] {
            self.pressed[i] = true;
        }
        self.held[i] = true;
    }

    /// Record a release.
    ///
    /// A press edge from the same tick survives, so a tap shorter than a
    /// tick still fires.
    pub fn release(&mut self, action: VehicleAction) {
        self.held[action.index()] = false;
    }

    /// Apply a held/not-held change
    pub fn set(&mut self, action: VehicleAction, held: bool) {
        if held {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    /// Check if an action is currently held
    #[must_use]
    pub fn is_held(&self, action: VehicleAction) -> bool {
        self.held[action.index()]
    }

    /// Check if an action was pressed this tick, without consuming it
    #[must_use]
    pub fn was_pressed(&self, action: VehicleAction) -> bool {
        self.pressed[action.index()]
    }

    /// Consume the press edge of an action.
    ///
    /// Returns `true` at most once per press.
    pub fn take_press(&mut self, action: VehicleAction) -> bool {
        std::mem::take(&mut self.pressed[action.index()])
    }

    /// Drop unconsumed press edges. Call once at the end of each tick.
    pub fn end_tick(&mut self) {
        self.pressed = [false; VehicleAction::COUNT];
    }

    /// Release everything
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Iterate over the actions currently held
    pub fn held_actions(&self) -> impl Iterator<Item = VehicleAction> + '_ {
        VehicleAction::ALL
            .into_iter()
            .filter(|a| self.held[a.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_index() {
        for (i, action) in VehicleAction::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }

    #[test]
    fn test_one_shot_classification() {
        assert!(!VehicleAction::Accelerate.is_one_shot());
        assert!(!VehicleAction::SteerLeft.is_one_shot());
        assert!(VehicleAction::NudgeUp.is_one_shot());
        assert!(VehicleAction::Fire.is_one_shot());
        assert!(VehicleAction::LayTrail.is_one_shot());
    }

    #[test]
    fn test_press_creates_single_edge() {
        let mut state = ActionState::new();

        state.press(VehicleAction::Fire);
        assert!(state.is_held(VehicleAction::Fire));
        assert!(state.take_press(VehicleAction::Fire));
        assert!(!state.take_press(VehicleAction::Fire));
    }

    #[test]
    fn test_repeat_press_while_held_is_not_an_edge() {
        let mut state = ActionState::new();

        state.press(VehicleAction::NudgeUp);
        assert!(state.take_press(VehicleAction::NudgeUp));
        state.end_tick();

        // Auto-repeat
        state.press(VehicleAction::NudgeUp);
        assert!(!state.take_press(VehicleAction::NudgeUp));

        // New press after release
        state.release(VehicleAction::NudgeUp);
        state.press(VehicleAction::NudgeUp);
        assert!(state.take_press(VehicleAction::NudgeUp));
    }

    #[test]
    fn test_tap_within_tick_keeps_edge() {
        let mut state = ActionState::new();

        state.press(VehicleAction::LayTrail);
        state.release(VehicleAction::LayTrail);

        assert!(!state.is_held(VehicleAction::LayTrail));
        assert!(state.take_press(VehicleAction::LayTrail));
    }

    #[test]
    fn test_end_tick_drops_unconsumed_edges() {
        let mut state = ActionState::new();

        state.press(VehicleAction::Accelerate);
        state.end_tick();

        assert!(state.is_held(VehicleAction::Accelerate));
        assert!(!state.was_pressed(VehicleAction::Accelerate));
    }

    #[test]
    fn test_held_actions() {
        let mut state = ActionState::new();
        state.set(VehicleAction::Brake, true);
        state.set(VehicleAction::SteerRight, true);
        state.set(VehicleAction::SteerRight, false);

        let held: Vec<_> = state.held_actions().collect();
        assert_eq!(held, vec![VehicleAction::Brake]);

        state.clear();
        assert_eq!(state.held_actions().count(), 0);
    }
}
