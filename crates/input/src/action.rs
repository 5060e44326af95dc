use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Axis the scene objects can be rotated about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    pub const ALL: [RotationAxis; 3] = [RotationAxis::X, RotationAxis::Y, RotationAxis::Z];
}

/// A high-level action produced by a bound key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    /// Fly upward, or jump when walking.
    Up,
    /// Fly downward. Ignored when walking.
    Down,
    /// Spin every scene object about an axis; `positive` picks the direction.
    Rotate { axis: RotationAxis, positive: bool },
    ToggleOverlay,
    Quit,
}

/// Movement requested for one frame, each component in `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveIntent {
    /// +1 along the view direction, -1 against it.
    pub forward: f32,
    /// +1 to the right, -1 to the left.
    pub strafe: f32,
    /// +1 up, -1 down.
    pub vertical: f32,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.vertical == 0.0
    }
}

/// Set of actions whose keys are currently held.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    held: BTreeSet<Action>,
}

impl ActionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    /// Record a key transition. Returns true for a fresh press.
    pub fn set(&mut self, action: Action, pressed: bool) -> bool {
        if pressed {
            self.held.insert(action)
        } else {
            self.held.remove(&action);
            false
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Drop every held action, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    fn axis(&self, positive: Action, negative: Action) -> f32 {
        match (self.is_held(positive), self.is_held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    pub fn move_intent(&self) -> MoveIntent {
        MoveIntent {
            forward: self.axis(Action::MoveForward, Action::MoveBackward),
            strafe: self.axis(Action::StrafeRight, Action::StrafeLeft),
            vertical: self.axis(Action::Up, Action::Down),
        }
    }

    /// Rotation input about `axis` in `{-1, 0, 1}`.
    pub fn rotation(&self, axis: RotationAxis) -> f32 {
        self.axis(
            Action::Rotate {
                axis,
                positive: true,
            },
            Action::Rotate {
                axis,
                positive: false,
            },
        )
    }

    /// Rotation input for all three axes, ordered X, Y, Z.
    pub fn rotation_input(&self) -> [f32; 3] {
        RotationAxis::ALL.map(|axis| self.rotation(axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_has_no_intent() {
        let state = ActionState::new();
        assert!(state.move_intent().is_idle());
        assert_eq!(state.rotation_input(), [0.0; 3]);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut state = ActionState::new();
        state.press(Action::MoveForward);
        state.press(Action::MoveBackward);
        state.press(Action::StrafeLeft);
        let intent = state.move_intent();
        assert_eq!(intent.forward, 0.0);
        assert_eq!(intent.strafe, -1.0);
    }

    #[test]
    fn set_reports_fresh_presses_only() {
        let mut state = ActionState::new();
        assert!(state.set(Action::Up, true));
        assert!(!state.set(Action::Up, true));
        assert_eq!(state.move_intent().vertical, 1.0);
        assert!(!state.set(Action::Up, false));
        assert!(!state.is_held(Action::Up));
    }

    #[test]
    fn rotation_pairs_are_independent() {
        let mut state = ActionState::new();
        state.press(Action::Rotate {
            axis: RotationAxis::Y,
            positive: true,
        });
        state.press(Action::Rotate {
            axis: RotationAxis::Z,
            positive: false,
        });
        assert_eq!(state.rotation_input(), [0.0, 1.0, -1.0]);
        state.clear();
        assert_eq!(state.rotation_input(), [0.0; 3]);
    }
}
