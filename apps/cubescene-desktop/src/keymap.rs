use cubescene_input::{Action, RotationAxis};
use winit::keyboard::KeyCode;

const fn rotate(axis: RotationAxis, positive: bool) -> Action {
    Action::Rotate { axis, positive }
}

/// Fixed key bindings.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::KeyW => Action::MoveForward,
        KeyCode::KeyS => Action::MoveBackward,
        KeyCode::KeyA => Action::StrafeLeft,
        KeyCode::KeyD => Action::StrafeRight,
        KeyCode::Space => Action::Up,
        KeyCode::ShiftLeft => Action::Down,
        KeyCode::KeyI => rotate(RotationAxis::X, true),
        KeyCode::KeyK => rotate(RotationAxis::X, false),
        KeyCode::KeyJ => rotate(RotationAxis::Y, true),
        KeyCode::KeyL => rotate(RotationAxis::Y, false),
        KeyCode::KeyU => rotate(RotationAxis::Z, true),
        KeyCode::KeyO => rotate(RotationAxis::Z, false),
        KeyCode::F1 => Action::ToggleOverlay,
        KeyCode::Escape => Action::Quit,
        _ => return None,
    };
    Some(action)
}
