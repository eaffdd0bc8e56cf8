//! Keyboard shortcuts handled by the shell itself.

use tao::event::ElementState;
use tao::keyboard::{KeyCode, ModifiersState};

/// The modifier that carries app shortcuts: Cmd on macOS, Ctrl elsewhere.
fn primary_modifier(modifiers: ModifiersState) -> bool {
    if cfg!(target_os = "macos") {
        modifiers.super_key()
    } else {
        modifiers.control_key()
    }
}

/// Primary+Shift+D triggers the session notice's "Disconnect" action.
pub fn is_disconnect_shortcut(key: &KeyCode, state: ElementState, modifiers: ModifiersState) -> bool {
    state == ElementState::Pressed
        && key == &KeyCode::KeyD
        && modifiers.shift_key()
        && primary_modifier(modifiers)
        && !modifiers.alt_key()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> ModifiersState {
        if cfg!(target_os = "macos") {
            ModifiersState::SUPER
        } else {
            ModifiersState::CONTROL
        }
    }

    #[test]
    fn test_disconnect_shortcut() {
        let chord = primary() | ModifiersState::SHIFT;
        assert!(is_disconnect_shortcut(&KeyCode::KeyD, ElementState::Pressed, chord));
    }

    #[test]
    fn test_near_misses_are_ignored() {
        let chord = primary() | ModifiersState::SHIFT;
        assert!(!is_disconnect_shortcut(&KeyCode::KeyD, ElementState::Released, chord));
        assert!(!is_disconnect_shortcut(&KeyCode::KeyC, ElementState::Pressed, chord));
        assert!(!is_disconnect_shortcut(&KeyCode::KeyD, ElementState::Pressed, primary()));
        assert!(!is_disconnect_shortcut(
            &KeyCode::KeyD,
            ElementState::Pressed,
            chord | ModifiersState::ALT
        ));
        assert!(!is_disconnect_shortcut(
            &KeyCode::KeyD,
            ElementState::Pressed,
            ModifiersState::SHIFT
        ));
    }
}
