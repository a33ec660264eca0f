//! Keyboard input mapping
//!
//! Browser key events are mapped to actions through `KeyBindings`. Held
//! keys drive movement; one-shot actions are latched until the next
//! simulation tick consumes them, so a tap shorter than a frame is never
//! lost.

use std::collections::HashMap;

use crate::sim::TickInput;

/// Something a key can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    ToggleRhythm,
    Pause,
    Skip,
}

impl Action {
    /// Fires once per press rather than while held
    pub fn is_one_shot(self) -> bool {
        !matches!(self, Action::MoveLeft | Action::MoveRight)
    }
}

/// Map from `KeyboardEvent.key` values to actions
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<String, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self { map: HashMap::new() };
        for key in ["ArrowLeft", "a", "A"] {
            bindings.bind(key, Action::MoveLeft);
        }
        for key in ["ArrowRight", "d", "D"] {
            bindings.bind(key, Action::MoveRight);
        }
        for key in [" ", "w", "W", "ArrowUp"] {
            bindings.bind(key, Action::Jump);
        }
        for key in ["j", "J", "k", "K"] {
            bindings.bind(key, Action::Attack);
        }
        for key in ["r", "R"] {
            bindings.bind(key, Action::ToggleRhythm);
        }
        bindings.bind("Escape", Action::Pause);
        bindings.bind("Enter", Action::Skip);
        bindings
    }
}

impl KeyBindings {
    pub fn bind(&mut self, key: &str, action: Action) {
        self.map.insert(key.to_string(), action);
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.map.get(key).copied()
    }
}

/// Live keyboard state between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    pending: TickInput,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keydown; returns true if the key is bound
    pub fn key_down(&mut self, bindings: &KeyBindings, key: &str, repeat: bool) -> bool {
        let Some(action) = bindings.action_for(key) else {
            return false;
        };
        if repeat && action.is_one_shot() {
            return true;
        }
        match action {
            Action::MoveLeft => self.left = true,
            Action::MoveRight => self.right = true,
            Action::Jump => self.pending.jump = true,
            Action::Attack => self.pending.attack = true,
            Action::ToggleRhythm => self.pending.toggle_rhythm = true,
            Action::Pause => self.pending.pause = true,
            Action::Skip => self.pending.skip = true,
        }
        true
    }

    /// Handle a keyup; returns true if the key is bound
    pub fn key_up(&mut self, bindings: &KeyBindings, key: &str) -> bool {
        match bindings.action_for(key) {
            Some(Action::MoveLeft) => self.left = false,
            Some(Action::MoveRight) => self.right = false,
            Some(_) => {}
            None => return false,
        }
        true
    }

    /// Request a pause from outside the keyboard (blur, hidden tab)
    pub fn request_pause(&mut self) {
        self.pending.pause = true;
    }

    /// Drop everything (focus lost, new run)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Input for the next tick; clears one-shot latches
    pub fn take_tick_input(&mut self) -> TickInput {
        let move_x = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let mut input = std::mem::take(&mut self.pending);
        input.move_x = move_x;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for("ArrowLeft"), Some(Action::MoveLeft));
        assert_eq!(bindings.action_for("d"), Some(Action::MoveRight));
        assert_eq!(bindings.action_for(" "), Some(Action::Jump));
        assert_eq!(bindings.action_for("ArrowUp"), Some(Action::Jump));
        assert_eq!(bindings.action_for("K"), Some(Action::Attack));
        assert_eq!(bindings.action_for("r"), Some(Action::ToggleRhythm));
        assert_eq!(bindings.action_for("Escape"), Some(Action::Pause));
        assert_eq!(bindings.action_for("Enter"), Some(Action::Skip));
        assert_eq!(bindings.action_for("q"), None);
    }

    #[test]
    fn test_one_shots_latch_until_taken() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.key_down(&bindings, "j", false);
        input.key_up(&bindings, "j");

        let tick = input.take_tick_input();
        assert!(tick.attack, "tap released before the tick still counts");
        assert!(!input.take_tick_input().attack, "consumed once");
    }

    #[test]
    fn test_held_movement_persists() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.key_down(&bindings, "ArrowRight", false);
        assert_eq!(input.take_tick_input().move_x, 1.0);
        assert_eq!(input.take_tick_input().move_x, 1.0);

        input.key_down(&bindings, "a", false);
        assert_eq!(input.take_tick_input().move_x, 0.0, "opposing keys cancel");

        input.key_up(&bindings, "ArrowRight");
        assert_eq!(input.take_tick_input().move_x, -1.0);
    }

    #[test]
    fn test_key_repeat_does_not_retrigger() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.key_down(&bindings, "r", false);
        assert!(input.take_tick_input().toggle_rhythm);
        assert!(input.key_down(&bindings, "r", true));
        assert!(!input.take_tick_input().toggle_rhythm);
    }

    #[test]
    fn test_release_all_clears_latches() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.key_down(&bindings, "ArrowLeft", false);
        input.request_pause();
        input.release_all();
        assert_eq!(input.take_tick_input(), TickInput::default());
    }
}
