/// Platform-agnostic input handling system
use std::collections::HashMap;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Relative mouse motion in pixels
    MouseMove { dx: f32, dy: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    PointerLockChanged { locked: bool },
}

/// Key map plus pointer-capture flag
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<String, bool>,
    pub pointer_locked: bool,
}

/// Keys are tracked case-insensitively
fn normalize(key: &str) -> String {
    key.to_lowercase()
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(normalize(key), true);
            }
            InputEvent::KeyUp(key) => {
                self.keys.insert(normalize(key), false);
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::VisibilityChanged { visible: _ } => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
            InputEvent::MouseMove { .. } => {}
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys.get(&normalize(key)).copied().unwrap_or(false)
    }

    /// Release every key; entries stay in the map as `false`
    pub fn clear_keys(&mut self) {
        for pressed in self.keys.values_mut() {
            *pressed = false;
        }
    }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub release_pointer: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            release_pointer: "escape".to_string(),
        }
    }
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.forward)
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.backward)
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.left)
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.right)
    }

    pub fn is_movement_key(&self, key: &str) -> bool {
        let b = &self.bindings;
        [&b.forward, &b.backward, &b.left, &b.right]
            .iter()
            .any(|k| key.eq_ignore_ascii_case(k))
    }

    pub fn is_release_pointer(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.release_pointer)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_move_to_input(e: &web_sys::MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str) -> InputEvent {
        InputEvent::KeyDown(key.to_string())
    }

    fn up(key: &str) -> InputEvent {
        InputEvent::KeyUp(key.to_string())
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut input = InputState::new();
        input.process_event(&down("W"));
        assert!(input.is_key_pressed("w"));
        assert!(input.is_key_pressed("W"));

        // Shift released before the letter: key-up arrives lower-case
        input.process_event(&up("w"));
        assert!(!input.is_key_pressed("W"));
    }

    #[test]
    fn unused_keys_are_still_tracked() {
        let mut input = InputState::new();
        input.process_event(&down("q"));
        input.process_event(&down("ArrowUp"));
        assert!(input.is_key_pressed("Q"));
        assert!(input.is_key_pressed("arrowup"));
    }

    #[test]
    fn focus_loss_and_hidden_page_release_keys() {
        let mut input = InputState::new();
        input.process_event(&down("w"));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_key_pressed("w"));

        input.process_event(&down("d"));
        input.process_event(&InputEvent::VisibilityChanged { visible: false });
        assert!(!input.is_key_pressed("d"));
    }

    #[test]
    fn pointer_lock_follows_events() {
        let mut input = InputState::new();
        assert!(!input.pointer_locked);
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        assert!(input.pointer_locked);
        input.process_event(&InputEvent::PointerLockChanged { locked: false });
        assert!(!input.pointer_locked);
    }

    #[test]
    fn processor_maps_wasd() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&down("A"));
        input.process_event(&down("s"));

        assert!(processor.is_moving_left(&input));
        assert!(processor.is_moving_backward(&input));
        assert!(!processor.is_moving_forward(&input));
        assert!(!processor.is_moving_right(&input));
        assert!(processor.is_movement_key("D"));
        assert!(!processor.is_movement_key("e"));
        assert!(processor.is_release_pointer("Escape"));
    }
}
