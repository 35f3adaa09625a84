/// Platform-agnostic input handling system
use glam::Vec2;

/// Keys the game listens to. Everything else arrives as `Other` and is
/// reported as unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    R,
    Other,
}

/// Platform-independent input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseButton { button: MouseButton, pressed: bool },
    /// Raw relative motion in pixels.
    MouseMotion { dx: f32, dy: f32 },
    /// Positive scrolls away from the user.
    MouseWheel { delta_y: f32 },
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Interact,
}

impl Action {
    pub const ALL: [Action; 5] = [Action::Left, Action::Right, Action::Up, Action::Down, Action::Interact];

    const fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
            Action::Up => 2,
            Action::Down => 3,
            Action::Interact => 4,
        }
    }
}

/// Level plus edge count for one logical button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    pub downs: u8,
    pub pressed: bool,
}

/// Per-frame button state and the look toggle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    buttons: [Button; 5],
    /// Physical keys currently down and the action each one drives.
    held: Vec<(Key, Action)>,
    /// Right mouse held: pointer captured, motion steers the camera.
    pub looking: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only an up-to-down transition of the action counts as a down. Key
    /// auto-repeat and a second key for an action already held change nothing.
    pub fn press(&mut self, action: Action, key: Key) {
        if self.held.iter().any(|(k, _)| *k == key) {
            return;
        }
        self.held.push((key, action));
        let button = &mut self.buttons[action.index()];
        if !button.pressed {
            button.downs = button.downs.saturating_add(1);
            button.pressed = true;
        }
    }

    /// The action stays pressed while any other key bound to it is down.
    pub fn release(&mut self, action: Action, key: Key) {
        self.held.retain(|(k, _)| *k != key);
        self.buttons[action.index()].pressed = self.held.iter().any(|(_, a)| *a == action);
    }

    pub fn button(&self, action: Action) -> Button {
        self.buttons[action.index()]
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        self.button(action).pressed
    }

    pub fn downs(&self, action: Action) -> u8 {
        self.button(action).downs
    }

    /// Movement intent as (right, forward), each in {-1, 0, 1}. Opposing keys
    /// cancel.
    pub fn move_axes(&self) -> Vec2 {
        let axis = |neg: Action, pos: Action| match (self.is_pressed(neg), self.is_pressed(pos)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Vec2::new(axis(Action::Left, Action::Right), axis(Action::Down, Action::Up))
    }

    /// Edges are one-shot: consumed at the end of every update.
    pub fn clear_downs(&mut self) {
        for button in &mut self.buttons {
            button.downs = 0;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What a key does once looked up in [`KeyBindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Action(Action),
    ReleasePointer,
    Restart,
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub up: Vec<Key>,
    pub down: Vec<Key>,
    pub interact: Vec<Key>,
    pub release_pointer: Vec<Key>,
    pub restart: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec![Key::A, Key::ArrowLeft],
            right: vec![Key::D, Key::ArrowRight],
            up: vec![Key::W, Key::ArrowUp],
            down: vec![Key::S, Key::ArrowDown],
            interact: vec![Key::Space],
            release_pointer: vec![Key::Escape],
            restart: vec![Key::R],
        }
    }
}

impl KeyBindings {
    pub fn lookup(&self, key: Key) -> Option<Binding> {
        let table = [
            (&self.left, Binding::Action(Action::Left)),
            (&self.right, Binding::Action(Action::Right)),
            (&self.up, Binding::Action(Action::Up)),
            (&self.down, Binding::Action(Action::Down)),
            (&self.interact, Binding::Action(Action::Interact)),
            (&self.release_pointer, Binding::ReleasePointer),
            (&self.restart, Binding::Restart),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keys.contains(&key))
            .map(|(_, binding)| binding)
    }
}

/// winit adapters
pub mod native {
    use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
    use winit::keyboard::{KeyCode, PhysicalKey};

    use super::*;

    /// Lines per pixel when a touchpad reports pixel deltas.
    const PIXELS_PER_LINE: f32 = 40.0;

    pub fn key_from_code(code: KeyCode) -> Key {
        match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,
            KeyCode::Space => Key::Space,
            KeyCode::Escape => Key::Escape,
            KeyCode::KeyR => Key::R,
            _ => Key::Other,
        }
    }

    pub fn from_window_event(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let key = match event.physical_key {
                    PhysicalKey::Code(code) => key_from_code(code),
                    PhysicalKey::Unidentified(_) => Key::Other,
                };
                Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return None,
                };
                Some(InputEvent::MouseButton {
                    button,
                    pressed: *state == ElementState::Pressed,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                (delta_y != 0.0).then_some(InputEvent::MouseWheel { delta_y })
            }
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }

    /// Relative motion comes from the device stream so it keeps flowing
    /// while the cursor is grabbed.
    pub fn from_device_event(event: &DeviceEvent) -> Option<InputEvent> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::MouseMotion {
                dx: *dx as f32,
                dy: *dy as f32,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_does_not_count_as_down() {
        let mut input = InputState::new();
        input.press(Action::Interact, Key::Space);
        input.press(Action::Interact, Key::Space);
        assert_eq!(input.downs(Action::Interact), 1);

        input.release(Action::Interact, Key::Space);
        input.press(Action::Interact, Key::Space);
        assert_eq!(input.downs(Action::Interact), 2);
        assert!(input.is_pressed(Action::Interact));
    }

    #[test]
    fn test_action_held_while_any_bound_key_is_down() {
        let mut input = InputState::new();
        input.press(Action::Up, Key::W);
        input.press(Action::Up, Key::ArrowUp);
        assert_eq!(input.downs(Action::Up), 1, "second key is not a new transition");

        input.release(Action::Up, Key::ArrowUp);
        assert!(input.is_pressed(Action::Up), "W is still down");

        // W auto-repeats after the arrow key went up.
        input.press(Action::Up, Key::W);
        assert_eq!(input.downs(Action::Up), 1);

        input.release(Action::Up, Key::W);
        assert!(!input.is_pressed(Action::Up));
    }

    #[test]
    fn test_clear_downs_keeps_levels() {
        let mut input = InputState::new();
        input.press(Action::Up, Key::W);
        input.clear_downs();
        assert_eq!(input.downs(Action::Up), 0);
        assert!(input.is_pressed(Action::Up));
    }

    #[test]
    fn test_move_axes_cancel_opposites() {
        let mut input = InputState::new();
        input.press(Action::Left, Key::A);
        input.press(Action::Up, Key::W);
        assert_eq!(input.move_axes(), Vec2::new(-1.0, 1.0));

        input.press(Action::Right, Key::D);
        assert_eq!(input.move_axes(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.lookup(Key::ArrowLeft), Some(Binding::Action(Action::Left)));
        assert_eq!(bindings.lookup(Key::Space), Some(Binding::Action(Action::Interact)));
        assert_eq!(bindings.lookup(Key::Escape), Some(Binding::ReleasePointer));
        assert_eq!(bindings.lookup(Key::R), Some(Binding::Restart));
        assert_eq!(bindings.lookup(Key::Other), None);
    }

    #[test]
    fn test_native_key_mapping() {
        use winit::keyboard::KeyCode;
        assert_eq!(native::key_from_code(KeyCode::KeyW), Key::W);
        assert_eq!(native::key_from_code(KeyCode::F5), Key::Other);
    }
}
