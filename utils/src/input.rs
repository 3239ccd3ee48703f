use glam::{Vec2, vec2};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{Key as LogicalKey, NamedKey};

/// Keyboard presses and edge detected mouse state
///
/// Call [`Inputs::read`] with every window event, then query the state for
/// the transition caused by that event.
#[derive(Debug, Default)]
pub struct Inputs {
    key_press: Option<KeyPress>,
    mouse_last_state: MouseState,
    mouse_state: MouseState,
}

pub trait InputHandler {
    fn handle_inputs(&mut self, event: &WindowEvent);
}

/// A key going down, mapped with the modifiers active at press time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Generated by the platform while the key is held
    pub repeat: bool,
}

/// What the left mouse button did with the last event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Pressed(Vec2),
    Dragged(Vec2),
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, event: &WindowEvent) {
        self.begin_event();

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        logical_key,
                        repeat,
                        ..
                    },
                ..
            } => self.set_key(logical_key, *state, *repeat),
            WindowEvent::MouseInput { state, button, .. } => self.set_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(Some(vec2(position.x as f32, position.y as f32)));
            }
            WindowEvent::CursorLeft { .. } => self.set_cursor(None),
            // Releases are lost while unfocused
            WindowEvent::Focused(false) => self.mouse_state.lmb = false,
            _ => (),
        }
    }

    fn begin_event(&mut self) {
        self.key_press = None;
        self.mouse_last_state = self.mouse_state;
    }

    // Releases carry no information: with shift let go first, `+` comes
    // back up as `=`.
    fn set_key(&mut self, logical_key: &LogicalKey, state: ElementState, repeat: bool) {
        if !state.is_pressed() {
            return;
        }
        self.key_press = Key::from_logical(logical_key).map(|key| KeyPress { key, repeat });
    }

    fn set_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.mouse_state.lmb = state.is_pressed();
        }
    }

    fn set_cursor(&mut self, position: Option<Vec2>) {
        self.mouse_state.position = position;
    }

    /// Key that went down with the last event
    pub fn key_press(&self) -> Option<KeyPress> {
        self.key_press
    }

    pub fn lmb_just_pressed(&self) -> bool {
        !self.mouse_last_state.lmb && self.mouse_state.lmb
    }

    pub fn lmb_held_down(&self) -> bool {
        self.mouse_state.lmb
    }

    pub fn mouse_pos(&self) -> Option<Vec2> {
        self.mouse_state.position
    }

    /// True when the last event moved the cursor
    pub fn mouse_moved(&self) -> bool {
        self.mouse_state.position.is_some()
            && self.mouse_state.position != self.mouse_last_state.position
    }

    /// Press or drag of the left button at the cursor, in window pixels
    pub fn lmb_gesture(&self) -> Option<PointerGesture> {
        let position = self.mouse_pos()?;

        if self.lmb_just_pressed() {
            Some(PointerGesture::Pressed(position))
        } else if self.lmb_held_down() && self.mouse_moved() {
            Some(PointerGesture::Dragged(position))
        } else {
            None
        }
    }
}

/// Keys the sketch reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Escape,
    Plus,
    Minus,
    Less,
    Greater,
    C,
    L,
    M,
    N,
    P,
    T,
    Z,
}

impl Key {
    pub const COUNT: usize = 13;

    pub const ALL: [Key; Self::COUNT] = [
        Key::Space,
        Key::Escape,
        Key::Plus,
        Key::Minus,
        Key::Less,
        Key::Greater,
        Key::C,
        Key::L,
        Key::M,
        Key::N,
        Key::P,
        Key::T,
        Key::Z,
    ];

    pub fn from_logical(logical_key: &LogicalKey) -> Option<Self> {
        match logical_key {
            LogicalKey::Named(NamedKey::Space) => Some(Key::Space),
            LogicalKey::Named(NamedKey::Escape) => Some(Key::Escape),
            LogicalKey::Character(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_char(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            ' ' => Some(Key::Space),
            '+' => Some(Key::Plus),
            '-' => Some(Key::Minus),
            '<' => Some(Key::Less),
            '>' => Some(Key::Greater),
            'c' => Some(Key::C),
            'l' => Some(Key::L),
            'm' => Some(Key::M),
            'n' => Some(Key::N),
            'p' => Some(Key::P),
            't' => Some(Key::T),
            'z' => Some(Key::Z),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MouseState {
    lmb: bool,
    position: Option<Vec2>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_map_to_keys() {
        assert_eq!(Key::from_char('+'), Some(Key::Plus));
        assert_eq!(Key::from_char('>'), Some(Key::Greater));
        assert_eq!(Key::from_char('Z'), Some(Key::Z));
        assert_eq!(Key::from_char('q'), None);
    }

    #[test]
    fn logical_keys_map_to_keys() {
        assert_eq!(
            Key::from_logical(&LogicalKey::Named(NamedKey::Space)),
            Some(Key::Space)
        );
        assert_eq!(
            Key::from_logical(&LogicalKey::Character("<".into())),
            Some(Key::Less)
        );
        assert_eq!(Key::from_logical(&LogicalKey::Character("ab".into())), None);
    }

    fn press(inputs: &mut Inputs, text: &str) {
        inputs.begin_event();
        inputs.set_key(&LogicalKey::Character(text.into()), ElementState::Pressed, false);
    }

    fn release(inputs: &mut Inputs, text: &str) {
        inputs.begin_event();
        inputs.set_key(&LogicalKey::Character(text.into()), ElementState::Released, false);
    }

    fn key(inputs: &Inputs) -> Option<Key> {
        inputs.key_press().map(|press| press.key)
    }

    #[test]
    fn shifted_key_released_unshifted_presses_again() {
        let mut inputs = Inputs::new();

        press(&mut inputs, "+");
        assert_eq!(key(&inputs), Some(Key::Plus));

        // Shift let go before the key itself
        release(&mut inputs, "=");
        assert_eq!(key(&inputs), None);

        press(&mut inputs, "+");
        assert_eq!(key(&inputs), Some(Key::Plus));
    }

    #[test]
    fn press_is_reported_for_one_event_only() {
        let mut inputs = Inputs::new();

        press(&mut inputs, ">");
        assert_eq!(key(&inputs), Some(Key::Greater));

        inputs.begin_event();
        inputs.set_cursor(Some(vec2(1., 1.)));
        assert_eq!(key(&inputs), None);

        release(&mut inputs, ">");
        assert_eq!(key(&inputs), None);
        press(&mut inputs, "q");
        assert_eq!(key(&inputs), None);
    }

    #[test]
    fn repeats_are_flagged() {
        let mut inputs = Inputs::new();

        inputs.begin_event();
        inputs.set_key(&LogicalKey::Character("-".into()), ElementState::Pressed, true);
        assert_eq!(
            inputs.key_press(),
            Some(KeyPress {
                key: Key::Minus,
                repeat: true
            })
        );
    }

    #[test]
    fn lmb_press_then_drag() {
        let mut inputs = Inputs::new();

        // Button without a known cursor position
        inputs.begin_event();
        inputs.set_button(MouseButton::Left, ElementState::Pressed);
        assert!(inputs.lmb_just_pressed());
        assert_eq!(inputs.lmb_gesture(), None);

        inputs.begin_event();
        inputs.set_button(MouseButton::Left, ElementState::Released);
        inputs.begin_event();
        inputs.set_cursor(Some(vec2(10., 20.)));
        assert!(inputs.mouse_moved());
        assert_eq!(inputs.lmb_gesture(), None);

        inputs.begin_event();
        inputs.set_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(
            inputs.lmb_gesture(),
            Some(PointerGesture::Pressed(vec2(10., 20.)))
        );

        // Held still
        inputs.begin_event();
        inputs.set_cursor(Some(vec2(10., 20.)));
        assert!(!inputs.mouse_moved());
        assert_eq!(inputs.lmb_gesture(), None);

        inputs.begin_event();
        inputs.set_cursor(Some(vec2(12., 25.)));
        assert_eq!(
            inputs.lmb_gesture(),
            Some(PointerGesture::Dragged(vec2(12., 25.)))
        );

        inputs.begin_event();
        inputs.set_button(MouseButton::Left, ElementState::Released);
        inputs.begin_event();
        inputs.set_cursor(Some(vec2(30., 30.)));
        assert_eq!(inputs.lmb_gesture(), None);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut inputs = Inputs::new();
        inputs.begin_event();
        inputs.set_cursor(Some(vec2(1., 1.)));
        inputs.begin_event();
        inputs.set_button(MouseButton::Right, ElementState::Pressed);
        assert!(!inputs.lmb_held_down());
        assert_eq!(inputs.lmb_gesture(), None);
    }

    #[test]
    fn cursor_leaving_stops_drags() {
        let mut inputs = Inputs::new();
        inputs.begin_event();
        inputs.set_cursor(Some(vec2(1., 1.)));
        inputs.begin_event();
        inputs.set_button(MouseButton::Left, ElementState::Pressed);

        inputs.begin_event();
        inputs.set_cursor(None);
        assert!(!inputs.mouse_moved());
        assert_eq!(inputs.lmb_gesture(), None);
    }
}
