use splinepond::sketch::InputEvent;
use utils::input::{Key, KeyPress};

/// What a key press asks of the application
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Sketch(InputEvent),
    Exit,
}

/// Action for a key press, `None` for auto-repeats of keys that don't step
pub fn on_press(press: KeyPress) -> Option<Action> {
    if press.repeat && !steps(press.key) {
        return None;
    }
    Some(action(press.key))
}

/// Keys that nudge a value and keep nudging while held
fn steps(key: Key) -> bool {
    matches!(key, Key::Plus | Key::Minus | Key::Greater | Key::Less)
}

/// Key bindings
pub fn action(key: Key) -> Action {
    let event = match key {
        Key::Escape => return Action::Exit,
        Key::Plus => InputEvent::IncreaseSegments,
        Key::Minus => InputEvent::DecreaseSegments,
        Key::C => InputEvent::Clear,
        Key::Greater => InputEvent::SpeedUp,
        Key::Less => InputEvent::SpeedDown,
        Key::Space => InputEvent::TogglePause,
        Key::P => InputEvent::ToggleSamples,
        Key::L => InputEvent::ToggleSegments,
        Key::Z => InputEvent::ToggleCollect,
        Key::M => InputEvent::SelectBezier,
        Key::N => InputEvent::SelectCatmullRom,
        Key::T => InputEvent::ToggleSizeOscillation,
    };

    Action::Sketch(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_bound_once() {
        let events: Vec<InputEvent> = Key::ALL
            .iter()
            .filter_map(|key| match action(*key) {
                Action::Sketch(event) => Some(event),
                Action::Exit => None,
            })
            .collect();

        assert_eq!(events.len(), Key::COUNT - 1);
        for (i, event) in events.iter().enumerate() {
            assert!(!events[i + 1..].contains(event), "{event:?} bound twice");
        }
    }

    #[test]
    fn bindings_follow_key_table() {
        assert_eq!(action(Key::Escape), Action::Exit);
        assert_eq!(
            action(Key::from_char('z').unwrap()),
            Action::Sketch(InputEvent::ToggleCollect)
        );
        assert_eq!(
            action(Key::from_char('>').unwrap()),
            Action::Sketch(InputEvent::SpeedUp)
        );
        assert_eq!(
            action(Key::from_char(' ').unwrap()),
            Action::Sketch(InputEvent::TogglePause)
        );
        assert_eq!(
            action(Key::from_char('n').unwrap()),
            Action::Sketch(InputEvent::SelectCatmullRom)
        );
    }

    #[test]
    fn held_step_keys_repeat() {
        for key in [Key::Plus, Key::Minus, Key::Greater, Key::Less] {
            let press = KeyPress { key, repeat: true };
            assert_eq!(on_press(press), Some(action(key)));
        }
    }

    #[test]
    fn held_toggles_fire_once() {
        for key in [Key::Space, Key::Z, Key::P, Key::C, Key::Escape] {
            assert_eq!(on_press(KeyPress { key, repeat: true }), None);
            assert_eq!(
                on_press(KeyPress { key, repeat: false }),
                Some(action(key))
            );
        }
    }
}
