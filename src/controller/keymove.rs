//! Keyboard movement controller.
//!
//! Tracks the currently pressed keys and derives a directional vector from
//! four configurable synonym groups. There is no residual state: every query
//! recomputes the vector from scratch out of current key membership, so
//! opposing keys cancel and releasing everything reads as zero immediately.

use std::collections::HashSet;
use std::fmt;

use bevy::input::keyboard::{KeyCode, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::controller::Controller;
use crate::settings::KeySettings;

pub struct KeyMove {
    pressed: HashSet<KeyCode>,
    left: Vec<KeyCode>,
    right: Vec<KeyCode>,
    up: Vec<KeyCode>,
    down: Vec<KeyCode>,
}

impl Resource for KeyMove {}

/// A key name in the settings that does not map to a known key.
#[derive(Debug)]
pub struct UnknownKeyError(pub String);

impl fmt::Display for UnknownKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key name in settings: {:?}", self.0)
    }
}

impl std::error::Error for UnknownKeyError {}

impl KeyMove {
    /// Builds the controller from the configured synonym groups. Unknown
    /// key names are a configuration error caught here, before any input
    /// arrives.
    pub fn new(settings: &KeySettings) -> Result<Self, UnknownKeyError> {
        Ok(Self {
            pressed: HashSet::new(),
            left: parse_group(&settings.left)?,
            right: parse_group(&settings.right)?,
            up: parse_group(&settings.up)?,
            down: parse_group(&settings.down)?,
        })
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn is_pressing(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Sum of the four unit contributions, gated by membership in each
    /// group. Not normalized; a diagonal reads as magnitude √2 here and is
    /// normalized by the shared capability.
    pub fn raw_vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.any_pressed(&self.up) {
            v.y -= 1.0;
        }
        if self.any_pressed(&self.right) {
            v.x += 1.0;
        }
        if self.any_pressed(&self.down) {
            v.y += 1.0;
        }
        if self.any_pressed(&self.left) {
            v.x -= 1.0;
        }
        v
    }

    fn any_pressed(&self, group: &[KeyCode]) -> bool {
        group.iter().any(|key| self.is_pressing(*key))
    }
}

impl Controller for KeyMove {
    fn vector(&self) -> Vec2 {
        self.raw_vector().normalize_or_zero()
    }
}

/// One notification per key event.
#[derive(Event, Debug, Clone, Copy)]
pub struct KeyMoveEvent {
    pub pressed: bool,
    pub vector: Vec2,
}

/// Feeds keyboard events into the pressed set. Key repeats arrive as extra
/// `Pressed` events; the set insert is idempotent so they are harmless.
pub fn read_keyboard_input(
    mut keyboard_events: EventReader<KeyboardInput>,
    mut keymove: ResMut<KeyMove>,
    mut events: EventWriter<KeyMoveEvent>,
) {
    for event in keyboard_events.read() {
        let pressed = event.state == ButtonState::Pressed;
        if pressed {
            keymove.key_down(event.key_code);
        } else {
            keymove.key_up(event.key_code);
        }

        let out = KeyMoveEvent {
            pressed,
            vector: keymove.vector(),
        };
        debug!("keymove {:?}: vector {:?}", event.key_code, out.vector);
        events.send(out);
    }
}

fn parse_group(names: &[String]) -> Result<Vec<KeyCode>, UnknownKeyError> {
    names
        .iter()
        .map(|name| parse_key(name).ok_or_else(|| UnknownKeyError(name.clone())))
        .collect()
}

/// Maps a lower-cased key name from the settings file to a `KeyCode`.
fn parse_key(name: &str) -> Option<KeyCode> {
    use KeyCode::*;

    Some(match name.to_ascii_lowercase().as_str() {
        "a" => KeyA,
        "b" => KeyB,
        "c" => KeyC,
        "d" => KeyD,
        "e" => KeyE,
        "f" => KeyF,
        "g" => KeyG,
        "h" => KeyH,
        "i" => KeyI,
        "j" => KeyJ,
        "k" => KeyK,
        "l" => KeyL,
        "m" => KeyM,
        "n" => KeyN,
        "o" => KeyO,
        "p" => KeyP,
        "q" => KeyQ,
        "r" => KeyR,
        "s" => KeyS,
        "t" => KeyT,
        "u" => KeyU,
        "v" => KeyV,
        "w" => KeyW,
        "x" => KeyX,
        "y" => KeyY,
        "z" => KeyZ,
        "arrowleft" => ArrowLeft,
        "arrowright" => ArrowRight,
        "arrowup" => ArrowUp,
        "arrowdown" => ArrowDown,
        "space" => Space,
        "shift" => ShiftLeft,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Dir4;

    fn keymove() -> KeyMove {
        KeyMove::new(&KeySettings::default()).expect("default bindings parse")
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut km = keymove();
        km.key_down(KeyCode::KeyA);
        km.key_down(KeyCode::KeyD);
        assert_eq!(km.raw_vector().x, 0.0);
        assert_eq!(km.vector(), Vec2::ZERO);
    }

    #[test]
    fn up_only_points_up() {
        let mut km = keymove();
        km.key_down(KeyCode::KeyW);
        let v = km.vector();
        assert!(v.y < 0.0);
        assert_eq!(v.x, 0.0);
        assert_eq!(km.direction(), Dir4::Up);
    }

    #[test]
    fn synonyms_are_equivalent() {
        let mut km = keymove();
        km.key_down(KeyCode::ArrowLeft);
        assert_eq!(km.vector(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn diagonal_is_unit_length() {
        let mut km = keymove();
        km.key_down(KeyCode::KeyD);
        km.key_down(KeyCode::KeyS);
        assert!((km.raw_vector().length() - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!((km.vector().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn press_and_release_is_idempotent() {
        let mut km = keymove();
        km.key_down(KeyCode::KeyD);
        km.key_down(KeyCode::KeyD);
        assert!(km.is_pressing(KeyCode::KeyD));
        km.key_up(KeyCode::KeyD);
        assert!(!km.is_pressing(KeyCode::KeyD));
        assert_eq!(km.vector(), Vec2::ZERO);
        assert!(!km.is_moving());

        // Releasing an unpressed key is a no-op.
        km.key_up(KeyCode::KeyD);
        assert_eq!(km.vector(), Vec2::ZERO);
    }

    #[test]
    fn unknown_binding_fails_fast() {
        let mut settings = KeySettings::default();
        settings.left.push("definitely-not-a-key".into());
        assert!(KeyMove::new(&settings).is_err());
    }
}
