//! Input controllers: the shared capability surface plus the per-frame
//! snapshot consumed by the physics step.
//!
//! Two independent variants implement [`Controller`]: the touch-driven
//! [`joystick::VirtualJoystick`] and the keyboard-driven [`keymove::KeyMove`].
//! Neither inherits state from the other; the only shared piece is the
//! discretization of a movement vector into a coarse 4-way direction.
//!
//! Event handlers mutate controller state synchronously as input arrives;
//! once per frame `snapshot_control_intent` freezes the active controller's
//! output into [`ControlIntent`] so every downstream system sees one value.

pub mod joystick;
pub mod keymove;

use bevy::prelude::*;

use crate::settings::PhysicsSettings;
use crate::state::{GameSet, GameState};

pub use joystick::VirtualJoystick;
pub use keymove::KeyMove;

/// Coarse 4-way direction derived from a movement vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dir4 {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl Dir4 {
    /// Discretizes a vector: the axis with the larger magnitude wins, exact
    /// ties go to the vertical axis, zero maps to `None`.
    pub fn from_vector(v: Vec2) -> Self {
        if v == Vec2::ZERO {
            return Dir4::None;
        }
        if v.x.abs() > v.y.abs() {
            if v.x > 0.0 {
                Dir4::Right
            } else {
                Dir4::Left
            }
        } else if v.y > 0.0 {
            Dir4::Down
        } else {
            Dir4::Up
        }
    }
}

/// Capability shared by both input variants. `vector` is normalized or zero;
/// `direction` and `is_moving` are derived uniformly from it, whatever
/// activation semantics the implementer applies (deadzone, key state).
pub trait Controller {
    fn vector(&self) -> Vec2;

    fn direction(&self) -> Dir4 {
        Dir4::from_vector(self.vector())
    }

    fn is_moving(&self) -> bool {
        self.vector() != Vec2::ZERO
    }
}

/// Per-frame snapshot of the active controller, written once in the Input
/// set and read by movement. `jump` is the raw gesture (flick-up past the
/// trigger threshold, or keyboard up); whether it results in an impulse
/// depends on the landing state checked in the physics step.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ControlIntent {
    pub vector: Vec2,
    pub direction: Dir4,
    pub jump: bool,
}

/// Registers both controller variants, their event feeds, and the snapshot
/// system. The joystick takes precedence while a touch is being tracked;
/// otherwise the keyboard drives the intent.
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlIntent>()
            .add_event::<joystick::JoystickEvent>()
            .add_event::<keymove::KeyMoveEvent>()
            .add_systems(
                Update,
                (
                    joystick::read_touch_input,
                    joystick::ease_handle,
                    keymove::read_keyboard_input,
                    snapshot_control_intent,
                )
                    .chain()
                    .in_set(GameSet::Input),
            )
            .add_systems(OnEnter(GameState::Playing), joystick::spawn_joystick_ui)
            .add_systems(
                Update,
                joystick::sync_joystick_ui.in_set(GameSet::Effects),
            );
    }
}

fn snapshot_control_intent(
    joystick: Res<VirtualJoystick>,
    keymove: Res<KeyMove>,
    physics: Res<PhysicsSettings>,
    mut intent: ResMut<ControlIntent>,
) {
    let active: &dyn Controller = if joystick.is_dragging() {
        &*joystick
    } else {
        &*keymove
    };

    let direction = active.direction();
    let jump = direction == Dir4::Up
        && if joystick.is_dragging() {
            // A flick-up gesture substitutes for a jump button: the raw
            // handle offset has to clear the trigger distance.
            joystick.handle_offset().length() > physics.jump_trigger
        } else {
            true
        };

    *intent = ControlIntent {
        vector: active.vector(),
        direction,
        jump,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_has_no_direction() {
        assert_eq!(Dir4::from_vector(Vec2::ZERO), Dir4::None);
    }

    #[test]
    fn horizontal_dominance() {
        assert_eq!(Dir4::from_vector(Vec2::new(1.0, 0.2)), Dir4::Right);
        assert_eq!(Dir4::from_vector(Vec2::new(-0.5, 0.2)), Dir4::Left);
    }

    #[test]
    fn vertical_otherwise() {
        assert_eq!(Dir4::from_vector(Vec2::new(0.1, 0.9)), Dir4::Down);
        assert_eq!(Dir4::from_vector(Vec2::new(0.0, -1.0)), Dir4::Up);
        // Exact ties go to the vertical axis.
        assert_eq!(Dir4::from_vector(Vec2::new(0.5, 0.5)), Dir4::Down);
    }
}
