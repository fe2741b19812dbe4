//! Global game state and schedule structure.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine: load textures, run the simulation, or freeze it.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

/// Named system sets for the Update schedule. Input is sampled first, then
/// the kinematics step, then everything that reacts to the new positions
/// (camera, sprites, banner, audio).
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Movement,
    Effects,
}

/// Toggles between Playing and Paused on `ESC`. Loading cannot be paused.
pub fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Loading => {}
    }
}

/// Logs every state transition at debug level.
pub fn log_state_changes(mut transitions: EventReader<StateTransitionEvent<GameState>>) {
    for transition in transitions.read() {
        debug!(
            "state transition: {:?} -> {:?}",
            transition.exited, transition.entered
        );
    }
}
