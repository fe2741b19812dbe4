//! High-level plugin composition.
//!
//! `GrasslandPlatformerPlugin` glues together all domain-specific plugins
//! (stages, player, controllers, movement, etc.) and sets up system ordering.
//! Each subsystem is responsible for its own state; this orchestrator merely
//! registers them with the Bevy application.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::camera::{CameraPlugin, FollowCamera};
use crate::controller::ControllerPlugin;
use crate::level::LevelPlugin;
use crate::loading::LoadingPlugin;
use crate::movement::MovementPlugin;
use crate::player::PlayerPlugin;
use crate::state::{log_state_changes, toggle_pause, GameSet, GameState};
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;

/// Bundles every gameplay plugin into a single unit added to the Bevy `App`.
pub struct GrasslandPlatformerPlugin;

impl Plugin for GrasslandPlatformerPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                LoadingPlugin,    // Texture queue + progress reporting.
                LevelPlugin,      // Stage geometry generation and sprites.
                PlayerPlugin,     // Avatar spawn, sprite sync, walk cycle.
                GameAudioPlugin,  // Audio handle preloading + jump cue.
                CameraPlugin,     // Clamped camera follow.
                ControllerPlugin, // Joystick + keyboard input abstraction.
                MovementPlugin,   // Per-frame kinematics and collision.
                TransitionPlugin, // Stage banner fade.
                UiPlugin,         // Loading screen and pause overlay.
            ))
            // Input is sampled, then the kinematics step runs, then effects
            // (camera, sprites, banner) react to the new positions. The whole
            // chain is gated on the Playing state so pausing freezes the
            // simulation mid-frame with no component writes.
            .configure_sets(
                Update,
                (GameSet::Input, GameSet::Movement, GameSet::Effects)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (toggle_pause, log_state_changes));
    }
}

/// Spawns the 2D camera tagged with `FollowCamera` so the follow system can
/// locate it.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2dBundle::default(),
        FollowCamera,
    ));
}
