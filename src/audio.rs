//! Audio handle bookkeeping. Stashes `Handle<AudioSource>` references so the
//! decoded clips stay resident, and plays the jump cue when the avatar leaves
//! the ground.

use bevy::prelude::*;

use crate::movement::{MovementState, Velocity};
use crate::player::Player;
use crate::state::{GameSet, GameState};

/// Registers the audio loading system and allocates the persistent handle cache.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(OnEnter(GameState::Loading), load_audio_handles)
            .add_systems(
                Update,
                play_jump_cue
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Handles to game-wide audio clips. Each `Handle` is a cheap cloneable
/// pointer into Bevy's asset storage and keeps the clip alive while held.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub jump: Option<Handle<AudioSource>>,
    pub ambient: Option<Handle<AudioSource>>,
}

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.jump = Some(asset_server.load("audio/jump.ogg"));
    handles.ambient = Some(asset_server.load("audio/ambient.ogg"));
}

/// Fires the jump clip on the frame the player transitions from grounded to
/// airborne with upward velocity.
fn play_jump_cue(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    player: Query<(&Velocity, &MovementState), (With<Player>, Changed<MovementState>)>,
    mut was_landing: Local<bool>,
) {
    let Ok((velocity, state)) = player.get_single() else {
        return;
    };

    if *was_landing && !state.is_landing && **velocity < 0.0 {
        if let Some(clip) = handles.jump.as_ref() {
            commands.spawn(AudioBundle {
                source: clip.clone(),
                settings: PlaybackSettings::DESPAWN,
            });
        }
    }
    *was_landing = state.is_landing;
}
