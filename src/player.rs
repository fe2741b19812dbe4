//! Player entity lifecycle and presentation. Spawns the avatar with its
//! simulation components, keeps the rendered sprite in sync with the
//! simulation body, and runs the four-frame walk cycle.

use bevy::prelude::*;

use crate::camera::sim_to_render;
use crate::level::WorldBounds;
use crate::movement::{Body, MovementState, Velocity};
use crate::state::{GameSet, GameState};

/// Side length of the square avatar, in simulation units.
pub const PLAYER_SIZE: f32 = 40.0;

/// Seconds per animation frame while walking.
const FRAME_SECONDS: f32 = 0.25;

/// Registers the systems that create the player entity and keep its sprite
/// synchronized with the simulation.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerFrames>()
            .add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(
                Update,
                (sync_player_sprite, animate_player)
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Marker component used by the camera, movement, and stage systems to find
/// the player entity.
#[derive(Component)]
pub struct Player;

/// Display name shown above the avatar.
#[derive(Resource)]
pub struct PlayerName(pub String);

/// Walk-cycle textures in playback order, filled during loading.
#[derive(Resource, Default)]
pub struct PlayerFrames {
    pub frames: Vec<Handle<Image>>,
}

/// Drives the walk cycle: which frame is showing and when to advance.
#[derive(Component)]
pub struct AnimationCycle {
    pub timer: Timer,
    pub frame: usize,
}

impl Default for AnimationCycle {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(FRAME_SECONDS, TimerMode::Repeating),
            frame: 0,
        }
    }
}

fn spawn_player(
    mut commands: Commands,
    existing: Query<Entity, With<Player>>,
    bounds: Res<WorldBounds>,
    frames: Res<PlayerFrames>,
    name: Res<PlayerName>,
) {
    // Resuming from pause re-enters Playing; the avatar is still alive.
    if !existing.is_empty() {
        return;
    }

    let body = Body {
        x: bounds.view.x / 2.0,
        y: 0.0,
        width: PLAYER_SIZE,
        height: PLAYER_SIZE,
    };

    let texture = frames.frames.first().cloned().unwrap_or_default();

    commands
        .spawn((
            Name::new("Player"),
            Player,
            body,
            Velocity::default(),
            MovementState::default(),
            AnimationCycle::default(),
            SpriteBundle {
                texture,
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(PLAYER_SIZE)),
                    ..default()
                },
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(Text2dBundle {
                text: Text::from_section(
                    name.0.clone(),
                    TextStyle {
                        font_size: 18.0,
                        color: Color::WHITE,
                        ..default()
                    },
                ),
                // Label floats just above the avatar, in local (render) space.
                transform: Transform::from_translation(Vec3::new(0.0, PLAYER_SIZE, 0.5)),
                ..default()
            });
        });
}

/// Copies the simulation body into the rendered transform and mirrors the
/// sprite when the player faces left.
fn sync_player_sprite(
    mut player: Query<(&Body, &MovementState, &mut Transform, &mut Sprite), With<Player>>,
) {
    for (body, state, mut transform, mut sprite) in &mut player {
        let center = sim_to_render(Vec2::new(
            body.x + body.width / 2.0,
            body.y + body.height / 2.0,
        ));
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        sprite.flip_x = state.facing_left;
    }
}

fn animate_player(
    time: Res<Time>,
    frames: Res<PlayerFrames>,
    mut player: Query<(&MovementState, &mut AnimationCycle, &mut Handle<Image>), With<Player>>,
) {
    if frames.frames.is_empty() {
        return;
    }

    for (state, mut cycle, mut texture) in &mut player {
        if !state.is_walking {
            cycle.frame = 0;
            cycle.timer.reset();
        } else {
            cycle.timer.tick(time.delta());
            if cycle.timer.just_finished() {
                cycle.frame = (cycle.frame + 1) % frames.frames.len();
            }
        }
        let next = frames.frames[cycle.frame].clone();
        if *texture != next {
            *texture = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn animation_cycle_wraps_over_four_frames() {
        let mut cycle = AnimationCycle::default();
        let mut seen = Vec::new();
        for _ in 0..8 {
            cycle.timer.tick(Duration::from_millis(250));
            if cycle.timer.just_finished() {
                cycle.frame = (cycle.frame + 1) % 4;
            }
            seen.push(cycle.frame);
        }
        assert_eq!(seen, vec![1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn animation_does_not_advance_between_frame_boundaries() {
        let mut cycle = AnimationCycle::default();
        cycle.timer.tick(Duration::from_millis(100));
        assert!(!cycle.timer.just_finished());
        assert_eq!(cycle.frame, 0);
    }
}
