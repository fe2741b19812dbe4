//! Camera tracking. Keeps the view centered on the player while never
//! showing anything outside the scrollable world, and owns the mapping from
//! simulation space (y-down) to render space (y-up).

use bevy::prelude::*;

use crate::level::WorldBounds;
use crate::movement::Body;
use crate::player::Player;
use crate::state::GameSet;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            follow_player.in_set(GameSet::Effects).run_if(has_player),
        );
    }
}

/// Marker so the follow system can locate the camera entity.
#[derive(Component)]
pub struct FollowCamera;

fn has_player(player: Query<Entity, With<Player>>) -> bool {
    !player.is_empty()
}

/// Horizontal camera offset: the player centered in the view, clamped so the
/// camera never leaves `[0, max_world - view_width]`.
pub fn camera_offset(player_x: f32, player_width: f32, view_width: f32, max_world: f32) -> f32 {
    (player_x - view_width / 2.0 + player_width / 2.0).clamp(0.0, max_world - view_width)
}

/// Converts a simulation-space point to render space. The simulation runs
/// y-down from the top-left (matching touch coordinates); rendering is y-up.
pub fn sim_to_render(p: Vec2) -> Vec2 {
    Vec2::new(p.x, -p.y)
}

/// Positions the render camera so that the view covers the simulation window
/// starting at the clamped offset.
fn follow_player(
    bounds: Res<WorldBounds>,
    player: Query<&Body, With<Player>>,
    mut camera: Query<&mut Transform, With<FollowCamera>>,
) {
    let Ok(body) = player.get_single() else {
        return;
    };
    let Ok(mut transform) = camera.get_single_mut() else {
        return;
    };

    let offset = camera_offset(body.x, body.width, bounds.view.x, bounds.max_world());
    // The camera looks at the centre of the visible sim window.
    let center = sim_to_render(Vec2::new(offset + bounds.view.x / 2.0, bounds.view.y / 2.0));
    transform.translation.x = center.x;
    transform.translation.y = center.y;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: f32 = 1280.0;
    const MAX_WORLD: f32 = 3837.0;

    #[test]
    fn offset_is_clamped_at_the_left_edge() {
        assert_eq!(camera_offset(0.0, 40.0, VIEW, MAX_WORLD), 0.0);
    }

    #[test]
    fn offset_is_clamped_at_the_right_edge() {
        let offset = camera_offset(MAX_WORLD, 40.0, VIEW, MAX_WORLD);
        assert_eq!(offset, MAX_WORLD - VIEW);
    }

    #[test]
    fn offset_centers_the_player_mid_world() {
        let offset = camera_offset(2000.0, 40.0, VIEW, MAX_WORLD);
        assert_eq!(offset, 2000.0 - VIEW / 2.0 + 20.0);
    }

    #[test]
    fn offset_stays_in_range_everywhere() {
        for x in (0..4000).step_by(37) {
            let offset = camera_offset(x as f32, 40.0, VIEW, MAX_WORLD);
            assert!(offset >= 0.0);
            assert!(offset <= MAX_WORLD - VIEW);
        }
    }

    #[test]
    fn render_space_flips_y() {
        assert_eq!(sim_to_render(Vec2::new(10.0, 20.0)), Vec2::new(10.0, -20.0));
    }
}
