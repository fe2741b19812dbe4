//! Stage banner. Shows "stage N" when play begins and again whenever the
//! player crosses the right world edge, fading out over a few seconds.

use bevy::prelude::*;

use crate::level::Stage;
use crate::state::{GameSet, GameState};

/// Seconds for the banner to fade from fully opaque to invisible.
const FADE_SECONDS: f32 = 3.0;

/// Registers the stage banner overlay and its fade systems.
pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageBanner>()
            .add_systems(OnEnter(GameState::Playing), spawn_banner)
            .add_systems(
                Update,
                (restart_banner_on_stage_entry, fade_banner)
                    .chain()
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Current banner opacity, counted down each frame while visible.
#[derive(Resource)]
pub struct StageBanner {
    pub alpha: f32,
}

impl Default for StageBanner {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl StageBanner {
    pub fn restart(&mut self) {
        self.alpha = 1.0;
    }

    /// Advances the fade by `delta` seconds, clamping at fully transparent.
    pub fn tick(&mut self, delta: f32) {
        self.alpha = (self.alpha - delta / FADE_SECONDS).max(0.0);
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Marker component for the banner text node.
#[derive(Component)]
pub struct BannerText;

fn spawn_banner(mut commands: Commands, stage: Res<Stage>, existing: Query<Entity, With<BannerText>>) {
    // Resuming from pause re-enters Playing; keep the existing banner.
    if !existing.is_empty() {
        return;
    }

    commands
        .spawn((
            Name::new("StageBannerRoot"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                z_index: ZIndex::Global(50),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                BannerText,
                TextBundle::from_section(
                    format!("stage {}", stage.0),
                    TextStyle {
                        font_size: 64.0,
                        color: Color::srgba(1.0, 1.0, 1.0, 1.0),
                        ..default()
                    },
                ),
            ));
        });
}

/// Restarts the fade and updates the label whenever the stage counter
/// advances.
fn restart_banner_on_stage_entry(
    mut banner: ResMut<StageBanner>,
    stage: Res<Stage>,
    mut text: Query<&mut Text, With<BannerText>>,
) {
    if !stage.is_changed() || stage.is_added() {
        return;
    }

    banner.restart();
    for mut text in &mut text {
        text.sections[0].value = format!("stage {}", stage.0);
    }
}

fn fade_banner(
    time: Res<Time>,
    mut banner: ResMut<StageBanner>,
    mut text: Query<&mut Text, With<BannerText>>,
) {
    if !banner.is_visible() {
        return;
    }

    banner.tick(time.delta_seconds());
    for mut text in &mut text {
        text.sections[0].style.color = Color::srgba(1.0, 1.0, 1.0, banner.alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_starts_fully_opaque() {
        let banner = StageBanner::default();
        assert_eq!(banner.alpha, 1.0);
        assert!(banner.is_visible());
    }

    #[test]
    fn fade_reaches_zero_after_three_seconds() {
        let mut banner = StageBanner::default();
        for _ in 0..180 {
            banner.tick(1.0 / 60.0);
        }
        assert!(banner.alpha < 1e-4);
        // Keeps clamping, never goes negative.
        banner.tick(1.0);
        assert_eq!(banner.alpha, 0.0);
        assert!(!banner.is_visible());
    }

    #[test]
    fn restart_resets_opacity() {
        let mut banner = StageBanner::default();
        banner.tick(2.0);
        banner.restart();
        assert_eq!(banner.alpha, 1.0);
    }
}
