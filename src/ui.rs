//! Overlay UI: the loading screen with its progress readout, the frame-rate
//! counter, and the pause menu shown while the simulation is frozen.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::loading::LoadingQueue;
use crate::state::GameState;

/// Registers loading/pause overlay spawn and despawn systems plus the fps
/// counter.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin)
            .add_systems(Startup, spawn_fps_counter)
            .add_systems(Update, update_fps_counter)
            .add_systems(OnEnter(GameState::Loading), spawn_loading_screen)
            .add_systems(OnExit(GameState::Loading), despawn_loading_screen)
            .add_systems(
                Update,
                update_loading_text.run_if(in_state(GameState::Loading)),
            )
            .add_systems(OnEnter(GameState::Paused), spawn_pause_menu)
            .add_systems(OnExit(GameState::Paused), despawn_pause_menu);
    }
}

#[derive(Component)]
struct LoadingScreen;

#[derive(Component)]
struct LoadingText;

#[derive(Component)]
struct PauseMenu;

#[derive(Component)]
struct FpsText;

/// Counter color: comfortable frame rates are green, marginal ones yellow,
/// anything at or below 20 fps red.
fn fps_color(fps: f64) -> Color {
    if fps > 40.0 {
        Color::srgb(0.0, 0.8, 0.0)
    } else if fps > 20.0 {
        Color::srgb(0.9, 0.9, 0.0)
    } else {
        Color::srgb(0.9, 0.0, 0.0)
    }
}

fn spawn_fps_counter(mut commands: Commands) {
    let mut bundle = TextBundle::from_section(
        "0 fps",
        TextStyle {
            font_size: 14.0,
            color: Color::WHITE,
            ..default()
        },
    )
    .with_style(Style {
        position_type: PositionType::Absolute,
        right: Val::Percent(2.0),
        top: Val::Px(20.0),
        ..default()
    })
    .with_text_justify(JustifyText::Right);
    bundle.z_index = ZIndex::Global(300);

    commands.spawn((FpsText, Name::new("FpsText"), bundle));
}

fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut text: Query<&mut Text, With<FpsText>>,
) {
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|diagnostic| diagnostic.smoothed())
    else {
        return;
    };

    for mut text in &mut text {
        text.sections[0].value = format!("{fps:.0} fps");
        text.sections[0].style.color = fps_color(fps);
    }
}

fn spawn_loading_screen(mut commands: Commands) {
    commands
        .spawn((
            LoadingScreen,
            Name::new("LoadingScreen"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgb(0.08, 0.08, 0.1)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                LoadingText,
                TextBundle::from_section(
                    "loading 0%",
                    TextStyle {
                        font_size: 36.0,
                        color: Color::srgba(0.9, 0.9, 0.9, 1.0),
                        ..default()
                    },
                ),
            ));
        });
}

fn update_loading_text(queue: Res<LoadingQueue>, mut text: Query<&mut Text, With<LoadingText>>) {
    if !queue.is_changed() {
        return;
    }
    for mut text in &mut text {
        text.sections[0].value = format!("loading {}%", queue.percent());
    }
}

fn despawn_loading_screen(mut commands: Commands, query: Query<Entity, With<LoadingScreen>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

/// Spawns a full-screen node with centered text over the frozen game.
fn spawn_pause_menu(mut commands: Commands) {
    commands
        .spawn((
            PauseMenu,
            Name::new("PauseMenu"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                z_index: ZIndex::Global(200),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Paused\nPress ESC to resume",
                TextStyle {
                    font_size: 36.0,
                    color: Color::srgba(0.9, 0.9, 0.9, 1.0),
                    ..default()
                },
            ));
        });
}

fn despawn_pause_menu(mut commands: Commands, query: Query<Entity, With<PauseMenu>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_color_thresholds() {
        assert_eq!(fps_color(60.0), Color::srgb(0.0, 0.8, 0.0));
        assert_eq!(fps_color(41.0), Color::srgb(0.0, 0.8, 0.0));
        assert_eq!(fps_color(40.0), Color::srgb(0.9, 0.9, 0.0));
        assert_eq!(fps_color(21.0), Color::srgb(0.9, 0.9, 0.0));
        assert_eq!(fps_color(20.0), Color::srgb(0.9, 0.0, 0.0));
        assert_eq!(fps_color(0.0), Color::srgb(0.9, 0.0, 0.0));
    }
}
