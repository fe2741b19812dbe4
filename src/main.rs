//! Application entry point: parses the command line, loads settings, and
//! composes the Bevy runtime with the window configuration.

mod app;
mod audio;
mod camera;
mod collision;
mod controller;
mod level;
mod loading;
mod movement;
mod player;
mod settings;
mod state;
mod transition;
mod ui;
mod vector;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod wasm;

use std::path::PathBuf;
use std::process::exit;

use app::GrasslandPlatformerPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};
use clap::Parser;

use controller::joystick::VirtualJoystick;
use controller::keymove::KeyMove;
use level::WorldBounds;
use player::PlayerName;
use settings::Settings;

const VIEW_WIDTH: f32 = 1280.0;
const VIEW_HEIGHT: f32 = 720.0;

#[derive(Parser, Debug)]
#[command(name = "grassland-platformer", about = "Side-scrolling platformer", version)]
struct Args {
    /// Display name shown above the avatar (3 to 10 characters).
    #[arg(long, default_value = "player")]
    name: String,

    /// Optional JSON settings file overriding the built-in tuning.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    wasm::set_panic_hook();

    let args = Args::parse();

    if args.name.chars().count() < 3 || args.name.chars().count() > 10 {
        eprintln!("name must be between 3 and 10 characters");
        exit(1);
    }

    let settings = match Settings::load(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid settings: {err}");
            exit(1);
        }
    };

    let view = Vec2::new(VIEW_WIDTH, VIEW_HEIGHT);
    let bounds = WorldBounds::new(view, &settings.stage);
    let joystick = VirtualJoystick::new(&settings.joystick, view);
    let keymove = match KeyMove::new(&settings.keys) {
        Ok(keymove) => keymove,
        Err(err) => {
            eprintln!("invalid key binding: {err}");
            exit(1);
        }
    };

    let primary_window = Window {
        title: "Grassland Platformer".to_string(),
        resolution: WindowResolution::new(VIEW_WIDTH, VIEW_HEIGHT),
        resizable: false,
        resize_constraints: WindowResizeConstraints {
            min_width: VIEW_WIDTH,
            min_height: VIEW_HEIGHT,
            max_width: VIEW_WIDTH,
            max_height: VIEW_HEIGHT,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // `DefaultPlugins` spins up rendering, input, audio, and logging. Nearest
    // sampling keeps the pixel art crisp; asset hot reload is desktop only.
    let mut default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest());

    #[cfg(not(target_arch = "wasm32"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        default_plugins = default_plugins.set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(false),
            ..default()
        });
    }

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.47, 0.74, 0.94)))
        .insert_resource(settings.physics)
        .insert_resource(settings.joystick)
        .insert_resource(settings.stage)
        .insert_resource(bounds)
        .insert_resource(joystick)
        .insert_resource(keymove)
        .insert_resource(PlayerName(args.name))
        .add_plugins(default_plugins)
        .add_plugins(GrasslandPlatformerPlugin)
        .run();
}
