//! Texture loading with progress reporting. Queues every image the game
//! needs, deduplicates repeated paths, and reports one progress update per
//! settled asset before handing control to the playing state. A failed
//! texture is logged and tolerated; sprites fall back to untextured quads.

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::level::StageTextures;
use crate::player::PlayerFrames;
use crate::state::GameState;

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadingQueue>()
            .add_systems(OnEnter(GameState::Loading), queue_textures)
            .add_systems(
                Update,
                poll_loading.run_if(in_state(GameState::Loading)),
            );
    }
}

/// Pending image loads, one entry per unique path.
#[derive(Resource, Default)]
pub struct LoadingQueue {
    pending: Vec<(String, Handle<Image>)>,
    loaded: usize,
    errored: usize,
    total: usize,
}

/// Snapshot of loading progress after one asset settles (or immediately, for
/// an empty queue).
#[derive(Debug, PartialEq)]
pub struct ProgressUpdate {
    pub loaded: usize,
    pub errored: usize,
    pub total: usize,
    pub percent: u32,
    pub path: Option<String>,
    pub success: Option<bool>,
}

impl LoadingQueue {
    /// Adds a path unless an identical one is already queued.
    pub fn push(&mut self, path: &str, handle: Handle<Image>) {
        if self.pending.iter().any(|(p, _)| p == path) {
            return;
        }
        self.pending.push((path.to_owned(), handle));
        self.total += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_settled(&self) -> bool {
        self.loaded + self.errored == self.total
    }

    /// Settled fraction as a whole percentage; an empty queue is complete.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded + self.errored) * 100 / self.total) as u32
    }

    /// Records one settled asset and returns the progress snapshot for it.
    pub fn settle(&mut self, path: String, success: bool) -> ProgressUpdate {
        if success {
            self.loaded += 1;
        } else {
            self.errored += 1;
        }
        self.pending.retain(|(p, _)| *p != path);
        ProgressUpdate {
            loaded: self.loaded,
            errored: self.errored,
            total: self.total,
            percent: self.percent(),
            path: Some(path),
            success: Some(success),
        }
    }

    /// Progress report for a queue that never had anything to load.
    pub fn empty_report(&self) -> ProgressUpdate {
        ProgressUpdate {
            loaded: 0,
            errored: 0,
            total: 0,
            percent: 100,
            path: None,
            success: None,
        }
    }
}

/// Every image the game uses, loaded up front.
const GROUND_TEXTURE: &str = "textures/ground.png";
const DECORATION_TEXTURES: [&str; 3] = [
    "textures/bush.png",
    "textures/rock.png",
    "textures/flower.png",
];
const PLAYER_FRAME_TEXTURES: [&str; 3] = [
    "textures/player_idle.png",
    "textures/player_walk_a.png",
    "textures/player_walk_b.png",
];

fn queue_textures(
    asset_server: Res<AssetServer>,
    mut queue: ResMut<LoadingQueue>,
    mut stage_textures: ResMut<StageTextures>,
    mut frames: ResMut<PlayerFrames>,
) {
    let mut load = |queue: &mut LoadingQueue, path: &str| -> Handle<Image> {
        let handle = asset_server.load(path.to_owned());
        queue.push(path, handle.clone());
        handle
    };

    stage_textures.ground = load(&mut queue, GROUND_TEXTURE);
    stage_textures.decorations = DECORATION_TEXTURES
        .iter()
        .map(|path| load(&mut queue, path))
        .collect();

    let [idle, walk_a, walk_b] = PLAYER_FRAME_TEXTURES.map(|path| load(&mut queue, path));
    // Walk cycle returns to the idle pose between steps.
    frames.frames = vec![idle.clone(), walk_a, idle, walk_b];

    info!("queued {} textures", queue.total);
}

fn poll_loading(
    asset_server: Res<AssetServer>,
    mut queue: ResMut<LoadingQueue>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if queue.is_empty() {
        if !queue.is_settled() {
            return;
        }
        if queue.total == 0 {
            let report = queue.empty_report();
            info!("nothing to load ({}%)", report.percent);
        }
        next_state.set(GameState::Playing);
        return;
    }

    let mut settled = Vec::new();
    for (path, handle) in &queue.pending {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => settled.push((path.clone(), true)),
            Some(LoadState::Failed(_)) => settled.push((path.clone(), false)),
            _ => {}
        }
    }

    for (path, success) in settled {
        let report = queue.settle(path, success);
        if success {
            info!(
                "loaded '{}' ({}/{}, {}%)",
                report.path.as_deref().unwrap_or_default(),
                report.loaded + report.errored,
                report.total,
                report.percent
            );
        } else {
            warn!(
                "failed to load '{}'; continuing without it ({}%)",
                report.path.as_deref().unwrap_or_default(),
                report.percent
            );
        }
    }

    if queue.is_settled() {
        next_state.set(GameState::Playing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_paths_are_queued_once() {
        let mut queue = LoadingQueue::default();
        queue.push("a.png", Handle::default());
        queue.push("a.png", Handle::default());
        queue.push("b.png", Handle::default());
        assert_eq!(queue.total, 2);
    }

    #[test]
    fn settling_tracks_percent_and_outcome() {
        let mut queue = LoadingQueue::default();
        queue.push("a.png", Handle::default());
        queue.push("b.png", Handle::default());

        let first = queue.settle("a.png".to_owned(), true);
        assert_eq!(first.percent, 50);
        assert_eq!(first.success, Some(true));
        assert!(!queue.is_settled());

        let second = queue.settle("b.png".to_owned(), false);
        assert_eq!(second.percent, 100);
        assert_eq!(second.errored, 1);
        assert!(queue.is_settled());
    }

    #[test]
    fn empty_queue_reports_complete() {
        let queue = LoadingQueue::default();
        let report = queue.empty_report();
        assert_eq!(report.percent, 100);
        assert_eq!(report.success, None);
        assert_eq!(report.path, None);
        assert!(queue.is_settled());
    }
}
