//! Stage orchestration: world bounds, the stage counter, and the procedural
//! background/decoration layout.
//!
//! A stage is `world` background tiles laid out contiguously. Tile origins
//! use `tile_width * i - i` so consecutive tiles overlap by one pixel and
//! rounding never opens a seam. Each tile's ground line is jittered
//! vertically and carries one randomly chosen decoration sprite pinned just
//! above it. The layout arrays are fully rebuilt on every stage transition,
//! never mutated in place.

use bevy::prelude::*;

use crate::camera::sim_to_render;
use crate::collision::{GroundSegments, Rect};
use crate::movement::WorldEdgeCrossed;
use crate::settings::StageSettings;
use crate::state::{GameSet, GameState};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GroundSegments>()
            .init_resource::<StageTextures>()
            .insert_resource(Stage(1))
            .add_systems(OnEnter(GameState::Playing), spawn_stage)
            .add_systems(
                Update,
                advance_stage
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Fixed view size and horizontal extent of the scrollable world.
#[derive(Resource, Debug, Clone)]
pub struct WorldBounds {
    pub view: Vec2,
    /// Number of repeating background tiles per stage.
    pub world: u32,
    /// Baseline ground line in simulation space.
    pub ground_line: f32,
}

impl WorldBounds {
    pub fn new(view: Vec2, settings: &StageSettings) -> Self {
        Self {
            view,
            world: settings.world,
            ground_line: view.y - settings.ground_offset,
        }
    }

    pub fn max_world(&self) -> f32 {
        self.view.x * self.world as f32 - self.world as f32
    }
}

/// Current stage number, starting at 1.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Stage(pub u32);

/// A decoration sprite placed within one background tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub rect: Rect,
    /// Index into the decoration texture list.
    pub sprite: usize,
}

pub struct StageLayout {
    pub segments: Vec<Rect>,
    pub decorations: Vec<Decoration>,
}

/// Builds one stage's ground segments and decorations. Deterministic for a
/// seeded `rng`, which is what the tests rely on.
pub fn generate_layout(
    bounds: &WorldBounds,
    settings: &StageSettings,
    decoration_count: usize,
    rng: &mut fastrand::Rng,
) -> StageLayout {
    let jitter = settings.vertical_jitter.round() as i32;
    let deco_size = settings.decoration_size;

    let mut segments = Vec::with_capacity(bounds.world as usize);
    let mut decorations = Vec::with_capacity(bounds.world as usize);

    for i in 0..bounds.world {
        let offset = rng.i32(-jitter..=jitter) as f32;
        let segment = Rect::new(
            bounds.view.x * i as f32 - i as f32,
            bounds.ground_line + offset,
            bounds.view.x,
            bounds.view.y - bounds.ground_line - offset,
        );
        segments.push(segment);

        if decoration_count > 0 {
            let sprite = rng.usize(0..decoration_count);
            let max_dx = (segment.width - deco_size).max(0.0) as i32;
            let x = segment.x + rng.i32(0..=max_dx) as f32;
            decorations.push(Decoration {
                rect: Rect::new(x, segment.y - deco_size, deco_size, deco_size),
                sprite,
            });
        }
    }

    StageLayout {
        segments,
        decorations,
    }
}

/// Textures the stage sprites are built from; filled by the loading join.
#[derive(Resource, Default)]
pub struct StageTextures {
    pub ground: Handle<Image>,
    pub decorations: Vec<Handle<Image>>,
}

/// Marker for a background tile sprite.
#[derive(Component)]
pub struct StageTile;

/// Marker for a decoration sprite.
#[derive(Component)]
pub struct StageDecoration;

fn spawn_stage(
    mut commands: Commands,
    mut segments: ResMut<GroundSegments>,
    bounds: Res<WorldBounds>,
    settings: Res<StageSettings>,
    textures: Res<StageTextures>,
    existing: Query<Entity, With<StageTile>>,
) {
    // Re-entering Playing from Paused must not reshuffle the world.
    if !existing.is_empty() {
        return;
    }

    let mut rng = fastrand::Rng::new();
    let layout = generate_layout(&bounds, &settings, textures.decorations.len(), &mut rng);
    segments.0 = layout.segments.clone();
    spawn_layout_sprites(&mut commands, &textures, &layout);
}

fn advance_stage(
    mut crossings: EventReader<WorldEdgeCrossed>,
    mut commands: Commands,
    mut stage: ResMut<Stage>,
    mut segments: ResMut<GroundSegments>,
    bounds: Res<WorldBounds>,
    settings: Res<StageSettings>,
    textures: Res<StageTextures>,
    old_sprites: Query<Entity, Or<(With<StageTile>, With<StageDecoration>)>>,
) {
    let mut crossed = false;
    for _ in crossings.read() {
        stage.0 += 1;
        crossed = true;
    }
    if !crossed {
        return;
    }

    info!("stage {} reached, regenerating layout", stage.0);

    for entity in &old_sprites {
        commands.entity(entity).despawn_recursive();
    }

    let mut rng = fastrand::Rng::new();
    let layout = generate_layout(&bounds, &settings, textures.decorations.len(), &mut rng);
    segments.0 = layout.segments.clone();
    spawn_layout_sprites(&mut commands, &textures, &layout);
}

fn spawn_layout_sprites(commands: &mut Commands, textures: &StageTextures, layout: &StageLayout) {
    for segment in &layout.segments {
        commands.spawn((
            StageTile,
            Name::new("StageTile"),
            SpriteBundle {
                texture: textures.ground.clone(),
                sprite: Sprite {
                    custom_size: Some(Vec2::new(segment.width, segment.height)),
                    ..default()
                },
                transform: Transform::from_translation(rect_translation(segment, 0.0)),
                ..default()
            },
        ));
    }

    for decoration in &layout.decorations {
        let texture = textures
            .decorations
            .get(decoration.sprite)
            .cloned()
            .unwrap_or_default();
        commands.spawn((
            StageDecoration,
            Name::new("StageDecoration"),
            SpriteBundle {
                texture,
                sprite: Sprite {
                    custom_size: Some(Vec2::new(decoration.rect.width, decoration.rect.height)),
                    ..default()
                },
                transform: Transform::from_translation(rect_translation(&decoration.rect, 0.5)),
                ..default()
            },
        ));
    }
}

/// Sprite translation for a sim-space rectangle: sprites are anchored at
/// their centre in render space.
fn rect_translation(rect: &Rect, z: f32) -> Vec3 {
    let center = Vec2::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
    sim_to_render(center).extend(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::new(Vec2::new(1280.0, 720.0), &StageSettings::default())
    }

    #[test]
    fn max_world_spans_all_tiles() {
        let bounds = bounds();
        assert_eq!(bounds.max_world(), 1280.0 * 3.0 - 3.0);
    }

    #[test]
    fn tiles_overlap_one_pixel_per_index() {
        let bounds = bounds();
        let mut rng = fastrand::Rng::with_seed(7);
        let layout = generate_layout(&bounds, &StageSettings::default(), 2, &mut rng);

        assert_eq!(layout.segments.len(), 3);
        for (i, segment) in layout.segments.iter().enumerate() {
            assert_eq!(segment.x, 1280.0 * i as f32 - i as f32);
            assert_eq!(segment.width, 1280.0);
        }
    }

    #[test]
    fn vertical_jitter_stays_in_range() {
        let bounds = bounds();
        let settings = StageSettings::default();

        for seed in 0..20 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let layout = generate_layout(&bounds, &settings, 2, &mut rng);
            for segment in &layout.segments {
                let offset = segment.y - bounds.ground_line;
                assert!(offset >= -settings.vertical_jitter);
                assert!(offset <= settings.vertical_jitter);
                // Segments always reach the bottom of the view.
                assert_eq!(segment.y + segment.height, bounds.view.y);
            }
        }
    }

    #[test]
    fn decorations_sit_on_their_tile() {
        let bounds = bounds();
        let settings = StageSettings::default();
        let mut rng = fastrand::Rng::with_seed(99);
        let layout = generate_layout(&bounds, &settings, 2, &mut rng);

        assert_eq!(layout.decorations.len(), layout.segments.len());
        for (segment, decoration) in layout.segments.iter().zip(&layout.decorations) {
            assert!(decoration.sprite < 2);
            assert!(decoration.rect.x >= segment.x);
            assert!(decoration.rect.x + decoration.rect.width <= segment.x + segment.width);
            // Pinned directly above the tile's ground line.
            assert_eq!(decoration.rect.y, segment.y - settings.decoration_size);
        }
    }

    #[test]
    fn no_decoration_textures_means_no_decorations() {
        let bounds = bounds();
        let mut rng = fastrand::Rng::with_seed(1);
        let layout = generate_layout(&bounds, &StageSettings::default(), 0, &mut rng);
        assert!(layout.decorations.is_empty());
    }

    #[test]
    fn seeded_layout_is_deterministic() {
        let bounds = bounds();
        let settings = StageSettings::default();
        let a = generate_layout(&bounds, &settings, 2, &mut fastrand::Rng::with_seed(5));
        let b = generate_layout(&bounds, &settings, 2, &mut fastrand::Rng::with_seed(5));
        assert_eq!(a.segments, b.segments);
        assert_eq!(a.decorations, b.decorations);
    }
}
