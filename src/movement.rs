//! Per-frame player kinematics and collision resolution.
//!
//! The whole update is one pure function, `step_frame`, driven by a thin
//! system. Integration is per-tick by design: gravity and movement speed are
//! applied once per rendered frame, not scaled by elapsed time.
//!
//! Collision is resolved with two independent axis sweeps against every
//! ground segment, OR-reduced across segments: the first hit decides the
//! axis, with no minimum-penetration selection. A vertical hit zeroes the
//! fall and marks the player as landing; a horizontal hit reverts x unless
//! the obstacle top is within the step-up window, in which case the player
//! climbs the ledge in the same tick.

use bevy::prelude::*;

use crate::collision::{overlaps, GroundSegments, Rect};
use crate::controller::{ControlIntent, Dir4};
use crate::level::WorldBounds;
use crate::player::Player;
use crate::settings::PhysicsSettings;
use crate::state::{GameSet, GameState};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WorldEdgeCrossed>().add_systems(
            Update,
            apply_kinematics
                .in_set(GameSet::Movement)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Player bounds in simulation space (y-down, top-left anchored).
#[derive(Component, Debug, Clone, Copy)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Body {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Vertical velocity; positive is downward. Horizontal motion is applied
/// directly from the controller vector and carries no momentum.
#[derive(Component, Default, Deref, DerefMut)]
pub struct Velocity(pub f32);

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct MovementState {
    /// Vertical support contact, as opposed to free-fall.
    pub is_landing: bool,
    /// Set only while the input has nonzero magnitude on both axes at once
    /// (a diagonal joystick gesture); axis-aligned motion never sets it.
    pub is_walking: bool,
    pub facing_left: bool,
}

/// Emitted when the player's right edge reaches the end of the scrollable
/// world. The stage manager and the banner both listen for it.
#[derive(Event)]
pub struct WorldEdgeCrossed;

pub struct StepResult {
    pub crossed_world_edge: bool,
}

/// Advances the player by one tick. See the module docs for the sweep
/// semantics; the ordering below (edge check before collision, gravity
/// before the jump impulse, step-up after the commit) is load-bearing.
pub fn step_frame(
    body: &mut Body,
    velocity: &mut f32,
    state: &mut MovementState,
    intent: &ControlIntent,
    physics: &PhysicsSettings,
    max_world: f32,
    segments: &[Rect],
) -> StepResult {
    let move_v = intent.vector * physics.move_speed;
    let prev_x = body.x;
    let prev_y = body.y;

    // Facing only flips on an actual directional read; a zero vector keeps
    // the last orientation.
    if intent.direction != Dir4::None {
        state.facing_left = move_v.x < 0.0;
    }

    body.x += move_v.x;
    if body.x < 0.0 {
        body.x = 0.0;
    }

    // World-edge check uses the pre-collision horizontal position.
    // Resetting x to 0 also moves the player away from the trigger, which
    // makes the crossing edge-triggered.
    let mut crossed_world_edge = false;
    if body.x + body.width >= max_world {
        body.x = 0.0;
        crossed_world_edge = true;
    }

    state.is_walking = move_v.x != 0.0 && move_v.y != 0.0;

    *velocity += physics.gravity;

    if state.is_landing && intent.jump {
        *velocity = move_v.y * physics.jump_multiplier;
    }

    let was_landing = state.is_landing;
    let mut colliding_x = false;
    let mut colliding_y = false;
    let mut different_y = 0.0;

    for segment in segments {
        let mut hitbox = body.rect();
        hitbox.y += *velocity;
        if !colliding_y {
            colliding_y = overlaps(&hitbox, segment);
        }

        hitbox.x += move_v.x;
        hitbox.y -= *velocity;
        if !colliding_x {
            colliding_x = overlaps(&hitbox, segment);
            if colliding_x && was_landing {
                // Gap between the player's feet and the obstacle top, for
                // the segment that blocked us. Negative means the top sits
                // above the feet.
                different_y = segment.y - (body.y + body.height);
            }
        }
    }

    if colliding_x {
        body.x = prev_x;
        state.is_walking = false;
    }
    if colliding_y {
        *velocity = 0.0;
        body.y = prev_y;
        state.is_landing = true;
    } else {
        state.is_landing = false;
    }
    body.y += *velocity;

    // Ledge step-up: small obstacles are climbed instead of blocking.
    if different_y >= -physics.max_step_up && different_y < 0.0 {
        body.x += move_v.x;
        body.y += different_y;
    }

    if body.x < 0.0 {
        body.x = 0.0;
    }

    StepResult { crossed_world_edge }
}

fn apply_kinematics(
    intent: Res<ControlIntent>,
    physics: Res<PhysicsSettings>,
    bounds: Res<WorldBounds>,
    segments: Res<GroundSegments>,
    mut query: Query<(&mut Body, &mut Velocity, &mut MovementState), With<Player>>,
    mut crossings: EventWriter<WorldEdgeCrossed>,
) {
    for (mut body, mut velocity, mut state) in &mut query {
        let result = step_frame(
            &mut body,
            &mut velocity,
            &mut state,
            &intent,
            &physics,
            bounds.max_world(),
            &segments.0,
        );

        if result.crossed_world_edge {
            crossings.send(WorldEdgeCrossed);
        }
    }
}
