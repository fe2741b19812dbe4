//! Ground geometry and the AABB overlap test used by the frame update.
//!
//! The world is a flat list of axis-aligned rectangles in screen space
//! (y grows downward). `level.rs` rebuilds the list whenever a stage starts;
//! `movement.rs` sweeps the player's hitbox against it each tick.

use bevy::prelude::*;

/// Axis-aligned rectangle in simulation space. `x`/`y` is the top-left
/// corner because the simulation runs y-down, matching touch coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Standard AABB overlap test. Edge-touching rectangles do not overlap
/// (strict inequalities), so a player resting exactly on a segment top is
/// not colliding.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// The static ground segments of the current stage. One writer (the stage
/// layout rebuild), many readers.
#[derive(Resource, Default)]
pub struct GroundSegments(pub Vec<Rect>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rectangles() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn disjoint_rectangles() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn edge_touching_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &below));
    }

    #[test]
    fn containment_is_overlap() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 10.0, 10.0);
        assert!(overlaps(&outer, &inner));
    }
}
