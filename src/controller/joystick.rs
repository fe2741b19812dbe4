//! Touch-driven virtual joystick.
//!
//! The touch lifecycle is a two-state machine: idle until a touch lands
//! within the activation radius, then dragging until that same touch ends.
//! Exactly one touch is tracked at a time, identified by its id; touches
//! outside the radius or arriving mid-drag are ignored. While dragging the
//! handle is the touch-origin delta hard-clamped to the radius; once the
//! touch lifts, the handle eases back to the origin by geometric decay.
//!
//! Lifecycle notifications are emitted as [`JoystickEvent`]s, so gameplay
//! code observing the stick runs in its own systems and can never interrupt
//! input handling.

use bevy::input::touch::Touches;
use bevy::prelude::*;

use crate::controller::Controller;
use crate::settings::JoystickSettings;
use crate::vector::Vec2Ext;

pub struct VirtualJoystick {
    origin: Vec2,
    /// Absolute handle position; `pos - origin` is the gameplay output.
    pos: Vec2,
    /// Last known position of the tracked touch, in view space.
    touch_pos: Vec2,
    radius: f32,
    handle_radius: f32,
    dead_zone: f32,
    friction: f32,
    /// Set iff a touch is being tracked.
    active_touch: Option<u64>,
}

impl Resource for VirtualJoystick {}

impl VirtualJoystick {
    pub fn new(settings: &JoystickSettings, view: Vec2) -> Self {
        let origin = view * Vec2::new(settings.origin_frac.0, settings.origin_frac.1);
        Self {
            origin,
            pos: origin,
            touch_pos: origin,
            radius: settings.radius,
            handle_radius: settings.handle_radius,
            dead_zone: settings.dead_zone,
            friction: settings.friction,
            active_touch: None,
        }
    }

    /// A new touch activates the stick only when it lands within the radius
    /// and nothing is currently tracked. Returns whether it was accepted.
    pub fn touch_started(&mut self, id: u64, pos: Vec2) -> bool {
        if self.active_touch.is_some() || (pos - self.origin).length() > self.radius {
            return false;
        }
        self.active_touch = Some(id);
        self.touch_pos = pos;
        true
    }

    /// Position updates apply only to the tracked touch id.
    pub fn touch_moved(&mut self, id: u64, pos: Vec2) {
        if self.active_touch == Some(id) {
            self.touch_pos = pos;
        }
    }

    /// Ending the tracked touch returns the stick to idle; other touch ids
    /// ending are ignored.
    pub fn touch_ended(&mut self, id: u64) {
        if self.active_touch == Some(id) {
            self.active_touch = None;
        }
    }

    /// Per-tick handle update. Dragging clamps the handle to the radius;
    /// idle multiplies the remaining offset by `1 - friction`, which makes
    /// the return speed a function of call frequency, not elapsed time.
    pub fn reposition(&mut self) {
        if self.is_dragging() {
            let diff = self.touch_pos - self.origin;
            self.pos = self.origin + diff.limit(self.radius);
        } else {
            self.pos += (self.origin - self.pos) * self.friction;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active_touch.is_some()
    }

    /// Raw handle offset from the origin, unclamped by the deadzone. The
    /// jump gesture threshold is measured against this.
    pub fn handle_offset(&self) -> Vec2 {
        self.pos - self.origin
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn handle_pos(&self) -> Vec2 {
        self.pos
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn handle_radius(&self) -> f32 {
        self.handle_radius
    }

    pub fn touch_pos(&self) -> Vec2 {
        self.touch_pos
    }
}

impl Controller for VirtualJoystick {
    /// The deadzone is applied on read: the stored handle position is never
    /// clipped, but raw offsets at or below the threshold magnitude read as
    /// zero.
    fn vector(&self) -> Vec2 {
        let offset = self.handle_offset();
        if self.is_dragging() && offset.length() > self.dead_zone {
            offset.normalize_or_zero()
        } else {
            Vec2::ZERO
        }
    }

    fn is_moving(&self) -> bool {
        self.is_dragging() && self.handle_offset().length() > self.dead_zone
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickPhase {
    Started,
    Moved,
    Ended,
}

/// One notification per touch event, carrying the controller's vector and
/// touch position at the time the event was processed.
#[derive(Event, Debug, Clone, Copy)]
pub struct JoystickEvent {
    pub phase: JoystickPhase,
    pub vector: Vec2,
    pub touch_pos: Vec2,
}

/// Feeds platform touch events into the joystick state machine and emits a
/// lifecycle event per processed touch.
pub fn read_touch_input(
    touches: Res<Touches>,
    mut joystick: ResMut<VirtualJoystick>,
    mut events: EventWriter<JoystickEvent>,
) {
    for touch in touches.iter_just_pressed() {
        joystick.touch_started(touch.id(), touch.position());
        emit(&joystick, JoystickPhase::Started, &mut events);
    }

    for touch in touches.iter() {
        if touches.just_pressed(touch.id()) || touch.position() == touch.previous_position() {
            continue;
        }
        joystick.touch_moved(touch.id(), touch.position());
        emit(&joystick, JoystickPhase::Moved, &mut events);
    }

    for touch in touches.iter_just_released().chain(touches.iter_just_canceled()) {
        joystick.touch_ended(touch.id());
        emit(&joystick, JoystickPhase::Ended, &mut events);
    }
}

fn emit(joystick: &VirtualJoystick, phase: JoystickPhase, events: &mut EventWriter<JoystickEvent>) {
    let event = JoystickEvent {
        phase,
        vector: joystick.vector(),
        touch_pos: joystick.touch_pos(),
    };
    debug!("joystick {:?}: vector {:?}", phase, event.vector);
    events.send(event);
}

/// Runs the handle update once per tick.
pub fn ease_handle(mut joystick: ResMut<VirtualJoystick>) {
    joystick.reposition();
}

#[derive(Component)]
pub struct JoystickBase;

#[derive(Component)]
pub struct JoystickKnob;

/// Spawns the base ring and knob as absolute-positioned UI nodes. Screen
/// space matches simulation space here, so no coordinate conversion is
/// needed.
pub fn spawn_joystick_ui(
    mut commands: Commands,
    joystick: Res<VirtualJoystick>,
    existing: Query<Entity, With<JoystickBase>>,
) {
    if !existing.is_empty() {
        return;
    }

    let origin = joystick.origin();
    let radius = joystick.radius();
    let knob = joystick.handle_radius();

    commands.spawn((
        JoystickBase,
        Name::new("JoystickBase"),
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(origin.x - radius),
                top: Val::Px(origin.y - radius),
                width: Val::Px(radius * 2.0),
                height: Val::Px(radius * 2.0),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            background_color: BackgroundColor(Color::NONE),
            border_color: BorderColor(Color::srgb(0.24, 0.24, 0.24)),
            border_radius: BorderRadius::all(Val::Percent(50.0)),
            z_index: ZIndex::Global(100),
            ..default()
        },
    ));

    commands.spawn((
        JoystickKnob,
        Name::new("JoystickKnob"),
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(origin.x - knob),
                top: Val::Px(origin.y - knob),
                width: Val::Px(knob * 2.0),
                height: Val::Px(knob * 2.0),
                ..default()
            },
            background_color: BackgroundColor(Color::srgb(0.24, 0.24, 0.24)),
            border_radius: BorderRadius::all(Val::Percent(50.0)),
            z_index: ZIndex::Global(101),
            ..default()
        },
    ));
}

/// Moves the knob node to the current handle position.
pub fn sync_joystick_ui(
    joystick: Res<VirtualJoystick>,
    mut knobs: Query<&mut Style, With<JoystickKnob>>,
) {
    for mut style in &mut knobs {
        let top_left = joystick.handle_pos() - Vec2::splat(joystick.handle_radius());
        style.left = Val::Px(top_left.x);
        style.top = Val::Px(top_left.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Dir4;

    fn stick() -> VirtualJoystick {
        VirtualJoystick::new(&JoystickSettings::default(), Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn touch_inside_radius_activates() {
        let mut js = stick();
        let origin = js.origin();
        assert!(js.touch_started(7, origin + Vec2::new(10.0, 0.0)));
        assert!(js.is_dragging());
    }

    #[test]
    fn touch_outside_radius_is_ignored() {
        let mut js = stick();
        let origin = js.origin();
        assert!(!js.touch_started(7, origin + Vec2::new(200.0, 0.0)));
        assert!(!js.is_dragging());
    }

    #[test]
    fn second_touch_keeps_the_first_id() {
        let mut js = stick();
        let origin = js.origin();
        assert!(js.touch_started(1, origin));
        assert!(!js.touch_started(2, origin));

        // Moving or ending the second touch must not disturb tracking.
        js.touch_moved(2, origin + Vec2::new(50.0, 0.0));
        js.reposition();
        assert_eq!(js.handle_offset(), Vec2::ZERO);

        js.touch_ended(2);
        assert!(js.is_dragging());

        js.touch_ended(1);
        assert!(!js.is_dragging());
    }

    #[test]
    fn handle_is_clamped_to_radius_while_dragging() {
        let mut js = stick();
        let origin = js.origin();
        js.touch_started(1, origin);
        js.touch_moved(1, origin + Vec2::new(500.0, 0.0));
        js.reposition();
        assert!((js.handle_offset().length() - js.radius()).abs() < 1e-4);
    }

    #[test]
    fn released_handle_decays_to_origin() {
        let mut js = stick();
        let origin = js.origin();
        js.touch_started(1, origin + Vec2::new(80.0, 0.0));
        js.reposition();
        js.touch_ended(1);

        let mut last = js.handle_offset().length();
        assert!(last > 0.0);
        for _ in 0..60 {
            js.reposition();
            let now = js.handle_offset().length();
            assert!(now < last || now == 0.0);
            last = now;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn deadzone_filters_small_offsets() {
        let mut js = stick();
        let origin = js.origin();
        js.touch_started(1, origin + Vec2::new(0.1, 0.0));
        js.reposition();
        assert_eq!(js.vector(), Vec2::ZERO);
        assert!(!js.is_moving());

        js.touch_moved(1, origin + Vec2::new(50.0, 0.0));
        js.reposition();
        assert_eq!(js.vector(), Vec2::new(1.0, 0.0));
        assert!(js.is_moving());
        assert_eq!(js.direction(), Dir4::Right);
    }

    #[test]
    fn deadzone_compares_raw_offset_magnitude() {
        // The threshold applies to the handle offset itself, not to the
        // offset as a fraction of the radius.
        let mut js = stick();
        let origin = js.origin();
        js.touch_started(1, origin + Vec2::new(0.2, 0.0));
        js.reposition();
        assert!(js.handle_offset().length() > 0.15);
        assert_eq!(js.vector(), Vec2::new(1.0, 0.0));
        assert!(js.is_moving());
    }

    #[test]
    fn idle_stick_reads_zero_even_with_residual_offset() {
        let mut js = stick();
        let origin = js.origin();
        js.touch_started(1, origin + Vec2::new(80.0, 0.0));
        js.reposition();
        js.touch_ended(1);

        // The handle is still easing home, but the output is already zero.
        assert!(js.handle_offset().length() > 1.0);
        assert_eq!(js.vector(), Vec2::ZERO);
    }
}
