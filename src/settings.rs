//! Tunable gameplay settings with optional JSON overrides.
//!
//! Every constant the physics step and the controllers depend on lives here
//! so nothing in the frame update is a bare literal. Defaults reproduce the
//! shipped tuning; a `settings.json` next to the binary can override any
//! subset of fields. Out-of-range values are rejected before the app starts
//! rather than surfacing as weird behaviour at tick time.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

/// Per-tick kinematic constants. The integration is deliberately frame-rate
/// dependent (one application per rendered frame), so these are plain
/// per-tick deltas, not per-second rates.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Added to the player's vertical velocity every tick.
    pub gravity: f32,
    /// Controller vector is scaled by this before it moves the player.
    pub move_speed: f32,
    /// Jump impulse is the scaled vertical input times this factor.
    pub jump_multiplier: f32,
    /// Minimum joystick handle offset (in handle units) for a flick-up to
    /// count as a jump gesture.
    pub jump_trigger: f32,
    /// Largest ledge height the player steps up automatically. The step-up
    /// window is `[-max_step_up, 0)` in foot-to-obstacle-top distance.
    pub max_step_up: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            move_speed: 3.0,
            jump_multiplier: 3.0,
            jump_trigger: 30.0,
            max_step_up: 15.0,
        }
    }
}

/// Virtual joystick geometry and feel.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JoystickSettings {
    /// Anchor of the joystick base, as `(x, y)` fractions of the view size.
    pub origin_frac: (f32, f32),
    /// Base radius in pixels; touches farther than this from the origin do
    /// not activate the stick.
    pub radius: f32,
    /// Visual knob radius in pixels.
    pub handle_radius: f32,
    /// Handle offsets at or below this magnitude read as the zero vector.
    pub dead_zone: f32,
    /// Easing factor applied once per tick while idle: the remaining offset
    /// is multiplied by `1 - friction`.
    pub friction: f32,
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            origin_frac: (0.2, 0.85),
            // Matches (view_width + view_height) / 20.78 at 1280x720.
            radius: 96.0,
            handle_radius: 48.0,
            dead_zone: 0.15,
            friction: 0.25,
        }
    }
}

/// Keyboard synonym groups, as lower-cased key names. Parsed into `KeyCode`
/// sets when the keyboard controller is built; unknown names fail fast.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            left: vec!["a".into(), "arrowleft".into()],
            right: vec!["d".into(), "arrowright".into()],
            up: vec!["w".into(), "arrowup".into()],
            down: vec!["s".into(), "arrowdown".into()],
        }
    }
}

/// Stage layout constants.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// Number of repeating background tiles per stage.
    pub world: u32,
    /// Ground line sits this many pixels above the bottom of the view.
    pub ground_offset: f32,
    /// Decoration sprites are square with this side length.
    pub decoration_size: f32,
    /// Each tile's ground line is shifted by a random amount in
    /// `[-vertical_jitter, vertical_jitter]`.
    pub vertical_jitter: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            world: 3,
            ground_offset: 120.0,
            decoration_size: 100.0,
            vertical_jitter: 20.0,
        }
    }
}

/// All settings sections, mirroring the JSON file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsSettings,
    pub joystick: JoystickSettings,
    pub keys: KeySettings,
    pub stage: StageSettings,
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "cannot read settings file: {e}"),
            SettingsError::Parse(e) => write!(f, "malformed settings file: {e}"),
            SettingsError::Invalid(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when no path is
    /// given or the file does not exist. Parse failures and out-of-range
    /// values are hard errors.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let settings = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path).map_err(SettingsError::Io)?;
                Self::from_json(&raw)?
            }
            _ => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(raw).map_err(SettingsError::Parse)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.joystick.radius <= 0.0 || self.joystick.handle_radius <= 0.0 {
            return Err(SettingsError::Invalid("joystick radii must be positive"));
        }
        if !(0.0..1.0).contains(&self.joystick.dead_zone) {
            return Err(SettingsError::Invalid("dead_zone must be in [0, 1)"));
        }
        if !(self.joystick.friction > 0.0 && self.joystick.friction <= 1.0) {
            return Err(SettingsError::Invalid("friction must be in (0, 1]"));
        }
        if self.physics.gravity <= 0.0 {
            return Err(SettingsError::Invalid("gravity must be positive"));
        }
        if self.physics.max_step_up < 0.0 {
            return Err(SettingsError::Invalid("max_step_up must not be negative"));
        }
        if self.stage.world == 0 {
            return Err(SettingsError::Invalid("world must be at least 1"));
        }
        if self.stage.vertical_jitter < 0.0 {
            return Err(SettingsError::Invalid(
                "vertical_jitter must not be negative",
            ));
        }
        if self.stage.decoration_size <= 0.0 {
            return Err(SettingsError::Invalid("decoration_size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_single_section() {
        let settings =
            Settings::from_json(r#"{ "physics": { "gravity": 0.8 } }"#).expect("parses");
        assert_eq!(settings.physics.gravity, 0.8);
        // Untouched sections keep their defaults.
        assert_eq!(settings.physics.move_speed, 3.0);
        assert_eq!(settings.joystick.dead_zone, 0.15);
    }

    #[test]
    fn out_of_range_dead_zone_is_rejected() {
        let mut settings = Settings::default();
        settings.joystick.dead_zone = 1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_friction_is_rejected() {
        let mut settings = Settings::default();
        settings.joystick.friction = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn negative_radius_is_rejected() {
        let mut settings = Settings::default();
        settings.joystick.radius = -10.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn negative_jitter_is_rejected() {
        // The layout generator samples `-jitter..=jitter`; a negative value
        // would make that range empty at stage-spawn time.
        let mut settings = Settings::default();
        settings.stage.vertical_jitter = -5.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_decoration_size_is_rejected() {
        let mut settings = Settings::default();
        settings.stage.decoration_size = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }
}
