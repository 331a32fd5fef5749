//! Application configuration — TOML-based, platform-aware paths.
//!
//! Holds start-up values and timing/tone tunables. User state that changes
//! while the panel runs (custom colors, masks, toggles) lives in the
//! settings store instead, see [`crate::settings`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::ToneConfig;
use crate::color::{self, Color};
use crate::engine::Startup;
use crate::gesture::PressTiming;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Color shown at start-up (hex or preset name). Default: "#FFFFFF".
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Start-up brightness percent (0-100).
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Start-up blink interval in ms. 0 = no blinking.
    #[serde(default)]
    pub blink_interval_ms: u32,

    /// Peak click amplitude (0.0-1.0).
    #[serde(default = "default_click_volume")]
    pub click_volume: f32,

    /// Click frequency when a tick shows a color.
    #[serde(default = "default_high_note_hz")]
    pub high_note_hz: f32,

    /// Click frequency when a tick enters black.
    #[serde(default = "default_low_note_hz")]
    pub low_note_hz: f32,

    /// Click envelope decay in ms.
    #[serde(default = "default_click_decay_ms")]
    pub click_decay_ms: u64,

    /// Idle time before the controls hide, in ms.
    #[serde(default = "default_controls_timeout_ms")]
    pub controls_timeout_ms: u64,

    /// Press duration that saves the current color to a slot, in ms.
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,

    /// Delay before the "saving" indicator appears on a press, in ms.
    #[serde(default = "default_press_feedback_delay_ms")]
    pub press_feedback_delay_ms: u64,

    /// Settings file location. Empty = next to this config file.
    #[serde(default)]
    pub settings_path: String,
}

fn default_color() -> String {
    "#FFFFFF".into()
}
fn default_brightness() -> u8 {
    100
}
fn default_click_volume() -> f32 {
    0.3
}
fn default_high_note_hz() -> f32 {
    600.0
}
fn default_low_note_hz() -> f32 {
    300.0
}
/// Longest accepted click decay, in ms.
pub const MAX_CLICK_DECAY_MS: u64 = 1000;

fn default_click_decay_ms() -> u64 {
    20
}
fn default_controls_timeout_ms() -> u64 {
    3000
}
fn default_hold_threshold_ms() -> u64 {
    600
}
fn default_press_feedback_delay_ms() -> u64 {
    200
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_color: default_color(),
            brightness: default_brightness(),
            blink_interval_ms: 0,
            click_volume: default_click_volume(),
            high_note_hz: default_high_note_hz(),
            low_note_hz: default_low_note_hz(),
            click_decay_ms: default_click_decay_ms(),
            controls_timeout_ms: default_controls_timeout_ms(),
            hold_threshold_ms: default_hold_threshold_ms(),
            press_feedback_delay_ms: default_press_feedback_delay_ms(),
            settings_path: String::new(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The `default_color` field could not be parsed.
    InvalidColor(String),
    /// `brightness` is above 100.
    BrightnessOutOfRange(u8),
    /// `click_volume` is outside 0.0-1.0.
    VolumeOutOfRange(f32),
    /// A click frequency is not a positive number (`field` names which).
    InvalidFrequency { field: &'static str, value: f32 },
    /// The feedback delay is not shorter than the hold threshold.
    FeedbackAfterHold { delay_ms: u64, hold_ms: u64 },
    /// `click_decay_ms` is above [`MAX_CLICK_DECAY_MS`].
    DecayOutOfRange(u64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidColor(e) => write!(f, "Invalid default color: {e}"),
            ValidationError::BrightnessOutOfRange(v) => {
                write!(f, "Brightness must be 0-100, got {v}")
            }
            ValidationError::VolumeOutOfRange(v) => {
                write!(f, "Click volume must be 0.0-1.0, got {v}")
            }
            ValidationError::InvalidFrequency { field, value } => {
                write!(f, "Invalid {field}: {value} (must be a positive number)")
            }
            ValidationError::FeedbackAfterHold { delay_ms, hold_ms } => write!(
                f,
                "press_feedback_delay_ms ({delay_ms}) must be shorter than hold_threshold_ms ({hold_ms})"
            ),
            ValidationError::DecayOutOfRange(v) => {
                write!(f, "Click decay must be 0-{MAX_CLICK_DECAY_MS} ms, got {v}")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lightpanel"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Start-up color, falling back to white when the field is invalid.
    pub fn start_color(&self) -> Color {
        color::parse_color(&self.default_color).unwrap_or_else(|e| {
            log::warn!("[config] {e}, using white");
            Color::WHITE
        })
    }

    /// Session start values for the engine.
    pub fn startup(&self) -> Startup {
        Startup {
            selection: self.start_color(),
            brightness: self.brightness.min(100),
            blink_interval_ms: self.blink_interval_ms,
        }
    }

    /// Where the settings store lives: `settings_path` if set, else next to
    /// the config file.
    pub fn settings_file(&self) -> Option<PathBuf> {
        let custom = self.settings_path.trim();
        if custom.is_empty() {
            crate::settings::JsonFileStore::default_path()
        } else {
            Some(PathBuf::from(custom))
        }
    }

    pub fn tone(&self) -> ToneConfig {
        ToneConfig {
            high_hz: self.high_note_hz,
            low_hz: self.low_note_hz,
            volume: self.click_volume.clamp(0.0, 1.0),
            decay: Duration::from_millis(self.click_decay_ms.min(MAX_CLICK_DECAY_MS)),
        }
    }

    pub fn press_timing(&self) -> PressTiming {
        PressTiming {
            hold: Duration::from_millis(self.hold_threshold_ms),
            feedback_delay: Duration::from_millis(self.press_feedback_delay_ms),
        }
    }

    pub fn controls_timeout(&self) -> Duration {
        Duration::from_millis(self.controls_timeout_ms)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = color::parse_color(&self.default_color) {
            errors.push(ValidationError::InvalidColor(e.to_string()));
        }

        if self.brightness > 100 {
            errors.push(ValidationError::BrightnessOutOfRange(self.brightness));
        }

        if !(0.0..=1.0).contains(&self.click_volume) {
            errors.push(ValidationError::VolumeOutOfRange(self.click_volume));
        }

        for (field, value) in [
            ("high_note_hz", self.high_note_hz),
            ("low_note_hz", self.low_note_hz),
        ] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(ValidationError::InvalidFrequency { field, value });
            }
        }

        if self.click_decay_ms > MAX_CLICK_DECAY_MS {
            errors.push(ValidationError::DecayOutOfRange(self.click_decay_ms));
        }

        if self.press_feedback_delay_ms >= self.hold_threshold_ms {
            errors.push(ValidationError::FeedbackAfterHold {
                delay_ms: self.press_feedback_delay_ms,
                hold_ms: self.hold_threshold_ms,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
