//! Blink phase state machine — testable tick logic decoupled from timers.
//!
//! [`BlinkMode`] folds the interval and the rotate/strobe toggles into one
//! value, computed once per config change. [`BlinkPhase`] is the ephemeral
//! phase that every timer tick advances; the timer itself lives in
//! [`crate::clock`].

use serde::Serialize;

/// Shortest accepted non-zero blink interval.
pub const MIN_INTERVAL_MS: u32 = 50;
/// Longest accepted blink interval.
pub const MAX_INTERVAL_MS: u32 = 1000;

/// Normalise a requested blink interval. `0` disables blinking; anything
/// else is clamped to [`MIN_INTERVAL_MS`]..=[`MAX_INTERVAL_MS`].
pub fn normalize_interval(ms: u32) -> u32 {
    if ms == 0 {
        0
    } else {
        ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
    }
}

/// How ticks are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlinkMode {
    /// Interval is 0, no ticks.
    Off,
    /// Color/black alternation of the single selected color.
    StrobeOnly,
    /// Step through the custom colors, one per tick, never black.
    RotateOnly,
    /// Color/black alternation, next custom color after each black half.
    StrobeAndRotate,
}

impl BlinkMode {
    pub fn from_config(interval_ms: u32, rotate_colors: bool, strobe_effect: bool) -> Self {
        match (interval_ms, rotate_colors, strobe_effect) {
            (0, _, _) => BlinkMode::Off,
            (_, false, _) => BlinkMode::StrobeOnly,
            (_, true, true) => BlinkMode::StrobeAndRotate,
            (_, true, false) => BlinkMode::RotateOnly,
        }
    }

    pub fn is_running(self) -> bool {
        self != BlinkMode::Off
    }

    /// Whether ticks alternate between color and black.
    pub fn strobes(self) -> bool {
        matches!(self, BlinkMode::StrobeOnly | BlinkMode::StrobeAndRotate)
    }

    /// Whether the custom color list is stepped through.
    pub fn rotates(self) -> bool {
        matches!(self, BlinkMode::RotateOnly | BlinkMode::StrobeAndRotate)
    }
}

impl std::fmt::Display for BlinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlinkMode::Off => "off",
            BlinkMode::StrobeOnly => "strobe",
            BlinkMode::RotateOnly => "rotate",
            BlinkMode::StrobeAndRotate => "strobe + rotate",
        };
        f.write_str(s)
    }
}

/// Audio cue requested by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickCue {
    /// High note when the tick shows a color, low note when it enters black.
    pub high_note: bool,
}

/// Ephemeral blink phase.
///
/// `tick_index` counts completed cycles and only grows; consumers reduce it
/// modulo their own length (custom colors, mask shapes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlinkPhase {
    pub tick_index: usize,
    pub showing_black: bool,
}

impl BlinkPhase {
    pub fn reset(&mut self) {
        *self = BlinkPhase::default();
    }

    /// Advance by one timer tick under `mode`.
    ///
    /// Strobing modes toggle black and count one cycle each time black is
    /// left; rotate-only counts every tick. Returns `None` when `mode` is
    /// [`BlinkMode::Off`].
    pub fn advance(&mut self, mode: BlinkMode) -> Option<ClickCue> {
        match mode {
            BlinkMode::Off => return None,
            BlinkMode::StrobeOnly | BlinkMode::StrobeAndRotate => {
                let leaving_black = self.showing_black;
                self.showing_black = !self.showing_black;
                if leaving_black {
                    self.tick_index = self.tick_index.wrapping_add(1);
                }
            }
            BlinkMode::RotateOnly => {
                self.showing_black = false;
                self.tick_index = self.tick_index.wrapping_add(1);
            }
        }
        Some(ClickCue {
            high_note: !self.showing_black,
        })
    }

    /// Bring the phase in line with a newly selected mode.
    ///
    /// `Off` resets everything; a mode that no longer strobes must not stay
    /// stuck on black.
    pub fn conform_to(&mut self, mode: BlinkMode) {
        if !mode.is_running() {
            self.reset();
        } else if !mode.strobes() {
            self.showing_black = false;
        }
    }
}
