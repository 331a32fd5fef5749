//! Custom color slots — the user's saved colors, used for rotation and flag
//! mode.

use crate::color::Color;
use crate::error::{LightPanelError, Result};

pub const MIN_SLOTS: usize = 2;
pub const MAX_SLOTS: usize = 8;

/// Colors a fresh install starts with.
pub const DEFAULT_SLOTS: [Color; MIN_SLOTS] = [Color::RED, Color::BLUE];

/// Ordered custom colors, always between [`MIN_SLOTS`] and [`MAX_SLOTS`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomColors(Vec<Color>);

impl Default for CustomColors {
    fn default() -> Self {
        CustomColors(DEFAULT_SLOTS.to_vec())
    }
}

impl CustomColors {
    /// Build from an explicit list, rejecting lengths outside 2..=8.
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&colors.len()) {
            return Err(LightPanelError::Slots(format!(
                "need between {MIN_SLOTS} and {MAX_SLOTS} colors, got {}",
                colors.len()
            )));
        }
        Ok(CustomColors(colors))
    }

    /// Normalise a stored list. Accepts the legacy layout of four nullable
    /// slots: empty slots are dropped, the list is cut to [`MAX_SLOTS`] and
    /// topped up from [`DEFAULT_SLOTS`].
    pub fn from_stored(stored: Vec<Option<Color>>) -> Self {
        let mut colors: Vec<Color> = stored.into_iter().flatten().take(MAX_SLOTS).collect();
        if colors.len() < MIN_SLOTS {
            colors.extend_from_slice(&DEFAULT_SLOTS[colors.len()..]);
        }
        CustomColors(colors)
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.0.get(index).copied()
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_SLOTS
    }

    /// Append a color. Returns the index it landed at.
    pub fn add(&mut self, color: Color) -> Result<usize> {
        if self.is_full() {
            return Err(LightPanelError::Slots(format!(
                "all {MAX_SLOTS} slots are in use"
            )));
        }
        self.0.push(color);
        Ok(self.0.len() - 1)
    }

    pub fn update(&mut self, index: usize, color: Color) -> Result<()> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        *slot = color;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Color> {
        if index >= self.0.len() {
            return Err(out_of_range(index, self.0.len()));
        }
        if self.0.len() <= MIN_SLOTS {
            return Err(LightPanelError::Slots(format!(
                "at least {MIN_SLOTS} colors must remain"
            )));
        }
        Ok(self.0.remove(index))
    }

    pub fn reset(&mut self) {
        *self = CustomColors::default();
    }
}

fn out_of_range(index: usize, len: usize) -> LightPanelError {
    LightPanelError::Slots(format!("slot {} does not exist ({len} slots)", index + 1))
}
