//! Mask shapes — selection set and rotation policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Extra width (in vmin percent) given to triangles so they do not read as
/// narrower than the other shapes.
pub const TRIANGLE_WIDTH_BONUS: u8 = 10;

pub const MIN_MASK_SIZE: u8 = 10;
pub const MAX_MASK_SIZE: u8 = 100;
pub const DEFAULT_MASK_SIZE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskShape {
    None,
    Circle,
    Square,
    Triangle,
    Star,
    Heart,
    HeartSolid,
}

impl MaskShape {
    pub const ALL: [MaskShape; 7] = [
        MaskShape::None,
        MaskShape::Circle,
        MaskShape::Square,
        MaskShape::Triangle,
        MaskShape::Star,
        MaskShape::Heart,
        MaskShape::HeartSolid,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            MaskShape::None => "none",
            MaskShape::Circle => "circle",
            MaskShape::Square => "square",
            MaskShape::Triangle => "triangle",
            MaskShape::Star => "star",
            MaskShape::Heart => "heart",
            MaskShape::HeartSolid => "heart-solid",
        }
    }
}

impl fmt::Display for MaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MaskShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MaskShape::ALL
            .into_iter()
            .find(|shape| shape.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let tags: Vec<&str> = MaskShape::ALL.iter().map(|m| m.tag()).collect();
                format!("unknown mask shape \"{s}\" (expected one of: {})", tags.join(", "))
            })
    }
}

/// Selected mask shapes in the order they were switched on.
///
/// Never empty: either exactly `[None]` or one or more distinct real shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskShapeSet {
    shapes: Vec<MaskShape>,
}

impl Default for MaskShapeSet {
    fn default() -> Self {
        MaskShapeSet {
            shapes: vec![MaskShape::None],
        }
    }
}

impl MaskShapeSet {
    /// Restore from stored tags, dropping unknown, duplicate or conflicting
    /// entries.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut set = MaskShapeSet::default();
        for tag in tags {
            match tag.as_ref().parse::<MaskShape>() {
                Ok(MaskShape::None) | Err(_) => {}
                Ok(shape) if set.contains(shape) => {}
                Ok(shape) => set.toggle(shape),
            }
        }
        set
    }

    /// Flip `shape` in or out of the set.
    ///
    /// `None` clears every other shape; any real shape removes `None`;
    /// removing the last real shape falls back to `[None]`.
    pub fn toggle(&mut self, shape: MaskShape) {
        if shape == MaskShape::None {
            self.shapes = vec![MaskShape::None];
            return;
        }
        if let Some(pos) = self.shapes.iter().position(|&s| s == shape) {
            self.shapes.remove(pos);
            if self.shapes.is_empty() {
                self.shapes.push(MaskShape::None);
            }
        } else {
            self.shapes.retain(|&s| s != MaskShape::None);
            self.shapes.push(shape);
        }
    }

    pub fn contains(&self, shape: MaskShape) -> bool {
        self.shapes.contains(&shape)
    }

    /// All selected tags, including `None` when nothing else is selected.
    pub fn shapes(&self) -> &[MaskShape] {
        &self.shapes
    }

    /// Real shapes to rotate through (the set minus `None`).
    pub fn rotation(&self) -> &[MaskShape] {
        if self.shapes == [MaskShape::None] {
            &[]
        } else {
            &self.shapes
        }
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.shapes.iter().map(|s| s.tag()).collect()
    }
}

/// Pick the shape to draw.
///
/// One shape is always shown as-is. Several shapes rotate with the blink
/// cycle counter while the clock runs and rest on the first one otherwise.
pub fn resolve_mask(set: &MaskShapeSet, tick_index: usize, running: bool) -> MaskShape {
    match set.rotation() {
        [] => MaskShape::None,
        [only] => *only,
        many if running => many[tick_index % many.len()],
        many => many[0],
    }
}

/// Clamp a requested mask size to the accepted range.
pub fn clamp_mask_size(pct: i64) -> u8 {
    pct.clamp(i64::from(MIN_MASK_SIZE), i64::from(MAX_MASK_SIZE)) as u8
}
