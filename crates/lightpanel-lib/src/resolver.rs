//! Display state resolver — folds selection, custom colors, config, blink
//! phase and mask into one render descriptor.
//!
//! Pure: no clock, no I/O. Colors are resolved top-down:
//!
//! 1. blinking and in the black half of a strobe cycle → black
//! 2. blinking with rotation and at least one custom color →
//!    `custom[tick_index % len]`
//! 3. otherwise the selected color
//!
//! and then brightness-scaled. Flag mode replaces the background with bands
//! of every custom color, but masks always use the single resolved color.

use crate::blink::BlinkPhase;
use crate::color::{self, Color};
use crate::engine::EngineConfig;
use crate::mask::{MaskShape, TRIANGLE_WIDTH_BONUS};

/// Which way flag-mode bands run.
///
/// `horizontal_split = true` stacks horizontal stripes top to bottom;
/// `false` lays vertical stripes out left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandDirection {
    TopToBottom,
    LeftToRight,
}

impl BandDirection {
    pub fn from_horizontal_split(horizontal_split: bool) -> Self {
        if horizontal_split {
            BandDirection::TopToBottom
        } else {
            BandDirection::LeftToRight
        }
    }

    fn css(self) -> &'static str {
        match self {
            BandDirection::TopToBottom => "to bottom",
            BandDirection::LeftToRight => "to right",
        }
    }
}

/// One hard-edged band of a flag gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub color: Color,
    pub start_pct: f64,
    pub end_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub direction: BandDirection,
    pub bands: Vec<Band>,
}

impl Gradient {
    /// Equal-width bands, each color brightness-scaled on its own.
    pub fn flag(colors: &[Color], brightness: u8, direction: BandDirection) -> Self {
        let width = 100.0 / colors.len() as f64;
        let bands = colors
            .iter()
            .enumerate()
            .map(|(i, &c)| Band {
                color: color::scale_brightness(c, brightness),
                start_pct: width * i as f64,
                end_pct: width * (i + 1) as f64,
            })
            .collect();
        Gradient { direction, bands }
    }

    pub fn band_width_pct(&self) -> f64 {
        self.bands
            .first()
            .map(|b| b.end_pct - b.start_pct)
            .unwrap_or(0.0)
    }

    /// CSS `linear-gradient` with a hard stop at every band edge.
    pub fn css(&self) -> String {
        let stops: Vec<String> = self
            .bands
            .iter()
            .map(|b| {
                let c = color::to_color_string(b.color);
                format!("{c} {}%, {c} {}%", fmt_pct(b.start_pct), fmt_pct(b.end_pct))
            })
            .collect();
        format!("linear-gradient({}, {})", self.direction.css(), stops.join(", "))
    }
}

/// Up to four decimals, trailing zeros dropped.
fn fmt_pct(v: f64) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    Solid,
    Gradient(Gradient),
}

/// Mask outline size as percentages of the viewport's smaller side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskGeometry {
    pub shape: MaskShape,
    pub width_pct: u8,
    pub height_pct: u8,
}

impl MaskGeometry {
    /// `None` when `shape` is [`MaskShape::None`].
    pub fn new(shape: MaskShape, size_pct: u8) -> Option<Self> {
        let width_pct = match shape {
            MaskShape::None => return None,
            MaskShape::Triangle => size_pct.saturating_add(TRIANGLE_WIDTH_BONUS),
            _ => size_pct,
        };
        Some(MaskGeometry {
            shape,
            width_pct,
            height_pct: size_pct,
        })
    }

    pub fn size_css(&self) -> String {
        format!("{}vmin {}vmin", self.width_pct, self.height_pct)
    }
}

/// Everything a surface needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDescriptor {
    /// Brightness-scaled color of the solid fill and of the mask.
    pub color: Color,
    pub mode: RenderMode,
    pub mask: Option<MaskGeometry>,
}

impl RenderDescriptor {
    pub fn color_string(&self) -> String {
        color::to_color_string(self.color)
    }

    pub fn gradient(&self) -> Option<&Gradient> {
        match &self.mode {
            RenderMode::Gradient(g) => Some(g),
            RenderMode::Solid => None,
        }
    }

    pub fn gradient_css(&self) -> Option<String> {
        self.gradient().map(Gradient::css)
    }

    pub fn mask_size_css(&self) -> Option<String> {
        self.mask.map(|m| m.size_css())
    }
}

/// Resolve the frame for the given state.
pub fn resolve(
    selection: Color,
    custom_colors: &[Color],
    config: &EngineConfig,
    phase: &BlinkPhase,
    mask: MaskShape,
) -> RenderDescriptor {
    let blinking = config.blink_interval_ms > 0;
    let black_phase = blinking && phase.showing_black;

    let base = if black_phase {
        Color::BLACK
    } else if blinking && config.rotate_colors && !custom_colors.is_empty() {
        custom_colors[phase.tick_index % custom_colors.len()]
    } else {
        selection
    };
    let color = color::scale_brightness(base, config.brightness);

    let mode = if config.flag_mode && custom_colors.len() >= 2 && !black_phase {
        RenderMode::Gradient(Gradient::flag(
            custom_colors,
            config.brightness,
            BandDirection::from_horizontal_split(config.horizontal_split),
        ))
    } else {
        RenderMode::Solid
    };

    RenderDescriptor {
        color,
        mode,
        mask: MaskGeometry::new(mask, config.mask_size),
    }
}
