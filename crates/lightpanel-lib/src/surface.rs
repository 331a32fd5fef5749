//! Render surface seam — what a painter receives and how fullscreen
//! requests are made.

use serde::Serialize;

use crate::color;
use crate::error::Result;
use crate::mask::MaskShape;
use crate::resolver::RenderDescriptor;

/// One frame in the form a painter consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub color_string: String,
    pub hex: String,
    pub mask_shape: MaskShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_size_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_css: Option<String>,
}

impl From<&RenderDescriptor> for RenderFrame {
    fn from(d: &RenderDescriptor) -> Self {
        RenderFrame {
            color_string: d.color_string(),
            hex: color::to_hex(d.color),
            mask_shape: d.mask.map_or(MaskShape::None, |m| m.shape),
            mask_size_css: d.mask_size_css(),
            gradient_css: d.gradient_css(),
        }
    }
}

/// Paints frames.
pub trait RenderSurface {
    fn paint(&mut self, frame: &RenderFrame) -> Result<()>;
}

/// Fullscreen control offered by the host window.
pub trait Fullscreen {
    fn is_fullscreen(&self) -> bool;
    fn toggle(&mut self) -> Result<()>;
}

/// Toggle fullscreen. A rejected request is logged and leaves the state as
/// it was. Returns whether the toggle happened.
pub fn toggle_fullscreen(fs: &mut impl Fullscreen) -> bool {
    match fs.toggle() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[surface] fullscreen request rejected: {e}");
            false
        }
    }
}

pub mod mock {
    use super::*;
    use crate::error::LightPanelError;

    /// Surface that records every frame it is asked to paint.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub frames: Vec<RenderFrame>,
    }

    impl RenderSurface for RecordingSurface {
        fn paint(&mut self, frame: &RenderFrame) -> Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    /// Fullscreen host that can be told to refuse requests.
    #[derive(Debug, Default)]
    pub struct MockFullscreen {
        pub on: bool,
        pub reject: bool,
    }

    impl Fullscreen for MockFullscreen {
        fn is_fullscreen(&self) -> bool {
            self.on
        }

        fn toggle(&mut self) -> Result<()> {
            if self.reject {
                return Err(LightPanelError::Surface("permission denied".into()));
            }
            self.on = !self.on;
            Ok(())
        }
    }
}
