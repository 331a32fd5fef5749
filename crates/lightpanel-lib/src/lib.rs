//! LightPanel — display-state engine for a full-screen light panel, strobe
//! and visual metronome.

pub mod audio;
pub mod blink;
pub mod clock;
pub mod color;
pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod mask;
pub mod resolver;
pub mod settings;
pub mod slots;
pub mod surface;

pub use error::LightPanelError;
