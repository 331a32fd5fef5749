//! Unified error type for the lightpanel-lib crate.
//!
//! [`LightPanelError`] wraps module-specific errors (`AudioError`) and the
//! engine's own error kinds (`Timer`, `Store`, `Color`, `Slots`, `Surface`).
//! `From` impls allow `?` to propagate across module boundaries seamlessly.
//!
//! Most failure modes in the engine degrade to a default instead of
//! surfacing here; these variants cover operator input and resource
//! acquisition.

use std::fmt;

use crate::audio::AudioError;

/// Unified error type for lightpanel-lib operations.
#[derive(Debug)]
pub enum LightPanelError {
    /// Audio output could not be opened or a click could not be queued.
    Audio(AudioError),
    /// The blink timer thread could not be spawned.
    Timer(std::io::Error),
    /// Standard I/O error (settings or config persistence).
    Io(std::io::Error),
    /// Settings store could not encode a value.
    Store(String),
    /// Color parsing error.
    Color(String),
    /// Custom color slot operation rejected (list full, too short, bad index).
    Slots(String),
    /// The render surface refused a request (paint, fullscreen).
    Surface(String),
}

impl fmt::Display for LightPanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightPanelError::Audio(e) => write!(f, "{e}"),
            LightPanelError::Timer(e) => write!(f, "Timer error: {e}"),
            LightPanelError::Io(e) => write!(f, "I/O error: {e}"),
            LightPanelError::Store(e) => write!(f, "Settings error: {e}"),
            LightPanelError::Color(e) => write!(f, "Color error: {e}"),
            LightPanelError::Slots(e) => write!(f, "Custom colors: {e}"),
            LightPanelError::Surface(e) => write!(f, "Surface error: {e}"),
        }
    }
}

impl std::error::Error for LightPanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LightPanelError::Audio(e) => Some(e),
            LightPanelError::Timer(e) => Some(e),
            LightPanelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AudioError> for LightPanelError {
    fn from(e: AudioError) -> Self {
        LightPanelError::Audio(e)
    }
}

impl From<std::io::Error> for LightPanelError {
    fn from(e: std::io::Error) -> Self {
        LightPanelError::Io(e)
    }
}

/// Crate-level Result alias using [`LightPanelError`].
pub type Result<T> = std::result::Result<T, LightPanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_audio_error() {
        let e: LightPanelError = AudioError::InitFailed("no device".into()).into();
        assert!(matches!(
            e,
            LightPanelError::Audio(AudioError::InitFailed(_))
        ));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: LightPanelError = io_err.into();
        assert!(matches!(e, LightPanelError::Io(_)));
    }

    #[test]
    fn display_audio_error() {
        let e = LightPanelError::Audio(AudioError::InitFailed("no device".into()));
        assert_eq!(e.to_string(), "Audio init failed: no device");
    }

    #[test]
    fn display_color_error() {
        let e = LightPanelError::Color("bad hex".into());
        assert_eq!(e.to_string(), "Color error: bad hex");
    }

    #[test]
    fn display_slots_error() {
        let e = LightPanelError::Slots("list is full".into());
        assert_eq!(e.to_string(), "Custom colors: list is full");
    }

    #[test]
    fn source_chains_timer_error() {
        let e = LightPanelError::Timer(std::io::Error::other("thread limit"));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("thread limit"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = LightPanelError::Store("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_audio_to_lightpanel() {
        fn inner() -> crate::audio::Result<()> {
            Err(AudioError::PlaybackFailed("stream closed".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(
            err,
            LightPanelError::Audio(AudioError::PlaybackFailed(_))
        ));
    }
}
