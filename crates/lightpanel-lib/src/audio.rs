//! Audio click collaborator — trait seam between the blink clock and a sound
//! backend.
//!
//! The engine never synthesises audio itself. It asks an [`AudioBackend`] to
//! open a [`ClickPlayer`] while the clock is running and requests one click
//! per tick. Nothing is opened or played while muted.

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum AudioError {
    InitFailed(String),
    PlaybackFailed(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::InitFailed(e) => write!(f, "Audio init failed: {e}"),
            AudioError::PlaybackFailed(e) => write!(f, "Audio playback failed: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

pub type Result<T> = std::result::Result<T, AudioError>;

/// Plays short metronome clicks on an open output.
pub trait ClickPlayer {
    fn play_click(&self, high_note: bool) -> Result<()>;
}

/// Opens click players. Dropping the player releases the output.
pub trait AudioBackend {
    type Player: ClickPlayer;

    fn open(&self) -> Result<Self::Player>;
}

/// Tone parameters shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneConfig {
    pub high_hz: f32,
    pub low_hz: f32,
    /// Peak amplitude, 0.0–1.0.
    pub volume: f32,
    /// Time for the envelope to decay to near-silence.
    pub decay: Duration,
}

impl Default for ToneConfig {
    fn default() -> Self {
        ToneConfig {
            high_hz: 600.0,
            low_hz: 300.0,
            volume: 0.3,
            decay: Duration::from_millis(20),
        }
    }
}

/// A single enveloped click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTone {
    pub frequency_hz: f32,
    pub volume: f32,
    pub decay: Duration,
}

impl ClickTone {
    pub fn for_note(high_note: bool, config: &ToneConfig) -> Self {
        ClickTone {
            frequency_hz: if high_note {
                config.high_hz
            } else {
                config.low_hz
            },
            volume: config.volume,
            decay: config.decay,
        }
    }
}

/// Backend for systems without an output device. Clicks are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[derive(Debug)]
pub struct NullPlayer;

impl ClickPlayer for NullPlayer {
    fn play_click(&self, _high_note: bool) -> Result<()> {
        Ok(())
    }
}

impl AudioBackend for NullBackend {
    type Player = NullPlayer;

    fn open(&self) -> Result<NullPlayer> {
        Ok(NullPlayer)
    }
}

pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Shared record of everything the mock backend was asked to do.
    #[derive(Debug, Default)]
    pub struct AudioLog {
        /// Number of successful `open` calls.
        pub opened: Cell<usize>,
        /// Number of players dropped.
        pub closed: Cell<usize>,
        /// Every click requested, in order (`true` = high note).
        pub clicks: RefCell<Vec<bool>>,
    }

    impl AudioLog {
        /// Players currently open.
        pub fn open_players(&self) -> usize {
            self.opened.get() - self.closed.get()
        }
    }

    /// Recording backend for unit tests. Clones share one [`AudioLog`].
    #[derive(Debug, Clone, Default)]
    pub struct MockBackend {
        pub log: Rc<AudioLog>,
        /// If true, `open` returns an error.
        pub fail_open: Rc<Cell<bool>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }
    }

    pub struct MockPlayer {
        log: Rc<AudioLog>,
    }

    impl ClickPlayer for MockPlayer {
        fn play_click(&self, high_note: bool) -> Result<()> {
            self.log.clicks.borrow_mut().push(high_note);
            Ok(())
        }
    }

    impl Drop for MockPlayer {
        fn drop(&mut self) {
            self.log.closed.set(self.log.closed.get() + 1);
        }
    }

    impl AudioBackend for MockBackend {
        type Player = MockPlayer;

        fn open(&self) -> Result<MockPlayer> {
            if self.fail_open.get() {
                return Err(AudioError::InitFailed("mock output unavailable".into()));
            }
            self.log.opened.set(self.log.opened.get() + 1);
            Ok(MockPlayer {
                log: Rc::clone(&self.log),
            })
        }
    }
}
