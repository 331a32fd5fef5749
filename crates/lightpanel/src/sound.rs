//! Metronome clicks through rodio.
//!
//! Each click is a short sine burst with an exponential decay envelope,
//! synthesised on the fly and handed straight to the output stream.

use std::f32::consts::TAU;
use std::time::Duration;

use lightpanel_lib::audio::{AudioBackend, AudioError, ClickPlayer, ClickTone, Result, ToneConfig};
use rodio::{OutputStream, OutputStreamHandle, Source};

const SAMPLE_RATE: u32 = 48_000;
/// Level the envelope decays to by the end of the click.
const FLOOR: f32 = 0.001;

/// Enveloped sine burst.
pub(crate) struct ClickSource {
    frequency_hz: f32,
    volume: f32,
    decay_secs: f32,
    position: u32,
    len: u32,
}

impl ClickSource {
    pub(crate) fn new(tone: ClickTone) -> Self {
        let decay_secs = tone.decay.as_secs_f32();
        ClickSource {
            frequency_hz: tone.frequency_hz,
            volume: tone.volume.clamp(0.0, 1.0),
            decay_secs,
            position: 0,
            len: u32::try_from(tone.decay.as_micros() * u128::from(SAMPLE_RATE) / 1_000_000)
                .unwrap_or(u32::MAX),
        }
    }

    fn envelope(&self, t: f32) -> f32 {
        if self.volume <= FLOOR || self.decay_secs <= 0.0 {
            return 0.0;
        }
        self.volume * (FLOOR / self.volume).powf(t / self.decay_secs)
    }
}

impl Iterator for ClickSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.len {
            return None;
        }
        let t = self.position as f32 / SAMPLE_RATE as f32;
        self.position += 1;
        Some(self.envelope(t) * (TAU * self.frequency_hz * t).sin())
    }
}

impl Source for ClickSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.len - self.position) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_micros(
            u64::from(self.len) * 1_000_000 / u64::from(SAMPLE_RATE),
        ))
    }
}

/// Opens the default output device on demand.
pub(crate) struct RodioBackend {
    tone: ToneConfig,
}

impl RodioBackend {
    pub(crate) fn new(tone: ToneConfig) -> Self {
        RodioBackend { tone }
    }
}

/// Open output stream. Dropping it closes the device.
pub(crate) struct RodioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    tone: ToneConfig,
}

impl AudioBackend for RodioBackend {
    type Player = RodioPlayer;

    fn open(&self) -> Result<RodioPlayer> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AudioError::InitFailed(format!("no audio output: {e}")))?;
        Ok(RodioPlayer {
            _stream: stream,
            handle,
            tone: self.tone.clone(),
        })
    }
}

impl ClickPlayer for RodioPlayer {
    fn play_click(&self, high_note: bool) -> Result<()> {
        let source = ClickSource::new(ClickTone::for_note(high_note, &self.tone));
        self.handle
            .play_raw(source)
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))
    }
}
