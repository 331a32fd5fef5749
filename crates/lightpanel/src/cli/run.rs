//! `run` subcommand — drive the engine and paint one frame per blink tick.

use std::io::IsTerminal;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use lightpanel_lib::surface::RenderSurface;

use super::{
    AudioBackend, BlinkClock, Color, Config, Engine, EngineCommand, FrameOutput, NullBackend,
    Options, RUNNING, RenderFrame, Result, SettingsStore, Startup, color, on_off, open_store,
};
use crate::sound::RodioBackend;

/// How often the loop wakes to check for Ctrl+C while waiting for a tick.
const POLL: Duration = Duration::from_millis(100);

pub(super) struct RunArgs {
    pub color: Option<Color>,
    pub brightness: Option<u8>,
    pub interval: Option<u32>,
    pub ticks: Option<u64>,
    pub mute: bool,
}

/// Prints frames to stdout: one JSON object per line, or a text line with a
/// true-color swatch when stdout is a terminal.
struct TerminalSurface {
    json: bool,
    swatch: bool,
    painted: u64,
}

impl TerminalSurface {
    fn new(json: bool) -> Self {
        TerminalSurface {
            json,
            swatch: !json && std::io::stdout().is_terminal(),
            painted: 0,
        }
    }

    /// Paint the engine's current frame. JSON lines also carry the phase.
    fn paint_engine<B: AudioBackend, S: SettingsStore>(
        &mut self,
        engine: &Engine<B, S>,
    ) -> Result<()> {
        let frame = RenderFrame::from(&engine.render());
        if !self.json {
            return self.paint(&frame);
        }
        let state = engine.state();
        let output = FrameOutput {
            tick: self.painted,
            mode: state.mode(),
            tick_index: state.phase().tick_index,
            showing_black: state.phase().showing_black,
            frame,
        };
        let line = serde_json::to_string(&output).map_err(std::io::Error::from)?;
        println!("{line}");
        self.painted += 1;
        Ok(())
    }
}

impl RenderSurface for TerminalSurface {
    fn paint(&mut self, frame: &RenderFrame) -> Result<()> {
        let mut line = format!("{:>5}  ", self.painted);
        if self.swatch {
            let c = color::from_hex(&frame.hex);
            line.push_str(&format!("\x1b[48;2;{};{};{}m      \x1b[0m  ", c.r, c.g, c.b));
        }
        line.push_str(&frame.hex);
        if let Some(size) = &frame.mask_size_css {
            line.push_str(&format!("  mask {} ({size})", frame.mask_shape));
        }
        if frame.gradient_css.is_some() {
            line.push_str("  flag");
        }
        println!("{line}");
        self.painted += 1;
        Ok(())
    }
}

pub(super) fn cmd_run(opts: &Options, args: RunArgs) -> Result<()> {
    let config = super::load_config(opts);
    let mut startup = config.startup();
    if let Some(c) = args.color {
        startup.selection = c;
    }
    if let Some(b) = args.brightness {
        startup.brightness = b;
    }
    if let Some(ms) = args.interval {
        startup.blink_interval_ms = ms;
    }

    if args.mute {
        drive(opts, &config, startup, NullBackend, args.ticks)
    } else {
        let backend = RodioBackend::new(config.tone());
        drive(opts, &config, startup, backend, args.ticks)
    }
}

fn drive<B: AudioBackend>(
    opts: &Options,
    config: &Config,
    startup: Startup,
    backend: B,
    max_ticks: Option<u64>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let clock = BlinkClock::new(backend, tx);
    let mut engine = Engine::load(open_store(opts, config), clock, startup)?;
    let mut surface = TerminalSurface::new(opts.json);

    if !opts.json {
        let state = engine.state();
        println!(
            "LightPanel: {} at {}%, blink: {}, muted: {}",
            color::to_hex(state.selection()),
            state.config().brightness,
            state.mode(),
            on_off(state.muted()),
        );
        println!("Press Ctrl+C to exit.");
        println!();
    }

    surface.paint_engine(&engine)?;

    if !engine.state().mode().is_running() && max_ticks.is_some() {
        return Ok(());
    }

    let mut seen = 0u64;
    while RUNNING.load(Ordering::SeqCst) {
        if max_ticks.is_some_and(|n| seen >= n) {
            break;
        }
        match rx.recv_timeout(POLL) {
            Ok(tick) => {
                if !engine.clock().accepts(tick) {
                    continue;
                }
                if let Err(e) = engine.apply(EngineCommand::Tick(tick)) {
                    log::warn!("[audio] {e}, continuing without clicks");
                }
                seen += 1;
                surface.paint_engine(&engine)?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    engine.shutdown();
    Ok(())
}
