//! CLI subcommands — run the panel, inspect frames, edit persisted settings.

mod colors;
mod config_cmd;
mod mask;
mod presets;
mod resolve;
mod run;
mod toggle;

use std::path::PathBuf;
use std::sync::mpsc;

use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

pub(super) use crate::RUNNING;
pub(super) use lightpanel_lib::audio::{AudioBackend, NullBackend};
pub(super) use lightpanel_lib::blink::BlinkMode;
pub(super) use lightpanel_lib::clock::BlinkClock;
pub(super) use lightpanel_lib::color::{self, Color};
pub(super) use lightpanel_lib::config::Config;
pub(super) use lightpanel_lib::engine::{Command as EngineCommand, Engine, Startup};
pub(super) use lightpanel_lib::error::Result;
pub(super) use lightpanel_lib::mask::MaskShape;
pub(super) use lightpanel_lib::settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
pub(super) use lightpanel_lib::surface::RenderFrame;

const PADDING: usize = 2;

/// Global flags shared by every subcommand.
pub struct Options {
    pub json: bool,
    pub config_path: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub persist: bool,
}

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{out}");
    Ok(())
}

pub(super) fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

// ── argument parsers ──

pub(super) fn parse_color_arg(s: &str) -> std::result::Result<Color, String> {
    color::parse_color(s).map_err(|e| e.to_string())
}

// ── settings store ──

/// Settings backend chosen for this invocation.
pub(super) enum PanelStore {
    File(JsonFileStore),
    Memory(MemoryStore),
}

impl PanelStore {
    pub(super) fn describe(&self) -> String {
        match self {
            PanelStore::File(store) => store.path().display().to_string(),
            PanelStore::Memory(_) => "(in memory, not saved)".into(),
        }
    }
}

impl SettingsStore for PanelStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        match self {
            PanelStore::File(s) => s.get_value(key),
            PanelStore::Memory(s) => s.get_value(key),
        }
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        match self {
            PanelStore::File(s) => s.set_value(key, value),
            PanelStore::Memory(s) => s.set_value(key, value),
        }
    }
}

/// Load config from a custom path or the default location, logging any
/// parse or validation warnings.
pub(super) fn load_config(opts: &Options) -> Config {
    let (config, warnings) = match &opts.config_path {
        Some(path) => Config::load_from(path),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("[config] {w}");
    }
    if let Err(errors) = config.validate() {
        for e in &errors {
            log::warn!("[config] {e}");
        }
    }
    config
}

pub(super) fn settings_file(opts: &Options, config: &Config) -> Option<PathBuf> {
    opts.settings_path
        .clone()
        .or_else(|| config.settings_file())
}

pub(super) fn open_store(opts: &Options, config: &Config) -> PanelStore {
    if !opts.persist {
        return PanelStore::Memory(MemoryStore::new());
    }
    match settings_file(opts, config) {
        Some(path) => {
            let (store, warnings) = JsonFileStore::open(&path);
            for w in &warnings {
                log::warn!("[settings] {w}");
            }
            PanelStore::File(store)
        }
        None => {
            log::warn!("[settings] no config directory, changes will not be saved");
            PanelStore::Memory(MemoryStore::new())
        }
    }
}

/// Engine without audio whose clock is never started, for one-shot edits.
pub(super) type Editor = Engine<NullBackend, PanelStore>;

pub(super) fn open_editor(opts: &Options, config: &Config) -> Result<Editor> {
    let (tx, _rx) = mpsc::channel();
    let clock = BlinkClock::new(NullBackend, tx);
    let startup = Startup {
        blink_interval_ms: 0,
        ..config.startup()
    };
    Engine::load(open_store(opts, config), clock, startup)
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct FrameOutput {
    pub tick: u64,
    pub mode: BlinkMode,
    pub tick_index: usize,
    pub showing_black: bool,
    pub frame: RenderFrame,
}

#[derive(Serialize)]
pub(super) struct SlotJson {
    pub slot: usize,
    pub hex: String,
}

#[derive(Serialize)]
pub(super) struct ColorsOutput {
    pub count: usize,
    pub slots: Vec<SlotJson>,
}

#[derive(Serialize)]
pub(super) struct MaskOutput {
    pub shapes: Vec<&'static str>,
    pub size: u8,
    pub size_css: Option<String>,
}

#[derive(Serialize)]
pub(super) struct ToggleOutput {
    pub setting: String,
    pub enabled: bool,
}

#[derive(Serialize)]
pub(super) struct PresetJson {
    pub name: &'static str,
    pub hex: String,
}

#[derive(Serialize)]
pub(super) struct PersistedJson {
    pub custom_colors: Vec<String>,
    pub mask_shapes: Vec<&'static str>,
    pub mask_size: u8,
    pub muted: bool,
    pub rotate_colors: bool,
    pub strobe_effect: bool,
    pub flag_mode: bool,
    pub horizontal_split: bool,
}

impl From<&Settings> for PersistedJson {
    fn from(s: &Settings) -> Self {
        PersistedJson {
            custom_colors: s.custom_colors.as_slice().iter().map(|&c| color::to_hex(c)).collect(),
            mask_shapes: s.masks.tags(),
            mask_size: s.mask_size,
            muted: s.muted,
            rotate_colors: s.rotate_colors,
            strobe_effect: s.strobe_effect,
            flag_mode: s.flag_mode,
            horizontal_split: s.horizontal_split,
        }
    }
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings_file: Option<String>,
    pub settings_file_exists: bool,
    pub config: Config,
    pub persisted: PersistedJson,
}

// ── subcommands ──

#[derive(Subcommand)]
pub enum Command {
    /// Drive the panel: print one frame per blink tick (Ctrl+C to stop)
    Run {
        /// Start color (hex or preset name)
        #[arg(long, value_parser = parse_color_arg)]
        color: Option<Color>,
        /// Brightness percent (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,
        /// Blink interval in ms (0 = steady, otherwise 50-1000)
        #[arg(long)]
        interval: Option<u32>,
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
        /// Do not play clicks this session
        #[arg(long)]
        mute: bool,
    },

    /// Print the frame the panel shows for the current settings
    Resolve {
        /// Color to resolve (hex or preset name)
        #[arg(long, value_parser = parse_color_arg)]
        color: Option<Color>,
        /// Brightness percent (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        brightness: Option<u8>,
    },

    /// Manage custom color slots (default: list)
    Colors {
        #[command(subcommand)]
        action: Option<ColorsAction>,
    },

    /// Manage mask shapes (default: show)
    Mask {
        #[command(subcommand)]
        action: Option<MaskAction>,
    },

    /// Switch a saved toggle on or off
    Set {
        setting: Toggle,
        state: OnOff,
    },

    /// List preset colors
    Presets,

    /// Show configuration, settings file and saved values
    Config,
}

#[derive(Subcommand)]
pub enum ColorsAction {
    /// List custom colors
    List,
    /// Append a color
    Add {
        #[arg(value_parser = parse_color_arg)]
        color: Color,
    },
    /// Overwrite a slot (1-based)
    Set {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        slot: u8,
        #[arg(value_parser = parse_color_arg)]
        color: Color,
    },
    /// Remove a slot (1-based)
    Remove {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        slot: u8,
    },
    /// Restore the default colors
    Reset,
}

#[derive(Subcommand)]
pub enum MaskAction {
    /// Show selected shapes and size
    Show,
    /// Switch a shape on or off (none clears all)
    Toggle { shape: MaskShape },
    /// Set mask size in percent of the screen's smaller side (10-100)
    Size {
        #[arg(value_parser = clap::value_parser!(u8).range(10..=100))]
        percent: u8,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Toggle {
    /// Step through the custom colors while blinking
    Rotate,
    /// Black between colors while rotating
    Strobe,
    /// Show all custom colors as bands
    Flag,
    /// Stack flag bands top to bottom
    HorizontalSplit,
    /// Silence the metronome clicks
    Muted,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

pub fn run(cmd: Command, opts: &Options) -> Result<()> {
    match cmd {
        Command::Run {
            color,
            brightness,
            interval,
            ticks,
            mute,
        } => run::cmd_run(
            opts,
            run::RunArgs {
                color,
                brightness,
                interval,
                ticks,
                mute,
            },
        ),
        Command::Resolve { color, brightness } => resolve::cmd_resolve(opts, color, brightness),
        Command::Colors { action } => {
            colors::cmd_colors(opts, action.unwrap_or(ColorsAction::List))
        }
        Command::Mask { action } => mask::cmd_mask(opts, action.unwrap_or(MaskAction::Show)),
        Command::Set { setting, state } => {
            toggle::cmd_set(opts, setting, matches!(state, OnOff::On))
        }
        Command::Presets => presets::cmd_presets(opts.json),
        Command::Config => config_cmd::cmd_config(opts),
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        let w = kv_width(&["A:"], &["Very long indent key:"]);
        // 21 + PADDING + 2 = 25
        assert_eq!(w, 25);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Top:"], &["Indent:"]);
        let top = format_kv("Top:", "V", w);
        let indent = format!("  {:<width$}{}", "Indent:", "V", width = w - 2);
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_exact_width() {
        assert_eq!(format_kv("ExactWidth:", "val", 10), "ExactWidth:val");
    }

    #[test]
    fn on_off_labels() {
        assert_eq!(on_off(true), "on");
        assert_eq!(on_off(false), "off");
    }
}
