//! Integration tests: blink, rotation and mask sequences driven through the
//! public engine API with the mock audio backend and an in-memory store.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use lightpanel_lib::audio::mock::MockBackend;
use lightpanel_lib::clock::{BlinkClock, Tick};
use lightpanel_lib::color::Color;
use lightpanel_lib::engine::{Command, Engine, Startup};
use lightpanel_lib::mask::MaskShape;
use lightpanel_lib::resolver::RenderMode;
use lightpanel_lib::settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
use lightpanel_lib::surface::RenderFrame;

const GREEN: Color = Color::new(0, 255, 0);
/// Long enough that the real timer never fires during a test.
const MANUAL: u32 = 1000;

type TestEngine = Engine<MockBackend, MemoryStore>;

fn engine(commands: &[Command]) -> (TestEngine, Receiver<Tick>, MockBackend) {
    let backend = MockBackend::new();
    let (tx, rx) = mpsc::channel();
    let clock = BlinkClock::new(backend.clone(), tx);
    let mut e = Engine::load(MemoryStore::new(), clock, Startup::default()).unwrap();
    for cmd in commands {
        e.apply(cmd.clone()).unwrap();
    }
    (e, rx, backend)
}

/// Apply one tick from the running timer.
fn tick(e: &mut TestEngine) {
    let generation = e.clock().generation();
    e.apply(Command::Tick(Tick { generation })).unwrap();
}

// ── strobe and rotation ──

#[test]
fn strobe_and_rotate_alternates_color_and_black() {
    let (mut e, _rx, _b) = engine(&[
        Command::SetRotateColors(true),
        Command::SetStrobeEffect(true),
        Command::SetBlinkInterval(MANUAL),
    ]);
    let mut shown = Vec::new();
    for _ in 0..6 {
        shown.push(e.render().color);
        tick(&mut e);
    }
    assert_eq!(
        shown,
        vec![
            Color::RED,
            Color::BLACK,
            Color::BLUE,
            Color::BLACK,
            Color::RED,
            Color::BLACK
        ]
    );
}

#[test]
fn rotate_only_never_shows_black() {
    let (mut e, _rx, _b) = engine(&[
        Command::SetRotateColors(true),
        Command::SetBlinkInterval(MANUAL),
    ]);
    let mut shown = Vec::new();
    for _ in 0..4 {
        tick(&mut e);
        shown.push(e.render().color);
    }
    assert_eq!(shown, vec![Color::BLUE, Color::RED, Color::BLUE, Color::RED]);
}

#[test]
fn plain_strobe_flashes_selection() {
    let (mut e, _rx, backend) = engine(&[
        Command::SetSelection(GREEN),
        Command::SetBrightness(50),
        Command::SetBlinkInterval(MANUAL),
    ]);
    let mut shown = Vec::new();
    for _ in 0..4 {
        shown.push(e.render().color);
        tick(&mut e);
    }
    let dim_green = Color::new(0, 128, 0);
    assert_eq!(shown, vec![dim_green, Color::BLACK, dim_green, Color::BLACK]);
    assert_eq!(*backend.log.clicks.borrow(), vec![false, true, false, true]);
}

#[test]
fn stopping_resets_to_selection() {
    let (mut e, _rx, backend) = engine(&[
        Command::SetRotateColors(true),
        Command::SetStrobeEffect(true),
        Command::SetBlinkInterval(MANUAL),
    ]);
    tick(&mut e);
    tick(&mut e);
    tick(&mut e);
    e.apply(Command::SetBlinkInterval(0)).unwrap();
    assert_eq!(e.render().color, Color::WHITE);
    assert_eq!(backend.log.open_players(), 0);

    // Restarting begins the rotation from the first color again.
    e.apply(Command::SetBlinkInterval(MANUAL)).unwrap();
    assert_eq!(e.render().color, Color::RED);
}

// ── masks ──

#[test]
fn masks_rotate_once_per_strobe_cycle() {
    let (mut e, _rx, _b) = engine(&[
        Command::ToggleMask(MaskShape::Star),
        Command::ToggleMask(MaskShape::Circle),
        Command::SetBlinkInterval(MANUAL),
    ]);
    let mut shapes = Vec::new();
    for _ in 0..4 {
        shapes.push(e.state().current_mask());
        tick(&mut e);
    }
    assert_eq!(
        shapes,
        vec![
            MaskShape::Star,
            MaskShape::Star,
            MaskShape::Circle,
            MaskShape::Circle
        ]
    );
}

#[test]
fn masks_rest_on_first_shape_when_idle() {
    let (mut e, _rx, _b) = engine(&[
        Command::ToggleMask(MaskShape::Heart),
        Command::ToggleMask(MaskShape::Square),
        Command::SetBlinkInterval(MANUAL),
    ]);
    tick(&mut e);
    tick(&mut e);
    assert_eq!(e.state().current_mask(), MaskShape::Square);
    e.apply(Command::SetBlinkInterval(0)).unwrap();
    assert_eq!(e.state().current_mask(), MaskShape::Heart);
}

#[test]
fn triangle_mask_is_wider() {
    let (e, _rx, _b) = engine(&[
        Command::ToggleMask(MaskShape::Triangle),
        Command::SetMaskSize(50),
    ]);
    assert_eq!(e.render().mask_size_css().as_deref(), Some("60vmin 50vmin"));
}

// ── flag mode ──

#[test]
fn flag_mode_three_equal_bands_at_half_brightness() {
    let (e, _rx, _b) = engine(&[
        Command::AddCustomColor(GREEN),
        Command::SetFlagMode(true),
        Command::SetBrightness(50),
    ]);
    let d = e.render();
    let RenderMode::Gradient(g) = &d.mode else {
        panic!("expected a gradient, got {:?}", d.mode);
    };
    assert_eq!(g.bands.len(), 3);
    assert!((g.band_width_pct() - 100.0 / 3.0).abs() < 1e-9);
    let colors: Vec<Color> = g.bands.iter().map(|b| b.color).collect();
    assert_eq!(
        colors,
        vec![
            Color::new(128, 0, 0),
            Color::new(0, 0, 128),
            Color::new(0, 128, 0)
        ]
    );
}

#[test]
fn flag_mode_goes_black_with_the_strobe() {
    let (mut e, _rx, _b) = engine(&[
        Command::SetFlagMode(true),
        Command::SetBlinkInterval(MANUAL),
    ]);
    assert!(e.render().gradient().is_some());
    tick(&mut e);
    let d = e.render();
    assert_eq!(d.mode, RenderMode::Solid);
    assert_eq!(d.color, Color::BLACK);
}

#[test]
fn frame_for_painter() {
    let (e, _rx, _b) = engine(&[
        Command::SetFlagMode(true),
        Command::SetHorizontalSplit(true),
    ]);
    let frame = RenderFrame::from(&e.render());
    let css = frame.gradient_css.unwrap();
    assert!(css.starts_with("linear-gradient(to bottom, color(display-p3 1 0 0) 0%"));
    assert!(css.contains("50%, color(display-p3 0 0 1) 50%"));
}

// ── real timer ──

#[test]
fn real_timer_drives_the_engine() {
    let (mut e, rx, backend) = engine(&[Command::SetBlinkInterval(50)]);
    for _ in 0..3 {
        let t = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        e.apply(Command::Tick(t)).unwrap();
    }
    assert_eq!(e.state().phase().tick_index, 1);
    assert!(e.state().phase().showing_black);
    assert_eq!(backend.log.clicks.borrow().len(), 3);
    e.shutdown();
    assert_eq!(backend.log.open_players(), 0);
}

// ── persistence ──

#[test]
fn settings_survive_restart_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    {
        let (store, _) = JsonFileStore::open(&path);
        let (tx, _rx) = mpsc::channel();
        let clock = BlinkClock::new(MockBackend::new(), tx);
        let mut e = Engine::load(store, clock, Startup::default()).unwrap();
        e.apply(Command::AddCustomColor(GREEN)).unwrap();
        e.apply(Command::ToggleMask(MaskShape::HeartSolid)).unwrap();
        e.apply(Command::SetMuted(true)).unwrap();
        e.apply(Command::SetMaskSize(33)).unwrap();
    }

    let (store, warnings) = JsonFileStore::open(&path);
    assert!(warnings.is_empty());
    assert!(store.get_value("light-panel-muted").is_some());
    let s = Settings::load(&store);
    assert_eq!(s.custom_colors.as_slice(), &[Color::RED, Color::BLUE, GREEN]);
    assert_eq!(s.masks.rotation(), &[MaskShape::HeartSolid]);
    assert!(s.muted);
    assert_eq!(s.mask_size, 33);
}
