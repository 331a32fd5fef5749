//! Engine — the single owner of panel state and the one place it changes.
//!
//! Every user action and every timer tick arrives as a [`Command`] through
//! [`Engine::apply`]. The engine keeps the [`BlinkClock`] in step with the
//! configured interval, persists the keys a command touched and resolves the
//! frame on demand. Persistence failures are logged and never undo the
//! in-memory change.

use std::time::Duration;

use serde::Serialize;

use crate::audio::AudioBackend;
use crate::blink::{self, BlinkMode, BlinkPhase};
use crate::clock::{BlinkClock, Tick};
use crate::color::{self, Color};
use crate::error::{LightPanelError, Result};
use crate::mask::{self, MaskShape, MaskShapeSet};
use crate::resolver::{self, RenderDescriptor};
use crate::settings::{Settings, SettingsStore, keys};
use crate::slots::CustomColors;

/// Render-affecting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// 0-100.
    pub brightness: u8,
    /// 0 = not blinking, otherwise 50-1000.
    pub blink_interval_ms: u32,
    pub rotate_colors: bool,
    pub strobe_effect: bool,
    pub flag_mode: bool,
    pub horizontal_split: bool,
    /// 10-100, percent of the viewport's smaller side.
    pub mask_size: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            brightness: 100,
            blink_interval_ms: 0,
            rotate_colors: false,
            strobe_effect: false,
            flag_mode: false,
            horizontal_split: false,
            mask_size: mask::DEFAULT_MASK_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn blink_mode(&self) -> BlinkMode {
        BlinkMode::from_config(self.blink_interval_ms, self.rotate_colors, self.strobe_effect)
    }
}

/// Values the session starts with that are not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Startup {
    pub selection: Color,
    pub brightness: u8,
    pub blink_interval_ms: u32,
}

impl Default for Startup {
    fn default() -> Self {
        Startup {
            selection: Color::WHITE,
            brightness: 100,
            blink_interval_ms: 0,
        }
    }
}

/// One RGB channel of the selection, as set by a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// Every way the panel state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSelection(Color),
    SetChannel(Channel, u8),
    /// Select a preset by name (case-insensitive).
    SelectPreset(String),
    /// Select the color stored in a custom slot.
    SelectCustom(usize),
    /// Overwrite a custom slot with the current selection (long press).
    SaveSelectionToSlot(usize),
    AddCustomColor(Color),
    UpdateCustomColor(usize, Color),
    RemoveCustomColor(usize),
    ResetCustomColors,
    SetBrightness(u8),
    SetBlinkInterval(u32),
    SetRotateColors(bool),
    SetStrobeEffect(bool),
    SetFlagMode(bool),
    SetHorizontalSplit(bool),
    SetMuted(bool),
    ToggleMask(MaskShape),
    SetMaskSize(i64),
    Tick(Tick),
}

/// The single owned panel state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    selection: Color,
    custom_colors: CustomColors,
    config: EngineConfig,
    masks: MaskShapeSet,
    muted: bool,
    phase: BlinkPhase,
    mode: BlinkMode,
}

impl EngineState {
    fn new(settings: Settings, startup: Startup) -> Self {
        let config = EngineConfig {
            brightness: startup.brightness.min(100),
            blink_interval_ms: 0,
            rotate_colors: settings.rotate_colors,
            strobe_effect: settings.strobe_effect,
            flag_mode: settings.flag_mode,
            horizontal_split: settings.horizontal_split,
            mask_size: settings.mask_size,
        };
        EngineState {
            selection: startup.selection,
            custom_colors: settings.custom_colors,
            config,
            masks: settings.masks,
            muted: settings.muted,
            phase: BlinkPhase::default(),
            mode: config.blink_mode(),
        }
    }

    pub fn selection(&self) -> Color {
        self.selection
    }

    pub fn custom_colors(&self) -> &CustomColors {
        &self.custom_colors
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn masks(&self) -> &MaskShapeSet {
        &self.masks
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn mode(&self) -> BlinkMode {
        self.mode
    }

    /// Mask shape visible right now.
    pub fn current_mask(&self) -> MaskShape {
        mask::resolve_mask(&self.masks, self.phase.tick_index, self.mode.is_running())
    }

    pub fn render(&self) -> RenderDescriptor {
        resolver::resolve(
            self.selection,
            self.custom_colors.as_slice(),
            &self.config,
            &self.phase,
            self.current_mask(),
        )
    }

    /// Recompute the blink mode after a config change.
    fn refresh_mode(&mut self) {
        self.mode = self.config.blink_mode();
        self.phase.conform_to(self.mode);
    }
}

/// Controller tying state, clock and persistence together.
pub struct Engine<B: AudioBackend, S: SettingsStore> {
    state: EngineState,
    clock: BlinkClock<B>,
    store: S,
}

impl<B: AudioBackend, S: SettingsStore> Engine<B, S> {
    /// Restore persisted settings from `store` and start the clock if
    /// `startup` asks for blinking.
    pub fn load(store: S, clock: BlinkClock<B>, startup: Startup) -> Result<Self> {
        let settings = Settings::load(&store);
        let mut engine = Engine {
            state: EngineState::new(settings, startup),
            clock,
            store,
        };
        engine.set_blink_interval(startup.blink_interval_ms)?;
        Ok(engine)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn clock(&self) -> &BlinkClock<B> {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn render(&self) -> RenderDescriptor {
        self.state.render()
    }

    /// Apply one command.
    ///
    /// On error the state is left as it was before the command, with two
    /// exceptions. A tick whose click failed has already advanced the phase,
    /// and a timer that fails to start leaves blinking off.
    pub fn apply(&mut self, cmd: Command) -> Result<()> {
        if !matches!(cmd, Command::Tick(_)) {
            log::debug!("[engine] {cmd:?}");
        }
        match cmd {
            Command::Tick(tick) => return self.on_tick(tick),
            Command::SetSelection(c) => self.state.selection = c,
            Command::SetChannel(channel, value) => {
                let sel = &mut self.state.selection;
                match channel {
                    Channel::Red => sel.r = value,
                    Channel::Green => sel.g = value,
                    Channel::Blue => sel.b = value,
                }
            }
            Command::SelectPreset(name) => {
                self.state.selection = color::preset(&name).ok_or_else(|| {
                    LightPanelError::Color(format!("unknown preset \"{name}\""))
                })?;
            }
            Command::SelectCustom(index) => {
                let colors = &self.state.custom_colors;
                self.state.selection = colors.get(index).ok_or_else(|| {
                    LightPanelError::Slots(format!(
                        "slot {} does not exist ({} slots)",
                        index + 1,
                        colors.len()
                    ))
                })?;
            }
            Command::SaveSelectionToSlot(index) => {
                self.state.custom_colors.update(index, self.state.selection)?;
                self.persist_custom_colors();
            }
            Command::AddCustomColor(c) => {
                self.state.custom_colors.add(c)?;
                self.persist_custom_colors();
            }
            Command::UpdateCustomColor(index, c) => {
                self.state.custom_colors.update(index, c)?;
                self.persist_custom_colors();
            }
            Command::RemoveCustomColor(index) => {
                self.state.custom_colors.remove(index)?;
                self.persist_custom_colors();
            }
            Command::ResetCustomColors => {
                self.state.custom_colors.reset();
                self.persist_custom_colors();
            }
            Command::SetBrightness(pct) => self.state.config.brightness = pct.min(100),
            Command::SetBlinkInterval(ms) => self.set_blink_interval(ms)?,
            Command::SetRotateColors(on) => {
                self.state.config.rotate_colors = on;
                self.state.refresh_mode();
                self.persist(keys::ROTATE_COLORS, &on);
            }
            Command::SetStrobeEffect(on) => {
                self.state.config.strobe_effect = on;
                self.state.refresh_mode();
                self.persist(keys::STROBE_EFFECT, &on);
            }
            Command::SetFlagMode(on) => {
                self.state.config.flag_mode = on;
                self.persist(keys::FLAG_MODE, &on);
            }
            Command::SetHorizontalSplit(on) => {
                self.state.config.horizontal_split = on;
                self.persist(keys::HORIZONTAL_SPLIT, &on);
            }
            Command::SetMuted(on) => {
                self.state.muted = on;
                if on {
                    self.clock.release_audio();
                }
                self.persist(keys::MUTED, &on);
            }
            Command::ToggleMask(shape) => {
                self.state.masks.toggle(shape);
                let tags = self.state.masks.tags();
                self.persist(keys::MASK_SHAPES, &tags);
            }
            Command::SetMaskSize(pct) => {
                let size = mask::clamp_mask_size(pct);
                self.state.config.mask_size = size;
                self.persist(keys::MASK_SIZE, &size);
            }
        }
        Ok(())
    }

    /// Stop blinking and release audio. The engine stays usable.
    pub fn shutdown(&mut self) {
        self.stop_blinking();
    }

    /// Stop the clock and return to the steady display.
    fn stop_blinking(&mut self) {
        self.clock.stop();
        self.state.config.blink_interval_ms = 0;
        self.state.phase.reset();
        self.state.refresh_mode();
    }

    fn on_tick(&mut self, tick: Tick) -> Result<()> {
        if !self.clock.accepts(tick) {
            log::trace!("[engine] ignoring stale tick (generation {})", tick.generation);
            return Ok(());
        }
        let Some(cue) = self.state.phase.advance(self.state.mode) else {
            return Ok(());
        };
        if self.state.muted {
            return Ok(());
        }
        self.clock.click(cue.high_note)
    }

    fn set_blink_interval(&mut self, ms: u32) -> Result<()> {
        let interval = blink::normalize_interval(ms);
        let was_running = self.state.config.blink_interval_ms > 0;

        if interval == 0 {
            self.stop_blinking();
            return Ok(());
        }
        if was_running
            && interval == self.state.config.blink_interval_ms
            && self.clock.is_running()
        {
            return Ok(());
        }

        if let Err(e) = self
            .clock
            .start(Duration::from_millis(u64::from(interval)))
        {
            self.state.config.blink_interval_ms = 0;
            self.state.phase.reset();
            self.state.refresh_mode();
            return Err(e);
        }
        if !was_running {
            self.state.phase.reset();
        }
        self.state.config.blink_interval_ms = interval;
        self.state.refresh_mode();
        Ok(())
    }

    fn persist_custom_colors(&mut self) {
        let colors = self.state.custom_colors.as_slice().to_vec();
        self.persist(keys::CUSTOM_COLORS, &colors);
    }

    fn persist<T: Serialize>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("[settings] could not save {key}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockBackend;
    use crate::settings::MemoryStore;
    use serde_json::{Value, json};
    use std::sync::mpsc::{self, Receiver};

    const GREEN: Color = Color::new(0, 255, 0);

    type TestEngine<S> = Engine<MockBackend, S>;

    fn engine_with<S: SettingsStore>(
        store: S,
        startup: Startup,
    ) -> (TestEngine<S>, Receiver<Tick>, MockBackend) {
        let backend = MockBackend::new();
        let (tx, rx) = mpsc::channel();
        let clock = BlinkClock::new(backend.clone(), tx);
        let engine = Engine::load(store, clock, startup).unwrap();
        (engine, rx, backend)
    }

    fn engine() -> (TestEngine<MemoryStore>, Receiver<Tick>, MockBackend) {
        engine_with(MemoryStore::new(), Startup::default())
    }

    /// A tick carrying the running clock's generation.
    fn current_tick<S: SettingsStore>(e: &TestEngine<S>) -> Command {
        Command::Tick(Tick {
            generation: e.clock().generation(),
        })
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl SettingsStore for ReadOnlyStore {
        fn get_value(&self, _key: &str) -> Option<Value> {
            None
        }
        fn set_value(&mut self, key: &str, _value: Value) -> Result<()> {
            Err(LightPanelError::Store(format!("{key}: read-only")))
        }
    }

    #[test]
    fn load_uses_defaults_and_startup() {
        let (e, _rx, _b) = engine_with(
            MemoryStore::new(),
            Startup {
                selection: GREEN,
                brightness: 200,
                blink_interval_ms: 0,
            },
        );
        let s = e.state();
        assert_eq!(s.selection(), GREEN);
        assert_eq!(s.config().brightness, 100);
        assert_eq!(s.custom_colors(), &CustomColors::default());
        assert_eq!(s.mode(), BlinkMode::Off);
        assert!(!e.clock().is_running());
    }

    #[test]
    fn load_restores_persisted_settings() {
        let mut store = MemoryStore::new();
        store.set_value(keys::ROTATE_COLORS, json!(true)).unwrap();
        store.set_value(keys::MUTED, json!(true)).unwrap();
        store.set_value(keys::MASK_SHAPES, json!(["star"])).unwrap();
        let (e, _rx, _b) = engine_with(
            store,
            Startup {
                blink_interval_ms: 5000,
                ..Startup::default()
            },
        );
        let s = e.state();
        assert!(s.muted());
        assert_eq!(s.config().blink_interval_ms, 1000);
        assert_eq!(s.mode(), BlinkMode::RotateOnly);
        assert_eq!(s.current_mask(), MaskShape::Star);
        assert!(e.clock().is_running());
    }

    #[test]
    fn selection_commands() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetChannel(Channel::Green, 10)).unwrap();
        assert_eq!(e.state().selection(), Color::new(255, 10, 255));
        e.apply(Command::SelectPreset("orange".into())).unwrap();
        assert_eq!(e.state().selection(), Color::new(255, 165, 0));
        e.apply(Command::SelectCustom(1)).unwrap();
        assert_eq!(e.state().selection(), Color::BLUE);
    }

    #[test]
    fn failed_commands_leave_state_alone() {
        let (mut e, _rx, _b) = engine();
        let before = e.state().clone();
        assert!(e.apply(Command::SelectPreset("mauve".into())).is_err());
        assert!(e.apply(Command::SelectCustom(5)).is_err());
        assert!(e.apply(Command::RemoveCustomColor(0)).is_err());
        assert!(e.apply(Command::UpdateCustomColor(2, GREEN)).is_err());
        assert_eq!(e.state(), &before);
        assert!(e.store().get_value(keys::CUSTOM_COLORS).is_none());
    }

    #[test]
    fn save_selection_overwrites_slot_and_persists() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetSelection(GREEN)).unwrap();
        e.apply(Command::SaveSelectionToSlot(0)).unwrap();
        assert_eq!(e.state().custom_colors().as_slice(), &[GREEN, Color::BLUE]);
        let stored = Settings::load(e.store());
        assert_eq!(stored.custom_colors.as_slice(), &[GREEN, Color::BLUE]);
    }

    #[test]
    fn slot_edits_persist() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::AddCustomColor(GREEN)).unwrap();
        e.apply(Command::RemoveCustomColor(0)).unwrap();
        assert_eq!(
            Settings::load(e.store()).custom_colors.as_slice(),
            &[Color::BLUE, GREEN]
        );
        e.apply(Command::ResetCustomColors).unwrap();
        assert_eq!(
            Settings::load(e.store()).custom_colors,
            CustomColors::default()
        );
    }

    #[test]
    fn toggles_and_mask_persist() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetFlagMode(true)).unwrap();
        e.apply(Command::SetHorizontalSplit(true)).unwrap();
        e.apply(Command::ToggleMask(MaskShape::Heart)).unwrap();
        e.apply(Command::ToggleMask(MaskShape::Circle)).unwrap();
        e.apply(Command::SetMaskSize(5)).unwrap();
        let stored = Settings::load(e.store());
        assert!(stored.flag_mode);
        assert!(stored.horizontal_split);
        assert_eq!(stored.masks.rotation(), &[MaskShape::Heart, MaskShape::Circle]);
        assert_eq!(stored.mask_size, 10);
        assert_eq!(e.state().config().mask_size, 10);
    }

    #[test]
    fn store_failures_do_not_fail_commands() {
        let (mut e, _rx, _b) = engine_with(ReadOnlyStore, Startup::default());
        e.apply(Command::SetMuted(true)).unwrap();
        e.apply(Command::AddCustomColor(GREEN)).unwrap();
        assert!(e.state().muted());
        assert_eq!(e.state().custom_colors().len(), 3);
    }

    #[test]
    fn brightness_is_capped() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetBrightness(250)).unwrap();
        assert_eq!(e.state().config().brightness, 100);
        e.apply(Command::SetBrightness(50)).unwrap();
        assert_eq!(e.render().color, Color::new(128, 128, 128));
    }

    // ── blink interval / clock lifecycle ──

    #[test]
    fn interval_zero_stops_clock_and_resets_phase() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        let tick = current_tick(&e);
        e.apply(tick.clone()).unwrap();
        e.apply(tick).unwrap();
        assert_ne!(e.state().phase(), BlinkPhase::default());

        e.apply(Command::SetBlinkInterval(0)).unwrap();
        assert!(!e.clock().is_running());
        assert_eq!(e.state().phase(), BlinkPhase::default());
        assert_eq!(e.state().mode(), BlinkMode::Off);

        e.apply(Command::SetBlinkInterval(0)).unwrap();
        assert_eq!(e.state().phase(), BlinkPhase::default());
    }

    #[test]
    fn new_interval_while_running_keeps_phase() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        let old = current_tick(&e);
        e.apply(old.clone()).unwrap();
        let phase = e.state().phase();

        e.apply(Command::SetBlinkInterval(500)).unwrap();
        assert_eq!(e.state().phase(), phase);
        assert_eq!(e.clock().interval(), Some(Duration::from_millis(500)));

        // Ticks from the cancelled timer are ignored.
        e.apply(old).unwrap();
        assert_eq!(e.state().phase(), phase);
    }

    #[test]
    fn same_interval_does_not_rearm() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetBlinkInterval(300)).unwrap();
        let generation = e.clock().generation();
        e.apply(Command::SetBlinkInterval(300)).unwrap();
        assert_eq!(e.clock().generation(), generation);
    }

    #[test]
    fn switching_off_strobe_clears_black() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetRotateColors(true)).unwrap();
        e.apply(Command::SetStrobeEffect(true)).unwrap();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        e.apply(current_tick(&e)).unwrap();
        assert!(e.state().phase().showing_black);

        e.apply(Command::SetStrobeEffect(false)).unwrap();
        assert_eq!(e.state().mode(), BlinkMode::RotateOnly);
        assert!(!e.state().phase().showing_black);
    }

    // ── ticks and audio ──

    #[test]
    fn ticks_click_unless_muted() {
        let (mut e, _rx, backend) = engine();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        e.apply(current_tick(&e)).unwrap();
        e.apply(current_tick(&e)).unwrap();
        assert_eq!(*backend.log.clicks.borrow(), vec![false, true]);
        assert!(e.clock().has_audio());

        e.apply(Command::SetMuted(true)).unwrap();
        assert!(!e.clock().has_audio());
        assert_eq!(backend.log.open_players(), 0);
        e.apply(current_tick(&e)).unwrap();
        assert_eq!(backend.log.clicks.borrow().len(), 2);
        assert_eq!(backend.log.opened.get(), 1);
    }

    #[test]
    fn muted_session_never_opens_audio() {
        let mut store = MemoryStore::new();
        store.set(keys::MUTED, &true).unwrap();
        let (mut e, _rx, backend) = engine_with(store, Startup::default());
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        for _ in 0..4 {
            e.apply(current_tick(&e)).unwrap();
        }
        assert_eq!(e.state().phase().tick_index, 2);
        assert_eq!(backend.log.opened.get(), 0);
    }

    #[test]
    fn audio_failure_surfaces_once() {
        let (mut e, _rx, backend) = engine();
        backend.fail_open.set(true);
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        let err = e.apply(current_tick(&e)).unwrap_err();
        assert!(matches!(err, LightPanelError::Audio(_)));
        assert!(e.state().phase().showing_black, "tick still applied");
        e.apply(current_tick(&e)).unwrap();
    }

    #[test]
    fn ticks_while_idle_are_ignored() {
        let (mut e, _rx, backend) = engine();
        e.apply(Command::Tick(Tick { generation: 0 })).unwrap();
        assert_eq!(e.state().phase(), BlinkPhase::default());
        assert!(backend.log.clicks.borrow().is_empty());
    }

    #[test]
    fn shutdown_releases_clock_and_audio() {
        let (mut e, _rx, backend) = engine();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        e.apply(current_tick(&e)).unwrap();
        e.shutdown();
        assert!(!e.clock().is_running());
        assert_eq!(backend.log.open_players(), 0);
    }

    #[test]
    fn shutdown_returns_to_steady_display() {
        let (mut e, _rx, _b) = engine();
        e.apply(Command::SetSelection(GREEN)).unwrap();
        e.apply(Command::SetStrobeEffect(true)).unwrap();
        e.apply(Command::SetBlinkInterval(60_000)).unwrap();
        e.apply(current_tick(&e)).unwrap();
        assert_ne!(e.state().mode(), BlinkMode::Off);

        e.shutdown();
        assert_eq!(e.state().mode(), BlinkMode::Off);
        assert_eq!(e.state().phase(), BlinkPhase::default());
        assert_eq!(e.state().config().blink_interval_ms, 0);
        assert_eq!(e.render().color, e.state().selection());
        assert_eq!(e.render().color, GREEN);
    }
}
