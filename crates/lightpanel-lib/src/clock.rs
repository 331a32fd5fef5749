//! Blink clock — owns the repeating tick timer and the audio output.
//!
//! The timer runs on a background thread and only sends [`Tick`] messages;
//! all state changes happen on the controller thread that receives them.
//! Every `start` and `stop` bumps a generation counter so ticks already
//! sitting in the channel from an older timer are recognised as stale.
//!
//! Both resources exist only while the clock is running. [`BlinkClock::stop`]
//! and `Drop` release them on every exit path.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::{AudioBackend, ClickPlayer};
use crate::error::{LightPanelError, Result};

/// One firing of the blink timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Cancellation signal shared with the timer thread.
type StopSignal = Arc<(Mutex<bool>, Condvar)>;

/// Repeating timer thread. Dropping it cancels and joins the thread.
struct TickTimer {
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl TickTimer {
    fn spawn(interval: Duration, generation: u64, ticks: Sender<Tick>) -> Result<Self> {
        let stop: StopSignal = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("blink-clock".into())
            .spawn(move || run_timer(&thread_stop, interval, generation, &ticks))
            .map_err(LightPanelError::Timer)?;
        Ok(TickTimer {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.stop;
        match lock.lock() {
            Ok(mut stopped) => *stopped = true,
            Err(e) => *e.into_inner() = true,
        }
        cvar.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("[clock] timer thread panicked");
            }
        }
    }
}

/// Timer thread body: wait one interval (or until cancelled), send a tick,
/// repeat. Exits when cancelled or when the receiver is gone.
fn run_timer(stop: &StopSignal, interval: Duration, generation: u64, ticks: &Sender<Tick>) {
    let (lock, cvar) = &**stop;
    let Ok(mut guard) = lock.lock() else {
        log::warn!("[clock] stop mutex poisoned, timer not started");
        return;
    };
    loop {
        guard = match cvar.wait_timeout_while(guard, interval, |stopped| !*stopped) {
            Ok((g, _)) => g,
            Err(e) => e.into_inner().0,
        };
        if *guard {
            return;
        }
        if ticks.send(Tick { generation }).is_err() {
            log::debug!("[clock] tick receiver dropped, timer exiting");
            return;
        }
    }
}

/// Scoped owner of the tick timer and the click output.
pub struct BlinkClock<B: AudioBackend> {
    backend: B,
    ticks: Sender<Tick>,
    timer: Option<TickTimer>,
    player: Option<B::Player>,
    /// Set after a failed open; cleared when the clock is restarted.
    audio_failed: bool,
    generation: u64,
    interval: Option<Duration>,
}

impl<B: AudioBackend> BlinkClock<B> {
    /// Create an idle clock that will deliver ticks on `ticks`.
    pub fn new(backend: B, ticks: Sender<Tick>) -> Self {
        BlinkClock {
            backend,
            ticks,
            timer: None,
            player: None,
            audio_failed: false,
            generation: 0,
            interval: None,
        }
    }

    /// Arm the timer with `interval`, cancelling any previous timer first.
    ///
    /// Returns the generation carried by the new timer's ticks.
    pub fn start(&mut self, interval: Duration) -> Result<u64> {
        self.stop();
        self.generation += 1;
        self.timer = Some(TickTimer::spawn(
            interval,
            self.generation,
            self.ticks.clone(),
        )?);
        self.interval = Some(interval);
        log::debug!(
            "[clock] running every {}ms (generation {})",
            interval.as_millis(),
            self.generation
        );
        Ok(self.generation)
    }

    /// Cancel the timer and close the audio output. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            log::debug!("[clock] stopped (generation {})", self.generation);
            self.generation += 1;
        }
        self.interval = None;
        self.release_audio();
        self.audio_failed = false;
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Interval of the running timer.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Generation of the most recently armed or cancelled timer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `tick` came from the currently running timer.
    pub fn accepts(&self, tick: Tick) -> bool {
        self.is_running() && tick.generation == self.generation
    }

    /// Play one click, opening the audio output on first use.
    ///
    /// A failed open is reported once; later clicks are skipped until the
    /// clock is restarted.
    pub fn click(&mut self, high_note: bool) -> Result<()> {
        if !self.is_running() || self.audio_failed {
            return Ok(());
        }
        if self.player.is_none() {
            match self.backend.open() {
                Ok(player) => {
                    log::debug!("[audio] output opened");
                    self.player = Some(player);
                }
                Err(e) => {
                    self.audio_failed = true;
                    return Err(e.into());
                }
            }
        }
        if let Some(player) = &self.player {
            player.play_click(high_note)?;
        }
        Ok(())
    }

    /// Close the audio output while leaving the timer running (e.g. on mute).
    pub fn release_audio(&mut self) {
        if self.player.take().is_some() {
            log::debug!("[audio] output closed");
        }
    }

    pub fn has_audio(&self) -> bool {
        self.player.is_some()
    }
}

impl<B: AudioBackend> Drop for BlinkClock<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockBackend;
    use std::sync::mpsc::{self, Receiver};

    const LONG: Duration = Duration::from_secs(60);

    fn clock() -> (BlinkClock<MockBackend>, Receiver<Tick>, MockBackend) {
        let backend = MockBackend::new();
        let (tx, rx) = mpsc::channel();
        (BlinkClock::new(backend.clone(), tx), rx, backend)
    }

    #[test]
    fn new_clock_is_idle() {
        let (clock, _rx, _b) = clock();
        assert!(!clock.is_running());
        assert_eq!(clock.interval(), None);
        assert!(!clock.accepts(Tick { generation: 0 }));
    }

    #[test]
    fn start_bumps_generation_and_accepts_current_ticks() {
        let (mut clock, _rx, _b) = clock();
        let g1 = clock.start(LONG).unwrap();
        assert!(clock.accepts(Tick { generation: g1 }));
        let g2 = clock.start(LONG).unwrap();
        assert!(g2 > g1);
        assert!(!clock.accepts(Tick { generation: g1 }));
        assert!(clock.accepts(Tick { generation: g2 }));
    }

    #[test]
    fn stop_is_idempotent_and_rejects_old_ticks() {
        let (mut clock, _rx, _b) = clock();
        let g = clock.start(LONG).unwrap();
        clock.stop();
        let after_first = clock.generation();
        clock.stop();
        assert_eq!(clock.generation(), after_first);
        assert!(!clock.is_running());
        assert!(!clock.accepts(Tick { generation: g }));
    }

    #[test]
    fn timer_delivers_ticks() {
        let (mut clock, rx, _b) = clock();
        let g = clock.start(Duration::from_millis(10)).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.generation, g);
        assert_eq!(second.generation, g);
    }

    #[test]
    fn stopped_timer_sends_nothing_more() {
        let (mut clock, rx, _b) = clock();
        clock.start(Duration::from_millis(10)).unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        clock.stop();
        // Anything already queued is stale; nothing new arrives after the join.
        while let Ok(tick) = rx.try_recv() {
            assert!(!clock.accepts(tick));
        }
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn click_opens_audio_lazily_and_stop_closes_it() {
        let (mut clock, _rx, backend) = clock();
        clock.start(LONG).unwrap();
        assert_eq!(backend.log.opened.get(), 0);
        clock.click(true).unwrap();
        clock.click(false).unwrap();
        assert_eq!(backend.log.opened.get(), 1);
        assert_eq!(*backend.log.clicks.borrow(), vec![true, false]);
        clock.stop();
        assert_eq!(backend.log.open_players(), 0);
    }

    #[test]
    fn click_while_idle_is_noop() {
        let (mut clock, _rx, backend) = clock();
        clock.click(true).unwrap();
        assert_eq!(backend.log.opened.get(), 0);
        assert!(backend.log.clicks.borrow().is_empty());
    }

    #[test]
    fn audio_open_failure_reported_once_until_restart() {
        let (mut clock, _rx, backend) = clock();
        backend.fail_open.set(true);
        clock.start(LONG).unwrap();
        assert!(clock.click(true).is_err());
        assert!(clock.click(true).is_ok(), "no automatic retry");

        backend.fail_open.set(false);
        clock.start(LONG).unwrap();
        clock.click(true).unwrap();
        assert_eq!(backend.log.opened.get(), 1);
    }

    #[test]
    fn release_audio_keeps_timer() {
        let (mut clock, _rx, backend) = clock();
        clock.start(LONG).unwrap();
        clock.click(true).unwrap();
        clock.release_audio();
        assert!(clock.is_running());
        assert!(!clock.has_audio());
        assert_eq!(backend.log.open_players(), 0);
    }

    #[test]
    fn drop_releases_everything() {
        let (mut clock, _rx, backend) = clock();
        clock.start(LONG).unwrap();
        clock.click(true).unwrap();
        drop(clock);
        assert_eq!(backend.log.open_players(), 0);
    }
}
