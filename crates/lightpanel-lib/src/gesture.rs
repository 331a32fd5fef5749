//! Press-and-hold detection for custom color slots.
//!
//! A short tap selects the slot; holding it saves the current selection into
//! it. The "saving" indicator only appears after a grace delay so quick taps
//! do not flicker. Time is injected, so the machine is driven by whatever
//! event loop owns it.

use std::time::{Duration, Instant};

/// Hold threshold and indicator delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTiming {
    /// Press duration that counts as a hold.
    pub hold: Duration,
    /// Delay before the pressing indicator is shown.
    pub feedback_delay: Duration,
}

impl Default for PressTiming {
    fn default() -> Self {
        PressTiming {
            hold: Duration::from_millis(600),
            feedback_delay: Duration::from_millis(200),
        }
    }
}

/// What the owner of the gesture should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Show the pressing indicator.
    ShowPressing,
    /// The hold threshold was reached; save to the slot.
    Held { after: Duration },
    /// Hide the pressing indicator.
    HidePressing,
    /// Ordinary tap.
    Click,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    started: Instant,
    indicator: bool,
    held: bool,
}

/// Long-press state machine for one button.
#[derive(Debug)]
pub struct PressGesture {
    timing: PressTiming,
    press: Option<Press>,
}

impl PressGesture {
    /// The indicator delay is capped at the hold threshold.
    pub fn new(timing: PressTiming) -> Self {
        PressGesture {
            timing: PressTiming {
                hold: timing.hold,
                feedback_delay: timing.feedback_delay.min(timing.hold),
            },
            press: None,
        }
    }

    pub fn timing(&self) -> PressTiming {
        self.timing
    }

    /// Whether a press is in progress.
    pub fn is_active(&self) -> bool {
        self.press.is_some()
    }

    /// Whether the pressing indicator is currently shown.
    pub fn is_pressing(&self) -> bool {
        self.press.is_some_and(|p| p.indicator)
    }

    /// Begin a press. A press already in progress is discarded silently.
    pub fn press_start(&mut self, now: Instant) {
        self.press = Some(Press {
            started: now,
            indicator: false,
            held: false,
        });
    }

    /// Advance time. Emits the indicator and the hold at most once each.
    pub fn poll(&mut self, now: Instant) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        let Some(press) = self.press.as_mut() else {
            return events;
        };
        if press.held {
            return events;
        }
        let elapsed = now.saturating_duration_since(press.started);
        if !press.indicator && elapsed >= self.timing.feedback_delay {
            press.indicator = true;
            events.push(GestureEvent::ShowPressing);
        }
        if elapsed >= self.timing.hold {
            press.held = true;
            events.push(GestureEvent::Held { after: elapsed });
        }
        events
    }

    /// Release the button.
    ///
    /// Before the indicator appeared this is a click. After a hold it only
    /// hides the indicator. In between the press is abandoned.
    pub fn press_end(&mut self, now: Instant) -> Vec<GestureEvent> {
        let mut events = self.poll(now);
        let Some(press) = self.press.take() else {
            return events;
        };
        if press.indicator {
            events.push(GestureEvent::HidePressing);
        } else if !press.held {
            events.push(GestureEvent::Click);
        }
        events
    }

    /// The press left the button or was interrupted. Never a click.
    pub fn press_cancel(&mut self) -> Vec<GestureEvent> {
        match self.press.take() {
            Some(p) if p.indicator => vec![GestureEvent::HidePressing],
            _ => Vec::new(),
        }
    }
}

impl Default for PressGesture {
    fn default() -> Self {
        Self::new(PressTiming::default())
    }
}
