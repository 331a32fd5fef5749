//! Controls visibility — hides the control panel after a period of inactivity.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ControlsVisibility {
    timeout: Duration,
    visible: bool,
    deadline: Option<Instant>,
}

impl ControlsVisibility {
    /// Controls start visible with a fresh deadline.
    pub fn new(timeout: Duration, now: Instant) -> Self {
        ControlsVisibility {
            timeout,
            visible: true,
            deadline: Some(now + timeout),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Pointer activity: show the controls and re-arm the deadline.
    pub fn activity(&mut self, now: Instant) {
        self.visible = true;
        self.deadline = Some(now + self.timeout);
    }

    /// Pointer down somewhere on screen.
    ///
    /// A press outside visible controls hides them at once; anything else
    /// counts as activity.
    pub fn pointer_down(&mut self, now: Instant, inside_controls: bool) {
        if self.visible && !inside_controls {
            self.hide();
        } else {
            self.activity(now);
        }
    }

    /// Hide the controls once the deadline has passed. Returns `true` if
    /// they were hidden by this call.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.visible && now >= deadline => {
                log::debug!("[controls] hidden after {}ms idle", self.timeout.as_millis());
                self.hide();
                true
            }
            _ => false,
        }
    }

    fn hide(&mut self) {
        self.visible = false;
        self.deadline = None;
    }
}
