//! Cancelable one-shot software timers.

use std::time::Duration;

/// A named one-shot countdown.
///
/// A timer is idle until armed. Once armed it reports its expiry exactly once
/// from [`Timer::poll`] and then returns to idle. Arming a pending timer
/// restarts the countdown.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::time::Timer;
/// use std::time::Duration;
///
/// let mut timer = Timer::new("idle", Duration::from_secs(5));
/// timer.start(Duration::ZERO);
///
/// assert!(!timer.poll(Duration::from_millis(4999)));
/// assert!(timer.poll(Duration::from_millis(5000)));
/// assert!(!timer.poll(Duration::from_millis(6000)));
/// assert!(!timer.is_pending());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    name: String,
    duration: Duration,
    deadline: Option<Duration>,
}

impl Timer {
    /// Create an idle timer with a default duration.
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            deadline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The duration used by [`Timer::start`].
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Arm with the default duration.
    pub fn start(&mut self, now: Duration) {
        self.arm(now, self.duration);
    }

    /// Arm for `duration` from `now`, replacing any pending countdown.
    pub fn arm(&mut self, now: Duration, duration: Duration) {
        self.deadline = Some(now.saturating_add(duration));
    }

    /// Return to idle. Calling this on an idle timer does nothing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before expiry, if armed.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_sub(now))
    }

    /// Returns true once when `now` reaches the deadline, then goes idle.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
