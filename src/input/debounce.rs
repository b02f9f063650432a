//! Time-window debouncing for mechanical switches.

use super::pin::{ActiveLevel, LevelSource};
use std::time::Duration;

/// Debounce window used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(30);

/// A clean logical transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// Turns a noisy line into clean press/release edges.
///
/// A new level is accepted only after it has been read continuously for the
/// debounce window. Changes that revert inside the window are bounce and
/// produce nothing. The first read adopts the current level without reporting
/// an edge, so a button held at startup does not fire.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::input::{ActiveLevel, DebouncedInput, Edge, SimulatedPin};
/// use std::time::Duration;
///
/// let pin = SimulatedPin::new(ActiveLevel::Low);
/// let mut input = DebouncedInput::new(pin.clone(), ActiveLevel::Low, Duration::from_millis(20));
///
/// assert_eq!(input.read(Duration::ZERO), None);
///
/// pin.press();
/// assert_eq!(input.read(Duration::from_millis(5)), None);
/// assert_eq!(input.read(Duration::from_millis(25)), Some(Edge::Pressed));
/// assert_eq!(input.read(Duration::from_millis(30)), None);
/// ```
#[derive(Debug)]
pub struct DebouncedInput<P> {
    pin: P,
    active: ActiveLevel,
    window: Duration,
    stable: Option<bool>,
    candidate: bool,
    candidate_since: Duration,
}

impl<P: LevelSource> DebouncedInput<P> {
    pub fn new(pin: P, active: ActiveLevel, window: Duration) -> Self {
        Self {
            pin,
            active,
            window,
            stable: None,
            candidate: active.idle_level(),
            candidate_since: Duration::ZERO,
        }
    }

    /// Sample the line at `now` and report an edge if one has settled.
    pub fn read(&mut self, now: Duration) -> Option<Edge> {
        let raw = self.pin.is_high();

        let Some(stable) = self.stable else {
            self.stable = Some(raw);
            self.candidate = raw;
            self.candidate_since = now;
            return None;
        };

        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = now;
        }

        if self.candidate == stable || now.saturating_sub(self.candidate_since) < self.window {
            return None;
        }

        self.stable = Some(self.candidate);
        if self.active.is_active(self.candidate) {
            Some(Edge::Pressed)
        } else {
            Some(Edge::Released)
        }
    }

    /// Debounced pressed state. False until the first read.
    pub fn is_pressed(&self) -> bool {
        self.stable.is_some_and(|level| self.active.is_active(level))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }

    pub(crate) fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}
