//! Raw digital lines.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Electrical level at which a button counts as pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    /// Pressed pulls the line low (pull-up wiring).
    #[default]
    Low,
    /// Pressed drives the line high (pull-down wiring).
    High,
}

impl ActiveLevel {
    /// Whether a raw level reads as pressed.
    pub fn is_active(self, high: bool) -> bool {
        match self {
            ActiveLevel::Low => !high,
            ActiveLevel::High => high,
        }
    }

    /// The raw level of a released button.
    pub fn idle_level(self) -> bool {
        matches!(self, ActiveLevel::Low)
    }
}

/// A digital input line.
///
/// Implementations wrap a hardware pin (or an interrupt-fed latch) and are
/// sampled once per engine tick.
pub trait LevelSource: Send {
    /// Current raw level, `true` for high.
    fn is_high(&mut self) -> bool;

    /// Release whatever handler the line installed. Called once when the engine
    /// stops.
    fn detach(&mut self) {}
}

impl<T: LevelSource + ?Sized> LevelSource for Box<T> {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }

    fn detach(&mut self) {
        (**self).detach()
    }
}

/// In-memory line for host builds and tests.
///
/// Clones share the line, so one handle can be given to a button while another
/// flips the level from a test or an input thread.
#[derive(Clone, Debug)]
pub struct SimulatedPin {
    high: Arc<AtomicBool>,
    detached: Arc<AtomicBool>,
    active: ActiveLevel,
}

impl SimulatedPin {
    /// A line resting at the released level for `active`.
    pub fn new(active: ActiveLevel) -> Self {
        Self {
            high: Arc::new(AtomicBool::new(active.idle_level())),
            detached: Arc::new(AtomicBool::new(false)),
            active,
        }
    }

    pub fn set_high(&self, high: bool) {
        self.high.store(high, Ordering::SeqCst);
    }

    /// Drive the line to its pressed level.
    pub fn press(&self) {
        self.set_high(!self.active.idle_level());
    }

    /// Drive the line to its released level.
    pub fn release(&self) {
        self.set_high(self.active.idle_level());
    }

    pub fn level(&self) -> bool {
        self.high.load(Ordering::SeqCst)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl LevelSource for SimulatedPin {
    fn is_high(&mut self) -> bool {
        self.level()
    }

    fn detach(&mut self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}
