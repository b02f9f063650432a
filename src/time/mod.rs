//! Monotonic time and software timers.
//!
//! Every time value in the engine is a [`Duration`](std::time::Duration)
//! measured from an arbitrary, clock-specific origin. Tests drive a
//! [`ManualClock`] to step time deterministically.

mod clock;
mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use timer::Timer;
