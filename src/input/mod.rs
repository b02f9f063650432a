//! Digital inputs: pins, debouncing and buttons.
//!
//! A [`LevelSource`] is the raw electrical line. [`DebouncedInput`] turns its
//! noisy level into clean [`Edge`]s, and [`Button`] names those edges so the
//! engine can route them as `{name}_press` / `{name}_release` events.

mod button;
mod debounce;
mod pin;

pub use button::Button;
pub use debounce::{DebouncedInput, Edge, DEFAULT_DEBOUNCE};
pub use pin::{ActiveLevel, LevelSource, SimulatedPin};
