//! Named, debounced buttons.

use super::debounce::{DebouncedInput, Edge, DEFAULT_DEBOUNCE};
use super::pin::{ActiveLevel, LevelSource};
use crate::core::{press_event_name, release_event_name};
use std::fmt;
use std::time::Duration;

/// A physical button.
///
/// The engine reads the button once per tick and turns its edges into
/// `{name}_press` and `{name}_release` events.
pub struct Button {
    name: String,
    input: DebouncedInput<Box<dyn LevelSource>>,
    attached: bool,
}

impl Button {
    /// Create a button using [`DEFAULT_DEBOUNCE`].
    pub fn new(pin: impl LevelSource + 'static, name: impl Into<String>, active: ActiveLevel) -> Self {
        Self::with_debounce(pin, name, active, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(
        pin: impl LevelSource + 'static,
        name: impl Into<String>,
        active: ActiveLevel,
        window: Duration,
    ) -> Self {
        let pin: Box<dyn LevelSource> = Box::new(pin);
        Self {
            name: name.into(),
            input: DebouncedInput::new(pin, active, window),
            attached: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn press_event(&self) -> String {
        press_event_name(&self.name)
    }

    pub fn release_event(&self) -> String {
        release_event_name(&self.name)
    }

    pub fn debounce(&self) -> Duration {
        self.input.window()
    }

    pub fn active_level(&self) -> ActiveLevel {
        self.input.active_level()
    }

    pub fn is_pressed(&self) -> bool {
        self.input.is_pressed()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Sample the button. A detached button reports nothing.
    pub fn read(&mut self, now: Duration) -> Option<Edge> {
        if !self.attached {
            return None;
        }
        self.input.read(now)
    }

    /// Detach the underlying line. Safe to call more than once.
    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.input.pin_mut().detach();
        }
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("name", &self.name)
            .field("active", &self.input.active_level())
            .field("window", &self.input.window())
            .field("attached", &self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SimulatedPin;

    #[test]
    fn event_names_derive_from_button_name() {
        let button = Button::new(SimulatedPin::new(ActiveLevel::Low), "reset", ActiveLevel::Low);
        assert_eq!(button.press_event(), "reset_press");
        assert_eq!(button.release_event(), "reset_release");
    }

    #[test]
    fn detached_button_is_silent() {
        let pin = SimulatedPin::new(ActiveLevel::Low);
        let mut button =
            Button::with_debounce(pin.clone(), "b", ActiveLevel::Low, Duration::from_millis(10));
        button.read(Duration::ZERO);

        button.detach();
        button.detach();
        assert!(pin.is_detached());

        pin.press();
        assert_eq!(button.read(Duration::from_millis(5)), None);
        assert_eq!(button.read(Duration::from_millis(50)), None);
    }

    #[test]
    fn attached_button_reports_edges() {
        let pin = SimulatedPin::new(ActiveLevel::Low);
        let mut button =
            Button::with_debounce(pin.clone(), "b", ActiveLevel::Low, Duration::from_millis(10));
        button.read(Duration::ZERO);

        pin.press();
        button.read(Duration::from_millis(1));
        assert_eq!(button.read(Duration::from_millis(11)), Some(Edge::Pressed));
        assert!(button.is_pressed());
    }
}
