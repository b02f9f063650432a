//! Events and the event name registry.
//!
//! Events are immutable named tokens. Names come from three places: buttons
//! (`{name}_press` / `{name}_release`), timers (`{name}_timeout`) and custom
//! declarations. The reserved name [`NO_EVENT`] marks unconditional
//! transitions.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the unconditional event, taken immediately on entering a state.
pub const NO_EVENT: &str = "no_event";

/// Where an event comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOrigin {
    ButtonPress,
    ButtonRelease,
    TimerTimeout,
    Custom,
    Unconditional,
}

/// An immutable named event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    name: Arc<str>,
    origin: EventOrigin,
}

impl Event {
    pub fn new(name: impl Into<Arc<str>>, origin: EventOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    /// The reserved unconditional event.
    pub fn no_event() -> Self {
        Self::new(NO_EVENT, EventOrigin::Unconditional)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> EventOrigin {
        self.origin
    }

    /// Shorthand for comparing the event name.
    pub fn is(&self, name: &str) -> bool {
        &*self.name == name
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Event name for a button press.
pub fn press_event_name(button: &str) -> String {
    format!("{button}_press")
}

/// Event name for a button release.
pub fn release_event_name(button: &str) -> String {
    format!("{button}_release")
}

/// Event name for a timer expiry.
pub fn timeout_event_name(timer: &str) -> String {
    format!("{timer}_timeout")
}

/// Every event name the engine knows about.
#[derive(Clone, Debug)]
pub struct EventRegistry {
    events: HashMap<Arc<str>, EventOrigin>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Create a registry holding only [`NO_EVENT`].
    pub fn new() -> Self {
        let mut events = HashMap::new();
        events.insert(Arc::from(NO_EVENT), EventOrigin::Unconditional);
        Self { events }
    }

    /// Register a name. Fails if the name is already taken.
    pub fn register(&mut self, name: &str, origin: EventOrigin) -> Result<Event, ConfigError> {
        if self.events.contains_key(name) {
            return Err(ConfigError::DuplicateEvent {
                name: name.to_string(),
            });
        }
        let name: Arc<str> = Arc::from(name);
        self.events.insert(Arc::clone(&name), origin);
        Ok(Event { name, origin })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Build the event for a registered name.
    pub fn event(&self, name: &str) -> Option<Event> {
        self.events
            .get_key_value(name)
            .map(|(name, origin)| Event {
                name: Arc::clone(name),
                origin: *origin,
            })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_with_no_event() {
        let registry = EventRegistry::new();
        assert!(registry.contains(NO_EVENT));
        assert_eq!(registry.event(NO_EVENT), Some(Event::no_event()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut registry = EventRegistry::new();
        registry.register("avg_over_trigger", EventOrigin::Custom).unwrap();

        let result = registry.register("avg_over_trigger", EventOrigin::Custom);
        assert!(matches!(result, Err(ConfigError::DuplicateEvent { .. })));

        let reserved = registry.register(NO_EVENT, EventOrigin::Custom);
        assert!(matches!(reserved, Err(ConfigError::DuplicateEvent { .. })));
    }

    #[test]
    fn event_keeps_its_origin() {
        let mut registry = EventRegistry::new();
        registry
            .register(&press_event_name("reset"), EventOrigin::ButtonPress)
            .unwrap();

        let event = registry.event("reset_press").unwrap();
        assert!(event.is("reset_press"));
        assert_eq!(event.origin(), EventOrigin::ButtonPress);
        assert!(registry.event("reset_release").is_none());
    }

    #[test]
    fn derived_names_follow_convention() {
        assert_eq!(press_event_name("button1"), "button1_press");
        assert_eq!(release_event_name("button1"), "button1_release");
        assert_eq!(timeout_event_name("timer1"), "timer1_timeout");
    }
}
