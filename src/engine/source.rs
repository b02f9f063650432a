//! The single ordered event stream consumed by the engine.
//!
//! Buttons and timers are sampled on every tick. Events produced by other
//! threads (interrupt handlers, input readers) arrive through a bounded
//! channel and are merged into the same FIFO.

use crate::core::{
    timeout_event_name, ConfigError, Event, EventOrigin, EventRegistry,
};
use crate::input::{Button, Edge};
use crate::time::Timer;
use std::collections::VecDeque;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{trace, warn};

/// Errors returned by [`EventSender::send`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SendError {
    #[error("Event queue is full; dropped '{event}'")]
    QueueFull { event: String },

    #[error("Engine is gone; dropped '{event}'")]
    Disconnected { event: String },
}

/// Thread-safe handle for feeding events into a running engine.
///
/// Names are resolved against the engine's registry when the engine drains
/// the queue; unknown names are logged and dropped there.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: SyncSender<Arc<str>>,
}

impl EventSender {
    /// Queue an event without blocking.
    pub fn send(&self, name: &str) -> Result<(), SendError> {
        self.tx.try_send(Arc::from(name)).map_err(|err| match err {
            TrySendError::Full(event) => SendError::QueueFull {
                event: event.to_string(),
            },
            TrySendError::Disconnected(event) => SendError::Disconnected {
                event: event.to_string(),
            },
        })
    }
}

struct RegisteredButton {
    button: Button,
    press: Event,
    release: Event,
}

struct RegisteredTimer {
    timer: Timer,
    timeout: Event,
}

/// Aggregates buttons, timers and injected events into one FIFO.
pub struct EventSource {
    registry: EventRegistry,
    buttons: Vec<RegisteredButton>,
    timers: Vec<RegisteredTimer>,
    pending: VecDeque<Event>,
    injected_tx: SyncSender<Arc<str>>,
    injected_rx: Receiver<Arc<str>>,
}

impl EventSource {
    /// Create a source whose injection queue holds `queue_capacity` events.
    pub fn new(queue_capacity: usize) -> Self {
        let (injected_tx, injected_rx) = sync_channel(queue_capacity);
        Self {
            registry: EventRegistry::new(),
            buttons: Vec::new(),
            timers: Vec::new(),
            pending: VecDeque::new(),
            injected_tx,
            injected_rx,
        }
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Register a button and its press/release events.
    pub fn add_button(&mut self, button: Button) -> Result<(), ConfigError> {
        if self.buttons.iter().any(|b| b.button.name() == button.name()) {
            return Err(ConfigError::DuplicateButton {
                name: button.name().to_string(),
            });
        }
        let press_name = button.press_event();
        let release_name = button.release_event();
        if self.registry.contains(&release_name) {
            return Err(ConfigError::DuplicateEvent { name: release_name });
        }
        let press = self.registry.register(&press_name, EventOrigin::ButtonPress)?;
        let release = self
            .registry
            .register(&release_name, EventOrigin::ButtonRelease)?;
        self.buttons.push(RegisteredButton {
            button,
            press,
            release,
        });
        Ok(())
    }

    /// Register a timer and its timeout event.
    pub fn add_timer(&mut self, timer: Timer) -> Result<(), ConfigError> {
        if self.timer_index(timer.name()).is_some() {
            return Err(ConfigError::DuplicateTimer {
                name: timer.name().to_string(),
            });
        }
        let timeout = self
            .registry
            .register(&timeout_event_name(timer.name()), EventOrigin::TimerTimeout)?;
        self.timers.push(RegisteredTimer { timer, timeout });
        Ok(())
    }

    /// Register an application-defined event.
    pub fn add_custom_event(&mut self, name: &str) -> Result<(), ConfigError> {
        self.registry.register(name, EventOrigin::Custom).map(|_| ())
    }

    pub fn has_timer(&self, name: &str) -> bool {
        self.timer_index(name).is_some()
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timer_index(name).map(|index| &self.timers[index].timer)
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.buttons
            .iter()
            .find(|b| b.button.name() == name)
            .map(|b| &b.button)
    }

    /// Arm a timer, with its default duration unless one is given.
    pub fn arm_timer(
        &mut self,
        name: &str,
        now: Duration,
        duration: Option<Duration>,
    ) -> Result<(), ConfigError> {
        let index = self.require_timer(name)?;
        self.withdraw_timeout(index);
        let timer = &mut self.timers[index].timer;
        match duration {
            Some(duration) => timer.arm(now, duration),
            None => timer.start(now),
        }
        Ok(())
    }

    /// Cancel a timer, including a timeout already queued but not yet
    /// dispatched.
    pub fn cancel_timer(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = self.require_timer(name)?;
        self.withdraw_timeout(index);
        self.timers[index].timer.cancel();
        Ok(())
    }

    /// Handle for other threads.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.injected_tx.clone(),
        }
    }

    /// Resolve `name` and append it to the FIFO.
    pub fn push(&mut self, name: &str) -> Result<(), ConfigError> {
        let event = self.resolve(name)?;
        self.pending.push_back(event);
        Ok(())
    }

    /// Look up a registered event by name.
    pub fn resolve(&self, name: &str) -> Result<Event, ConfigError> {
        self.registry
            .event(name)
            .ok_or_else(|| ConfigError::UnregisteredEvent {
                state: String::new(),
                event: name.to_string(),
            })
    }

    /// Collect everything that happened since the last poll into the FIFO.
    ///
    /// Injected events come first, then buttons in registration order, then
    /// timers. Nothing is dropped; events beyond one per tick stay queued.
    pub fn poll(&mut self, now: Duration) {
        self.drain_injected();

        for registered in &mut self.buttons {
            match registered.button.read(now) {
                Some(Edge::Pressed) => self.pending.push_back(registered.press.clone()),
                Some(Edge::Released) => self.pending.push_back(registered.release.clone()),
                None => {}
            }
        }

        for registered in &mut self.timers {
            if registered.timer.poll(now) {
                self.pending.push_back(registered.timeout.clone());
            }
        }
    }

    /// Next event in arrival order.
    pub fn next_event(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Detach every button and cancel every timer. Idempotent.
    pub fn detach_all(&mut self) {
        for registered in &mut self.buttons {
            registered.button.detach();
        }
        for registered in &mut self.timers {
            registered.timer.cancel();
        }
        self.pending.clear();
    }

    fn drain_injected(&mut self) {
        loop {
            match self.injected_rx.try_recv() {
                Ok(name) => match self.registry.event(&name) {
                    Some(event) => {
                        trace!(event = %event, "injected event queued");
                        self.pending.push_back(event);
                    }
                    None => warn!(event = %name, "dropping injected event with unregistered name"),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn withdraw_timeout(&mut self, index: usize) {
        let timeout = &self.timers[index].timeout;
        let before = self.pending.len();
        self.pending.retain(|event| event != timeout);
        if self.pending.len() != before {
            trace!(event = %timeout, "withdrew queued timeout");
        }
    }

    fn timer_index(&self, name: &str) -> Option<usize> {
        self.timers.iter().position(|t| t.timer.name() == name)
    }

    fn require_timer(&self, name: &str) -> Result<usize, ConfigError> {
        self.timer_index(name).ok_or_else(|| ConfigError::UnknownTimer {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ActiveLevel, SimulatedPin};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn button(name: &str) -> (SimulatedPin, Button) {
        let pin = SimulatedPin::new(ActiveLevel::Low);
        let button = Button::with_debounce(pin.clone(), name, ActiveLevel::Low, ms(20));
        (pin, button)
    }

    fn drain(source: &mut EventSource) -> Vec<String> {
        std::iter::from_fn(|| source.next_event())
            .map(|event| event.name().to_string())
            .collect()
    }

    #[test]
    fn button_names_must_be_unique() {
        let mut source = EventSource::new(4);
        source.add_button(button("b1").1).unwrap();

        let result = source.add_button(button("b1").1);
        assert!(matches!(result, Err(ConfigError::DuplicateButton { .. })));
    }

    #[test]
    fn timer_names_must_be_unique() {
        let mut source = EventSource::new(4);
        source.add_timer(Timer::new("t", ms(10))).unwrap();

        let result = source.add_timer(Timer::new("t", ms(20)));
        assert!(matches!(result, Err(ConfigError::DuplicateTimer { .. })));
    }

    #[test]
    fn custom_event_may_not_shadow_button_event() {
        let mut source = EventSource::new(4);
        source.add_button(button("b1").1).unwrap();

        let result = source.add_custom_event("b1_press");
        assert!(matches!(result, Err(ConfigError::DuplicateEvent { .. })));
    }

    #[test]
    fn simultaneous_edges_are_buffered_in_order() {
        let mut source = EventSource::new(4);
        let (pin1, b1) = button("b1");
        let (pin2, b2) = button("b2");
        source.add_button(b1).unwrap();
        source.add_button(b2).unwrap();
        source.add_timer(Timer::new("t", ms(30))).unwrap();
        source.poll(ms(0));

        source.arm_timer("t", ms(0), None).unwrap();
        pin2.press();
        pin1.press();
        source.poll(ms(5));
        source.poll(ms(30));

        assert_eq!(source.pending_len(), 3);
        assert_eq!(drain(&mut source), vec!["b1_press", "b2_press", "t_timeout"]);
    }

    #[test]
    fn injected_events_are_resolved_on_poll() {
        let mut source = EventSource::new(4);
        source.add_custom_event("motion").unwrap();
        let sender = source.sender();

        sender.send("motion").unwrap();
        sender.send("unknown").unwrap();
        source.poll(ms(0));

        assert_eq!(drain(&mut source), vec!["motion"]);
    }

    #[test]
    fn full_injection_queue_rejects_without_blocking() {
        let source = EventSource::new(1);
        let sender = source.sender();

        sender.send("a").unwrap();
        let result = sender.send("b");
        assert_eq!(
            result,
            Err(SendError::QueueFull {
                event: "b".to_string()
            })
        );
    }

    #[test]
    fn arming_unknown_timer_fails() {
        let mut source = EventSource::new(1);
        let result = source.arm_timer("missing", ms(0), None);
        assert!(matches!(result, Err(ConfigError::UnknownTimer { .. })));
    }

    #[test]
    fn cancel_withdraws_queued_timeout() {
        let mut source = EventSource::new(4);
        source.add_custom_event("next").unwrap();
        source.add_timer(Timer::new("t", ms(10))).unwrap();
        source.arm_timer("t", ms(0), None).unwrap();
        source.push("next").unwrap();
        source.poll(ms(10));
        assert_eq!(source.pending_len(), 2);

        source.cancel_timer("t").unwrap();

        assert_eq!(drain(&mut source), vec!["next"]);
    }

    #[test]
    fn rearming_drops_timeout_of_previous_arming() {
        let mut source = EventSource::new(4);
        source.add_timer(Timer::new("t", ms(10))).unwrap();
        source.arm_timer("t", ms(0), None).unwrap();
        source.poll(ms(10));

        source.arm_timer("t", ms(10), None).unwrap();
        assert_eq!(source.next_event(), None);

        source.poll(ms(19));
        assert_eq!(source.next_event(), None);
        source.poll(ms(20));
        assert_eq!(drain(&mut source), vec!["t_timeout"]);
    }

    #[test]
    fn detach_all_silences_inputs_and_timers() {
        let mut source = EventSource::new(4);
        let (pin, b1) = button("b1");
        source.add_button(b1).unwrap();
        source.add_timer(Timer::new("t", ms(10))).unwrap();
        source.poll(ms(0));
        source.arm_timer("t", ms(0), None).unwrap();

        source.detach_all();
        source.detach_all();
        assert!(pin.is_detached());
        assert!(!source.timer("t").unwrap().is_pending());

        pin.press();
        source.poll(ms(100));
        assert_eq!(source.next_event(), None);
    }
}
