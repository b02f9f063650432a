//! State transition history tracking.
//!
//! The engine keeps a bounded log of the transitions it has taken. The kiosk
//! runs for weeks at a time, so the log drops its oldest entries once it is
//! full.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::core::StateTransition;
/// use kiosk_fsm::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Light {
///         Off,
///         On,
///     }
/// }
///
/// let transition = StateTransition {
///     from: Light::Off,
///     to: Light::On,
///     event: "switch_press".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.event, "switch_press");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being left
    pub from: S,
    /// The state being entered
    pub to: S,
    /// Name of the event that triggered the transition
    pub event: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of state transitions.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::core::{StateHistory, StateTransition};
/// use kiosk_fsm::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Step {
///         A,
///         B,
///         C,
///     }
/// }
///
/// let mut history = StateHistory::with_capacity(2);
/// for (from, to) in [(Step::A, Step::B), (Step::B, Step::C), (Step::C, Step::A)] {
///     history.record(StateTransition {
///         from,
///         to,
///         event: "next".to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// // Oldest entry was evicted
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec![&Step::B, &Step::C, &Step::A]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    capacity: usize,
    transitions: VecDeque<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl<S: State> StateHistory<S> {
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create an empty history keeping at most `capacity` transitions.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition, then the
    /// `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Time between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
