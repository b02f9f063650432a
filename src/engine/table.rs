//! Transition table: (state, event) to destination state.

use crate::core::{ConfigError, State, NO_EVENT};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps a (state, event name) pair to the destination state.
///
/// Each pair has at most one destination. The table is a vector of hash maps
/// indexed by [`State::index`], so lookups are a vector index plus a hash.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::engine::TransitionTable;
/// use kiosk_fsm::state_enum;
///
/// state_enum! {
///     enum Door {
///         Closed,
///         Open,
///     }
/// }
///
/// let mut table = TransitionTable::new();
/// table.add(Door::Closed, &["open_press"], Door::Open).unwrap();
///
/// assert_eq!(table.lookup(Door::Closed, "open_press"), Some(Door::Open));
/// assert_eq!(table.lookup(Door::Open, "open_press"), None);
/// assert!(table.add(Door::Closed, &["open_press"], Door::Closed).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct TransitionTable<S: State> {
    routes: Vec<HashMap<Arc<str>, S>>,
}

impl<S: State> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionTable<S> {
    /// Create an empty table sized for `S::COUNT` states.
    pub fn new() -> Self {
        Self {
            routes: (0..S::COUNT).map(|_| HashMap::new()).collect(),
        }
    }

    /// Register `source --triggers--> dest`.
    ///
    /// Fails without modifying the table if any trigger already has a
    /// destination from `source`, or appears twice in `triggers`.
    pub fn add(&mut self, source: S, triggers: &[&str], dest: S) -> Result<(), ConfigError> {
        let routes = &mut self.routes[source.index()];

        for (position, trigger) in triggers.iter().enumerate() {
            let existing = routes
                .get(*trigger)
                .copied()
                .or_else(|| triggers[..position].contains(trigger).then_some(dest));
            if let Some(existing) = existing {
                return Err(ConfigError::DuplicateTransition {
                    state: source.name().to_string(),
                    event: trigger.to_string(),
                    existing: existing.name().to_string(),
                    requested: dest.name().to_string(),
                });
            }
        }

        for trigger in triggers {
            routes.insert(Arc::from(*trigger), dest);
        }
        Ok(())
    }

    /// Destination for `event` in `state`, if any.
    pub fn lookup(&self, state: S, event: &str) -> Option<S> {
        self.routes[state.index()].get(event).copied()
    }

    /// Whether `state` has an unconditional `no_event` transition.
    pub fn has_auto_transition(&self, state: S) -> bool {
        self.routes[state.index()].contains_key(NO_EVENT)
    }

    /// Every (source, event, destination) triple, grouped by source state.
    pub fn iter(&self) -> impl Iterator<Item = (S, &str, S)> + '_ {
        self.routes.iter().enumerate().flat_map(|(index, routes)| {
            S::from_index(index)
                .into_iter()
                .flat_map(move |source| routes.iter().map(move |(event, dest)| (source, &**event, *dest)))
        })
    }

    /// Number of registered (state, event) pairs.
    pub fn len(&self) -> usize {
        self.routes.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
