//! Core engine types.
//!
//! This module contains the pieces every other layer builds on:
//! - State definitions via the `State` trait
//! - Events and the registry of known event names
//! - Bounded transition history
//! - Configuration errors

mod error;
mod event;
mod history;
mod state;

pub use error::ConfigError;
pub use event::{
    press_event_name, release_event_name, timeout_event_name, Event, EventOrigin,
    EventRegistry, NO_EVENT,
};
pub use history::{StateHistory, StateTransition};
pub use state::State;
