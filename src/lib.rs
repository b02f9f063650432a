//! kiosk-fsm: an event-driven state machine engine for button kiosks
//!
//! The engine runs a single cooperative loop. Each tick it samples debounced
//! buttons, software timers and a thread-safe injection queue into one FIFO,
//! then dispatches at most one event through a transition table. Application
//! behavior lives in a [`StateActions`](engine::StateActions) implementation
//! with entry, exit, do and in-state callbacks.
//!
//! # Core Concepts
//!
//! - **State**: a closed set of states via the `State` trait and `state_enum!`
//! - **Events**: named tokens from buttons, timers and custom declarations
//! - **Transitions**: at most one destination per (state, event); `no_event`
//!   marks pass-through states
//! - **History**: a bounded log of recent transitions
//!
//! The [`kiosk`] module is a complete application: a restroom feedback kiosk
//! that averages ratings per location and alerts a manager.
//!
//! # Example
//!
//! ```rust
//! use kiosk_fsm::config::EngineConfig;
//! use kiosk_fsm::core::Event;
//! use kiosk_fsm::engine::{ActionContext, StateActions, StateMachineEngine};
//! use kiosk_fsm::input::{ActiveLevel, Button, SimulatedPin};
//! use kiosk_fsm::state_enum;
//! use kiosk_fsm::time::ManualClock;
//! use std::time::Duration;
//!
//! state_enum! {
//!     enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! struct Quiet;
//!
//! impl StateActions<Door> for Quiet {
//!     fn state_entered(&mut self, _: Door, _: &Event, _: &mut ActionContext) {}
//!     fn state_left(&mut self, _: Door, _: &Event, _: &mut ActionContext) {}
//!     fn state_do(&mut self, _: Door, _: &mut ActionContext) {}
//!     fn state_event(&mut self, _: Door, _: &Event, _: &mut ActionContext) -> bool {
//!         false
//!     }
//! }
//!
//! let clock = ManualClock::new();
//! let pin = SimulatedPin::new(ActiveLevel::Low);
//! let mut engine = StateMachineEngine::with_clock(Quiet, EngineConfig::default(), clock.clone());
//! engine.add_button(Button::new(pin.clone(), "open", ActiveLevel::Low)).unwrap();
//! engine.add_transition(Door::Closed, &["open_press"], Door::Open).unwrap();
//!
//! engine.tick().unwrap();
//! pin.press();
//! engine.tick().unwrap();
//! clock.advance(Duration::from_millis(50));
//! engine.tick().unwrap();
//!
//! assert_eq!(engine.current_state(), Door::Open);
//! assert_eq!(engine.history().get_path(), vec![&Door::Closed, &Door::Open]);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod feedback;
pub mod input;
pub mod kiosk;
mod macros;
pub mod peripherals;
pub mod time;

// Re-export commonly used types
pub use core::{ConfigError, Event, State, StateHistory, StateTransition};
pub use engine::{ActionContext, Dispatch, StateActions, StateMachineEngine, StopHandle, Tick};
