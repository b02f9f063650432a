//! The state machine engine.
//!
//! Setup happens in one phase: register buttons, timers and custom events,
//! then add transitions. [`StateMachineEngine::start`] validates the whole
//! setup and enters the initial state; after that the setup is frozen and the
//! loop dispatches one event per tick.
//!
//! Actions talk back to the engine only through [`ActionContext`]. Raised
//! events, timer requests and stop requests are applied after the action
//! returns, which keeps every callback free of re-entrancy.

mod actions;
mod machine;
mod source;
mod table;
mod validation;

pub use actions::{ActionContext, StateActions};
pub use machine::{Dispatch, StateMachineEngine, StopHandle, Tick};
pub use source::{EventSender, EventSource, SendError};
pub use table::TransitionTable;
pub use validation::{into_result, validate_events};
