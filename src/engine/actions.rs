//! Application callbacks and the handle they use to talk back to the engine.

use crate::core::{Event, State};
use std::time::Duration;

/// The application side of the engine.
///
/// The engine holds exactly one implementor and calls it synchronously from
/// its loop thread, so implementations need no locking. Every callback should
/// return quickly: the loop does not poll inputs while an action runs.
pub trait StateActions<S: State> {
    /// Entry action. Runs once each time `state` is entered, with the event
    /// that caused the transition (`no_event` for the initial entry).
    fn state_entered(&mut self, state: S, event: &Event, ctx: &mut ActionContext);

    /// Exit action. Runs once each time `state` is left.
    fn state_left(&mut self, state: S, event: &Event, ctx: &mut ActionContext);

    /// Do-action. Runs on every tick that has no event to dispatch.
    fn state_do(&mut self, state: S, ctx: &mut ActionContext);

    /// In-state handler, consulted only when no transition matches.
    /// Return `true` if the event was consumed.
    fn state_event(&mut self, state: S, event: &Event, ctx: &mut ActionContext) -> bool;
}

/// A request made by an action, applied after the action returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Raise(String),
    StartTimer {
        name: String,
        duration: Option<Duration>,
    },
    CancelTimer(String),
    Stop,
}

/// Handle passed to every action.
///
/// Requests are recorded and applied in order once the action returns, so an
/// action never re-enters the engine.
#[derive(Debug, Default)]
pub struct ActionContext {
    commands: Vec<Command>,
}

impl ActionContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raise a registered event. It is dispatched right after the current
    /// action, before anything already queued.
    pub fn raise(&mut self, event: impl Into<String>) {
        self.commands.push(Command::Raise(event.into()));
    }

    /// Arm a timer with its default duration.
    pub fn start_timer(&mut self, name: impl Into<String>) {
        self.commands.push(Command::StartTimer {
            name: name.into(),
            duration: None,
        });
    }

    /// Arm a timer for a specific duration.
    pub fn start_timer_for(&mut self, name: impl Into<String>, duration: Duration) {
        self.commands.push(Command::StartTimer {
            name: name.into(),
            duration: Some(duration),
        });
    }

    pub fn cancel_timer(&mut self, name: impl Into<String>) {
        self.commands.push(Command::CancelTimer(name.into()));
    }

    /// Ask the engine to stop after this action. No further actions run.
    pub fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }

    pub(crate) fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}
