//! The event-driven state machine engine.

use super::actions::{ActionContext, Command, StateActions};
use super::source::{EventSender, EventSource};
use super::table::TransitionTable;
use super::validation::{into_result, validate_events};
use crate::config::EngineConfig;
use crate::core::{ConfigError, Event, State, StateHistory, StateTransition};
use crate::input::{ActiveLevel, Button, LevelSource};
use crate::time::{Clock, MonotonicClock, Timer};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Cloneable handle that stops a running engine from any thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop. The loop finishes the action in progress, runs no
    /// further actions, and detaches inputs before `run()` returns.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// What happened to a dispatched event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch<S> {
    /// A table transition was taken.
    Transitioned { from: S, to: S },
    /// No transition matched; the in-state handler consumed the event.
    Handled,
    /// No transition matched and the in-state handler declined it.
    Dropped,
    /// The engine was stopped before the event was processed.
    Stopped,
}

/// Result of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick<S> {
    Dispatched(Dispatch<S>),
    /// Nothing was pending; the do-action ran.
    Idle,
    Stopped,
}

/// An event waiting in the current dispatch cycle.
struct Chained<S> {
    event: Event,
    /// Only dispatch if the machine is still in this state.
    only_in: Option<S>,
}

/// Event-driven finite state machine.
///
/// The engine owns the transition table, the current state and the event
/// source. Everything runs on the thread calling [`run`](Self::run) or
/// [`tick`](Self::tick); actions never run concurrently.
///
/// Processing an event `E` in state `S`:
/// 1. If the table maps `(S, E)` to `D`: exit action of `S`, state becomes `D`,
///    entry action of `D`. Events raised by those actions are dispatched next,
///    followed by `no_event` if `D` has an unconditional transition.
/// 2. Otherwise the in-state handler decides; if it declines, the event is
///    dropped.
///
/// A table transition always wins over the in-state handler.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::config::EngineConfig;
/// use kiosk_fsm::core::Event;
/// use kiosk_fsm::engine::{ActionContext, Dispatch, StateActions, StateMachineEngine};
/// use kiosk_fsm::state_enum;
///
/// state_enum! {
///     enum Lamp {
///         Off,
///         On,
///     }
/// }
///
/// #[derive(Default)]
/// struct Counter {
///     switched_on: u32,
/// }
///
/// impl StateActions<Lamp> for Counter {
///     fn state_entered(&mut self, state: Lamp, _event: &Event, _ctx: &mut ActionContext) {
///         if state == Lamp::On {
///             self.switched_on += 1;
///         }
///     }
///     fn state_left(&mut self, _state: Lamp, _event: &Event, _ctx: &mut ActionContext) {}
///     fn state_do(&mut self, _state: Lamp, _ctx: &mut ActionContext) {}
///     fn state_event(&mut self, _state: Lamp, _event: &Event, _ctx: &mut ActionContext) -> bool {
///         false
///     }
/// }
///
/// let mut engine = StateMachineEngine::new(Counter::default(), EngineConfig::default());
/// engine.add_custom_event("toggle").unwrap();
/// engine.add_transition(Lamp::Off, &["toggle"], Lamp::On).unwrap();
/// engine.add_transition(Lamp::On, &["toggle"], Lamp::Off).unwrap();
/// engine.start().unwrap();
///
/// let outcome = engine.process_event("toggle").unwrap();
/// assert_eq!(outcome, Dispatch::Transitioned { from: Lamp::Off, to: Lamp::On });
/// assert_eq!(engine.actions().switched_on, 1);
/// ```
pub struct StateMachineEngine<S: State, A: StateActions<S>> {
    actions: A,
    current: S,
    table: TransitionTable<S>,
    source: EventSource,
    state_timers: Vec<Vec<String>>,
    history: StateHistory<S>,
    clock: Box<dyn Clock>,
    config: EngineConfig,
    stop: StopHandle,
    started: bool,
    detached: bool,
}

impl<S: State, A: StateActions<S>> StateMachineEngine<S, A> {
    /// Create an engine in the initial state, timed by the system clock.
    pub fn new(actions: A, config: EngineConfig) -> Self {
        Self::with_clock(actions, config, MonotonicClock::new())
    }

    /// Create an engine driven by `clock`.
    pub fn with_clock(actions: A, config: EngineConfig, clock: impl Clock + 'static) -> Self {
        Self {
            actions,
            current: S::initial(),
            table: TransitionTable::new(),
            source: EventSource::new(config.queue_capacity.max(1)),
            state_timers: vec![Vec::new(); S::COUNT],
            history: StateHistory::with_capacity(config.history_capacity),
            clock: Box::new(clock),
            config,
            stop: StopHandle::default(),
            started: false,
            detached: false,
        }
    }

    /// Register a button. Its events are `{name}_press` and `{name}_release`.
    pub fn add_button(&mut self, button: Button) -> Result<(), ConfigError> {
        self.ensure_setup()?;
        self.source.add_button(button)
    }

    /// Register a button on `pin`, debounced with the configured window.
    pub fn add_button_pin(
        &mut self,
        pin: impl LevelSource + 'static,
        name: &str,
        active: ActiveLevel,
    ) -> Result<(), ConfigError> {
        let button = Button::with_debounce(pin, name, active, self.config.debounce());
        self.add_button(button)
    }

    /// Register a timer. Its event is `{name}_timeout`.
    pub fn add_timer(&mut self, timer: Timer) -> Result<(), ConfigError> {
        self.ensure_setup()?;
        self.source.add_timer(timer)
    }

    pub fn add_custom_event(&mut self, name: &str) -> Result<(), ConfigError> {
        self.ensure_setup()?;
        self.source.add_custom_event(name)
    }

    /// Register `state --events--> dest`.
    ///
    /// Event names may be registered later, but must all be known by the time
    /// the engine starts.
    pub fn add_transition(&mut self, state: S, events: &[&str], dest: S) -> Result<(), ConfigError> {
        self.ensure_setup()?;
        self.table.add(state, events, dest)
    }

    /// Arm `timer` whenever `state` is entered and cancel it when `state` is
    /// left.
    pub fn add_state_timer(&mut self, state: S, timer: &str) -> Result<(), ConfigError> {
        self.ensure_setup()?;
        if !self.source.has_timer(timer) {
            return Err(ConfigError::UnknownTimer {
                name: timer.to_string(),
            });
        }
        let timers = &mut self.state_timers[state.index()];
        if !timers.iter().any(|name| name == timer) {
            timers.push(timer.to_string());
        }
        Ok(())
    }

    /// Check the whole setup, reporting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        into_result(validate_events(&self.table, self.source.registry()))
    }

    /// Validate and enter the initial state. Called by `run()` and on the
    /// first `tick()` or dispatch; calling it again does nothing.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.started {
            return Ok(());
        }
        self.validate()?;
        self.started = true;
        if self.stop.is_stopped() {
            return Ok(());
        }

        let initial = self.current;
        info!(
            initial = initial.name(),
            states = S::COUNT,
            transitions = self.table.len(),
            "state machine started"
        );

        self.arm_state_timers(initial);
        let event = Event::no_event();
        let mut ctx = ActionContext::new();
        self.actions.state_entered(initial, &event, &mut ctx);
        let mut chain: VecDeque<Chained<S>> = self.apply_commands(ctx)?.into();
        if self.table.has_auto_transition(initial) {
            chain.push_back(Chained {
                event,
                only_in: Some(initial),
            });
        }
        self.run_chain(chain)?;
        Ok(())
    }

    /// Run until stopped.
    ///
    /// Each iteration dispatches at most one pending event, or runs the
    /// do-action when nothing is pending, then sleeps for the poll interval.
    /// Inputs are detached before this returns, including on error.
    pub fn run(&mut self) -> Result<(), ConfigError> {
        let result = self.run_loop();
        self.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<(), ConfigError> {
        self.start()?;
        let poll_interval = self.config.poll_interval();
        loop {
            if let Tick::Stopped = self.tick()? {
                return Ok(());
            }
            std::thread::sleep(poll_interval);
        }
    }

    /// One loop iteration without the sleep.
    pub fn tick(&mut self) -> Result<Tick<S>, ConfigError> {
        if self.stop.is_stopped() {
            self.shutdown();
            return Ok(Tick::Stopped);
        }
        self.start()?;

        let now = self.clock.now();
        self.source.poll(now);

        if let Some(event) = self.source.next_event() {
            return self.dispatch(event).map(Tick::Dispatched);
        }

        let state = self.current;
        let mut ctx = ActionContext::new();
        self.actions.state_do(state, &mut ctx);
        let chain = self.apply_commands(ctx)?.into();
        self.run_chain(chain)?;
        Ok(Tick::Idle)
    }

    /// Dispatch an event now, followed by every event it chains into.
    ///
    /// Returns the outcome for `event` itself.
    pub fn dispatch(&mut self, event: Event) -> Result<Dispatch<S>, ConfigError> {
        self.start()?;
        let chain = VecDeque::from([Chained {
            event,
            only_in: None,
        }]);
        Ok(self.run_chain(chain)?.unwrap_or(Dispatch::Stopped))
    }

    /// Dispatch a registered event by name, now.
    pub fn process_event(&mut self, name: &str) -> Result<Dispatch<S>, ConfigError> {
        let event = self.resolve(name)?;
        self.dispatch(event)
    }

    /// Queue a registered event behind anything already pending.
    pub fn inject(&mut self, name: &str) -> Result<(), ConfigError> {
        let event = self.resolve(name)?;
        self.source.push(event.name())
    }

    /// Stop the engine and detach every button and timer. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown();
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut A {
        &mut self.actions
    }

    pub fn table(&self) -> &TransitionTable<S> {
        &self.table
    }

    /// Buttons, timers and pending events.
    pub fn source(&self) -> &EventSource {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Handle for injecting events from other threads.
    pub fn sender(&self) -> EventSender {
        self.source.sender()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    fn ensure_setup(&self) -> Result<(), ConfigError> {
        if self.started {
            Err(ConfigError::AlreadyStarted)
        } else {
            Ok(())
        }
    }

    fn resolve(&self, name: &str) -> Result<Event, ConfigError> {
        self.source
            .registry()
            .event(name)
            .ok_or_else(|| ConfigError::UnregisteredEvent {
                state: self.current.name().to_string(),
                event: name.to_string(),
            })
    }

    fn shutdown(&mut self) {
        self.stop.stop();
        if !self.detached {
            self.detached = true;
            self.source.detach_all();
            info!(state = self.current.name(), "state machine stopped; inputs detached");
        }
    }

    /// Process `chain` depth-first: events raised while handling an event run
    /// before the rest of the chain.
    fn run_chain(&mut self, mut chain: VecDeque<Chained<S>>) -> Result<Option<Dispatch<S>>, ConfigError> {
        let mut first = None;
        let mut processed = 0;

        while let Some(Chained { event, only_in }) = chain.pop_front() {
            if self.stop.is_stopped() {
                first.get_or_insert(Dispatch::Stopped);
                break;
            }
            if only_in.is_some_and(|state| state != self.current) {
                trace!(event = %event, "skipping auto transition; state already left");
                continue;
            }

            processed += 1;
            if processed > self.config.max_chain_depth {
                return Err(ConfigError::ChainDepthExceeded {
                    limit: self.config.max_chain_depth,
                    state: self.current.name().to_string(),
                    event: event.name().to_string(),
                });
            }

            let (outcome, follow_ups) = self.dispatch_one(&event)?;
            first.get_or_insert(outcome);
            for follow_up in follow_ups.into_iter().rev() {
                chain.push_front(follow_up);
            }
        }

        Ok(first)
    }

    fn dispatch_one(&mut self, event: &Event) -> Result<(Dispatch<S>, Vec<Chained<S>>), ConfigError> {
        let state = self.current;

        let Some(dest) = self.table.lookup(state, event.name()) else {
            let mut ctx = ActionContext::new();
            let handled = self.actions.state_event(state, event, &mut ctx);
            let follow_ups = self.apply_commands(ctx)?;
            return if handled {
                trace!(state = state.name(), event = %event, "event handled in state");
                Ok((Dispatch::Handled, follow_ups))
            } else {
                trace!(state = state.name(), event = %event, "event dropped");
                Ok((Dispatch::Dropped, follow_ups))
            };
        };

        let mut ctx = ActionContext::new();
        self.actions.state_left(state, event, &mut ctx);
        self.cancel_state_timers(state);

        self.current = dest;
        self.history.record(StateTransition {
            from: state,
            to: dest,
            event: event.name().to_string(),
            timestamp: Utc::now(),
        });
        debug!(from = state.name(), to = dest.name(), event = %event, "state transition");

        self.arm_state_timers(dest);
        self.actions.state_entered(dest, event, &mut ctx);

        let mut follow_ups = self.apply_commands(ctx)?;
        if self.table.has_auto_transition(dest) {
            follow_ups.push(Chained {
                event: Event::no_event(),
                only_in: Some(dest),
            });
        }
        Ok((Dispatch::Transitioned { from: state, to: dest }, follow_ups))
    }

    fn apply_commands(&mut self, ctx: ActionContext) -> Result<Vec<Chained<S>>, ConfigError> {
        let now = self.clock.now();
        let mut follow_ups = Vec::new();

        for command in ctx.into_commands() {
            match command {
                Command::Raise(name) => {
                    let event = self.resolve(&name)?;
                    follow_ups.push(Chained {
                        event,
                        only_in: None,
                    });
                }
                Command::StartTimer { name, duration } => {
                    self.source.arm_timer(&name, now, duration)?;
                }
                Command::CancelTimer(name) => self.source.cancel_timer(&name)?,
                Command::Stop => {
                    debug!(state = self.current.name(), "stop requested by action");
                    self.stop.stop();
                }
            }
        }

        Ok(follow_ups)
    }

    fn arm_state_timers(&mut self, state: S) {
        let now = self.clock.now();
        for name in &self.state_timers[state.index()] {
            if let Err(err) = self.source.arm_timer(name, now, None) {
                warn!(error = %err, "failed to arm state timer");
            }
        }
    }

    fn cancel_state_timers(&mut self, state: S) {
        for name in &self.state_timers[state.index()] {
            if let Err(err) = self.source.cancel_timer(name) {
                warn!(error = %err, "failed to cancel state timer");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NO_EVENT;
    use crate::input::{ActiveLevel, SimulatedPin};
    use crate::time::ManualClock;
    use std::time::Duration;

    crate::state_enum! {
        enum TestState {
            Idle,
            Active,
            Done,
        }
    }

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        handle_in_state: bool,
        raise_on_entry: Vec<(TestState, &'static str)>,
        do_raise: Option<&'static str>,
    }

    impl StateActions<TestState> for Recorder {
        fn state_entered(&mut self, state: TestState, event: &Event, ctx: &mut ActionContext) {
            self.log.push(format!("enter {} on {}", state.name(), event));
            for (target, name) in &self.raise_on_entry {
                if *target == state {
                    ctx.raise(*name);
                }
            }
        }

        fn state_left(&mut self, state: TestState, event: &Event, _ctx: &mut ActionContext) {
            self.log.push(format!("exit {} on {}", state.name(), event));
        }

        fn state_do(&mut self, state: TestState, ctx: &mut ActionContext) {
            self.log.push(format!("do {}", state.name()));
            if let Some(name) = self.do_raise.take() {
                ctx.raise(name);
            }
        }

        fn state_event(&mut self, state: TestState, event: &Event, _ctx: &mut ActionContext) -> bool {
            self.log.push(format!("event {} in {}", event, state.name()));
            self.handle_in_state
        }
    }

    fn engine(recorder: Recorder) -> (ManualClock, StateMachineEngine<TestState, Recorder>) {
        let clock = ManualClock::new();
        let engine = StateMachineEngine::with_clock(recorder, EngineConfig::default(), clock.clone());
        (clock, engine)
    }

    #[test]
    fn start_enters_initial_state_once() {
        let (_, mut engine) = engine(Recorder::default());
        engine.start().unwrap();
        engine.start().unwrap();

        assert_eq!(engine.actions().log, vec!["enter Idle on no_event"]);
        assert!(engine.is_started());
    }

    #[test]
    fn transition_runs_exit_then_entry() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.start().unwrap();

        let outcome = engine.process_event("go").unwrap();

        assert_eq!(
            outcome,
            Dispatch::Transitioned {
                from: TestState::Idle,
                to: TestState::Active
            }
        );
        assert_eq!(
            engine.actions().log[1..],
            ["exit Idle on go", "enter Active on go"]
        );
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn transition_takes_precedence_over_in_state_handler() {
        let (_, mut engine) = engine(Recorder {
            handle_in_state: true,
            ..Recorder::default()
        });
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();

        engine.process_event("go").unwrap();

        assert_eq!(engine.current_state(), TestState::Active);
        assert!(!engine.actions().log.iter().any(|line| line.starts_with("event")));
    }

    #[test]
    fn unmatched_event_goes_to_in_state_handler() {
        let (_, mut engine) = engine(Recorder {
            handle_in_state: true,
            ..Recorder::default()
        });
        engine.add_custom_event("poke").unwrap();

        assert_eq!(engine.process_event("poke").unwrap(), Dispatch::Handled);
        assert_eq!(engine.current_state(), TestState::Idle);
        assert_eq!(
            engine
                .actions()
                .log
                .iter()
                .filter(|line| *line == "event poke in Idle")
                .count(),
            1
        );
    }

    #[test]
    fn declined_event_is_dropped() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("poke").unwrap();

        assert_eq!(engine.process_event("poke").unwrap(), Dispatch::Dropped);
        assert_eq!(engine.current_state(), TestState::Idle);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn no_event_transition_is_taken_after_entry() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &[NO_EVENT], TestState::Done).unwrap();

        engine.process_event("go").unwrap();

        assert_eq!(engine.current_state(), TestState::Done);
        assert_eq!(
            engine.actions().log[1..],
            [
                "exit Idle on go",
                "enter Active on go",
                "exit Active on no_event",
                "enter Done on no_event"
            ]
        );
    }

    #[test]
    fn explicit_no_event_does_not_double_fire() {
        let (_, mut engine) = engine(Recorder {
            raise_on_entry: vec![(TestState::Active, NO_EVENT)],
            ..Recorder::default()
        });
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &[NO_EVENT], TestState::Done).unwrap();

        engine.process_event("go").unwrap();

        assert_eq!(engine.current_state(), TestState::Done);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn raised_event_from_entry_drives_next_transition() {
        let (_, mut engine) = engine(Recorder {
            raise_on_entry: vec![(TestState::Active, "finish")],
            ..Recorder::default()
        });
        engine.add_custom_event("go").unwrap();
        engine.add_custom_event("finish").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &["finish"], TestState::Done).unwrap();

        engine.process_event("go").unwrap();
        assert_eq!(engine.current_state(), TestState::Done);
    }

    #[test]
    fn cyclic_no_event_chain_fails_loudly() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &[NO_EVENT], TestState::Done).unwrap();
        engine.add_transition(TestState::Done, &[NO_EVENT], TestState::Active).unwrap();

        let result = engine.process_event("go");
        assert!(matches!(
            result,
            Err(ConfigError::ChainDepthExceeded { limit: 16, .. })
        ));
    }

    #[test]
    fn unregistered_transition_event_fails_at_start() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_transition(TestState::Idle, &["ghost"], TestState::Active).unwrap();

        let result = engine.start();
        assert_eq!(
            result,
            Err(ConfigError::UnregisteredEvent {
                state: "Idle".to_string(),
                event: "ghost".to_string(),
            })
        );
        assert!(!engine.is_started());
        assert!(engine.actions().log.is_empty());
    }

    #[test]
    fn raising_unregistered_event_is_an_error() {
        let (_, mut engine) = engine(Recorder {
            do_raise: Some("ghost"),
            ..Recorder::default()
        });

        let result = engine.tick();
        assert!(matches!(result, Err(ConfigError::UnregisteredEvent { .. })));
    }

    #[test]
    fn setup_after_start_is_rejected() {
        let (_, mut engine) = engine(Recorder::default());
        engine.start().unwrap();

        assert_eq!(engine.add_custom_event("late"), Err(ConfigError::AlreadyStarted));
    }

    #[test]
    fn idle_tick_runs_do_action() {
        let (_, mut engine) = engine(Recorder::default());
        assert_eq!(engine.tick().unwrap(), Tick::Idle);
        assert_eq!(engine.tick().unwrap(), Tick::Idle);

        let do_count = engine
            .actions()
            .log
            .iter()
            .filter(|line| *line == "do Idle")
            .count();
        assert_eq!(do_count, 2);
    }

    #[test]
    fn do_action_can_raise_transition() {
        let (_, mut engine) = engine(Recorder {
            do_raise: Some("motion"),
            ..Recorder::default()
        });
        engine.add_custom_event("motion").unwrap();
        engine.add_transition(TestState::Idle, &["motion"], TestState::Active).unwrap();

        assert_eq!(engine.tick().unwrap(), Tick::Idle);
        assert_eq!(engine.current_state(), TestState::Active);
    }

    #[test]
    fn one_event_dispatched_per_tick() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("a").unwrap();
        engine.add_custom_event("b").unwrap();
        engine.add_transition(TestState::Idle, &["a"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &["b"], TestState::Done).unwrap();
        engine.start().unwrap();
        engine.inject("a").unwrap();
        engine.inject("b").unwrap();

        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Active);
        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Done);
        assert_eq!(engine.tick().unwrap(), Tick::Idle);
    }

    #[test]
    fn state_timer_armed_on_entry_and_cancelled_on_exit() {
        let (clock, mut engine) = engine(Recorder::default());
        engine.add_custom_event("go").unwrap();
        engine.add_custom_event("back").unwrap();
        engine
            .add_timer(Timer::new("linger", Duration::from_secs(5)))
            .unwrap();
        engine.add_state_timer(TestState::Active, "linger").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.add_transition(TestState::Active, &["back"], TestState::Idle).unwrap();
        engine
            .add_transition(TestState::Active, &["linger_timeout"], TestState::Done)
            .unwrap();

        engine.process_event("go").unwrap();
        assert!(engine.source().timer("linger").unwrap().is_pending());

        engine.process_event("back").unwrap();
        assert!(!engine.source().timer("linger").unwrap().is_pending());

        engine.process_event("go").unwrap();
        clock.advance(Duration::from_secs(5));
        assert_eq!(
            engine.tick().unwrap(),
            Tick::Dispatched(Dispatch::Transitioned {
                from: TestState::Active,
                to: TestState::Done
            })
        );
    }

    #[test]
    fn timeout_queued_before_exit_is_not_delivered() {
        let (clock, mut engine) = engine(Recorder::default());
        engine.add_custom_event("next").unwrap();
        engine
            .add_timer(Timer::new("t", Duration::from_secs(5)))
            .unwrap();
        engine.add_state_timer(TestState::Idle, "t").unwrap();
        engine.add_state_timer(TestState::Active, "t").unwrap();
        engine.add_transition(TestState::Idle, &["next"], TestState::Active).unwrap();
        engine
            .add_transition(TestState::Active, &["t_timeout"], TestState::Done)
            .unwrap();
        engine.start().unwrap();

        clock.set(Duration::from_secs(5));
        engine.inject("next").unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Active);
        assert!(engine.source().timer("t").unwrap().is_pending());

        assert_eq!(engine.tick().unwrap(), Tick::Idle);
        assert_eq!(engine.current_state(), TestState::Active);

        clock.set(Duration::from_secs(10));
        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Done);
    }

    #[test]
    fn button_pin_uses_configured_debounce() {
        let clock = ManualClock::new();
        let config = EngineConfig {
            debounce_ms: 80,
            ..EngineConfig::default()
        };
        let mut engine = StateMachineEngine::with_clock(Recorder::default(), config, clock.clone());
        let pin = SimulatedPin::new(ActiveLevel::Low);
        engine.add_button_pin(pin.clone(), "b", ActiveLevel::Low).unwrap();
        engine.add_transition(TestState::Idle, &["b_press"], TestState::Active).unwrap();
        engine.tick().unwrap();

        pin.press();
        engine.tick().unwrap();
        clock.advance(Duration::from_millis(50));
        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Idle);

        clock.advance(Duration::from_millis(30));
        engine.tick().unwrap();
        assert_eq!(engine.current_state(), TestState::Active);
        assert_eq!(engine.source().button("b").unwrap().debounce(), Duration::from_millis(80));
    }

    #[test]
    fn state_timer_must_exist() {
        let (_, mut engine) = engine(Recorder::default());
        let result = engine.add_state_timer(TestState::Active, "missing");
        assert!(matches!(result, Err(ConfigError::UnknownTimer { .. })));
    }

    #[test]
    fn stop_is_idempotent_and_detaches_buttons() {
        let (_, mut engine) = engine(Recorder::default());
        let pin = SimulatedPin::new(ActiveLevel::Low);
        engine
            .add_button(Button::new(pin.clone(), "b", ActiveLevel::Low))
            .unwrap();
        engine.start().unwrap();

        engine.stop();
        engine.stop();

        assert!(pin.is_detached());
        assert!(engine.is_stopped());
        assert_eq!(engine.tick().unwrap(), Tick::Stopped);
    }

    #[test]
    fn stop_handle_prevents_further_actions() {
        let (_, mut engine) = engine(Recorder::default());
        engine.add_custom_event("go").unwrap();
        engine.add_transition(TestState::Idle, &["go"], TestState::Active).unwrap();
        engine.start().unwrap();

        engine.stop_handle().stop();
        let log_len = engine.actions().log.len();

        assert_eq!(engine.process_event("go").unwrap(), Dispatch::Stopped);
        assert_eq!(engine.tick().unwrap(), Tick::Stopped);
        assert_eq!(engine.actions().log.len(), log_len);
        assert_eq!(engine.current_state(), TestState::Idle);
    }

    #[test]
    fn run_returns_when_stopped_by_action() {
        struct StopAtOnce;

        impl StateActions<TestState> for StopAtOnce {
            fn state_entered(&mut self, _: TestState, _: &Event, ctx: &mut ActionContext) {
                ctx.stop();
            }
            fn state_left(&mut self, _: TestState, _: &Event, _: &mut ActionContext) {}
            fn state_do(&mut self, _: TestState, _: &mut ActionContext) {}
            fn state_event(&mut self, _: TestState, _: &Event, _: &mut ActionContext) -> bool {
                false
            }
        }

        let config = EngineConfig {
            poll_interval_ms: 1,
            ..EngineConfig::default()
        };
        let mut engine = StateMachineEngine::with_clock(StopAtOnce, config, ManualClock::new());
        engine.run().unwrap();
        assert!(engine.is_stopped());
    }
}
