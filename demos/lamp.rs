//! Lamp with an auto-off timer
//!
//! This example drives a two-state lamp from a debounced button and a state
//! timer, stepping a manual clock instead of sleeping.
//!
//! Key concepts:
//! - Buttons surface `{name}_press` / `{name}_release` events
//! - State timers arm on entry and cancel on exit
//! - `tick()` runs one loop iteration deterministically
//!
//! Run with: cargo run --example lamp

use kiosk_fsm::config::EngineConfig;
use kiosk_fsm::core::Event;
use kiosk_fsm::engine::{ActionContext, StateActions, StateMachineEngine};
use kiosk_fsm::input::{ActiveLevel, SimulatedPin};
use kiosk_fsm::state_enum;
use kiosk_fsm::time::{ManualClock, Timer};
use std::time::Duration;

state_enum! {
    enum Lamp {
        Off,
        On,
    }
}

struct Printer;

impl StateActions<Lamp> for Printer {
    fn state_entered(&mut self, state: Lamp, event: &Event, _ctx: &mut ActionContext) {
        println!("  lamp {:?} (on {})", state, event);
    }

    fn state_left(&mut self, _state: Lamp, _event: &Event, _ctx: &mut ActionContext) {}

    fn state_do(&mut self, _state: Lamp, _ctx: &mut ActionContext) {}

    fn state_event(&mut self, _state: Lamp, _event: &Event, _ctx: &mut ActionContext) -> bool {
        false
    }
}

fn main() {
    println!("=== Lamp Example ===\n");

    let clock = ManualClock::new();
    let pin = SimulatedPin::new(ActiveLevel::Low);
    let mut engine = StateMachineEngine::with_clock(Printer, EngineConfig::default(), clock.clone());

    engine.add_button_pin(pin.clone(), "switch", ActiveLevel::Low).unwrap();
    engine.add_timer(Timer::new("auto_off", Duration::from_secs(3))).unwrap();
    engine.add_state_timer(Lamp::On, "auto_off").unwrap();
    engine.add_transition(Lamp::Off, &["switch_press"], Lamp::On).unwrap();
    engine.add_transition(Lamp::On, &["switch_press", "auto_off_timeout"], Lamp::Off).unwrap();

    let step = |engine: &mut StateMachineEngine<Lamp, Printer>, ms: u64| {
        engine.tick().unwrap();
        clock.advance(Duration::from_millis(ms));
    };

    step(&mut engine, 100);

    println!("Pressing the switch:");
    pin.press();
    step(&mut engine, 100);
    step(&mut engine, 100);
    pin.release();
    step(&mut engine, 100);
    step(&mut engine, 100);

    println!("Waiting for the auto-off timer:");
    for _ in 0..30 {
        step(&mut engine, 100);
    }

    println!("\nPath: {:?}", engine.history().get_path());
    engine.stop();

    println!("\n=== Example Complete ===");
}
