//! Scripted Feedback Kiosk
//!
//! This example runs the restroom feedback kiosk against simulated buttons
//! and prints what the display shows after each visitor.
//!
//! Key concepts:
//! - `build_kiosk_engine` wires buttons, events and transitions
//! - Pass-through states chain on `no_event`
//! - A low average raises the manager alert until reset
//!
//! Run with: cargo run --example kiosk_sim

use kiosk_fsm::config::KioskConfig;
use kiosk_fsm::input::SimulatedPin;
use kiosk_fsm::kiosk::{build_kiosk_engine, KioskEngine, KioskPeripherals, Location};
use kiosk_fsm::time::ManualClock;
use std::collections::HashMap;
use std::time::Duration;

fn click(engine: &mut KioskEngine, clock: &ManualClock, pin: &SimulatedPin) {
    for level in [true, false] {
        if level {
            pin.press();
        } else {
            pin.release();
        }
        for _ in 0..3 {
            engine.tick().unwrap();
            clock.advance(Duration::from_millis(50));
        }
    }
}

fn main() {
    println!("=== Feedback Kiosk Example ===\n");

    let config = KioskConfig::default();
    let clock = ManualClock::new();
    let mut pins = HashMap::new();
    let mut engine = build_kiosk_engine(
        &config,
        KioskPeripherals::logging(&config),
        clock.clone(),
        |name, _gpio| {
            let pin = SimulatedPin::new(config.pins.button_active_level);
            pins.insert(name.to_string(), pin.clone());
            pin
        },
    )
    .unwrap();
    engine.tick().unwrap();

    for button in [
        "mens_satisfied",
        "womens_neutral",
        "mens_unsatisfied",
        "mens_unsatisfied",
        "mens_unsatisfied",
        "reset",
    ] {
        click(&mut engine, &clock, &pins[button]);
        let kiosk = engine.actions();
        println!(
            "{:<18} -> {:<14} mens {:.1}  womens {:.1}",
            button,
            format!("{:?}", engine.current_state()),
            kiosk.collector(Location::Mens).average(),
            kiosk.collector(Location::Womens).average(),
        );
    }

    engine.stop();
    println!("\n=== Example Complete ===");
}
