//! Restroom feedback kiosk built on the engine.
//!
//! ```text
//! Idle --{loc}_unsatisfied_press--> Unsatisfied --no_event--+
//! Idle --{loc}_neutral_press-----> Neutral -----no_event--+--> CheckAverages
//! Idle --{loc}_satisfied_press---> Satisfied ---no_event--+
//!
//! CheckAverages --avg_over_trigger--------> Idle
//! CheckAverages --avg_at_or_under_trigger-> NotifyManager --reset_press--> Reset --no_event--> Idle
//! ```

mod controller;
mod states;

pub use controller::{FeedbackKiosk, KioskPeripherals};
pub use states::{
    FeedbackButton, KioskState, Location, Rating, AVG_AT_OR_UNDER_TRIGGER, AVG_OVER_TRIGGER,
    FEEDBACK_BUTTONS, RESET_BUTTON,
};

use crate::config::KioskConfig;
use crate::core::{press_event_name, ConfigError, NO_EVENT};
use crate::engine::StateMachineEngine;
use crate::input::LevelSource;
use crate::time::Clock;

pub type KioskEngine = StateMachineEngine<KioskState, FeedbackKiosk>;

/// Wire up a validated kiosk engine.
///
/// `pin_for` is called once per button with the button name and its GPIO
/// number from `config.pins`, and returns the line to read.
pub fn build_kiosk_engine<P, F>(
    config: &KioskConfig,
    peripherals: KioskPeripherals,
    clock: impl Clock + 'static,
    mut pin_for: F,
) -> Result<KioskEngine, ConfigError>
where
    P: LevelSource + 'static,
    F: FnMut(&str, u8) -> P,
{
    config.validate()?;

    let kiosk = FeedbackKiosk::new(config, peripherals);
    let mut engine = StateMachineEngine::with_clock(kiosk, config.engine.clone(), clock);

    let active = config.pins.button_active_level;
    for button in &FEEDBACK_BUTTONS {
        let pin = pin_for(button.name, button.gpio(&config.pins));
        engine.add_button_pin(pin, button.name, active)?;
    }
    let reset = pin_for(RESET_BUTTON, config.pins.reset);
    engine.add_button_pin(reset, RESET_BUTTON, active)?;

    engine.add_custom_event(AVG_OVER_TRIGGER)?;
    engine.add_custom_event(AVG_AT_OR_UNDER_TRIGGER)?;

    for button in &FEEDBACK_BUTTONS {
        let press = press_event_name(button.name);
        engine.add_transition(KioskState::Idle, &[press.as_str()], button.rating.state())?;
    }
    for scoring in [KioskState::Unsatisfied, KioskState::Neutral, KioskState::Satisfied] {
        engine.add_transition(scoring, &[NO_EVENT], KioskState::CheckAverages)?;
    }
    engine.add_transition(KioskState::CheckAverages, &[AVG_OVER_TRIGGER], KioskState::Idle)?;
    engine.add_transition(
        KioskState::CheckAverages,
        &[AVG_AT_OR_UNDER_TRIGGER],
        KioskState::NotifyManager,
    )?;
    let reset_press = press_event_name(RESET_BUTTON);
    engine.add_transition(KioskState::NotifyManager, &[reset_press.as_str()], KioskState::Reset)?;
    engine.add_transition(KioskState::Reset, &[NO_EVENT], KioskState::Idle)?;

    engine.validate()?;
    Ok(engine)
}
