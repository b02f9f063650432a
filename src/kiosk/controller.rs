//! The kiosk's state actions.

use super::states::{FeedbackButton, KioskState, Location, AVG_AT_OR_UNDER_TRIGGER, AVG_OVER_TRIGGER};
use crate::config::KioskConfig;
use crate::core::Event;
use crate::engine::{ActionContext, StateActions};
use crate::feedback::{AlertDecision, AlertPolicy, LocationFeedbackCollector};
use crate::peripherals::{
    Buzzer, Color, Display, LightStrip, LoggingBuzzer, LoggingDisplay, LoggingLightStrip,
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Output devices owned by the kiosk.
pub struct KioskPeripherals {
    pub display: Box<dyn Display>,
    pub central_buzzer: Box<dyn Buzzer>,
    pub mens_buzzer: Box<dyn Buzzer>,
    pub womens_buzzer: Box<dyn Buzzer>,
    pub light_strip: Box<dyn LightStrip>,
}

impl KioskPeripherals {
    /// Tracing-backed devices for running without hardware.
    pub fn logging(config: &KioskConfig) -> Self {
        Self {
            display: Box::new(LoggingDisplay::new()),
            central_buzzer: Box::new(LoggingBuzzer::new("central")),
            mens_buzzer: Box::new(LoggingBuzzer::new("mens")),
            womens_buzzer: Box::new(LoggingBuzzer::new("womens")),
            light_strip: Box::new(LoggingLightStrip::new(config.pins.light_strip_leds)),
        }
    }

    fn location_buzzer(&mut self, location: Location) -> &mut Box<dyn Buzzer> {
        match location {
            Location::Mens => &mut self.mens_buzzer,
            Location::Womens => &mut self.womens_buzzer,
        }
    }
}

impl fmt::Debug for KioskPeripherals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KioskPeripherals").finish_non_exhaustive()
    }
}

/// Restroom feedback kiosk.
///
/// Visitors rate each restroom with one of three buttons. Every rating is
/// recorded for its location and the averages are re-checked; if any
/// location with feedback drops to the alert threshold or below, the kiosk
/// alerts the manager until the reset button is pressed.
#[derive(Debug)]
pub struct FeedbackKiosk {
    mens: LocationFeedbackCollector,
    womens: LocationFeedbackCollector,
    policy: AlertPolicy,
    peripherals: KioskPeripherals,
    feedback_beep: Duration,
    alert_beep: Duration,
    alert_tone_hz: u32,
}

impl FeedbackKiosk {
    pub fn new(config: &KioskConfig, peripherals: KioskPeripherals) -> Self {
        Self {
            mens: LocationFeedbackCollector::new(Location::Mens.name()),
            womens: LocationFeedbackCollector::new(Location::Womens.name()),
            policy: AlertPolicy::new(config.alert_threshold),
            peripherals,
            feedback_beep: config.feedback_beep(),
            alert_beep: config.alert_beep(),
            alert_tone_hz: config.alert_tone_hz,
        }
    }

    pub fn collector(&self, location: Location) -> &LocationFeedbackCollector {
        match location {
            Location::Mens => &self.mens,
            Location::Womens => &self.womens,
        }
    }

    fn collector_mut(&mut self, location: Location) -> &mut LocationFeedbackCollector {
        match location {
            Location::Mens => &mut self.mens,
            Location::Womens => &mut self.womens,
        }
    }

    /// Line shown on the first display row.
    pub fn stats_line(&self) -> String {
        format!(" M:{:.1} W:{:.1}", self.mens.average(), self.womens.average())
    }

    pub fn alert_decision(&self) -> AlertDecision {
        self.policy.evaluate([&self.mens, &self.womens])
    }

    fn show_location_stats(&mut self) {
        let line = self.stats_line();
        self.peripherals.display.clear();
        self.peripherals.display.show_text(&line, 0);
    }

    fn record_feedback(&mut self, event: &Event) {
        let Some(button) = FeedbackButton::for_press_event(event.name()) else {
            warn!(event = %event, "scoring state entered without a feedback button");
            return;
        };
        let score = button.rating.score();
        self.collector_mut(button.location).record_feedback(score);
        debug!(location = button.location.name(), score, "feedback recorded");

        let beep = self.feedback_beep;
        self.peripherals
            .location_buzzer(button.location)
            .beep(button.rating.tone_hz(), beep);
    }

    fn check_averages(&mut self, ctx: &mut ActionContext) {
        self.show_location_stats();
        if !self.mens.has_feedback() && !self.womens.has_feedback() {
            debug!("no feedback data yet");
        }
        match self.alert_decision() {
            AlertDecision::Notify => ctx.raise(AVG_AT_OR_UNDER_TRIGGER),
            AlertDecision::AllClear => ctx.raise(AVG_OVER_TRIGGER),
        }
    }

    fn notify_manager(&mut self) {
        info!(
            mens = self.mens.average(),
            womens = self.womens.average(),
            "notifying manager"
        );
        self.peripherals.display.show_text(" Check Bathrooms", 1);
        let buzzer = &mut self.peripherals.central_buzzer;
        buzzer.beep(self.alert_tone_hz, self.alert_beep);
        buzzer.rest(self.alert_beep);
        buzzer.beep(self.alert_tone_hz, self.alert_beep);
        self.peripherals.light_strip.set_color(Color::RED);
    }

    fn system_reset(&mut self) {
        info!("system reset");
        self.peripherals.light_strip.off();
        self.mens.clear();
        self.womens.clear();
        self.show_location_stats();
    }
}

impl StateActions<KioskState> for FeedbackKiosk {
    fn state_entered(&mut self, state: KioskState, event: &Event, ctx: &mut ActionContext) {
        debug!(state = ?state, event = %event, "state entered");
        match state {
            KioskState::Idle => self.show_location_stats(),
            KioskState::Unsatisfied | KioskState::Neutral | KioskState::Satisfied => {
                self.record_feedback(event)
            }
            KioskState::CheckAverages => self.check_averages(ctx),
            KioskState::NotifyManager => self.notify_manager(),
            KioskState::Reset => self.system_reset(),
        }
    }

    fn state_left(&mut self, state: KioskState, event: &Event, _ctx: &mut ActionContext) {
        debug!(state = ?state, event = %event, "state left");
    }

    fn state_do(&mut self, _state: KioskState, _ctx: &mut ActionContext) {}

    fn state_event(&mut self, _state: KioskState, _event: &Event, _ctx: &mut ActionContext) -> bool {
        false
    }
}
