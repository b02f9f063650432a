//! Kiosk states, locations and the feedback buttons.

use crate::config::KioskPins;
use crate::state_enum;
use serde::{Deserialize, Serialize};

state_enum! {
    /// States of the feedback kiosk. `Idle` is the initial state.
    pub enum KioskState {
        Idle,
        Unsatisfied,
        Neutral,
        Satisfied,
        CheckAverages,
        NotifyManager,
        Reset,
    }
}

/// A restroom with its own feedback buttons and buzzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Mens,
    Womens,
}

impl Location {
    pub fn name(self) -> &'static str {
        match self {
            Location::Mens => "Mens Restroom",
            Location::Womens => "Womens Restroom",
        }
    }
}

/// What a feedback button reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Unsatisfied,
    Neutral,
    Satisfied,
}

impl Rating {
    pub fn score(self) -> f64 {
        match self {
            Rating::Unsatisfied => 1.0,
            Rating::Neutral => 2.0,
            Rating::Satisfied => 3.0,
        }
    }

    /// Confirmation tone: G3, D4, C5.
    pub fn tone_hz(self) -> u32 {
        match self {
            Rating::Unsatisfied => 196,
            Rating::Neutral => 294,
            Rating::Satisfied => 523,
        }
    }

    /// State entered when this rating is pressed.
    pub fn state(self) -> KioskState {
        match self {
            Rating::Unsatisfied => KioskState::Unsatisfied,
            Rating::Neutral => KioskState::Neutral,
            Rating::Satisfied => KioskState::Satisfied,
        }
    }
}

/// One of the six rating buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackButton {
    pub name: &'static str,
    pub location: Location,
    pub rating: Rating,
}

impl FeedbackButton {
    const fn new(name: &'static str, location: Location, rating: Rating) -> Self {
        Self {
            name,
            location,
            rating,
        }
    }

    /// GPIO line the button is wired to.
    pub fn gpio(&self, pins: &KioskPins) -> u8 {
        match (self.location, self.rating) {
            (Location::Mens, Rating::Unsatisfied) => pins.mens_unsatisfied,
            (Location::Mens, Rating::Neutral) => pins.mens_neutral,
            (Location::Mens, Rating::Satisfied) => pins.mens_satisfied,
            (Location::Womens, Rating::Unsatisfied) => pins.womens_unsatisfied,
            (Location::Womens, Rating::Neutral) => pins.womens_neutral,
            (Location::Womens, Rating::Satisfied) => pins.womens_satisfied,
        }
    }

    /// The button whose press event is `event`, if any.
    pub fn for_press_event(event: &str) -> Option<&'static FeedbackButton> {
        let name = event.strip_suffix("_press")?;
        FEEDBACK_BUTTONS.iter().find(|button| button.name == name)
    }
}

pub const FEEDBACK_BUTTONS: [FeedbackButton; 6] = [
    FeedbackButton::new("mens_unsatisfied", Location::Mens, Rating::Unsatisfied),
    FeedbackButton::new("mens_neutral", Location::Mens, Rating::Neutral),
    FeedbackButton::new("mens_satisfied", Location::Mens, Rating::Satisfied),
    FeedbackButton::new("womens_unsatisfied", Location::Womens, Rating::Unsatisfied),
    FeedbackButton::new("womens_neutral", Location::Womens, Rating::Neutral),
    FeedbackButton::new("womens_satisfied", Location::Womens, Rating::Satisfied),
];

pub const RESET_BUTTON: &str = "reset";

/// Raised when every location with feedback averages above the threshold.
pub const AVG_OVER_TRIGGER: &str = "avg_over_trigger";

/// Raised when some location averages at or below the threshold.
pub const AVG_AT_OR_UNDER_TRIGGER: &str = "avg_at_or_under_trigger";
