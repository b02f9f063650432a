//! Whether the current averages call for a manager.

use super::collector::LocationFeedbackCollector;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALERT_THRESHOLD: f64 = 1.5;

/// Outcome of an [`AlertPolicy`] check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertDecision {
    /// Some location with feedback averages at or below the threshold.
    Notify,
    AllClear,
}

/// Threshold rule over location averages.
///
/// Locations without feedback are ignored, so an empty kiosk is all clear.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::feedback::{AlertDecision, AlertPolicy, LocationFeedbackCollector};
///
/// let policy = AlertPolicy::default();
/// let mut mens = LocationFeedbackCollector::new("Mens Restroom");
/// let womens = LocationFeedbackCollector::new("Womens Restroom");
///
/// mens.record_feedback(1.0);
/// assert_eq!(policy.evaluate([&mens, &womens]), AlertDecision::Notify);
///
/// mens.record_feedback(3.0);
/// assert_eq!(policy.evaluate([&mens, &womens]), AlertDecision::AllClear);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub threshold: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD)
    }
}

impl AlertPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate<'a>(
        &self,
        collectors: impl IntoIterator<Item = &'a LocationFeedbackCollector>,
    ) -> AlertDecision {
        let alert = collectors
            .into_iter()
            .any(|collector| collector.has_feedback() && collector.average() <= self.threshold);
        if alert {
            AlertDecision::Notify
        } else {
            AlertDecision::AllClear
        }
    }
}
