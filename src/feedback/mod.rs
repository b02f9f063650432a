//! Feedback scores per location and the alert decision over them.
//!
//! All of these are plain owned values mutated from action callbacks, so they
//! need no synchronization.

mod alert;
mod collector;
mod list;

pub use alert::{AlertDecision, AlertPolicy, DEFAULT_ALERT_THRESHOLD};
pub use collector::LocationFeedbackCollector;
pub use list::FeedbackList;
