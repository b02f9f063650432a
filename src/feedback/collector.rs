//! Per-location feedback collection.

use super::list::FeedbackList;
use serde::{Deserialize, Serialize};

/// Records feedback scores for one location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationFeedbackCollector {
    location: String,
    list: FeedbackList,
}

impl LocationFeedbackCollector {
    /// Create a collector with an empty list named after the location.
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let list = FeedbackList::new(location.clone());
        Self::with_list(location, list)
    }

    pub fn with_list(location: impl Into<String>, list: FeedbackList) -> Self {
        Self {
            location: location.into(),
            list,
        }
    }

    pub fn record_feedback(&mut self, score: f64) {
        self.list.append(score);
    }

    pub fn average(&self) -> f64 {
        self.list.average()
    }

    pub fn has_feedback(&self) -> bool {
        !self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn list(&self) -> &FeedbackList {
        &self.list
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}
