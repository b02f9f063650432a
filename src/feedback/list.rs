//! Ordered list of feedback scores with a running average.

use serde::{Deserialize, Serialize};

/// A named, ordered sequence of scores.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::feedback::FeedbackList;
///
/// let mut list = FeedbackList::new("Mens Restroom");
/// assert_eq!(list.average(), 0.0);
///
/// list.append(1.0);
/// list.append(2.0);
/// list.append(3.0);
/// assert_eq!(list.average(), 2.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackList {
    name: String,
    values: Vec<f64>,
}

impl FeedbackList {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_values(name, Vec::new())
    }

    pub fn with_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Arithmetic mean, or 0 when the list is empty.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
