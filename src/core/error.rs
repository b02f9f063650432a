//! Configuration errors.
//!
//! Every variant describes a setup mistake. They are detected while the engine
//! is being wired up or when it starts, and they are never recovered from.

use thiserror::Error;

/// Errors raised by engine setup and by actions that reference unknown names.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Transition for event '{event}' in state '{state}' already leads to '{existing}' (requested '{requested}')")]
    DuplicateTransition {
        state: String,
        event: String,
        existing: String,
        requested: String,
    },

    #[error("Event '{event}' is used in state '{state}' but was never registered")]
    UnregisteredEvent { state: String, event: String },

    #[error("Event '{name}' is already registered")]
    DuplicateEvent { name: String },

    #[error("Button name '{name}' is already in use")]
    DuplicateButton { name: String },

    #[error("Timer name '{name}' is already in use")]
    DuplicateTimer { name: String },

    #[error("Unknown timer '{name}'")]
    UnknownTimer { name: String },

    #[error("Event chain exceeded {limit} dispatches at state '{state}' on '{event}' (cyclic no_event transitions?)")]
    ChainDepthExceeded {
        limit: usize,
        state: String,
        event: String,
    },

    #[error("Engine already started; setup must happen before run()")]
    AlreadyStarted,

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("{} configuration errors: {}", .0.len(), join_errors(.0))]
    Invalid(Vec<ConfigError>),
}

impl ConfigError {
    /// Collapse a list of errors: one error is returned as itself.
    pub fn from_many(mut errors: Vec<ConfigError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            ConfigError::Invalid(errors)
        }
    }

    /// Flatten into the individual errors.
    pub fn into_errors(self) -> Vec<ConfigError> {
        match self {
            ConfigError::Invalid(errors) => errors,
            other => vec![other],
        }
    }
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_many_unwraps_single_error() {
        let error = ConfigError::from_many(vec![ConfigError::DuplicateEvent {
            name: "door_open".to_string(),
        }]);
        assert!(matches!(error, ConfigError::DuplicateEvent { .. }));
    }

    #[test]
    fn invalid_lists_every_error() {
        let error = ConfigError::from_many(vec![
            ConfigError::UnknownTimer {
                name: "a".to_string(),
            },
            ConfigError::UnknownTimer {
                name: "b".to_string(),
            },
        ]);
        let message = error.to_string();
        assert!(message.starts_with("2 configuration errors"));
        assert!(message.contains("Unknown timer 'a'"));
        assert!(message.contains("Unknown timer 'b'"));
        assert_eq!(error.into_errors().len(), 2);
    }
}
