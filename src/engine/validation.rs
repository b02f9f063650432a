//! Setup validation, accumulating every problem at once.
//!
//! Setup mistakes are easiest to fix when they are all reported together, so
//! this uses stillwater's `Validation` instead of stopping at the first one.

use super::table::TransitionTable;
use crate::core::{ConfigError, EventRegistry, State};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Check that every event referenced by the table has been registered.
pub fn validate_events<S: State>(
    table: &TransitionTable<S>,
    registry: &EventRegistry,
) -> Validation<(), NonEmptyVec<ConfigError>> {
    let checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = table
        .iter()
        .map(|(source, event, _)| {
            if registry.contains(event) {
                Validation::success(())
            } else {
                Validation::fail(ConfigError::UnregisteredEvent {
                    state: source.name().to_string(),
                    event: event.to_string(),
                })
            }
        })
        .collect();

    if checks.is_empty() {
        return Validation::success(());
    }
    Validation::all_vec(checks).map(|_| ())
}

/// Collapse a validation result into a single `ConfigError`.
pub fn into_result(validation: Validation<(), NonEmptyVec<ConfigError>>) -> Result<(), ConfigError> {
    match validation {
        Validation::Success(()) => Ok(()),
        Validation::Failure(errors) => Err(ConfigError::from_many(errors.iter().cloned().collect())),
    }
}
