//! Core State trait for engine states.
//!
//! The engine runs over a closed, fixed-size set of states. Every state has a
//! stable index in `0..COUNT`, and the state at index 0 is where the machine
//! starts.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure. States are small `Copy` values; the engine uses
/// [`State::index`] to address its per-state transition table, so
/// `from_index(s.index()) == Some(s)` must hold for every state.
///
/// # Required Traits
///
/// - `Copy`: States are passed by value into every action callback
/// - `PartialEq`: States must be comparable for auto-transition checks
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `DeserializeOwned`: History records are serializable
///
/// Use the [`state_enum!`](crate::state_enum) macro rather than implementing
/// this by hand.
///
/// # Example
///
/// ```rust
/// use kiosk_fsm::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Closed,
///     Open,
/// }
///
/// impl State for Door {
///     const COUNT: usize = 2;
///
///     fn index(&self) -> usize {
///         *self as usize
///     }
///
///     fn from_index(index: usize) -> Option<Self> {
///         match index {
///             0 => Some(Self::Closed),
///             1 => Some(Self::Open),
///             _ => None,
///         }
///     }
///
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///         }
///     }
///
///     fn initial() -> Self {
///         Self::Closed
///     }
/// }
///
/// assert_eq!(Door::initial().index(), 0);
/// assert_eq!(Door::from_index(1), Some(Door::Open));
/// ```
pub trait State:
    Copy + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Number of states. Fixed for the lifetime of an engine.
    const COUNT: usize;

    /// Position of this state in `0..COUNT`.
    fn index(&self) -> usize;

    /// Inverse of [`State::index`].
    fn from_index(index: usize) -> Option<Self>;

    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// The state with index 0.
    fn initial() -> Self;
}
