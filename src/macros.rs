//! Macros for declaring engine states.

/// Generate a `State` enum.
///
/// The first variant is the initial state (index 0); the rest follow in
/// declaration order.
///
/// # Example
///
/// ```
/// use kiosk_fsm::core::State;
/// use kiosk_fsm::state_enum;
///
/// state_enum! {
///     pub enum Turnstile {
///         Locked,
///         Unlocked,
///     }
/// }
///
/// assert_eq!(Turnstile::COUNT, 2);
/// assert_eq!(Turnstile::initial(), Turnstile::Locked);
/// assert_eq!(Turnstile::Unlocked.index(), 1);
/// assert_eq!(Turnstile::Unlocked.name(), "Unlocked");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident
            $(,
                $(#[$variant_meta:meta])*
                $variant:ident
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[$first_meta])*
            $first,
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            const COUNT: usize = [stringify!($first) $(, stringify!($variant))*].len();

            fn index(&self) -> usize {
                *self as usize
            }

            fn from_index(index: usize) -> Option<Self> {
                const ALL: &[$name] = &[$name::$first $(, $name::$variant)*];
                ALL.get(index).copied()
            }

            fn name(&self) -> &str {
                match self {
                    Self::$first => stringify!($first),
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn initial() -> Self {
                Self::$first
            }
        }
    };
}
