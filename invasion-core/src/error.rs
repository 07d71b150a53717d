//! Error types for the invasion core library.
//!
//! Simulation steps never fail once an [`crate::Invasion`] exists; only the
//! builder validates its configuration. Each error carries a stable code so
//! the CLI can report failures in a machine-readable way.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error type produced when configuring an [`crate::Invasion`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvasionError {
    /// The round ceiling must allow at least one round.
    #[error("max_rounds must be at least 1 (got {got})")]
    InvalidMaxRounds {
        /// The rejected ceiling.
        got: usize,
    },
    /// More aliens were requested than alien identifiers can represent.
    #[error("cannot spawn {requested} aliens; at most {max} are supported")]
    TooManyAliens {
        /// Number of aliens requested by the caller.
        requested: usize,
        /// Largest supported alien count.
        max: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`InvasionError`] variants.
    enum InvasionErrorCode for InvasionError {
        /// The round ceiling must allow at least one round.
        InvalidMaxRounds => InvalidMaxRounds { .. } => "INVASION_INVALID_MAX_ROUNDS",
        /// More aliens were requested than alien identifiers can represent.
        TooManyAliens => TooManyAliens { .. } => "INVASION_TOO_MANY_ALIENS",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, InvasionError>;
