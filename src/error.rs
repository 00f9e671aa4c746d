//! Errors returned by the skip set and its level generators.

use thiserror::Error;

use crate::level_generator::geometric::GeometricError;

/// Errors that can occur when querying or modifying a
/// [`SkipSet`][crate::SkipSet].
///
/// A failed operation never modifies the set: every search completes before
/// any node is spliced in or out.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An argument was rejected before the operation began.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The set holds no elements, so it has neither a first nor a last one.
    #[error("the skip set is empty")]
    EmptyStructure,
    /// No element compares equal to the one requested.
    #[error("element not found")]
    NotFound,
}

impl From<GeometricError> for Error {
    #[inline]
    fn from(err: GeometricError) -> Self {
        match err {
            GeometricError::ZeroMax => Error::InvalidArgument("max must be non-zero"),
            GeometricError::MaxTooLarge => {
                Error::InvalidArgument("max must not exceed the maximum level")
            }
            GeometricError::InvalidProbability => Error::InvalidArgument("p must be in (0, 1)"),
        }
    }
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
