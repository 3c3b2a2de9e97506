//! Error types surfaced by the lazy cells and the number ordering.

use core::fmt;

use crate::validation::ValidationError;

/// Boxed error produced by a failing producer or a custom number's natural ordering.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while constructing or resolving a lazy cell.
#[derive(Debug, thiserror::Error)]
pub enum LazyError {
   /// A required constructor argument was absent.
   #[error("invalid argument: {0}")]
   InvalidArgument(#[from] ValidationError),

   /// The producer failed, or a singleton producer yielded no value.
   #[error("error while resolving lazy value")]
   Execution(#[source] BoxError),

   /// The producer is unavailable: it panicked during an earlier resolution or the
   /// current resolution re-entered the cell.
   #[error("lazy value is unavailable: its producer panicked or resolution re-entered the cell")]
   Poisoned,
}

impl LazyError {
   /// Wraps a producer failure.
   pub fn execution(cause: impl Into<BoxError>) -> Self {
      Self::Execution(cause.into())
   }

   /// Returns the producer failure behind an [`LazyError::Execution`].
   pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
      match self {
         Self::Execution(cause) => Some(cause.as_ref()),
         _ => None,
      }
   }
}

/// Cause attached to [`LazyError::Execution`] when a singleton cannot hold the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalStateError {
   #[error("producer must yield a non-absent value")]
   AbsentValue,
}

/// Which comparison operand an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
   First,
   Second,
}

impl fmt::Display for Operand {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::First => f.write_str("first"),
         Self::Second => f.write_str("second"),
      }
   }
}

/// Why a number could not be converted to an arbitrary-precision decimal.
#[derive(Debug, thiserror::Error)]
pub enum NumericFormatError {
   #[error(transparent)]
   Parse(#[from] bigdecimal::ParseBigDecimalError),

   #[error("{0} has no decimal representation")]
   NonFinite(f64),
}

/// Errors returned by [`NumberOrdering`](crate::NumberOrdering).
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
   /// An operand was absent.
   #[error("{0} number cannot be absent")]
   NullArgument(Operand),

   /// Two numbers of the same type could not be ordered by their natural ordering.
   #[error(
      "failed to compare numbers of type {first_type} and {second_type} with values {first} and {second}"
   )]
   IncomparableTypes {
      first_type: &'static str,
      second_type: &'static str,
      first: String,
      second: String,
      #[source]
      source: BoxError,
   },

   /// A number needed the decimal fallback but has no decimal form.
   #[error(
      "failed to compare numbers of type {first_type} and {second_type} with values {first} and {second}"
   )]
   InvalidNumericFormat {
      first_type: &'static str,
      second_type: &'static str,
      first: String,
      second: String,
      #[source]
      source: NumericFormatError,
   },
}
