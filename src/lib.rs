//! Lazy single-assignment cells and a total ordering across numeric representations.
//!
//! # Lazy cells
//!
//! - [`LazyCell<T, F>`]: single-threaded; runs its producer on the first `resolve()`.
//! - [`ConcurrentLazyCell<T, F>`]: thread-safe; the producer runs once even under
//!   concurrent `resolve()` calls.
//! - [`Singleton<T, F>`] / [`ConcurrentSingleton<T, F>`]: the same, but an absent result is
//!   an error.
//!
//! A producer is any `FnMut() -> Result<Option<T>, E>`. A successful result is cached and the
//! producer dropped. A failure is returned as [`LazyError::Execution`] and the producer is kept,
//! so a later `resolve()` runs it again.
//!
//! The concurrent cells share the lock from the `state` module: an atomic fast path for
//! resolved cells and futex-based parking through `parking_lot_core` for callers that race
//! the first resolution.
//!
//! ```rust
//! use std::convert::Infallible;
//! use utilkit::LazyCell;
//!
//! let greeting = LazyCell::new(|| Ok::<_, Infallible>(Some(format!("hello {}", 42))));
//! assert!(!greeting.is_resolved());
//! assert_eq!(greeting.resolve().unwrap().map(String::as_str), Some("hello 42"));
//! assert!(greeting.is_resolved());
//! ```
//!
//! # Number ordering
//!
//! [`NumberOrdering`] totally orders [`Number`]s across fixed-width integers, floats,
//! [`num_bigint::BigInt`], [`bigdecimal::BigDecimal`] and user-defined [`CustomNumber`]s,
//! falling back to exact decimal arithmetic whenever a direct comparison could lose
//! precision.
//!
//! ```rust
//! use std::cmp::Ordering;
//! use num_bigint::BigInt;
//! use utilkit::Number;
//!
//! let big = Number::from(BigInt::from(1));
//! assert_eq!(big.try_cmp(&Number::from(1.0f32)).unwrap(), Ordering::Equal);
//! assert_eq!(Number::from(i64::MAX).try_cmp(&Number::from(i64::MAX as f64)).unwrap(), Ordering::Less);
//! ```

/// Thread-safe lazy cell.
mod concurrent;

/// Error types.
mod error;

/// Single-threaded lazy cell.
mod lazy_cell;

/// Numeric representations.
mod number;

/// Cross-representation number ordering.
mod ordering;

/// Internal state holder for the lazy cells.
mod result_cell;

/// Non-optional lazy cells.
mod singleton;

/// Internal synchronization state management.
mod state;

pub mod validation;

pub use concurrent::ConcurrentLazyCell;
pub use error::{BoxError, CompareError, IllegalStateError, LazyError, NumericFormatError, Operand};
pub use lazy_cell::LazyCell;
pub use number::{CustomNumber, Number, NumberKind};
pub use ordering::NumberOrdering;
pub use singleton::{ConcurrentSingleton, Singleton};
pub use validation::{ValidationError, Validator};
