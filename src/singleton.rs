//! Lazy cells whose producer must yield a value.
//!
//! [`Singleton`] and [`ConcurrentSingleton`] behave like [`LazyCell`] and
//! [`ConcurrentLazyCell`] except that an absent result is a failure: `resolve()` returns
//! [`LazyError::Execution`] caused by [`IllegalStateError::AbsentValue`], and the producer
//! is kept for another attempt.

use core::fmt;

use crate::concurrent::ConcurrentLazyCell;
use crate::error::{BoxError, IllegalStateError, LazyError};
use crate::lazy_cell::LazyCell;
use crate::result_cell::Presence;

#[inline]
fn required<T>(value: Option<&T>) -> Result<&T, LazyError> {
   value.ok_or_else(|| LazyError::execution(IllegalStateError::AbsentValue))
}

/// Single-threaded lazy instance that is never absent once resolved.
pub struct Singleton<T, F> {
   cell: LazyCell<T, F>,
}

impl<T, F> Singleton<T, F> {
   /// Creates an unresolved singleton around `producer`.
   #[inline]
   #[must_use]
   pub const fn new(producer: F) -> Self {
      Self {
         cell: LazyCell::new(producer),
      }
   }

   /// Creates an unresolved singleton, failing with [`LazyError::InvalidArgument`] when the
   /// producer is absent.
   pub fn try_new(producer: Option<F>) -> Result<Self, LazyError> {
      Ok(Self {
         cell: LazyCell::try_new(producer)?,
      })
   }

   /// Checks whether the instance has been produced.
   #[inline]
   pub fn is_resolved(&self) -> bool {
      self.cell.is_resolved()
   }

   /// Consumes the singleton, returning the instance if it was produced.
   #[inline]
   pub fn into_value(self) -> Option<T> {
      self.cell.into_value()
   }
}

impl<T, F, E> Singleton<T, F>
where
   F: FnMut() -> Result<Option<T>, E>,
   E: Into<BoxError>,
{
   /// Returns the instance, running the producer first if needed.
   #[inline]
   pub fn resolve(&self) -> Result<&T, LazyError> {
      required(self.cell.resolve_as(Presence::Required)?)
   }
}

impl<T: fmt::Debug, F> fmt::Debug for Singleton<T, F> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("Singleton").field(&self.cell).finish()
   }
}

/// Thread-safe lazy instance that is never absent once resolved.
pub struct ConcurrentSingleton<T, F> {
   cell: ConcurrentLazyCell<T, F>,
}

impl<T, F> ConcurrentSingleton<T, F> {
   /// Creates an unresolved singleton around `producer`.
   #[inline]
   #[must_use]
   pub const fn new(producer: F) -> Self {
      Self {
         cell: ConcurrentLazyCell::new(producer),
      }
   }

   /// Creates an unresolved singleton, failing with [`LazyError::InvalidArgument`] when the
   /// producer is absent.
   pub fn try_new(producer: Option<F>) -> Result<Self, LazyError> {
      Ok(Self {
         cell: ConcurrentLazyCell::try_new(producer)?,
      })
   }

   /// Checks whether the instance has been produced.
   ///
   /// This method never blocks.
   #[inline]
   pub fn is_resolved(&self) -> bool {
      self.cell.is_resolved()
   }

   /// Consumes the singleton, returning the instance if it was produced.
   #[inline]
   pub fn into_value(self) -> Option<T> {
      self.cell.into_value()
   }
}

impl<T, F, E> ConcurrentSingleton<T, F>
where
   F: FnMut() -> Result<Option<T>, E>,
   E: Into<BoxError>,
{
   /// Returns the instance, running the producer first if needed. Blocks while another
   /// thread runs the producer.
   #[inline]
   pub fn resolve(&self) -> Result<&T, LazyError> {
      required(self.cell.resolve_as(Presence::Required)?)
   }

   /// Async flavour of [`resolve`](Self::resolve).
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   #[inline]
   pub async fn resolve_async(&self) -> Result<&T, LazyError> {
      required(self.cell.resolve_async_as(Presence::Required).await?)
   }
}

impl<T: fmt::Debug, F> fmt::Debug for ConcurrentSingleton<T, F> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("ConcurrentSingleton").field(&self.cell).finish()
   }
}
