//! Single-threaded lazy cell.
//!
//! [`LazyCell<T, F>`] holds a producer until the first successful [`resolve`](LazyCell::resolve),
//! then drops it and keeps the produced value. A failing producer is kept, so the next call
//! runs it again.

use core::cell::UnsafeCell;
use core::fmt;

use crate::error::{BoxError, LazyError};
use crate::result_cell::{produce, Presence, ResultCell};
use crate::validation;

/// A lazily computed value for use from a single thread.
///
/// The type is not `Sync`, so concurrent resolution is ruled out at compile time. Use
/// [`ConcurrentLazyCell`](crate::ConcurrentLazyCell) to share a cell between threads.
pub struct LazyCell<T, F> {
   slot: UnsafeCell<ResultCell<T, F>>,
}

impl<T, F> LazyCell<T, F> {
   /// Creates an unresolved cell around `producer`.
   #[inline]
   #[must_use]
   pub const fn new(producer: F) -> Self {
      Self {
         slot: UnsafeCell::new(ResultCell::Pending(producer)),
      }
   }

   /// Creates an unresolved cell, failing with [`LazyError::InvalidArgument`] when the
   /// producer is absent.
   pub fn try_new(producer: Option<F>) -> Result<Self, LazyError> {
      Ok(Self::new(validation::require_present(producer, "producer")?))
   }

   /// Checks whether a value (possibly absent) has been cached.
   #[inline]
   pub fn is_resolved(&self) -> bool {
      // SAFETY: shared read; the slot is only written through `resolve`, never concurrently.
      unsafe { (*self.slot.get()).is_resolved() }
   }

   /// Consumes the cell, returning the cached value if one was produced.
   #[inline]
   pub fn into_value(self) -> Option<T> {
      self.slot.into_inner().into_value()
   }
}

impl<T, F, E> LazyCell<T, F>
where
   F: FnMut() -> Result<Option<T>, E>,
   E: Into<BoxError>,
{
   /// Returns the cached value, running the producer first if needed.
   ///
   /// - `Ok(Some(&value))` / `Ok(None)` once the producer has succeeded.
   /// - [`LazyError::Execution`] if the producer fails; the producer is kept for a retry.
   /// - [`LazyError::Poisoned`] if called from inside the producer, or after it panicked.
   #[inline]
   pub fn resolve(&self) -> Result<Option<&T>, LazyError> {
      self.resolve_as(Presence::Optional)
   }

   pub(crate) fn resolve_as(&self, presence: Presence) -> Result<Option<&T>, LazyError> {
      let slot = self.slot.get();
      // SAFETY: a resolved slot is never written again, so handing out shared borrows is fine.
      if let ResultCell::Resolved(value) = unsafe { &*slot } {
         return Ok(value.as_ref());
      }

      // SAFETY: the slot is unresolved, so no borrow of a value is outstanding. The mutable
      // borrow ends before the producer runs, which keeps re-entrant calls sound.
      let Some(mut producer) = (unsafe { (*slot).take_producer()? }) else {
         return Ok(unsafe { (*slot).value() });
      };
      let outcome = produce(&mut producer, presence);
      // SAFETY: as above; the slot is `Resolving` and nothing else holds a borrow of it.
      unsafe {
         (*slot).settle(producer, outcome)?;
         Ok((*slot).value())
      }
   }
}

impl<T: fmt::Debug, F> fmt::Debug for LazyCell<T, F> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let mut d = f.debug_tuple("LazyCell");
      // SAFETY: shared read, see `is_resolved`.
      match unsafe { &*self.slot.get() } {
         ResultCell::Resolved(value) => d.field(value),
         _ => d.field(&format_args!("<unresolved>")),
      };
      d.finish()
   }
}
