//! Thread-safe lazy cell.
//!
//! [`ConcurrentLazyCell<T, F>`] resolves with double-checked locking: an `Acquire` load of
//! the lock's DONE bit serves every call after the first, and only callers that race the
//! first resolution take the lock. Exactly one of them runs the producer; the rest park
//! until it commits and then read the same value.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::Ordering;

use crate::error::{BoxError, LazyError};
use crate::result_cell::{produce, Presence, ResultCell};
use crate::state::{ResolveGuard, ResolveLock};
use crate::validation;

/// A lazily computed value that can be shared between threads.
///
/// ```rust
/// use std::convert::Infallible;
/// use utilkit::ConcurrentLazyCell;
///
/// fn load() -> Result<Option<String>, Infallible> {
///    Ok(Some("production".to_string()))
/// }
///
/// static PROFILE: ConcurrentLazyCell<String, fn() -> Result<Option<String>, Infallible>> =
///    ConcurrentLazyCell::new(load);
///
/// assert_eq!(PROFILE.resolve().unwrap().map(String::as_str), Some("production"));
/// ```
pub struct ConcurrentLazyCell<T, F> {
   slot: UnsafeCell<ResultCell<T, F>>,
   lock: ResolveLock,
}

impl<T, F> ConcurrentLazyCell<T, F> {
   /// Creates an unresolved cell around `producer`.
   #[inline]
   #[must_use]
   pub const fn new(producer: F) -> Self {
      Self {
         slot: UnsafeCell::new(ResultCell::Pending(producer)),
         lock: ResolveLock::new(),
      }
   }

   /// Creates an unresolved cell, failing with [`LazyError::InvalidArgument`] when the
   /// producer is absent.
   pub fn try_new(producer: Option<F>) -> Result<Self, LazyError> {
      Ok(Self::new(validation::require_present(producer, "producer")?))
   }

   /// Checks whether a value (possibly absent) has been cached.
   ///
   /// This method never blocks.
   #[inline]
   pub fn is_resolved(&self) -> bool {
      self.lock.is_done(Ordering::Acquire)
   }

   /// Consumes the cell, returning the cached value if one was produced.
   #[inline]
   pub fn into_value(self) -> Option<T> {
      self.slot.into_inner().into_value()
   }

   /// Reads the cached value.
   ///
   /// # Safety
   ///
   /// The DONE bit must have been observed with `Acquire` ordering, or the caller must
   /// hold the lock.
   #[inline]
   unsafe fn value_unchecked(&self) -> Option<&T> {
      debug_assert!(self.lock.is_done(Ordering::Relaxed));
      unsafe { (*self.slot.get()).value() }
   }
}

impl<T, F, E> ConcurrentLazyCell<T, F>
where
   F: FnMut() -> Result<Option<T>, E>,
   E: Into<BoxError>,
{
   /// Returns the cached value, running the producer first if needed.
   ///
   /// Blocks while another thread runs the producer. If that run fails, one of the waiting
   /// callers runs the producer again. Calling this from inside the producer deadlocks.
   #[inline]
   pub fn resolve(&self) -> Result<Option<&T>, LazyError> {
      self.resolve_as(Presence::Optional)
   }

   /// Async flavour of [`resolve`](Self::resolve) that yields to the runtime while another
   /// task holds the lock. The producer itself still runs synchronously.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   #[inline]
   pub async fn resolve_async(&self) -> Result<Option<&T>, LazyError> {
      self.resolve_async_as(Presence::Optional).await
   }

   pub(crate) fn resolve_as(&self, presence: Presence) -> Result<Option<&T>, LazyError> {
      if !self.is_resolved() {
         if let Some(guard) = self.lock.lock() {
            self.initialize(guard, presence)?;
         }
      }
      // SAFETY: DONE was observed, either above or inside `lock()`.
      Ok(unsafe { self.value_unchecked() })
   }

   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   pub(crate) async fn resolve_async_as(
      &self,
      presence: Presence,
   ) -> Result<Option<&T>, LazyError> {
      if !self.is_resolved() {
         if let Some(guard) = self.lock.lock_async().await {
            self.initialize(guard, presence)?;
         }
      }
      // SAFETY: see `resolve_as`.
      Ok(unsafe { self.value_unchecked() })
   }

   /// Cold path: runs the producer while holding the lock.
   ///
   /// On failure the guard is dropped, which releases the lock for the next caller.
   #[cold]
   fn initialize(&self, guard: ResolveGuard<'_>, presence: Presence) -> Result<(), LazyError> {
      tracing::trace!("lock acquired for concurrent resolution");
      let slot = self.slot.get();
      // SAFETY: holding the lock gives exclusive access to the slot. The borrow ends before
      // the producer runs.
      let Some(mut producer) = (unsafe { (*slot).take_producer()? }) else {
         guard.commit();
         return Ok(());
      };
      let outcome = produce(&mut producer, presence);
      // SAFETY: still holding the lock.
      unsafe { (*slot).settle(producer, outcome)? };
      guard.commit();
      tracing::trace!("concurrent resolution committed");
      Ok(())
   }
}

impl<T: fmt::Debug, F> fmt::Debug for ConcurrentLazyCell<T, F> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let mut d = f.debug_tuple("ConcurrentLazyCell");
      if self.is_resolved() {
         // SAFETY: DONE observed with Acquire.
         d.field(&unsafe { self.value_unchecked() });
      } else {
         d.field(&format_args!("<unresolved>"));
      }
      d.finish()
   }
}

// SAFETY:
// Sharing `&ConcurrentLazyCell` hands out `&T` to every thread (`T: Sync`) and lets any
// thread run and drop the producer and store the value it made (`F: Send`, `T: Send`). The
// lock serializes every write to the slot.
unsafe impl<T: Send + Sync, F: Send> Sync for ConcurrentLazyCell<T, F> {}
