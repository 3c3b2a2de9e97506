//! Internal state holder shared by every lazy cell.
//!
//! A cell starts `Pending` with its producer and ends `Resolved`. While the producer runs the
//! slot is `Resolving` and the producer lives on the resolving caller's stack, so the slot
//! is never borrowed across the call. A failed run puts the producer back; a successful run
//! drops it. A slot stuck in `Resolving` means the producer panicked or was re-entered.
//!
//! Not thread-safe; the concurrent cells only touch it while holding their lock.

use core::mem;

use crate::error::{BoxError, IllegalStateError, LazyError};

pub(crate) enum ResultCell<T, F> {
   Pending(F),
   Resolving,
   Resolved(Option<T>),
}

/// Whether a resolution may cache an absent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
   Optional,
   Required,
}

impl Presence {
   #[inline]
   fn check<T>(self, value: Option<T>) -> Result<Option<T>, LazyError> {
      match (self, value) {
         (Self::Required, None) => Err(LazyError::execution(IllegalStateError::AbsentValue)),
         (_, value) => Ok(value),
      }
   }
}

impl<T, F> ResultCell<T, F> {
   #[inline]
   pub(crate) fn is_resolved(&self) -> bool {
      matches!(self, Self::Resolved(_))
   }

   /// The cached value; `None` if unresolved or resolved to absent.
   #[inline]
   pub(crate) fn value(&self) -> Option<&T> {
      match self {
         Self::Resolved(value) => value.as_ref(),
         _ => None,
      }
   }

   #[inline]
   pub(crate) fn into_value(self) -> Option<T> {
      match self {
         Self::Resolved(value) => value,
         _ => None,
      }
   }

   /// Moves the producer out for a resolution.
   ///
   /// `Ok(None)` means the slot is already resolved.
   #[inline]
   pub(crate) fn take_producer(&mut self) -> Result<Option<F>, LazyError> {
      match mem::replace(self, Self::Resolving) {
         Self::Pending(producer) => Ok(Some(producer)),
         Self::Resolving => Err(LazyError::Poisoned),
         resolved @ Self::Resolved(_) => {
            *self = resolved;
            Ok(None)
         }
      }
   }

   /// Stores the outcome of a resolution started with [`take_producer`](Self::take_producer).
   #[inline]
   pub(crate) fn settle(
      &mut self,
      producer: F,
      outcome: Result<Option<T>, LazyError>,
   ) -> Result<(), LazyError> {
      match outcome {
         Ok(value) => {
            *self = Self::Resolved(value);
            drop(producer);
            Ok(())
         }
         Err(error) => {
            *self = Self::Pending(producer);
            Err(error)
         }
      }
   }
}

/// Runs the producer once and applies the presence rule to its result.
#[inline]
pub(crate) fn produce<T, F, E>(
   producer: &mut F,
   presence: Presence,
) -> Result<Option<T>, LazyError>
where
   F: FnMut() -> Result<Option<T>, E>,
   E: Into<BoxError>,
{
   tracing::trace!(?presence, "invoking lazy producer");
   let value = producer().map_err(LazyError::execution)?;
   presence.check(value)
}
