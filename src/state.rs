//! Resolution lock shared by the concurrent cells.
//!
//! The lock is a single `AtomicU8` driven as a small state machine, with futex-based
//! waiting via `parking_lot_core`:
//! - Bit 0: DONE - the cell holds a resolved value
//! - Bit 1: LOCKED - a thread is running the producer
//! - Bit 2: WAITING - at least one thread is parked on the lock
//! - Bits 3-7: EPOCH - generation counter, bumped on every release
//!
//! Readers check DONE with an `Acquire` load and never block. Only callers that race the
//! first resolution park, and only until that resolution commits or fails.

use core::mem;
use core::sync::atomic::{self, AtomicU8, Ordering};

use parking_lot_core::{DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};

/// Double-checked resolution lock for a concurrent cell.
#[repr(transparent)]
pub(crate) struct ResolveLock(AtomicU8);

impl ResolveLock {
   /// Bit flag: Cell is resolved.
   const DONE: u8 = 1;
   /// Bit flag: A producer is running.
   const LOCKED: u8 = 2;
   /// Bit flag: At least one thread is parked.
   const WAITING: u8 = 4;
   /// Start of epoch bits.
   const EPOCH_1: u8 = 8;
   /// Mask for epoch bits.
   const EPOCH_MASK: u8 = !(Self::DONE | Self::LOCKED | Self::WAITING);

   #[inline(always)]
   const fn next_epoch(current_state: u8) -> u8 {
      (current_state & Self::EPOCH_MASK).wrapping_add(Self::EPOCH_1) & Self::EPOCH_MASK
   }

   /// Creates a lock for an unresolved cell.
   #[inline]
   pub(crate) const fn new() -> Self {
      Self(AtomicU8::new(0))
   }

   /// Wakes every thread parked on this lock.
   #[inline]
   fn notify_all(&self) {
      // SAFETY: The key passed to unpark matches the key used by `wait`, the address of the
      // atomic.
      unsafe {
         parking_lot_core::unpark_all(self.0.as_ptr() as usize, DEFAULT_UNPARK_TOKEN);
      }
   }

   /// Parks the current thread until the state moves away from `expected_state`.
   #[inline]
   fn wait(&self, expected_state: u8) {
      // SAFETY: See `notify_all`.
      unsafe {
         // park() validates before sleeping, so a release that already happened is not missed.
         let _ = parking_lot_core::park(
            self.0.as_ptr() as usize,
            || self.0.load(atomic::Ordering::Acquire) == expected_state,
            || {},
            |_, _| {},
            DEFAULT_PARK_TOKEN,
            None,
         );
         // Wake-ups may be spurious; callers loop and re-check.
      }
   }

   /// Publishes the resolved value: sets DONE, bumps the epoch and wakes waiters.
   ///
   /// Must only be called by the holder of the lock.
   #[inline]
   fn set_done(&self) {
      let current_state = self.0.load(Ordering::Relaxed);
      let new_state = Self::DONE | Self::next_epoch(current_state);

      // Release pairs with the Acquire in `is_done` so the slot write is visible to
      // fast-path readers.
      let prev_state = self.0.swap(new_state, Ordering::Release);
      if prev_state & Self::WAITING != 0 {
         self.notify_all();
      }
   }

   /// Drops the lock without resolving, bumps the epoch and wakes waiters so one of them
   /// can retry the producer.
   #[inline]
   fn release(&self) {
      let current_state = self.0.load(Ordering::Relaxed);
      let prev_state = self.0.swap(Self::next_epoch(current_state), Ordering::Release);
      if prev_state & Self::WAITING != 0 {
         self.notify_all();
      }
   }

   /// Checks if the DONE flag is set.
   #[inline]
   pub(crate) fn is_done(&self, ordering: Ordering) -> bool {
      self.0.load(ordering) & Self::DONE != 0
   }

   /// One attempt at taking the lock.
   ///
   /// Returns:
   ///   - `Ok(None)`: the cell is already resolved.
   ///   - `Ok(Some(guard))`: the lock was acquired.
   ///   - `Err(state)`: another thread holds the lock; `state` has WAITING set.
   #[inline]
   fn lock_step(&self) -> Result<Option<ResolveGuard<'_>>, u8> {
      loop {
         let current_state = self.0.load(Ordering::Acquire);
         if current_state & Self::DONE != 0 {
            return Ok(None);
         }

         if current_state & Self::LOCKED == 0 {
            match self.0.compare_exchange_weak(
               current_state,
               current_state | Self::LOCKED,
               Ordering::Acquire,
               Ordering::Relaxed,
            ) {
               Ok(_) => return Ok(Some(ResolveGuard::new(self))),
               Err(_) => {
                  std::hint::spin_loop();
                  continue;
               }
            }
         }

         if current_state & Self::WAITING == 0 {
            let new_state = current_state | Self::WAITING;
            match self.0.compare_exchange_weak(
               current_state,
               new_state,
               Ordering::Relaxed,
               Ordering::Relaxed,
            ) {
               Ok(_) => return Err(new_state),
               Err(_) => {
                  std::hint::spin_loop();
                  continue;
               }
            }
         }
         return Err(current_state);
      }
   }

   /// Acquires the lock, parking while another thread resolves.
   ///
   /// Returns `Some(guard)` when the caller must run the producer and `None` when the cell
   /// was resolved in the meantime.
   #[inline]
   pub(crate) fn lock(&self) -> Option<ResolveGuard<'_>> {
      let mut observed = match self.lock_step() {
         Ok(guard) => return guard,
         Err(state) => state,
      };
      loop {
         self.wait(observed);
         match self.lock_step() {
            Ok(guard) => return guard,
            Err(state) => observed = state,
         }
      }
   }

   /// Acquires the lock from async code.
   ///
   /// Yields to the scheduler first; under the multi-threaded runtime it falls back to
   /// parking inside `block_in_place`.
   #[cfg(any(feature = "async-tokio", feature = "async-tokio-mt"))]
   #[inline]
   pub(crate) async fn lock_async(&self) -> Option<ResolveGuard<'_>> {
      #[allow(clippy::never_loop)]
      loop {
         for _ in 0..16 {
            match self.lock_step() {
               Ok(guard) => return guard,
               Err(state) => {
                  for _ in 0..32 {
                     tokio::task::yield_now().await;
                     if self.0.load(Ordering::Relaxed) != state {
                        break;
                     }
                  }
               }
            }
         }

         #[cfg(feature = "async-tokio-mt")]
         {
            return match self.lock_step() {
               Ok(guard) => guard,
               Err(state) => tokio::task::block_in_place(|| {
                  self.wait(state);
                  self.lock()
               }),
            };
         }
      }
   }
}

/// RAII guard over a held [`ResolveLock`].
///
/// `commit()` publishes the resolution. Dropping the guard instead (failed producer or
/// unwinding panic) releases the lock for the next caller.
pub(crate) struct ResolveGuard<'a> {
   lock: &'a ResolveLock,
}

impl<'a> ResolveGuard<'a> {
   #[inline(always)]
   const fn new(lock: &'a ResolveLock) -> Self {
      Self { lock }
   }

   /// Marks the cell resolved and wakes waiters.
   #[inline(always)]
   pub(crate) fn commit(self) {
      self.lock.set_done();
      mem::forget(self);
   }
}

impl Drop for ResolveGuard<'_> {
   #[inline(always)]
   fn drop(&mut self) {
      self.lock.release();
   }
}
