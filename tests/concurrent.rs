use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use utilkit::{ConcurrentLazyCell, LazyError};

#[derive(Debug, thiserror::Error)]
#[error("producer failed")]
struct ProducerError;

type StaticProducer = fn() -> Result<Option<String>, Infallible>;

static STATIC_CALLS: AtomicUsize = AtomicUsize::new(0);

fn load_static() -> Result<Option<String>, Infallible> {
   STATIC_CALLS.fetch_add(1, Ordering::SeqCst);
   Ok(Some(String::from("static value")))
}

static STATIC_CELL: ConcurrentLazyCell<String, StaticProducer> =
   ConcurrentLazyCell::new(load_static);

#[test]
fn test_new_is_not_resolved() {
   let cell: ConcurrentLazyCell<i32, _> = ConcurrentLazyCell::new(|| Ok::<_, Infallible>(Some(1)));
   assert!(!cell.is_resolved());
   assert_eq!(format!("{cell:?}"), "ConcurrentLazyCell(<unresolved>)");
}

#[test]
fn test_try_new_rejects_absent_producer() {
   let producer: Option<StaticProducer> = None;
   assert!(matches!(
      ConcurrentLazyCell::<String, _>::try_new(producer),
      Err(LazyError::InvalidArgument(_))
   ));
}

#[test]
fn test_resolve_runs_producer_once() {
   let counter = AtomicUsize::new(0);
   let cell = ConcurrentLazyCell::new(|| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok::<_, Infallible>(Some(42))
   });

   assert_eq!(cell.resolve().unwrap(), Some(&42));
   assert_eq!(cell.resolve().unwrap(), Some(&42));
   assert!(cell.is_resolved());
   assert_eq!(counter.load(Ordering::SeqCst), 1);
   assert_eq!(format!("{cell:?}"), "ConcurrentLazyCell(Some(42))");
}

#[test]
fn test_multi_thread_resolve() {
   let counter = Arc::new(AtomicUsize::new(0));
   let producer_counter = Arc::clone(&counter);
   let cell = Arc::new(ConcurrentLazyCell::new(move || {
      producer_counter.fetch_add(1, Ordering::SeqCst);
      thread::sleep(Duration::from_millis(20));
      Ok::<_, Infallible>(Some(String::from("fixed value")))
   }));
   let barrier = Arc::new(Barrier::new(10));

   let handles: Vec<_> = (0..10)
      .map(|_| {
         let cell = Arc::clone(&cell);
         let barrier = Arc::clone(&barrier);
         thread::spawn(move || {
            barrier.wait();
            let value = cell.resolve().unwrap().unwrap();
            (value.clone(), value as *const String as usize)
         })
      })
      .collect();

   let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
   assert_eq!(counter.load(Ordering::SeqCst), 1);
   for (value, address) in &results {
      assert_eq!(value, "fixed value");
      assert_eq!(*address, results[0].1);
   }
}

#[test]
fn test_static_cell() {
   let handles: Vec<_> = (0..8)
      .map(|_| thread::spawn(|| STATIC_CELL.resolve().unwrap().cloned()))
      .collect();
   for handle in handles {
      assert_eq!(handle.join().unwrap(), Some(String::from("static value")));
   }
   assert_eq!(STATIC_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_absent_result_is_cached() {
   let counter = AtomicUsize::new(0);
   let cell = ConcurrentLazyCell::new(|| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok::<Option<u8>, Infallible>(None)
   });
   assert_eq!(cell.resolve().unwrap(), None);
   assert_eq!(cell.resolve().unwrap(), None);
   assert!(cell.is_resolved());
   assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failure_is_retried() {
   let attempts = AtomicUsize::new(0);
   let cell = ConcurrentLazyCell::new(|| {
      if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
         Err(ProducerError)
      } else {
         Ok(Some("second attempt"))
      }
   });

   let error = cell.resolve().unwrap_err();
   assert!(error.cause().unwrap().is::<ProducerError>());
   assert!(!cell.is_resolved());

   assert_eq!(cell.resolve().unwrap(), Some(&"second attempt"));
   assert_eq!(cell.resolve().unwrap(), Some(&"second attempt"));
   assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_waiters_retry_after_failure() {
   let attempts = Arc::new(AtomicUsize::new(0));
   let producer_attempts = Arc::clone(&attempts);
   let cell = Arc::new(ConcurrentLazyCell::new(move || {
      let attempt = producer_attempts.fetch_add(1, Ordering::SeqCst);
      thread::sleep(Duration::from_millis(10));
      if attempt == 0 {
         Err(ProducerError)
      } else {
         Ok(Some(attempt))
      }
   }));
   let barrier = Arc::new(Barrier::new(6));

   let handles: Vec<_> = (0..6)
      .map(|_| {
         let cell = Arc::clone(&cell);
         let barrier = Arc::clone(&barrier);
         thread::spawn(move || {
            barrier.wait();
            cell.resolve().map(|value| value.copied()).ok()
         })
      })
      .collect();
   let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

   // One caller saw the failure; everyone else converged on the retried value.
   assert_eq!(results.iter().filter(|r| r.is_none()).count(), 1);
   assert!(results.iter().flatten().all(|value| *value == Some(1)));
   assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_producer_releases_lock() {
   let cell = ConcurrentLazyCell::new(|| -> Result<Option<i32>, Infallible> {
      panic!("producer panicked")
   });
   let outcome = panic::catch_unwind(AssertUnwindSafe(|| cell.resolve().map(|_| ())));
   assert!(outcome.is_err());
   // The lock is free again, so this returns instead of blocking.
   assert!(matches!(cell.resolve(), Err(LazyError::Poisoned)));
   assert!(!cell.is_resolved());
}

#[test]
fn test_producer_dropped_after_success() {
   let captured = Arc::new(());
   let witness = Arc::clone(&captured);
   let cell = ConcurrentLazyCell::new(move || {
      let _keep = &witness;
      Ok::<_, Infallible>(Some(1))
   });
   assert_eq!(Arc::strong_count(&captured), 2);
   cell.resolve().unwrap();
   assert_eq!(Arc::strong_count(&captured), 1);
   assert_eq!(cell.into_value(), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolve_async() {
   let counter = Arc::new(AtomicUsize::new(0));
   let producer_counter = Arc::clone(&counter);
   let cell = Arc::new(ConcurrentLazyCell::new(move || {
      producer_counter.fetch_add(1, Ordering::SeqCst);
      thread::sleep(Duration::from_millis(10));
      Ok::<_, Infallible>(Some(String::from("async value")))
   }));

   let tasks: Vec<_> = (0..10)
      .map(|_| {
         let cell = Arc::clone(&cell);
         tokio::spawn(async move { cell.resolve_async().await.unwrap().cloned() })
      })
      .collect();
   for task in tasks {
      assert_eq!(task.await.unwrap(), Some(String::from("async value")));
   }
   assert_eq!(counter.load(Ordering::SeqCst), 1);
}
