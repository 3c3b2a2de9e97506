use std::cell::Cell;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use utilkit::{ConcurrentSingleton, IllegalStateError, LazyError, Singleton};

#[derive(Debug, thiserror::Error)]
#[error("producer failed")]
struct ProducerError;

fn absent_cause(error: &LazyError) -> Option<IllegalStateError> {
   error
      .cause()
      .and_then(|cause| cause.downcast_ref::<IllegalStateError>())
      .copied()
}

#[test]
fn test_try_new_rejects_absent_producer() {
   let producer: Option<fn() -> Result<Option<i32>, Infallible>> = None;
   assert!(matches!(
      Singleton::<i32, _>::try_new(producer),
      Err(LazyError::InvalidArgument(_))
   ));
   assert!(matches!(
      ConcurrentSingleton::<i32, _>::try_new(producer),
      Err(LazyError::InvalidArgument(_))
   ));
}

#[test]
fn test_resolve_returns_instance() {
   let counter = Cell::new(0);
   let singleton = Singleton::new(|| {
      counter.set(counter.get() + 1);
      Ok::<_, Infallible>(Some(String::from("instance")))
   });
   assert_eq!(singleton.resolve().unwrap(), "instance");
   assert_eq!(singleton.resolve().unwrap(), "instance");
   assert!(singleton.is_resolved());
   assert_eq!(counter.get(), 1);
   assert_eq!(format!("{singleton:?}"), "Singleton(LazyCell(Some(\"instance\")))");
}

#[test]
fn test_absent_result_is_illegal_state() {
   let counter = Cell::new(0);
   let singleton = Singleton::new(|| {
      counter.set(counter.get() + 1);
      Ok::<Option<i32>, Infallible>(None)
   });

   let error = singleton.resolve().unwrap_err();
   assert!(matches!(error, LazyError::Execution(_)));
   assert_eq!(absent_cause(&error), Some(IllegalStateError::AbsentValue));
   assert_eq!(
      error.cause().unwrap().to_string(),
      "producer must yield a non-absent value"
   );
   assert!(!singleton.is_resolved());

   // The producer is kept and runs again.
   assert!(singleton.resolve().is_err());
   assert_eq!(counter.get(), 2);
}

#[test]
fn test_failure_wraps_cause() {
   let singleton = Singleton::new(|| Err::<Option<i32>, _>(ProducerError));
   let error = singleton.resolve().unwrap_err();
   assert!(error.cause().unwrap().is::<ProducerError>());
   assert_eq!(absent_cause(&error), None);
}

#[test]
fn test_concurrent_absent_result_is_illegal_state() {
   let singleton = ConcurrentSingleton::new(|| Ok::<Option<i32>, Infallible>(None));
   let error = singleton.resolve().unwrap_err();
   assert_eq!(absent_cause(&error), Some(IllegalStateError::AbsentValue));
   assert!(!singleton.is_resolved());
}

#[test]
fn test_concurrent_multi_thread_resolve() {
   let counter = Arc::new(AtomicUsize::new(0));
   let producer_counter = Arc::clone(&counter);
   let singleton = Arc::new(ConcurrentSingleton::new(move || {
      producer_counter.fetch_add(1, Ordering::SeqCst);
      Ok::<_, Infallible>(Some(vec![1u8, 2, 3]))
   }));
   let barrier = Arc::new(Barrier::new(10));

   let handles: Vec<_> = (0..10)
      .map(|_| {
         let singleton = Arc::clone(&singleton);
         let barrier = Arc::clone(&barrier);
         thread::spawn(move || {
            barrier.wait();
            singleton.resolve().unwrap().clone()
         })
      })
      .collect();
   for handle in handles {
      assert_eq!(handle.join().unwrap(), vec![1, 2, 3]);
   }
   assert_eq!(counter.load(Ordering::SeqCst), 1);
   assert_eq!(
      Arc::try_unwrap(singleton).ok().and_then(ConcurrentSingleton::into_value),
      Some(vec![1, 2, 3])
   );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_resolve_async() {
   let singleton = ConcurrentSingleton::new(|| Ok::<_, Infallible>(Some(7u64)));
   assert_eq!(singleton.resolve_async().await.unwrap(), &7);
   assert_eq!(singleton.resolve().unwrap(), &7);

   let absent = ConcurrentSingleton::new(|| Ok::<Option<u64>, Infallible>(None));
   let error = absent.resolve_async().await.unwrap_err();
   assert_eq!(absent_cause(&error), Some(IllegalStateError::AbsentValue));
}
