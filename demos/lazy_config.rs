use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use utilkit::{ConcurrentLazyCell, ConcurrentSingleton, LazyCell};

type ConfigProducer = fn() -> Result<Option<HashMap<&'static str, String>>, std::io::Error>;

static LOADS: AtomicUsize = AtomicUsize::new(0);
static CONFIG: ConcurrentLazyCell<HashMap<&'static str, String>, ConfigProducer> =
   ConcurrentLazyCell::new(load_config);

fn load_config() -> Result<Option<HashMap<&'static str, String>>, std::io::Error> {
   // This function runs only once
   LOADS.fetch_add(1, Ordering::Relaxed);
   println!("Loading configuration...");
   std::thread::sleep(std::time::Duration::from_millis(50));
   Ok(Some(HashMap::from([
      ("profile", "production".to_string()),
      ("workers", "4".to_string()),
   ])))
}

fn setting(key: &str) -> Option<&'static str> {
   CONFIG
      .resolve()
      .ok()
      .flatten()
      .and_then(|config| config.get(key))
      .map(String::as_str)
}

fn main() {
   let threads: Vec<_> = (0..5)
      .map(|_| {
         std::thread::spawn(|| {
            println!("Thread sees profile: {:?}", setting("profile"));
         })
      })
      .collect();
   for t in threads {
      t.join().unwrap();
   }
   assert_eq!(LOADS.load(Ordering::Relaxed), 1); // Producer ran only once

   // A failing producer is retried on the next resolve
   let mut attempts = 0;
   let flaky = LazyCell::new(|| {
      attempts += 1;
      if attempts == 1 {
         Err("backend unavailable")
      } else {
         Ok(Some(attempts))
      }
   });
   match flaky.resolve() {
      Ok(_) => panic!("Should have failed"),
      Err(e) => println!("Caught error: {} ({:?})", e, e.cause().map(ToString::to_string)),
   }
   assert!(!flaky.is_resolved());
   println!("Second attempt: {:?}", flaky.resolve().unwrap());

   // Singletons refuse to cache an absent value
   let workers =
      ConcurrentSingleton::new(|| setting("workers").map(str::parse::<usize>).transpose());
   println!("Workers: {}", workers.resolve().unwrap());

   let missing = ConcurrentSingleton::new(|| Ok::<_, std::io::Error>(setting("region")));
   match missing.resolve() {
      Ok(region) => panic!("Unexpected region {region}"),
      Err(e) => println!("Caught error: {} ({:?})", e, e.cause().map(ToString::to_string)),
   }
}
