use std::any::Any;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use utilkit::{CustomNumber, Number, NumberOrdering};

/// A price quoted in cents, printed as a decimal amount.
#[derive(Debug)]
struct Cents(i64);

impl fmt::Display for Cents {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let sign = if self.0 < 0 { "-" } else { "" };
      write!(f, "{}{}.{:02}", sign, self.0.unsigned_abs() / 100, self.0.unsigned_abs() % 100)
   }
}

impl CustomNumber for Cents {
   fn as_any(&self) -> &dyn Any {
      self
   }
}

fn main() {
   let ordering = NumberOrdering::shared();

   let mut numbers = vec![
      Number::from(42u8),
      Number::from(-0.5f32),
      Number::from(i64::MAX),
      Number::from(i64::MAX as f64),
      Number::from(BigInt::from(u128::MAX)),
      Number::from(BigDecimal::from_str("41.999").unwrap()),
      Number::custom(Cents(4_150)),
   ];
   ordering.sort(&mut numbers).unwrap();
   for number in &numbers {
      println!("{:>40}  ({})", number, number.type_name());
   }

   // i64::MAX rounds up when widened to a double, so it sorts below its own cast
   println!(
      "{} vs {} as f64: {:?}",
      i64::MAX,
      i64::MAX,
      ordering.compare(&Number::from(i64::MAX), &Number::from(i64::MAX as f64)).unwrap()
   );

   // Values without a decimal form are reported, not ordered
   match ordering.compare(&Number::from(f64::NAN), &Number::from(1i64)) {
      Ok(order) => panic!("Should have failed, got {order:?}"),
      Err(e) => println!("Caught error: {}", e),
   }
}
