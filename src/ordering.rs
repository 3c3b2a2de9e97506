//! Total ordering across numeric representations.
//!
//! [`NumberOrdering`] compares any two [`Number`]s, whatever their representation. Pairs are
//! dispatched by the first operand's kind; rules that do not cover the second operand retry
//! with the operands swapped and the result reversed, which keeps the order antisymmetric.
//! The last resort converts both operands to [`BigDecimal`] exactly.

use core::any::Any;
use core::cmp::Ordering;
use core::str::FromStr;
use std::borrow::Cow;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{BoxError, CompareError, NumericFormatError, Operand};
use crate::number::{Number, NumberKind};

static SHARED: NumberOrdering = NumberOrdering::new();

/// Stateless comparator giving a total order over [`Number`]s.
///
/// ```rust
/// use std::cmp::Ordering;
/// use utilkit::{Number, NumberOrdering};
///
/// let ordering = NumberOrdering::shared();
/// assert_eq!(ordering.compare(&Number::from(1i64), &Number::from(1.0f64)).unwrap(), Ordering::Equal);
/// assert_eq!(ordering.compare(&Number::from(-1i16), &Number::from(0.0f32)).unwrap(), Ordering::Less);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberOrdering;

/// Failure raised somewhere in the dispatch, before the operands are attached.
enum Failure {
   Incomparable(BoxError),
   Format(NumericFormatError),
}

impl Failure {
   fn into_error(self, first: &Number, second: &Number) -> CompareError {
      let first_type = first.type_name();
      let second_type = second.type_name();
      let (first, second) = (first.to_string(), second.to_string());
      match self {
         Self::Incomparable(source) => CompareError::IncomparableTypes {
            first_type,
            second_type,
            first,
            second,
            source,
         },
         Self::Format(source) => CompareError::InvalidNumericFormat {
            first_type,
            second_type,
            first,
            second,
            source,
         },
      }
   }
}

impl NumberOrdering {
   #[inline]
   pub const fn new() -> Self {
      Self
   }

   /// The process-wide instance.
   #[inline]
   pub fn shared() -> &'static Self {
      &SHARED
   }

   /// Compares two numbers.
   ///
   /// # Errors
   ///
   /// - [`CompareError::IncomparableTypes`] if both numbers share a custom type whose natural
   ///   ordering fails.
   /// - [`CompareError::InvalidNumericFormat`] if the decimal fallback is needed and an
   ///   operand is not a finite decimal numeral.
   pub fn compare(&self, first: &Number, second: &Number) -> Result<Ordering, CompareError> {
      self
         .dispatch(first, second)
         .map_err(|failure| failure.into_error(first, second))
   }

   /// Compares two possibly absent numbers, failing with [`CompareError::NullArgument`] when
   /// either is missing.
   pub fn compare_nullable(
      &self,
      first: Option<&Number>,
      second: Option<&Number>,
   ) -> Result<Ordering, CompareError> {
      let first = first.ok_or(CompareError::NullArgument(Operand::First))?;
      let second = second.ok_or(CompareError::NullArgument(Operand::Second))?;
      self.compare(first, second)
   }

   /// Sorts `numbers` in ascending order.
   ///
   /// Stops reporting at the first failed comparison; the slice is then left in an
   /// unspecified order.
   pub fn sort(&self, numbers: &mut [Number]) -> Result<(), CompareError> {
      let mut failure = None;
      numbers.sort_by(|a, b| {
         if failure.is_some() {
            return Ordering::Equal;
         }
         self.compare(a, b).unwrap_or_else(|error| {
            failure = Some(error);
            Ordering::Equal
         })
      });
      failure.map_or(Ok(()), Err)
   }

   fn dispatch(&self, first: &Number, second: &Number) -> Result<Ordering, Failure> {
      if let Some(ordering) = natural_ordering(first, second)? {
         return Ok(ordering);
      }
      match first {
         Number::I8(_) | Number::I16(_) | Number::I32(_) | Number::I64(_) => {
            self.compare_integral(first, second)
         }
         Number::F32(_) | Number::F64(_) => self.compare_fractional(first, second),
         Number::BigInt(value) => self.compare_big_integer(value, first, second),
         Number::Decimal(_) | Number::Custom(_) => compare_as_decimal(first, second),
      }
   }

   #[inline]
   fn reversed(&self, first: &Number, second: &Number) -> Result<Ordering, Failure> {
      self.dispatch(second, first).map(Ordering::reverse)
   }

   fn compare_integral(&self, first: &Number, second: &Number) -> Result<Ordering, Failure> {
      match (first.as_i64(), second.as_i64()) {
         (Some(a), Some(b)) => Ok(a.cmp(&b)),
         _ => self.reversed(first, second),
      }
   }

   fn compare_fractional(&self, first: &Number, second: &Number) -> Result<Ordering, Failure> {
      // Widening i64 to f64 rounds above 2^53.
      if let Number::I64(_) = second {
         return compare_as_decimal(first, second);
      }
      if !second.kind().is_primitive() {
         return self.reversed(first, second);
      }
      match (first.as_f64(), second.as_f64()) {
         (Some(a), Some(b)) => Ok(compare_doubles(a, b)),
         _ => self.reversed(first, second),
      }
   }

   fn compare_big_integer(
      &self,
      value: &BigInt,
      first: &Number,
      second: &Number,
   ) -> Result<Ordering, Failure> {
      if let Some(other) = second.as_i64() {
         return Ok(value.cmp(&BigInt::from(other)));
      }
      if second.kind() == NumberKind::Fractional {
         return compare_as_decimal(first, second);
      }
      self.reversed(first, second)
   }
}

impl Number {
   /// Compares with [`NumberOrdering::shared`].
   #[inline]
   pub fn try_cmp(&self, other: &Number) -> Result<Ordering, CompareError> {
      NumberOrdering::shared().compare(self, other)
   }
}

/// Ordering between two values of the same representation, if it has one.
fn natural_ordering(first: &Number, second: &Number) -> Result<Option<Ordering>, Failure> {
   let ordering = match (first, second) {
      (Number::I8(a), Number::I8(b)) => a.cmp(b),
      (Number::I16(a), Number::I16(b)) => a.cmp(b),
      (Number::I32(a), Number::I32(b)) => a.cmp(b),
      (Number::I64(a), Number::I64(b)) => a.cmp(b),
      (Number::F32(a), Number::F32(b)) => compare_doubles(f64::from(*a), f64::from(*b)),
      (Number::F64(a), Number::F64(b)) => compare_doubles(*a, *b),
      (Number::BigInt(a), Number::BigInt(b)) => a.cmp(b),
      (Number::Decimal(a), Number::Decimal(b)) => a.cmp(b),
      (Number::Custom(a), Number::Custom(b))
         if Any::type_id(a.as_any()) == Any::type_id(b.as_any()) =>
      {
         match a.natural_cmp(&**b) {
            Some(result) => result.map_err(Failure::Incomparable)?,
            None => return Ok(None),
         }
      }
      _ => return Ok(None),
   };
   Ok(Some(ordering))
}

/// Orders doubles totally: -0.0 below 0.0, and every NaN equal to every other NaN and above
/// positive infinity.
#[inline]
fn compare_doubles(a: f64, b: f64) -> Ordering {
   a.partial_cmp(&b)
      .filter(|ordering| ordering.is_ne())
      .unwrap_or_else(|| canonical_bits(a).cmp(&canonical_bits(b)))
}

#[inline]
fn canonical_bits(value: f64) -> i64 {
   let value = if value.is_nan() { f64::NAN } else { value };
   value.to_bits() as i64
}

fn compare_as_decimal(first: &Number, second: &Number) -> Result<Ordering, Failure> {
   tracing::trace!(%first, %second, "comparing through decimal fallback");
   let first = to_decimal(first).map_err(Failure::Format)?;
   let second = to_decimal(second).map_err(Failure::Format)?;
   Ok(first.cmp(&second))
}

fn to_decimal(number: &Number) -> Result<Cow<'_, BigDecimal>, NumericFormatError> {
   let decimal = match number {
      Number::Decimal(value) => return Ok(Cow::Borrowed(value)),
      Number::I8(value) => BigDecimal::from(*value),
      Number::I16(value) => BigDecimal::from(*value),
      Number::I32(value) => BigDecimal::from(*value),
      Number::I64(value) => BigDecimal::from(*value),
      Number::F32(value) => exact_decimal(f64::from(*value))?,
      Number::F64(value) => exact_decimal(*value)?,
      Number::BigInt(value) => BigDecimal::new(value.clone(), 0),
      Number::Custom(value) => BigDecimal::from_str(&value.to_string())?,
   };
   Ok(Cow::Owned(decimal))
}

/// Converts the exact binary value of a double, `mantissa * 2^exponent`, to a decimal.
fn exact_decimal(value: f64) -> Result<BigDecimal, NumericFormatError> {
   if !value.is_finite() {
      return Err(NumericFormatError::NonFinite(value));
   }
   let bits = value.to_bits();
   let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
   let fraction = bits & ((1 << 52) - 1);
   let (mut mantissa, mut exponent) = if biased_exponent == 0 {
      (fraction, -1074)
   } else {
      (fraction | (1 << 52), biased_exponent - 1075)
   };
   if mantissa != 0 && exponent < 0 {
      let shift = mantissa.trailing_zeros().min(exponent.unsigned_abs() as u32);
      mantissa >>= shift;
      exponent += i64::from(shift);
   }

   let mut unscaled = BigInt::from(mantissa);
   if bits >> 63 == 1 {
      unscaled = -unscaled;
   }
   if exponent >= 0 {
      Ok(BigDecimal::new(unscaled << exponent as usize, 0))
   } else {
      // m * 2^-k == m * 5^k / 10^k
      let scale = -exponent;
      Ok(BigDecimal::new(unscaled * BigInt::from(5u8).pow(scale as u32), scale))
   }
}
