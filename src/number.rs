//! Numeric values in any of the representations [`NumberOrdering`](crate::NumberOrdering)
//! can order.

use core::any::Any;
use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::BoxError;

/// A user-defined numeric type.
///
/// Its [`Display`](fmt::Display) output is its string form, which must be a decimal numeral
/// for it to be compared with other representations.
pub trait CustomNumber: fmt::Display + fmt::Debug + Send + Sync + 'static {
   /// Identity of the concrete type, used to detect same-type comparisons.
   fn as_any(&self) -> &dyn Any;

   /// Natural ordering against another value of the same concrete type.
   ///
   /// Return `None` if the type has no natural ordering. Only called when `other` has the
   /// same concrete type as `self`.
   fn natural_cmp(&self, other: &dyn CustomNumber) -> Option<Result<Ordering, BoxError>> {
      let _ = other;
      None
   }

   /// Type name used in error messages.
   fn type_name(&self) -> &'static str {
      core::any::type_name::<Self>()
   }
}

/// A numeric value tagged with its representation.
#[derive(Debug, Clone)]
pub enum Number {
   I8(i8),
   I16(i16),
   I32(i32),
   I64(i64),
   F32(f32),
   F64(f64),
   BigInt(BigInt),
   Decimal(BigDecimal),
   Custom(Arc<dyn CustomNumber>),
}

/// How a [`Number`] is treated by the ordering, recomputed on every comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
   /// Fixed-width signed integer that fits in `i64`.
   Integral,
   /// Floating point value that fits in `f64`.
   Fractional,
   /// Arbitrary-precision integer.
   BigInteger,
   /// Arbitrary-precision decimal.
   Decimal,
   /// Anything else; compared through its string form.
   Opaque,
}

impl NumberKind {
   /// Fixed-width kinds.
   #[inline]
   pub fn is_primitive(self) -> bool {
      matches!(self, Self::Integral | Self::Fractional)
   }
}

impl Number {
   /// Wraps a user-defined number.
   pub fn custom(value: impl CustomNumber) -> Self {
      Self::Custom(Arc::new(value))
   }

   pub fn kind(&self) -> NumberKind {
      match self {
         Self::I8(_) | Self::I16(_) | Self::I32(_) | Self::I64(_) => NumberKind::Integral,
         Self::F32(_) | Self::F64(_) => NumberKind::Fractional,
         Self::BigInt(_) => NumberKind::BigInteger,
         Self::Decimal(_) => NumberKind::Decimal,
         Self::Custom(_) => NumberKind::Opaque,
      }
   }

   /// Name of the representation, for error messages.
   pub fn type_name(&self) -> &'static str {
      match self {
         Self::I8(_) => "i8",
         Self::I16(_) => "i16",
         Self::I32(_) => "i32",
         Self::I64(_) => "i64",
         Self::F32(_) => "f32",
         Self::F64(_) => "f64",
         Self::BigInt(_) => "BigInt",
         Self::Decimal(_) => "BigDecimal",
         Self::Custom(value) => value.type_name(),
      }
   }

   /// The value widened to `i64`, for integral numbers.
   #[inline]
   pub fn as_i64(&self) -> Option<i64> {
      match *self {
         Self::I8(v) => Some(v.into()),
         Self::I16(v) => Some(v.into()),
         Self::I32(v) => Some(v.into()),
         Self::I64(v) => Some(v),
         _ => None,
      }
   }

   /// The value widened to `f64`, for primitive numbers.
   ///
   /// Lossy for `i64` magnitudes above 2^53.
   #[inline]
   pub fn as_f64(&self) -> Option<f64> {
      match *self {
         Self::F32(v) => Some(v.into()),
         Self::F64(v) => Some(v),
         _ => self.as_i64().map(|v| v as f64),
      }
   }
}

impl fmt::Display for Number {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::I8(v) => fmt::Display::fmt(v, f),
         Self::I16(v) => fmt::Display::fmt(v, f),
         Self::I32(v) => fmt::Display::fmt(v, f),
         Self::I64(v) => fmt::Display::fmt(v, f),
         Self::F32(v) => fmt::Display::fmt(v, f),
         Self::F64(v) => fmt::Display::fmt(v, f),
         Self::BigInt(v) => fmt::Display::fmt(v, f),
         Self::Decimal(v) => fmt::Display::fmt(v, f),
         Self::Custom(v) => fmt::Display::fmt(v, f),
      }
   }
}

macro_rules! impl_from {
   ($($source:ty => $variant:ident),* $(,)?) => {
      $(
         impl From<$source> for Number {
            #[inline]
            fn from(value: $source) -> Self {
               Self::$variant(value.into())
            }
         }
      )*
   };
}

// Unsigned values widen into the next signed representation; no new kind is needed.
impl_from! {
   i8 => I8,
   i16 => I16,
   i32 => I32,
   i64 => I64,
   u8 => I16,
   u16 => I32,
   u32 => I64,
   f32 => F32,
   f64 => F64,
   u64 => BigInt,
   i128 => BigInt,
   u128 => BigInt,
   BigInt => BigInt,
   BigDecimal => Decimal,
}

impl From<Arc<dyn CustomNumber>> for Number {
   #[inline]
   fn from(value: Arc<dyn CustomNumber>) -> Self {
      Self::Custom(value)
   }
}
