//! Argument validation helpers.
//!
//! Absence is modelled with `Option`, so "non-null" checks here are "is `Some`" checks.
//! The lazy cell constructors use them to reject a missing producer.

/// Message used by [`require_all_present`].
pub const DEFAULT_MESSAGE: &str = "object cannot be absent";

/// Raised when a validation rule rejects an argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
   message: String,
}

impl ValidationError {
   pub fn new(message: impl Into<String>) -> Self {
      Self {
         message: message.into(),
      }
   }

   pub fn message(&self) -> &str {
      &self.message
   }
}

/// A rule applied to an argument before it is used.
pub trait Validator<T: ?Sized> {
   fn validate(&self, arg: &T) -> Result<(), ValidationError>;
}

impl<T: ?Sized, F> Validator<T> for F
where
   F: Fn(&T) -> Result<(), ValidationError>,
{
   #[inline]
   fn validate(&self, arg: &T) -> Result<(), ValidationError> {
      self(arg)
   }
}

/// A validator that accepts every argument.
pub fn unnecessary<T: ?Sized>() -> impl Validator<T> {
   |_: &T| -> Result<(), ValidationError> { Ok(()) }
}

/// A validator that rejects `None`.
pub fn non_null<T>() -> impl Validator<Option<T>> {
   |arg: &Option<T>| -> Result<(), ValidationError> {
      match arg {
         Some(_) => Ok(()),
         None => Err(ValidationError::new("argument cannot be absent")),
      }
   }
}

/// Fails with [`DEFAULT_MESSAGE`] if any item is `None`.
pub fn require_all_present<'a, T: 'a>(
   items: impl IntoIterator<Item = &'a Option<T>>,
) -> Result<(), ValidationError> {
   require_all_present_with(DEFAULT_MESSAGE, items)
}

/// Fails with `message` if any item is `None`.
pub fn require_all_present_with<'a, T: 'a>(
   message: &str,
   items: impl IntoIterator<Item = &'a Option<T>>,
) -> Result<(), ValidationError> {
   if items.into_iter().any(Option::is_none) {
      return Err(ValidationError::new(message));
   }
   Ok(())
}

/// Unwraps a required argument, naming it in the error.
pub(crate) fn require_present<T>(arg: Option<T>, name: &str) -> Result<T, ValidationError> {
   arg.ok_or_else(|| ValidationError::new(format!("{name} cannot be absent")))
}
