//! Built-in property validators.
//!
//! Each validator implements [`PropertyValidator`](crate::PropertyValidator)
//! and carries its own [`ValidatorOptions`](crate::ValidatorOptions).

/// Implements the `name`/`options`/`options_mut` trio for a validator with
/// an `options` field.
macro_rules! validator_options {
    ($name:expr) => {
        fn name(&self) -> &str {
            $name
        }

        fn options(&self) -> &$crate::ValidatorOptions<T, P> {
            &self.options
        }

        fn options_mut(&mut self) -> &mut $crate::ValidatorOptions<T, P> {
            &mut self.options
        }
    };
}

mod builtin;
mod child;
mod comparison;
mod custom;
mod length;

pub use builtin::*;
pub use child::*;
pub use comparison::*;
pub use custom::*;
pub use length::*;
