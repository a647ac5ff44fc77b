//! Text length validators.

use super::TextValue;
use crate::context::PropertyValidatorContext;
use crate::error::{Result, ValidationError};
use crate::validator::{Property, PropertyValidator, ValidatorOptions};

/// Checks the character count of a text value.
///
/// Placeholders: `{MinLength}`, `{MaxLength}` (when bounded) and
/// `{TotalLength}`. Missing text passes.
pub struct LengthValidator<T, P> {
    name: &'static str,
    min: usize,
    max: Option<usize>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> LengthValidator<T, P> {
    /// Between `min` and `max` characters, inclusive.
    pub fn new(min: usize, max: usize) -> Self {
        let name = if min == max {
            "ExactLengthValidator"
        } else {
            "LengthValidator"
        };
        Self::with_bounds(name, min, Some(max))
    }

    /// Exactly `length` characters.
    pub fn exact(length: usize) -> Self {
        Self::with_bounds("ExactLengthValidator", length, Some(length))
    }

    /// At least `min` characters.
    pub fn minimum(min: usize) -> Self {
        Self::with_bounds("MinimumLengthValidator", min, None)
    }

    /// At most `max` characters.
    pub fn maximum(max: usize) -> Self {
        Self::with_bounds("MaximumLengthValidator", 0, Some(max))
    }

    fn with_bounds(name: &'static str, min: usize, max: Option<usize>) -> Self {
        Self {
            name,
            min,
            max,
            options: ValidatorOptions::default(),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }
}

impl<T, P> PropertyValidator<T, P> for LengthValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + TextValue,
{
    fn name(&self) -> &str {
        self.name
    }

    fn options(&self) -> &ValidatorOptions<T, P> {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ValidatorOptions<T, P> {
        &mut self.options
    }

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        if let Some(max) = self.max {
            if max < self.min {
                return Err(ValidationError::configuration(format!(
                    "max length {max} is less than min length {} for '{}'",
                    self.min,
                    ctx.property_path()
                )));
            }
        }
        let Some(text) = ctx.value().text() else {
            return Ok(true);
        };

        let length = text.chars().count();
        let in_range = length >= self.min && self.max.map_or(true, |max| length <= max);
        if in_range {
            return Ok(true);
        }

        let formatter = ctx.formatter_mut();
        formatter
            .append_argument("MinLength", self.min)
            .append_argument("TotalLength", length);
        if let Some(max) = self.max {
            formatter.append_argument("MaxLength", max);
        }
        Ok(false)
    }
}
