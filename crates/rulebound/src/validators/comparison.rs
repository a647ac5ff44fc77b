//! Comparison validators.

use crate::context::PropertyValidatorContext;
use crate::error::Result;
use crate::validator::{Property, PropertyValidator, ValidatorOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Comparison kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    /// `value <op> other`
    pub fn evaluate<V: PartialOrd + ?Sized>(self, value: &V, other: &V) -> bool {
        match self {
            Comparison::Equal => value == other,
            Comparison::NotEqual => value != other,
            Comparison::LessThan => value < other,
            Comparison::LessThanOrEqual => value <= other,
            Comparison::GreaterThan => value > other,
            Comparison::GreaterThanOrEqual => value >= other,
        }
    }

    /// Validator name, also the message key.
    pub fn validator_name(self) -> &'static str {
        match self {
            Comparison::Equal => "EqualValidator",
            Comparison::NotEqual => "NotEqualValidator",
            Comparison::LessThan => "LessThanValidator",
            Comparison::LessThanOrEqual => "LessThanOrEqualValidator",
            Comparison::GreaterThan => "GreaterThanValidator",
            Comparison::GreaterThanOrEqual => "GreaterThanOrEqualValidator",
        }
    }
}

/// What a property is compared against.
pub enum ComparisonValue<T, P> {
    Fixed(P),
    /// Read from the instance at validation time.
    Computed(Arc<dyn Fn(&T) -> P + Send + Sync>),
}

/// Compares the property value with a fixed or computed value.
///
/// Appends `{ComparisonValue}` on failure.
pub struct ComparisonValidator<T, P> {
    comparison: Comparison,
    value: ComparisonValue<T, P>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> ComparisonValidator<T, P> {
    pub fn new(comparison: Comparison, value: P) -> Self {
        Self {
            comparison,
            value: ComparisonValue::Fixed(value),
            options: ValidatorOptions::default(),
        }
    }

    pub fn computed<F>(comparison: Comparison, value: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        Self {
            comparison,
            value: ComparisonValue::Computed(Arc::new(value)),
            options: ValidatorOptions::default(),
        }
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl<T, P> PropertyValidator<T, P> for ComparisonValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + PartialOrd,
{
    fn name(&self) -> &str {
        self.comparison.validator_name()
    }

    fn options(&self) -> &ValidatorOptions<T, P> {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ValidatorOptions<T, P> {
        &mut self.options
    }

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        let value = ctx.value();
        let passed = match &self.value {
            ComparisonValue::Fixed(other) => {
                let passed = self.comparison.evaluate(value, other);
                if !passed {
                    ctx.formatter_mut().append_argument("ComparisonValue", other);
                }
                passed
            }
            ComparisonValue::Computed(read) => {
                let other = read(ctx.instance());
                let passed = self.comparison.evaluate(value, &other);
                if !passed {
                    ctx.formatter_mut().append_argument("ComparisonValue", &other);
                }
                passed
            }
        };
        Ok(passed)
    }
}

/// Checks `from <= value <= to`.
///
/// Appends `{From}` and `{To}` on failure.
pub struct InclusiveBetweenValidator<T, P> {
    from: P,
    to: P,
    options: ValidatorOptions<T, P>,
}

impl<T, P> InclusiveBetweenValidator<T, P> {
    pub fn new(from: P, to: P) -> Self {
        Self {
            from,
            to,
            options: ValidatorOptions::default(),
        }
    }
}

impl<T, P> PropertyValidator<T, P> for InclusiveBetweenValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + PartialOrd,
{
    validator_options!("InclusiveBetweenValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        let value = ctx.value();
        if *value >= self.from && *value <= self.to {
            return Ok(true);
        }
        ctx.formatter_mut()
            .append_argument("From", &self.from)
            .append_argument("To", &self.to);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_kinds() {
        assert!(Comparison::Equal.evaluate(&3, &3));
        assert!(Comparison::NotEqual.evaluate(&3, &4));
        assert!(Comparison::LessThan.evaluate(&3, &4));
        assert!(!Comparison::LessThan.evaluate(&4, &4));
        assert!(Comparison::LessThanOrEqual.evaluate(&4, &4));
        assert!(Comparison::GreaterThan.evaluate("b", "a"));
        assert!(Comparison::GreaterThanOrEqual.evaluate(&1.5, &1.5));
    }

    #[test]
    fn names() {
        assert_eq!(Comparison::GreaterThanOrEqual.validator_name(), "GreaterThanOrEqualValidator");
        assert_eq!(
            serde_json::to_string(&Comparison::LessThanOrEqual).unwrap(),
            "\"less_than_or_equal\""
        );
    }
}
