//! Outcome of a validation run.

use crate::error::{ApiValidationError, ValidationErrors, ValidationFailure};
use crate::selector::DEFAULT_RULE_SET;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failures of one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationFailure>,
    /// Rule sets the run was asked to execute (`default` when none were named)
    pub rule_sets_executed: Vec<String>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ValidationFailure>, rule_sets: Vec<String>) -> Self {
        let rule_sets_executed = if rule_sets.is_empty() {
            vec![DEFAULT_RULE_SET.to_string()]
        } else {
            rule_sets
        };
        Self {
            errors,
            rule_sets_executed,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures recorded for `property_path`.
    pub fn errors_for<'a>(&'a self, property_path: &'a str) -> impl Iterator<Item = &'a ValidationFailure> {
        self.errors
            .iter()
            .filter(move |failure| failure.property_name == property_path)
    }

    /// `Ok(())` when valid, the failures as an error otherwise.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }

    pub fn to_api_error(&self) -> ApiValidationError {
        ValidationErrors::new(self.errors.clone()).to_api_error()
    }

    /// Messages joined by `separator`.
    pub fn to_string_with(&self, separator: &str) -> String {
        self.errors
            .iter()
            .map(|failure| failure.error_message.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with("\n"))
    }
}
