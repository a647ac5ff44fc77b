//! Error and failure types.
//!
//! A [`ValidationFailure`] is the expected outcome of a failed check and is
//! never surfaced as an `Err`. [`ValidationError`] covers everything that
//! aborts a validation run: misconfigured rules, errors raised by validator
//! code, and cancellation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result type alias for engine operations
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Error that aborts a validation run.
///
/// None of these are validation failures. They propagate unchanged to the
/// caller of `validate`/`validate_async` and no partial failure list is
/// returned alongside them.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A rule or validator was set up incorrectly.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Validator code failed for a reason other than reporting a failure.
    #[error("validator error: {0}")]
    Validator(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The asynchronous run was cancelled through its token.
    #[error("validation was cancelled")]
    Cancelled,
}

impl ValidationError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap an error raised inside validator code.
    pub fn validator(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Validator(error.into())
    }

    /// Returns `true` if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Severity attached to a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// One violated check against one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Chain-qualified property path (e.g. `Orders[1].Total`)
    pub property_name: String,
    /// Formatted, human-readable message
    pub error_message: String,
    /// The value that failed, as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_value: Option<serde_json::Value>,
    /// Optional state supplied by the validator's state provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_state: Option<serde_json::Value>,
    /// Failure severity
    #[serde(default)]
    pub severity: Severity,
    /// Error code (validator override or the global resolver's code)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Placeholder values used to format the message
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub placeholder_values: HashMap<String, serde_json::Value>,
}

impl ValidationFailure {
    /// Create a failure with a property path and message.
    pub fn new(property_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
            attempted_value: None,
            custom_state: None,
            severity: Severity::Error,
            error_code: None,
            placeholder_values: HashMap::new(),
        }
    }

    /// Set the attempted value.
    pub fn with_attempted_value(mut self, value: impl Serialize) -> Self {
        self.attempted_value = serde_json::to_value(value).ok();
        self
    }

    /// Set the error code.
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the custom state.
    pub fn with_custom_state(mut self, state: serde_json::Value) -> Self {
        self.custom_state = Some(state);
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_name.is_empty() {
            f.write_str(&self.error_message)
        } else {
            write!(f, "{}: {}", self.property_name, self.error_message)
        }
    }
}

/// A failed validation result, usable as an `Err` value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationErrors {
    /// Wrap a list of failures.
    pub fn new(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    /// Check if there are any failures.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get the number of failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Failures recorded for a property path.
    pub fn get(&self, property: &str) -> Vec<&ValidationFailure> {
        self.failures
            .iter()
            .filter(|f| f.property_name == property)
            .collect()
    }

    /// Convert to the JSON error document.
    pub fn to_api_error(&self) -> ApiValidationError {
        let fields = self
            .failures
            .iter()
            .map(|f| FieldErrorResponse {
                field: f.property_name.clone(),
                code: f.error_code.clone().unwrap_or_default(),
                message: f.error_message.clone(),
                severity: f.severity,
                params: if f.placeholder_values.is_empty() {
                    None
                } else {
                    Some(f.placeholder_values.clone())
                },
            })
            .collect();

        ApiValidationError {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: "Validation failed".to_string(),
                fields,
            },
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} error(s)", self.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// JSON document for a failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

/// Error body in the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
}

/// Single field entry in the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    pub field: String,
    pub code: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}
