use rulebound::{Severity, ValidationFailure};
use serde_json::Value;
use std::fmt;

/// Matcher for validation failures
#[derive(Debug, Clone, Default)]
pub struct FailureMatcher {
    pub(crate) property: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) message_contains: Option<String>,
    pub(crate) error_code: Option<String>,
    pub(crate) severity: Option<Severity>,
    pub(crate) attempted_value: Option<Value>,
}

impl FailureMatcher {
    /// Create a matcher that accepts any failure
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a specific property path
    pub fn property(mut self, path: impl Into<String>) -> Self {
        self.property = Some(path.into());
        self
    }

    /// Match an exact message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Match messages containing `fragment`
    pub fn message_contains(mut self, fragment: impl Into<String>) -> Self {
        self.message_contains = Some(fragment.into());
        self
    }

    /// Match a specific error code
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Match a specific severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Match the attempted value, compared as JSON
    pub fn attempted_value(mut self, value: impl serde::Serialize) -> Self {
        self.attempted_value =
            Some(serde_json::to_value(value).expect("Failed to serialize attempted value"));
        self
    }

    /// Check if the matcher matches a failure
    pub fn matches(&self, failure: &ValidationFailure) -> bool {
        if let Some(p) = &self.property {
            if p != &failure.property_name {
                return false;
            }
        }

        if let Some(m) = &self.message {
            if m != &failure.error_message {
                return false;
            }
        }

        if let Some(fragment) = &self.message_contains {
            if !failure.error_message.contains(fragment.as_str()) {
                return false;
            }
        }

        if let Some(code) = &self.error_code {
            if failure.error_code.as_deref() != Some(code.as_str()) {
                return false;
            }
        }

        if let Some(severity) = self.severity {
            if failure.severity != severity {
                return false;
            }
        }

        if let Some(value) = &self.attempted_value {
            if failure.attempted_value.as_ref() != Some(value) {
                return false;
            }
        }

        true
    }
}

impl fmt::Display for FailureMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(p) = &self.property {
            parts.push(format!("property = {p:?}"));
        }
        if let Some(m) = &self.message {
            parts.push(format!("message = {m:?}"));
        }
        if let Some(fragment) = &self.message_contains {
            parts.push(format!("message contains {fragment:?}"));
        }
        if let Some(code) = &self.error_code {
            parts.push(format!("code = {code:?}"));
        }
        if let Some(severity) = self.severity {
            parts.push(format!("severity = {severity}"));
        }
        if let Some(value) = &self.attempted_value {
            parts.push(format!("attempted value = {value}"));
        }
        if parts.is_empty() {
            f.write_str("any failure")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ValidationFailure {
        ValidationFailure::new("Email", "'Email' is not a valid email address.")
            .with_error_code("EmailValidator")
            .with_attempted_value("nope")
    }

    #[test]
    fn matches_all_set_fields() {
        let matcher = FailureMatcher::new()
            .property("Email")
            .error_code("EmailValidator")
            .message_contains("valid email")
            .attempted_value("nope");
        assert!(matcher.matches(&failure()));
        assert!(FailureMatcher::new().matches(&failure()));
    }

    #[test]
    fn rejects_mismatches() {
        assert!(!FailureMatcher::new().property("Name").matches(&failure()));
        assert!(!FailureMatcher::new()
            .severity(Severity::Warning)
            .matches(&failure()));
        assert!(!FailureMatcher::new().attempted_value(3).matches(&failure()));
    }

    #[test]
    fn describes_itself() {
        assert_eq!(FailureMatcher::new().to_string(), "any failure");
        assert_eq!(
            FailureMatcher::new().property("Name").error_code("x").to_string(),
            "property = \"Name\", code = \"x\""
        );
    }
}
