//! Fluent assertions over validation results.

use crate::matcher::FailureMatcher;
use async_trait::async_trait;
use rulebound::{CancellationToken, Severity, ValidationFailure, ValidationResult, Validator};

/// Runs a validator for a test.
///
/// Panics if the run aborts with an error instead of producing a result.
#[async_trait]
pub trait TestValidate<T>
where
    T: Send + Sync + 'static,
{
    fn test_validate(&self, instance: &T) -> TestValidationResult;

    async fn test_validate_async(&self, instance: &T) -> TestValidationResult;
}

#[async_trait]
impl<T, V> TestValidate<T> for V
where
    T: Send + Sync + 'static,
    V: Validator<T> + ?Sized,
{
    #[track_caller]
    fn test_validate(&self, instance: &T) -> TestValidationResult {
        match self.validate(instance) {
            Ok(result) => TestValidationResult::new(result),
            Err(e) => panic!("validation aborted: {e}"),
        }
    }

    async fn test_validate_async(&self, instance: &T) -> TestValidationResult {
        let cancel = CancellationToken::new();
        match self.validate_async(instance, &cancel).await {
            Ok(result) => TestValidationResult::new(result),
            Err(e) => panic!("validation aborted: {e}"),
        }
    }
}

/// A validation result with assertion helpers.
#[derive(Debug, Clone)]
pub struct TestValidationResult {
    result: ValidationResult,
}

impl TestValidationResult {
    pub fn new(result: ValidationResult) -> Self {
        Self { result }
    }

    /// The wrapped result.
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn into_inner(self) -> ValidationResult {
        self.result
    }

    /// Assert at least one failure for `path`; refine with the returned assertion.
    #[track_caller]
    pub fn should_have_error_for(&self, path: &str) -> FailureAssertion<'_> {
        let failures: Vec<&ValidationFailure> = self
            .result
            .errors
            .iter()
            .filter(|failure| failure.property_name == path)
            .collect();
        if failures.is_empty() {
            panic!(
                "expected a failure for '{path}', found failures for {:?}",
                self.paths()
            );
        }
        FailureAssertion {
            path: path.to_string(),
            failures,
        }
    }

    /// Assert some failure matches `matcher`.
    #[track_caller]
    pub fn should_have_error(&self, matcher: FailureMatcher) -> &Self {
        if !self.result.errors.iter().any(|f| matcher.matches(f)) {
            panic!(
                "expected a failure matching {matcher}, found {:?}",
                self.result.errors
            );
        }
        self
    }

    /// Assert there is no failure for `path`.
    #[track_caller]
    pub fn should_not_have_error_for(&self, path: &str) -> &Self {
        let count = self.result.errors_for(path).count();
        if count > 0 {
            panic!("expected no failures for '{path}', found {count}");
        }
        self
    }

    /// Assert the result is valid.
    #[track_caller]
    pub fn should_not_have_any_errors(&self) -> &Self {
        if !self.result.is_valid() {
            panic!("expected no failures, found:\n{}", self.result);
        }
        self
    }

    /// Assert exactly `count` failures.
    #[track_caller]
    pub fn should_have_error_count(&self, count: usize) -> &Self {
        assert_eq!(
            self.result.errors.len(),
            count,
            "unexpected number of failures: {:?}",
            self.paths()
        );
        self
    }

    fn paths(&self) -> Vec<&str> {
        self.result
            .errors
            .iter()
            .map(|f| f.property_name.as_str())
            .collect()
    }
}

/// Failures for one property, narrowed by each call.
///
/// Every `with_*` call keeps only the failures that match and panics if none
/// are left.
#[derive(Debug)]
pub struct FailureAssertion<'r> {
    path: String,
    failures: Vec<&'r ValidationFailure>,
}

impl<'r> FailureAssertion<'r> {
    #[track_caller]
    pub fn with_error_code(self, code: &str) -> Self {
        self.narrow(FailureMatcher::new().error_code(code))
    }

    #[track_caller]
    pub fn with_message(self, message: &str) -> Self {
        self.narrow(FailureMatcher::new().message(message))
    }

    #[track_caller]
    pub fn with_message_containing(self, fragment: &str) -> Self {
        self.narrow(FailureMatcher::new().message_contains(fragment))
    }

    #[track_caller]
    pub fn with_severity(self, severity: Severity) -> Self {
        self.narrow(FailureMatcher::new().severity(severity))
    }

    #[track_caller]
    pub fn with_attempted_value(self, value: impl serde::Serialize) -> Self {
        self.narrow(FailureMatcher::new().attempted_value(value))
    }

    /// The failures still matching.
    pub fn failures(&self) -> &[&'r ValidationFailure] {
        &self.failures
    }

    #[track_caller]
    fn narrow(self, matcher: FailureMatcher) -> Self {
        let remaining: Vec<&ValidationFailure> = self
            .failures
            .iter()
            .copied()
            .filter(|f| matcher.matches(f))
            .collect();
        if remaining.is_empty() {
            panic!(
                "no failure for '{}' matches {matcher}; candidates: {:?}",
                self.path, self.failures
            );
        }
        Self {
            path: self.path,
            failures: remaining,
        }
    }
}
