use rulebound::{Property, PropertyValidator, PropertyValidatorContext, ValidatorOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A validator that records how often it runs
///
/// ```rust
/// use rulebound::{CascadeMode, ModelValidator, Validator};
/// use rulebound_testing::{SpyValidator, Times};
///
/// struct User {
///     name: String,
/// }
///
/// let (first, first_calls) = SpyValidator::failing();
/// let (second, second_calls) = SpyValidator::failing();
///
/// let mut validator = ModelValidator::<User>::new();
/// validator
///     .rule_for("Name", |u: &User| u.name.clone())
///     .cascade(CascadeMode::Stop)
///     .set_validator(first)
///     .set_validator(second);
///
/// validator.validate(&User { name: "x".into() }).unwrap();
/// first_calls.verify(Times::Once);
/// second_calls.verify(Times::Never);
/// ```
pub struct SpyValidator<T, P> {
    name: String,
    outcome: bool,
    calls: Arc<AtomicUsize>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> SpyValidator<T, P> {
    /// A spy that always passes, plus a handle to its call count
    pub fn passing() -> (Self, SpyHandle) {
        Self::with_outcome(true)
    }

    /// A spy that always fails, plus a handle to its call count
    pub fn failing() -> (Self, SpyHandle) {
        Self::with_outcome(false)
    }

    fn with_outcome(outcome: bool) -> (Self, SpyHandle) {
        let calls = Arc::new(AtomicUsize::new(0));
        let spy = Self {
            name: "SpyValidator".to_string(),
            outcome,
            calls: Arc::clone(&calls),
            options: ValidatorOptions::default(),
        };
        (spy, SpyHandle { calls })
    }

    /// Report failures under `name` instead of `SpyValidator`
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T, P> PropertyValidator<T, P> for SpyValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn options(&self) -> &ValidatorOptions<T, P> {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ValidatorOptions<T, P> {
        &mut self.options
    }

    fn is_valid(&self, _ctx: &mut PropertyValidatorContext<'_, T, P>) -> rulebound::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome)
    }
}

/// Call counter of a [`SpyValidator`]
#[derive(Debug, Clone)]
pub struct SpyHandle {
    calls: Arc<AtomicUsize>,
}

impl SpyHandle {
    /// Number of times the spy ran
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Panic unless the call count satisfies `times`
    #[track_caller]
    pub fn verify(&self, times: Times) {
        let calls = self.calls();
        if !times.accepts(calls) {
            panic!("spy expected to run {times:?}, ran {calls} time(s)");
        }
    }
}

/// Define how many times a spy should have run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    Never,
    Once,
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    Any,
}

impl Times {
    pub fn accepts(self, calls: usize) -> bool {
        match self {
            Times::Never => calls == 0,
            Times::Once => calls == 1,
            Times::Exactly(n) => calls == n,
            Times::AtLeast(n) => calls >= n,
            Times::AtMost(n) => calls <= n,
            Times::Any => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn handle_counts_and_resets() {
        let (_spy, handle) = SpyValidator::<(), String>::passing();
        handle.calls.fetch_add(2, Ordering::SeqCst);
        handle.verify(Times::Exactly(2));
        handle.reset();
        handle.verify(Times::Never);
    }

    #[test]
    #[should_panic(expected = "spy expected to run Once")]
    fn verify_panics_on_mismatch() {
        let (_spy, handle) = SpyValidator::<(), String>::failing();
        handle.verify(Times::Once);
    }

    proptest! {
        #[test]
        fn prop_times_bounds(calls in 0usize..100, n in 0usize..100) {
            prop_assert_eq!(Times::Exactly(n).accepts(calls), calls == n);
            prop_assert_eq!(Times::AtLeast(n).accepts(calls), calls >= n);
            prop_assert_eq!(Times::AtMost(n).accepts(calls), calls <= n);
            prop_assert!(Times::Any.accepts(calls));
        }
    }
}
