//! Fluent rule definition.
//!
//! A [`RuleBuilder`] is returned by the `rule_for*` methods of
//! [`ModelValidator`]. Validator methods append validators; configuration
//! methods (`with_message`, `when`, ...) apply to the most recently added
//! one. The rule is added to its validator when the builder is dropped,
//! normally at the end of the statement.
//!
//! Misuse that cannot be caught by the type system, such as calling
//! `with_message` before any validator, is recorded on the rule and
//! reported as a configuration error when the rule first runs.

use crate::condition::{async_condition, condition, ApplyConditionTo};
use crate::context::ValidationContext;
use crate::error::{Result, Severity, ValidationFailure};
use crate::model::{ModelValidator, Validator};
use crate::options::CascadeMode;
use crate::rule::{
    AsRuleCore, CollectionPropertyRule, DisplayName, MessageBuilderContext, PropertyRule,
    RuleCore,
};
use crate::validator::{MessageSource, Property, PropertyValidator, ValidatorOptions};
use crate::validators::{
    AsyncCustomValidator, AsyncPredicateValidator, ChildTarget, ChildValidatorAdaptor, Comparison,
    ComparisonValidator, CustomContext, CustomValidator, EmailValidator, EmptyCheck,
    InclusiveBetweenValidator, LengthValidator, NotEmptyValidator, NotNullValidator, NullCheck,
    PredicateValidator, RegexValidator, TextValue,
};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for one rule.
pub struct RuleBuilder<'v, T, P, R = PropertyRule<T, P>>
where
    T: Send + Sync + 'static,
    P: Property,
    R: AsRuleCore<T, P>,
{
    owner: &'v mut ModelValidator<T>,
    rule: Option<R>,
    _property: PhantomData<fn() -> P>,
}

/// Builder for a rule over each element of a collection.
pub type CollectionRuleBuilder<'v, T, E> = RuleBuilder<'v, T, E, CollectionPropertyRule<T, E>>;

impl<'v, T, P, R> RuleBuilder<'v, T, P, R>
where
    T: Send + Sync + 'static,
    P: Property,
    R: AsRuleCore<T, P>,
{
    pub(crate) fn new(owner: &'v mut ModelValidator<T>, mut rule: R) -> Self {
        if let Some(mode) = owner.default_cascade() {
            rule.core_mut().set_cascade(mode);
        }
        Self {
            owner,
            rule: Some(rule),
            _property: PhantomData,
        }
    }

    fn update<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut RuleCore<T, P>),
    {
        if let Some(rule) = self.rule.as_mut() {
            f(rule.core_mut());
        }
        self
    }

    fn update_current<F>(self, method: &str, f: F) -> Self
    where
        F: FnOnce(&mut ValidatorOptions<T, P>),
    {
        self.update(|core| match core.current_validator_mut() {
            Some(validator) => f(validator.options_mut()),
            None => core.misconfigured(format!("`{method}` was called before any validator")),
        })
    }

    /// Append any validator.
    pub fn set_validator<V>(self, validator: V) -> Self
    where
        V: PropertyValidator<T, P> + 'static,
    {
        self.update(|core| {
            core.add_validator(Box::new(validator));
        })
    }

    pub fn not_empty(self) -> Self
    where
        P: EmptyCheck,
    {
        self.set_validator(NotEmptyValidator::new())
    }

    pub fn not_null(self) -> Self
    where
        P: NullCheck,
    {
        self.set_validator(NotNullValidator::new())
    }

    /// Between `min` and `max` characters. `max < min` is a configuration error.
    pub fn length(self, min: usize, max: usize) -> Self
    where
        P: TextValue,
    {
        self.set_validator(LengthValidator::new(min, max)).update(|core| {
            if max < min {
                core.misconfigured(format!("max length {max} is less than min length {min}"));
            }
        })
    }

    pub fn exact_length(self, length: usize) -> Self
    where
        P: TextValue,
    {
        self.set_validator(LengthValidator::exact(length))
    }

    pub fn minimum_length(self, min: usize) -> Self
    where
        P: TextValue,
    {
        self.set_validator(LengthValidator::minimum(min))
    }

    pub fn maximum_length(self, max: usize) -> Self
    where
        P: TextValue,
    {
        self.set_validator(LengthValidator::maximum(max))
    }

    /// Text must match `pattern`. An invalid pattern is a configuration error.
    pub fn matches(self, pattern: &str) -> Self
    where
        P: TextValue,
    {
        let validator = RegexValidator::new(pattern);
        let problem = validator
            .pattern_error()
            .map(|e| format!("invalid pattern `{pattern}`: {e}"));
        self.set_validator(validator).update(|core| {
            if let Some(problem) = problem {
                core.misconfigured(problem);
            }
        })
    }

    pub fn email(self) -> Self
    where
        P: TextValue,
    {
        self.set_validator(EmailValidator::new())
    }

    /// Compare against a fixed value.
    pub fn compare(self, comparison: Comparison, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.set_validator(ComparisonValidator::new(comparison, value))
    }

    /// Compare against a value read from the instance.
    pub fn compare_with<F>(self, comparison: Comparison, value: F) -> Self
    where
        P: PartialOrd,
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.set_validator(ComparisonValidator::computed(comparison, value))
    }

    pub fn equal(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::Equal, value)
    }

    pub fn not_equal(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::NotEqual, value)
    }

    pub fn less_than(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::LessThan, value)
    }

    pub fn less_than_or_equal(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::LessThanOrEqual, value)
    }

    pub fn greater_than(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::GreaterThan, value)
    }

    pub fn greater_than_or_equal(self, value: P) -> Self
    where
        P: PartialOrd,
    {
        self.compare(Comparison::GreaterThanOrEqual, value)
    }

    pub fn inclusive_between(self, from: P, to: P) -> Self
    where
        P: PartialOrd,
    {
        self.set_validator(InclusiveBetweenValidator::new(from, to))
    }

    /// Value must satisfy `predicate`.
    pub fn must<F>(self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.set_validator(PredicateValidator::new(move |_: &T, value: &P| predicate(value)))
    }

    /// Instance and value must satisfy `predicate`.
    pub fn must_with<F>(self, predicate: F) -> Self
    where
        F: Fn(&T, &P) -> bool + Send + Sync + 'static,
    {
        self.set_validator(PredicateValidator::new(predicate))
    }

    /// Value must satisfy an async predicate.
    pub fn must_async<F>(self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        self.set_validator(AsyncPredicateValidator::new(predicate))
    }

    /// Report failures through a callback.
    pub fn custom<F>(self, action: F) -> Self
    where
        F: Fn(&P, &mut CustomContext<'_, '_, T, P>) -> Result<()> + Send + Sync + 'static,
    {
        self.set_validator(CustomValidator::new(action))
    }

    /// Report failure messages from an async callback.
    pub fn custom_async<F>(self, action: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, Result<Vec<String>>>
            + Send
            + Sync
            + 'static,
    {
        self.set_validator(AsyncCustomValidator::new(action))
    }

    /// Validate the value with rules defined inline.
    pub fn child_rules<B>(self, define: B) -> Self
    where
        B: FnOnce(&mut ModelValidator<P>),
    {
        let mut child = ModelValidator::new();
        define(&mut child);
        let child: Arc<dyn Validator<P>> = Arc::new(child);
        self.set_validator(ChildValidatorAdaptor::<T, P, P>::new(child))
    }

    /// Validate the value, or the value inside an `Option`, with another validator.
    pub fn child_validator<U, V>(self, validator: Arc<V>) -> Self
    where
        U: Send + Sync + 'static,
        V: Validator<U> + 'static,
        P: ChildTarget<U>,
    {
        let validator: Arc<dyn Validator<U>> = validator;
        self.set_validator(ChildValidatorAdaptor::<T, P, U>::new(validator))
    }

    /// Run the rule's validators only when `predicate` holds.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.when_scoped(predicate, ApplyConditionTo::AllValidators)
    }

    pub fn when_scoped<F>(self, predicate: F, scope: ApplyConditionTo) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let cond = condition(move |ctx: &ValidationContext<'_, T>| predicate(ctx.instance()));
        self.update(|core| core.apply_condition(cond, scope))
    }

    pub fn unless<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.unless_scoped(predicate, ApplyConditionTo::AllValidators)
    }

    pub fn unless_scoped<F>(self, predicate: F, scope: ApplyConditionTo) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.when_scoped(move |instance| !predicate(instance), scope)
    }

    pub fn when_async<F>(self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        self.when_async_scoped(predicate, ApplyConditionTo::AllValidators)
    }

    pub fn when_async_scoped<F>(self, predicate: F, scope: ApplyConditionTo) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        let cond = async_condition(move |ctx, cancel| predicate(ctx.instance(), cancel));
        self.update(|core| core.apply_async_condition(cond, scope))
    }

    pub fn unless_async<F>(self, predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        self.unless_async_scoped(predicate, ApplyConditionTo::AllValidators)
    }

    pub fn unless_async_scoped<F>(self, predicate: F, scope: ApplyConditionTo) -> Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        let cond = async_condition(move |ctx, cancel| {
            let holds = predicate(ctx.instance(), cancel);
            Box::pin(async move { !holds.await })
        });
        self.update(|core| core.apply_async_condition(cond, scope))
    }

    /// Message template for the last validator. Placeholders are substituted.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = MessageSource::Literal(message.into());
        self.update_current("with_message", |options| options.set_error_message(message))
    }

    pub fn with_message_fn<F>(self, message: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let message = MessageSource::Factory(Arc::new(message));
        self.update_current("with_message_fn", |options| options.set_error_message(message))
    }

    pub fn with_error_code(self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.update_current("with_error_code", |options| options.set_error_code(code))
    }

    pub fn with_severity(self, severity: Severity) -> Self {
        self.update_current("with_severity", |options| {
            options.set_severity_provider(Arc::new(move |_: &T, _: &P| severity))
        })
    }

    pub fn with_severity_fn<F>(self, severity: F) -> Self
    where
        F: Fn(&T, &P) -> Severity + Send + Sync + 'static,
    {
        self.update_current("with_severity_fn", |options| {
            options.set_severity_provider(Arc::new(severity))
        })
    }

    /// Attach custom state to the last validator's failures.
    pub fn with_state<F, S>(self, state: F) -> Self
    where
        F: Fn(&T, &P) -> S + Send + Sync + 'static,
        S: Serialize,
    {
        self.update_current("with_state", |options| {
            options.set_custom_state_provider(Arc::new(move |instance: &T, value: &P| {
                serde_json::to_value(state(instance, value)).unwrap_or(serde_json::Value::Null)
            }))
        })
    }

    /// Display name used in messages.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name = DisplayName::Static(name.into());
        self.update(|core| core.set_display_name(name))
    }

    pub fn with_name_fn<F>(self, name: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let name = DisplayName::Factory(Arc::new(name));
        self.update(|core| core.set_display_name(name))
    }

    /// Name used in property paths.
    pub fn override_property_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.update(|core| core.set_property_name(name))
    }

    pub fn cascade(self, mode: CascadeMode) -> Self {
        self.update(|core| core.set_cascade(mode))
    }

    /// Rules that run only when this rule produces no failures.
    pub fn dependent_rules<B>(self, define: B) -> Self
    where
        B: FnOnce(&mut ModelValidator<T>),
    {
        let mut dependents = ModelValidator::new();
        if let Some(mode) = self.owner.default_cascade() {
            dependents.set_cascade_mode(mode);
        }
        define(&mut dependents);
        let rules = dependents.into_rules();
        self.update(|core| core.add_dependent_rules(rules))
    }

    /// Called once with this rule's failures when its validators fail.
    pub fn on_failure<F>(self, callback: F) -> Self
    where
        F: Fn(&T, &[ValidationFailure]) + Send + Sync + 'static,
    {
        self.update(|core| core.set_on_failure(Arc::new(callback)))
    }

    /// Build every failure message of this rule with `builder`.
    pub fn message_builder<F>(self, builder: F) -> Self
    where
        F: Fn(&MessageBuilderContext<'_>) -> String + Send + Sync + 'static,
    {
        self.update(|core| core.set_message_builder(Arc::new(builder)))
    }

    /// Direct access to the rule.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut R),
    {
        if let Some(rule) = self.rule.as_mut() {
            configure(rule);
        }
        self
    }
}

impl<'v, T, E> RuleBuilder<'v, T, E, CollectionPropertyRule<T, E>>
where
    T: Send + Sync + 'static,
    E: Property,
{
    /// Skip elements for which `filter` returns `false`.
    pub fn filter<F>(self, filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.configure(|rule| rule.set_filter(Arc::new(filter)))
    }

    /// Replace the default `[index]` indexer.
    pub fn index_builder<F>(self, builder: F) -> Self
    where
        F: Fn(&T, &[E], &E, usize) -> String + Send + Sync + 'static,
    {
        self.configure(|rule| rule.set_index_builder(Arc::new(builder)))
    }
}

impl<'v, T, P, R> Drop for RuleBuilder<'v, T, P, R>
where
    T: Send + Sync + 'static,
    P: Property,
    R: AsRuleCore<T, P>,
{
    fn drop(&mut self) {
        if let Some(rule) = self.rule.take() {
            self.owner.add_rule(Box::new(rule));
        }
    }
}
