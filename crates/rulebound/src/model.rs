//! Top-level validators.
//!
//! A [`ModelValidator`] owns the rules for one model type. Rules are defined
//! once and the validator is then shared across runs:
//!
//! ```rust
//! use rulebound::prelude::*;
//!
//! struct Customer {
//!     name: String,
//!     orders: Vec<i64>,
//! }
//!
//! let mut validator = ModelValidator::<Customer>::new();
//! validator
//!     .rule_for("Name", |c: &Customer| c.name.clone())
//!     .cascade(CascadeMode::Stop)
//!     .not_empty()
//!     .minimum_length(5);
//! validator
//!     .rule_for_each("Orders", |c: &Customer| c.orders.clone())
//!     .greater_than_or_equal(0);
//!
//! let result = validator
//!     .validate(&Customer { name: String::new(), orders: vec![3, -1] })
//!     .unwrap();
//! assert_eq!(result.errors.len(), 2);
//! assert_eq!(result.errors[0].property_name, "Name");
//! assert_eq!(result.errors[1].property_name, "Orders[1]");
//! ```

use crate::builder::{CollectionRuleBuilder, RuleBuilder};
use crate::condition::{async_condition, condition};
use crate::context::{ExecutionState, ValidationContext};
use crate::error::{Result, ValidationError, ValidationFailure};
use crate::options::{CascadeMode, ValidationOptions};
use crate::result::ValidationResult;
use crate::rule::{CollectionPropertyRule, IncludeRule, PropertyRule, ValidationRule};
use crate::validator::Property;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Something that validates a `T`.
///
/// Implementors provide the context-level methods; the instance-level entry
/// points are provided.
#[async_trait]
pub trait Validator<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Run every rule against `ctx`, in declaration order.
    fn validate_context(&self, ctx: &ValidationContext<'_, T>) -> Result<Vec<ValidationFailure>>;

    /// Async counterpart of [`validate_context`](Self::validate_context).
    async fn validate_context_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>>;

    /// Validate with default options.
    fn validate(&self, instance: &T) -> Result<ValidationResult> {
        self.validate_with(instance, ValidationOptions::default())
    }

    /// Validate with run options (rule sets, member selection, engine options).
    fn validate_with(&self, instance: &T, options: ValidationOptions) -> Result<ValidationResult> {
        let state = Arc::new(ExecutionState::from_options(&options, false));
        let ctx = ValidationContext::from_state(instance, state);
        let errors = self.validate_context(&ctx)?;
        trace_debug!(failures = errors.len(), "validation finished");
        Ok(ValidationResult::new(errors, options.rule_sets))
    }

    /// Validate asynchronously with default options.
    ///
    /// Cancelling `cancel` aborts the run with [`ValidationError::Cancelled`].
    async fn validate_async(
        &self,
        instance: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult> {
        self.validate_with_async(instance, ValidationOptions::default(), cancel)
            .await
    }

    /// Validate asynchronously with run options.
    async fn validate_with_async(
        &self,
        instance: &T,
        options: ValidationOptions,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult> {
        let state = Arc::new(ExecutionState::from_options(&options, true));
        let ctx = ValidationContext::from_state(instance, state);
        let errors = self.validate_context_async(&ctx, cancel).await?;
        trace_debug!(failures = errors.len(), "async validation finished");
        Ok(ValidationResult::new(errors, options.rule_sets))
    }
}

/// Rules for a model type.
pub struct ModelValidator<T>
where
    T: Send + Sync + 'static,
{
    rules: Vec<Box<dyn ValidationRule<T>>>,
    cascade: Option<CascadeMode>,
}

impl<T> Default for ModelValidator<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            cascade: None,
        }
    }
}

impl<T> ModelValidator<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Cascade mode for rules defined afterwards.
    pub fn with_cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.cascade = Some(mode);
        self
    }

    /// Cascade mode for rules defined afterwards.
    pub fn set_cascade_mode(&mut self, mode: CascadeMode) -> &mut Self {
        self.cascade = Some(mode);
        self
    }

    pub(crate) fn default_cascade(&self) -> Option<CascadeMode> {
        self.cascade
    }

    pub fn rules(&self) -> &[Box<dyn ValidationRule<T>>] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Box<dyn ValidationRule<T>>> {
        self.rules
    }

    /// Append a hand-built rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule<T>>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Rule for the property `property_name`, read by `accessor`.
    pub fn rule_for<P, F>(&mut self, property_name: impl Into<String>, accessor: F) -> RuleBuilder<'_, T, P>
    where
        P: Property,
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        let rule = PropertyRule::new(Some(property_name.into()), accessor);
        RuleBuilder::new(self, rule)
    }

    /// Model-level rule; its failures have an empty property path unless
    /// the rule is given a name.
    pub fn rule_for_value<P, F>(&mut self, accessor: F) -> RuleBuilder<'_, T, P>
    where
        P: Property,
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        let rule = PropertyRule::new(None, accessor);
        RuleBuilder::new(self, rule)
    }

    /// Rule for a property whose value is transformed before validation.
    pub fn rule_for_transformed<P, Q, F, G>(
        &mut self,
        property_name: impl Into<String>,
        accessor: F,
        transform: G,
    ) -> RuleBuilder<'_, T, Q>
    where
        Q: Property,
        F: Fn(&T) -> P + Send + Sync + 'static,
        G: Fn(P) -> Q + Send + Sync + 'static,
    {
        let rule = PropertyRule::new(Some(property_name.into()), move |instance: &T| {
            transform(accessor(instance))
        });
        RuleBuilder::new(self, rule)
    }

    /// Rule applied to each element of a collection.
    pub fn rule_for_each<E, F>(
        &mut self,
        property_name: impl Into<String>,
        accessor: F,
    ) -> CollectionRuleBuilder<'_, T, E>
    where
        E: Property,
        F: Fn(&T) -> Vec<E> + Send + Sync + 'static,
    {
        let rule = CollectionPropertyRule::new(Some(property_name.into()), move |instance: &T| {
            Some(accessor(instance))
        });
        RuleBuilder::new(self, rule)
    }

    /// Rule applied to each element of an optional collection; `None` passes.
    pub fn rule_for_each_optional<E, F>(
        &mut self,
        property_name: impl Into<String>,
        accessor: F,
    ) -> CollectionRuleBuilder<'_, T, E>
    where
        E: Property,
        F: Fn(&T) -> Option<Vec<E>> + Send + Sync + 'static,
    {
        let rule = CollectionPropertyRule::new(Some(property_name.into()), accessor);
        RuleBuilder::new(self, rule)
    }

    /// Put the rules defined in `define` into the comma-separated `rule_sets`.
    pub fn rule_set<B>(&mut self, rule_sets: &str, define: B) -> &mut Self
    where
        B: FnOnce(&mut Self),
    {
        let names: Vec<String> = rule_sets
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        let start = self.rules.len();
        define(self);
        for rule in &mut self.rules[start..] {
            rule.set_rule_sets(names.clone());
        }
        self
    }

    /// Run the rules defined in `define` only when `predicate` holds.
    pub fn when<F, B>(&mut self, predicate: F, define: B) -> &mut Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        B: FnOnce(&mut Self),
    {
        let start = self.rules.len();
        define(self);
        let shared = condition(move |ctx: &ValidationContext<'_, T>| predicate(ctx.instance()));
        for rule in &mut self.rules[start..] {
            rule.apply_shared_condition(Arc::clone(&shared));
        }
        self
    }

    /// Run the rules defined in `define` only when `predicate` does not hold.
    pub fn unless<F, B>(&mut self, predicate: F, define: B) -> &mut Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        B: FnOnce(&mut Self),
    {
        self.when(move |instance| !predicate(instance), define)
    }

    /// Run the rules defined in `define` only when the async `predicate` holds.
    pub fn when_async<F, B>(&mut self, predicate: F, define: B) -> &mut Self
    where
        F: for<'a> Fn(&'a T, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        B: FnOnce(&mut Self),
    {
        let start = self.rules.len();
        define(self);
        let shared = async_condition(move |ctx, cancel| predicate(ctx.instance(), cancel));
        for rule in &mut self.rules[start..] {
            rule.apply_shared_async_condition(Arc::clone(&shared));
        }
        self
    }

    /// Run all rules of `validator` against the same instance.
    pub fn include(&mut self, validator: Arc<dyn Validator<T>>) -> &mut Self {
        self.rules.push(Box::new(IncludeRule::new(validator)));
        self
    }
}

#[async_trait]
impl<T> Validator<T> for ModelValidator<T>
where
    T: Send + Sync + 'static,
{
    fn validate_context(&self, ctx: &ValidationContext<'_, T>) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        for rule in &self.rules {
            failures.extend(rule.validate(ctx)?);
        }
        Ok(failures)
    }

    async fn validate_context_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        for rule in &self.rules {
            if cancel.is_cancelled() {
                return Err(ValidationError::Cancelled);
            }
            failures.extend(rule.validate_async(ctx, cancel).await?);
        }
        Ok(failures)
    }
}

impl<T> fmt::Debug for ModelValidator<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelValidator")
            .field("rules", &self.rules.len())
            .field("cascade", &self.cascade)
            .finish()
    }
}
