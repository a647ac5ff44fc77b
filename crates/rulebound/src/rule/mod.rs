//! Rules: property-bound groups of validators.
//!
//! A rule owns the validators for one property together with everything that
//! applies to them as a unit: rule-level conditions, cascade mode, display
//! name, rule sets, dependent rules and the failure callback.
//!
//! Running a rule goes through these gates in order, and stops with no
//! failures at the first one that vetoes:
//!
//! 1. the run's selector,
//! 2. the shared condition, then the shared async condition,
//! 3. the validators, under the rule's cascade mode.
//!
//! Afterwards the failure callback fires if the validators failed, otherwise
//! the dependent rules run.

mod collection;
mod executor;
mod include;
mod property;

pub use collection::{CollectionPropertyRule, IndexBuilder};
pub use executor::block_on_async;
pub use include::IncludeRule;
pub use property::PropertyRule;

pub(crate) use executor::{execute, execute_async, Invocation};

use crate::condition::{
    and_async_condition, and_condition, ApplyConditionTo, AsyncCondition, Condition,
};
use crate::context::ValidationContext;
use crate::error::{Result, ValidationError, ValidationFailure};
use crate::formatter::MessageFormatter;
use crate::options::CascadeMode;
use crate::validator::{Property, PropertyValidator};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What kind of rule a [`RuleDescriptor`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Property,
    Collection,
    Include,
}

/// Read-only view of a rule, handed to selectors.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor<'r> {
    pub property_name: Option<&'r str>,
    pub rule_sets: &'r [String],
    pub kind: RuleKind,
}

/// Inputs available to a [`MessageBuilder`].
#[derive(Debug)]
pub struct MessageBuilderContext<'a> {
    pub property_path: &'a str,
    pub display_name: &'a str,
    pub validator_name: &'a str,
    pub formatter: &'a MessageFormatter,
    /// The message the validator would report without a builder
    pub default_message: &'a str,
}

/// Replaces message construction for every failure of a rule.
pub type MessageBuilder = Arc<dyn Fn(&MessageBuilderContext<'_>) -> String + Send + Sync>;

/// Called once with a rule's failures when its validators fail.
pub type OnFailure<T> = Arc<dyn Fn(&T, &[ValidationFailure]) + Send + Sync>;

/// Display name of a rule's property.
#[derive(Clone)]
pub enum DisplayName<T> {
    Static(String),
    Factory(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

/// Identifies a validator within its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatorId(u64);

/// A rule that can run against a `T`.
#[async_trait]
pub trait ValidationRule<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    fn descriptor(&self) -> RuleDescriptor<'_>;

    /// Replace the rule's rule sets, including those of its dependent rules.
    fn set_rule_sets(&mut self, rule_sets: Vec<String>);

    /// Gate validators with `condition`, ANDed with their own conditions.
    fn apply_condition(&mut self, condition: Condition<T>, scope: ApplyConditionTo);

    /// Gate validators with an async `condition`.
    fn apply_async_condition(&mut self, condition: AsyncCondition<T>, scope: ApplyConditionTo);

    /// Gate the whole rule.
    fn apply_shared_condition(&mut self, condition: Condition<T>);

    /// Gate the whole rule with an async condition.
    fn apply_shared_async_condition(&mut self, condition: AsyncCondition<T>);

    fn validate(&self, ctx: &ValidationContext<'_, T>) -> Result<Vec<ValidationFailure>>;

    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>>;
}

/// Gives builders access to the shared parts of a rule.
pub trait AsRuleCore<T, P>: ValidationRule<T> + 'static
where
    T: Send + Sync + 'static,
    P: Property,
{
    fn core(&self) -> &RuleCore<T, P>;

    fn core_mut(&mut self) -> &mut RuleCore<T, P>;
}

/// State shared by property and collection rules.
pub struct RuleCore<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    property_name: Option<String>,
    display_name: Option<DisplayName<T>>,
    validators: Vec<(ValidatorId, Box<dyn PropertyValidator<T, P>>)>,
    next_id: u64,
    cascade: Option<CascadeMode>,
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
    rule_sets: Vec<String>,
    dependent_rules: Vec<Box<dyn ValidationRule<T>>>,
    on_failure: Option<OnFailure<T>>,
    message_builder: Option<MessageBuilder>,
    misconfiguration: Option<String>,
}

/// Outcome of a rule's gates: the property path, when the rule runs.
pub(crate) type Gate = Option<String>;

impl<T, P> RuleCore<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    pub fn new(property_name: Option<String>) -> Self {
        Self {
            property_name: property_name.filter(|name| !name.is_empty()),
            display_name: None,
            validators: Vec::new(),
            next_id: 0,
            cascade: None,
            condition: None,
            async_condition: None,
            rule_sets: Vec::new(),
            dependent_rules: Vec::new(),
            on_failure: None,
            message_builder: None,
            misconfiguration: None,
        }
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// Change the name used in property paths.
    pub fn set_property_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.property_name = (!name.is_empty()).then_some(name);
    }

    pub fn set_display_name(&mut self, display_name: DisplayName<T>) {
        self.display_name = Some(display_name);
    }

    /// Explicit display name, else the engine's resolver over the property name.
    pub fn resolve_display_name(&self, ctx: &ValidationContext<'_, T>) -> String {
        match &self.display_name {
            Some(DisplayName::Static(name)) => name.clone(),
            Some(DisplayName::Factory(factory)) => factory(ctx.instance()),
            None => self
                .property_name
                .as_deref()
                .map(|name| ctx.state().options().resolve_display_name(name))
                .unwrap_or_default(),
        }
    }

    pub fn add_validator(&mut self, validator: Box<dyn PropertyValidator<T, P>>) -> ValidatorId {
        let id = ValidatorId(self.next_id);
        self.next_id += 1;
        self.validators.push((id, validator));
        id
    }

    /// Swap the validator `id` for `validator`. Returns `false` if `id` is unknown.
    pub fn replace_validator(
        &mut self,
        id: ValidatorId,
        validator: Box<dyn PropertyValidator<T, P>>,
    ) -> bool {
        match self.validators.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => {
                slot.1 = validator;
                true
            }
            None => false,
        }
    }

    pub fn remove_validator(&mut self, id: ValidatorId) -> Option<Box<dyn PropertyValidator<T, P>>> {
        let position = self.validators.iter().position(|(existing, _)| *existing == id)?;
        Some(self.validators.remove(position).1)
    }

    pub fn clear_validators(&mut self) {
        self.validators.clear();
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn validators(&self) -> impl Iterator<Item = &dyn PropertyValidator<T, P>> {
        self.validators.iter().map(|(_, validator)| validator.as_ref())
    }

    /// The most recently added validator.
    pub fn current_validator_mut(&mut self) -> Option<&mut (dyn PropertyValidator<T, P> + 'static)> {
        self.validators.last_mut().map(|(_, validator)| validator.as_mut())
    }

    pub fn cascade(&self) -> Option<CascadeMode> {
        self.cascade
    }

    pub fn set_cascade(&mut self, mode: CascadeMode) {
        self.cascade = Some(mode);
    }

    pub fn rule_sets(&self) -> &[String] {
        &self.rule_sets
    }

    pub fn set_rule_sets(&mut self, rule_sets: Vec<String>) {
        for rule in &mut self.dependent_rules {
            rule.set_rule_sets(rule_sets.clone());
        }
        self.rule_sets = rule_sets;
    }

    pub fn apply_condition(&mut self, condition: Condition<T>, scope: ApplyConditionTo) {
        match scope {
            ApplyConditionTo::AllValidators => {
                for (_, validator) in &mut self.validators {
                    validator.options_mut().apply_condition(Arc::clone(&condition));
                }
                for rule in &mut self.dependent_rules {
                    rule.apply_condition(Arc::clone(&condition), scope);
                }
            }
            ApplyConditionTo::CurrentValidator => match self.current_validator_mut() {
                Some(validator) => validator.options_mut().apply_condition(condition),
                None => self.misconfigured("a condition was applied before any validator"),
            },
        }
    }

    pub fn apply_async_condition(&mut self, condition: AsyncCondition<T>, scope: ApplyConditionTo) {
        match scope {
            ApplyConditionTo::AllValidators => {
                for (_, validator) in &mut self.validators {
                    validator.options_mut().apply_async_condition(Arc::clone(&condition));
                }
                for rule in &mut self.dependent_rules {
                    rule.apply_async_condition(Arc::clone(&condition), scope);
                }
            }
            ApplyConditionTo::CurrentValidator => match self.current_validator_mut() {
                Some(validator) => validator.options_mut().apply_async_condition(condition),
                None => self.misconfigured("an async condition was applied before any validator"),
            },
        }
    }

    pub fn apply_shared_condition(&mut self, condition: Condition<T>) {
        self.condition = Some(and_condition(condition, self.condition.take()));
    }

    pub fn apply_shared_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.async_condition = Some(and_async_condition(condition, self.async_condition.take()));
    }

    pub fn add_dependent_rules(&mut self, rules: Vec<Box<dyn ValidationRule<T>>>) {
        self.dependent_rules.extend(rules);
    }

    pub fn dependent_rules(&self) -> &[Box<dyn ValidationRule<T>>] {
        &self.dependent_rules
    }

    pub fn set_on_failure(&mut self, callback: OnFailure<T>) {
        self.on_failure = Some(callback);
    }

    pub fn set_message_builder(&mut self, builder: MessageBuilder) {
        self.message_builder = Some(builder);
    }

    pub fn message_builder(&self) -> Option<&MessageBuilder> {
        self.message_builder.as_ref()
    }

    /// Record a definition mistake, reported when the rule runs.
    ///
    /// The first problem recorded wins.
    pub fn misconfigured(&mut self, problem: impl Into<String>) {
        if self.misconfiguration.is_none() {
            let name = self.property_name.as_deref().unwrap_or("<model>");
            self.misconfiguration = Some(format!("rule for '{name}': {}", problem.into()));
        }
    }

    pub(crate) fn descriptor(&self, kind: RuleKind) -> RuleDescriptor<'_> {
        RuleDescriptor {
            property_name: self.property_name.as_deref(),
            rule_sets: &self.rule_sets,
            kind,
        }
    }

    pub(crate) fn effective_cascade(&self, ctx: &ValidationContext<'_, T>) -> CascadeMode {
        self.cascade
            .unwrap_or_else(|| ctx.state().options().cascade_mode())
    }

    pub(crate) fn validator_refs(&self) -> Vec<&dyn PropertyValidator<T, P>> {
        self.validators().collect()
    }

    /// Misconfiguration, selector and shared sync condition gates.
    pub(crate) fn gate(&self, ctx: &ValidationContext<'_, T>, kind: RuleKind) -> Result<Gate> {
        if let Some(problem) = &self.misconfiguration {
            return Err(ValidationError::configuration(problem.clone()));
        }
        let path = ctx.property_path(self.property_name.as_deref().unwrap_or(""));
        let descriptor = self.descriptor(kind);
        if !ctx
            .state()
            .selector()
            .can_execute(&descriptor, &path, &ctx.selector_scope())
        {
            trace_trace!(property = %path, "rule not selected");
            return Ok(None);
        }
        if let Some(condition) = &self.condition {
            if !condition(ctx) {
                trace_trace!(property = %path, "rule condition not met");
                return Ok(None);
            }
        }
        Ok(Some(path))
    }

    /// Shared async condition, blocking. Used by synchronous runs.
    pub(crate) fn async_gate_blocking(&self, ctx: &ValidationContext<'_, T>) -> bool {
        match &self.async_condition {
            Some(condition) => {
                let cancel = CancellationToken::new();
                block_on_async(condition(ctx, &cancel))
            }
            None => true,
        }
    }

    pub(crate) async fn async_gate(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> bool {
        match &self.async_condition {
            Some(condition) => condition(ctx, cancel).await,
            None => true,
        }
    }

    /// Fire the failure callback, or run the dependent rules when there are
    /// no failures.
    pub(crate) fn finish(
        &self,
        ctx: &ValidationContext<'_, T>,
        failures: Vec<ValidationFailure>,
    ) -> Result<Vec<ValidationFailure>> {
        if !failures.is_empty() {
            self.notify_failure(ctx, &failures);
            return Ok(failures);
        }
        let mut dependent = Vec::new();
        for rule in &self.dependent_rules {
            dependent.extend(rule.validate(ctx)?);
        }
        Ok(dependent)
    }

    pub(crate) async fn finish_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        failures: Vec<ValidationFailure>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        if !failures.is_empty() {
            self.notify_failure(ctx, &failures);
            return Ok(failures);
        }
        let mut dependent = Vec::new();
        for rule in &self.dependent_rules {
            if cancel.is_cancelled() {
                return Err(ValidationError::Cancelled);
            }
            dependent.extend(rule.validate_async(ctx, cancel).await?);
        }
        Ok(dependent)
    }

    fn notify_failure(&self, ctx: &ValidationContext<'_, T>, failures: &[ValidationFailure]) {
        trace_debug!(
            property = self.property_name.as_deref().unwrap_or(""),
            failures = failures.len(),
            "rule failed"
        );
        if let Some(callback) = &self.on_failure {
            callback(ctx.instance(), failures);
        }
    }
}
