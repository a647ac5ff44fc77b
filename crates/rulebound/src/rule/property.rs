use super::{
    execute, execute_async, AsRuleCore, Invocation, RuleCore, RuleDescriptor, RuleKind,
    ValidationRule,
};
use crate::condition::{ApplyConditionTo, AsyncCondition, Condition};
use crate::context::{LazyValue, ValidationContext, ValueSource};
use crate::error::{Result, ValidationFailure};
use crate::validator::Property;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Reads a property value from an instance.
pub type Accessor<T, P> = Arc<dyn Fn(&T) -> P + Send + Sync>;

/// Rule over a single property value.
///
/// The value is read at most once per run, and only when a validator that
/// passed its condition asks for it.
pub struct PropertyRule<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    core: RuleCore<T, P>,
    accessor: Accessor<T, P>,
}

impl<T, P> PropertyRule<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    /// `property_name` is `None` for model-level rules.
    pub fn new<F>(property_name: Option<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        Self {
            core: RuleCore::new(property_name),
            accessor: Arc::new(accessor),
        }
    }

    fn invocation<'c>(
        &'c self,
        ctx: &'c ValidationContext<'c, T>,
        property_path: &'c str,
        display_name: &'c str,
        value: &'c LazyValue<'c, T, P>,
    ) -> Invocation<'c, T, P> {
        Invocation {
            ctx,
            property_path,
            display_name,
            value: ValueSource::Deferred(value),
            message_builder: self.core.message_builder(),
            cascade: self.core.effective_cascade(ctx),
            check_conditions: true,
        }
    }
}

impl<T, P> AsRuleCore<T, P> for PropertyRule<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    fn core(&self) -> &RuleCore<T, P> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RuleCore<T, P> {
        &mut self.core
    }
}

#[async_trait]
impl<T, P> ValidationRule<T> for PropertyRule<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    fn descriptor(&self) -> RuleDescriptor<'_> {
        self.core.descriptor(RuleKind::Property)
    }

    fn set_rule_sets(&mut self, rule_sets: Vec<String>) {
        self.core.set_rule_sets(rule_sets);
    }

    fn apply_condition(&mut self, condition: Condition<T>, scope: ApplyConditionTo) {
        self.core.apply_condition(condition, scope);
    }

    fn apply_async_condition(&mut self, condition: AsyncCondition<T>, scope: ApplyConditionTo) {
        self.core.apply_async_condition(condition, scope);
    }

    fn apply_shared_condition(&mut self, condition: Condition<T>) {
        self.core.apply_shared_condition(condition);
    }

    fn apply_shared_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.core.apply_shared_async_condition(condition);
    }

    fn validate(&self, ctx: &ValidationContext<'_, T>) -> Result<Vec<ValidationFailure>> {
        let Some(path) = self.core.gate(ctx, RuleKind::Property)? else {
            return Ok(Vec::new());
        };
        if !self.core.async_gate_blocking(ctx) {
            return Ok(Vec::new());
        }

        let display_name = self.core.resolve_display_name(ctx);
        let value = LazyValue::new(ctx.instance(), &*self.accessor);
        let validators = self.core.validator_refs();
        let failures = execute(
            &validators,
            self.invocation(ctx, &path, &display_name, &value),
        )?;

        trace_debug!(property = %path, failures = failures.len(), "rule executed");
        self.core.finish(ctx, failures)
    }

    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        let Some(path) = self.core.gate(ctx, RuleKind::Property)? else {
            return Ok(Vec::new());
        };
        if !self.core.async_gate(ctx, cancel).await {
            return Ok(Vec::new());
        }

        let display_name = self.core.resolve_display_name(ctx);
        let value = LazyValue::new(ctx.instance(), &*self.accessor);
        let validators = self.core.validator_refs();
        let failures = execute_async(
            &validators,
            self.invocation(ctx, &path, &display_name, &value),
            cancel,
        )
        .await?;

        trace_debug!(property = %path, failures = failures.len(), "rule executed");
        self.core.finish_async(ctx, failures, cancel).await
    }
}
