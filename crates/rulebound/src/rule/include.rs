use super::{block_on_async, RuleDescriptor, RuleKind, ValidationRule};
use crate::condition::{
    and_async_condition, and_condition, ApplyConditionTo, AsyncCondition, Condition,
};
use crate::context::ValidationContext;
use crate::error::{Result, ValidationFailure};
use crate::model::Validator;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs another validator for the same type in the current context.
pub struct IncludeRule<T>
where
    T: Send + Sync + 'static,
{
    validator: Arc<dyn Validator<T>>,
    rule_sets: Vec<String>,
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
}

impl<T> IncludeRule<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(validator: Arc<dyn Validator<T>>) -> Self {
        Self {
            validator,
            rule_sets: Vec::new(),
            condition: None,
            async_condition: None,
        }
    }

    fn is_selected(&self, ctx: &ValidationContext<'_, T>) -> bool {
        let path = ctx.property_path("");
        ctx.state()
            .selector()
            .can_execute(&self.descriptor(), &path, &ctx.selector_scope())
            && self.condition.as_ref().map_or(true, |condition| condition(ctx))
    }
}

#[async_trait]
impl<T> ValidationRule<T> for IncludeRule<T>
where
    T: Send + Sync + 'static,
{
    fn descriptor(&self) -> RuleDescriptor<'_> {
        RuleDescriptor {
            property_name: None,
            rule_sets: &self.rule_sets,
            kind: RuleKind::Include,
        }
    }

    fn set_rule_sets(&mut self, rule_sets: Vec<String>) {
        self.rule_sets = rule_sets;
    }

    // An included validator has no validators of its own to gate, so every
    // condition applies to the include as a whole.
    fn apply_condition(&mut self, condition: Condition<T>, _scope: ApplyConditionTo) {
        self.apply_shared_condition(condition);
    }

    fn apply_async_condition(&mut self, condition: AsyncCondition<T>, _scope: ApplyConditionTo) {
        self.apply_shared_async_condition(condition);
    }

    fn apply_shared_condition(&mut self, condition: Condition<T>) {
        self.condition = Some(and_condition(condition, self.condition.take()));
    }

    fn apply_shared_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.async_condition = Some(and_async_condition(condition, self.async_condition.take()));
    }

    fn validate(&self, ctx: &ValidationContext<'_, T>) -> Result<Vec<ValidationFailure>> {
        if !self.is_selected(ctx) {
            return Ok(Vec::new());
        }
        if let Some(condition) = &self.async_condition {
            let cancel = CancellationToken::new();
            if !block_on_async(condition(ctx, &cancel)) {
                return Ok(Vec::new());
            }
        }
        self.validator.validate_context(ctx)
    }

    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        if !self.is_selected(ctx) {
            return Ok(Vec::new());
        }
        if let Some(condition) = &self.async_condition {
            if !condition(ctx, cancel).await {
                return Ok(Vec::new());
            }
        }
        self.validator.validate_context_async(ctx, cancel).await
    }
}
