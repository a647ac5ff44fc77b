use super::{
    block_on_async, execute, execute_async, AsRuleCore, Invocation, RuleCore, RuleDescriptor,
    RuleKind, ValidationRule,
};
use crate::condition::{ApplyConditionTo, AsyncCondition, Condition};
use crate::context::{ValidationContext, ValueSource};
use crate::error::{Result, ValidationError, ValidationFailure};
use crate::validator::{Property, PropertyValidator};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Reads an optional collection from an instance.
pub type CollectionAccessor<T, E> = Arc<dyn Fn(&T) -> Option<Vec<E>> + Send + Sync>;

/// Excludes elements from validation.
pub type ElementFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Builds the indexer text for an element: `(instance, collection, element, index)`.
///
/// The result is appended to the property name verbatim, so it carries its
/// own brackets.
pub type IndexBuilder<T, E> = Arc<dyn Fn(&T, &[E], &E, usize) -> String + Send + Sync>;

/// Rule applied to every element of a collection property.
///
/// Validator conditions are evaluated once against the instance, before any
/// element is visited. Each element is then validated in its own context
/// named `Property[index]`; cascade mode applies per element. A `None`
/// collection yields no failures. Filtered-out elements still consume their
/// index, so indices always reflect enumeration position.
pub struct CollectionPropertyRule<T, E>
where
    T: Send + Sync + 'static,
    E: Property,
{
    core: RuleCore<T, E>,
    accessor: CollectionAccessor<T, E>,
    filter: Option<ElementFilter<E>>,
    index_builder: Option<IndexBuilder<T, E>>,
}

impl<T, E> CollectionPropertyRule<T, E>
where
    T: Send + Sync + 'static,
    E: Property,
{
    pub fn new<F>(property_name: Option<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<Vec<E>> + Send + Sync + 'static,
    {
        Self {
            core: RuleCore::new(property_name),
            accessor: Arc::new(accessor),
            filter: None,
            index_builder: None,
        }
    }

    pub fn set_filter(&mut self, filter: ElementFilter<E>) {
        self.filter = Some(filter);
    }

    pub fn set_index_builder(&mut self, builder: IndexBuilder<T, E>) {
        self.index_builder = Some(builder);
    }

    fn property_name(&self) -> Result<&str> {
        self.core.property_name().ok_or_else(|| {
            ValidationError::configuration(
                "collection rule has no property name; name it explicitly",
            )
        })
    }

    fn is_included(&self, element: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(element))
    }

    /// Context and path for the element at `index`.
    fn element_context<'a>(
        &self,
        ctx: &ValidationContext<'a, T>,
        property_name: &str,
        collection: &[E],
        element: &E,
        index: usize,
    ) -> (ValidationContext<'a, T>, String) {
        let mut chain = ctx.property_chain().clone();
        chain.add(property_name);
        match &self.index_builder {
            Some(build) => chain.add_indexer(build(ctx.instance(), collection, element, index), false),
            None => chain.add_indexer(index, true),
        }
        let path = chain.to_path(ctx.state().options().property_chain_separator());
        (ctx.clone_for_child_collection(chain, index), path)
    }

    fn root_validators_blocking(
        &self,
        ctx: &ValidationContext<'_, T>,
    ) -> Vec<&dyn PropertyValidator<T, E>> {
        self.core
            .validators()
            .filter(|validator| validator.options().invoke_condition(ctx))
            .filter(|validator| {
                !validator.options().has_async_condition() || {
                    let cancel = CancellationToken::new();
                    block_on_async(validator.options().invoke_async_condition(ctx, &cancel))
                }
            })
            .collect()
    }

    async fn root_validators(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Vec<&dyn PropertyValidator<T, E>> {
        let mut selected = Vec::new();
        for validator in self.core.validators() {
            if !validator.options().invoke_condition(ctx) {
                continue;
            }
            if !validator.options().invoke_async_condition(ctx, cancel).await {
                continue;
            }
            selected.push(validator);
        }
        selected
    }
}

impl<T, E> AsRuleCore<T, E> for CollectionPropertyRule<T, E>
where
    T: Send + Sync + 'static,
    E: Property,
{
    fn core(&self) -> &RuleCore<T, E> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RuleCore<T, E> {
        &mut self.core
    }
}

#[async_trait]
impl<T, E> ValidationRule<T> for CollectionPropertyRule<T, E>
where
    T: Send + Sync + 'static,
    E: Property,
{
    fn descriptor(&self) -> RuleDescriptor<'_> {
        self.core.descriptor(RuleKind::Collection)
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
        let Some(path) = self.core.gate(ctx, RuleKind::Collection)? else {
            return Ok(Vec::new());
        };
        if !self.core.async_gate_blocking(ctx) {
            return Ok(Vec::new());
        }
        let Some(collection) = (self.accessor)(ctx.instance()) else {
            trace_trace!(property = %path, "collection is absent");
            return self.core.finish(ctx, Vec::new());
        };
        let property_name = self.property_name()?;

        let validators = self.root_validators_blocking(ctx);
        let display_name = self.core.resolve_display_name(ctx);
        let cascade = self.core.effective_cascade(ctx);
        let mut failures = Vec::new();

        if !validators.is_empty() {
            for (index, element) in collection.iter().enumerate() {
                if !self.is_included(element) {
                    continue;
                }
                let (element_ctx, element_path) =
                    self.element_context(ctx, property_name, &collection, element, index);
                let invocation = Invocation {
                    ctx: &element_ctx,
                    property_path: &element_path,
                    display_name: &display_name,
                    value: ValueSource::Element(element),
                    message_builder: self.core.message_builder(),
                    cascade,
                    check_conditions: false,
                };
                failures.extend(execute(&validators, invocation)?);
            }
        }

        trace_debug!(
            property = %path,
            elements = collection.len(),
            failures = failures.len(),
            "collection rule executed"
        );
        self.core.finish(ctx, failures)
    }

    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        let Some(path) = self.core.gate(ctx, RuleKind::Collection)? else {
            return Ok(Vec::new());
        };
        if !self.core.async_gate(ctx, cancel).await {
            return Ok(Vec::new());
        }
        let Some(collection) = (self.accessor)(ctx.instance()) else {
            trace_trace!(property = %path, "collection is absent");
            return self.core.finish_async(ctx, Vec::new(), cancel).await;
        };
        let property_name = self.property_name()?;

        let validators = self.root_validators(ctx, cancel).await;
        let display_name = self.core.resolve_display_name(ctx);
        let cascade = self.core.effective_cascade(ctx);
        let mut failures = Vec::new();

        if !validators.is_empty() {
            for (index, element) in collection.iter().enumerate() {
                if !self.is_included(element) {
                    continue;
                }
                let (element_ctx, element_path) =
                    self.element_context(ctx, property_name, &collection, element, index);
                let invocation = Invocation {
                    ctx: &element_ctx,
                    property_path: &element_path,
                    display_name: &display_name,
                    value: ValueSource::Element(element),
                    message_builder: self.core.message_builder(),
                    cascade,
                    check_conditions: false,
                };
                failures.extend(execute_async(&validators, invocation, cancel).await?);
            }
        }

        trace_debug!(
            property = %path,
            elements = collection.len(),
            failures = failures.len(),
            "collection rule executed"
        );
        self.core.finish_async(ctx, failures, cancel).await
    }
}
