//! Nested validation.

use crate::context::{PropertyChain, PropertyValidatorContext};
use crate::error::{Result, ValidationFailure};
use crate::model::Validator;
use crate::validator::{Property, PropertyValidator, ValidatorOptions};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Property values a nested validator of `U` can run against.
///
/// Implemented for `U` itself and for `Option<U>`, where `None` is skipped.
pub trait ChildTarget<U> {
    fn target(&self) -> Option<&U>;
}

impl<U> ChildTarget<U> for U {
    fn target(&self) -> Option<&U> {
        Some(self)
    }
}

impl<U> ChildTarget<U> for Option<U> {
    fn target(&self) -> Option<&U> {
        self.as_ref()
    }
}

/// Runs a [`Validator<U>`] against the property value.
///
/// The nested run starts its property chain at the property's path and
/// shares the parent's execution state, so failures come back fully
/// qualified (e.g. `Orders[1].Total`).
pub struct ChildValidatorAdaptor<T, P, U>
where
    U: Send + Sync + 'static,
{
    validator: Arc<dyn Validator<U>>,
    options: ValidatorOptions<T, P>,
    _target: PhantomData<fn() -> U>,
}

impl<T, P, U> ChildValidatorAdaptor<T, P, U>
where
    U: Send + Sync + 'static,
{
    pub fn new(validator: Arc<dyn Validator<U>>) -> Self {
        Self {
            validator,
            options: ValidatorOptions::default(),
            _target: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P, U> PropertyValidator<T, P> for ChildValidatorAdaptor<T, P, U>
where
    T: Send + Sync + 'static,
    P: Property + ChildTarget<U>,
    U: Send + Sync + 'static,
{
    validator_options!("ChildValidatorAdaptor");

    // Failures come from the nested validator; see `validate`.
    fn is_valid(&self, _ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(true)
    }

    fn validate(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>> {
        let Some(child) = <P as ChildTarget<U>>::target(ctx.value()) else {
            return Ok(Vec::new());
        };
        let chain = PropertyChain::from_path(ctx.property_path());
        let child_ctx = ctx.parent().clone_for_child_validator(child, chain);
        self.validator.validate_context(&child_ctx)
    }

    async fn validate_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        let Some(child) = <P as ChildTarget<U>>::target(ctx.value()) else {
            return Ok(Vec::new());
        };
        let chain = PropertyChain::from_path(ctx.property_path());
        let child_ctx = ctx.parent().clone_for_child_validator(child, chain);
        self.validator.validate_context_async(&child_ctx, cancel).await
    }
}
