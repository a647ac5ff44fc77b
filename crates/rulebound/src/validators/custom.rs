//! Predicate and callback validators.

use crate::context::{ExecutionState, PropertyValidatorContext, ValidationContext};
use crate::error::{Result, ValidationFailure};
use crate::formatter::MessageFormatter;
use crate::rule::block_on_async;
use crate::validator::{build_failure, Property, PropertyValidator, ValidatorOptions};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Synchronous predicate over the instance and the property value.
pub type Predicate<T, P> = Arc<dyn Fn(&T, &P) -> bool + Send + Sync>;

/// Asynchronous predicate over the instance and the property value.
pub type AsyncPredicate<T, P> = Arc<
    dyn for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, bool> + Send + Sync,
>;

/// Callback that reports failures through a [`CustomContext`].
pub type CustomAction<T, P> =
    Arc<dyn Fn(&P, &mut CustomContext<'_, '_, T, P>) -> Result<()> + Send + Sync>;

/// Asynchronous callback returning failure messages.
pub type AsyncCustomAction<T, P> = Arc<
    dyn for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, Result<Vec<String>>>
        + Send
        + Sync,
>;

/// Fails when the predicate returns `false`.
pub struct PredicateValidator<T, P> {
    predicate: Predicate<T, P>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> PredicateValidator<T, P> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T, &P) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            options: ValidatorOptions::default(),
        }
    }
}

impl<T, P> PropertyValidator<T, P> for PredicateValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    validator_options!("PredicateValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok((self.predicate)(ctx.instance(), ctx.value()))
    }
}

/// Fails when the async predicate resolves to `false`.
///
/// Always takes the async path; synchronous runs block on it.
pub struct AsyncPredicateValidator<T, P> {
    predicate: AsyncPredicate<T, P>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> AsyncPredicateValidator<T, P> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, bool>
            + Send
            + Sync
            + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            options: ValidatorOptions::default(),
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for AsyncPredicateValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    validator_options!("AsyncPredicateValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        let cancel = CancellationToken::new();
        Ok(block_on_async((self.predicate)(ctx.instance(), ctx.value(), &cancel)))
    }

    async fn is_valid_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        Ok((self.predicate)(ctx.instance(), ctx.value(), cancel).await)
    }

    fn should_validate_asynchronously(&self, _ctx: &ValidationContext<'_, T>) -> bool {
        true
    }
}

/// Handle passed to custom validator callbacks.
pub struct CustomContext<'p, 'c, T, P> {
    name: &'p str,
    inner: &'p mut PropertyValidatorContext<'c, T, P>,
    options: &'p ValidatorOptions<T, P>,
    failures: Vec<ValidationFailure>,
}

impl<'p, 'c, T, P> CustomContext<'p, 'c, T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    pub fn instance(&self) -> &'c T {
        self.inner.instance()
    }

    pub fn state(&self) -> &'c ExecutionState {
        self.inner.state()
    }

    pub fn property_path(&self) -> &'c str {
        self.inner.property_path()
    }

    pub fn display_name(&self) -> &'c str {
        self.inner.display_name()
    }

    /// Placeholders available to messages added afterwards.
    pub fn formatter_mut(&mut self) -> &mut MessageFormatter {
        self.inner.formatter_mut()
    }

    /// Report a failure on the current property.
    pub fn add_failure(&mut self, message: impl AsRef<str>) {
        let path = self.inner.property_path().to_string();
        self.push(path, message.as_ref());
    }

    /// Report a failure on `property_name`, relative to the parent chain.
    pub fn add_failure_for(&mut self, property_name: &str, message: impl AsRef<str>) {
        let path = self.inner.parent().property_path(property_name);
        self.push(path, message.as_ref());
    }

    /// Report a prebuilt failure as-is.
    pub fn add(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    fn push(&mut self, path: String, template: &str) {
        let failure = build_failure(self.name, self.options, self.inner, path, template);
        self.failures.push(failure);
    }
}

/// Runs a callback that may report any number of failures.
pub struct CustomValidator<T, P> {
    action: CustomAction<T, P>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> CustomValidator<T, P> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&P, &mut CustomContext<'_, '_, T, P>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            options: ValidatorOptions::default(),
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for CustomValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    validator_options!("CustomValidator");

    // Failures are reported through the callback; see `validate`.
    fn is_valid(&self, _ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(true)
    }

    fn validate(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>> {
        let value = ctx.value();
        let mut custom = CustomContext {
            name: self.name(),
            inner: ctx,
            options: &self.options,
            failures: Vec::new(),
        };
        (self.action)(value, &mut custom)?;
        Ok(custom.failures)
    }

    async fn validate_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        self.validate(ctx)
    }
}

/// Async callback returning failure messages for the current property.
///
/// Always takes the async path; synchronous runs block on it.
pub struct AsyncCustomValidator<T, P> {
    action: AsyncCustomAction<T, P>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> AsyncCustomValidator<T, P> {
    pub fn new<F>(action: F) -> Self
    where
        F: for<'a> Fn(&'a T, &'a P, &'a CancellationToken) -> BoxFuture<'a, Result<Vec<String>>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            action: Arc::new(action),
            options: ValidatorOptions::default(),
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for AsyncCustomValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property,
{
    validator_options!("AsyncCustomValidator");

    fn is_valid(&self, _ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(true)
    }

    fn validate(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>> {
        let cancel = CancellationToken::new();
        block_on_async(self.validate_async(ctx, &cancel))
    }

    async fn validate_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        let messages = (self.action)(ctx.instance(), ctx.value(), cancel).await?;
        let failures = messages
            .into_iter()
            .map(|message| {
                let path = ctx.property_path().to_string();
                build_failure(self.name(), &self.options, ctx, path, &message)
            })
            .collect();
        Ok(failures)
    }

    fn should_validate_asynchronously(&self, _ctx: &ValidationContext<'_, T>) -> bool {
        true
    }
}
