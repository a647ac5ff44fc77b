//! The property validator contract.
//!
//! A [`PropertyValidator`] is one reusable check. It is created once at
//! definition time and shared by every run; everything configurable about
//! it (conditions, message, code, state, severity) lives in its
//! [`ValidatorOptions`].

use crate::condition::{and_async_condition, and_condition, AsyncCondition, Condition};
use crate::context::{PropertyValidatorContext, ValidationContext};
use crate::error::{Result, Severity, ValidationFailure};
use crate::rule::MessageBuilderContext;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Message used when neither the validator nor the language manager has one.
pub const FALLBACK_MESSAGE: &str = "'{PropertyName}' is not valid.";

/// Bounds every validated property type satisfies.
///
/// Property values are recorded on failures as JSON, hence `Serialize`.
pub trait Property: Serialize + Send + Sync + 'static {}

impl<P> Property for P where P: Serialize + Send + Sync + 'static {}

/// Literal message template or a factory over the instance.
#[derive(Clone)]
pub enum MessageSource<T> {
    Literal(String),
    Factory(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T> MessageSource<T> {
    fn template(&self, instance: &T) -> String {
        match self {
            MessageSource::Literal(text) => text.clone(),
            MessageSource::Factory(factory) => factory(instance),
        }
    }
}

impl<T> std::fmt::Debug for MessageSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageSource::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            MessageSource::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Produces custom state for a failure.
pub type StateProvider<T, P> = Arc<dyn Fn(&T, &P) -> Value + Send + Sync>;

/// Produces the severity of a failure.
pub type SeverityProvider<T, P> = Arc<dyn Fn(&T, &P) -> Severity + Send + Sync>;

/// Per-validator configuration.
pub struct ValidatorOptions<T, P> {
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
    error_message: Option<MessageSource<T>>,
    error_code: Option<String>,
    custom_state: Option<StateProvider<T, P>>,
    severity: Option<SeverityProvider<T, P>>,
}

impl<T, P> Default for ValidatorOptions<T, P> {
    fn default() -> Self {
        Self {
            condition: None,
            async_condition: None,
            error_message: None,
            error_code: None,
            custom_state: None,
            severity: None,
        }
    }
}

impl<T, P> ValidatorOptions<T, P>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// AND `condition` with any existing condition.
    pub fn apply_condition(&mut self, condition: Condition<T>) {
        self.condition = Some(and_condition(condition, self.condition.take()));
    }

    /// AND `condition` with any existing async condition.
    pub fn apply_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.async_condition = Some(and_async_condition(condition, self.async_condition.take()));
    }

    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    pub fn has_async_condition(&self) -> bool {
        self.async_condition.is_some()
    }

    /// Evaluate the condition; `true` when none is set.
    pub fn invoke_condition(&self, ctx: &ValidationContext<'_, T>) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(ctx))
    }

    /// Evaluate the async condition; `true` when none is set.
    pub async fn invoke_async_condition(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancel: &CancellationToken,
    ) -> bool {
        match &self.async_condition {
            Some(condition) => condition(ctx, cancel).await,
            None => true,
        }
    }

    pub fn set_error_message(&mut self, message: MessageSource<T>) {
        self.error_message = Some(message);
    }

    pub fn error_message(&self) -> Option<&MessageSource<T>> {
        self.error_message.as_ref()
    }

    pub fn set_error_code(&mut self, code: impl Into<String>) {
        self.error_code = Some(code.into());
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn set_custom_state_provider(&mut self, provider: StateProvider<T, P>) {
        self.custom_state = Some(provider);
    }

    pub fn set_severity_provider(&mut self, provider: SeverityProvider<T, P>) {
        self.severity = Some(provider);
    }
}

impl<T, P> std::fmt::Debug for ValidatorOptions<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("has_condition", &self.condition.is_some())
            .field("has_async_condition", &self.async_condition.is_some())
            .field("error_message", &self.error_message)
            .field("error_code", &self.error_code)
            .finish()
    }
}

/// One reusable check against a property value.
///
/// Implementors provide [`is_valid`](Self::is_valid); the rest have default
/// implementations. Override [`validate`](Self::validate) to report zero or
/// several failures from one check, and [`is_valid_async`](Self::is_valid_async)
/// for checks that need to await.
///
/// Returning `Err` aborts the whole run. A failed check is `Ok(false)`.
#[async_trait]
pub trait PropertyValidator<T, P>: Send + Sync
where
    T: Send + Sync + 'static,
    P: Property,
{
    /// Validator name, used as the message template key and default error code.
    fn name(&self) -> &str;

    fn options(&self) -> &ValidatorOptions<T, P>;

    fn options_mut(&mut self) -> &mut ValidatorOptions<T, P>;

    /// Synchronous check.
    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool>;

    /// Asynchronous check. Defaults to the synchronous one.
    async fn is_valid_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        _cancel: &CancellationToken,
    ) -> Result<bool> {
        self.is_valid(ctx)
    }

    /// Run the check and build failures.
    fn validate(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>> {
        if self.is_valid(ctx)? {
            Ok(Vec::new())
        } else {
            Ok(vec![create_failure(self.name(), self.options(), ctx)])
        }
    }

    /// Async counterpart of [`validate`](Self::validate).
    async fn validate_async(
        &self,
        ctx: &mut PropertyValidatorContext<'_, T, P>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>> {
        if self.is_valid_async(ctx, cancel).await? {
            Ok(Vec::new())
        } else {
            Ok(vec![create_failure(self.name(), self.options(), ctx)])
        }
    }

    /// Whether this validator takes the async path in the current run.
    ///
    /// `true` for async runs and for validators gated by an async condition.
    /// A synchronous run blocks on such validators.
    fn should_validate_asynchronously(&self, ctx: &ValidationContext<'_, T>) -> bool {
        ctx.is_async() || self.options().has_async_condition()
    }
}

/// Build the failure for a failed check.
///
/// The message is the validator's configured message, else the language
/// manager's template for `name`, else [`FALLBACK_MESSAGE`], formatted with
/// the context's placeholders. A rule message builder replaces the result.
pub fn create_failure<T, P>(
    name: &str,
    options: &ValidatorOptions<T, P>,
    ctx: &mut PropertyValidatorContext<'_, T, P>,
) -> ValidationFailure
where
    T: Send + Sync + 'static,
    P: Property,
{
    let template = match options.error_message() {
        Some(source) => source.template(ctx.instance()),
        None => ctx
            .state()
            .options()
            .language_manager()
            .get_string(name, None)
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
    };
    let path = ctx.property_path().to_string();
    build_failure(name, options, ctx, path, &template)
}

/// Build a failure on `path` from an explicit message template.
///
/// Placeholders, the rule message builder, the error code, custom state and
/// severity are applied exactly as for [`create_failure`].
pub fn build_failure<T, P>(
    name: &str,
    options: &ValidatorOptions<T, P>,
    ctx: &mut PropertyValidatorContext<'_, T, P>,
    path: String,
    template: &str,
) -> ValidationFailure
where
    T: Send + Sync + 'static,
    P: Property,
{
    let instance = ctx.instance();
    let value = ctx.value();
    let display_name = ctx.display_name();
    let engine = ctx.state().options();

    ctx.formatter_mut()
        .append_property_name(display_name)
        .append_property_value(value);

    let mut message = ctx.formatter().build_message(template);
    if let Some(builder) = ctx.message_builder() {
        message = builder(&MessageBuilderContext {
            property_path: &path,
            display_name,
            validator_name: name,
            formatter: ctx.formatter(),
            default_message: &message,
        });
    }

    let error_code = options
        .error_code()
        .map(str::to_string)
        .unwrap_or_else(|| engine.resolve_error_code(name));

    let mut failure = ValidationFailure::new(path, message)
        .with_attempted_value(value)
        .with_error_code(error_code);
    if let Some(provider) = &options.custom_state {
        failure = failure.with_custom_state(provider(instance, value));
    }
    if let Some(provider) = &options.severity {
        failure = failure.with_severity(provider(instance, value));
    }
    failure.placeholder_values = ctx.formatter().placeholder_values().clone();
    failure
}
