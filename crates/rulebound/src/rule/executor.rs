//! The validator loop shared by every rule kind.

use crate::context::{PropertyValidatorContext, ValidationContext, ValueSource};
use crate::error::{Result, ValidationError, ValidationFailure};
use crate::options::CascadeMode;
use crate::rule::MessageBuilder;
use crate::validator::{Property, PropertyValidator};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run a future to completion on the current thread.
///
/// This is how a synchronous run executes validators and conditions that
/// only have an async form. It blocks the calling thread, so it must not be
/// called from inside an executor whose progress the future depends on (a
/// current-thread runtime, for instance): that deadlocks.
pub fn block_on_async<F: Future>(future: F) -> F::Output {
    futures_executor::block_on(future)
}

/// One pass of a rule's validators over one value.
pub(crate) struct Invocation<'c, T, P> {
    pub ctx: &'c ValidationContext<'c, T>,
    pub property_path: &'c str,
    pub display_name: &'c str,
    pub value: ValueSource<'c, T, P>,
    pub message_builder: Option<&'c MessageBuilder>,
    pub cascade: CascadeMode,
    /// `false` when conditions were already evaluated, as collection rules do
    pub check_conditions: bool,
}

impl<T, P> Clone for Invocation<'_, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for Invocation<'_, T, P> {}

impl<'c, T, P> Invocation<'c, T, P> {
    fn property_context(&self) -> PropertyValidatorContext<'c, T, P> {
        PropertyValidatorContext::new(
            self.ctx,
            self.property_path,
            self.display_name,
            self.value,
            self.message_builder,
        )
    }
}

/// Synchronous validator loop.
///
/// Validators that ask for the async path are driven with
/// [`block_on_async`].
pub(crate) fn execute<T, P>(
    validators: &[&dyn PropertyValidator<T, P>],
    invocation: Invocation<'_, T, P>,
) -> Result<Vec<ValidationFailure>>
where
    T: Send + Sync + 'static,
    P: Property,
{
    let ctx = invocation.ctx;
    let mut failures = Vec::new();

    for validator in validators {
        if invocation.check_conditions && !validator.options().invoke_condition(ctx) {
            trace_trace!(
                property = invocation.property_path,
                validator = validator.name(),
                "validator condition not met"
            );
            continue;
        }

        let mut property_ctx = invocation.property_context();
        let step = if validator.should_validate_asynchronously(ctx) {
            block_on_async(async {
                let cancel = CancellationToken::new();
                if invocation.check_conditions
                    && !validator.options().invoke_async_condition(ctx, &cancel).await
                {
                    return Ok(Vec::new());
                }
                validator.validate_async(&mut property_ctx, &cancel).await
            })?
        } else {
            validator.validate(&mut property_ctx)?
        };

        let failed = !step.is_empty();
        failures.extend(step);
        if failed && invocation.cascade == CascadeMode::Stop {
            trace_trace!(
                property = invocation.property_path,
                validator = validator.name(),
                "cascade stopped"
            );
            break;
        }
    }

    Ok(failures)
}

/// Asynchronous validator loop.
///
/// Cancellation is checked before each validator; a validator already
/// running is not interrupted.
pub(crate) async fn execute_async<T, P>(
    validators: &[&dyn PropertyValidator<T, P>],
    invocation: Invocation<'_, T, P>,
    cancel: &CancellationToken,
) -> Result<Vec<ValidationFailure>>
where
    T: Send + Sync + 'static,
    P: Property,
{
    let ctx = invocation.ctx;
    let mut failures = Vec::new();

    for validator in validators {
        if cancel.is_cancelled() {
            return Err(ValidationError::Cancelled);
        }
        if invocation.check_conditions {
            if !validator.options().invoke_condition(ctx) {
                continue;
            }
            if !validator.options().invoke_async_condition(ctx, cancel).await {
                continue;
            }
        }

        let mut property_ctx = invocation.property_context();
        let step = validator.validate_async(&mut property_ctx, cancel).await?;

        let failed = !step.is_empty();
        failures.extend(step);
        if failed && invocation.cascade == CascadeMode::Stop {
            break;
        }
    }

    Ok(failures)
}
