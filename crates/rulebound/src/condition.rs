//! Condition predicates.
//!
//! Conditions gate validators and rules. Composing a new condition with an
//! existing one ANDs them, evaluating the new one first.

use crate::context::ValidationContext;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Synchronous predicate over the validation context.
pub type Condition<T> = Arc<dyn Fn(&ValidationContext<'_, T>) -> bool + Send + Sync>;

/// Asynchronous predicate over the validation context.
pub type AsyncCondition<T> = Arc<
    dyn for<'a> Fn(&'a ValidationContext<'a, T>, &'a CancellationToken) -> BoxFuture<'a, bool>
        + Send
        + Sync,
>;

/// Which validators [`apply_condition`](crate::ValidationRule::apply_condition) affects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyConditionTo {
    /// Every validator currently in the rule, and its dependent rules.
    #[default]
    AllValidators,
    /// Only the most recently added validator.
    CurrentValidator,
}

/// Box a synchronous condition.
pub fn condition<T, F>(predicate: F) -> Condition<T>
where
    F: Fn(&ValidationContext<'_, T>) -> bool + Send + Sync + 'static,
{
    Arc::new(predicate)
}

/// Box an asynchronous condition.
///
/// ```rust,ignore
/// let cond = async_condition(|ctx: &ValidationContext<'_, User>, _cancel| {
///     Box::pin(async move { ctx.instance().active })
/// });
/// ```
pub fn async_condition<T, F>(predicate: F) -> AsyncCondition<T>
where
    F: for<'a> Fn(&'a ValidationContext<'a, T>, &'a CancellationToken) -> BoxFuture<'a, bool>
        + Send
        + Sync
        + 'static,
{
    Arc::new(predicate)
}

/// `new && existing`, with `new` evaluated first.
pub(crate) fn and_condition<T: 'static>(
    new: Condition<T>,
    existing: Option<Condition<T>>,
) -> Condition<T> {
    match existing {
        None => new,
        Some(existing) => condition(move |ctx: &ValidationContext<'_, T>| new(ctx) && existing(ctx)),
    }
}

/// Async counterpart of [`and_condition`].
pub(crate) fn and_async_condition<T: Send + Sync + 'static>(
    new: AsyncCondition<T>,
    existing: Option<AsyncCondition<T>>,
) -> AsyncCondition<T> {
    match existing {
        None => new,
        Some(existing) => async_condition(move |ctx, cancel| {
            let first = new(ctx, cancel);
            let existing = Arc::clone(&existing);
            Box::pin(async move { first.await && existing(ctx, cancel).await })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn and_evaluates_new_first_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let existing = condition(move |_: &ValidationContext<'_, i32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let new = condition(|ctx: &ValidationContext<'_, i32>| *ctx.instance() > 0);
        let combined = and_condition(new, Some(existing));

        let negative = -1;
        assert!(!combined(&ValidationContext::new(&negative)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let positive = 1;
        assert!(combined(&ValidationContext::new(&positive)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn async_and() {
        let even = async_condition(|ctx: &ValidationContext<'_, i32>, _| {
            Box::pin(async move { *ctx.instance() % 2 == 0 })
        });
        let positive = async_condition(|ctx: &ValidationContext<'_, i32>, _| {
            Box::pin(async move { *ctx.instance() > 0 })
        });
        let combined = and_async_condition(even, Some(positive));
        let cancel = CancellationToken::new();

        let four = 4;
        let minus_two = -2;
        let three = 3;
        assert!(futures_executor::block_on(combined(&ValidationContext::new(&four), &cancel)));
        assert!(!futures_executor::block_on(combined(&ValidationContext::new(&minus_two), &cancel)));
        assert!(!futures_executor::block_on(combined(&ValidationContext::new(&three), &cancel)));
    }
}
