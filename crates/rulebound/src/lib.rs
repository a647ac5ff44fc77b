//! # Rulebound
//!
//! Fluent rule composition and execution for validating in-memory models.
//!
//! Rules are attached to a model type once, through a [`ModelValidator`],
//! and then run against any number of instances, synchronously or
//! asynchronously.
//!
//! ## Example
//!
//! ```rust
//! use rulebound::prelude::*;
//!
//! struct Order {
//!     total: i64,
//! }
//!
//! struct Customer {
//!     name: String,
//!     email: String,
//!     orders: Vec<Order>,
//! }
//!
//! let mut validator = ModelValidator::<Customer>::new();
//! validator.rule_for("Name", |c: &Customer| c.name.clone()).not_empty();
//! validator
//!     .rule_for("Email", |c: &Customer| c.email.clone())
//!     .email()
//!     .with_error_code("bad_email");
//! validator
//!     .rule_for_each("Orders", |c: &Customer| c.orders.iter().map(|o| o.total).collect::<Vec<_>>())
//!     .must(|total| *total >= 0)
//!     .with_message("Order {CollectionIndex} has a negative total.");
//!
//! let customer = Customer {
//!     name: "Ada".into(),
//!     email: "ada@example.com".into(),
//!     orders: vec![Order { total: 10 }, Order { total: -5 }],
//! };
//! let result = validator.validate(&customer).unwrap();
//! assert_eq!(result.errors.len(), 1);
//! assert_eq!(result.errors[0].property_name, "Orders[1]");
//! assert_eq!(result.errors[0].error_message, "Order 1 has a negative total.");
//! ```
//!
//! ## Execution
//!
//! Rules run in declaration order. For each rule the run's selector decides
//! whether it takes part, then its shared conditions, then its validators in
//! order under the rule's [`CascadeMode`]. A rule whose validators fail
//! fires its failure callback; a rule whose validators pass runs its
//! dependent rules.
//!
//! Validators that only have an async form still work in a synchronous run:
//! the run blocks on them through [`block_on_async`].
//!
//! ## Errors
//!
//! Failed checks are [`ValidationFailure`]s in the [`ValidationResult`].
//! Misconfigured rules, errors raised by validator code and cancellation
//! abort the run with a [`ValidationError`] instead.
//!
//! ## Error Format
//!
//! [`ValidationResult::to_api_error`] produces:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "Validation failed",
//!     "fields": [
//!       {"field": "Email", "code": "EmailValidator", "message": "'Email' is not a valid email address.", "severity": "error"}
//!     ]
//!   }
//! }
//! ```

#[macro_use]
mod tracing_macros;

pub mod builder;
pub mod condition;
pub mod context;
pub mod error;
pub mod formatter;
pub mod languages;
pub mod model;
pub mod options;
pub mod result;
pub mod rule;
pub mod selector;
pub mod validator;
pub mod validators;

#[cfg(test)]
mod tests;

pub use builder::{CollectionRuleBuilder, RuleBuilder};
pub use condition::{async_condition, condition, ApplyConditionTo, AsyncCondition, Condition};
pub use context::{ExecutionState, LazyValue, PropertyChain, PropertyValidatorContext, ValidationContext};
pub use error::{
    ApiValidationError, Result, Severity, ValidationError, ValidationErrors, ValidationFailure,
};
pub use formatter::MessageFormatter;
pub use languages::LanguageManager;
pub use model::{ModelValidator, Validator};
pub use options::{CascadeMode, EngineOptions, ValidationOptions};
pub use result::ValidationResult;
pub use rule::{
    block_on_async, CollectionPropertyRule, IncludeRule, MessageBuilderContext, PropertyRule,
    RuleDescriptor, RuleKind, ValidationRule,
};
pub use selector::{
    DefaultSelector, MemberNameSelector, RuleSetSelector, SelectorScope, ValidatorSelector,
};
pub use validator::{build_failure, create_failure, MessageSource, Property, PropertyValidator, ValidatorOptions};

// Re-export async_trait for custom validator implementations
pub use async_trait::async_trait;
// Re-export the cancellation token used by async runs
pub use tokio_util::sync::CancellationToken;

/// Prelude module for validation
pub mod prelude {
    pub use crate::builder::{CollectionRuleBuilder, RuleBuilder};
    pub use crate::condition::ApplyConditionTo;
    pub use crate::error::{Severity, ValidationError, ValidationFailure};
    pub use crate::model::{ModelValidator, Validator};
    pub use crate::options::{CascadeMode, EngineOptions, ValidationOptions};
    pub use crate::result::ValidationResult;
    pub use crate::validator::PropertyValidator;
    pub use crate::validators::Comparison;
    pub use futures_util::future::BoxFuture;
    pub use tokio_util::sync::CancellationToken;
}
