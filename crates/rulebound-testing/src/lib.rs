//! Testing utilities for Rulebound
//!
//! # Assertions
//!
//! [`TestValidate`] runs any validator and wraps the outcome in a
//! [`TestValidationResult`] with fluent assertions:
//!
//! ```rust
//! use rulebound::ModelValidator;
//! use rulebound_testing::TestValidate;
//!
//! struct User {
//!     email: String,
//! }
//!
//! let mut validator = ModelValidator::<User>::new();
//! validator
//!     .rule_for("Email", |u: &User| u.email.clone())
//!     .email()
//!     .with_error_code("bad_email");
//!
//! validator
//!     .test_validate(&User { email: "nope".into() })
//!     .should_have_error_for("Email")
//!     .with_error_code("bad_email");
//! ```
//!
//! # Spies
//!
//! [`SpyValidator`] counts how often it runs, for checking cascade,
//! condition and filter behaviour.

pub mod assertions;
pub mod matcher;
pub mod spy;

pub use assertions::{FailureAssertion, TestValidate, TestValidationResult};
pub use matcher::FailureMatcher;
pub use spy::{SpyHandle, SpyValidator, Times};
