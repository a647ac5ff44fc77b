//! Integration tests for synchronous rule execution.

use rulebound::prelude::*;
use rulebound::rule::AsRuleCore;
use rulebound_testing::{SpyValidator, Times};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
struct Order {
    total: i64,
}

#[derive(Debug, Clone, Serialize)]
struct Address {
    street: String,
}

#[derive(Debug, Clone, Default)]
struct Customer {
    name: String,
    first_name: String,
    email: String,
    age: i32,
    orders: Vec<Order>,
    tags: Option<Vec<String>>,
    address: Option<Address>,
}

fn customer() -> Customer {
    Customer {
        name: "Grace Hopper".into(),
        first_name: "Grace".into(),
        email: "grace@example.com".into(),
        age: 40,
        orders: vec![Order { total: 5 }, Order { total: 12 }],
        tags: Some(vec!["navy".into()]),
        address: Some(Address {
            street: "1 Main St".into(),
        }),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rulebound=trace")
        .with_test_writer()
        .try_init();
}

fn paths(result: &ValidationResult) -> Vec<&str> {
    result
        .errors
        .iter()
        .map(|failure| failure.property_name.as_str())
        .collect()
}

#[test]
fn continue_reports_every_failure() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .cascade(CascadeMode::Continue)
        .must(|_| false)
        .custom(|_, ctx| {
            ctx.add_failure("first");
            ctx.add_failure("second");
            Ok(())
        })
        .must(|_| false);

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(result.errors.len(), 4);
    assert!(paths(&result).iter().all(|path| *path == "Name"));
}

#[test]
fn stop_skips_remaining_validators() {
    let (first, first_calls) = SpyValidator::failing();
    let (second, second_calls) = SpyValidator::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .cascade(CascadeMode::Stop)
        .set_validator(first)
        .set_validator(second);

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(result.errors.len(), 1);
    first_calls.verify(Times::Once);
    second_calls.verify(Times::Never);
}

#[test]
fn skipped_validator_does_not_stop_cascade() {
    let (second, second_calls) = SpyValidator::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .cascade(CascadeMode::Stop)
        .must(|_| false)
        .when_scoped(|_| false, ApplyConditionTo::CurrentValidator)
        .set_validator(second);

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].error_code.as_deref(), Some("SpyValidator"));
    second_calls.verify(Times::Once);
}

#[test]
fn model_cascade_mode_applies_to_later_rules() {
    let mut validator = ModelValidator::<Customer>::new().with_cascade_mode(CascadeMode::Stop);
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false)
        .must(|_| false);

    assert_eq!(validator.validate(&customer()).unwrap().errors.len(), 1);
}

#[test]
fn engine_options_set_default_cascade() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false)
        .must(|_| false);

    let options = ValidationOptions::new()
        .engine(EngineOptions::new().with_cascade_mode(CascadeMode::Stop));
    assert_eq!(validator.validate_with(&customer(), options).unwrap().errors.len(), 1);
    assert_eq!(validator.validate(&customer()).unwrap().errors.len(), 2);
}

#[test]
fn not_empty_then_minimum_length_under_stop() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .cascade(CascadeMode::Stop)
        .not_empty()
        .minimum_length(5);

    let instance = Customer {
        name: String::new(),
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].property_name, "Name");
    assert_eq!(result.errors[0].error_code.as_deref(), Some("NotEmptyValidator"));
    assert_eq!(result.errors[0].error_message, "'Name' must not be empty.");
}

#[test]
fn null_collection_contributes_nothing() {
    let (spy, calls) = SpyValidator::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each_optional("Tags", |c: &Customer| c.tags.clone())
        .set_validator(spy);

    let instance = Customer {
        tags: None,
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    assert!(result.is_valid());
    calls.verify(Times::Never);
}

#[test]
fn filtered_elements_keep_raw_indices() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each_optional("Tags", |c: &Customer| c.tags.clone())
        .filter(|tag| tag != "A")
        .must(|_| false);

    let instance = Customer {
        tags: Some(vec!["A".into(), "B".into(), "C".into()]),
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    assert_eq!(paths(&result), vec!["Tags[1]", "Tags[2]"]);
}

#[test]
fn index_builder_replaces_indexer() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each_optional("Tags", |c: &Customer| c.tags.clone())
        .index_builder(|_, _, tag, _| format!("<{tag}>"))
        .must(|tag| tag.len() > 3);

    let instance = Customer {
        tags: Some(vec!["ok".into(), "fine".into()]),
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    assert_eq!(paths(&result), vec!["Tags<ok>"]);
}

#[test]
fn collection_stop_is_per_element() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each("Orders", |c: &Customer| {
            c.orders.iter().map(|order| order.total).collect::<Vec<_>>()
        })
        .cascade(CascadeMode::Stop)
        .greater_than(100)
        .less_than(0);

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(paths(&result), vec!["Orders[0]", "Orders[1]"]);
    assert!(result
        .errors
        .iter()
        .all(|failure| failure.error_code.as_deref() == Some("GreaterThanValidator")));
}

#[test]
fn collection_messages_see_collection_index() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each("Orders", |c: &Customer| {
            c.orders.iter().map(|order| order.total).collect::<Vec<_>>()
        })
        .less_than(10)
        .with_message("Order #{CollectionIndex} is too large.");

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].error_message, "Order #1 is too large.");
}

#[test]
fn nested_rules_qualify_element_paths() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_each("Orders", |c: &Customer| c.orders.clone())
        .child_rules(|order| {
            order
                .rule_for("Total", |o: &Order| o.total)
                .greater_than_or_equal(0)
                .with_message("Total must be non-negative");
        });

    let instance = Customer {
        orders: vec![Order { total: 3 }, Order { total: -1 }, Order { total: 8 }],
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].property_name, "Orders[1].Total");
    assert_eq!(result.errors[0].error_message, "Total must be non-negative");
}

#[test]
fn child_validator_skips_none() {
    let mut address = ModelValidator::<Address>::new();
    address
        .rule_for("Street", |a: &Address| a.street.clone())
        .not_empty();
    let address = Arc::new(address);

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Address", |c: &Customer| c.address.clone())
        .child_validator::<Address, _>(Arc::clone(&address));

    let missing = Customer {
        address: None,
        ..customer()
    };
    assert!(validator.validate(&missing).unwrap().is_valid());

    let blank = Customer {
        address: Some(Address {
            street: String::new(),
        }),
        ..customer()
    };
    let result = validator.validate(&blank).unwrap();
    assert_eq!(paths(&result), vec!["Address.Street"]);
}

#[test]
fn false_rule_condition_skips_rule_and_dependents() {
    let (spy, calls) = SpyValidator::failing();
    let (dependent, dependent_calls) = SpyValidator::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator.when(
        |c| c.age > 100,
        |v| {
            v.rule_for("Name", |c: &Customer| c.name.clone())
                .set_validator(spy)
                .dependent_rules(|d| {
                    d.rule_for("Email", |c: &Customer| c.email.clone())
                        .set_validator(dependent);
                });
        },
    );

    let result = validator.validate(&customer()).unwrap();
    assert!(result.is_valid());
    calls.verify(Times::Never);
    dependent_calls.verify(Times::Never);
}

#[test]
fn builder_condition_covers_dependents() {
    let (spy, calls) = SpyValidator::passing();
    let (dependent, dependent_calls) = SpyValidator::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .set_validator(spy)
        .dependent_rules(|d| {
            d.rule_for("Email", |c: &Customer| c.email.clone())
                .set_validator(dependent);
        })
        .unless(|c| c.age > 0);

    assert!(validator.validate(&customer()).unwrap().is_valid());
    calls.verify(Times::Never);
    dependent_calls.verify(Times::Never);
}

#[test]
fn dependent_rules_run_only_after_success() {
    init_tracing();
    let build = |name_valid: bool| {
        let mut validator = ModelValidator::<Customer>::new();
        validator
            .rule_for("Name", |c: &Customer| c.name.clone())
            .must(move |_| name_valid)
            .dependent_rules(|d| {
                d.rule_for("Email", |c: &Customer| c.email.clone())
                    .must(|_| false)
                    .with_message("dependent failure");
            });
        validator
    };

    let passed = build(true).validate(&customer()).unwrap();
    assert_eq!(paths(&passed), vec!["Email"]);
    assert_eq!(passed.errors[0].error_message, "dependent failure");

    let failed = build(false).validate(&customer()).unwrap();
    assert_eq!(paths(&failed), vec!["Name"]);
}

#[test]
fn on_failure_receives_rule_failures() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Age", |c: &Customer| c.age)
        .greater_than(50)
        .less_than(10)
        .on_failure(move |_, failures| {
            counter.fetch_add(failures.len(), Ordering::SeqCst);
        });

    validator.validate(&customer()).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn false_validator_condition_skips_the_property_read() {
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", move |c: &Customer| {
            counter.fetch_add(1, Ordering::SeqCst);
            c.name.clone()
        })
        .must(|_| false)
        .must(|_| false)
        .when(|c| c.age > 100);

    assert!(validator.validate(&customer()).unwrap().is_valid());
    assert_eq!(reads.load(Ordering::SeqCst), 0);

    let older = Customer {
        age: 101,
        ..customer()
    };
    assert_eq!(validator.validate(&older).unwrap().errors.len(), 2);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[test]
fn replaced_validators_keep_their_position() {
    let (first, first_calls) = SpyValidator::<Customer, String>::failing();
    let (replacement, replacement_calls) = SpyValidator::<Customer, String>::failing();
    let (last, last_calls) = SpyValidator::<Customer, String>::failing();
    let (removed, removed_calls) = SpyValidator::<Customer, String>::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .configure(|rule| {
            let core = rule.core_mut();
            let first_id = core.add_validator(Box::new(first.named("First")));
            let removed_id = core.add_validator(Box::new(removed));
            core.add_validator(Box::new(last.named("Last")));

            assert!(core.remove_validator(removed_id).is_some());
            assert!(core.remove_validator(removed_id).is_none());
            let (unused, _) = SpyValidator::<Customer, String>::passing();
            assert!(!core.replace_validator(removed_id, Box::new(unused)));
            assert!(core.replace_validator(first_id, Box::new(replacement.named("Replacement"))));
            assert_eq!(core.validator_count(), 2);
        });

    let result = validator.validate(&customer()).unwrap();
    let codes: Vec<_> = result
        .errors
        .iter()
        .map(|failure| failure.error_code.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(codes, vec!["Replacement", "Last"]);
    first_calls.verify(Times::Never);
    removed_calls.verify(Times::Never);
    replacement_calls.verify(Times::Once);
    last_calls.verify(Times::Once);
}

#[test]
fn cleared_rules_run_nothing() {
    let (spy, calls) = SpyValidator::<Customer, String>::failing();

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .set_validator(spy)
        .configure(|rule| {
            let core = rule.core_mut();
            core.clear_validators();
            core.clear_validators();
            assert_eq!(core.validator_count(), 0);
        });

    assert!(validator.validate(&customer()).unwrap().is_valid());
    calls.verify(Times::Never);
}

#[test]
fn validation_is_idempotent() {
    init_tracing();
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Email", |c: &Customer| c.email.clone())
        .email();
    validator
        .rule_for("Age", |c: &Customer| c.age)
        .inclusive_between(0, 30);

    let instance = Customer {
        email: "not an email".into(),
        ..customer()
    };
    let first = validator.validate(&instance).unwrap();
    let second = validator.validate(&instance).unwrap();
    assert_eq!(first.errors.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn messages_use_placeholders_and_display_names() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("FirstName", |c: &Customer| c.first_name.clone())
        .minimum_length(10);
    validator
        .rule_for("Age", |c: &Customer| c.age)
        .inclusive_between(50, 60)
        .with_name("Customer age");
    validator
        .rule_for("Email", |c: &Customer| c.email.clone())
        .matches(r"^\d+$")
        .with_message("{PropertyName} '{PropertyValue}' must be numeric");

    let result = validator.validate(&customer()).unwrap();
    let messages: Vec<&str> = result
        .errors
        .iter()
        .map(|failure| failure.error_message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "The length of 'First Name' must be at least 10 characters. You entered 5 characters.",
            "'Customer age' must be between 50 and 60. You entered 40.",
            "Email 'grace@example.com' must be numeric",
        ]
    );
    assert_eq!(
        result.errors[1].placeholder_values.get("From"),
        Some(&serde_json::json!(50))
    );
}

#[test]
fn codes_severity_and_state() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Age", |c: &Customer| c.age)
        .less_than(18)
        .with_error_code("too_old")
        .with_severity(Severity::Warning)
        .with_state(|_, age| serde_json::json!({ "age": age }));

    let result = validator.validate(&customer()).unwrap();
    let failure = &result.errors[0];
    assert_eq!(failure.error_code.as_deref(), Some("too_old"));
    assert_eq!(failure.severity, Severity::Warning);
    assert_eq!(failure.attempted_value, Some(serde_json::json!(40)));
    assert_eq!(failure.custom_state, Some(serde_json::json!({ "age": 40 })));
}

#[test]
fn message_builder_rewrites_messages() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .maximum_length(3)
        .message_builder(|ctx| format!("[{}] {}", ctx.validator_name, ctx.default_message));

    let result = validator.validate(&customer()).unwrap();
    assert!(result.errors[0]
        .error_message
        .starts_with("[MaximumLengthValidator] The length of 'Name'"));
}

#[test]
fn rule_sets_select_rules() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false);
    validator.rule_set("Admin, Audit", |v| {
        v.rule_for("Email", |c: &Customer| c.email.clone())
            .must(|_| false);
    });

    let default = validator.validate(&customer()).unwrap();
    assert_eq!(paths(&default), vec!["Name"]);
    assert_eq!(default.rule_sets_executed, vec!["default".to_string()]);

    let admin = validator
        .validate_with(&customer(), ValidationOptions::new().include_rule_sets(["admin"]))
        .unwrap();
    assert_eq!(paths(&admin), vec!["Email"]);
    assert_eq!(admin.rule_sets_executed, vec!["admin".to_string()]);

    let both = validator
        .validate_with(
            &customer(),
            ValidationOptions::new().include_rule_sets(["default", "Audit"]),
        )
        .unwrap();
    assert_eq!(paths(&both), vec!["Name", "Email"]);

    let all = validator
        .validate_with(&customer(), ValidationOptions::new().include_all_rule_sets())
        .unwrap();
    assert_eq!(all.errors.len(), 2);
}

#[test]
fn member_selection_runs_named_properties() {
    init_tracing();
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false);
    validator
        .rule_for_each("Orders", |c: &Customer| c.orders.clone())
        .child_rules(|order| {
            order.rule_for("Total", |o: &Order| o.total).less_than(0);
        });

    let result = validator
        .validate_with(
            &customer(),
            ValidationOptions::new().include_properties(["Orders[].Total"]),
        )
        .unwrap();
    assert_eq!(paths(&result), vec!["Orders[0].Total", "Orders[1].Total"]);
}

#[test]
fn included_validators_share_the_instance() {
    let mut shared = ModelValidator::<Customer>::new();
    shared
        .rule_for("Email", |c: &Customer| c.email.clone())
        .must(|_| false);
    let shared: Arc<dyn Validator<Customer>> = Arc::new(shared);

    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false);
    validator.include(Arc::clone(&shared));
    validator.when(|c| c.age > 100, |v| {
        v.include(Arc::clone(&shared));
    });

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(paths(&result), vec!["Name", "Email"]);
}

#[test]
fn model_level_rules_have_empty_paths() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_value(|c: &Customer| c.age)
        .must(|age| *age > 60)
        .with_message("Too young");

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(paths(&result), vec![""]);
    assert_eq!(result.errors[0].error_message, "Too young");
}

#[test]
fn transformed_values_are_validated() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for_transformed("Name", |c: &Customer| c.name.clone(), |name| name.len())
        .less_than(5);

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(result.errors[0].attempted_value, Some(serde_json::json!(12)));
}

#[test]
fn custom_failures_for_sibling_properties() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .custom(|name, ctx| {
            if !ctx.instance().email.contains(&name.to_lowercase()) {
                ctx.add_failure_for("Email", "Email must contain the name");
            }
            Ok(())
        });

    let result = validator.validate(&customer()).unwrap();
    assert_eq!(paths(&result), vec!["Email"]);
}

#[test]
fn custom_failures_carry_validator_settings() {
    let build = || {
        let mut validator = ModelValidator::<Customer>::new();
        validator
            .rule_for("Name", |c: &Customer| c.name.clone())
            .custom(|_, ctx| {
                ctx.add_failure("bad name");
                ctx.add_failure_for("Email", "bad email");
                Ok(())
            })
            .with_severity(Severity::Warning)
            .with_state(|_, _| 7)
            .message_builder(|ctx| format!("{}: {}", ctx.property_path, ctx.default_message));
        validator
    };

    let result = build().validate(&customer()).unwrap();
    assert_eq!(paths(&result), vec!["Name", "Email"]);
    for failure in &result.errors {
        assert_eq!(failure.severity, Severity::Warning);
        assert_eq!(failure.custom_state, Some(serde_json::json!(7)));
        assert_eq!(failure.error_code.as_deref(), Some("CustomValidator"));
    }
    assert_eq!(result.errors[0].error_message, "Name: bad name");
    assert_eq!(result.errors[1].error_message, "Email: bad email");

    let options = ValidationOptions::new()
        .engine(EngineOptions::new().with_error_code_resolver(|name| name.to_lowercase()));
    let result = build().validate_with(&customer(), options).unwrap();
    assert_eq!(result.errors[0].error_code.as_deref(), Some("customvalidator"));
}

#[test]
fn misconfigured_rules_fail_loudly() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .with_message("no validator yet")
        .not_empty();

    let error = validator.validate(&customer()).unwrap_err();
    assert!(matches!(error, ValidationError::Configuration(_)));
}

#[test]
fn invalid_patterns_and_ranges_are_configuration_errors() {
    let mut pattern = ModelValidator::<Customer>::new();
    pattern
        .rule_for("Name", |c: &Customer| c.name.clone())
        .matches("(unclosed");
    assert!(matches!(
        pattern.validate(&customer()),
        Err(ValidationError::Configuration(_))
    ));

    let mut length = ModelValidator::<Customer>::new();
    length
        .rule_for("Name", |c: &Customer| c.name.clone())
        .length(10, 2);
    assert!(matches!(
        length.validate(&customer()),
        Err(ValidationError::Configuration(_))
    ));
}

#[test]
fn setup_errors_surface_when_validators_are_skipped() {
    let mut length = ModelValidator::<Customer>::new();
    length
        .rule_for("Name", |c: &Customer| c.name.clone())
        .length(5, 2)
        .when(|_| false);
    assert!(matches!(
        length.validate(&customer()),
        Err(ValidationError::Configuration(_))
    ));

    let mut pattern = ModelValidator::<Customer>::new();
    pattern
        .rule_for("Name", |c: &Customer| c.name.clone())
        .cascade(CascadeMode::Stop)
        .not_empty()
        .matches("([");
    let blank = Customer {
        name: String::new(),
        ..customer()
    };
    let error = pattern.validate(&blank).unwrap_err();
    assert!(matches!(error, ValidationError::Configuration(_)));
    assert!(error.to_string().contains("invalid pattern"));
}

#[test]
fn validator_errors_propagate() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Name", |c: &Customer| c.name.clone())
        .must(|_| false);
    validator
        .rule_for("Email", |c: &Customer| c.email.clone())
        .custom(|_, _| Err(ValidationError::validator("lookup failed")));

    let error = validator.validate(&customer()).unwrap_err();
    assert!(matches!(error, ValidationError::Validator(_)));
    assert!(error.to_string().contains("lookup failed"));
}

#[test]
fn results_convert_to_api_errors() {
    let mut validator = ModelValidator::<Customer>::new();
    validator
        .rule_for("Email", |c: &Customer| c.email.clone())
        .email();

    let instance = Customer {
        email: "nope".into(),
        ..customer()
    };
    let result = validator.validate(&instance).unwrap();
    let body = serde_json::to_value(result.to_api_error()).unwrap();
    assert_eq!(body["error"]["type"], "validation_error");
    assert_eq!(body["error"]["fields"][0]["field"], "Email");
    assert_eq!(body["error"]["fields"][0]["code"], "EmailValidator");
    assert!(result.into_result().is_err());
}
