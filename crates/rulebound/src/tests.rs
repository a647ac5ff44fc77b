//! Property-based tests for the rule engine.

#[cfg(test)]
mod property_tests {
    use crate::formatter::MessageFormatter;
    use crate::model::{ModelValidator, Validator};
    use crate::options::{humanize, CascadeMode};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Sample {
        name: String,
        items: Vec<i64>,
    }

    fn sample_strategy() -> impl Strategy<Value = Sample> {
        (
            "[a-zA-Z ]{0,12}",
            prop::collection::vec(-50i64..50, 0..12),
        )
            .prop_map(|(name, items)| Sample { name, items })
    }

    fn sample_validator() -> ModelValidator<Sample> {
        let mut validator = ModelValidator::new();
        validator
            .rule_for("Name", |s: &Sample| s.name.clone())
            .not_empty()
            .maximum_length(8);
        validator
            .rule_for_each("Items", |s: &Sample| s.items.clone())
            .greater_than_or_equal(0);
        validator
    }

    proptest! {
        // Running the same validator twice on the same instance yields the same result.
        #[test]
        fn prop_validation_is_idempotent(sample in sample_strategy()) {
            let validator = sample_validator();
            let first = validator.validate(&sample).unwrap();
            let second = validator.validate(&sample).unwrap();
            prop_assert_eq!(first, second);
        }

        // Under Continue every failing validator reports; under Stop only the first does.
        #[test]
        fn prop_cascade_failure_counts(count in 1usize..8) {
            let sample = Sample { name: "x".into(), items: Vec::new() };

            for (mode, expected) in [(CascadeMode::Continue, count), (CascadeMode::Stop, 1)] {
                let mut validator = ModelValidator::new();
                let mut rule = validator
                    .rule_for("Name", |s: &Sample| s.name.clone())
                    .cascade(mode);
                for _ in 0..count {
                    rule = rule.must(|_| false);
                }
                drop(rule);

                let result = validator.validate(&sample).unwrap();
                prop_assert_eq!(result.errors.len(), expected);
            }
        }

        // Element failures carry the element's own index.
        #[test]
        fn prop_collection_failures_are_indexed(items in prop::collection::vec(-50i64..50, 0..16)) {
            let validator = sample_validator();
            let sample = Sample { name: "ok".into(), items: items.clone() };
            let result = validator.validate(&sample).unwrap();

            let expected: Vec<String> = items
                .iter()
                .enumerate()
                .filter(|(_, value)| **value < 0)
                .map(|(i, _)| format!("Items[{i}]"))
                .collect();
            let actual: Vec<String> = result
                .errors
                .iter()
                .map(|failure| failure.property_name.clone())
                .collect();
            prop_assert_eq!(actual, expected);
        }

        // Validity agrees with the failure list.
        #[test]
        fn prop_is_valid_matches_errors(sample in sample_strategy()) {
            let result = sample_validator().validate(&sample).unwrap();
            prop_assert_eq!(result.is_valid(), result.errors.is_empty());
            prop_assert_eq!(result.clone().into_result().is_ok(), result.is_valid());
        }

        // Humanizing an already humanized name changes nothing.
        #[test]
        fn prop_humanize_is_idempotent(name in "[a-zA-Z0-9_]{0,24}") {
            let once = humanize(&name);
            prop_assert_eq!(humanize(&once), once.clone());
            prop_assert!(!once.contains('_'));
        }

        // Templates without placeholders pass through untouched.
        #[test]
        fn prop_plain_templates_unchanged(template in "[^{}]{0,40}") {
            let mut formatter = MessageFormatter::new();
            formatter.append_property_name("Name");
            prop_assert_eq!(formatter.build_message(&template), template);
        }

        // A placeholder renders exactly its argument.
        #[test]
        fn prop_placeholder_substitution(value in "[^{}]{0,20}", prefix in "[a-z ]{0,10}") {
            let mut formatter = MessageFormatter::new();
            formatter.append_argument("Value", value.clone());
            let message = formatter.build_message(&format!("{prefix}{{Value}}"));
            prop_assert_eq!(message, format!("{prefix}{value}"));
        }
    }
}
