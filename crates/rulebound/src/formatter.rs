//! Placeholder-based message formatting.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Placeholder for the property's display name.
pub const PROPERTY_NAME: &str = "PropertyName";
/// Placeholder for the property's value.
pub const PROPERTY_VALUE: &str = "PropertyValue";
/// Placeholder for the element index inside collection rules.
pub const COLLECTION_INDEX: &str = "CollectionIndex";

/// Collects placeholder values and substitutes them into message templates.
///
/// Templates use `{Name}` placeholders. Unknown placeholders are left as-is.
///
/// ```rust
/// use rulebound::MessageFormatter;
///
/// let mut formatter = MessageFormatter::new();
/// formatter
///     .append_property_name("Name")
///     .append_argument("MinLength", 5);
/// assert_eq!(
///     formatter.build_message("'{PropertyName}' needs {MinLength} characters."),
///     "'Name' needs 5 characters."
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFormatter {
    placeholders: HashMap<String, Value>,
}

impl MessageFormatter {
    /// Create an empty formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placeholder value.
    pub fn append_argument(&mut self, key: impl Into<String>, value: impl Serialize) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.placeholders.insert(key.into(), value);
        self
    }

    /// Set `{PropertyName}`.
    pub fn append_property_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.placeholders
            .insert(PROPERTY_NAME.to_string(), Value::String(name.into()));
        self
    }

    /// Set `{PropertyValue}`.
    pub fn append_property_value(&mut self, value: impl Serialize) -> &mut Self {
        self.append_argument(PROPERTY_VALUE, value)
    }

    /// Look up a placeholder value.
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.placeholders.get(key)
    }

    /// All placeholder values collected so far.
    pub fn placeholder_values(&self) -> &HashMap<String, Value> {
        &self.placeholders
    }

    /// Drop all placeholder values.
    pub fn reset(&mut self) {
        self.placeholders.clear();
    }

    /// Substitute the collected placeholders into `template`.
    pub fn build_message(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match self.placeholders.get(key) {
                        Some(value) => result.push_str(&render(value)),
                        None => {
                            result.push('{');
                            result.push_str(key);
                            result.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}
