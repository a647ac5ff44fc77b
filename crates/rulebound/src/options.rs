//! Engine configuration.
//!
//! [`EngineOptions`] holds the process-wide defaults (cascade mode, name
//! resolution, error codes, localization). A snapshot is taken when a run
//! starts, so reconfiguring never affects a run in flight.
//! [`ValidationOptions`] configures a single run.

use crate::languages::LanguageManager;
use crate::selector::{DefaultSelector, MemberNameSelector, RuleSetSelector, ValidatorSelector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Whether the remaining validators of a rule run after one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeMode {
    /// Run every validator.
    #[default]
    Continue,
    /// Stop at the first validator that reports a failure.
    Stop,
}

/// Resolves a display name from a property name.
pub type DisplayNameResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves the default error code from a validator name.
pub type ErrorCodeResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Process-wide engine defaults.
#[derive(Clone)]
pub struct EngineOptions {
    cascade_mode: CascadeMode,
    property_chain_separator: String,
    display_name_resolver: Option<DisplayNameResolver>,
    humanize_property_names: bool,
    error_code_resolver: ErrorCodeResolver,
    language_manager: Arc<LanguageManager>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cascade_mode: CascadeMode::Continue,
            property_chain_separator: ".".to_string(),
            display_name_resolver: None,
            humanize_property_names: true,
            error_code_resolver: Arc::new(|name: &str| name.to_string()),
            language_manager: Arc::new(LanguageManager::new()),
        }
    }
}

impl EngineOptions {
    /// Create options with the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default cascade mode for rules that do not set one.
    pub fn with_cascade_mode(mut self, mode: CascadeMode) -> Self {
        self.cascade_mode = mode;
        self
    }

    /// Separator between property chain segments.
    pub fn with_property_chain_separator(mut self, separator: impl Into<String>) -> Self {
        self.property_chain_separator = separator.into();
        self
    }

    /// Resolver consulted before humanizing the property name.
    pub fn with_display_name_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.display_name_resolver = Some(Arc::new(resolver));
        self
    }

    /// Whether fallback display names are humanized (`FirstName` → `First Name`).
    pub fn with_humanized_property_names(mut self, humanize: bool) -> Self {
        self.humanize_property_names = humanize;
        self
    }

    /// Resolver for error codes of validators without an explicit code.
    pub fn with_error_code_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.error_code_resolver = Arc::new(resolver);
        self
    }

    /// Message template source.
    pub fn with_language_manager(mut self, manager: LanguageManager) -> Self {
        self.language_manager = Arc::new(manager);
        self
    }

    pub fn cascade_mode(&self) -> CascadeMode {
        self.cascade_mode
    }

    pub fn property_chain_separator(&self) -> &str {
        &self.property_chain_separator
    }

    pub fn language_manager(&self) -> &LanguageManager {
        &self.language_manager
    }

    /// Error code for a validator without an explicit one.
    pub fn resolve_error_code(&self, validator_name: &str) -> String {
        (self.error_code_resolver)(validator_name)
    }

    /// Fallback display name for a property.
    pub fn resolve_display_name(&self, property_name: &str) -> String {
        if let Some(name) = self
            .display_name_resolver
            .as_ref()
            .and_then(|resolver| resolver(property_name))
        {
            return name;
        }
        if self.humanize_property_names {
            humanize(property_name)
        } else {
            property_name.to_string()
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("cascade_mode", &self.cascade_mode)
            .field("property_chain_separator", &self.property_chain_separator)
            .field("has_display_name_resolver", &self.display_name_resolver.is_some())
            .field("humanize_property_names", &self.humanize_property_names)
            .field("language_manager", &self.language_manager)
            .finish()
    }
}

static GLOBAL: OnceLock<RwLock<Arc<EngineOptions>>> = OnceLock::new();

fn global_cell() -> &'static RwLock<Arc<EngineOptions>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(EngineOptions::default())))
}

/// Snapshot of the process-wide options.
pub fn global() -> Arc<EngineOptions> {
    global_cell()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide options with the result of `f`.
///
/// Runs already in progress keep the snapshot they started with.
pub fn configure<F>(f: F)
where
    F: FnOnce(EngineOptions) -> EngineOptions,
{
    let mut guard = global_cell().write().unwrap_or_else(PoisonError::into_inner);
    let current = EngineOptions::clone(&guard);
    *guard = Arc::new(f(current));
}

/// Restore the built-in defaults.
pub fn reset() {
    configure(|_| EngineOptions::default());
}

/// Turn `FirstName`, `first_name` or `firstName` into `First Name`.
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c == '_' || c == ' ' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = match prev {
            Some(p) => c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()),
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Options for a single validation run.
///
/// ```rust,ignore
/// let options = ValidationOptions::new()
///     .include_rule_sets(["default", "Admin"])
///     .data("tenant", "acme");
/// validator.validate_with(&user, options)?;
/// ```
#[derive(Clone, Default)]
pub struct ValidationOptions {
    pub(crate) selector: Option<Arc<dyn ValidatorSelector>>,
    pub(crate) rule_sets: Vec<String>,
    pub(crate) engine: Option<Arc<EngineOptions>>,
    pub(crate) data: HashMap<String, serde_json::Value>,
    pub(crate) disable_selector_cascade: bool,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute only rules in the named rule sets (`"*"` selects all).
    pub fn include_rule_sets<I, S>(mut self, rule_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_sets = rule_sets.into_iter().map(Into::into).collect();
        self.selector = Some(Arc::new(RuleSetSelector::new(self.rule_sets.clone())));
        self
    }

    /// Execute every rule regardless of rule set.
    pub fn include_all_rule_sets(self) -> Self {
        self.include_rule_sets([RuleSetSelector::WILDCARD])
    }

    /// Execute only rules for the given property paths.
    pub fn include_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selector = Some(Arc::new(MemberNameSelector::new(properties)));
        self
    }

    /// Use a custom selector.
    pub fn selector(mut self, selector: impl ValidatorSelector + 'static) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    /// Re-apply the selector inside nested validators instead of running them whole.
    pub fn disable_selector_cascade(mut self) -> Self {
        self.disable_selector_cascade = true;
        self
    }

    /// Use these engine options instead of the global snapshot.
    pub fn engine(mut self, options: EngineOptions) -> Self {
        self.engine = Some(Arc::new(options));
        self
    }

    /// Seed the run's shared data bag.
    pub fn data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.data.insert(key.into(), value);
        self
    }

    pub(crate) fn resolved_selector(&self) -> Arc<dyn ValidatorSelector> {
        self.selector
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultSelector))
    }

    pub(crate) fn resolved_engine(&self) -> Arc<EngineOptions> {
        self.engine.clone().unwrap_or_else(global)
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("selector", &self.selector)
            .field("rule_sets", &self.rule_sets)
            .field("engine", &self.engine)
            .field("data", &self.data)
            .field("disable_selector_cascade", &self.disable_selector_cascade)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_names() {
        assert_eq!(humanize("FirstName"), "First Name");
        assert_eq!(humanize("first_name"), "First Name");
        assert_eq!(humanize("firstName"), "First Name");
        assert_eq!(humanize("Name"), "Name");
        assert_eq!(humanize("Address1Line"), "Address1 Line");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn display_name_resolution() {
        let options = EngineOptions::new();
        assert_eq!(options.resolve_display_name("EmailAddress"), "Email Address");

        let options = EngineOptions::new()
            .with_display_name_resolver(|name| (name == "Dob").then(|| "Date of birth".to_string()));
        assert_eq!(options.resolve_display_name("Dob"), "Date of birth");
        assert_eq!(options.resolve_display_name("LastName"), "Last Name");

        let options = EngineOptions::new().with_humanized_property_names(false);
        assert_eq!(options.resolve_display_name("LastName"), "LastName");
    }

    #[test]
    fn error_code_resolution() {
        let options = EngineOptions::new();
        assert_eq!(options.resolve_error_code("NotEmptyValidator"), "NotEmptyValidator");

        let options = EngineOptions::new()
            .with_error_code_resolver(|name| name.trim_end_matches("Validator").to_lowercase());
        assert_eq!(options.resolve_error_code("NotEmptyValidator"), "notempty");
    }

    #[test]
    fn run_options_rule_sets() {
        let options = ValidationOptions::new().include_rule_sets(["Admin"]);
        assert_eq!(options.rule_sets, vec!["Admin".to_string()]);
        assert!(options.selector.is_some());

        let options = ValidationOptions::new().include_all_rule_sets();
        assert_eq!(options.rule_sets, vec!["*".to_string()]);
    }
}
