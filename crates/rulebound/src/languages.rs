//! Default message templates and per-culture translations.

use std::collections::HashMap;

/// Source of message templates keyed by validator name.
///
/// English templates are built in. Other cultures are added with
/// [`LanguageManager::add_translation`]; a missing translation falls back to
/// English.
#[derive(Debug, Clone)]
pub struct LanguageManager {
    enabled: bool,
    culture: Option<String>,
    translations: HashMap<String, HashMap<String, String>>,
}

impl Default for LanguageManager {
    fn default() -> Self {
        Self {
            enabled: true,
            culture: None,
            translations: HashMap::new(),
        }
    }
}

impl LanguageManager {
    /// Create a manager with English templates only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the culture used when none is passed to [`get_string`](Self::get_string).
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    /// Turn translations off; English is always used.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Add or replace a template for `culture`.
    pub fn add_translation(
        mut self,
        culture: impl Into<String>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.translations
            .entry(culture.into())
            .or_default()
            .insert(key.into(), template.into());
        self
    }

    /// The configured culture.
    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    /// Resolve the template for `key`.
    pub fn get_string(&self, key: &str, culture: Option<&str>) -> Option<String> {
        if self.enabled {
            let culture = culture.or(self.culture.as_deref());
            if let Some(template) = culture.and_then(|c| self.lookup(c, key)) {
                return Some(template.to_string());
            }
        }
        english(key).map(str::to_string)
    }

    fn lookup(&self, culture: &str, key: &str) -> Option<&str> {
        if let Some(found) = self.translations.get(culture).and_then(|t| t.get(key)) {
            return Some(found);
        }
        // "fr-CA" falls back to "fr"
        let parent = culture.split(['-', '_']).next()?;
        if parent == culture {
            return None;
        }
        self.translations
            .get(parent)
            .and_then(|t| t.get(key))
            .map(String::as_str)
    }
}

fn english(key: &str) -> Option<&'static str> {
    let template = match key {
        "NotEmptyValidator" => "'{PropertyName}' must not be empty.",
        "NotNullValidator" => "'{PropertyName}' must not be empty.",
        "LengthValidator" => "'{PropertyName}' must be between {MinLength} and {MaxLength} characters. You entered {TotalLength} characters.",
        "ExactLengthValidator" => "'{PropertyName}' must be {MaxLength} characters in length. You entered {TotalLength} characters.",
        "MinimumLengthValidator" => "The length of '{PropertyName}' must be at least {MinLength} characters. You entered {TotalLength} characters.",
        "MaximumLengthValidator" => "The length of '{PropertyName}' must be {MaxLength} characters or fewer. You entered {TotalLength} characters.",
        "RegularExpressionValidator" => "'{PropertyName}' is not in the correct format.",
        "EmailValidator" => "'{PropertyName}' is not a valid email address.",
        "EqualValidator" => "'{PropertyName}' must be equal to '{ComparisonValue}'.",
        "NotEqualValidator" => "'{PropertyName}' must not be equal to '{ComparisonValue}'.",
        "LessThanValidator" => "'{PropertyName}' must be less than '{ComparisonValue}'.",
        "LessThanOrEqualValidator" => "'{PropertyName}' must be less than or equal to '{ComparisonValue}'.",
        "GreaterThanValidator" => "'{PropertyName}' must be greater than '{ComparisonValue}'.",
        "GreaterThanOrEqualValidator" => "'{PropertyName}' must be greater than or equal to '{ComparisonValue}'.",
        "InclusiveBetweenValidator" => "'{PropertyName}' must be between {From} and {To}. You entered {PropertyValue}.",
        "PredicateValidator" => "The specified condition was not met for '{PropertyName}'.",
        "AsyncPredicateValidator" => "The specified condition was not met for '{PropertyName}'.",
        _ => return None,
    };
    Some(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_defaults() {
        let languages = LanguageManager::new();
        assert_eq!(
            languages.get_string("NotEmptyValidator", None).as_deref(),
            Some("'{PropertyName}' must not be empty.")
        );
        assert!(languages.get_string("UnknownValidator", None).is_none());
    }

    #[test]
    fn culture_override_and_fallback() {
        let languages = LanguageManager::new()
            .add_translation("fr", "NotEmptyValidator", "'{PropertyName}' ne doit pas être vide.")
            .with_culture("fr-CA");

        assert_eq!(
            languages.get_string("NotEmptyValidator", None).as_deref(),
            Some("'{PropertyName}' ne doit pas être vide.")
        );
        // missing translation falls back to English
        assert_eq!(
            languages.get_string("EmailValidator", None).as_deref(),
            Some("'{PropertyName}' is not a valid email address.")
        );
    }

    #[test]
    fn disabled_always_english() {
        let languages = LanguageManager::new()
            .add_translation("de", "NotEmptyValidator", "darf nicht leer sein")
            .with_enabled(false);

        assert_eq!(
            languages.get_string("NotEmptyValidator", Some("de")).as_deref(),
            Some("'{PropertyName}' must not be empty.")
        );
    }
}
