//! Presence and format validators.

use crate::context::PropertyValidatorContext;
use crate::error::{Result, ValidationError};
use crate::validator::{Property, PropertyValidator, ValidatorOptions};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified email regex
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        ).unwrap()
    })
}

/// Values that have an "empty" state.
///
/// Whitespace-only strings, empty collections, `None` and default numbers
/// are empty.
pub trait EmptyCheck {
    fn is_empty_value(&self) -> bool;
}

impl EmptyCheck for String {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}

impl EmptyCheck for &'static str {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<V: EmptyCheck> EmptyCheck for Option<V> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().map_or(true, EmptyCheck::is_empty_value)
    }
}

impl<V> EmptyCheck for Vec<V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> EmptyCheck for HashMap<K, V, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> EmptyCheck for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyCheck for bool {
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

macro_rules! empty_check_default {
    ($($ty:ty),*) => {
        $(
            impl EmptyCheck for $ty {
                fn is_empty_value(&self) -> bool {
                    *self == <$ty>::default()
                }
            }
        )*
    };
}

empty_check_default!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Values that may be absent.
pub trait NullCheck {
    fn is_null(&self) -> bool;
}

impl<V> NullCheck for Option<V> {
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

/// Text-like values. `None` means no text, which text validators accept.
pub trait TextValue {
    fn text(&self) -> Option<&str>;
}

impl TextValue for String {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextValue for &'static str {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextValue for Option<String> {
    fn text(&self) -> Option<&str> {
        self.as_deref()
    }
}

/// Fails on empty values.
pub struct NotEmptyValidator<T, P> {
    options: ValidatorOptions<T, P>,
}

impl<T, P> Default for NotEmptyValidator<T, P> {
    fn default() -> Self {
        Self {
            options: ValidatorOptions::default(),
        }
    }
}

impl<T, P> NotEmptyValidator<T, P> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, P> PropertyValidator<T, P> for NotEmptyValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + EmptyCheck,
{
    validator_options!("NotEmptyValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(!ctx.value().is_empty_value())
    }
}

/// Fails on `None`.
pub struct NotNullValidator<T, P> {
    options: ValidatorOptions<T, P>,
}

impl<T, P> Default for NotNullValidator<T, P> {
    fn default() -> Self {
        Self {
            options: ValidatorOptions::default(),
        }
    }
}

impl<T, P> NotNullValidator<T, P> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, P> PropertyValidator<T, P> for NotNullValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + NullCheck,
{
    validator_options!("NotNullValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(!ctx.value().is_null())
    }
}

/// Fails when the text does not match a regular expression.
///
/// An invalid pattern is reported as a configuration error. Rules built with
/// `matches` report it before any validator runs; otherwise it surfaces when
/// this validator runs.
pub struct RegexValidator<T, P> {
    pattern: std::result::Result<Regex, regex::Error>,
    options: ValidatorOptions<T, P>,
}

impl<T, P> RegexValidator<T, P> {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern),
            options: ValidatorOptions::default(),
        }
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: Ok(regex),
            options: ValidatorOptions::default(),
        }
    }

    /// Why the pattern failed to compile, if it did.
    pub fn pattern_error(&self) -> Option<&regex::Error> {
        self.pattern.as_ref().err()
    }
}

impl<T, P> PropertyValidator<T, P> for RegexValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + TextValue,
{
    validator_options!("RegularExpressionValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        let regex = self.pattern.as_ref().map_err(|e| {
            ValidationError::configuration(format!(
                "invalid pattern for '{}': {e}",
                ctx.property_path()
            ))
        })?;
        let Some(text) = ctx.value().text() else {
            return Ok(true);
        };
        if regex.is_match(text) {
            return Ok(true);
        }
        ctx.formatter_mut().append_argument("RegularExpression", regex.as_str());
        Ok(false)
    }
}

/// Fails when the text is not an email address.
pub struct EmailValidator<T, P> {
    options: ValidatorOptions<T, P>,
}

impl<T, P> Default for EmailValidator<T, P> {
    fn default() -> Self {
        Self {
            options: ValidatorOptions::default(),
        }
    }
}

impl<T, P> EmailValidator<T, P> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, P> PropertyValidator<T, P> for EmailValidator<T, P>
where
    T: Send + Sync + 'static,
    P: Property + TextValue,
{
    validator_options!("EmailValidator");

    fn is_valid(&self, ctx: &mut PropertyValidatorContext<'_, T, P>) -> Result<bool> {
        Ok(ctx.value().text().map_or(true, |text| email_regex().is_match(text)))
    }
}
