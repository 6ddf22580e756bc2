//! Error types for tornforms.
//!
//! Two tiers live here. [`FormError`] and [`ErrorList`] are *values*: they
//! describe why a submitted value was rejected and are collected per field,
//! never propagated. [`FormsError`] is the `Err` type for programmer and
//! configuration mistakes (a bad regex pattern, an unreadable settings file).

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A single validation failure: a message template plus named parameters.
///
/// The template uses `{name}` placeholders. Rendering substitutes the
/// parameters when there are any; a template without parameters is returned
/// verbatim, braces included.
///
/// # Examples
///
/// ```
/// use tornforms_core::error::FormError;
///
/// let err = FormError::new("{length} characters minimum, please.", "min_length")
///     .with_param("length", 6);
/// assert_eq!(err.to_string(), "6 characters minimum, please.");
///
/// let plain = FormError::custom("Use {braces} freely.");
/// assert_eq!(plain.to_string(), "Use {braces} freely.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    /// The message template (before translation and substitution).
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Values substituted into the template.
    pub params: HashMap<String, String>,
}

impl FormError {
    /// Creates a new `FormError` with a message template and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Creates an error with the `custom` code, used for errors added by
    /// application code after structural validation.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(message, "custom")
    }

    /// Adds a parameter to this error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Renders the error's own template.
    pub fn render(&self) -> String {
        self.render_template(&self.message)
    }

    /// Renders an alternative template (typically a translation of
    /// [`message`](Self::message)) with this error's parameters.
    pub fn render_template(&self, template: &str) -> String {
        format_message(template, &self.params)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for FormError {}

/// Substitutes `{name}` placeholders in `template` with `params`.
///
/// With an empty parameter map the template is returned unchanged. Otherwise
/// `{{` and `}}` produce literal braces and placeholders without a matching
/// parameter are left as written.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tornforms_core::error::format_message;
///
/// let mut params = HashMap::new();
/// params.insert("limit".to_string(), "7".to_string());
/// assert_eq!(
///     format_message("This field must be at least {limit}.", &params),
///     "This field must be at least 7."
/// );
/// ```
pub fn format_message(template: &str, params: &HashMap<String, String>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

    if params.is_empty() {
        return template.to_string();
    }

    let placeholder = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex")
    });

    placeholder
        .replace_all(template, |caps: &Captures<'_>| match caps.get(1) {
            Some(name) => params
                .get(name.as_str())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string()),
            None if &caps[0] == "{{" => "{".to_string(),
            None => "}".to_string(),
        })
        .into_owned()
}

/// The ordered errors reported for one field.
///
/// Displaying an `ErrorList` yields the first error's rendered message, or
/// an empty string, for contexts that show one message per field.
///
/// # Examples
///
/// ```
/// use tornforms_core::error::{ErrorList, FormError};
///
/// let mut errors = ErrorList::new();
/// assert_eq!(errors.to_string(), "");
///
/// errors.push(FormError::new("This field is required.", "required"));
/// errors.push(FormError::custom("Second."));
/// assert_eq!(errors.to_string(), "This field is required.");
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<FormError>,
}

impl ErrorList {
    /// Creates an empty `ErrorList`.
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Appends an error.
    pub fn push(&mut self, error: FormError) {
        self.errors.push(error);
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the first error, if any.
    pub fn first(&self) -> Option<&FormError> {
        self.errors.first()
    }

    /// Returns the error at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&FormError> {
        self.errors.get(index)
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FormError> {
        self.errors.iter()
    }

    /// Returns the rendered message of every error, in order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(FormError::render).collect()
    }

    /// Returns `true` if any error carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) => fmt::Display::fmt(first, f),
            None => Ok(()),
        }
    }
}

impl Serialize for ErrorList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.errors.iter().map(FormError::render))
    }
}

impl From<Vec<FormError>> for ErrorList {
    fn from(errors: Vec<FormError>) -> Self {
        Self { errors }
    }
}

impl FromIterator<FormError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FormError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ErrorList {
    type Item = FormError;
    type IntoIter = std::vec::IntoIter<FormError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FormError;
    type IntoIter = std::slice::Iter<'a, FormError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors raised for programmer or configuration mistakes.
///
/// Validation failures are never reported through this type; they are
/// collected as [`FormError`] values.
#[derive(Error, Debug)]
pub enum FormsError {
    /// A requirement was configured with a pattern that does not compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A convenience type alias for `Result<T, FormsError>`.
pub type FormsResult<T> = Result<T, FormsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_display_without_params() {
        let err = FormError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_form_error_display_with_params() {
        let err = FormError::new("{length} characters maximum, please.", "max_length")
            .with_param("length", 3);
        assert_eq!(err.to_string(), "3 characters maximum, please.");
        assert_eq!(err.params.get("length").unwrap(), "3");
    }

    #[test]
    fn test_template_verbatim_without_params() {
        let err = FormError::custom("Literal {{braces}} and {name}");
        assert_eq!(err.render(), "Literal {{braces}} and {name}");
    }

    #[test]
    fn test_template_escapes_with_params() {
        let err = FormError::custom("{{{name}}} is taken").with_param("name", "bob");
        assert_eq!(err.render(), "{bob} is taken");
    }

    #[test]
    fn test_template_unknown_placeholder_kept() {
        let err = FormError::custom("{known} and {unknown}").with_param("known", "x");
        assert_eq!(err.render(), "x and {unknown}");
    }

    #[test]
    fn test_render_translated_template() {
        let err = FormError::new("This field must be at least {limit}.", "min_value")
            .with_param("limit", 7);
        assert_eq!(
            err.render_template("Ce champ doit valoir au moins {limit}."),
            "Ce champ doit valoir au moins 7."
        );
    }

    #[test]
    fn test_error_list_display_first() {
        let list: ErrorList = vec![
            FormError::new("{length} characters minimum, please.", "min_length")
                .with_param("length", 6),
            FormError::custom("Another"),
        ]
        .into();
        assert_eq!(list.to_string(), "6 characters minimum, please.");
        assert_eq!(list.messages(), vec!["6 characters minimum, please.", "Another"]);
        assert!(list.has_code("min_length"));
        assert!(!list.has_code("required"));
    }

    #[test]
    fn test_error_list_display_empty() {
        assert_eq!(ErrorList::new().to_string(), "");
    }

    #[test]
    fn test_error_list_serializes_rendered_messages() {
        let list: ErrorList = std::iter::once(
            FormError::new("This field must be one of: {list}.", "in_list")
                .with_param("list", "a, b"),
        )
        .collect();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json, serde_json::json!(["This field must be one of: a, b."]));
    }

    #[test]
    fn test_forms_error_from_regex() {
        let bad = Regex::new("(unclosed").unwrap_err();
        let err: FormsError = bad.into();
        assert!(err.to_string().starts_with("Invalid pattern:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormsError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
