//! Requirements: single constraints tested against cleaned values.
//!
//! A requirement never coerces. It receives the cleaned [`Value`] and either
//! accepts it or returns a [`FormError`] carrying its message template and
//! the parameters that template refers to. Requirements hold no per-call
//! state, so a field (and the form owning it) can be shared across threads.
//!
//! Emptiness is asymmetric: [`MinLength`] and [`MinValue`] reject empty or
//! falsy values, while [`MaxLength`] and [`MaxValue`] accept them.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex as Pattern;
use tornforms_core::error::{FormError, FormsResult};
use tornforms_core::utils::text::{join_display, snake_case};

use crate::value::Value;

/// A single constraint on a cleaned value.
///
/// # Examples
///
/// ```
/// use tornforms_forms::requirements::{MinLength, Requirement};
/// use tornforms_forms::value::Value;
///
/// let req = MinLength::new(6);
/// assert!(req.test(&Value::from("secret")).is_ok());
///
/// let err = req.test(&Value::from("Test")).unwrap_err();
/// assert_eq!(err.to_string(), "6 characters minimum, please.");
/// ```
pub trait Requirement: Send + Sync + fmt::Debug {
    /// Tests the value, returning the failure if it violates the constraint.
    fn test(&self, value: &Value) -> Result<(), FormError>;

    /// The requirement's type name (e.g. `"MinLength"`).
    fn name(&self) -> &'static str;

    /// The template used when no override was configured.
    fn default_message(&self) -> &'static str;

    /// The override template, if one was configured.
    fn custom_message(&self) -> Option<&str>;

    /// The constraint argument published in [`describe`](Self::describe).
    fn constraint(&self) -> Option<serde_json::Value>;

    /// The effective message template.
    fn message(&self) -> &str {
        self.custom_message().unwrap_or_else(|| self.default_message())
    }

    /// The error code attached to failures (`"min_length"` for `MinLength`).
    fn code(&self) -> String {
        snake_case(self.name())
    }

    /// Describes the requirement as `{"message": ..., "value": ...}`.
    ///
    /// `value` is omitted for requirements without a constraint argument.
    fn describe(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "message".to_string(),
            serde_json::Value::String(self.message().to_string()),
        );
        if let Some(value) = self.constraint() {
            obj.insert("value".to_string(), value);
        }
        serde_json::Value::Object(obj)
    }

    /// Builds this requirement's failure without parameters.
    fn failure(&self) -> FormError {
        FormError::new(self.message(), self.code())
    }
}

macro_rules! message_override {
    () => {
        /// Replaces the default message template.
        #[must_use]
        pub fn with_message(mut self, message: impl Into<String>) -> Self {
            self.message = Some(message.into());
            self
        }
    };
}

macro_rules! requirement_meta {
    ($name:literal, $default:literal) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn default_message(&self) -> &'static str {
            $default
        }

        fn custom_message(&self) -> Option<&str> {
            self.message.as_deref()
        }
    };
}

// ── Required ─────────────────────────────────────────────────────────

/// Rejects `Null` and the empty string.
#[derive(Debug, Clone, Default)]
pub struct Required {
    message: Option<String>,
}

impl Required {
    /// Creates the requirement.
    pub const fn new() -> Self {
        Self { message: None }
    }

    message_override!();
}

impl Requirement for Required {
    requirement_meta!("Required", "This field is required.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        match value {
            Value::Null => Err(self.failure()),
            Value::Text(s) if s.is_empty() => Err(self.failure()),
            _ => Ok(()),
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        None
    }
}

// ── Length bounds ────────────────────────────────────────────────────

/// Requires a non-empty text value of at least `length` characters.
#[derive(Debug, Clone)]
pub struct MinLength {
    length: usize,
    message: Option<String>,
}

impl MinLength {
    /// Creates the requirement with its lower bound.
    pub const fn new(length: usize) -> Self {
        Self {
            length,
            message: None,
        }
    }

    message_override!();
}

impl Requirement for MinLength {
    requirement_meta!("MinLength", "{length} characters minimum, please.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        match value.length() {
            Some(len) if value.is_truthy() && len >= self.length => Ok(()),
            _ => Err(self.failure().with_param("length", self.length)),
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(self.length.into())
    }
}

/// Rejects text values longer than `length` characters. Empty values pass.
#[derive(Debug, Clone)]
pub struct MaxLength {
    length: usize,
    message: Option<String>,
}

impl MaxLength {
    /// Creates the requirement with its upper bound.
    pub const fn new(length: usize) -> Self {
        Self {
            length,
            message: None,
        }
    }

    message_override!();
}

impl Requirement for MaxLength {
    requirement_meta!("MaxLength", "{length} characters maximum, please.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        if !value.is_truthy() {
            return Ok(());
        }
        match value.length() {
            Some(len) if len <= self.length => Ok(()),
            _ => Err(self.failure().with_param("length", self.length)),
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(self.length.into())
    }
}

// ── Value bounds ─────────────────────────────────────────────────────

/// Requires a truthy value no smaller than `limit`.
#[derive(Debug, Clone)]
pub struct MinValue {
    limit: Value,
    message: Option<String>,
}

impl MinValue {
    /// Creates the requirement with its lower bound.
    pub fn new(limit: impl Into<Value>) -> Self {
        Self {
            limit: limit.into(),
            message: None,
        }
    }

    message_override!();
}

impl Requirement for MinValue {
    requirement_meta!("MinValue", "This field must be at least {limit}.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        let ord = value.compare(&self.limit);
        if value.is_truthy() && matches!(ord, Some(Ordering::Greater | Ordering::Equal)) {
            Ok(())
        } else {
            Err(self.failure().with_param("limit", &self.limit))
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(self.limit.to_json())
    }
}

/// Rejects truthy values greater than `limit`. Falsy values pass.
#[derive(Debug, Clone)]
pub struct MaxValue {
    limit: Value,
    message: Option<String>,
}

impl MaxValue {
    /// Creates the requirement with its upper bound.
    pub fn new(limit: impl Into<Value>) -> Self {
        Self {
            limit: limit.into(),
            message: None,
        }
    }

    message_override!();
}

impl Requirement for MaxValue {
    requirement_meta!("MaxValue", "This field must be less than {limit}.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        if !value.is_truthy() {
            return Ok(());
        }
        match value.compare(&self.limit) {
            Some(Ordering::Less | Ordering::Equal) => Ok(()),
            _ => Err(self.failure().with_param("limit", &self.limit)),
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(self.limit.to_json())
    }
}

// ── Membership ───────────────────────────────────────────────────────

fn members_json(members: &[Value]) -> serde_json::Value {
    serde_json::Value::Array(members.iter().map(Value::to_json).collect())
}

fn contains(members: &[Value], value: &Value) -> bool {
    members.iter().any(|m| m.loosely_eq(value))
}

/// Requires the value to be one of `members`.
#[derive(Debug, Clone)]
pub struct InList {
    members: Vec<Value>,
    message: Option<String>,
}

impl InList {
    /// Creates the requirement from the allowed values.
    pub fn new<I, T>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    message_override!();
}

impl Requirement for InList {
    requirement_meta!("InList", "This field must be one of: {list}.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        if contains(&self.members, value) {
            Ok(())
        } else {
            Err(self.failure().with_param("list", join_display(&self.members)))
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(members_json(&self.members))
    }
}

/// Requires the value not to be one of `members`.
#[derive(Debug, Clone)]
pub struct NotInList {
    members: Vec<Value>,
    message: Option<String>,
}

impl NotInList {
    /// Creates the requirement from the forbidden values.
    pub fn new<I, T>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    message_override!();
}

impl Requirement for NotInList {
    requirement_meta!("NotInList", "This field must not be one of: {list}.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        if contains(&self.members, value) {
            Err(self.failure().with_param("list", join_display(&self.members)))
        } else {
            Ok(())
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(members_json(&self.members))
    }
}

// ── Regex ────────────────────────────────────────────────────────────

/// Requires a text value matching a pattern at its start.
///
/// Values that are not text (including `Null`) never match.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Pattern,
    message: Option<String>,
}

impl Regex {
    /// Compiles `pattern` into a requirement.
    pub fn new(pattern: &str) -> FormsResult<Self> {
        Ok(Self::from_regex(Pattern::new(pattern)?))
    }

    /// Wraps an already compiled pattern.
    pub const fn from_regex(pattern: Pattern) -> Self {
        Self {
            pattern,
            message: None,
        }
    }

    /// Returns the pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    message_override!();
}

impl Requirement for Regex {
    requirement_meta!("Regex", "This entry is invalid.");

    fn test(&self, value: &Value) -> Result<(), FormError> {
        let matched = value
            .as_str()
            .and_then(|s| self.pattern.find(s))
            .is_some_and(|m| m.start() == 0);
        if matched {
            Ok(())
        } else {
            Err(self.failure())
        }
    }

    fn constraint(&self) -> Option<serde_json::Value> {
        Some(serde_json::Value::String(self.pattern().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    // ── Required ─────────────────────────────────────────────────────

    #[test]
    fn test_required() {
        let req = Required::new();
        assert!(req.test(&text("x")).is_ok());
        assert!(req.test(&Value::from(0)).is_ok());

        let err = req.test(&Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "This field is required.");
        assert_eq!(err.code, "required");
        assert!(err.params.is_empty());
        assert!(req.test(&text("")).is_err());
    }

    #[test]
    fn test_custom_message() {
        let req = Required::new().with_message("Fill me in.");
        assert_eq!(req.test(&Value::Null).unwrap_err().to_string(), "Fill me in.");
        assert_eq!(req.message(), "Fill me in.");
        assert_eq!(req.default_message(), "This field is required.");
    }

    // ── Lengths ──────────────────────────────────────────────────────

    #[test]
    fn test_min_length() {
        let req = MinLength::new(6);
        assert!(req.test(&text("Testing")).is_ok());
        assert!(req.test(&text("Tested")).is_ok());

        let err = req.test(&text("Test")).unwrap_err();
        assert_eq!(err.to_string(), "6 characters minimum, please.");
        assert_eq!(err.params["length"], "6");
        assert_eq!(err.code, "min_length");
    }

    #[test]
    fn test_min_length_rejects_empty() {
        let req = MinLength::new(1);
        assert!(req.test(&Value::Null).is_err());
        assert!(req.test(&text("")).is_err());
    }

    #[test]
    fn test_max_length() {
        let req = MaxLength::new(3);
        assert!(req.test(&text("abc")).is_ok());
        let err = req.test(&text("abcd")).unwrap_err();
        assert_eq!(err.to_string(), "3 characters maximum, please.");
    }

    #[test]
    fn test_max_length_accepts_empty() {
        let req = MaxLength::new(3);
        assert!(req.test(&Value::Null).is_ok());
        assert!(req.test(&text("")).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(MaxLength::new(4).test(&text("Ümlä")).is_ok());
    }

    #[test]
    fn test_length_on_non_text_fails() {
        assert!(MinLength::new(1).test(&Value::from(12)).is_err());
        assert!(MaxLength::new(5).test(&Value::from(12)).is_err());
    }

    // ── Values ───────────────────────────────────────────────────────

    #[test]
    fn test_min_value() {
        let req = MinValue::new(7);
        assert!(req.test(&Value::from(7)).is_ok());
        assert!(req.test(&Value::from(100)).is_ok());

        let err = req.test(&Value::from(6)).unwrap_err();
        assert_eq!(err.to_string(), "This field must be at least 7.");
        assert_eq!(err.code, "min_value");
    }

    #[test]
    fn test_min_value_rejects_falsy() {
        let req = MinValue::new(-10);
        assert!(req.test(&Value::Null).is_err());
        assert!(req.test(&Value::from(0)).is_err());
    }

    #[test]
    fn test_max_value() {
        let req = MaxValue::new(10);
        assert!(req.test(&Value::from(10)).is_ok());
        assert!(req.test(&Value::Null).is_ok());
        assert!(req.test(&Value::from(0)).is_ok());

        let err = req.test(&Value::from(11)).unwrap_err();
        assert_eq!(err.to_string(), "This field must be less than 10.");
    }

    #[test]
    fn test_value_bounds_mix_int_and_decimal() {
        let req = MinValue::new(Decimal::from_str("2.5").unwrap());
        assert!(req.test(&Value::from(3)).is_ok());
        let err = req.test(&Value::from(2)).unwrap_err();
        assert_eq!(err.to_string(), "This field must be at least 2.5.");
    }

    #[test]
    fn test_value_bounds_incomparable_fail() {
        assert!(MinValue::new(1).test(&text("5")).is_err());
        assert!(MaxValue::new(1).test(&text("5")).is_err());
    }

    // ── Lists ────────────────────────────────────────────────────────

    #[test]
    fn test_in_list() {
        let req = InList::new(["red", "green"]);
        assert!(req.test(&text("red")).is_ok());

        let err = req.test(&text("blue")).unwrap_err();
        assert_eq!(err.to_string(), "This field must be one of: red, green.");
        assert!(req.test(&Value::Null).is_err());
    }

    #[test]
    fn test_in_list_numeric() {
        let req = InList::new([1, 2, 3]);
        assert!(req.test(&Value::from(2)).is_ok());
        assert!(req.test(&Value::Decimal(Decimal::from(3))).is_ok());
        assert!(req.test(&text("2")).is_err());
    }

    #[test]
    fn test_not_in_list() {
        let req = NotInList::new(["admin", "root"]);
        assert!(req.test(&text("alice")).is_ok());
        assert!(req.test(&Value::Null).is_ok());

        let err = req.test(&text("root")).unwrap_err();
        assert_eq!(err.to_string(), "This field must not be one of: admin, root.");
        assert_eq!(err.code, "not_in_list");
    }

    // ── Regex ────────────────────────────────────────────────────────

    #[test]
    fn test_regex_matches_from_start() {
        let req = Regex::new(r"\d+").unwrap();
        assert!(req.test(&text("123abc")).is_ok());
        assert!(req.test(&text("abc123")).is_err());
    }

    #[test]
    fn test_regex_non_text_fails() {
        let req = Regex::new(".*").unwrap();
        let err = req.test(&Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "This entry is invalid.");
        assert!(req.test(&Value::from(5)).is_err());
    }

    #[test]
    fn test_regex_invalid_pattern() {
        assert!(Regex::new("(unclosed").is_err());
    }

    // ── describe ─────────────────────────────────────────────────────

    #[test]
    fn test_describe() {
        assert_eq!(
            Required::new().describe(),
            serde_json::json!({"message": "This field is required."})
        );
        assert_eq!(
            MinLength::new(6).describe(),
            serde_json::json!({"message": "{length} characters minimum, please.", "value": 6})
        );
        assert_eq!(
            InList::new(["a", "b"]).with_message("Pick {list}").describe(),
            serde_json::json!({"message": "Pick {list}", "value": ["a", "b"]})
        );
        assert_eq!(
            Regex::new("^x").unwrap().describe(),
            serde_json::json!({"message": "This entry is invalid.", "value": "^x"})
        );
    }
}
