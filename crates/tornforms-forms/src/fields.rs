//! Field definitions: coercion plus an ordered list of requirements.
//!
//! A [`Field`] is built through one of the typed builders ([`TextField`],
//! [`EmailField`], [`IntField`], [`DecimalField`], [`DateField`],
//! [`TimeField`]). Every recognized option maps to exactly one requirement
//! and the requirements always run in the same order:
//!
//! 1. `required`
//! 2. `in_list`
//! 3. `not_in_list`
//! 4. `regex`
//! 5. `min_length` / `min_value`
//! 6. `max_length` / `max_value`
//! 7. requirements added with `requirement`
//! 8. the email pattern (email fields only)
//!
//! Messages are overridden per option with `message(key, template)`; the
//! keys are the option names, plus `email` for the email pattern and
//! `invalid` for values that cannot be coerced at all.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex as Pattern;
use rust_decimal::Decimal;
use tornforms_core::error::{ErrorList, FormError, FormsResult};
use tornforms_core::utils::text::decapitalize;

use crate::requirements::{
    InList, MaxLength, MaxValue, MinLength, MinValue, NotInList, Regex, Requirement, Required,
};
use crate::source::{RawValue, Scalar};
use crate::value::Value;

/// Pattern appended to every email field.
pub const EMAIL_PATTERN: &str = r"[^@]+@[^@]+\.[^@]+";

/// Accepted time formats, tried in order.
pub const TIME_FORMATS: &[&str] = &[
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I %p",
    "%I%p",
    "%H:%M:%S",
    "%H:%M",
    "%H",
];

/// Date format accepted by date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The type a field cleans its input to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Text checked against [`EMAIL_PATTERN`].
    Email,
    /// A base-10 integer within the `i64` range.
    Int,
    /// A decimal with up to 28 significant digits (`rust_decimal`).
    Decimal,
    /// A `YYYY-MM-DD` date.
    Date,
    /// A time of day in one of [`TIME_FORMATS`].
    Time,
}

impl FieldKind {
    /// A human-readable noun for the kind, used in `invalid` messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email address",
            Self::Int => "whole number",
            Self::Decimal => "number",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Default template for values that cannot be coerced.
pub const INVALID_MESSAGE: &str = "Enter a valid {kind}.";

/// A configured field.
///
/// Fields are immutable once built and can be shared between threads.
///
/// # Examples
///
/// ```
/// use tornforms_forms::fields::{Field, TextField};
/// use tornforms_forms::source::RawValue;
/// use tornforms_forms::value::Value;
///
/// let field: Field = TextField::new().required().min_length(6).into();
///
/// let value = field.coerce(Some(RawValue::from("Test"))).unwrap();
/// assert_eq!(value, Value::from("Test"));
///
/// let errors = field.validate(&value);
/// assert_eq!(errors.to_string(), "6 characters minimum, please.");
/// ```
#[derive(Debug)]
pub struct Field {
    kind: FieldKind,
    requirements: Vec<Box<dyn Requirement>>,
    invalid_message: Option<String>,
}

impl Field {
    /// Returns the kind of value this field cleans to.
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the field's requirements in the order they run.
    pub fn requirements(&self) -> &[Box<dyn Requirement>] {
        &self.requirements
    }

    /// Converts raw input into a cleaned value.
    ///
    /// Absent and empty input cleans to [`Value::Null`]; coercion never
    /// enforces presence. Input that cannot be converted yields a single
    /// `invalid` error.
    pub fn coerce(&self, raw: Option<RawValue>) -> Result<Value, FormError> {
        let scalar = match raw {
            None => Scalar::Empty,
            Some(raw) => raw.into_scalar().map_err(|_| self.invalid())?,
        };

        let text = match scalar {
            Scalar::Empty => return Ok(Value::Null),
            Scalar::Text(s) if s.is_empty() => return Ok(Value::Null),
            Scalar::Int(i) => match self.kind {
                FieldKind::Int => return Ok(Value::Int(i)),
                FieldKind::Decimal => return Ok(Value::Decimal(Decimal::from(i))),
                _ => i.to_string(),
            },
            Scalar::Text(s) => s,
        };

        let parsed = match self.kind {
            FieldKind::Text | FieldKind::Email => Some(Value::Text(text)),
            FieldKind::Int => parse_int(&text).map(Value::Int),
            FieldKind::Decimal => parse_decimal(&text).map(Value::Decimal),
            FieldKind::Date => parse_date(&text).map(Value::Date),
            FieldKind::Time => parse_time(&text).map(Value::Time),
        };
        parsed.ok_or_else(|| self.invalid())
    }

    /// Tests a cleaned value against every requirement, collecting failures.
    pub fn validate(&self, value: &Value) -> ErrorList {
        self.requirements
            .iter()
            .filter_map(|req| req.test(value).err())
            .collect()
    }

    /// Describes the field's requirements, keyed by lowerCamelCase type name.
    ///
    /// When two requirements share a type the later one is reported.
    pub fn validations(&self) -> serde_json::Map<String, serde_json::Value> {
        self.requirements
            .iter()
            .map(|req| (decapitalize(req.name()), req.describe()))
            .collect()
    }

    fn invalid(&self) -> FormError {
        FormError::new(
            self.invalid_message.as_deref().unwrap_or(INVALID_MESSAGE),
            "invalid",
        )
        .with_param("kind", self.kind)
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Parses a time with the first matching entry of [`TIME_FORMATS`].
///
/// Formats without minutes (`"2 PM"`, `"14"`) yield the full hour.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS.iter().find_map(|format| {
        let mut parsed = Parsed::new();
        parse(&mut parsed, s, StrftimeItems::new(format)).ok()?;
        if parsed.minute().is_none() {
            parsed.set_minute(0).ok()?;
        }
        parsed.to_naive_time().ok()
    })
}

// ── Builders ─────────────────────────────────────────────────────────

/// Options shared by every field type.
#[derive(Debug, Default)]
struct Options {
    required: bool,
    in_list: Option<Vec<Value>>,
    not_in_list: Option<Vec<Value>>,
    regex: Option<Pattern>,
    extra: Vec<Box<dyn Requirement>>,
    messages: HashMap<String, String>,
}

impl Options {
    fn message(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }

    /// Builds the leading requirements, then `bounds`, then the extras.
    fn finish(mut self, kind: FieldKind, bounds: Vec<Box<dyn Requirement>>) -> Field {
        let mut reqs: Vec<Box<dyn Requirement>> = Vec::new();

        if self.required {
            reqs.push(Box::new(with_message(Required::new(), self.message("required"))));
        }
        if let Some(members) = self.in_list.take() {
            reqs.push(Box::new(with_message(
                InList::new(members),
                self.message("in_list"),
            )));
        }
        if let Some(members) = self.not_in_list.take() {
            reqs.push(Box::new(with_message(
                NotInList::new(members),
                self.message("not_in_list"),
            )));
        }
        if let Some(pattern) = self.regex.take() {
            reqs.push(Box::new(with_message(
                Regex::from_regex(pattern),
                self.message("regex"),
            )));
        }
        reqs.extend(bounds);
        reqs.append(&mut self.extra);

        tracing::trace!(?kind, count = reqs.len(), "built field requirements");
        Field {
            kind,
            requirements: reqs,
            invalid_message: self.messages.remove("invalid"),
        }
    }
}

/// Applies an optional message override to a requirement.
trait WithMessage: Sized {
    fn override_message(self, message: String) -> Self;
}

macro_rules! impl_with_message {
    ($($ty:ty),*) => {
        $(impl WithMessage for $ty {
            fn override_message(self, message: String) -> Self {
                self.with_message(message)
            }
        })*
    };
}

impl_with_message!(Required, InList, NotInList, Regex, MinLength, MaxLength, MinValue, MaxValue);

fn with_message<R: WithMessage>(req: R, message: Option<String>) -> R {
    match message {
        Some(message) => req.override_message(message),
        None => req,
    }
}

macro_rules! common_options {
    () => {
        /// Rejects absent and empty values.
        #[must_use]
        pub fn required(mut self) -> Self {
            self.options.required = true;
            self
        }

        /// Restricts the value to the given members.
        #[must_use]
        pub fn in_list<I, T>(mut self, members: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<Value>,
        {
            self.options.in_list = Some(members.into_iter().map(Into::into).collect());
            self
        }

        /// Forbids the given members.
        #[must_use]
        pub fn not_in_list<I, T>(mut self, members: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<Value>,
        {
            self.options.not_in_list = Some(members.into_iter().map(Into::into).collect());
            self
        }

        /// Requires text matching `pattern` from its start.
        ///
        /// Fails if the pattern does not compile.
        pub fn regex(mut self, pattern: &str) -> FormsResult<Self> {
            self.options.regex = Some(Pattern::new(pattern)?);
            Ok(self)
        }

        /// Requires text matching an already compiled pattern.
        #[must_use]
        pub fn pattern(mut self, pattern: Pattern) -> Self {
            self.options.regex = Some(pattern);
            self
        }

        /// Appends a custom requirement after the built-in ones.
        #[must_use]
        pub fn requirement(mut self, requirement: impl Requirement + 'static) -> Self {
            self.options.extra.push(Box::new(requirement));
            self
        }

        /// Overrides the message template for one option.
        #[must_use]
        pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
            self.options.messages.insert(key.into(), template.into());
            self
        }
    };
}

macro_rules! into_field {
    ($builder:ident) => {
        impl From<$builder> for Field {
            fn from(builder: $builder) -> Self {
                builder.build()
            }
        }
    };
}

fn length_bounds(
    options: &Options,
    min: Option<usize>,
    max: Option<usize>,
) -> Vec<Box<dyn Requirement>> {
    let mut bounds: Vec<Box<dyn Requirement>> = Vec::new();
    if let Some(length) = min {
        bounds.push(Box::new(with_message(
            MinLength::new(length),
            options.message("min_length"),
        )));
    }
    if let Some(length) = max {
        bounds.push(Box::new(with_message(
            MaxLength::new(length),
            options.message("max_length"),
        )));
    }
    bounds
}

fn value_bounds(
    options: &Options,
    min: Option<Value>,
    max: Option<Value>,
) -> Vec<Box<dyn Requirement>> {
    let mut bounds: Vec<Box<dyn Requirement>> = Vec::new();
    if let Some(limit) = min {
        bounds.push(Box::new(with_message(
            MinValue::new(limit),
            options.message("min_value"),
        )));
    }
    if let Some(limit) = max {
        bounds.push(Box::new(with_message(
            MaxValue::new(limit),
            options.message("max_value"),
        )));
    }
    bounds
}

/// Builder for a text field.
#[derive(Debug, Default)]
pub struct TextField {
    options: Options,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl TextField {
    /// Creates a text field with no requirements.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Requires at least `length` characters (empty values fail).
    #[must_use]
    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    /// Allows at most `length` characters (empty values pass).
    #[must_use]
    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Finishes the field.
    pub fn build(self) -> Field {
        let bounds = length_bounds(&self.options, self.min_length, self.max_length);
        self.options.finish(FieldKind::Text, bounds)
    }
}

into_field!(TextField);

/// Builder for an email field: a text field that always checks
/// [`EMAIL_PATTERN`] last.
#[derive(Debug, Default)]
pub struct EmailField {
    options: Options,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl EmailField {
    /// Creates an email field.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Requires at least `length` characters (empty values fail).
    #[must_use]
    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    /// Allows at most `length` characters (empty values pass).
    #[must_use]
    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Finishes the field.
    pub fn build(self) -> Field {
        let bounds = length_bounds(&self.options, self.min_length, self.max_length);
        let email = with_message(
            Regex::from_regex(email_pattern().clone()),
            self.options.message("email"),
        );
        let mut field = self.options.finish(FieldKind::Email, bounds);
        field.requirements.push(Box::new(email));
        field
    }
}

into_field!(EmailField);

fn email_pattern() -> &'static Pattern {
    static EMAIL: std::sync::OnceLock<Pattern> = std::sync::OnceLock::new();
    EMAIL.get_or_init(|| Pattern::new(EMAIL_PATTERN).expect("valid regex"))
}

/// Builder for an integer field.
#[derive(Debug, Default)]
pub struct IntField {
    options: Options,
    min_value: Option<i64>,
    max_value: Option<i64>,
}

impl IntField {
    /// Creates an integer field.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Requires a non-zero value of at least `limit` (empty values fail).
    #[must_use]
    pub fn min_value(mut self, limit: i64) -> Self {
        self.min_value = Some(limit);
        self
    }

    /// Allows values up to `limit` (empty values pass).
    #[must_use]
    pub fn max_value(mut self, limit: i64) -> Self {
        self.max_value = Some(limit);
        self
    }

    /// Finishes the field.
    pub fn build(self) -> Field {
        let bounds = value_bounds(
            &self.options,
            self.min_value.map(Value::Int),
            self.max_value.map(Value::Int),
        );
        self.options.finish(FieldKind::Int, bounds)
    }
}

into_field!(IntField);

/// Builder for a decimal field.
#[derive(Debug, Default)]
pub struct DecimalField {
    options: Options,
    min_value: Option<Decimal>,
    max_value: Option<Decimal>,
}

impl DecimalField {
    /// Creates a decimal field.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Requires a non-zero value of at least `limit` (empty values fail).
    #[must_use]
    pub fn min_value(mut self, limit: impl Into<Decimal>) -> Self {
        self.min_value = Some(limit.into());
        self
    }

    /// Allows values up to `limit` (empty values pass).
    #[must_use]
    pub fn max_value(mut self, limit: impl Into<Decimal>) -> Self {
        self.max_value = Some(limit.into());
        self
    }

    /// Finishes the field.
    pub fn build(self) -> Field {
        let bounds = value_bounds(
            &self.options,
            self.min_value.map(Value::Decimal),
            self.max_value.map(Value::Decimal),
        );
        self.options.finish(FieldKind::Decimal, bounds)
    }
}

into_field!(DecimalField);

/// Builder for a date field.
#[derive(Debug, Default)]
pub struct DateField {
    options: Options,
}

impl DateField {
    /// Creates a date field.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Finishes the field.
    pub fn build(self) -> Field {
        self.options.finish(FieldKind::Date, Vec::new())
    }
}

into_field!(DateField);

/// Builder for a time field.
#[derive(Debug, Default)]
pub struct TimeField {
    options: Options,
}

impl TimeField {
    /// Creates a time field.
    pub fn new() -> Self {
        Self::default()
    }

    common_options!();

    /// Finishes the field.
    pub fn build(self) -> Field {
        self.options.finish(FieldKind::Time, Vec::new())
    }
}

into_field!(TimeField);
