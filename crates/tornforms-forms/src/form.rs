//! The unbound [`Form`] and its two-phase clean-then-validate pipeline.
//!
//! A `Form` is configuration only: a mapping of field names to [`Field`]s.
//! [`Form::clean`] coerces every field's raw input and [`Form::validate`]
//! runs the requirements on the results. Both take `&self` and return fresh
//! values, so one form can serve any number of concurrent requests.
//!
//! Errors accumulate rather than short-circuiting: one field's failure never
//! stops the others from being cleaned or validated.

use std::collections::BTreeMap;

use tornforms_core::error::ErrorList;

use crate::fields::Field;
use crate::source::RawSource;
use crate::value::Value;

/// Cleaned values keyed by field name.
pub type CleanedData = BTreeMap<String, Value>;

/// Per-field error lists. Fields without failures have no entry.
pub type FormErrors = BTreeMap<String, ErrorList>;

/// The outcome of [`Form::clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleaned {
    /// Every field whose input could be coerced, `Null` included.
    pub data: CleanedData,
    /// The `invalid` error of every field whose input could not be coerced.
    pub invalid: FormErrors,
}

/// The outcome of [`Form::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    /// Cleaned values.
    pub data: CleanedData,
    /// Errors of every field that failed coercion or a requirement.
    pub errors: FormErrors,
}

impl Validated {
    /// Returns `true` if no field reported an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Splits the result into its cleaned data and errors.
    pub fn into_parts(self) -> (CleanedData, FormErrors) {
        (self.data, self.errors)
    }
}

/// A named collection of fields.
///
/// Field names are arbitrary strings.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tornforms_forms::fields::{IntField, TextField};
/// use tornforms_forms::form::Form;
/// use tornforms_forms::value::Value;
///
/// let form = Form::new()
///     .field("name", TextField::new().required())
///     .field("age", IntField::new().min_value(18));
///
/// let mut input = HashMap::new();
/// input.insert("name", "Ada");
/// input.insert("age", "36");
///
/// let result = form.validate(&input);
/// assert!(result.is_valid());
/// assert_eq!(result.data["age"], Value::Int(36));
/// ```
#[derive(Debug, Default)]
pub struct Form {
    fields: BTreeMap<String, Field>,
}

impl Form {
    /// Creates a form with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any field of the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Returns the form's fields.
    pub const fn fields(&self) -> &BTreeMap<String, Field> {
        &self.fields
    }

    /// Returns the field with the given name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Coerces every field's raw input.
    pub fn clean<S: RawSource + ?Sized>(&self, source: &S) -> Cleaned {
        let mut cleaned = Cleaned::default();

        for (name, field) in &self.fields {
            match field.coerce(source.get_raw(name)) {
                Ok(value) => {
                    tracing::trace!(field = %name, kind = %field.kind(), "cleaned field");
                    cleaned.data.insert(name.clone(), value);
                }
                Err(error) => {
                    tracing::trace!(field = %name, kind = %field.kind(), "field input is invalid");
                    cleaned.invalid.insert(name.clone(), ErrorList::from(vec![error]));
                }
            }
        }

        cleaned
    }

    /// Cleans the input and tests every cleaned value against its field's
    /// requirements.
    ///
    /// Fields that failed coercion report only their `invalid` error.
    pub fn validate<S: RawSource + ?Sized>(&self, source: &S) -> Validated {
        let Cleaned { data, mut invalid } = self.clean(source);
        let mut errors = FormErrors::new();

        for (name, field) in &self.fields {
            if let Some(list) = invalid.remove(name) {
                errors.insert(name.clone(), list);
                continue;
            }
            let value = data.get(name).unwrap_or(&Value::Null);
            let field_errors = field.validate(value);
            if !field_errors.is_empty() {
                errors.insert(name.clone(), field_errors);
            }
        }

        tracing::debug!(
            fields = self.fields.len(),
            invalid_fields = errors.len(),
            "validated form"
        );

        Validated { data, errors }
    }

    /// Describes every field's requirements, keyed by field name.
    pub fn validations(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), serde_json::Value::Object(field.validations())))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Field)> for Form {
    fn from_iter<I: IntoIterator<Item = (K, Field)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{DateField, EmailField, IntField, TextField};
    use crate::source::{Accessor, RawValue};
    use std::collections::HashMap;

    fn signup() -> Form {
        Form::new()
            .field("name", TextField::new().required())
            .field("email", EmailField::new().required())
            .field("age", IntField::new().min_value(18))
    }

    #[test]
    fn test_validate_valid() {
        let mut input = HashMap::new();
        input.insert("name", "Ada");
        input.insert("email", "ada@example.com");
        input.insert("age", "36");

        let result = signup().validate(&input);
        assert!(result.is_valid());
        assert_eq!(result.data["name"], Value::from("Ada"));
        assert_eq!(result.data["age"], Value::Int(36));
    }

    #[test]
    fn test_validate_accumulates_errors() {
        let input: HashMap<&str, &str> = HashMap::new();
        let (data, errors) = signup().validate(&input).into_parts();

        assert_eq!(data.len(), 3);
        assert!(data.values().all(Value::is_null));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["name"].to_string(), "This field is required.");
        assert_eq!(errors["age"].to_string(), "This field must be at least 18.");
        // required, then the email pattern
        assert_eq!(errors["email"].len(), 2);
    }

    #[test]
    fn test_clean_reports_invalid_and_omits_field() {
        let mut input = HashMap::new();
        input.insert("age", "eighteen");
        input.insert("name", "Ada");

        let cleaned = signup().clean(&input);
        assert!(!cleaned.data.contains_key("age"));
        assert_eq!(cleaned.data["name"], Value::from("Ada"));
        assert!(cleaned.invalid["age"].has_code("invalid"));
    }

    #[test]
    fn test_invalid_field_skips_requirements() {
        let form = Form::new().field("age", IntField::new().required().min_value(18));
        let mut input = HashMap::new();
        input.insert("age", "x");

        let result = form.validate(&input);
        assert_eq!(result.errors["age"].len(), 1);
        assert_eq!(result.errors["age"].to_string(), "Enter a valid whole number.");
    }

    #[test]
    fn test_fields_without_errors_absent() {
        let form = Form::new()
            .field("a", TextField::new())
            .field("b", TextField::new().required());
        let input: HashMap<&str, &str> = HashMap::new();

        let result = form.validate(&input);
        assert!(!result.errors.contains_key("a"));
        assert!(result.errors.contains_key("b"));
    }

    #[test]
    fn test_accessor_source() {
        let form = Form::new().field("when", DateField::new().required());
        let source = Accessor::new(|key: &str, default: Option<RawValue>| {
            (key == "when").then(|| RawValue::from("2014-05-01")).or(default)
        });

        let result = form.validate(&source);
        assert!(result.is_valid());
        assert_eq!(result.data["when"].to_string(), "2014-05-01");
    }

    #[test]
    fn test_json_source() {
        let body = serde_json::json!({"name": "Ada", "email": "ada@example.com", "age": 40});
        let result = signup().validate(&body);
        assert!(result.is_valid());
        assert_eq!(result.data["age"], Value::Int(40));
    }

    #[test]
    fn test_odd_field_names() {
        let form = Form::new().field("user[first name]", TextField::new().required());
        let mut input = HashMap::new();
        input.insert("user[first name]", "Ada");
        assert!(form.validate(&input).is_valid());
    }

    #[test]
    fn test_form_is_not_mutated() {
        let form = signup();
        let mut bad = HashMap::new();
        bad.insert("age", "3");
        let first = form.validate(&bad);

        let mut good = HashMap::new();
        good.insert("name", "Ada");
        good.insert("email", "ada@example.com");
        good.insert("age", "30");
        let second = form.validate(&good);

        assert!(!first.is_valid());
        assert!(second.is_valid());
        assert_eq!(form.validate(&bad), first);
    }

    #[test]
    fn test_validations() {
        let validations = signup().validations();
        assert_eq!(
            validations["age"],
            serde_json::json!({"minValue": {"message": "This field must be at least {limit}.", "value": 18}})
        );
        assert_eq!(
            validations["email"]["required"]["message"],
            "This field is required."
        );
    }

    #[test]
    fn test_from_iterator() {
        let form: Form = [("x", TextField::new().build())].into_iter().collect();
        assert!(form.get("x").is_some());
        assert_eq!(form.fields().len(), 1);
    }
}
