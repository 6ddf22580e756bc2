//! Per-request binding of a [`Form`].
//!
//! A [`BoundForm`] is the result of validating one request: cleaned data,
//! error messages already translated and rendered, and a validity flag. It is
//! owned by the request and never shared.
//!
//! The request side is abstracted by [`FormHost`]: anything that can look up
//! submitted arguments, name a translator, and hold bound forms by name.
//! [`with_form`] composes binding with a handler, so the handler body always
//! runs against a freshly bound form.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tornforms_core::error::{FormError, FormsResult};
use tornforms_core::i18n::Locale;
use tornforms_core::logging::form_span;
use tornforms_core::settings::SETTINGS;

use crate::fields::Field;
use crate::form::{CleanedData, Form};
use crate::source::{Accessor, RawSource, RawValue};
use crate::value::Value;

/// The name under which a form is attached when none is given.
pub const DEFAULT_FORM_NAME: &str = "form";

/// Returns the configured default form name, or [`DEFAULT_FORM_NAME`].
pub fn default_form_name() -> &'static str {
    SETTINGS
        .try_get()
        .map_or(DEFAULT_FORM_NAME, |s| s.default_form_name.as_str())
}

// ── Translation ──────────────────────────────────────────────────────

/// Translates a message template before its parameters are substituted.
pub trait Translate: Send + Sync {
    /// Returns the locale's version of `template`.
    fn translate(&self, template: &str) -> String;
}

/// Leaves every template unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translate for NoTranslation {
    fn translate(&self, template: &str) -> String {
        template.to_string()
    }
}

impl Translate for Locale {
    fn translate(&self, template: &str) -> String {
        Self::translate(self, template)
    }
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, template: &str) -> String {
        self(template)
    }
}

// ── BoundForm ────────────────────────────────────────────────────────

/// The validation result of one form for one request.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use tornforms_forms::bound::{BoundForm, NoTranslation};
/// use tornforms_forms::fields::TextField;
/// use tornforms_forms::form::Form;
///
/// let form = Arc::new(Form::new().field("name", TextField::new().required()));
/// let input: HashMap<&str, &str> = HashMap::new();
///
/// let mut bound = BoundForm::bind(&form, &input, Arc::new(NoTranslation));
/// assert!(!bound.is_valid());
/// assert_eq!(bound.errors()["name"], vec!["This field is required."]);
///
/// bound.add_error("name", "Also, {who} says no.", [("who", "Bob")]);
/// assert_eq!(bound.errors()["name"].len(), 2);
/// ```
pub struct BoundForm {
    form: Arc<Form>,
    data: CleanedData,
    errors: BTreeMap<String, Vec<String>>,
    translator: Arc<dyn Translate>,
}

impl BoundForm {
    /// Validates `source` against `form`, rendering every error through
    /// `translator`.
    pub fn bind<S: RawSource + ?Sized>(
        form: &Arc<Form>,
        source: &S,
        translator: Arc<dyn Translate>,
    ) -> Self {
        let (data, errors) = form.validate(source).into_parts();
        let mut bound = Self {
            form: Arc::clone(form),
            data,
            errors: BTreeMap::new(),
            translator,
        };
        for (field, list) in errors {
            for error in list {
                bound.push_error(field.clone(), &error);
            }
        }
        bound
    }

    /// Returns `true` if no errors were reported or added.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the unbound form.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Returns the form's fields.
    pub fn fields(&self) -> &BTreeMap<String, Field> {
        self.form.fields()
    }

    /// Returns the cleaned data.
    pub const fn data(&self) -> &CleanedData {
        &self.data
    }

    /// Returns the cleaned value of one field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Returns the rendered error messages, keyed by field.
    pub const fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Returns the first error message of one field, if any.
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Adds an error discovered after validation.
    ///
    /// The template is translated and rendered like any validation error.
    /// The form becomes invalid.
    pub fn add_error<I, K, V>(&mut self, field: impl Into<String>, template: &str, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        let error = params
            .into_iter()
            .fold(FormError::custom(template), |error, (key, value)| {
                error.with_param(key, value)
            });
        self.push_error(field.into(), &error);
    }

    /// Adds an already built error.
    pub fn push_error(&mut self, field: String, error: &FormError) {
        let rendered = error.render_template(&self.translator.translate(&error.message));
        self.errors.entry(field).or_default().push(rendered);
    }

    /// Returns `{"validations": ..., "data": ..., "errors": ...}`.
    pub fn to_json(&self) -> serde_json::Value {
        let data: serde_json::Map<String, serde_json::Value> = self
            .data
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        let errors: serde_json::Map<String, serde_json::Value> = self
            .errors
            .iter()
            .map(|(name, messages)| (name.clone(), serde_json::Value::from(messages.clone())))
            .collect();

        let mut obj = serde_json::Map::new();
        obj.insert(
            "validations".to_string(),
            serde_json::Value::Object(self.form.validations()),
        );
        obj.insert("data".to_string(), serde_json::Value::Object(data));
        obj.insert("errors".to_string(), serde_json::Value::Object(errors));
        serde_json::Value::Object(obj)
    }

    /// Serializes [`to_json`](Self::to_json) to a string.
    pub fn to_json_string(&self) -> FormsResult<String> {
        Ok(serde_json::to_string(&self.to_json())?)
    }
}

impl fmt::Debug for BoundForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundForm")
            .field("data", &self.data)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

// ── Hosts and middleware ─────────────────────────────────────────────

/// The caller context a form is bound to, typically a request.
pub trait FormHost {
    /// Returns the raw value submitted under `key`.
    fn argument(&self, key: &str) -> Option<RawValue>;

    /// Returns the translator for this context's locale.
    fn translator(&self) -> Arc<dyn Translate>;

    /// Stores a bound form under `name`, replacing any previous one.
    fn attach_form(&mut self, name: &str, form: BoundForm);
}

impl Form {
    /// Binds this form to `host` and attaches the result under `name`.
    pub fn bind_to<H: FormHost + ?Sized>(self: &Arc<Self>, host: &mut H, name: &str) {
        let span = form_span(name);
        let _guard = span.enter();

        let bound = {
            let source = Accessor::new(|key: &str, default: Option<RawValue>| {
                host.argument(key).or(default)
            });
            BoundForm::bind(self, &source, host.translator())
        };
        tracing::debug!(valid = bound.is_valid(), "bound form");
        host.attach_form(name, bound);
    }
}

/// Wraps `handler` so that `form` is bound to the host under `name` before
/// the handler runs.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use tornforms_forms::bound::{with_form, BoundForm, FormHost, NoTranslation, Translate};
/// use tornforms_forms::fields::TextField;
/// use tornforms_forms::form::Form;
/// use tornforms_forms::source::RawValue;
///
/// #[derive(Default)]
/// struct Handler {
///     args: HashMap<String, String>,
///     forms: HashMap<String, BoundForm>,
/// }
///
/// impl FormHost for Handler {
///     fn argument(&self, key: &str) -> Option<RawValue> {
///         self.args.get(key).map(RawValue::from)
///     }
///     fn translator(&self) -> Arc<dyn Translate> {
///         Arc::new(NoTranslation)
///     }
///     fn attach_form(&mut self, name: &str, form: BoundForm) {
///         self.forms.insert(name.to_string(), form);
///     }
/// }
///
/// let form = Arc::new(Form::new().field("name", TextField::new().required()));
/// let post = with_form(form, "form", |h: &mut Handler| h.forms["form"].is_valid());
///
/// let mut handler = Handler::default();
/// assert!(!post(&mut handler));
/// handler.args.insert("name".into(), "Ada".into());
/// assert!(post(&mut handler));
/// ```
pub fn with_form<H, T, F>(
    form: Arc<Form>,
    name: impl Into<String>,
    handler: F,
) -> impl Fn(&mut H) -> T
where
    H: FormHost,
    F: Fn(&mut H) -> T,
{
    let name = name.into();
    move |host: &mut H| {
        form.bind_to(host, &name);
        handler(host)
    }
}

/// Like [`with_form`], attaching the form under [`default_form_name`].
pub fn with_default_form<H, T, F>(form: Arc<Form>, handler: F) -> impl Fn(&mut H) -> T
where
    H: FormHost,
    F: Fn(&mut H) -> T,
{
    with_form(form, default_form_name(), handler)
}
