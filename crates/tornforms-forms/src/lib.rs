//! # tornforms-forms
//!
//! Declarative validation of untyped input.
//!
//! A [`Form`] maps field names to [`Field`]s. Each field couples a coercion
//! (text, email, integer, decimal, date, time) with an ordered list of
//! [`Requirement`]s. Validation runs in two phases: every field's raw input
//! is cleaned into a typed [`Value`], then every cleaned value is tested
//! against its requirements. The result is always a pair of cleaned data and
//! per-field errors; validation failures are never returned as `Err`.
//!
//! ## Modules
//!
//! - [`value`] - Cleaned values
//! - [`source`] - Raw input and the sources it is read from
//! - [`requirements`] - Single constraints on cleaned values
//! - [`fields`] - Field builders and coercion
//! - [`form`] - The unbound form and its clean/validate pipeline
//! - [`bound`] - Per-request bound forms, translation, and `with_form`

pub mod bound;
pub mod fields;
pub mod form;
pub mod requirements;
pub mod source;
pub mod value;

pub use bound::{with_default_form, with_form, BoundForm, FormHost, NoTranslation, Translate, DEFAULT_FORM_NAME};
pub use fields::{DateField, DecimalField, EmailField, Field, FieldKind, IntField, TextField, TimeField};
pub use form::{Cleaned, CleanedData, Form, FormErrors, Validated};
pub use requirements::Requirement;
pub use source::{Accessor, RawSource, RawValue};
pub use value::Value;
