//! # tornforms
//!
//! Declarative validation of untyped request input.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `tornforms` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ```
//! use std::collections::HashMap;
//! use tornforms::forms::fields::{EmailField, IntField};
//! use tornforms::forms::Form;
//!
//! let form = Form::new()
//!     .field("email", EmailField::new().required())
//!     .field("age", IntField::new().min_value(18));
//!
//! let mut input = HashMap::new();
//! input.insert("email", "ada@example.com");
//! input.insert("age", "17");
//!
//! let result = form.validate(&input);
//! assert_eq!(result.errors["age"].to_string(), "This field must be at least 18.");
//! ```

/// Error model, settings, logging, and i18n.
pub use tornforms_core as core;

/// Fields, requirements, forms, and bound forms.
#[cfg(feature = "forms")]
pub use tornforms_forms as forms;

/// Urlencoded request arguments and the request form host.
#[cfg(feature = "http")]
pub use tornforms_http as http;

/// Re-exported for describing forms as JSON.
pub use serde_json;

/// Re-exported for instrumenting form handlers.
pub use tracing;
