//! # tornforms-core
//!
//! Foundation types shared by the tornforms crates. Nothing here knows about
//! fields or requests.
//!
//! ## Modules
//!
//! - [`error`] - Validation error values, message templating, and `FormsError`
//! - [`i18n`] - Translation catalog and [`Locale`](i18n::Locale)
//! - [`logging`] - Tracing subscriber setup
//! - [`settings`] - Library settings and the global `SETTINGS`
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`utils`] - `MultiValueDict` and text helpers

pub mod error;
pub mod i18n;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{ErrorList, FormError, FormsError, FormsResult};
pub use i18n::Locale;
pub use settings::{Settings, SETTINGS};
