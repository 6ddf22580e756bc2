//! # tornforms-http
//!
//! Request adapter for tornforms. [`HttpRequest`] parses urlencoded query
//! strings and bodies into a bytes-preserving [`QueryDict`], negotiates a
//! [`Locale`](tornforms_core::i18n::Locale) from `Accept-Language`, and acts as
//! a [`FormHost`](tornforms_forms::FormHost) so that forms can be bound to it.
//!
//! ## Modules
//!
//! - [`querydict`] - Urlencoded argument parsing
//! - [`request`] - The request type and its builder

pub mod querydict;
pub mod request;

pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
