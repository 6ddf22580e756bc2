//! Utility types and functions.
//!
//! - [`MultiValueDict`]: submitted values grouped by key.
//! - [`text`]: name and message helpers (`decapitalize`, `snake_case`, `join_display`).

mod multi_value_dict;
pub mod text;

pub use multi_value_dict::MultiValueDict;
