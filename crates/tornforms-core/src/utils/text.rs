//! String helpers shared by the requirement and field layers.

use std::fmt::Display;

/// Lowercases the first character of a string.
///
/// Requirement type names are published to clients in this form
/// (`MinLength` becomes `minLength`).
///
/// # Examples
///
/// ```
/// use tornforms_core::utils::text::decapitalize;
///
/// assert_eq!(decapitalize("MinLength"), "minLength");
/// assert_eq!(decapitalize("regex"), "regex");
/// assert_eq!(decapitalize(""), "");
/// ```
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result: String = c.to_lowercase().collect();
        result.extend(chars);
        result
    })
}

/// Converts an UpperCamelCase name into snake_case.
///
/// # Examples
///
/// ```
/// use tornforms_core::utils::text::snake_case;
///
/// assert_eq!(snake_case("NotInList"), "not_in_list");
/// assert_eq!(snake_case("Required"), "required");
/// ```
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Joins displayable items with `", "`.
///
/// # Examples
///
/// ```
/// use tornforms_core::utils::text::join_display;
///
/// assert_eq!(join_display(&["red", "green"]), "red, green");
/// assert_eq!(join_display(&[1, 2, 3]), "1, 2, 3");
/// ```
pub fn join_display<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
