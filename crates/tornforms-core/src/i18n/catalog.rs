//! Translation catalog for error-message templates.
//!
//! The catalog stores translations in a global, thread-safe registry keyed by
//! normalized language code (see [`normalize_language`]), so `"pt_BR"` and
//! `"pt-br"` share one catalog. Message ids are the *untranslated templates*, placeholders
//! included, so a translation must keep the same `{name}` placeholders:
//!
//! ```json
//! {
//!   "messages": {
//!     "This field is required.": "Ce champ est obligatoire.",
//!     "{length} characters minimum, please.": "{length} caractères minimum, svp."
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use super::normalize_language;
use crate::error::{FormsError, FormsResult};

/// A translation catalog for a single language.
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    /// msgid -> translated string.
    messages: HashMap<String, String>,
}

/// The global translation catalog registry, keyed by language code.
fn global_catalogs() -> &'static RwLock<HashMap<String, TranslationCatalog>> {
    static CATALOGS: OnceLock<RwLock<HashMap<String, TranslationCatalog>>> = OnceLock::new();
    CATALOGS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn with_catalog<F, R>(language: &str, f: F) -> Option<R>
where
    F: FnOnce(&TranslationCatalog) -> Option<R>,
{
    let catalogs = global_catalogs().read().expect("catalog lock poisoned");
    catalogs.get(&normalize_language(language)).and_then(f)
}

#[allow(clippy::significant_drop_tightening)]
fn with_catalog_mut<F>(language: &str, f: F)
where
    F: FnOnce(&mut TranslationCatalog),
{
    let mut catalogs = global_catalogs().write().expect("catalog lock poisoned");
    let catalog = catalogs.entry(normalize_language(language)).or_default();
    f(catalog);
}

// ── Registration API ─────────────────────────────────────────────────────

/// Registers message translations for a language.
///
/// Entries are merged into any existing catalog, overwriting duplicates.
///
/// # Examples
///
/// ```
/// use tornforms_core::i18n::catalog;
///
/// catalog::register_translations("fr", vec![
///     ("This field is required.", "Ce champ est obligatoire."),
/// ]);
/// assert_eq!(
///     catalog::translate("fr", "This field is required.").as_deref(),
///     Some("Ce champ est obligatoire.")
/// );
/// ```
pub fn register_translations(language: &str, entries: Vec<(&str, &str)>) {
    with_catalog_mut(language, |catalog| {
        for (msgid, translated) in entries {
            catalog
                .messages
                .insert(msgid.to_string(), translated.to_string());
        }
    });
}

/// Loads translations from a JSON string of the form
/// `{"messages": {"msgid": "translated", ...}}`.
///
/// Non-string values are skipped. A document without `messages` registers an
/// empty catalog for the language.
pub fn load_from_json(language: &str, json_str: &str) -> FormsResult<()> {
    let value: serde_json::Value = serde_json::from_str(json_str)?;

    let Some(root) = value.as_object() else {
        return Err(FormsError::ConfigurationError(format!(
            "Translation catalog for '{language}' must be a JSON object"
        )));
    };

    with_catalog_mut(language, |catalog| {
        if let Some(messages) = root.get("messages").and_then(|v| v.as_object()) {
            for (msgid, translated) in messages {
                if let Some(t) = translated.as_str() {
                    catalog.messages.insert(msgid.clone(), t.to_string());
                }
            }
        }
    });

    Ok(())
}

/// Loads translations for a language from a JSON file.
pub fn load_from_json_file(
    language: &str,
    path: impl AsRef<std::path::Path>,
) -> FormsResult<()> {
    let content = std::fs::read_to_string(path)?;
    load_from_json(language, &content)
}

// ── Lookup API ───────────────────────────────────────────────────────────

/// Looks up a translation in the catalog for exactly `language`.
pub fn translate(language: &str, msgid: &str) -> Option<String> {
    with_catalog(language, |catalog| catalog.messages.get(msgid).cloned())
}

/// Returns `true` if translations are registered for the given language.
pub fn has_language(language: &str) -> bool {
    let catalogs = global_catalogs().read().expect("catalog lock poisoned");
    catalogs.contains_key(&normalize_language(language))
}

/// Returns a list of all languages that have translations registered, in
/// their normalized spelling.
pub fn available_languages() -> Vec<String> {
    let catalogs = global_catalogs().read().expect("catalog lock poisoned");
    catalogs.keys().cloned().collect()
}

/// Clears all translations for a given language.
pub fn clear_language(language: &str) {
    let mut catalogs = global_catalogs().write().expect("catalog lock poisoned");
    catalogs.remove(&normalize_language(language));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_translate() {
        register_translations("test_lang1", vec![("foo", "bar")]);
        assert_eq!(translate("test_lang1", "foo"), Some("bar".to_string()));
        assert_eq!(translate("test_lang1", "baz"), None);
    }

    #[test]
    fn test_translate_missing_language() {
        assert_eq!(translate("nonexistent_lang", "hello"), None);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "messages": {
                "This field is required.": "Campo obligatorio.",
                "{length} characters minimum, please.": "Mínimo {length} caracteres."
            }
        }"#;

        load_from_json("test_json_lang", json).unwrap();

        assert_eq!(
            translate("test_json_lang", "This field is required."),
            Some("Campo obligatorio.".to_string())
        );
        assert_eq!(
            translate("test_json_lang", "{length} characters minimum, please."),
            Some("Mínimo {length} caracteres.".to_string())
        );
    }

    #[test]
    fn test_load_from_json_invalid() {
        let result = load_from_json("bad", "not json");
        assert!(matches!(result, Err(FormsError::SerializationError(_))));
    }

    #[test]
    fn test_load_from_json_not_object() {
        let result = load_from_json("bad_array", "[1, 2]");
        assert!(matches!(result, Err(FormsError::ConfigurationError(_))));
    }

    #[test]
    fn test_load_from_json_empty() {
        load_from_json("test_empty_lang", "{}").unwrap();
        assert!(has_language("test_empty_lang"));
    }

    #[test]
    fn test_load_from_json_file_missing() {
        let result = load_from_json_file("xx", "/nonexistent/catalog.json");
        assert!(matches!(result, Err(FormsError::IoError(_))));
    }

    #[test]
    fn test_has_language() {
        register_translations("test_has_lang", vec![("x", "y")]);
        assert!(has_language("test_has_lang"));
        assert!(!has_language("never_registered_lang"));
        assert!(available_languages().contains(&"test-has-lang".to_string()));
    }

    #[test]
    fn test_merge_translations() {
        register_translations("test_merge_lang", vec![("A", "1"), ("B", "2")]);
        register_translations("test_merge_lang", vec![("B", "3"), ("C", "4")]);

        assert_eq!(translate("test_merge_lang", "A"), Some("1".to_string()));
        assert_eq!(translate("test_merge_lang", "B"), Some("3".to_string()));
        assert_eq!(translate("test_merge_lang", "C"), Some("4".to_string()));
    }

    #[test]
    fn test_language_codes_are_normalized() {
        register_translations("Test_Region_BR", vec![("x", "y")]);
        assert_eq!(translate("test-region-br", "x"), Some("y".to_string()));
        assert_eq!(translate("TEST_REGION-br", "x"), Some("y".to_string()));
        assert!(has_language("test-Region_br"));

        load_from_json("Test_Region_CA", r#"{"messages": {"a": "b"}}"#).unwrap();
        assert_eq!(translate("test-region-ca", "a"), Some("b".to_string()));

        clear_language("TEST-REGION-BR");
        assert!(!has_language("Test_Region_BR"));
    }

    #[test]
    fn test_clear_language() {
        register_translations("test_clear_lang", vec![("x", "y")]);
        assert!(has_language("test_clear_lang"));
        clear_language("test_clear_lang");
        assert!(!has_language("test_clear_lang"));
    }
}
