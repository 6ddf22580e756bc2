//! Translation of validation messages.
//!
//! Messages are translated *before* their parameters are substituted, so the
//! catalog is keyed by the raw templates (`"{length} characters minimum,
//! please."`). Two entry points are provided:
//!
//! - [`Locale`], a value describing one language. Request handlers build one
//!   per request and hand it to the binding layer.
//! - Thread-local activation (`activate`, `deactivate`, `gettext`) for code
//!   that does not carry a locale around.
//!
//! ```
//! use tornforms_core::i18n::{self, Locale};
//!
//! i18n::catalog::register_translations("es", vec![
//!     ("This field is required.", "Este campo es obligatorio."),
//! ]);
//!
//! let locale = Locale::new("es");
//! assert_eq!(locale.translate("This field is required."), "Este campo es obligatorio.");
//!
//! i18n::activate("es");
//! assert_eq!(i18n::gettext("This field is required."), "Este campo es obligatorio.");
//! i18n::deactivate();
//! assert_eq!(i18n::gettext("This field is required."), "This field is required.");
//! ```

pub mod catalog;

use std::cell::RefCell;
use std::fmt;

/// The language used when nothing else is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Normalizes a language code to lowercase with `-` separators.
///
/// Both [`Locale`] and the [`catalog`] key languages this way, so `"pt_BR"`,
/// `"pt-BR"` and `"pt-br"` all name the same catalog.
pub fn normalize_language(code: &str) -> String {
    code.trim().replace('_', "-").to_lowercase()
}

// ── Locale ───────────────────────────────────────────────────────────────

/// A language code with catalog-backed translation.
///
/// Codes are normalized to lowercase with `-` separators, so `"pt_BR"` and
/// `"pt-br"` name the same locale. Lookups try the full code first and then
/// the primary language (`"pt"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    code: String,
}

impl Locale {
    /// Creates a locale for the given language code.
    ///
    /// A blank code yields the default language.
    pub fn new(code: &str) -> Self {
        let code = normalize_language(code);
        if code.is_empty() {
            return Self::default();
        }
        Self { code }
    }

    /// Returns the normalized language code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the primary language subtag (`"pt"` for `"pt-br"`).
    pub fn language(&self) -> &str {
        self.code.split('-').next().unwrap_or(&self.code)
    }

    /// Translates `msgid`, returning it unchanged when no catalog entry exists.
    pub fn translate(&self, msgid: &str) -> String {
        catalog::translate(&self.code, msgid)
            .or_else(|| {
                let language = self.language();
                (language != self.code)
                    .then(|| catalog::translate(language, msgid))
                    .flatten()
            })
            .unwrap_or_else(|| msgid.to_string())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            code: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

// ── Thread-local language state ──────────────────────────────────────────

thread_local! {
    static CURRENT_LANGUAGE: RefCell<Option<Locale>> = const { RefCell::new(None) };
}

/// Activates the given language code for the current thread.
pub fn activate(language_code: &str) {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = Some(Locale::new(language_code));
    });
}

/// Deactivates the current thread's language, reverting to the default.
pub fn deactivate() {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Returns the locale active on the current thread, or the default one.
pub fn current_locale() -> Locale {
    CURRENT_LANGUAGE.with(|cell| cell.borrow().clone().unwrap_or_default())
}

/// Returns the language code active on the current thread.
pub fn get_language() -> String {
    current_locale().code().to_string()
}

/// Translates a message using the current thread's active language.
pub fn gettext(msgid: &str) -> String {
    current_locale().translate(msgid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_normalizes_code() {
        assert_eq!(Locale::new("pt_BR").code(), "pt-br");
        assert_eq!(Locale::new(" DE ").code(), "de");
        assert_eq!(Locale::new("").code(), "en");
        assert_eq!(Locale::new("pt-br").language(), "pt");
        assert_eq!(Locale::new("fr").language(), "fr");
    }

    #[test]
    fn test_locale_translate_exact_and_fallback() {
        catalog::register_translations("zz-i18n", vec![("Hello", "Zello")]);
        catalog::register_translations("zz-i18n-region", vec![("Bye", "Zbye")]);
        catalog::register_translations("yy", vec![("Hello", "Yello")]);

        assert_eq!(Locale::new("zz-i18n").translate("Hello"), "Zello");
        assert_eq!(Locale::new("yy-CA").translate("Hello"), "Yello");
        assert_eq!(Locale::new("yy").translate("Missing"), "Missing");
    }

    #[test]
    fn test_region_catalog_matches_any_spelling() {
        catalog::register_translations("pt_BR", vec![("This field is required.", "Obrigatório.")]);
        catalog::register_translations("fr-CA", vec![("This field is required.", "Requis.")]);

        assert_eq!(Locale::new("pt-BR").translate("This field is required."), "Obrigatório.");
        assert_eq!(Locale::new("pt_BR").translate("This field is required."), "Obrigatório.");
        assert_eq!(Locale::new("fr_ca").translate("This field is required."), "Requis.");
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("pt_BR"), "pt-br");
        assert_eq!(normalize_language(" de-DE "), "de-de");
        assert_eq!(normalize_language("en"), "en");
    }

    #[test]
    fn test_locale_display() {
        assert_eq!(Locale::new("es_MX").to_string(), "es-mx");
    }

    #[test]
    fn test_activate_and_deactivate() {
        activate("fr");
        assert_eq!(get_language(), "fr");
        deactivate();
        assert_eq!(get_language(), "en");
    }

    #[test]
    fn test_gettext_uses_active_language() {
        catalog::register_translations("xx-gettext", vec![("This entry is invalid.", "Nope.")]);
        activate("xx-gettext");
        assert_eq!(gettext("This entry is invalid."), "Nope.");
        assert_eq!(gettext("Untranslated"), "Untranslated");
        deactivate();
        assert_eq!(gettext("This entry is invalid."), "This entry is invalid.");
    }

    #[test]
    fn test_activation_is_thread_local() {
        activate("de");
        let other = std::thread::spawn(get_language).join().unwrap();
        assert_eq!(other, "en");
        assert_eq!(get_language(), "de");
        deactivate();
    }
}
