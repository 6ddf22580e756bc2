//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TORNFORMS_DEBUG` | `debug` |
//! | `TORNFORMS_LOG_LEVEL` | `log_level` |
//! | `TORNFORMS_LANGUAGE_CODE` | `language_code` |
//! | `TORNFORMS_STRIP_ARGUMENTS` | `strip_arguments` |
//! | `TORNFORMS_DEFAULT_FORM_NAME` | `default_form_name` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use tornforms_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/forms.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::FormsError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormsError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormsError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormsError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormsError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormsError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormsError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormsError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `TORNFORMS_*` environment variable overrides to a settings struct.
///
/// Boolean variables accept "true", "1" and "yes" (case-insensitive) as true;
/// anything else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("TORNFORMS_DEBUG") {
        settings.debug = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("TORNFORMS_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("TORNFORMS_LANGUAGE_CODE") {
        settings.language_code = val;
    }

    if let Ok(val) = std::env::var("TORNFORMS_STRIP_ARGUMENTS") {
        settings.strip_arguments = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("TORNFORMS_DEFAULT_FORM_NAME") {
        if !val.trim().is_empty() {
            settings.default_form_name = val;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_config(path: &Path, kind: &str) -> Result<String, FormsError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormsError::ConfigurationError(format!(
            "Failed to read {kind} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(overrides: serde_json::Value, kind: &str) -> Result<Settings, FormsError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormsError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, overrides);
    serde_json::from_value(merged).map_err(|e| {
        FormsError::ConfigurationError(format!("Failed to deserialize settings from {kind}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            language_code = "fr"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.language_code, "fr");
        // Defaults preserved
        assert_eq!(settings.default_form_name, "form");
        assert!(settings.strip_arguments);
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            max_upload = 10
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra.get("max_upload"), Some(&serde_json::json!(10)));
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(FormsError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("strip_arguments = \"sometimes\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "log_level": "debug",
            "default_form_name": "signup"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.default_form_name, "signup");
        assert_eq!(settings.language_code, "en");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("tornforms_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.toml");
        std::fs::write(&path, "language_code = \"de\"\nstrip_arguments = false\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.language_code, "de");
        assert!(!settings.strip_arguments);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file() {
        let dir = std::env::temp_dir().join("tornforms_test_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.json");
        std::fs::write(&path, r#"{"log_level": "warn"}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/path/forms.toml");
        assert!(result.unwrap_err().to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_file_missing() {
        assert!(from_json_file("/nonexistent/path/forms.json").is_err());
    }

    // ── Environment variable overrides ──────────────────────────────
    // Each test owns one variable so they can run in parallel.

    #[test]
    fn test_apply_env_overrides_debug() {
        let mut settings = Settings::default();
        std::env::set_var("TORNFORMS_DEBUG", "no");
        apply_env_overrides(&mut settings);
        assert!(!settings.debug);
        std::env::remove_var("TORNFORMS_DEBUG");
    }

    #[test]
    fn test_apply_env_overrides_log_level() {
        let mut settings = Settings::default();
        std::env::set_var("TORNFORMS_LOG_LEVEL", "debug");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.log_level, "debug");
        std::env::remove_var("TORNFORMS_LOG_LEVEL");
    }

    #[test]
    fn test_apply_env_overrides_strip_arguments() {
        let mut settings = Settings::default();
        std::env::set_var("TORNFORMS_STRIP_ARGUMENTS", "0");
        apply_env_overrides(&mut settings);
        assert!(!settings.strip_arguments);
        std::env::remove_var("TORNFORMS_STRIP_ARGUMENTS");
    }

    #[test]
    fn test_apply_env_overrides_blank_form_name_ignored() {
        let mut settings = Settings::default();
        std::env::set_var("TORNFORMS_DEFAULT_FORM_NAME", "   ");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.default_form_name, "form");
        std::env::remove_var("TORNFORMS_DEFAULT_FORM_NAME");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("off"));
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": 1, "b": {"c": 2, "d": 3}});
        let over = serde_json::json!({"b": {"c": 20}, "e": 5});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": 1, "b": {"c": 20, "d": 3}, "e": 5}));
    }
}
