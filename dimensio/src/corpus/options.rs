//! Corpus visibility options
//!
//! Options decide which parts of the catalog the finder, the unit
//! resolver and the simplifier may see. Loading supports a standalone
//! `.toml` / `.json` file or an `[options]` section inside a larger
//! TOML document.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Visibility toggles and key sets for a [`Corpus`](super::Corpus)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Let vector dimension definitions through the dimension filter
    pub allow_vector_dimensions: bool,

    /// Let derived dimension definitions through the dimension filter
    pub allow_derived_dimensions: bool,

    /// Show units flagged as rare
    pub use_rare_units: bool,

    /// Show units flagged as estimations
    pub use_estimated_units: bool,

    /// Show prefixes flagged as rare
    pub use_rare_prefixes: bool,

    /// Show `SiUnofficial` and `BinaryUnofficial` prefixes
    pub use_unofficial_prefixes: bool,

    /// Dimension definition keys hidden from every lookup
    pub ignored_dimensions: BTreeSet<String>,

    /// Measurement system keys whose units are hidden
    pub ignored_systems_for_units: BTreeSet<String>,

    /// When non-empty, only units of these systems (or their descendants) are shown
    pub allowed_systems_for_units: BTreeSet<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            allow_vector_dimensions: false,
            allow_derived_dimensions: true,
            use_rare_units: false,
            use_estimated_units: false,
            use_rare_prefixes: false,
            use_unofficial_prefixes: false,
            ignored_dimensions: BTreeSet::new(),
            ignored_systems_for_units: BTreeSet::new(),
            allowed_systems_for_units: BTreeSet::new(),
        }
    }
}

impl Options {
    /// Load from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Parse TOML text holding either a bare options table or an
    /// `[options]` section
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let document: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let table = match document.get("options") {
            Some(toml::Value::Table(section)) => section.clone(),
            Some(_) => {
                return Err(ConfigError::Parse(
                    "`options` must be a table".to_string(),
                ));
            }
            None => document,
        };

        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
    }

    /// Restore every toggle and set to its default
    pub fn reset_to_defaults(&mut self) {
        *self = Options::default();
    }

    /// Everything visible: rare, estimated, unofficial and vector entries included
    pub fn permissive() -> Self {
        Options {
            allow_vector_dimensions: true,
            use_rare_units: true,
            use_estimated_units: true,
            use_rare_prefixes: true,
            use_unofficial_prefixes: true,
            ..Options::default()
        }
    }

    // ========================================================================
    // Key sets
    // ========================================================================

    /// Hide a dimension definition by key
    pub fn ignore_dimension(&mut self, key: &str) {
        self.ignored_dimensions.insert(key.to_lowercase());
    }

    /// Hide the units of a measurement system (and of its descendants)
    pub fn ignore_system(&mut self, key: &str) {
        self.ignored_systems_for_units.insert(key.to_lowercase());
    }

    /// Restrict visible units to this system (and its descendants)
    pub fn allow_system(&mut self, key: &str) {
        self.allowed_systems_for_units.insert(key.to_lowercase());
    }

    #[inline]
    pub fn is_dimension_ignored(&self, key: &str) -> bool {
        contains_key(&self.ignored_dimensions, key)
    }

    #[inline]
    pub fn is_system_ignored(&self, key: &str) -> bool {
        contains_key(&self.ignored_systems_for_units, key)
    }

    #[inline]
    pub fn is_system_allowed(&self, key: &str) -> bool {
        contains_key(&self.allowed_systems_for_units, key)
    }
}

/// Keys loaded from files keep their spelling, so compare case-insensitively
fn contains_key(set: &BTreeSet<String>, key: &str) -> bool {
    set.contains(key) || set.iter().any(|k| k.eq_ignore_ascii_case(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.allow_derived_dimensions);
        assert!(!options.allow_vector_dimensions);
        assert!(!options.use_rare_units);
        assert!(!options.use_unofficial_prefixes);
        assert!(options.ignored_dimensions.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut options = Options::permissive();
        options.ignore_system("Imperial");
        options.reset_to_defaults();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_key_sets_case_insensitive() {
        let mut options = Options::default();
        options.ignore_dimension("Length");
        assert!(options.is_dimension_ignored("length"));
        assert!(options.is_dimension_ignored("LENGTH"));
        assert!(!options.is_dimension_ignored("time"));
    }

    #[test]
    fn test_bare_toml() {
        let options = Options::from_toml_str(
            r#"
            use_rare_units = true
            ignored_systems_for_units = ["Imperial"]
            "#,
        )
        .unwrap();
        assert!(options.use_rare_units);
        assert!(options.allow_derived_dimensions);
        assert!(options.is_system_ignored("imperial"));
    }

    #[test]
    fn test_options_section() {
        let options = Options::from_toml_str(
            r#"
            [package]
            name = "lab"

            [options]
            allow_derived_dimensions = false
            "#,
        )
        .unwrap();
        assert!(!options.allow_derived_dimensions);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Options::from_toml_str("use_rare_units = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"use_estimated_units": true}}"#).unwrap();
        let options = Options::from_file(file.path()).unwrap();
        assert!(options.use_estimated_units);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            Options::from_file(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }
}
