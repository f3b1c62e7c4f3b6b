//! Normalizer configuration.
//!
//! Loaded from JSON. Every field is optional; missing fields take the
//! built-in defaults and user-supplied tables extend the built-in ones.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contractions::ContractionRule;
use crate::error::ConfigError;
use crate::language::{GraphemeOverride, HomographEntry, PhoneticMapping, PhoneticRuleSpec};

const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Contractions that sound natural in synthesized speech.
pub const DEFAULT_NATURAL: &[&str] = &[
    "don't", "can't", "won't", "i'm", "it's", "that's", "you're", "we're", "they're", "let's",
];

/// Contractions synthesizers tend to mispronounce.
pub const DEFAULT_PROBLEMATIC: &[&str] = &[
    "shouldn't've",
    "couldn't've",
    "wouldn't've",
    "would've",
    "should've",
    "could've",
    "might've",
    "must've",
    "y'all",
    "ain't",
    "gonna",
    "wanna",
    "gotta",
];

fn to_set(forms: &[&str]) -> BTreeSet<String> {
    forms.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub natural_contractions: BTreeSet<String>,
    pub problematic_contractions: BTreeSet<String>,
    /// Leave natural-set contractions unexpanded
    pub preserve_natural_speech: bool,
    pub enable_context_rules: bool,
    pub enable_homographs: bool,
    pub enable_stress: bool,
    /// Entries kept by the normalization cache; 0 disables it
    pub cache_capacity: usize,
    pub contraction_rules: Vec<ContractionRule>,
    pub phonetic_mappings: Vec<PhoneticMapping>,
    /// Language tag -> override list, e.g. "en-US"
    pub language_overrides: BTreeMap<String, Vec<GraphemeOverride>>,
    pub phonetic_rules: Vec<PhoneticRuleSpec>,
    pub homographs: BTreeMap<String, Vec<HomographEntry>>,
    pub phoneme_similarity: BTreeMap<String, Vec<String>>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            natural_contractions: to_set(DEFAULT_NATURAL),
            problematic_contractions: to_set(DEFAULT_PROBLEMATIC),
            preserve_natural_speech: false,
            enable_context_rules: true,
            enable_homographs: true,
            enable_stress: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            contraction_rules: Vec::new(),
            phonetic_mappings: Vec::new(),
            language_overrides: BTreeMap::new(),
            phonetic_rules: Vec::new(),
            homographs: BTreeMap::new(),
            phoneme_similarity: BTreeMap::new(),
        }
    }
}

impl NormalizerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&data)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, falling back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using built-in defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NormalizerConfig::default();
        assert!(config.natural_contractions.contains("don't"));
        assert!(config.problematic_contractions.contains("would've"));
        assert!(!config.preserve_natural_speech);
        assert!(config.enable_stress);
        assert_eq!(config.cache_capacity, 1024);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = NormalizerConfig::from_json(
            r#"{
                "preserve_natural_speech": true,
                "natural_contractions": ["gonna"],
                "language_overrides": {"en-US": [{"grapheme": "tt", "phoneme": "ɾ"}]},
                "phonetic_rules": [
                    {"name": "ph", "pattern": "ph", "replacement": "f",
                     "priority": 50, "conditions": ["word_initial"]}
                ]
            }"#,
        )
        .unwrap();
        assert!(config.preserve_natural_speech);
        assert_eq!(config.natural_contractions.len(), 1);
        assert!(config.problematic_contractions.contains("gonna"));
        assert_eq!(config.language_overrides["en-US"].len(), 1);
        assert_eq!(config.phonetic_rules[0].priority, 50);
        assert!(config.enable_homographs);
    }

    #[test]
    fn test_contraction_rules_from_json() {
        let config = NormalizerConfig::from_json(
            r#"{"contraction_rules": [
                {"contraction": "'tis", "expansion": "it is", "priority": "high"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.contraction_rules.len(), 1);
        assert_eq!(config.contraction_rules[0].expansion, "it is");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = NormalizerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"enable_stress": false, "cache_capacity": 8}}"#).unwrap();
        let config = NormalizerConfig::load(file.path()).unwrap();
        assert!(!config.enable_stress);
        assert_eq!(config.cache_capacity, 8);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            NormalizerConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(
            NormalizerConfig::load_or_default(Some(&missing)),
            NormalizerConfig::default()
        );

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[1, 2").unwrap();
        assert_eq!(
            NormalizerConfig::load_or_default(Some(&bad)),
            NormalizerConfig::default()
        );
        assert_eq!(NormalizerConfig::load_or_default(None), NormalizerConfig::default());
    }
}
