//! The immutable rule-table set shared by every engine.
//!
//! Built once, from the built-in tables plus whatever the configuration
//! adds, and handed around as `Arc<RuleTables>`. Reloading means building a
//! new set and swapping the `Arc`.

use std::collections::{HashMap, HashSet};

use crate::config::NormalizerConfig;
use crate::contractions::rules::{builtin_rules, contraction_key};
use crate::contractions::ContractionTable;
use crate::error::ConfigError;
use crate::language::homograph::builtin_homographs;
use crate::language::mapping::{builtin_mappings, builtin_overrides};
use crate::language::rules::builtin_phonetic_rules;
use crate::language::similarity::builtin_similarity;
use crate::language::{HomographTable, MappingTable, PhonemeSimilarityGraph, PhoneticRuleSet};

#[derive(Debug)]
pub struct RuleTables {
    contractions: ContractionTable,
    natural: HashSet<String>,
    problematic: HashSet<String>,
    mappings: MappingTable,
    phonetic_rules: PhoneticRuleSet,
    homographs: HomographTable,
    similarity: PhonemeSimilarityGraph,
}

impl RuleTables {
    /// Built-in tables with the default natural and problematic sets.
    pub fn builtin() -> Self {
        let defaults = NormalizerConfig::default();
        Self {
            contractions: ContractionTable::builtin(),
            natural: key_set(&defaults.natural_contractions),
            problematic: key_set(&defaults.problematic_contractions),
            mappings: MappingTable::builtin(),
            phonetic_rules: PhoneticRuleSet::builtin(),
            homographs: HomographTable::builtin(),
            similarity: PhonemeSimilarityGraph::builtin(),
        }
    }

    /// Built-in tables extended by `config`. Entries in the config replace
    /// built-in entries with the same key (contraction, language tag, word
    /// or phoneme); phonetic mappings and rules are appended.
    pub fn from_config(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        let contractions = config_contractions(config)?;
        let phonetic_rules = config_phonetic_rules(config)?;
        Ok(Self::assemble(config, contractions, phonetic_rules))
    }

    /// Like [`from_config`](Self::from_config), but a rule table that fails
    /// to compile is replaced by its built-in version. Everything else in
    /// `config`, including the natural and problematic sets, is kept.
    pub fn from_config_or_builtin(config: &NormalizerConfig) -> Self {
        let contractions = config_contractions(config).unwrap_or_else(|e| {
            log::warn!("Invalid contraction rules ({e}); using built-in contraction table");
            ContractionTable::builtin()
        });
        let phonetic_rules = config_phonetic_rules(config).unwrap_or_else(|e| {
            log::warn!("Invalid phonetic rules ({e}); using built-in phonetic rules");
            PhoneticRuleSet::builtin()
        });
        Self::assemble(config, contractions, phonetic_rules)
    }

    fn assemble(
        config: &NormalizerConfig,
        contractions: ContractionTable,
        phonetic_rules: PhoneticRuleSet,
    ) -> Self {
        let mut overrides = builtin_overrides();
        for (tag, list) in &config.language_overrides {
            overrides.insert(tag.to_ascii_lowercase(), list.clone());
        }
        let mappings = MappingTable::new(
            builtin_mappings()
                .into_iter()
                .chain(config.phonetic_mappings.iter().cloned()),
            overrides,
        );

        let mut homographs: HashMap<String, _> = builtin_homographs().into_iter().collect();
        for (word, entries) in &config.homographs {
            homographs.insert(word.to_lowercase(), entries.clone());
        }

        let mut similarity: HashMap<String, _> = builtin_similarity().into_iter().collect();
        for (phoneme, similar) in &config.phoneme_similarity {
            similarity.insert(phoneme.clone(), similar.clone());
        }

        let tables = Self {
            contractions,
            natural: key_set(&config.natural_contractions),
            problematic: key_set(&config.problematic_contractions),
            mappings,
            phonetic_rules,
            homographs: HomographTable::new(homographs),
            similarity: PhonemeSimilarityGraph::new(similarity),
        };
        log::debug!(
            "Rule tables: {} contractions, {} mappings, {} phonetic rules, {} homographs",
            tables.contractions.len(),
            tables.mappings.len(),
            tables.phonetic_rules.len(),
            tables.homographs.len()
        );
        tables
    }

    pub fn contractions(&self) -> &ContractionTable {
        &self.contractions
    }

    /// `key` must already be folded with `contraction_key`.
    pub fn is_natural(&self, key: &str) -> bool {
        self.natural.contains(key)
    }

    pub fn is_problematic(&self, key: &str) -> bool {
        self.problematic.contains(key)
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    pub fn phonetic_rules(&self) -> &PhoneticRuleSet {
        &self.phonetic_rules
    }

    pub fn homographs(&self) -> &HomographTable {
        &self.homographs
    }

    pub fn similarity(&self) -> &PhonemeSimilarityGraph {
        &self.similarity
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn config_contractions(config: &NormalizerConfig) -> Result<ContractionTable, ConfigError> {
    ContractionTable::new(
        builtin_rules()
            .into_iter()
            .chain(config.contraction_rules.iter().cloned()),
    )
}

fn config_phonetic_rules(config: &NormalizerConfig) -> Result<PhoneticRuleSet, ConfigError> {
    PhoneticRuleSet::new(
        builtin_phonetic_rules()
            .into_iter()
            .chain(config.phonetic_rules.iter().cloned()),
    )
}

fn key_set<'a>(forms: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    forms.into_iter().map(|f| contraction_key(f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::contractions::{ContractionExpander, ContractionRule};
    use crate::types::ExpansionMode;
    use crate::language::{HomographEntry, PhoneticRuleSpec};

    #[test]
    fn test_builtin_tables() {
        let tables = RuleTables::builtin();
        assert!(tables.contractions().get("won't").is_some());
        assert!(tables.is_natural("don't"));
        assert!(tables.is_problematic("would've"));
        assert!(!tables.is_problematic("don't"));
        assert!(tables.homographs().contains("read"));
        assert!(!tables.similarity().is_empty());
    }

    #[test]
    fn test_config_sets_are_folded() {
        let config = NormalizerConfig {
            natural_contractions: ["DON’T".to_string()].into_iter().collect(),
            ..NormalizerConfig::default()
        };
        let tables = RuleTables::from_config(&config).unwrap();
        assert!(tables.is_natural("don't"));
        assert!(!tables.is_natural("can't"));
    }

    #[test]
    fn test_config_extends_and_replaces() {
        let mut config = NormalizerConfig::default();
        config
            .contraction_rules
            .push(ContractionRule::new("'tis", "it is"));
        config
            .contraction_rules
            .push(ContractionRule::new("can't", "can not"));
        config.homographs.insert(
            "Read".to_string(),
            vec![HomographEntry::new("ɹɛd", "past", 1.0)],
        );
        let tables = RuleTables::from_config(&config).unwrap();
        let builtin = RuleTables::builtin();

        assert_eq!(tables.contractions().len(), builtin.contractions().len() + 1);
        assert_eq!(
            tables.contractions().get("can't").map(|r| r.expansion.as_str()),
            Some("can not")
        );
        assert_eq!(tables.homographs().get("read").map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_bad_rule_falls_back_to_builtin() {
        let mut config = NormalizerConfig::default();
        config
            .phonetic_rules
            .push(PhoneticRuleSpec::new("broken", "(unclosed", "x", 1));
        assert!(RuleTables::from_config(&config).is_err());

        let tables = RuleTables::from_config_or_builtin(&config);
        assert_eq!(
            tables.phonetic_rules().len(),
            RuleTables::builtin().phonetic_rules().len()
        );
    }

    #[test]
    fn test_fallback_keeps_valid_config_parts() {
        let mut config = NormalizerConfig {
            natural_contractions: ["gonna".to_string()].into_iter().collect(),
            preserve_natural_speech: true,
            ..NormalizerConfig::default()
        };
        config
            .phonetic_rules
            .push(PhoneticRuleSpec::new("broken", "(", "x", 1));
        config
            .contraction_rules
            .push(ContractionRule::new("'tis", "it is"));
        config.homographs.insert(
            "dove".to_string(),
            vec![HomographEntry::new("dʌv", "bird", 1.0)],
        );

        let tables = RuleTables::from_config_or_builtin(&config);
        assert!(tables.is_natural("gonna"));
        assert!(!tables.is_natural("don't"));
        assert!(tables.contractions().get("'tis").is_some());
        assert!(tables.homographs().contains("dove"));

        let expander = ContractionExpander::new(Arc::new(tables), config.preserve_natural_speech);
        assert_eq!(
            expander.expand("don't go, gonna stay", ExpansionMode::Enhanced),
            "do not go, gonna stay"
        );
    }
}
