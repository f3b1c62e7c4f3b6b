//! End-to-end normalization: expand contractions, convert to IPA, validate.

use std::sync::Arc;

use crate::cache::{cache_key, NormalizationCache};
use crate::config::NormalizerConfig;
use crate::contractions::ContractionExpander;
use crate::error::ConfigError;
use crate::language::{validate, MapperOptions, PhonemeSimilarityGraph, PhoneticMapper};
use crate::tables::RuleTables;
use crate::types::{ContractionReport, ExpansionMode, NormalizedText, ValidationReport};

/// Entry point for callers. Cheap to share across threads.
#[derive(Debug)]
pub struct Normalizer {
    tables: Arc<RuleTables>,
    expander: ContractionExpander,
    mapper: PhoneticMapper,
    cache: NormalizationCache,
}

impl Normalizer {
    /// Build from `config`; fails only if user-supplied rules do not compile.
    pub fn new(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        let tables = Arc::new(RuleTables::from_config(config)?);
        Ok(Self::with_tables(tables, config))
    }

    /// Build from `config`, falling back to the built-in tables on error.
    pub fn new_or_builtin(config: &NormalizerConfig) -> Self {
        Self::with_tables(Arc::new(RuleTables::from_config_or_builtin(config)), config)
    }

    pub fn with_tables(tables: Arc<RuleTables>, config: &NormalizerConfig) -> Self {
        let options = MapperOptions {
            context_rules: config.enable_context_rules,
            homographs: config.enable_homographs,
            stress: config.enable_stress,
        };
        Self {
            expander: ContractionExpander::new(tables.clone(), config.preserve_natural_speech),
            mapper: PhoneticMapper::new(tables.clone(), options),
            cache: NormalizationCache::new(config.cache_capacity),
            tables,
        }
    }

    pub fn builtin() -> Self {
        Self::with_tables(Arc::new(RuleTables::builtin()), &NormalizerConfig::default())
    }

    pub fn tables(&self) -> &Arc<RuleTables> {
        &self.tables
    }

    pub fn similarity(&self) -> &PhonemeSimilarityGraph {
        self.tables.similarity()
    }

    pub fn expand_contractions(&self, text: &str, mode: ExpansionMode) -> String {
        self.expander.expand(text, mode)
    }

    pub fn to_ipa(&self, text: &str, language: &str) -> String {
        self.mapper.to_ipa(text, language)
    }

    pub fn analyze(&self, text: &str) -> ContractionReport {
        self.expander.analyze(text)
    }

    pub fn validate(&self, ipa: &str) -> ValidationReport {
        validate(ipa)
    }

    /// Run the whole pipeline, reusing a cached result when one exists.
    pub fn normalize(&self, text: &str, language: &str, mode: ExpansionMode) -> NormalizedText {
        let key = cache_key(text, language, mode);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let expanded = self.expand_contractions(text, mode);
        let ipa = self.to_ipa(&expanded, language);
        let validation = self.validate(&ipa);
        if !validation.is_valid {
            log::warn!("IPA for {:?} failed validation: {:?}", text, validation.errors);
        }

        let result = NormalizedText {
            original: text.to_string(),
            expanded,
            ipa,
            language: language.to_string(),
            mode,
            validation,
        };
        self.cache.insert(key, result.clone());
        result
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::builtin()
    }
}
