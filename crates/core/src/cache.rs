//! In-memory cache for normalization results.
//!
//! Keys are SHA-256 digests of mode, language and text. The cache is
//! bounded: once full it is cleared before the next insert.

use std::collections::HashMap;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::types::{ExpansionMode, NormalizedText};

/// Compute the cache key for one normalization request.
///
/// Returns a 64-character hex string.
pub fn cache_key(text: &str, language: &str, mode: ExpansionMode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(mode.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(language.to_ascii_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
pub struct NormalizationCache {
    capacity: usize,
    entries: RwLock<HashMap<String, NormalizedText>>,
}

impl NormalizationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, key: &str) -> Option<NormalizedText> {
        let hit = self.entries.read().get(key).cloned();
        if hit.is_some() {
            log::debug!("Cache hit: normalization ({}...)", &key[..12.min(key.len())]);
        }
        hit
    }

    pub fn insert(&self, key: String, value: NormalizedText) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            log::debug!("Normalization cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationReport;

    fn entry(text: &str) -> NormalizedText {
        NormalizedText {
            original: text.to_string(),
            expanded: text.to_string(),
            ipa: String::new(),
            language: "en".to_string(),
            mode: ExpansionMode::Enhanced,
            validation: ValidationReport::from_errors(Vec::new()),
        }
    }

    #[test]
    fn test_cache_key_deterministic() {
        let k1 = cache_key("hello", "en-US", ExpansionMode::Enhanced);
        let k2 = cache_key("hello", "en-us", ExpansionMode::Enhanced);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
    }

    #[test]
    fn test_cache_key_distinguishes_inputs() {
        let base = cache_key("hello", "en", ExpansionMode::Enhanced);
        assert_ne!(base, cache_key("hello", "en", ExpansionMode::Basic));
        assert_ne!(base, cache_key("hello", "fr", ExpansionMode::Enhanced));
        assert_ne!(base, cache_key("hellO", "en", ExpansionMode::Enhanced));
        // field separator keeps "en"+"x" apart from "e"+"nx"
        assert_ne!(
            cache_key("x", "en", ExpansionMode::Basic),
            cache_key("nx", "e", ExpansionMode::Basic)
        );
    }

    #[test]
    fn test_store_and_retrieve() {
        let cache = NormalizationCache::new(4);
        assert!(cache.get("missing").is_none());
        cache.insert("a".to_string(), entry("a"));
        assert_eq!(cache.get("a").map(|e| e.original), Some("a".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cleared_when_full() {
        let cache = NormalizationCache::new(2);
        cache.insert("a".to_string(), entry("a"));
        cache.insert("b".to_string(), entry("b"));
        // overwriting an existing key does not evict
        cache.insert("b".to_string(), entry("b"));
        assert_eq!(cache.len(), 2);
        cache.insert("c".to_string(), entry("c"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache = NormalizationCache::new(0);
        cache.insert("a".to_string(), entry("a"));
        assert!(cache.is_empty());
        cache.clear();
        assert_eq!(cache.capacity(), 0);
    }
}
