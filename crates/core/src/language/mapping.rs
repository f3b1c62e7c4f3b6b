//! Grapheme-to-phoneme mapping tables.
//!
//! Two layers: per-language override lists (plain replacement, applied in
//! table order) and a general multi-language table scanned left to right
//! with longest-match-first lookup. Replaced spans are wrapped in private-use
//! sentinels so later stages leave them alone.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub(crate) const PROTECT_OPEN: char = '\u{E000}';
pub(crate) const PROTECT_CLOSE: char = '\u{E001}';

pub(crate) fn protect(phonemes: &str) -> String {
    format!("{PROTECT_OPEN}{phonemes}{PROTECT_CLOSE}")
}

pub(crate) fn is_protection(c: char) -> bool {
    c == PROTECT_OPEN || c == PROTECT_CLOSE
}

pub(crate) fn strip_protection(text: &str) -> String {
    text.chars().filter(|c| !is_protection(*c)).collect()
}

/// Apply `f` to every span outside a protected region.
pub(crate) fn map_unprotected(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(PROTECT_OPEN) {
        out.push_str(&f(&rest[..open]));
        let tail = &rest[open..];
        let close = tail
            .find(PROTECT_CLOSE)
            .map_or(tail.len(), |p| p + PROTECT_CLOSE.len_utf8());
        out.push_str(&tail[..close]);
        rest = &tail[close..];
    }
    out.push_str(&f(rest));
    out
}

pub(crate) fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

pub(crate) fn is_word_start(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().map_or(true, is_separator)
}

pub(crate) fn is_word_end(text: &str, at: usize) -> bool {
    text[at..].chars().next().map_or(true, is_separator)
}

/// Primary subtag of a BCP-47 style tag: "en-US" -> "en".
pub fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_ascii_lowercase()
}

/// True when `tag` is `requested` or shares its primary subtag.
pub fn language_matches(tag: &str, requested: &str) -> bool {
    tag.eq_ignore_ascii_case(requested) || primary_subtag(tag) == primary_subtag(requested)
}

fn default_language() -> String {
    "en".to_string()
}

fn full_weight() -> f32 {
    1.0
}

/// A grapheme-to-phoneme correspondence.
///
/// Contexts constrain the characters immediately around the grapheme. An
/// empty context matches anything; `#` matches a word boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticMapping {
    pub grapheme: String,
    pub phoneme: String,
    #[serde(default)]
    pub left_context: String,
    #[serde(default)]
    pub right_context: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Usage likelihood, 0-1
    #[serde(default = "full_weight")]
    pub frequency: f32,
    /// Mapping reliability, 0-1
    #[serde(default = "full_weight")]
    pub confidence: f32,
}

impl PhoneticMapping {
    pub fn new(grapheme: &str, phoneme: &str, language: &str) -> Self {
        Self {
            grapheme: grapheme.to_string(),
            phoneme: phoneme.to_string(),
            left_context: String::new(),
            right_context: String::new(),
            language: language.to_string(),
            frequency: 1.0,
            confidence: 1.0,
        }
    }

    pub fn context(mut self, left: &str, right: &str) -> Self {
        self.left_context = left.to_string();
        self.right_context = right.to_string();
        self
    }

    pub fn weights(mut self, frequency: f32, confidence: f32) -> Self {
        self.frequency = frequency;
        self.confidence = confidence;
        self.clamped()
    }

    /// Force both weights into [0, 1]. NaN becomes 0.
    pub fn clamped(mut self) -> Self {
        self.frequency = clamp_unit(self.frequency);
        self.confidence = clamp_unit(self.confidence);
        self
    }

    pub fn weight(&self) -> f32 {
        self.frequency * self.confidence
    }

    pub fn has_context(&self) -> bool {
        !self.left_context.is_empty() || !self.right_context.is_empty()
    }

    fn context_matches(&self, text: &str, start: usize, end: usize) -> bool {
        let left = match self.left_context.as_str() {
            "" => true,
            "#" => is_word_start(text, start),
            ctx => text[..start].ends_with(ctx),
        };
        let right = match self.right_context.as_str() {
            "" => true,
            "#" => is_word_end(text, end),
            ctx => text[end..].starts_with(ctx),
        };
        left && right
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Exact replacement applied before the general table for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphemeOverride {
    pub grapheme: String,
    pub phoneme: String,
}

impl GraphemeOverride {
    pub fn new(grapheme: &str, phoneme: &str) -> Self {
        Self {
            grapheme: grapheme.to_string(),
            phoneme: phoneme.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct MappingTable {
    mappings: Vec<PhoneticMapping>,
    overrides: HashMap<String, Vec<GraphemeOverride>>,
    /// Per-language candidate indexes, keyed by lower-cased tag
    indexes: RwLock<HashMap<String, Arc<LanguageIndex>>>,
}

impl MappingTable {
    /// Build the table and precompute the index for every language the
    /// mappings are tagged with.
    pub fn new(
        mappings: impl IntoIterator<Item = PhoneticMapping>,
        overrides: HashMap<String, Vec<GraphemeOverride>>,
    ) -> Self {
        let mappings: Vec<PhoneticMapping> = mappings
            .into_iter()
            .filter(|m| !m.grapheme.is_empty())
            .map(PhoneticMapping::clamped)
            .collect();
        let overrides = overrides
            .into_iter()
            .map(|(tag, list)| {
                let list = list.into_iter().filter(|o| !o.grapheme.is_empty()).collect();
                (tag.to_ascii_lowercase(), list)
            })
            .collect();

        let mut indexes = HashMap::new();
        for mapping in &mappings {
            let tag = mapping.language.to_ascii_lowercase();
            if !indexes.contains_key(&tag) {
                let index = Arc::new(LanguageIndex::build(&mappings, &tag));
                indexes.insert(tag, index);
            }
        }

        Self {
            mappings,
            overrides,
            indexes: RwLock::new(indexes),
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_mappings(), builtin_overrides())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> &[PhoneticMapping] {
        &self.mappings
    }

    /// Override list for `language`: exact tag first, then its primary subtag.
    pub fn overrides_for(&self, language: &str) -> &[GraphemeOverride] {
        self.overrides
            .get(&language.to_ascii_lowercase())
            .or_else(|| self.overrides.get(&primary_subtag(language)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Candidate index for one language, built on first use for tags no
    /// mapping carries (e.g. "en-US" when the table only has "en").
    pub fn for_language(&self, language: &str) -> LanguageMappings<'_> {
        let tag = language.to_ascii_lowercase();
        if let Some(index) = self.indexes.read().get(&tag) {
            return LanguageMappings {
                mappings: &self.mappings,
                index: Arc::clone(index),
            };
        }

        let index = Arc::clone(
            self.indexes
                .write()
                .entry(tag)
                .or_insert_with_key(|tag| Arc::new(LanguageIndex::build(&self.mappings, tag))),
        );
        LanguageMappings {
            mappings: &self.mappings,
            index,
        }
    }

    /// Overrides then general table, as one stage.
    pub fn map(&self, text: &str, language: &str) -> String {
        let mut current = text.to_string();
        for o in self.overrides_for(language) {
            let replacement = protect(&o.phoneme);
            current = map_unprotected(&current, |span| span.replace(&o.grapheme, &replacement));
        }
        self.for_language(language).map_text(&current)
    }

    #[cfg(test)]
    fn indexed_languages(&self) -> usize {
        self.indexes.read().len()
    }
}

/// Mapping positions by first character, in lookup order.
#[derive(Debug, Default)]
struct LanguageIndex {
    by_first: HashMap<char, Vec<usize>>,
}

impl LanguageIndex {
    /// `language` must be lower-cased.
    fn build(mappings: &[PhoneticMapping], language: &str) -> Self {
        let mut by_first: HashMap<char, Vec<usize>> = HashMap::new();
        for (i, mapping) in mappings.iter().enumerate() {
            if !language_matches(&mapping.language, language) {
                continue;
            }
            if let Some(first) = mapping.grapheme.chars().next() {
                by_first.entry(first).or_default().push(i);
            }
        }

        // Longest grapheme, then context-constrained, then exact tag, then weight.
        for candidates in by_first.values_mut() {
            candidates.sort_by(|&a, &b| {
                let (a, b) = (&mappings[a], &mappings[b]);
                b.grapheme
                    .chars()
                    .count()
                    .cmp(&a.grapheme.chars().count())
                    .then(b.has_context().cmp(&a.has_context()))
                    .then(
                        b.language
                            .eq_ignore_ascii_case(language)
                            .cmp(&a.language.eq_ignore_ascii_case(language)),
                    )
                    .then(b.weight().total_cmp(&a.weight()))
            });
        }

        Self { by_first }
    }
}

/// Mappings for one language, indexed by first character.
#[derive(Debug)]
pub struct LanguageMappings<'a> {
    mappings: &'a [PhoneticMapping],
    index: Arc<LanguageIndex>,
}

impl LanguageMappings<'_> {
    /// Single left-to-right pass. Characters with no mapping pass through;
    /// protected spans are copied verbatim.
    pub fn map_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        let mut i = 0;

        while let Some(c) = text[i..].chars().next() {
            if c == PROTECT_OPEN {
                let tail = &text[i..];
                let close = tail
                    .find(PROTECT_CLOSE)
                    .map_or(tail.len(), |p| p + PROTECT_CLOSE.len_utf8());
                out.push_str(&tail[..close]);
                i += close;
                continue;
            }

            let rest = &text[i..];
            let hit = self.index.by_first.get(&c).and_then(|candidates| {
                candidates.iter().map(|&k| &self.mappings[k]).find(|m| {
                    rest.starts_with(&m.grapheme)
                        && m.context_matches(text, i, i + m.grapheme.len())
                })
            });

            match hit {
                Some(m) => {
                    out.push_str(&m.phoneme);
                    i += m.grapheme.len();
                }
                None => {
                    out.push(c);
                    i += c.len_utf8();
                }
            }
        }

        out
    }
}

// (grapheme, phoneme, left context, right context, frequency, confidence)
type Row = (&'static str, &'static str, &'static str, &'static str, f32, f32);

const ENGLISH: &[Row] = &[
    ("igh", "aɪ", "", "", 0.9, 0.9),
    ("tch", "tʃ", "", "", 0.9, 0.95),
    ("dge", "dʒ", "", "", 0.9, 0.95),
    ("th", "θ", "", "", 0.6, 0.8),
    ("sh", "ʃ", "", "", 0.95, 0.95),
    ("ch", "tʃ", "", "", 0.8, 0.85),
    ("ng", "ŋ", "", "", 0.8, 0.9),
    ("ck", "k", "", "", 0.95, 0.95),
    ("wh", "w", "", "", 0.9, 0.9),
    ("qu", "kw", "", "", 0.9, 0.9),
    ("ph", "f", "", "", 0.95, 0.95),
    ("ee", "iː", "", "", 0.9, 0.9),
    ("ea", "iː", "", "", 0.6, 0.7),
    ("oo", "uː", "", "", 0.7, 0.8),
    ("ou", "aʊ", "", "", 0.5, 0.6),
    ("ow", "oʊ", "", "", 0.5, 0.6),
    ("ai", "eɪ", "", "", 0.85, 0.9),
    ("ay", "eɪ", "", "", 0.9, 0.9),
    ("oi", "ɔɪ", "", "", 0.9, 0.9),
    ("oy", "ɔɪ", "", "", 0.9, 0.9),
    ("ll", "l", "", "", 0.95, 0.95),
    ("ss", "s", "", "", 0.95, 0.95),
    ("ar", "ɑɹ", "", "", 0.7, 0.8),
    ("or", "ɔɹ", "", "", 0.7, 0.8),
    ("er", "ɚ", "", "", 0.7, 0.8),
    ("ir", "ɝ", "", "", 0.7, 0.8),
    ("ur", "ɝ", "", "", 0.7, 0.8),
    ("a", "æ", "", "", 0.5, 0.6),
    ("b", "b", "", "", 1.0, 1.0),
    ("c", "s", "", "e", 0.9, 0.9),
    ("c", "s", "", "i", 0.9, 0.9),
    ("c", "s", "", "y", 0.9, 0.9),
    ("c", "k", "", "", 0.8, 0.9),
    ("d", "d", "", "", 1.0, 1.0),
    ("e", "ɛ", "", "", 0.5, 0.6),
    ("f", "f", "", "", 1.0, 1.0),
    ("g", "ɡ", "", "", 0.8, 0.8),
    ("h", "h", "", "", 0.9, 0.9),
    ("i", "ɪ", "", "", 0.6, 0.7),
    ("j", "dʒ", "", "", 0.95, 0.95),
    ("k", "k", "", "", 1.0, 1.0),
    ("l", "l", "", "", 1.0, 1.0),
    ("m", "m", "", "", 1.0, 1.0),
    ("n", "n", "", "", 1.0, 1.0),
    ("o", "oʊ", "", "#", 0.6, 0.7),
    ("o", "ɑ", "", "", 0.5, 0.6),
    ("p", "p", "", "", 1.0, 1.0),
    ("q", "k", "", "", 0.9, 0.9),
    ("r", "ɹ", "", "", 0.95, 0.95),
    ("s", "s", "", "", 0.9, 0.9),
    ("t", "t", "", "", 1.0, 1.0),
    ("u", "ʌ", "", "", 0.5, 0.6),
    ("v", "v", "", "", 1.0, 1.0),
    ("w", "w", "", "", 1.0, 1.0),
    ("x", "ks", "", "", 0.9, 0.9),
    ("y", "i", "", "#", 0.7, 0.8),
    ("y", "j", "", "", 0.8, 0.8),
    ("z", "z", "", "", 1.0, 1.0),
];

const FRENCH: &[Row] = &[
    ("eau", "o", "", "", 0.95, 0.95),
    ("ou", "u", "", "", 0.95, 0.95),
    ("oi", "wa", "", "", 0.95, 0.95),
    ("ch", "ʃ", "", "", 0.9, 0.9),
    ("gn", "ɲ", "", "", 0.9, 0.9),
    ("qu", "k", "", "", 0.9, 0.9),
    ("ç", "s", "", "", 1.0, 1.0),
    ("é", "e", "", "", 1.0, 1.0),
    ("è", "ɛ", "", "", 1.0, 1.0),
    ("ê", "ɛ", "", "", 1.0, 1.0),
    ("e", "ə", "", "", 0.6, 0.7),
    ("j", "ʒ", "", "", 0.95, 0.95),
    ("r", "ʁ", "", "", 0.95, 0.95),
    ("u", "y", "", "", 0.9, 0.9),
];

const SPANISH: &[Row] = &[
    ("ll", "ʎ", "", "", 0.8, 0.8),
    ("rr", "r", "", "", 1.0, 1.0),
    ("ch", "tʃ", "", "", 1.0, 1.0),
    ("qu", "k", "", "", 1.0, 1.0),
    ("ñ", "ɲ", "", "", 1.0, 1.0),
    ("á", "a", "", "", 1.0, 1.0),
    ("é", "e", "", "", 1.0, 1.0),
    ("í", "i", "", "", 1.0, 1.0),
    ("ó", "o", "", "", 1.0, 1.0),
    ("ú", "u", "", "", 1.0, 1.0),
    ("j", "x", "", "", 0.95, 0.95),
    ("z", "θ", "", "", 0.7, 0.8),
    ("v", "b", "", "", 0.9, 0.9),
    ("h", "", "", "", 0.95, 0.95),
    ("r", "ɾ", "", "", 0.8, 0.8),
];

fn rows<'a>(language: &str, rows: &'a [Row]) -> impl Iterator<Item = PhoneticMapping> + 'a {
    let language = language.to_string();
    rows.iter().map(move |&(g, p, left, right, freq, conf)| {
        PhoneticMapping::new(g, p, &language)
            .context(left, right)
            .weights(freq, conf)
    })
}

pub fn builtin_mappings() -> Vec<PhoneticMapping> {
    rows("en", ENGLISH)
        .chain(rows("fr", FRENCH))
        .chain(rows("es", SPANISH))
        .collect()
}

pub fn builtin_overrides() -> HashMap<String, Vec<GraphemeOverride>> {
    let mut overrides = HashMap::new();
    overrides.insert("en-us".to_string(), vec![GraphemeOverride::new("tt", "ɾ")]);
    overrides.insert(
        "en-gb".to_string(),
        vec![
            GraphemeOverride::new("ar", "ɑː"),
            GraphemeOverride::new("or", "ɔː"),
        ],
    );
    overrides
}
