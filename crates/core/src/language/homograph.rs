//! Homograph pronunciation tables and frequency-based resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mapping::protect;

fn full_weight() -> f32 {
    1.0
}

/// One reading of a homograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomographEntry {
    /// IPA without stress marks
    pub pronunciation: String,
    /// Sense label, e.g. "past" or "noun"
    #[serde(default)]
    pub context: String,
    #[serde(default = "full_weight")]
    pub frequency: f32,
}

impl HomographEntry {
    pub fn new(pronunciation: &str, context: &str, frequency: f32) -> Self {
        Self {
            pronunciation: pronunciation.to_string(),
            context: context.to_string(),
            frequency,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HomographTable {
    entries: HashMap<String, Vec<HomographEntry>>,
}

impl HomographTable {
    /// Words are keyed lower-case; words with no readings are dropped.
    pub fn new(entries: impl IntoIterator<Item = (String, Vec<HomographEntry>)>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|(_, readings)| !readings.is_empty())
            .map(|(word, readings)| (word.to_lowercase(), readings))
            .collect();
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_homographs())
    }

    pub fn get(&self, word: &str) -> Option<&[HomographEntry]> {
        self.entries.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Picks a pronunciation for homographs by frequency alone.
#[derive(Debug, Clone, Copy)]
pub struct HomographResolver<'a> {
    table: &'a HomographTable,
}

impl<'a> HomographResolver<'a> {
    pub fn new(table: &'a HomographTable) -> Self {
        Self { table }
    }

    /// Highest-frequency reading; the first listed wins a tie.
    pub fn best_entry(&self, word: &str) -> Option<&'a HomographEntry> {
        let readings = self.table.get(word)?;
        let mut best = readings.first()?;
        for entry in &readings[1..] {
            if entry.frequency > best.frequency {
                best = entry;
            }
        }
        Some(best)
    }

    /// Pronunciation for `word`, or `word` itself when it is not a homograph.
    pub fn resolve(&self, word: &str) -> String {
        match self.best_entry(word) {
            Some(entry) => entry.pronunciation.clone(),
            None => word.to_string(),
        }
    }

    /// Resolve each space-separated token of normalized text. Replaced
    /// tokens are protected from grapheme mapping.
    pub fn resolve_text(&self, text: &str) -> String {
        text.split(' ')
            .map(|token| match self.best_entry(token) {
                Some(entry) => {
                    log::debug!(
                        "Homograph {:?} resolved as {:?} ({})",
                        token,
                        entry.pronunciation,
                        entry.context
                    );
                    protect(&entry.pronunciation)
                }
                None => token.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn builtin_homographs() -> Vec<(String, Vec<HomographEntry>)> {
    let table: &[(&str, &[(&str, &str, f32)])] = &[
        ("read", &[("ɹiːd", "present", 0.6), ("ɹɛd", "past", 0.4)]),
        ("lead", &[("liːd", "guide", 0.6), ("lɛd", "metal", 0.4)]),
        ("live", &[("lɪv", "verb", 0.7), ("laɪv", "adjective", 0.3)]),
        ("wind", &[("wɪnd", "air", 0.7), ("waɪnd", "turn", 0.3)]),
        ("tear", &[("tɪɹ", "crying", 0.5), ("tɛɹ", "rip", 0.5)]),
        ("bass", &[("beɪs", "music", 0.6), ("bæs", "fish", 0.4)]),
        ("bow", &[("baʊ", "bend", 0.5), ("boʊ", "ribbon", 0.5)]),
        ("close", &[("kloʊz", "verb", 0.6), ("kloʊs", "near", 0.4)]),
        ("row", &[("ɹoʊ", "line", 0.7), ("ɹaʊ", "quarrel", 0.3)]),
        ("wound", &[("wuːnd", "injury", 0.6), ("waʊnd", "wrapped", 0.4)]),
        ("minute", &[("mɪnɪt", "time", 0.8), ("maɪnuːt", "tiny", 0.2)]),
        ("object", &[("ɑbdʒɛkt", "noun", 0.6), ("əbdʒɛkt", "verb", 0.4)]),
        ("record", &[("ɹɛkɚd", "noun", 0.6), ("ɹɪkɔɹd", "verb", 0.4)]),
        ("present", &[("pɹɛzənt", "noun", 0.6), ("pɹɪzɛnt", "verb", 0.4)]),
        ("content", &[("kɑntɛnt", "noun", 0.6), ("kəntɛnt", "satisfied", 0.4)]),
        ("desert", &[("dɛzɚt", "arid land", 0.7), ("dɪzɝt", "abandon", 0.3)]),
        ("use", &[("juːz", "verb", 0.6), ("juːs", "noun", 0.4)]),
        ("does", &[("dʌz", "verb", 0.9), ("doʊz", "deer", 0.1)]),
    ];

    table
        .iter()
        .map(|(word, readings)| {
            let entries = readings
                .iter()
                .map(|&(ipa, context, freq)| HomographEntry::new(ipa, context, freq))
                .collect();
            (word.to_string(), entries)
        })
        .collect()
}
