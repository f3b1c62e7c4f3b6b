//! Phoneme similarity graph for error-tolerant comparison of IPA strings.

use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    /// Multi-character segments, matched before single characters.
    static ref MULTIGRAPHS: HashSet<&'static str> = [
        "tʃ", "dʒ", "aɪ", "aʊ", "eɪ", "oʊ", "ɔɪ",
    ]
    .into_iter()
    .collect();
}

fn is_stress_mark(c: char) -> bool {
    c == 'ˈ' || c == 'ˌ'
}

fn is_length_mark(c: char) -> bool {
    c == 'ː' || c == 'ˑ'
}

/// Split IPA into segments. Affricates and diphthongs stay whole, length
/// marks attach to the preceding segment; stress marks and separators are
/// dropped.
pub fn segment_ipa(ipa: &str) -> Vec<String> {
    let chars: Vec<char> = ipa
        .chars()
        .filter(|c| !is_stress_mark(*c) && !c.is_whitespace() && *c != '-' && *c != '.')
        .collect();
    let mut segments: Vec<String> = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_length_mark(c) {
            match segments.last_mut() {
                Some(last) => last.push(c),
                None => segments.push(c.to_string()),
            }
            i += 1;
            continue;
        }
        if i + 1 < chars.len() {
            let pair: String = [c, chars[i + 1]].iter().collect();
            if MULTIGRAPHS.contains(pair.as_str()) {
                segments.push(pair);
                i += 2;
                continue;
            }
        }
        segments.push(c.to_string());
        i += 1;
    }

    segments
}

/// Directed adjacency: phoneme -> phonemes it may be confused with.
#[derive(Debug, Clone, Default)]
pub struct PhonemeSimilarityGraph {
    edges: HashMap<String, Vec<String>>,
}

impl PhonemeSimilarityGraph {
    pub fn new(edges: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_similarity())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Phonemes listed as similar to `phoneme`; empty when unknown.
    pub fn similar(&self, phoneme: &str) -> &[String] {
        self.edges
            .get(phoneme)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Equal, or `b` is listed under `a`. Not symmetric unless the table is.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        a == b || self.similar(a).iter().any(|p| p == b)
    }

    /// Positions where `actual` differs from `expected` beyond similarity,
    /// plus any difference in segment count.
    pub fn mismatch_count(&self, expected: &str, actual: &str) -> usize {
        let expected = segment_ipa(expected);
        let actual = segment_ipa(actual);
        let differing = expected
            .iter()
            .zip(&actual)
            .filter(|(e, a)| !self.is_similar(e, a))
            .count();
        differing + expected.len().abs_diff(actual.len())
    }

    /// Same number of segments and every pair equal or similar.
    pub fn fuzzy_match(&self, expected: &str, actual: &str) -> bool {
        self.mismatch_count(expected, actual) == 0
    }
}

pub fn builtin_similarity() -> Vec<(String, Vec<String>)> {
    let table: &[(&str, &[&str])] = &[
        // Vowels
        ("i", &["ɪ", "iː"]),
        ("iː", &["i", "ɪ"]),
        ("ɪ", &["i", "iː", "ə"]),
        ("e", &["ɛ", "eɪ"]),
        ("eɪ", &["e", "ɛ"]),
        ("ɛ", &["e", "æ"]),
        ("æ", &["ɛ", "a"]),
        ("a", &["æ", "ɑ"]),
        ("ɑ", &["ɔ", "a", "ɑː"]),
        ("ɑː", &["ɑ"]),
        ("ɔ", &["ɑ", "ɔː"]),
        ("ɔː", &["ɔ"]),
        ("o", &["oʊ", "ɔ"]),
        ("oʊ", &["o"]),
        ("ʊ", &["u", "uː"]),
        ("u", &["ʊ", "uː"]),
        ("uː", &["u", "ʊ"]),
        ("ʌ", &["ə"]),
        ("ə", &["ʌ", "ɪ"]),
        ("ɚ", &["ɝ", "ə"]),
        ("ɝ", &["ɚ"]),
        // Stops
        ("p", &["b"]),
        ("b", &["p"]),
        ("t", &["d", "ɾ"]),
        ("d", &["t", "ɾ"]),
        ("k", &["ɡ"]),
        ("ɡ", &["k"]),
        // Fricatives and affricates
        ("f", &["v", "θ"]),
        ("v", &["f"]),
        ("θ", &["ð", "f"]),
        ("ð", &["θ"]),
        ("s", &["z"]),
        ("z", &["s"]),
        ("ʃ", &["ʒ"]),
        ("ʒ", &["ʃ"]),
        ("tʃ", &["dʒ"]),
        ("dʒ", &["tʃ"]),
        // Sonorants
        ("m", &["n"]),
        ("n", &["m", "ŋ"]),
        ("ŋ", &["n"]),
        ("l", &["ɫ"]),
        ("ɫ", &["l"]),
        ("ɹ", &["r", "ɾ"]),
        ("r", &["ɹ", "ɾ"]),
        ("ɾ", &["ɹ", "r"]),
    ];

    table
        .iter()
        .map(|(phoneme, similar)| {
            (
                phoneme.to_string(),
                similar.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_ipa_keeps_multigraphs() {
        assert_eq!(segment_ipa("tʃeɪn"), vec!["tʃ", "eɪ", "n"]);
        assert_eq!(segment_ipa("ˈhɛloʊ"), vec!["h", "ɛ", "l", "oʊ"]);
        assert_eq!(segment_ipa("ɹiːd"), vec!["ɹ", "iː", "d"]);
        assert_eq!(segment_ipa("ˈɑ ˈb-c"), vec!["ɑ", "b", "c"]);
        assert!(segment_ipa("").is_empty());
    }

    #[test]
    fn test_similarity_is_directed() {
        let graph = PhonemeSimilarityGraph::builtin();
        assert!(graph.is_similar("t", "ɾ"));
        assert!(!graph.is_similar("ɾ", "t"));
        assert!(graph.is_similar("x", "x"));
        assert!(graph.similar("x").is_empty());
    }

    #[test]
    fn test_fuzzy_match() {
        let graph = PhonemeSimilarityGraph::builtin();
        assert!(graph.fuzzy_match("ˈbʌtɚ", "bʌɾɚ"));
        assert!(graph.fuzzy_match("ˈhɛloʊ", "hɛloʊ"));
        assert!(!graph.fuzzy_match("kæt", "kæ"));
        assert!(!graph.fuzzy_match("kæt", "ʃæt"));
    }

    #[test]
    fn test_mismatch_count() {
        let graph = PhonemeSimilarityGraph::builtin();
        assert_eq!(graph.mismatch_count("kæt", "kæt"), 0);
        assert_eq!(graph.mismatch_count("kæt", "ʃæt"), 1);
        assert_eq!(graph.mismatch_count("kæt", "kæts"), 1);
    }

    #[test]
    fn test_custom_graph() {
        let graph = PhonemeSimilarityGraph::new(vec![(
            "x".to_string(),
            vec!["h".to_string()],
        )]);
        assert_eq!(graph.len(), 1);
        assert!(graph.fuzzy_match("xa", "ha"));
    }
}
