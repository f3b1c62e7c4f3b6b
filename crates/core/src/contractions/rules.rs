//! Contraction rule definitions and the compiled, priority-ordered table.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Priority;

/// Following-text pattern that selects an alternative expansion.
///
/// `pattern` is matched case-insensitively, anchored at the character right
/// after the contraction. `\s+been\b` on `it's` catches "it's been".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPattern {
    pub pattern: String,
    pub expansion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractionRule {
    /// Surface form, e.g. "it's"
    pub contraction: String,
    /// Primary expansion, used when no context pattern matches
    pub expansion: String,
    #[serde(default)]
    pub alternate: Option<String>,
    #[serde(default)]
    pub contexts: Vec<ContextPattern>,
    #[serde(default)]
    pub priority: Priority,
    /// Advisory IPA for the contracted form
    #[serde(default)]
    pub phonetic_hint: Option<String>,
    #[serde(default)]
    pub stress_pattern: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ContractionRule {
    pub fn new(contraction: &str, expansion: &str) -> Self {
        Self {
            contraction: contraction.to_string(),
            expansion: expansion.to_string(),
            alternate: None,
            contexts: Vec::new(),
            priority: Priority::default(),
            phonetic_hint: None,
            stress_pattern: None,
            note: None,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn alternate(mut self, alternate: &str) -> Self {
        self.alternate = Some(alternate.to_string());
        self
    }

    pub fn with_context(mut self, pattern: &str, expansion: &str) -> Self {
        self.contexts.push(ContextPattern {
            pattern: pattern.to_string(),
            expansion: expansion.to_string(),
        });
        self
    }

    pub fn phonetic(mut self, hint: &str, stress: &str) -> Self {
        self.phonetic_hint = Some(hint.to_string());
        self.stress_pattern = Some(stress.to_string());
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Case-insensitive table key. Typographic apostrophes fold to `'`.
    pub fn key(&self) -> String {
        contraction_key(&self.contraction)
    }

    pub fn is_context_sensitive(&self) -> bool {
        !self.contexts.is_empty()
    }

    pub fn has_phonetic_guidance(&self) -> bool {
        self.phonetic_hint.is_some() || self.stress_pattern.is_some()
    }
}

pub fn contraction_key(form: &str) -> String {
    form.trim().to_lowercase().replace('’', "'")
}

/// A rule with its patterns compiled.
#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub rule: ContractionRule,
    pub key: String,
    pub matcher: Regex,
    pub contexts: Vec<(Regex, String)>,
}

impl CompiledRule {
    fn compile(rule: ContractionRule) -> Result<Self, ConfigError> {
        let key = rule.key();
        if key.is_empty() {
            return Err(ConfigError::Empty {
                owner: "contraction rule".to_string(),
                field: "contraction",
            });
        }
        if rule.expansion.trim().is_empty() {
            return Err(ConfigError::Empty {
                owner: format!("contraction {key:?}"),
                field: "expansion",
            });
        }

        let source = surface_pattern(&key);
        let matcher = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::pattern(format!("contraction {key:?}"), &source, e))?;

        let mut contexts = Vec::with_capacity(rule.contexts.len());
        for ctx in &rule.contexts {
            let anchored = format!("^(?:{})", ctx.pattern);
            let re = RegexBuilder::new(&anchored)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ConfigError::pattern(format!("context of {key:?}"), &ctx.pattern, e)
                })?;
            contexts.push((re, ctx.expansion.clone()));
        }

        Ok(Self {
            rule,
            key,
            matcher,
            contexts,
        })
    }

    /// Expansion chosen by the first context pattern matching `following`.
    pub fn context_expansion(&self, following: &str) -> Option<&str> {
        self.contexts
            .iter()
            .find(|(re, _)| re.is_match(following))
            .map(|(_, expansion)| expansion.as_str())
    }
}

/// Boundary-delimited, apostrophe-tolerant pattern for a surface form.
fn surface_pattern(key: &str) -> String {
    let mut pattern = String::new();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    if key.chars().next().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    for c in key.chars() {
        if c == '\'' {
            pattern.push_str("['’]");
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    if key.chars().last().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Contraction rules in processing order: priority descending, then
/// insertion order.
#[derive(Debug)]
pub struct ContractionTable {
    rules: Vec<CompiledRule>,
    index: HashMap<String, usize>,
}

impl ContractionTable {
    /// Compile `rules`. A later rule with an existing key replaces the
    /// earlier one at its original insertion position.
    pub fn new(rules: impl IntoIterator<Item = ContractionRule>) -> Result<Self, ConfigError> {
        let mut ordered: Vec<ContractionRule> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for rule in rules {
            let key = rule.key();
            match seen.get(&key) {
                Some(&i) => ordered[i] = rule,
                None => {
                    seen.insert(key, ordered.len());
                    ordered.push(rule);
                }
            }
        }

        let mut compiled = ordered
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        // sort_by_key is stable, so ties keep insertion order
        compiled.sort_by_key(|r| std::cmp::Reverse(r.rule.priority));

        let index = compiled
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key.clone(), i))
            .collect();

        Ok(Self {
            rules: compiled,
            index,
        })
    }

    pub fn builtin() -> Self {
        Self::new(builtin_rules()).expect("built-in contraction rules compile")
    }

    pub fn get(&self, contraction: &str) -> Option<&ContractionRule> {
        self.index
            .get(&contraction_key(contraction))
            .map(|&i| &self.rules[i].rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &ContractionRule> {
        self.rules.iter().map(|r| &r.rule)
    }

    pub(crate) fn compiled(&self) -> &[CompiledRule] {
        &self.rules
    }
}

const HAS_CONTEXT: &str =
    r"\s+(?:been|got|gotten|had|done|gone|seen|taken|made|come|become|finished|started)\b";
const HAD_CONTEXT: &str =
    r"\s+(?:(?:already|never|just|not)\s+)?(?:been|had|done|gone|seen|taken|made|got|known|left|finished)\b";
const HAD_BETTER: &str = r"\s+better\b";

/// Default English contraction rules.
pub fn builtin_rules() -> Vec<ContractionRule> {
    use Priority::*;

    let mut rules = vec![
        // Stacked contractions must run before their prefixes.
        ContractionRule::new("shouldn't've", "should not have")
            .priority(Critical)
            .phonetic("ʃʊdəntəv", "ˈʃʊd.ənt.əv"),
        ContractionRule::new("couldn't've", "could not have")
            .priority(Critical)
            .phonetic("kʊdəntəv", "ˈkʊd.ənt.əv"),
        ContractionRule::new("wouldn't've", "would not have")
            .priority(Critical)
            .phonetic("wʊdəntəv", "ˈwʊd.ənt.əv"),
        ContractionRule::new("won't", "will not")
            .priority(High)
            .phonetic("woʊnt", "ˈwoʊnt")
            .note("irregular stem"),
        ContractionRule::new("can't", "cannot")
            .priority(High)
            .alternate("can not")
            .phonetic("kænt", "ˈkænt"),
        ContractionRule::new("shan't", "shall not").priority(High),
        ContractionRule::new("ain't", "is not")
            .priority(High)
            .alternate("am not")
            .with_context(r"\s+(?:got|had|been)\b", "has not")
            .note("dialectal"),
        ContractionRule::new("it's", "it is")
            .priority(High)
            .alternate("it has")
            .with_context(HAS_CONTEXT, "it has")
            .phonetic("ɪts", "ˈɪts"),
        ContractionRule::new("i'm", "i am")
            .priority(High)
            .phonetic("aɪm", "ˈaɪm"),
        ContractionRule::new("let's", "let us").priority(High),
        ContractionRule::new("y'all", "you all")
            .priority(High)
            .phonetic("jɔl", "ˈjɔl"),
        ContractionRule::new("would've", "would have")
            .priority(High)
            .phonetic("wʊdəv", "ˈwʊd.əv"),
        ContractionRule::new("should've", "should have")
            .priority(High)
            .phonetic("ʃʊdəv", "ˈʃʊd.əv"),
        ContractionRule::new("could've", "could have")
            .priority(High)
            .phonetic("kʊdəv", "ˈkʊd.əv"),
        ContractionRule::new("might've", "might have").priority(High),
        ContractionRule::new("must've", "must have").priority(High),
    ];

    for (form, expansion) in [
        ("don't", "do not"),
        ("doesn't", "does not"),
        ("didn't", "did not"),
        ("isn't", "is not"),
        ("aren't", "are not"),
        ("wasn't", "was not"),
        ("weren't", "were not"),
        ("haven't", "have not"),
        ("hasn't", "has not"),
        ("hadn't", "had not"),
        ("wouldn't", "would not"),
        ("shouldn't", "should not"),
        ("couldn't", "could not"),
        ("mustn't", "must not"),
        ("needn't", "need not"),
    ] {
        rules.push(ContractionRule::new(form, expansion));
    }

    for subject in ["he", "she", "that", "there", "what", "who", "where", "here", "how"] {
        rules.push(
            ContractionRule::new(&format!("{subject}'s"), &format!("{subject} is"))
                .alternate(&format!("{subject} has"))
                .with_context(HAS_CONTEXT, &format!("{subject} has")),
        );
    }

    for subject in ["i", "you", "he", "she", "we", "they"] {
        rules.push(
            ContractionRule::new(&format!("{subject}'d"), &format!("{subject} would"))
                .alternate(&format!("{subject} had"))
                .with_context(HAD_CONTEXT, &format!("{subject} had"))
                .with_context(HAD_BETTER, &format!("{subject} had")),
        );
    }

    for subject in ["i", "you", "he", "she", "we", "they", "it", "that"] {
        rules.push(ContractionRule::new(
            &format!("{subject}'ll"),
            &format!("{subject} will"),
        ));
    }

    for subject in ["i", "you", "we", "they"] {
        rules.push(ContractionRule::new(
            &format!("{subject}'ve"),
            &format!("{subject} have"),
        ));
    }

    for subject in ["you", "we", "they"] {
        rules.push(ContractionRule::new(
            &format!("{subject}'re"),
            &format!("{subject} are"),
        ));
    }

    for (form, expansion) in [
        ("gonna", "going to"),
        ("wanna", "want to"),
        ("gotta", "got to"),
        ("kinda", "kind of"),
        ("sorta", "sort of"),
        ("lemme", "let me"),
        ("gimme", "give me"),
    ] {
        rules.push(
            ContractionRule::new(form, expansion)
                .priority(Low)
                .note("informal reduction"),
        );
    }

    rules
}
