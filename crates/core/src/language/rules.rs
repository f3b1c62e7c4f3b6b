//! Context-sensitive phonetic rewrite rules.
//!
//! Each rule is a regex with an optional `target` group; the rest of the
//! match is context that must be present but is not rewritten. Rules run in
//! descending priority and each one sees the output of the previous one.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::mapping::{is_separator, is_word_end, is_word_start};

fn is_vowel(c: char) -> bool {
    "aeiouàáâäèéêëìíîïòóôöùúûü".contains(c)
}

/// Positional requirement checked against the text the rule is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    WordInitial,
    WordFinal,
    WordMedial,
    /// Vowel immediately before and after the target
    Intervocalic,
    /// Simplified: from the target on, the word holds at least two vowels,
    /// i.e. the target is not in the final syllable.
    UnstressedSyllable,
}

impl RuleCondition {
    /// Whether the condition holds for the span `start..end` of `text`.
    pub fn holds(&self, text: &str, start: usize, end: usize) -> bool {
        match self {
            RuleCondition::WordInitial => is_word_start(text, start),
            RuleCondition::WordFinal => is_word_end(text, end),
            RuleCondition::WordMedial => !is_word_start(text, start) && !is_word_end(text, end),
            RuleCondition::Intervocalic => {
                let before = text[..start].chars().next_back();
                let after = text[end..].chars().next();
                before.is_some_and(is_vowel) && after.is_some_and(is_vowel)
            }
            RuleCondition::UnstressedSyllable => has_following_syllable(&text[start..]),
        }
    }
}

fn has_following_syllable(rest: &str) -> bool {
    rest.chars()
        .take_while(|c| !is_separator(*c))
        .filter(|c| is_vowel(*c))
        .nth(1)
        .is_some()
}

/// Serializable form of a rule, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneticRuleSpec {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
}

impl PhoneticRuleSpec {
    pub fn new(name: &str, pattern: &str, replacement: &str, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            priority,
            conditions: Vec::new(),
        }
    }

    pub fn when(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PhoneticRule {
    spec: PhoneticRuleSpec,
    pattern: Regex,
}

impl PhoneticRule {
    pub fn compile(spec: PhoneticRuleSpec) -> Result<Self, ConfigError> {
        if spec.pattern.is_empty() {
            return Err(ConfigError::Empty {
                owner: format!("phonetic rule {:?}", spec.name),
                field: "pattern",
            });
        }
        let pattern = Regex::new(&spec.pattern).map_err(|e| {
            ConfigError::pattern(format!("phonetic rule {:?}", spec.name), &spec.pattern, e)
        })?;
        Ok(Self { spec, pattern })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn priority(&self) -> u8 {
        self.spec.priority
    }

    pub fn conditions(&self) -> &[RuleCondition] {
        &self.spec.conditions
    }

    /// Rewrite every match whose target satisfies all conditions.
    ///
    /// Only the `target` group is consumed; the context around it stays
    /// available to the next match, so "asasa" with `a(?P<target>s)a`
    /// rewrites both s. Conditions are evaluated against `text` as passed
    /// in, before any of this rule's own rewrites.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;
        let mut fired = 0usize;

        while pos <= text.len() {
            let Some(caps) = self.pattern.captures_at(text, pos) else {
                break;
            };
            let Some(target) = caps.name("target").or_else(|| caps.get(0)) else {
                break;
            };
            let (start, end) = (target.start(), target.end());
            pos = if end > pos {
                end
            } else {
                match text[pos..].chars().next() {
                    Some(c) => pos + c.len_utf8(),
                    None => break,
                }
            };

            if start < last || start == end {
                continue;
            }
            if !self.spec.conditions.iter().all(|c| c.holds(text, start, end)) {
                continue;
            }
            out.push_str(&text[last..start]);
            out.push_str(&self.spec.replacement);
            last = end;
            fired += 1;
        }

        if fired == 0 {
            return text.to_string();
        }
        out.push_str(&text[last..]);
        log::debug!("Phonetic rule {} fired {} time(s)", self.spec.name, fired);
        out
    }
}

/// Compiled rules in processing order.
#[derive(Debug, Clone, Default)]
pub struct PhoneticRuleSet {
    rules: Vec<PhoneticRule>,
}

impl PhoneticRuleSet {
    pub fn new(specs: impl IntoIterator<Item = PhoneticRuleSpec>) -> Result<Self, ConfigError> {
        let mut rules = specs
            .into_iter()
            .map(PhoneticRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        rules.sort_by_key(|r| std::cmp::Reverse(r.priority()));
        Ok(Self { rules })
    }

    pub fn builtin() -> Self {
        Self::new(builtin_phonetic_rules()).expect("built-in phonetic rules compile")
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhoneticRule> {
        self.rules.iter()
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |current, rule| rule.apply(&current))
    }
}

pub fn builtin_phonetic_rules() -> Vec<PhoneticRuleSpec> {
    use RuleCondition::*;

    vec![
        PhoneticRuleSpec::new("tion_suffix", "tion", "ʃən", 90).when(WordFinal),
        PhoneticRuleSpec::new("silent_initial_k", "(?P<target>k)n", "", 80).when(WordInitial),
        PhoneticRuleSpec::new("silent_initial_w", "(?P<target>w)r", "", 80).when(WordInitial),
        PhoneticRuleSpec::new("silent_final_b", "m(?P<target>b)", "", 70).when(WordFinal),
        PhoneticRuleSpec::new("schwa_reduction", "(?P<target>a)", "ə", 10)
            .when(UnstressedSyllable),
    ]
}
