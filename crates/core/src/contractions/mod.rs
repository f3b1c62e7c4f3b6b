//! Contraction resolution.
//!
//! Rewrites contractions to their expanded forms using the priority-ordered
//! rule table, keeping the case pattern of each matched occurrence.

pub mod rules;

use std::sync::Arc;

use regex::Captures;

use crate::tables::RuleTables;
use crate::types::{ContractionChange, ContractionReport, ExpansionMode};

pub use rules::{ContextPattern, ContractionRule, ContractionTable};

/// Contraction engine over a shared, immutable table set.
#[derive(Debug, Clone)]
pub struct ContractionExpander {
    tables: Arc<RuleTables>,
    preserve_natural_speech: bool,
}

impl ContractionExpander {
    pub fn new(tables: Arc<RuleTables>, preserve_natural_speech: bool) -> Self {
        Self {
            tables,
            preserve_natural_speech,
        }
    }

    pub fn preserves_natural_speech(&self) -> bool {
        self.preserve_natural_speech
    }

    /// Expand every known contraction in `text`.
    ///
    /// Unknown contractions are left alone. Running the result through
    /// `expand` again returns it unchanged.
    pub fn expand(&self, text: &str, mode: ExpansionMode) -> String {
        self.expand_with_trace(text, mode).0
    }

    /// Like [`expand`](Self::expand), also returning each rewrite performed.
    pub fn expand_with_trace(
        &self,
        text: &str,
        mode: ExpansionMode,
    ) -> (String, Vec<ContractionChange>) {
        if text.trim().is_empty() {
            return (text.to_string(), Vec::new());
        }

        let mut current = text.to_string();
        let mut changes = Vec::new();

        for compiled in self.tables.contractions().compiled() {
            if !compiled.matcher.is_match(&current) {
                continue;
            }
            if self.preserve_natural_speech && self.tables.is_natural(&compiled.key) {
                log::debug!("Preserving natural contraction {:?}", compiled.key);
                continue;
            }
            if mode == ExpansionMode::PhoneticOnly && !self.tables.is_problematic(&compiled.key) {
                continue;
            }

            let primary = compiled.rule.expansion.as_str();
            let replaced = compiled
                .matcher
                .replace_all(&current, |caps: &Captures| {
                    let matched = &caps[0];
                    let end = caps.get(0).map_or(current.len(), |m| m.end());
                    let expansion = match mode {
                        ExpansionMode::Basic => primary,
                        ExpansionMode::Enhanced | ExpansionMode::PhoneticOnly => compiled
                            .context_expansion(&current[end..])
                            .unwrap_or(primary),
                    };
                    let cased = transfer_case(matched, expansion);
                    log::debug!("Contraction {:?} -> {:?}", matched, cased);
                    changes.push(ContractionChange {
                        original: matched.to_string(),
                        expansion: cased.clone(),
                        priority: compiled.rule.priority,
                    });
                    cased
                })
                .into_owned();
            current = replaced;
        }

        (current, changes)
    }

    /// Report which known contractions occur in `text` without rewriting it.
    ///
    /// Spans are claimed in processing order, so a stacked form such as
    /// "shouldn't've" is not also reported under "shouldn't".
    pub fn analyze(&self, text: &str) -> ContractionReport {
        let mut report = ContractionReport::default();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for compiled in self.tables.contractions().compiled() {
            let spans: Vec<(usize, usize)> = compiled
                .matcher
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .filter(|&(start, end)| claimed.iter().all(|&(s, e)| end <= s || start >= e))
                .collect();
            let count = spans.len();
            if count == 0 {
                continue;
            }
            claimed.extend(spans);
            let key = compiled.key.clone();
            report.occurrences += count;
            if compiled.rule.priority.is_high() {
                report.high_priority.push(key.clone());
            }
            if compiled.rule.is_context_sensitive() {
                report.context_sensitive.push(key.clone());
            }
            if compiled.rule.has_phonetic_guidance() {
                report.phonetic_guidance.push(key.clone());
            }
            if self.tables.is_natural(&key) {
                report.natural.push(key.clone());
            }
            if self.tables.is_problematic(&key) {
                report.problematic.push(key.clone());
            }
            report.found.push(key);
        }

        report
    }
}

/// Give `replacement` the case pattern of `matched`.
///
/// All-caps stays all-caps, a capital first character with nothing else
/// upper-case capitalizes only the first character, anything else comes out
/// lower-case.
pub fn transfer_case(matched: &str, replacement: &str) -> String {
    let mut letters = matched.chars().filter(|c| c.is_alphabetic()).peekable();
    let all_upper = letters.peek().is_some() && letters.all(|c| c.is_uppercase());
    if all_upper {
        return replacement.to_uppercase();
    }

    let lower = replacement.to_lowercase();
    let mut chars = matched.chars();
    let leading_capital = chars.next().is_some_and(char::is_uppercase)
        && !chars.any(char::is_uppercase);
    if !leading_capital {
        return lower;
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::types::Priority;

    fn expander(preserve: bool) -> ContractionExpander {
        ContractionExpander::new(Arc::new(RuleTables::builtin()), preserve)
    }

    fn expander_with(config: NormalizerConfig) -> ContractionExpander {
        let preserve = config.preserve_natural_speech;
        let tables = RuleTables::from_config(&config).unwrap();
        ContractionExpander::new(Arc::new(tables), preserve)
    }

    #[test]
    fn test_transfer_case() {
        assert_eq!(transfer_case("I'M", "i am"), "I AM");
        assert_eq!(transfer_case("I'm", "i am"), "I am");
        assert_eq!(transfer_case("i'm", "I am"), "i am");
        assert_eq!(transfer_case("Won't", "will not"), "Will not");
        assert_eq!(transfer_case("wOn'T", "will not"), "will not");
        assert_eq!(transfer_case("It'S", "it is"), "it is");
    }

    #[test]
    fn test_case_preservation() {
        let e = expander(false);
        assert_eq!(e.expand("I'M HERE", ExpansionMode::Enhanced), "I AM HERE");
        assert_eq!(e.expand("I'm here", ExpansionMode::Enhanced), "I am here");
        assert_eq!(e.expand("i'm here", ExpansionMode::Enhanced), "i am here");
    }

    #[test]
    fn test_end_to_end_sentence() {
        let e = expander(false);
        assert_eq!(
            e.expand("I'm not sure, it's fine.", ExpansionMode::Enhanced),
            "I am not sure, it is fine."
        );
    }

    #[test]
    fn test_context_sensitive_its() {
        let e = expander(false);
        assert_eq!(
            e.expand("it's been a long day", ExpansionMode::Enhanced),
            "it has been a long day"
        );
        assert_eq!(
            e.expand("it's a nice day", ExpansionMode::Enhanced),
            "it is a nice day"
        );
    }

    #[test]
    fn test_context_is_per_occurrence() {
        let e = expander(false);
        assert_eq!(
            e.expand("It's done and it's good", ExpansionMode::Enhanced),
            "It has done and it is good"
        );
    }

    #[test]
    fn test_basic_mode_ignores_context() {
        let e = expander(false);
        assert_eq!(
            e.expand("it's been a long day", ExpansionMode::Basic),
            "it is been a long day"
        );
        assert_eq!(
            e.expand("I'd better go", ExpansionMode::Basic),
            "I would better go"
        );
        assert_eq!(
            e.expand("I'd better go", ExpansionMode::Enhanced),
            "I had better go"
        );
    }

    #[test]
    fn test_phonetic_only_mode_expands_problematic_only() {
        let e = expander_with(NormalizerConfig {
            problematic_contractions: ["would've".to_string()].into_iter().collect(),
            ..NormalizerConfig::default()
        });
        assert_eq!(
            e.expand("I'm sure we would've won", ExpansionMode::PhoneticOnly),
            "I'm sure we would have won"
        );
    }

    #[test]
    fn test_idempotence() {
        let e = expander(false);
        let inputs = [
            "I'm not sure, it's fine.",
            "They'd been there. Y'ALL WON'T BELIEVE IT",
            "shouldn't've gone, gonna stay",
            "",
            "plain text with no contractions",
        ];
        for mode in [
            ExpansionMode::Enhanced,
            ExpansionMode::Basic,
            ExpansionMode::PhoneticOnly,
        ] {
            for input in inputs {
                let once = e.expand(input, mode);
                let twice = e.expand(&once, mode);
                assert_eq!(once, twice, "mode {mode}, input {input:?}");
            }
        }
    }

    #[test]
    fn test_natural_set_overrides_priority() {
        let config = NormalizerConfig {
            natural_contractions: ["gonna".to_string(), "won't".to_string()]
                .into_iter()
                .collect(),
            preserve_natural_speech: true,
            ..NormalizerConfig::default()
        };
        let e = expander_with(config);
        assert_eq!(
            e.expand("I'm gonna say it won't work", ExpansionMode::Enhanced),
            "I am gonna say it won't work"
        );

        let e = expander_with(NormalizerConfig {
            natural_contractions: ["gonna".to_string()].into_iter().collect(),
            preserve_natural_speech: false,
            ..NormalizerConfig::default()
        });
        assert_eq!(
            e.expand("gonna", ExpansionMode::Enhanced),
            "going to"
        );
    }

    #[test]
    fn test_natural_set_applies_in_every_mode() {
        let e = expander_with(NormalizerConfig {
            natural_contractions: ["gonna".to_string(), "won't".to_string()]
                .into_iter()
                .collect(),
            preserve_natural_speech: true,
            ..NormalizerConfig::default()
        });
        assert_eq!(
            e.expand("It won't work, I'm sure", ExpansionMode::Basic),
            "It won't work, I am sure"
        );
        // gonna is in both sets; the natural set wins
        assert_eq!(
            e.expand("gonna stay, wanna go", ExpansionMode::PhoneticOnly),
            "gonna stay, want to go"
        );
    }

    #[test]
    fn test_priority_determinism() {
        // Registered low-priority first; the stacked form must still win.
        let rules = vec![
            ContractionRule::new("shouldn't", "should not").priority(Priority::Medium),
            ContractionRule::new("shouldn't've", "should not have").priority(Priority::Critical),
        ];
        let config = NormalizerConfig {
            contraction_rules: rules,
            ..NormalizerConfig::default()
        };
        let e = expander_with(config);
        assert_eq!(
            e.expand("you shouldn't've", ExpansionMode::Enhanced),
            "you should not have"
        );

        let swapped = NormalizerConfig {
            contraction_rules: vec![
                ContractionRule::new("shouldn't've", "should not have")
                    .priority(Priority::Low),
                ContractionRule::new("shouldn't", "should not").priority(Priority::High),
            ],
            ..NormalizerConfig::default()
        };
        let e = expander_with(swapped);
        assert_eq!(
            e.expand("you shouldn't've", ExpansionMode::Enhanced),
            "you should not've"
        );
    }

    #[test]
    fn test_unknown_contractions_untouched() {
        let e = expander(false);
        assert_eq!(
            e.expand("the dog's bone, ma'am", ExpansionMode::Enhanced),
            "the dog's bone, ma'am"
        );
    }

    #[test]
    fn test_whitespace_input_unchanged() {
        let e = expander(false);
        assert_eq!(e.expand("   \n", ExpansionMode::Enhanced), "   \n");
        assert_eq!(e.expand("", ExpansionMode::Basic), "");
    }

    #[test]
    fn test_typographic_apostrophe() {
        let e = expander(false);
        assert_eq!(
            e.expand("Don’t stop", ExpansionMode::Enhanced),
            "Do not stop"
        );
    }

    #[test]
    fn test_trace_records_changes() {
        let e = expander(false);
        let (text, changes) =
            e.expand_with_trace("I'm sure it's been fine", ExpansionMode::Enhanced);
        assert_eq!(text, "I am sure it has been fine");
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| c.original == "I'm" && c.expansion == "I am"));
        assert!(changes
            .iter()
            .any(|c| c.original == "it's" && c.expansion == "it has"));
    }

    #[test]
    fn test_analyze_does_not_mutate() {
        let config = NormalizerConfig {
            natural_contractions: ["don't".to_string()].into_iter().collect(),
            problematic_contractions: ["would've".to_string()].into_iter().collect(),
            ..NormalizerConfig::default()
        };
        let e = expander_with(config);
        let text = "It's late, don't wait. It's fine, we would've gone.";
        let report = e.analyze(text);
        assert_eq!(report.found, vec!["it's", "would've", "don't"]);
        assert_eq!(report.high_priority, vec!["it's", "would've"]);
        assert_eq!(report.context_sensitive, vec!["it's"]);
        assert_eq!(report.phonetic_guidance, vec!["it's", "would've"]);
        assert_eq!(report.natural, vec!["don't"]);
        assert_eq!(report.problematic, vec!["would've"]);
        assert_eq!(report.occurrences, 4);
    }

    #[test]
    fn test_analyze_stacked_form_counted_once() {
        let e = expander(false);
        let report = e.analyze("you shouldn't've, but shouldn't you?");
        assert_eq!(report.found, vec!["shouldn't've", "shouldn't"]);
        assert_eq!(report.occurrences, 2);

        let report = e.analyze("you shouldn't've");
        assert_eq!(report.found, vec!["shouldn't've"]);
        assert_eq!(report.occurrences, 1);
        assert_eq!(
            e.expand("you shouldn't've", ExpansionMode::Enhanced),
            "you should not have"
        );
    }

    #[test]
    fn test_analyze_empty() {
        let e = expander(false);
        assert!(e.analyze("nothing here").is_empty());
    }
}
