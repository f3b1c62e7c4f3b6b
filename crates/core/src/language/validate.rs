//! IPA string validation.

use std::collections::HashSet;

use crate::types::ValidationReport;

use super::ipa::{PRIMARY_STRESS, SECONDARY_STRESS};

const IPA_SYMBOLS: &str = "æɐɑɒɓʙβɔɕçɗɖðəɘɚɛɜɝɞɟʄɡɠɢʛɦɧħɥʜɨɪʝɭɬɫɮʟɱɯɰŋɳɲɴøɵɸθœɶʘɹɺɾɻʀʁɽʂʃʈʧʤʉʊʋⱱʌɣɤʍχʎʏʑʐʒʔʡʕʢǀǁǂǃ";
const MODIFIERS: &str = "ʰʷʲˠˤⁿˡʼˈˌːˑ";
const SEPARATORS: &str = " -.,|‖";

lazy_static::lazy_static! {
    static ref ALLOWED: HashSet<char> = {
        let mut set: HashSet<char> = ('a'..='z').collect();
        set.extend(IPA_SYMBOLS.chars());
        set.extend(MODIFIERS.chars());
        set.extend(SEPARATORS.chars());
        // combining diacritics (nasalization, syllabicity, tie bar, ...)
        set.extend('\u{0300}'..='\u{036F}');
        set
    };
}

pub const CONSECUTIVE_STRESS: &str = "Consecutive stress markers found";
pub const DANGLING_STRESS: &str = "Dangling stress marker";

fn is_stress(c: char) -> bool {
    c == PRIMARY_STRESS || c == SECONDARY_STRESS
}

pub fn is_allowed(c: char) -> bool {
    ALLOWED.contains(&c)
}

/// Check `ipa` for disallowed characters and misplaced stress marks.
///
/// Each problem kind is reported once; invalid characters once per distinct
/// character, in order of first appearance.
pub fn validate(ipa: &str) -> ValidationReport {
    let chars: Vec<char> = ipa.chars().collect();
    let mut errors = Vec::new();
    let mut seen_invalid = HashSet::new();
    let mut consecutive = false;
    let mut dangling = false;

    for (i, &c) in chars.iter().enumerate() {
        if !is_allowed(c) {
            if seen_invalid.insert(c) {
                errors.push(format!("Invalid IPA character '{c}'"));
            }
            continue;
        }
        if !is_stress(c) {
            continue;
        }
        match chars.get(i + 1) {
            Some(&next) if is_stress(next) => {
                if !consecutive {
                    consecutive = true;
                    errors.push(CONSECUTIVE_STRESS.to_string());
                }
            }
            Some(&next) if !SEPARATORS.contains(next) => {}
            _ => {
                if !dangling {
                    dangling = true;
                    errors.push(DANGLING_STRESS.to_string());
                }
            }
        }
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipa() {
        let report = validate("ˈhɛloʊ ˈwɝld");
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(validate("").is_valid);
        assert!(validate("ˌɪntɚˈnæʃənəl").is_valid);
        assert!(validate("bɑ̃ʒuʁ").is_valid);
    }

    #[test]
    fn test_consecutive_stress() {
        let report = validate("ˈˈhɛloʊ");
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec![CONSECUTIVE_STRESS.to_string()]);
        // reported once even when it happens twice
        assert_eq!(validate("ˈˌa ˈˈb").errors.len(), 1);
    }

    #[test]
    fn test_invalid_characters_reported_once_each() {
        let report = validate("hɛlo1 wɔɹld11!");
        assert_eq!(
            report.errors,
            vec![
                "Invalid IPA character '1'".to_string(),
                "Invalid IPA character '!'".to_string(),
            ]
        );
    }

    #[test]
    fn test_dangling_stress() {
        assert_eq!(validate("hɛloʊˈ").errors, vec![DANGLING_STRESS.to_string()]);
        assert_eq!(validate("ˈ wɔɹld").errors, vec![DANGLING_STRESS.to_string()]);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let input = String::from("ˈˈX");
        let report = validate(&input);
        assert_eq!(input, "ˈˈX");
        assert_eq!(report.errors.len(), 2);
    }
}
