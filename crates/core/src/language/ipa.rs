//! Text-to-IPA conversion.
//!
//! Stages: normalize, context rules, homographs, grapheme mapping, stress.
//! Every stage is fail-soft; anything a stage cannot handle passes through.

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::tables::RuleTables;

use super::homograph::HomographResolver;
use super::mapping::{is_protection, strip_protection};

pub const PRIMARY_STRESS: char = 'ˈ';
pub const SECONDARY_STRESS: char = 'ˌ';

/// Which optional stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    pub context_rules: bool,
    pub homographs: bool,
    pub stress: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            context_rules: true,
            homographs: true,
            stress: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhoneticMapper {
    tables: Arc<RuleTables>,
    options: MapperOptions,
}

impl PhoneticMapper {
    pub fn new(tables: Arc<RuleTables>, options: MapperOptions) -> Self {
        Self { tables, options }
    }

    pub fn options(&self) -> MapperOptions {
        self.options
    }

    /// Convert text to stress-marked IPA for `language` (e.g. "en-US").
    pub fn to_ipa(&self, text: &str, language: &str) -> String {
        let mut current = normalize(text);
        if current.is_empty() {
            return current;
        }

        if self.options.context_rules {
            current = self.tables.phonetic_rules().apply(&current);
        }
        if self.options.homographs {
            current = HomographResolver::new(self.tables.homographs()).resolve_text(&current);
        }
        current = self.tables.mappings().map(&current, language);
        if self.options.stress {
            current = assign_stress(&current);
        }

        let ipa = strip_protection(&current);
        log::debug!("IPA for {:?} ({}): {:?}", text, language, ipa);
        ipa
    }
}

/// NFC, lower-case, letters and hyphens only, single spaces between words.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfc().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_alphabetic() || c == '-' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    out
}

/// Mark primary stress on every space-separated token of more than one
/// visible character. Tokens already carrying a leading stress mark are kept.
pub fn assign_stress(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            let mut visible = token.chars().filter(|c| !is_protection(*c));
            let first = visible.next();
            let longer_than_one = visible.next().is_some();
            match first {
                Some(PRIMARY_STRESS | SECONDARY_STRESS) => token.to_string(),
                Some(_) if longer_than_one => format!("{PRIMARY_STRESS}{token}"),
                _ => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
