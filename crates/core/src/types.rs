use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How deeply the contraction engine processes its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMode {
    /// Context patterns, natural-speech preservation and every known rule.
    #[default]
    Enhanced,
    /// Primary expansions only; context patterns are ignored.
    Basic,
    /// Only contractions known to trip up the synthesizer are expanded.
    PhoneticOnly,
}

impl ExpansionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionMode::Enhanced => "enhanced",
            ExpansionMode::Basic => "basic",
            ExpansionMode::PhoneticOnly => "phonetic_only",
        }
    }
}

impl fmt::Display for ExpansionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpansionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "enhanced" => Ok(ExpansionMode::Enhanced),
            "basic" => Ok(ExpansionMode::Basic),
            "phonetic_only" | "phonetic" => Ok(ExpansionMode::PhoneticOnly),
            other => Err(format!("unknown expansion mode: {other}")),
        }
    }
}

/// Processing tier of a contraction rule. Higher tiers are applied first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Priority {
    pub fn is_high(&self) -> bool {
        *self >= Priority::High
    }
}

/// One contraction occurrence rewritten by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractionChange {
    /// Text as it appeared in the input (original casing)
    pub original: String,
    /// Replacement after case transfer
    pub expansion: String,
    pub priority: Priority,
}

/// Read-only summary of the contractions present in a text.
///
/// All lists hold lower-cased surface forms in rule processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractionReport {
    pub found: Vec<String>,
    pub high_priority: Vec<String>,
    pub context_sensitive: Vec<String>,
    pub phonetic_guidance: Vec<String>,
    pub natural: Vec<String>,
    pub problematic: Vec<String>,
    /// Number of individual occurrences across all found forms
    pub occurrences: usize,
}

impl ContractionReport {
    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

/// Diagnostics for an IPA string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.is_valid, self.errors)
    }
}

/// Output of the full normalization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub original: String,
    /// Text after contraction expansion
    pub expanded: String,
    /// Stress-marked IPA rendering of `expanded`
    pub ipa: String,
    pub language: String,
    pub mode: ExpansionMode,
    pub validation: ValidationReport,
}
