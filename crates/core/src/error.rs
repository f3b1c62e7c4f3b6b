//! Configuration errors.
//!
//! Nothing in the normalization path itself fails; these only surface while
//! loading configuration or compiling user-supplied rule tables, and callers
//! normally recover from them by falling back to the built-in tables.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pattern {pattern:?} in {owner}")]
    InvalidPattern {
        owner: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty {field} in {owner}")]
    Empty { owner: String, field: &'static str },
}

impl ConfigError {
    pub(crate) fn pattern(owner: impl Into<String>, pattern: &str, source: regex::Error) -> Self {
        ConfigError::InvalidPattern {
            owner: owner.into(),
            pattern: pattern.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_message() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = ConfigError::pattern("contraction \"it's\"", "(unclosed", source);
        let msg = err.to_string();
        assert!(msg.contains("(unclosed"));
        assert!(msg.contains("it's"));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ConfigError = source.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
