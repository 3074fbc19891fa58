//! Rule-set configuration: which rules run, at which severity.
//!
//! The core never touches the file system; hosts load the TOML and pass
//! the string in.

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed rule-set configuration.
///
/// Keys are rule identifiers:
///
/// ```toml
/// [rules."commandTest.missingCommandTester"]
/// enabled = true
/// severity = "warning"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    /// Per-rule configurations, keyed by rule identifier.
    #[serde(default)]
    pub rules: HashMap<String, RuleOptions>,
}

impl RuleSetConfig {
    /// Creates a configuration with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Whether the rule with the given identifier is enabled.
    #[must_use]
    pub fn is_enabled(&self, identifier: &str) -> bool {
        self.rules
            .get(identifier)
            .map_or(true, |o| o.enabled.unwrap_or(true))
    }

    /// The configured severity override for a rule, if any.
    #[must_use]
    pub fn severity_override(&self, identifier: &str) -> Option<Severity> {
        self.rules.get(identifier).and_then(|o| o.severity)
    }
}

/// Per-rule options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Parse error in the configuration string.
    #[error("failed to parse rule-set config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_everything() {
        let config = RuleSetConfig::default();
        assert!(config.is_enabled("anything.atAll"));
        assert!(config.severity_override("anything.atAll").is_none());
    }

    #[test]
    fn parse_overrides() {
        let toml = r#"
[rules."commandTest.missingCommandTester"]
severity = "warning"

[rules."command.nameFormat"]
enabled = false
"#;
        let config = RuleSetConfig::parse(toml).expect("config must parse");
        assert!(config.is_enabled("commandTest.missingCommandTester"));
        assert_eq!(
            config.severity_override("commandTest.missingCommandTester"),
            Some(Severity::Warning)
        );
        assert!(!config.is_enabled("command.nameFormat"));
    }

    #[test]
    fn parse_rejects_invalid_toml() {
        assert!(matches!(
            RuleSetConfig::parse("rules = ["),
            Err(ConfigError::Parse { .. })
        ));
    }
}
