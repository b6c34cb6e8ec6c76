//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it overrides:
//!
//! ```json
//! { "division_policy": "ieee754", "digit_grouping": "western" }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// What the evaluator does when a formula divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DivisionPolicy {
    /// Fail with `FormulaError::DivisionByZero`.
    #[default]
    Reject,
    /// Propagate `Infinity`/`NaN` per IEEE-754.
    Ieee754,
}

/// Thousands-separator convention used by the result formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigitGrouping {
    /// en-IN: the last three digits, then groups of two (`12,34,567.89`).
    #[default]
    Indian,
    /// Groups of three (`1,234,567.89`).
    Western,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on IF rewrites per evaluation.
    pub max_rewrite_iterations: usize,
    /// Upper bound on parser nesting (parentheses and unary operators) and on
    /// the height of the parsed expression tree.
    pub max_nesting_depth: usize,
    pub division_policy: DivisionPolicy,
    pub digit_grouping: DigitGrouping,
    /// Used for new attachment rules in "All children" mode.
    pub default_max_child_records: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rewrite_iterations: 64,
            max_nesting_depth: 64,
            division_policy: DivisionPolicy::Reject,
            digit_grouping: DigitGrouping::Indian,
            default_max_child_records: 10,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path, ?config, "loaded engine config");
        Ok(config)
    }
}

pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
    pub fn with_max_rewrite_iterations(mut self, limit: usize) -> Self {
        self.config.max_rewrite_iterations = limit;
        self
    }
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }
    pub fn with_division_policy(mut self, policy: DivisionPolicy) -> Self {
        self.config.division_policy = policy;
        self
    }
    pub fn with_digit_grouping(mut self, grouping: DigitGrouping) -> Self {
        self.config.digit_grouping = grouping;
        self
    }
    pub fn with_default_max_child_records(mut self, max: u32) -> Self {
        self.config.default_max_child_records = max;
        self
    }
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "division_policy": "ieee754" }"#).unwrap();
        assert_eq!(config.division_policy, DivisionPolicy::Ieee754);
        assert_eq!(config.digit_grouping, DigitGrouping::Indian);
        assert_eq!(config.max_rewrite_iterations, 64);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = EngineConfig::from_json_str(r#"{ "division_policy": "ignore" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
