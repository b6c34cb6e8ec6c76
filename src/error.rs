use crate::ast::Value;
use thiserror::Error;

/// Errors that can occur while substituting, rewriting or evaluating a formula.
///
/// Every variant is recoverable and scoped to a single evaluation attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Please enter a value for {label}")]
    MissingInput { label: String },

    #[error("Invalid condition '{condition}': {message}")]
    InvalidCondition { condition: String, message: String },

    #[error("Invalid formula near '{fragment}': {message}")]
    MalformedExpression { fragment: String, message: String },

    #[error("Evaluation limit exceeded: more than {limit} {what}")]
    EvaluationLimitExceeded { limit: usize, what: String },

    #[error("Division by zero in '{expression}'")]
    DivisionByZero { expression: String },

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },
}

impl FormulaError {
    pub(crate) fn malformed(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        FormulaError::MalformedExpression {
            fragment: fragment.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by formula step edits that cannot produce a valid snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Step Label is required")]
    MissingLabel,

    #[error("Formula is required")]
    MissingFormula,

    #[error("Please fill all IF condition fields")]
    IncompleteCondition,
}

/// Errors that can occur while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors reported by an external metadata provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Metadata lookup '{provider}' failed: {message}")]
    Lookup { provider: String, message: String },
}
