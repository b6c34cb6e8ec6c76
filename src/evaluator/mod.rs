use crate::ast::{EvaluationTrace, Expression, Value};
use crate::config::{DivisionPolicy, EngineConfig};
use crate::error::FormulaError;
use crate::formula::{normalize_operators, parse_expression};
use crate::trace::TraceFormatter;

mod engine;

use engine::AstEngine;

/// The result of evaluating a closed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    /// A human-readable rendering of what was computed.
    pub explanation: String,
    pub trace: EvaluationTrace,
}

/// Evaluates fully-substituted, IF-free expressions.
///
/// The grammar is fixed: numbers, `true`/`false`, quoted text, parentheses,
/// `+ - * /`, comparisons and `AND`/`OR`/`NOT`. Anything else is rejected
/// with `FormulaError::MalformedExpression` instead of being executed.
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_nesting_depth: usize,
    division_policy: DivisionPolicy,
}

impl Evaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_nesting_depth: config.max_nesting_depth,
            division_policy: config.division_policy,
        }
    }

    /// Parses an expression without evaluating it.
    pub fn parse(&self, expression: &str) -> Result<Expression, FormulaError> {
        let normalized = normalize_operators(expression);
        parse_expression(normalized.trim(), self.max_nesting_depth)
    }

    pub fn evaluate(&self, expression: &str) -> Result<Value, FormulaError> {
        self.evaluate_with_trace(expression).map(|e| e.value)
    }

    pub fn evaluate_with_trace(&self, expression: &str) -> Result<Evaluation, FormulaError> {
        let ast = self.parse(expression)?;
        let trace = AstEngine::new(&ast, self.division_policy).evaluate()?;
        let value = trace
            .get_outcome()
            .cloned()
            .ok_or_else(|| FormulaError::malformed(expression, "expression produced no value"))?;
        let explanation = TraceFormatter::format_trace(&trace);
        tracing::debug!(expression, %value, "evaluated expression");
        Ok(Evaluation {
            value,
            explanation,
            trace,
        })
    }

    /// Evaluates an expression that must produce `true` or `false`.
    pub fn evaluate_condition(&self, condition: &str) -> Result<bool, FormulaError> {
        let invalid = |message: String| FormulaError::InvalidCondition {
            condition: condition.trim().to_string(),
            message,
        };
        match self.evaluate(condition) {
            Ok(value) => value.as_bool().ok_or_else(|| {
                invalid(format!("expected true or false, but found {}", value))
            }),
            Err(e @ FormulaError::EvaluationLimitExceeded { .. }) => Err(e),
            Err(e) => Err(invalid(e.to_string())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
