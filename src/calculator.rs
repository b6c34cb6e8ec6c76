use crate::ast::Value;
use crate::config::EngineConfig;
use crate::error::FormulaError;
use crate::evaluator::Evaluator;
use crate::format::format_value;
use crate::formula::{
    ConditionalRewriter, VariableBinding, VariableCatalog, extract_identifiers, normalize_operators,
    substitute,
};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The outcome of a successful test calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub value: Value,
    pub formatted: String,
    /// The formula after substitution and IF resolution, as it was evaluated.
    pub closed_expression: String,
    pub explanation: String,
}

/// Runs a formula end to end: substitute values, resolve IF calls, evaluate, format.
#[derive(Debug, Clone)]
pub struct Calculator {
    config: EngineConfig,
    evaluator: Evaluator,
    rewriter: ConditionalRewriter,
}

impl Calculator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            evaluator: Evaluator::new(&config),
            rewriter: ConditionalRewriter::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calculate(
        &self,
        formula: &str,
        bindings: &[VariableBinding],
        values: &AHashMap<String, String>,
    ) -> Result<Calculation, FormulaError> {
        let substituted = substitute(formula, bindings, values)?;
        let closed_expression = self.rewriter.rewrite(&substituted)?;
        let evaluation = self.evaluator.evaluate_with_trace(&closed_expression)?;
        let formatted = format_value(&evaluation.value, self.config.digit_grouping);

        tracing::debug!(formula, %closed_expression, %formatted, "calculated formula");
        Ok(Calculation {
            value: evaluation.value,
            formatted,
            closed_expression,
            explanation: evaluation.explanation,
        })
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Snapshot of the test calculator panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorState {
    pub inputs: Vec<VariableBinding>,
    pub values: AHashMap<String, String>,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl CalculatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the input list for `formula`, keeping any values already typed.
    pub fn refreshed(&self, formula: &str, catalog: &VariableCatalog) -> Self {
        let identifiers = extract_identifiers(&normalize_operators(formula));
        Self {
            inputs: catalog.resolve(&identifiers, &self.values),
            ..self.clone()
        }
    }

    pub fn with_value(&self, name: &str, value: &str) -> Self {
        let mut values = self.values.clone();
        values.insert(name.to_string(), value.to_string());
        let inputs = self
            .inputs
            .iter()
            .cloned()
            .map(|mut binding| {
                if binding.name == name {
                    binding.current_value = Some(value.to_string());
                }
                binding
            })
            .collect();
        Self {
            inputs,
            values,
            result: None,
            error: None,
        }
    }

    /// Calculates `formula` with the current inputs, recording either a result or an error.
    pub fn run(&self, calculator: &Calculator, formula: &str) -> Self {
        let (result, error) = if formula.trim().is_empty() {
            (None, Some("No formula to calculate".to_string()))
        } else {
            match calculator.calculate(formula, &self.inputs, &self.values) {
                Ok(calculation) => (Some(calculation.formatted), None),
                Err(e @ FormulaError::MissingInput { .. }) => (None, Some(e.to_string())),
                Err(e) => {
                    tracing::debug!(formula, error = %e, "test calculation failed");
                    (None, Some(format!("Calculation error: {}", e)))
                }
            }
        };
        Self {
            result,
            error,
            ..self.clone()
        }
    }

    pub fn cleared(&self) -> Self {
        Self::default()
    }
}
