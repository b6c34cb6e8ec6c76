//! The formula step being edited, and the IF-condition builder that inserts into it.
//!
//! Every edit takes the current snapshot by reference and returns the next one.

use crate::error::StepError;
use crate::formula::VariableCatalog;
use crate::metadata::{FieldOption, PicklistEntry};
use serde::{Deserialize, Serialize};
use std::fmt;

const FALLBACK_VARIABLE_NAME: &str = "stepVariable";
const EMPTY_FORMULA_PREVIEW: &str = "No formula yet...";

/// Converts a step label to camelCase: `"Total With GST"` becomes `"totalWithGST"`.
///
/// Returns an empty string for a blank label and `stepVariable` when the label
/// has no usable characters.
pub fn derive_variable_name(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    let name: String = label
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| {
            let word: String = word.chars().filter(char::is_ascii_alphanumeric).collect();
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if index == 0 => first.to_ascii_lowercase().to_string() + chars.as_str(),
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.is_empty() {
        FALLBACK_VARIABLE_NAME.to_string()
    } else {
        name
    }
}

/// One named calculation in a formula pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormulaStep {
    pub step_label: String,
    /// Always derived from `step_label`.
    pub variable_name: String,
    pub formula: String,
    pub description: String,
    pub store_in_field: String,
}

impl FormulaStep {
    pub fn new(label: &str) -> Self {
        Self::default().with_label(label)
    }

    pub fn with_label(&self, label: &str) -> Self {
        Self {
            step_label: label.to_string(),
            variable_name: derive_variable_name(label),
            ..self.clone()
        }
    }

    pub fn with_formula(&self, formula: &str) -> Self {
        Self {
            formula: formula.to_string(),
            ..self.clone()
        }
    }

    /// Appends a field name, variable, digit or inserted IF call to the formula.
    pub fn appending(&self, text: &str) -> Self {
        Self {
            formula: format!("{}{}", self.formula, text),
            ..self.clone()
        }
    }

    /// Appends an operator surrounded by single spaces.
    pub fn with_operator(&self, operator: &str) -> Self {
        self.appending(&format!(" {} ", operator))
    }

    pub fn with_description(&self, description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..self.clone()
        }
    }

    pub fn with_store_in_field(&self, field: &str) -> Self {
        Self {
            store_in_field: field.to_string(),
            ..self.clone()
        }
    }

    /// Empties the formula, keeping label, description and target field.
    pub fn cleared(&self) -> Self {
        self.with_formula("")
    }

    pub fn formula_preview(&self) -> &str {
        if self.formula.is_empty() {
            EMPTY_FORMULA_PREVIEW
        } else {
            &self.formula
        }
    }

    pub fn variable_name_preview(&self) -> &str {
        if self.variable_name.is_empty() {
            FALLBACK_VARIABLE_NAME
        } else {
            &self.variable_name
        }
    }

    pub fn validate_for_save(&self) -> Result<(), StepError> {
        if self.step_label.is_empty() {
            return Err(StepError::MissingLabel);
        }
        if self.formula.is_empty() {
            return Err(StepError::MissingFormula);
        }
        Ok(())
    }
}

/// Comparison operators offered by the IF-condition builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComparisonOperator {
    #[default]
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::LessThan,
        ComparisonOperator::GreaterThanOrEqual,
        ComparisonOperator::LessThanOrEqual,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThanOrEqual => "<=",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "Equal (==)",
            ComparisonOperator::NotEqual => "Not Equal (!=)",
            ComparisonOperator::GreaterThan => "Greater Than (>)",
            ComparisonOperator::LessThan => "Less Than (<)",
            ComparisonOperator::GreaterThanOrEqual => "Greater or Equal (>=)",
            ComparisonOperator::LessThanOrEqual => "Less or Equal (<=)",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The five parts of an `IF(left op right, trueValue, falseValue)` call under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionalExpr {
    pub left_value: String,
    pub operator: ComparisonOperator,
    pub right_value: String,
    pub true_value: String,
    pub false_value: String,
}

impl ConditionalExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_left(&self, value: &str) -> Self {
        Self {
            left_value: value.to_string(),
            ..self.clone()
        }
    }

    pub fn with_operator(&self, operator: ComparisonOperator) -> Self {
        Self {
            operator,
            ..self.clone()
        }
    }

    pub fn with_right(&self, value: &str) -> Self {
        Self {
            right_value: value.to_string(),
            ..self.clone()
        }
    }

    /// Uses a picklist entry as the right operand, quoted as a text literal.
    pub fn with_right_picklist(&self, entry: &PicklistEntry) -> Self {
        self.with_right(&entry.as_formula_operand().value)
    }

    pub fn with_true_value(&self, value: &str) -> Self {
        Self {
            true_value: value.to_string(),
            ..self.clone()
        }
    }

    pub fn with_false_value(&self, value: &str) -> Self {
        Self {
            false_value: value.to_string(),
            ..self.clone()
        }
    }

    pub fn is_complete(&self) -> bool {
        [
            &self.left_value,
            &self.right_value,
            &self.true_value,
            &self.false_value,
        ]
        .iter()
        .all(|part| !part.is_empty())
    }

    pub fn preview(&self) -> Option<String> {
        self.is_complete().then(|| {
            format!(
                "IF({} {} {}, {}, {})",
                self.left_value, self.operator, self.right_value, self.true_value, self.false_value
            )
        })
    }

    /// Appends the finished call to the step's formula.
    pub fn insert_into(&self, step: &FormulaStep) -> Result<FormulaStep, StepError> {
        self.preview()
            .map(|call| step.appending(&call))
            .ok_or(StepError::IncompleteCondition)
    }

    pub fn reset(&self) -> Self {
        Self::default()
    }
}

/// The fields and prior-step variables offered as IF-condition operands.
pub fn condition_field_options(catalog: &VariableCatalog) -> Vec<FieldOption> {
    catalog
        .fields
        .iter()
        .cloned()
        .chain(
            catalog
                .prior_variables
                .iter()
                .map(|v| FieldOption::new(v, v, "")),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names_are_camel_cased() {
        assert_eq!(derive_variable_name("Basic Price"), "basicPrice");
        assert_eq!(derive_variable_name("Total With GST"), "totalWithGST");
        assert_eq!(derive_variable_name("  GST @ 18% "), "gST18");
    }

    #[test]
    fn unusable_labels_fall_back() {
        assert_eq!(derive_variable_name(""), "");
        assert_eq!(derive_variable_name("   "), "stepVariable");
        assert_eq!(derive_variable_name("#$%"), "stepVariable");
    }

    #[test]
    fn label_changes_rederive_the_variable_name() {
        let step = FormulaStep::new("Basic Price").with_label("Net Amount");
        assert_eq!(step.variable_name, "netAmount");
        assert_eq!(FormulaStep::new("").variable_name_preview(), "stepVariable");
    }

    #[test]
    fn operators_are_spaced() {
        let step = FormulaStep::new("Total")
            .appending("price")
            .with_operator("*")
            .appending("2");
        assert_eq!(step.formula, "price * 2");
        assert_eq!(step.cleared().formula_preview(), "No formula yet...");
    }

    #[test]
    fn save_requires_label_and_formula() {
        assert_eq!(
            FormulaStep::default().validate_for_save(),
            Err(StepError::MissingLabel)
        );
        assert_eq!(
            FormulaStep::new("Total").validate_for_save(),
            Err(StepError::MissingFormula)
        );
        assert!(FormulaStep::new("Total").with_formula("1").validate_for_save().is_ok());
    }

    #[test]
    fn incomplete_condition_has_no_preview() {
        let cond = ConditionalExpr::new().with_left("a").with_right("1");
        assert_eq!(cond.preview(), None);
        assert_eq!(
            cond.insert_into(&FormulaStep::new("x")),
            Err(StepError::IncompleteCondition)
        );
    }

    #[test]
    fn complete_condition_inserts_its_call() {
        let cond = ConditionalExpr::new()
            .with_left("Status__c")
            .with_right_picklist(&PicklistEntry {
                label: "Open".to_string(),
                value: "Open".to_string(),
            })
            .with_true_value("1")
            .with_false_value("0");
        let step = cond.insert_into(&FormulaStep::new("Flag")).unwrap();
        assert_eq!(step.formula, r#"IF(Status__c == "Open", 1, 0)"#);
        assert_eq!(cond.reset(), ConditionalExpr::default());
    }

    #[test]
    fn operators_round_trip_through_symbols() {
        for op in ComparisonOperator::ALL {
            assert_eq!(ComparisonOperator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(ComparisonOperator::from_symbol("=<"), None);
    }

    #[test]
    fn condition_options_include_prior_variables() {
        let catalog = VariableCatalog::new(
            vec![FieldOption::new("Basic Price", "Basic_Price__c", "CURRENCY")],
            vec!["gstAmount".to_string()],
        );
        let options = condition_field_options(&catalog);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["Basic_Price__c", "gstAmount"]);
        assert_eq!(options[1].label, "gstAmount");
    }

    #[test]
    fn step_serializes_camel_case() {
        let step = FormulaStep::new("Basic Price").with_formula("a + b");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["variableName"], "basicPrice");
        assert_eq!(json["storeInField"], "");
    }
}
