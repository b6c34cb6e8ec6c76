use super::lexer::{TokenKind, tokenize};
use super::tokenizer::{is_numeric_literal, is_reserved_word, normalize_operators};
use crate::error::FormulaError;
use crate::metadata::FieldOption;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Where a formula variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingKind {
    Field,
    PriorStepVariable,
    /// Neither a known field nor an earlier step's variable.
    Unresolved,
}

/// A variable referenced by a formula, with the label shown next to its input box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableBinding {
    pub name: String,
    pub label: String,
    pub kind: BindingKind,
    pub current_value: Option<String>,
}

/// The names a formula may refer to: fields of the record and variables of earlier steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCatalog {
    pub fields: Vec<FieldOption>,
    pub prior_variables: Vec<String>,
}

impl VariableCatalog {
    pub fn new(fields: Vec<FieldOption>, prior_variables: Vec<String>) -> Self {
        Self {
            fields,
            prior_variables,
        }
    }

    /// Builds one binding per identifier, preferring a field's label over a prior-step name.
    pub fn resolve(
        &self,
        identifiers: &[String],
        values: &AHashMap<String, String>,
    ) -> Vec<VariableBinding> {
        identifiers
            .iter()
            .map(|name| {
                let (label, kind) = if let Some(field) = self.fields.iter().find(|f| &f.value == name)
                {
                    (field.label.clone(), BindingKind::Field)
                } else if self.prior_variables.contains(name) {
                    (
                        format!("{} (Previous Step)", name),
                        BindingKind::PriorStepVariable,
                    )
                } else {
                    (name.clone(), BindingKind::Unresolved)
                };
                VariableBinding {
                    name: name.clone(),
                    label,
                    kind,
                    current_value: values.get(name).cloned(),
                }
            })
            .collect()
    }
}

/// Replaces every variable in `formula` with its value, producing a closed expression.
///
/// Only whole identifier tokens are replaced, never substrings or text inside
/// quoted literals. A value that is not a single literal is parenthesized.
pub fn substitute(
    formula: &str,
    bindings: &[VariableBinding],
    values: &AHashMap<String, String>,
) -> Result<String, FormulaError> {
    let mut resolved: AHashMap<&str, String> = AHashMap::with_capacity(bindings.len());
    for binding in bindings {
        let value = values
            .get(&binding.name)
            .or(binding.current_value.as_ref())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FormulaError::MissingInput {
                label: binding.label.clone(),
            })?;
        resolved.insert(binding.name.as_str(), as_substitution(value));
    }

    let normalized = normalize_operators(formula);
    let tokens = tokenize(&normalized)?;
    let mut output = String::with_capacity(normalized.len());
    let mut cursor = 0;
    for token in &tokens {
        if let TokenKind::Ident(name) = &token.kind {
            if let Some(value) = resolved.get(name.as_str()) {
                output.push_str(&normalized[cursor..token.span.start]);
                output.push_str(value);
                cursor = token.span.end;
            }
        }
    }
    output.push_str(&normalized[cursor..]);
    Ok(output)
}

fn as_substitution(value: &str) -> String {
    let single_literal = is_numeric_literal(value) && !value.starts_with(['+', '-'])
        || matches!(
            tokenize(value).as_deref(),
            Ok([token]) if matches!(token.kind, TokenKind::Text(_))
                || matches!(&token.kind, TokenKind::Ident(w) if is_reserved_word(w))
        );
    if single_literal {
        value.to_string()
    } else {
        format!("({})", value)
    }
}
