use super::condition::{FilterCondition, FilterOperator};
use crate::formula::is_numeric_literal;
use itertools::Itertools;

/// Joins the valid conditions into a WHERE-clause body, in list order.
///
/// Returns an empty string when no condition has both a field and a value.
pub fn build_where_clause(conditions: &[FilterCondition]) -> String {
    conditions
        .iter()
        .filter(|c| c.is_valid())
        .map(|c| {
            format!(
                "{} {} {}",
                c.field,
                c.operator.clause_operator(),
                clause_value(c.operator, &c.value)
            )
        })
        .join(" AND ")
}

/// Quotes a condition value unless it is numeric or already starts with a quote.
fn clause_value(operator: FilterOperator, value: &str) -> String {
    if is_numeric_literal(value) {
        return value.trim().to_string();
    }
    if value.starts_with('\'') {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    match operator {
        FilterOperator::Contains => format!("'%{}%'", escaped),
        FilterOperator::StartsWith => format!("'{}%'", escaped),
        _ => format!("'{}'", escaped),
    }
}
