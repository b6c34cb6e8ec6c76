use crate::ast::EvaluationTrace;

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format an evaluation trace as the expression that was computed, with the
    /// outcome of every parenthesized group shown next to it.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        // Start the recursive formatting with the lowest possible parent precedence.
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &EvaluationTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let mut result = String::new();
        if needs_parens {
            result.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op_symbol,
                left,
                right,
                ..
            } => {
                let left_str = Self::format_recursive(left, current_precedence);

                if !matches!(**right, EvaluationTrace::NotEvaluated) {
                    // Left-associative: a right operand of equal precedence needs parentheses.
                    let right_str = Self::format_recursive(right, current_precedence + 1);
                    result.push_str(&format!("{} {} {}", left_str, op_symbol, right_str));
                } else {
                    // If short-circuited, just show the left side that caused the result.
                    result.push_str(&left_str);
                }
            }
            EvaluationTrace::UnaryOp {
                op_symbol, child, ..
            } => {
                let child_str = Self::format_recursive(child, current_precedence);
                if *op_symbol == "NOT" {
                    result.push_str(&format!("NOT {}", child_str));
                } else {
                    result.push_str(&format!("{}{}", op_symbol, child_str));
                }
            }
            EvaluationTrace::Leaf { source, .. } => result.push_str(source),
            EvaluationTrace::NotEvaluated => {}
        }

        if needs_parens {
            result.push(')');
            if let Some(outcome) = trace.get_outcome() {
                result.push_str(&format!(" [= {}]", outcome));
            }
        }
        result
    }
}
