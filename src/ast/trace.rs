use super::{Value, precedence};

/// A record of how an expression was evaluated, including intermediate values.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrace {
    BinaryOp {
        op_symbol: &'static str,
        left: Box<EvaluationTrace>,
        right: Box<EvaluationTrace>,
        outcome: Value,
    },
    UnaryOp {
        op_symbol: &'static str,
        child: Box<EvaluationTrace>,
        outcome: Value,
    },
    Leaf {
        source: String,
        value: Value,
    },
    NotEvaluated,
}

impl EvaluationTrace {
    /// The value this node evaluated to. `None` for branches skipped by short-circuiting.
    pub fn get_outcome(&self) -> Option<&Value> {
        match self {
            EvaluationTrace::BinaryOp { outcome, .. } => Some(outcome),
            EvaluationTrace::UnaryOp { outcome, .. } => Some(outcome),
            EvaluationTrace::Leaf { value, .. } => Some(value),
            EvaluationTrace::NotEvaluated => None,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            EvaluationTrace::BinaryOp { op_symbol, .. } => precedence::of_binary(op_symbol),
            EvaluationTrace::UnaryOp { .. } => precedence::UNARY,
            EvaluationTrace::Leaf { .. } | EvaluationTrace::NotEvaluated => precedence::ATOM,
        }
    }
}
