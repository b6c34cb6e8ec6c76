use crate::ast::{EvaluationTrace, Expression, Value};
use crate::config::DivisionPolicy;
use crate::error::FormulaError;

// This macro generates a match arm for a binary operation.
macro_rules! eval_op {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, number) => {
        $self.eval_binary($l, $r, $op_str, $op_fn)
    };
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr, bool) => {
        $self.eval_comparison($l, $r, $op_str, $op_fn)
    };
}

/// The core recursive engine for evaluating a single closed AST.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
    division_policy: DivisionPolicy,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression, division_policy: DivisionPolicy) -> Self {
        Self {
            expression,
            division_policy,
        }
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> Result<EvaluationTrace, FormulaError> {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<EvaluationTrace, FormulaError> {
        match expr {
            // --- Arithmetic Operations ---
            Expression::Sum(l, r) => eval_op!(self, l, r, "+", |a, b| a + b, number),
            Expression::Subtract(l, r) => eval_op!(self, l, r, "-", |a, b| a - b, number),
            Expression::Multiply(l, r) => eval_op!(self, l, r, "*", |a, b| a * b, number),
            Expression::Divide(l, r) => {
                let trace = eval_op!(self, l, r, "/", |a, b| a / b, number)?;
                if self.division_policy == DivisionPolicy::Reject {
                    if let EvaluationTrace::BinaryOp { right, .. } = &trace {
                        if matches!(right.get_outcome(), Some(Value::Number(d)) if *d == 0.0) {
                            return Err(FormulaError::DivisionByZero {
                                expression: crate::trace::TraceFormatter::format_trace(&trace),
                            });
                        }
                    }
                }
                Ok(trace)
            }
            Expression::Negate(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = match child_trace.get_outcome() {
                    Some(Value::Number(val)) => Value::Number(-val),
                    val => return Err(self.type_mismatch("-", "Number", val)),
                };
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "-",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => eval_op!(self, l, r, ">", |a, b| a > b, bool),
            Expression::SmallerThan(l, r) => eval_op!(self, l, r, "<", |a, b| a < b, bool),
            Expression::GreaterThanOrEqual(l, r) => eval_op!(self, l, r, ">=", |a, b| a >= b, bool),
            Expression::SmallerThanOrEqual(l, r) => eval_op!(self, l, r, "<=", |a, b| a <= b, bool),

            // --- Equality ---
            // Values of different types are simply unequal, so a picklist text never equals a number.
            Expression::Equal(l, r) => self.eval_equality(l, r, "==", |a, b| a == b),
            Expression::NotEqual(l, r) => self.eval_equality(l, r, "!=", |a, b| a != b),

            // --- Logical Operations  ---
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                match left_trace.get_outcome() {
                    Some(Value::Bool(false)) => {
                        return Ok(EvaluationTrace::BinaryOp {
                            op_symbol: "AND",
                            left: Box::new(left_trace),
                            right: Box::new(EvaluationTrace::NotEvaluated),
                            outcome: Value::Bool(false),
                        });
                    }
                    Some(Value::Bool(true)) => {}
                    other => return Err(self.type_mismatch("AND", "Bool", other)),
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = match right_trace.get_outcome() {
                    Some(Value::Bool(rv)) => Value::Bool(*rv),
                    other => return Err(self.type_mismatch("AND", "Bool", other)),
                };
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "AND",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                match left_trace.get_outcome() {
                    Some(Value::Bool(true)) => {
                        return Ok(EvaluationTrace::BinaryOp {
                            op_symbol: "OR",
                            left: Box::new(left_trace),
                            right: Box::new(EvaluationTrace::NotEvaluated),
                            outcome: Value::Bool(true),
                        });
                    }
                    Some(Value::Bool(false)) => {}
                    other => return Err(self.type_mismatch("OR", "Bool", other)),
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = match right_trace.get_outcome() {
                    Some(Value::Bool(rv)) => Value::Bool(*rv),
                    other => return Err(self.type_mismatch("OR", "Bool", other)),
                };
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "OR",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Not(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = match child_trace.get_outcome() {
                    Some(Value::Bool(val)) => Value::Bool(!val),
                    val => return Err(self.type_mismatch("NOT", "Bool", val)),
                };
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "NOT",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            Expression::Literal(val) => Ok(EvaluationTrace::Leaf {
                source: val.to_string(),
                value: val.clone(),
            }),
        }
    }

    fn eval_binary<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        f: F,
    ) -> Result<EvaluationTrace, FormulaError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let outcome = match (left_trace.get_outcome(), right_trace.get_outcome()) {
            (Some(Value::Number(lv)), Some(Value::Number(rv))) => Value::Number(f(*lv, *rv)),
            (Some(Value::Number(_)), r_val) => return Err(self.type_mismatch(op, "Number", r_val)),
            (l_val, _) => return Err(self.type_mismatch(op, "Number", l_val)),
        };
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }

    fn eval_comparison<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        f: F,
    ) -> Result<EvaluationTrace, FormulaError>
    where
        F: Fn(f64, f64) -> bool,
    {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let outcome = match (left_trace.get_outcome(), right_trace.get_outcome()) {
            (Some(Value::Number(lv)), Some(Value::Number(rv))) => Value::Bool(f(*lv, *rv)),
            (Some(Value::Number(_)), r_val) => return Err(self.type_mismatch(op, "Number", r_val)),
            (l_val, _) => return Err(self.type_mismatch(op, "Number", l_val)),
        };
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }

    fn eval_equality<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        f: F,
    ) -> Result<EvaluationTrace, FormulaError>
    where
        F: Fn(&Value, &Value) -> bool,
    {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let outcome = match (left_trace.get_outcome(), right_trace.get_outcome()) {
            (Some(lv), Some(rv)) => Value::Bool(f(lv, rv)),
            (None, _) | (_, None) => return Err(self.type_mismatch(op, "a value", None)),
        };
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }

    fn type_mismatch(&self, op: &str, expected: &str, found: Option<&Value>) -> FormulaError {
        FormulaError::TypeMismatch {
            operation: op.to_string(),
            expected: expected.to_string(),
            found: found
                .cloned()
                .unwrap_or_else(|| Value::Text("<not evaluated>".to_string())),
        }
    }
}
