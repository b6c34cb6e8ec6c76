use super::Value;
use std::fmt;

/// The Abstract Syntax Tree of a closed, IF-free formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
}

/// A wrapper to display an expression as an indented tree.
/// Used by the CLI's `--tree` flag to show how a formula was parsed.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        &self,
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Literal(v) => writeln!(f, "Literal: {}", v)?,
            Expression::Not(v) => {
                writeln!(f, "Not (NOT)")?;
                self.fmt_as_tree(v, f, &child_prefix, true)?;
            }
            Expression::Negate(v) => {
                writeln!(f, "Negate (-)")?;
                self.fmt_as_tree(v, f, &child_prefix, true)?;
            }
            Expression::Sum(l, r) => self.fmt_binary(f, "Sum (+)", l, r, &child_prefix)?,
            Expression::Subtract(l, r) => self.fmt_binary(f, "Subtract (-)", l, r, &child_prefix)?,
            Expression::Multiply(l, r) => self.fmt_binary(f, "Multiply (*)", l, r, &child_prefix)?,
            Expression::Divide(l, r) => self.fmt_binary(f, "Divide (/)", l, r, &child_prefix)?,
            Expression::And(l, r) => self.fmt_binary(f, "And (AND)", l, r, &child_prefix)?,
            Expression::Or(l, r) => self.fmt_binary(f, "Or (OR)", l, r, &child_prefix)?,
            Expression::Equal(l, r) => self.fmt_binary(f, "Equal (==)", l, r, &child_prefix)?,
            Expression::NotEqual(l, r) => {
                self.fmt_binary(f, "NotEqual (!=)", l, r, &child_prefix)?
            }
            Expression::GreaterThan(l, r) => {
                self.fmt_binary(f, "GreaterThan (>)", l, r, &child_prefix)?
            }
            Expression::SmallerThan(l, r) => {
                self.fmt_binary(f, "SmallerThan (<)", l, r, &child_prefix)?
            }
            Expression::GreaterThanOrEqual(l, r) => {
                self.fmt_binary(f, "GreaterThanOrEqual (>=)", l, r, &child_prefix)?
            }
            Expression::SmallerThanOrEqual(l, r) => {
                self.fmt_binary(f, "SmallerThanOrEqual (<=)", l, r, &child_prefix)?
            }
        }
        Ok(())
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        l: &Expression,
        r: &Expression,
        prefix: &str,
    ) -> fmt::Result {
        writeln!(f, "{}", name)?;
        self.fmt_as_tree(l, f, prefix, false)?;
        self.fmt_as_tree(r, f, prefix, true)?;
        Ok(())
    }
}
