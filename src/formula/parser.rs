use super::lexer::{Token, TokenKind, tokenize};
use crate::ast::{Expression, Value, precedence};
use crate::error::FormulaError;

type BinaryBuilder = fn(Box<Expression>, Box<Expression>) -> Expression;

/// Parses a closed, IF-free and ASCII-normalized expression into an AST.
///
/// Precedence, lowest first: `OR`/`||`, `AND`/`&&`, `==` `!=`, `>` `<` `>=` `<=`,
/// `+` `-`, `*` `/`, then the unary operators `-` `+` `NOT` `!`. Binary operators
/// are left-associative.
///
/// `max_depth` bounds both parenthesis nesting and the height of the resulting
/// tree, so a long flat chain such as `1 + 1 + ... + 1` is rejected with
/// `EvaluationLimitExceeded` instead of overflowing the evaluator's stack.
pub fn parse_expression(src: &str, max_depth: usize) -> Result<Expression, FormulaError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(FormulaError::malformed(src, "expression is empty"));
    }
    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let (expr, _) = parser.expression(0)?;
    if parser.pos < parser.tokens.len() {
        return Err(FormulaError::malformed(
            parser.fragment_at(parser.pos),
            "unexpected token",
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn fragment_at(&self, pos: usize) -> String {
        match self.tokens.get(pos) {
            Some(token) => self.src[token.span.start..].trim_end().to_string(),
            None => "end of formula".to_string(),
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::EvaluationLimitExceeded {
                limit: self.max_depth,
                what: "levels of nesting".to_string(),
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn check_height(&self, height: usize) -> Result<usize, FormulaError> {
        if height > self.max_depth {
            return Err(FormulaError::EvaluationLimitExceeded {
                limit: self.max_depth,
                what: "levels of operators".to_string(),
            });
        }
        Ok(height)
    }

    fn binary_operator(&self) -> Option<(u8, BinaryBuilder)> {
        let token = self.peek()?;
        let (symbol, build): (&str, BinaryBuilder) = match &token.kind {
            TokenKind::OrOr => ("OR", Expression::Or),
            TokenKind::Ident(word) if word == "OR" => ("OR", Expression::Or),
            TokenKind::AndAnd => ("AND", Expression::And),
            TokenKind::Ident(word) if word == "AND" => ("AND", Expression::And),
            TokenKind::EqEq => ("==", Expression::Equal),
            TokenKind::NotEq => ("!=", Expression::NotEqual),
            TokenKind::Gt => (">", Expression::GreaterThan),
            TokenKind::Lt => ("<", Expression::SmallerThan),
            TokenKind::Gte => (">=", Expression::GreaterThanOrEqual),
            TokenKind::Lte => ("<=", Expression::SmallerThanOrEqual),
            TokenKind::Plus => ("+", Expression::Sum),
            TokenKind::Minus => ("-", Expression::Subtract),
            TokenKind::Star => ("*", Expression::Multiply),
            TokenKind::Slash => ("/", Expression::Divide),
            _ => return None,
        };
        Some((precedence::of_binary(symbol), build))
    }

    // Each parse step returns the subtree together with its height.
    fn expression(&mut self, min_precedence: u8) -> Result<(Expression, usize), FormulaError> {
        let (mut lhs, mut height) = self.unary()?;
        while let Some((precedence, build)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let (rhs, rhs_height) = self.expression(precedence + 1)?;
            height = self.check_height(height.max(rhs_height) + 1)?;
            lhs = build(Box::new(lhs), Box::new(rhs));
        }
        Ok((lhs, height))
    }

    fn unary(&mut self) -> Result<(Expression, usize), FormulaError> {
        let kind = self.peek().map(|t| t.kind.clone());
        let wrap: Option<fn(Box<Expression>) -> Expression> = match kind {
            Some(TokenKind::Minus) => Some(Expression::Negate),
            Some(TokenKind::Bang) => Some(Expression::Not),
            Some(TokenKind::Ident(word)) if word == "NOT" => Some(Expression::Not),
            Some(TokenKind::Plus) => {
                self.pos += 1;
                return self.unary();
            }
            _ => None,
        };
        match wrap {
            Some(wrap) => {
                self.pos += 1;
                self.enter()?;
                let (operand, height) = self.unary()?;
                self.leave();
                let height = self.check_height(height + 1)?;
                Ok((wrap(Box::new(operand)), height))
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<(Expression, usize), FormulaError> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(FormulaError::malformed(
                self.src.trim(),
                "formula ends unexpectedly",
            ));
        };
        let fragment = self.fragment_at(self.pos);
        self.pos += 1;

        let leaf = |value: Value| -> Result<(Expression, usize), FormulaError> {
            Ok((Expression::Literal(value), 0))
        };
        match token.kind {
            TokenKind::Number(n) => leaf(Value::Number(n)),
            TokenKind::Text(s) => leaf(Value::Text(s)),
            TokenKind::Ident(word) if word == "true" => leaf(Value::Bool(true)),
            TokenKind::Ident(word) if word == "false" => leaf(Value::Bool(false)),
            TokenKind::Ident(word) if word.eq_ignore_ascii_case("IF") => Err(
                FormulaError::malformed(fragment, "IF must be resolved before evaluation"),
            ),
            TokenKind::Ident(word) => Err(FormulaError::malformed(
                fragment,
                format!("'{}' is not a known value", word),
            )),
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.expression(0)?;
                self.leave();
                if matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RParen)) {
                    self.pos += 1;
                    Ok(inner)
                } else {
                    Err(FormulaError::malformed(
                        self.fragment_at(self.pos),
                        "missing closing parenthesis",
                    ))
                }
            }
            _ => Err(FormulaError::malformed(fragment, "expected a value")),
        }
    }
}
