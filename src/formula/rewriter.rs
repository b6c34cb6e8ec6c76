use super::lexer::{Token, TokenKind, tokenize};
use super::tokenizer::normalize_operators;
use crate::config::EngineConfig;
use crate::error::FormulaError;
use crate::evaluator::Evaluator;
use std::ops::Range;

/// One `IF(condition, trueExpr, falseExpr)` occurrence located in a formula.
struct IfCall {
    /// Byte range of the whole call, from `IF` through the closing parenthesis.
    span: Range<usize>,
    /// Byte ranges of the arguments, split on top-level commas.
    args: Vec<Range<usize>>,
}

/// Resolves `IF(...)` calls by evaluating their conditions and splicing in the chosen branch.
///
/// Calls are resolved innermost first, leftmost first, so every condition that
/// reaches the evaluator is already IF-free.
#[derive(Debug, Clone)]
pub struct ConditionalRewriter {
    evaluator: Evaluator,
    max_iterations: usize,
}

impl ConditionalRewriter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            max_iterations: config.max_rewrite_iterations,
        }
    }

    /// Rewrites `formula` until no IF call remains.
    ///
    /// The formula must already be closed (no unresolved identifiers inside conditions).
    pub fn rewrite(&self, formula: &str) -> Result<String, FormulaError> {
        let mut current = normalize_operators(formula).trim().to_string();
        let limit = self.max_iterations.min(current.len().max(1));
        let mut iterations = 0;

        loop {
            let tokens = tokenize(&current)?;
            let Some(call) = find_innermost_call(&current, &tokens)? else {
                return Ok(current);
            };

            iterations += 1;
            if iterations > limit {
                return Err(FormulaError::EvaluationLimitExceeded {
                    limit,
                    what: "IF rewrites".to_string(),
                });
            }

            let condition = &current[call.args[0].clone()];
            let branch = if self.evaluator.evaluate_condition(condition)? {
                &call.args[1]
            } else {
                &call.args[2]
            };
            let replacement = as_operand(current[branch.clone()].trim());
            tracing::debug!(
                call = &current[call.span.clone()],
                %replacement,
                iteration = iterations,
                "resolved IF call"
            );

            current = format!(
                "{}{}{}",
                &current[..call.span.start],
                replacement,
                &current[call.span.end..]
            );
        }
    }
}

/// Finds the leftmost IF call whose arguments contain no other IF call.
fn find_innermost_call(src: &str, tokens: &[Token]) -> Result<Option<IfCall>, FormulaError> {
    let starts: Vec<usize> = (0..tokens.len())
        .filter(|&i| {
            tokens[i].is_ident("IF")
                && matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::LParen))
        })
        .collect();

    for (n, &start) in starts.iter().enumerate() {
        let (close, commas) = match_call(src, tokens, start)?;
        let contains_nested = starts.get(n + 1).is_some_and(|&next| next < close);
        if contains_nested {
            continue;
        }

        let call_text = &src[tokens[start].span.start..tokens[close].span.end];
        let mut boundaries = vec![start + 1];
        boundaries.extend(&commas);
        boundaries.push(close);
        if boundaries.len() != 4 {
            return Err(FormulaError::malformed(
                call_text,
                format!(
                    "IF expects 3 arguments, but found {}",
                    boundaries.len() - 1
                ),
            ));
        }

        let args: Vec<Range<usize>> = boundaries
            .windows(2)
            .map(|w| tokens[w[0]].span.end..tokens[w[1]].span.start)
            .collect();
        if let Some(position) = args.iter().position(|a| src[a.clone()].trim().is_empty()) {
            return Err(FormulaError::malformed(
                call_text,
                format!("IF argument {} is empty", position + 1),
            ));
        }

        return Ok(Some(IfCall {
            span: tokens[start].span.start..tokens[close].span.end,
            args,
        }));
    }
    Ok(None)
}

/// Returns the token index of the call's closing parenthesis and of its top-level commas.
fn match_call(
    src: &str,
    tokens: &[Token],
    start: usize,
) -> Result<(usize, Vec<usize>), FormulaError> {
    let mut depth = 0usize;
    let mut commas = Vec::new();
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok((i, commas));
                }
            }
            TokenKind::Comma if depth == 1 => commas.push(i),
            _ => {}
        }
    }
    Err(FormulaError::malformed(
        src[tokens[start].span.start..].trim_end(),
        "IF is missing its closing parenthesis",
    ))
}

/// Parenthesizes a branch unless it is a single literal, name or parenthesized group,
/// so splicing it into the surrounding formula cannot change precedence.
fn as_operand(branch: &str) -> String {
    let atomic = match tokenize(branch) {
        Ok(tokens) => match tokens.as_slice() {
            [single] => matches!(
                single.kind,
                TokenKind::Number(_) | TokenKind::Text(_) | TokenKind::Ident(_)
            ),
            [first, ..] if first.kind == TokenKind::LParen => {
                matches!(match_group(&tokens), Some(end) if end == tokens.len() - 1)
            }
            _ => false,
        },
        Err(_) => false,
    };
    if atomic {
        branch.to_string()
    } else {
        format!("({})", branch)
    }
}

fn match_group(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> ConditionalRewriter {
        ConditionalRewriter::new(&EngineConfig::default())
    }

    #[test]
    fn formulas_without_if_are_unchanged() {
        assert_eq!(rewriter().rewrite("1 + 2").unwrap(), "1 + 2");
    }

    #[test]
    fn nested_if_resolves_to_the_chosen_literal() {
        assert_eq!(
            rewriter().rewrite("IF(1 > 0, IF(2 > 3, 10, 20), 30)").unwrap(),
            "20"
        );
    }

    #[test]
    fn commas_inside_nested_calls_do_not_split_arguments() {
        assert_eq!(
            rewriter()
                .rewrite("IF(IF(1 > 2, 5, 6) == 6, IF(0 < 1, 7, 8), 9)")
                .unwrap(),
            "7"
        );
    }

    #[test]
    fn branches_keep_their_grouping() {
        assert_eq!(
            rewriter().rewrite("2 * IF(1 == 1, 3 + 4, 0)").unwrap(),
            "2 * (3 + 4)"
        );
    }

    #[test]
    fn lowercase_if_is_recognized() {
        assert_eq!(rewriter().rewrite("if(1 < 2, 1, 2)").unwrap(), "1");
    }

    #[test]
    fn wrong_argument_count_is_malformed() {
        let err = rewriter().rewrite("IF(1 > 0, 1)").unwrap_err();
        assert!(err.to_string().contains("3 arguments"));
    }

    #[test]
    fn unbalanced_call_is_malformed() {
        assert!(matches!(
            rewriter().rewrite("IF(1 > 0, 1, 2"),
            Err(FormulaError::MalformedExpression { .. })
        ));
    }

    #[test]
    fn failing_condition_is_reported_with_its_text() {
        match rewriter().rewrite("IF(1 / 0 > 1, 1, 2)").unwrap_err() {
            FormulaError::InvalidCondition { condition, message } => {
                assert_eq!(condition, "1 / 0 > 1");
                assert!(message.contains("Division by zero"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_boolean_condition_is_invalid() {
        assert!(matches!(
            rewriter().rewrite("IF(5, 1, 2)"),
            Err(FormulaError::InvalidCondition { .. })
        ));
    }
}
