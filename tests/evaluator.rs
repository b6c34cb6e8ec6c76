//! Tests for the expression evaluator, the IF rewriter and evaluation traces.
mod common;
use common::*;
use keisan::prelude::*;

fn evaluate(expression: &str) -> Result<Value, FormulaError> {
    Evaluator::default().evaluate(expression)
}

#[test]
fn test_operator_precedence() {
    assert_eq!(evaluate("1 + 2 * 3"), Ok(Value::Number(7.0)));
    assert_eq!(evaluate("(1 + 2) * 3"), Ok(Value::Number(9.0)));
    assert_eq!(evaluate("10 - 4 - 3"), Ok(Value::Number(3.0)));
    assert_eq!(evaluate("100 / 10 / 2"), Ok(Value::Number(5.0)));
    assert_eq!(evaluate("--3"), Ok(Value::Number(3.0)));
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(evaluate("2 > 1 AND 3 <= 3"), Ok(Value::Bool(true)));
    assert_eq!(evaluate("2 > 1 && 1 > 2 || 5 != 4"), Ok(Value::Bool(true)));
    assert_eq!(evaluate("NOT (1 == 1)"), Ok(Value::Bool(false)));
    assert_eq!(evaluate("!false"), Ok(Value::Bool(true)));
    assert_eq!(evaluate("1 + 1 == 2"), Ok(Value::Bool(true)));
}

#[test]
fn test_keypad_glyphs_are_accepted() {
    assert_eq!(evaluate("6 × 7 − 2"), Ok(Value::Number(40.0)));
    assert_eq!(evaluate("9 ÷ 3 ≥ 3"), Ok(Value::Bool(true)));
}

#[test]
fn test_picklist_text_comparison() {
    assert_eq!(evaluate(r#""Open" == "Open""#), Ok(Value::Bool(true)));
    assert_eq!(evaluate(r#""Open" != "Closed""#), Ok(Value::Bool(true)));
}

#[test]
fn test_leftover_identifiers_are_malformed() {
    match evaluate("Basic_Price__c * 2") {
        Err(FormulaError::MalformedExpression { fragment, .. }) => {
            assert!(fragment.starts_with("Basic_Price__c"));
        }
        other => panic!("expected MalformedExpression, got {other:?}"),
    }
}

#[test]
fn test_unresolved_if_is_malformed() {
    assert!(matches!(
        evaluate("IF(1 > 0, 1, 2)"),
        Err(FormulaError::MalformedExpression { .. })
    ));
}

#[test]
fn test_non_grammar_input_is_rejected() {
    for input in ["", "1 +", "(1 + 2", "1 2", "alert(1)", "1 = 1", "2 ^ 3"] {
        assert!(
            matches!(evaluate(input), Err(FormulaError::MalformedExpression { .. })),
            "expected {input:?} to be rejected"
        );
    }
}

#[test]
fn test_type_mismatch() {
    assert!(matches!(
        evaluate("true * 2"),
        Err(FormulaError::TypeMismatch { .. })
    ));
    assert!(matches!(
        evaluate("1 AND true"),
        Err(FormulaError::TypeMismatch { .. })
    ));
}

#[test]
fn test_division_policy() {
    assert!(matches!(
        evaluate("1 / 0"),
        Err(FormulaError::DivisionByZero { .. })
    ));

    let config = EngineConfig::builder()
        .with_division_policy(DivisionPolicy::Ieee754)
        .build();
    let evaluator = Evaluator::new(&config);
    assert_eq!(evaluator.evaluate("1 / 0"), Ok(Value::Number(f64::INFINITY)));
    assert_eq!(evaluator.evaluate("-1 / 0"), Ok(Value::Number(f64::NEG_INFINITY)));
}

#[test]
fn test_nesting_depth_is_bounded() {
    let config = EngineConfig::builder().with_max_nesting_depth(10).build();
    let deep = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    assert!(matches!(
        Evaluator::new(&config).evaluate(&deep),
        Err(FormulaError::EvaluationLimitExceeded { .. })
    ));
    let shallow = format!("{}1{}", "(".repeat(5), ")".repeat(5));
    assert_eq!(Evaluator::new(&config).evaluate(&shallow), Ok(Value::Number(1.0)));
}

#[test]
fn test_long_operator_chain_is_an_error() {
    let chain = vec!["1"; 5000].join(" + ");
    assert!(matches!(
        Evaluator::default().evaluate(&chain),
        Err(FormulaError::EvaluationLimitExceeded { limit: 64, .. })
    ));
    let chain = vec!["1"; 60].join(" + ");
    assert_eq!(Evaluator::default().evaluate(&chain), Ok(Value::Number(60.0)));
}

#[test]
fn test_trace_explanation() {
    let evaluation = Evaluator::default().evaluate_with_trace("(2 + 3) * 4").unwrap();
    assert_eq!(evaluation.value, Value::Number(20.0));
    assert_eq!(evaluation.explanation, "(2 + 3) [= 5] * 4");
}

#[test]
fn test_short_circuit_trace_omits_the_right_side() {
    let evaluation = Evaluator::default()
        .evaluate_with_trace("1 > 2 AND 3 > 1")
        .unwrap();
    assert_eq!(evaluation.value, Value::Bool(false));
    assert_eq!(evaluation.explanation, "1 > 2");
}

#[test]
fn test_condition_must_be_boolean() {
    let evaluator = Evaluator::default();
    assert_eq!(evaluator.evaluate_condition("2 > 1"), Ok(true));
    assert!(matches!(
        evaluator.evaluate_condition("2 + 1"),
        Err(FormulaError::InvalidCondition { .. })
    ));
}

#[test]
fn test_nested_if_rewrite() {
    let rewriter = ConditionalRewriter::new(&EngineConfig::default());
    assert_eq!(
        rewriter.rewrite("IF(1 > 0, IF(2 > 3, 10, 20), 30)").unwrap(),
        "20"
    );
    assert_eq!(
        rewriter.rewrite("IF(1 > 0, 1, 2) + IF(1 < 0, 10, 20)").unwrap(),
        "1 + 20"
    );
}

#[test]
fn test_rewrite_keeps_string_commas_inside_arguments() {
    let rewriter = ConditionalRewriter::new(&EngineConfig::default());
    assert_eq!(
        rewriter.rewrite(r#"IF("a,b" == "a,b", 1, 2)"#).unwrap(),
        "1"
    );
}

#[test]
fn test_rewrite_loop_is_bounded() {
    let config = EngineConfig::builder().with_max_rewrite_iterations(3).build();
    let rewriter = ConditionalRewriter::new(&config);
    assert_eq!(rewriter.rewrite(&nested_ifs(3)).unwrap(), "1");
    assert_eq!(
        rewriter.rewrite(&nested_ifs(4)),
        Err(FormulaError::EvaluationLimitExceeded {
            limit: 3,
            what: "IF rewrites".to_string()
        })
    );
}

#[test]
fn test_default_rewrite_limit_stops_deep_nesting() {
    let rewriter = ConditionalRewriter::new(&EngineConfig::default());
    assert!(matches!(
        rewriter.rewrite(&nested_ifs(100)),
        Err(FormulaError::EvaluationLimitExceeded { limit: 64, .. })
    ));
}

#[test]
fn test_condition_failures_carry_the_condition_text() {
    let rewriter = ConditionalRewriter::new(&EngineConfig::default());
    match rewriter.rewrite("IF(1 > , 1, 2)") {
        Err(FormulaError::InvalidCondition { condition, .. }) => assert_eq!(condition, "1 >"),
        other => panic!("expected InvalidCondition, got {other:?}"),
    }
}
