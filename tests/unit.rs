//! Unit tests for core Keisan functionality.
mod common;
use common::*;
use keisan::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(2.5)), "2.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Text("Open".to_string())), "\"Open\"");
}

#[test]
fn test_normalization_is_idempotent() {
    let formula = "a × b ÷ c − d ≥ e ≠ f";
    let once = normalize_operators(formula);
    assert_eq!(once, "a * b / c - d >= e != f");
    assert_eq!(normalize_operators(&once), once);
}

#[test]
fn test_identifiers_in_first_appearance_order() {
    let ids = extract_identifiers("Basic_Price__c * Discount__c + Basic_Price__c - gstAmount");
    assert_eq!(ids, vec!["Basic_Price__c", "Discount__c", "gstAmount"]);
}

#[test]
fn test_identifiers_skip_reserved_words_and_literals() {
    let ids = extract_identifiers(r#"IF(Status__c == "Open Now" AND true, 1.5e3, if(x, y, NOT z))"#);
    assert_eq!(ids, vec!["Status__c", "x", "y", "z"]);
}

#[test]
fn test_identifiers_survive_half_typed_input() {
    assert_eq!(extract_identifiers("IF(Basic_Price__c >"), vec!["Basic_Price__c"]);
    assert!(extract_identifiers("").is_empty());
    assert_eq!(
        extract_identifiers("a ×"),
        extract_identifiers(&normalize_operators("a ×"))
    );
}

#[test]
fn test_resolved_labels() {
    let names = extract_identifiers("Basic_Price__c + gstAmount + mystery");
    let bindings = booking_catalog().resolve(&names, &values(&[("gstAmount", "18")]));
    let labels: Vec<&str> = bindings.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Basic Price", "gstAmount (Previous Step)", "mystery"]);
    assert_eq!(bindings[1].current_value.as_deref(), Some("18"));
    assert_eq!(bindings[2].kind, BindingKind::Unresolved);
}

#[test]
fn test_substitute_leaves_the_formula_untouched() {
    let formula = "Basic_Price__c * 2".to_string();
    let vals = values(&[("Basic_Price__c", "50")]);
    let bindings = booking_catalog().resolve(&extract_identifiers(&formula), &vals);
    let closed = substitute(&formula, &bindings, &vals).unwrap();
    assert_eq!(closed, "50 * 2");
    assert_eq!(formula, "Basic_Price__c * 2");
}

#[test]
fn test_missing_inputs_are_reported_in_binding_order() {
    let formula = "Discount__c + Basic_Price__c";
    let vals = values(&[]);
    let bindings = booking_catalog().resolve(&extract_identifiers(formula), &vals);
    assert_eq!(
        substitute(formula, &bindings, &vals),
        Err(FormulaError::MissingInput {
            label: "Discount".to_string()
        })
    );
}

#[test]
fn test_variable_name_derivation() {
    assert_eq!(derive_variable_name("Total With GST"), "totalWithGST");
    assert_eq!(derive_variable_name("  "), "stepVariable");
    assert_eq!(derive_variable_name("basic-price total!"), "basicpriceTotal");
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_number(Some(5.0), DigitGrouping::Indian), "5.00");
    assert_eq!(format_number(Some(123456789.0), DigitGrouping::Indian), "12,34,56,789.00");
    assert_eq!(format_number(Some(123456789.0), DigitGrouping::Western), "123,456,789.00");
    assert_eq!(format_number(Some(-0.0), DigitGrouping::Indian), "0.00");
    assert_eq!(format_number(None, DigitGrouping::Indian), "0.00");
}

#[test]
fn test_error_messages() {
    let err = FormulaError::MissingInput {
        label: "Basic Price".to_string(),
    };
    assert_eq!(err.to_string(), "Please enter a value for Basic Price");
    assert_eq!(StepError::MissingLabel.to_string(), "Step Label is required");
    assert_eq!(
        StepError::IncompleteCondition.to_string(),
        "Please fill all IF condition fields"
    );
}

#[test]
fn test_config_from_json_keeps_defaults() {
    let config = EngineConfig::from_json_str(r#"{ "digit_grouping": "western" }"#).unwrap();
    assert_eq!(config.digit_grouping, DigitGrouping::Western);
    assert_eq!(config.max_rewrite_iterations, 64);
    assert_eq!(config.division_policy, DivisionPolicy::Reject);
    assert_eq!(config.default_max_child_records, 10);
}

#[test]
fn test_config_builder() {
    let config = EngineConfig::builder()
        .with_division_policy(DivisionPolicy::Ieee754)
        .with_max_rewrite_iterations(8)
        .build();
    assert_eq!(config.division_policy, DivisionPolicy::Ieee754);
    assert_eq!(config.max_rewrite_iterations, 8);
    assert_eq!(config.max_nesting_depth, 64);
}
