//! Common test fixtures for catalogs, values, relationships and conditions.
use ahash::AHashMap;
use keisan::prelude::*;

/// Fields of a booking record, as the field picker would offer them.
#[allow(dead_code)]
pub fn booking_fields() -> Vec<FieldOption> {
    vec![
        FieldOption::new("Basic Price", "Basic_Price__c", "CURRENCY"),
        FieldOption::new("Discount", "Discount__c", "PERCENT"),
        FieldOption::new("Status", "Status__c", "PICKLIST"),
    ]
}

/// A catalog with the booking fields and one earlier step variable, `gstAmount`.
#[allow(dead_code)]
pub fn booking_catalog() -> VariableCatalog {
    VariableCatalog::new(booking_fields(), vec!["gstAmount".to_string()])
}

#[allow(dead_code)]
pub fn values(pairs: &[(&str, &str)]) -> AHashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Runs the whole pipeline for `formula` against the booking catalog.
#[allow(dead_code)]
pub fn calculate(formula: &str, pairs: &[(&str, &str)]) -> Result<Calculation, FormulaError> {
    calculate_with(EngineConfig::default(), formula, pairs)
}

#[allow(dead_code)]
pub fn calculate_with(
    config: EngineConfig,
    formula: &str,
    pairs: &[(&str, &str)],
) -> Result<Calculation, FormulaError> {
    let values = values(pairs);
    let bindings = booking_catalog().resolve(&extract_identifiers(formula), &values);
    Calculator::new(config).calculate(formula, &bindings, &values)
}

/// Builds `depth` nested IF calls that all take the true branch and end in `1`.
#[allow(dead_code)]
pub fn nested_ifs(depth: usize) -> String {
    let mut formula = "1".to_string();
    for _ in 0..depth {
        formula = format!("IF(1 > 0, {}, 0)", formula);
    }
    formula
}

/// A child relationship (payments of a booking) and a parent one (its account).
#[allow(dead_code)]
pub fn booking_relationships() -> Vec<RelationshipOption> {
    vec![
        RelationshipOption {
            label: "Payments".to_string(),
            value: "Payment__c.Booking__c".to_string(),
            descriptor: RelationshipDescriptor {
                related_object_api: "Payment__c".to_string(),
                relationship_name: "Booking__c".to_string(),
                relationship_type: RelationshipType::Child,
            },
        },
        RelationshipOption {
            label: "Account".to_string(),
            value: "Account__c".to_string(),
            descriptor: RelationshipDescriptor {
                related_object_api: "Account".to_string(),
                relationship_name: "Account__c".to_string(),
                relationship_type: RelationshipType::Parent,
            },
        },
    ]
}

#[allow(dead_code)]
pub fn condition(field: &str, operator: FilterOperator, value: &str) -> FilterCondition {
    FilterCondition::new(&format!("id_{}", field.to_lowercase()), field, operator, value)
}

#[allow(dead_code)]
pub const PAYMENT_CONDITIONS_JSON: &str = r#"[
    {"id": "id_a1b2c3d4e", "field": "Status__c", "operator": "=", "value": "Paid"},
    {"id": "id_f5g6h7i8j", "field": "Amount__c", "operator": ">=", "value": "5000"},
    {"id": "id_k9l0m1n2o", "field": "", "operator": "LIKE", "value": "ignored"}
]"#;
