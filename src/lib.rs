//! # Keisan - Formula Step Engine and Filter-Clause Builder
//!
//! **Keisan** evaluates the small arithmetic formulas that make up a calculation
//! pipeline, and builds the filter clauses and query previews used to pick related
//! records for email attachments. Formulas never reach a general-purpose
//! interpreter: they are substituted, rewritten and then parsed against a fixed
//! grammar.
//!
//! ## Core Workflow
//!
//! 1.  **Extract**: `extract_identifiers` lists the fields and prior-step variables a formula refers to.
//! 2.  **Resolve**: a `VariableCatalog` labels them, and `substitute` replaces them with the values typed by the user.
//! 3.  **Rewrite**: the `ConditionalRewriter` resolves every `IF(condition, a, b)` call, innermost first.
//! 4.  **Evaluate**: the `Evaluator` parses the closed expression into an AST and walks it, recording a trace.
//! 5.  **Format**: `format_number` renders the result with two decimals and grouped thousands.
//!
//! The `Calculator` runs all five steps at once.
//!
//! ## Quick Start
//!
//! ```rust
//! use keisan::prelude::*;
//! use ahash::AHashMap;
//!
//! let catalog = VariableCatalog::new(
//!     vec![FieldOption::new("Basic Price", "Basic_Price__c", "CURRENCY")],
//!     vec![],
//! );
//! let formula = "IF(Basic_Price__c > 500, Basic_Price__c × 0.18, 0)";
//!
//! let identifiers = extract_identifiers(formula);
//! let mut values = AHashMap::new();
//! values.insert("Basic_Price__c".to_string(), "1000".to_string());
//! let bindings = catalog.resolve(&identifiers, &values);
//!
//! let calculator = Calculator::new(EngineConfig::default());
//! let calculation = calculator.calculate(formula, &bindings, &values).unwrap();
//! assert_eq!(calculation.formatted, "180.00");
//!
//! let clause = build_where_clause(&[FilterCondition::new(
//!     "id_1",
//!     "Status__c",
//!     FilterOperator::Equals,
//!     "Paid",
//! )]);
//! assert_eq!(clause, "Status__c = 'Paid'");
//! ```

pub mod ast;
pub mod calculator;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod formula;
pub mod metadata;
pub mod prelude;
pub mod query;
pub mod step;
pub mod trace;
