//! Prelude module for convenient imports
//!
//! Re-exports the types needed to calculate a formula step or build an
//! attachment filter without importing each module individually.

// Formula pipeline
pub use crate::calculator::{Calculation, Calculator, CalculatorState};
pub use crate::evaluator::{Evaluation, Evaluator};
pub use crate::format::{format_number, format_value};
pub use crate::formula::{
    BindingKind, ConditionalRewriter, VariableBinding, VariableCatalog, extract_identifiers,
    normalize_operators, substitute,
};

// AST and expression types
pub use crate::ast::{EvaluationTrace, Expression, Value};

// Step editing
pub use crate::step::{ComparisonOperator, ConditionalExpr, FormulaStep, derive_variable_name};

// Filter conditions and previews
pub use crate::query::{
    AttachmentRule, AttachmentType, ChildRecordMode, ConditionList, FilterCondition,
    FilterOperator, RecordSourceType, build_where_clause, compose_query_preview,
};

// External metadata
pub use crate::metadata::{
    FieldOption, InMemoryMetadata, MetadataProvider, PicklistEntry, RelationshipDescriptor,
    RelationshipOption, RelationshipType, options_or_empty,
};

// Configuration and errors
pub use crate::config::{DigitGrouping, DivisionPolicy, EngineConfig};
pub use crate::error::{ConfigError, FormulaError, MetadataError, StepError};

// Trace formatting
pub use crate::trace::TraceFormatter;
