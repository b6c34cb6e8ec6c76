//! Formula text processing: glyph normalization, identifier extraction,
//! variable substitution and IF resolution.

pub mod lexer;
mod parser;
mod resolver;
mod rewriter;
mod tokenizer;

pub use parser::parse_expression;
pub use resolver::{BindingKind, VariableBinding, VariableCatalog, substitute};
pub use rewriter::ConditionalRewriter;
pub use tokenizer::{extract_identifiers, is_numeric_literal, is_reserved_word, normalize_operators};
