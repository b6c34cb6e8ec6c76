pub mod expression;
pub mod precedence;
pub mod trace;
pub mod value;

pub use expression::*;
pub use trace::*;
pub use value::*;
