//! Filter conditions for related-record attachments, the WHERE clause they
//! produce, and the read-only query preview shown next to them.

pub mod attachment;
pub mod clause;
pub mod condition;
pub mod preview;

pub use attachment::*;
pub use clause::*;
pub use condition::*;
pub use preview::*;
