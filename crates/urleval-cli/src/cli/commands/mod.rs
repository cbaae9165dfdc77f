//! CLI command handlers, one per file.

mod compare;
mod evaluate;
mod extract;

pub use compare::run_compare;
pub use evaluate::run_evaluate;
pub use extract::run_extract;
