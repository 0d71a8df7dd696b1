//! Typed columns and the expressions built from them.

pub mod column;
pub mod ops;

pub use column::Col;
pub use ops::{BinaryOp, LogicalOp};
