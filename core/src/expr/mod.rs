//! The expression IR: nodes, literal values, and the arena builder.

mod build;
mod node;
mod value;

pub use build::ExprBuilder;
pub use node::{BinaryOp, ElementInit, Expr, ExprInner, MemberBinding, UnaryOp, kind_name};
pub use value::Value;
