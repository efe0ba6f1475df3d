pub mod errors;
pub mod expr;
pub mod printer;
pub mod rewrite;
pub mod types;
pub mod visitor;
