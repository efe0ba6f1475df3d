//! Rewrites query expression trees before execution and prints them
//! back to readable text.
//!
//! A query surface often exposes lightweight placeholder types while the
//! engine underneath works on its own entity types. This crate carries a
//! typed expression IR for such queries and a rewriter that substitutes
//! one set of types for another across a whole tree: generic
//! instantiations, method signatures, constructors, members, parameters
//! and constants included. A companion printer renders any tree to a
//! stable, human-readable layout for logs and tests.
//!
//! ```
//! use requery::{Bump, ExprBuilder, TypeDefKind, TypeRegistry, render, substitute};
//!
//! let type_arena = Bump::new();
//! let types = TypeRegistry::new(&type_arena);
//! let dto = types.declare("OrderDto", TypeDefKind::Class);
//! let order = types.declare("Order", TypeDefKind::Class);
//! types.add_ctor(dto, &[]);
//! types.add_ctor(order, &[]);
//!
//! let arena = Bump::new();
//! let builder = ExprBuilder::new(types, &arena);
//! let tree = builder.new_object(types.ctor(dto, &[]).unwrap(), &[]);
//!
//! let rewritten = substitute(types, &arena, tree, &[(dto, order)]).unwrap();
//! assert_eq!(render(types, &arena, rewritten), "new Order()");
//! ```

pub use bumpalo::Bump;

pub use requery_core::errors::RewriteError;
pub use requery_core::expr::{
    BinaryOp, ElementInit, Expr, ExprBuilder, ExprInner, MemberBinding, UnaryOp, Value, kind_name,
};
pub use requery_core::printer::{render, render_into};
pub use requery_core::rewrite::substitute;
pub use requery_core::types::{
    CtorDef, MemberDef, MemberKind, MethodDef, MethodFamily, Ty, TypeDef, TypeDefKind,
    TypeRegistry,
};
pub use requery_core::visitor::{ExprVisitor, VisitResult};
