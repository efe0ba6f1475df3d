//! Type descriptors, the interning registry, and introspection helpers.

mod helpers;
mod registry;
mod ty;

pub use registry::TypeRegistry;
pub use ty::{CtorDef, MemberDef, MemberKind, MethodDef, MethodFamily, Ty, TypeDef, TypeDefKind};
