use crate::types::{CtorDef, MemberDef, MethodDef, Ty};

use super::value::Value;

/// An expression node: its static type plus the kind-specific payload.
///
/// Nodes are arena-allocated and immutable; rewrites allocate new nodes
/// and share untouched subtrees by reference, so `core::ptr::eq` is the
/// "same node" relation.
#[derive(Debug, Clone, Copy)]
pub struct Expr<'types, 'arena>(pub &'types Ty<'types>, pub ExprInner<'types, 'arena>);

impl PartialEq for Expr<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.0, other.0) && self.1 == other.1
    }
}

impl<'types, 'arena> Expr<'types, 'arena> {
    pub fn as_ptr(&self) -> *const Self {
        self as *const _
    }

    pub fn ty(&self) -> &'types Ty<'types> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprInner<'types, 'arena> {
    Constant(Value<'types, 'arena>),
    Parameter {
        name: &'arena str,
    },
    Binary {
        op: BinaryOp,
        left: &'arena Expr<'types, 'arena>,
        right: &'arena Expr<'types, 'arena>,
        /// Lambda applied to a non-null left operand of a coalesce.
        conversion: Option<&'arena Expr<'types, 'arena>>,
    },
    Unary {
        op: UnaryOp,
        operand: &'arena Expr<'types, 'arena>,
    },
    Conditional {
        test: &'arena Expr<'types, 'arena>,
        if_true: &'arena Expr<'types, 'arena>,
        if_false: &'arena Expr<'types, 'arena>,
    },
    Member {
        expr: &'arena Expr<'types, 'arena>,
        member: &'types MemberDef<'types>,
    },
    Call {
        /// None for static calls.
        receiver: Option<&'arena Expr<'types, 'arena>>,
        method: &'types MethodDef<'types>,
        args: &'arena [&'arena Expr<'types, 'arena>],
    },
    New {
        ctor: &'types CtorDef<'types>,
        args: &'arena [&'arena Expr<'types, 'arena>],
        /// Members initialized positionally by `args`, when the node
        /// came from an anonymous-shape construction.
        members: Option<&'arena [&'types MemberDef<'types>]>,
    },
    NewArray {
        elem: &'types Ty<'types>,
        items: &'arena [&'arena Expr<'types, 'arena>],
    },
    ListInit {
        new: &'arena Expr<'types, 'arena>,
        inits: &'arena [ElementInit<'types, 'arena>],
    },
    MemberInit {
        new: &'arena Expr<'types, 'arena>,
        bindings: &'arena [MemberBinding<'types, 'arena>],
    },
    Invoke {
        callee: &'arena Expr<'types, 'arena>,
        args: &'arena [&'arena Expr<'types, 'arena>],
    },
    Lambda {
        /// INVARIANT: every element is a `Parameter` node.
        params: &'arena [&'arena Expr<'types, 'arena>],
        body: &'arena Expr<'types, 'arena>,
    },
    TypeIs {
        expr: &'arena Expr<'types, 'arena>,
        ty: &'types Ty<'types>,
    },
    /// Open leaf for node kinds outside this set. Traversals without a
    /// dedicated handler reject it.
    Opaque {
        label: &'arena str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    Xor,
    AndAlso,
    OrElse,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Coalesce,
    ArrayIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Plus,
    ArrayLength,
    Convert,
    TypeAs,
    Quote,
}

/// One element added by a list-initializer; multi-argument adds exist
/// for keyed collections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementInit<'types, 'arena> {
    pub args: &'arena [&'arena Expr<'types, 'arena>],
}

/// One binding inside a member-initializer block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberBinding<'types, 'arena> {
    /// `Member = expr`
    Assignment {
        member: &'types MemberDef<'types>,
        expr: &'arena Expr<'types, 'arena>,
    },
    /// `Member = { nested bindings }`
    Nested {
        member: &'types MemberDef<'types>,
        bindings: &'arena [MemberBinding<'types, 'arena>],
    },
    /// `Member = { element inits }`
    List {
        member: &'types MemberDef<'types>,
        inits: &'arena [ElementInit<'types, 'arena>],
    },
}

pub fn kind_name(expr: &Expr<'_, '_>) -> &'static str {
    match expr.1 {
        ExprInner::Constant(_) => "Constant",
        ExprInner::Parameter { .. } => "Parameter",
        ExprInner::Binary { .. } => "Binary",
        ExprInner::Unary { .. } => "Unary",
        ExprInner::Conditional { .. } => "Conditional",
        ExprInner::Member { .. } => "MemberAccess",
        ExprInner::Call { .. } => "MethodCall",
        ExprInner::New { .. } => "New",
        ExprInner::NewArray { .. } => "NewArray",
        ExprInner::ListInit { .. } => "ListInit",
        ExprInner::MemberInit { .. } => "MemberInit",
        ExprInner::Invoke { .. } => "Invocation",
        ExprInner::Lambda { .. } => "Lambda",
        ExprInner::TypeIs { .. } => "TypeIs",
        ExprInner::Opaque { .. } => "Opaque",
    }
}
