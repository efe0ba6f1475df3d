use bumpalo::Bump;

use crate::types::{CtorDef, MemberDef, MethodDef, Ty, TypeRegistry};

use super::node::{BinaryOp, ElementInit, Expr, ExprInner, MemberBinding, UnaryOp};
use super::value::Value;

/// Arena constructor for expression nodes.
///
/// Each factory derives the static type the node kind implies from its
/// children, so rebuilt nodes stay consistently typed without callers
/// repeating the typing rules.
#[derive(Debug, Clone, Copy)]
pub struct ExprBuilder<'types, 'arena> {
    types: &'types TypeRegistry<'types>,
    arena: &'arena Bump,
}

impl<'types, 'arena> ExprBuilder<'types, 'arena> {
    pub fn new(types: &'types TypeRegistry<'types>, arena: &'arena Bump) -> Self {
        Self { types, arena }
    }

    pub fn types(&self) -> &'types TypeRegistry<'types> {
        self.types
    }

    pub fn arena(&self) -> &'arena Bump {
        self.arena
    }

    fn alloc(
        &self,
        ty: &'types Ty<'types>,
        inner: ExprInner<'types, 'arena>,
    ) -> &'arena Expr<'types, 'arena> {
        self.arena.alloc(Expr(ty, inner))
    }

    pub fn constant(
        &self,
        ty: &'types Ty<'types>,
        value: Value<'types, 'arena>,
    ) -> &'arena Expr<'types, 'arena> {
        self.alloc(ty, ExprInner::Constant(value))
    }

    pub fn parameter(&self, ty: &'types Ty<'types>, name: &str) -> &'arena Expr<'types, 'arena> {
        let name = &*self.arena.alloc_str(name);
        self.alloc(ty, ExprInner::Parameter { name })
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        left: &'arena Expr<'types, 'arena>,
        right: &'arena Expr<'types, 'arena>,
    ) -> &'arena Expr<'types, 'arena> {
        self.binary_with_conversion(op, left, right, None)
    }

    pub fn binary_with_conversion(
        &self,
        op: BinaryOp,
        left: &'arena Expr<'types, 'arena>,
        right: &'arena Expr<'types, 'arena>,
        conversion: Option<&'arena Expr<'types, 'arena>>,
    ) -> &'arena Expr<'types, 'arena> {
        use BinaryOp::*;
        let ty = match op {
            Eq | Ne | Lt | Le | Gt | Ge | AndAlso | OrElse => self.types.bool(),
            ArrayIndex => match *left.0 {
                Ty::Array(elem) => elem,
                _ => left.0,
            },
            Coalesce => self.types.non_nullable(left.0),
            _ => left.0,
        };
        self.alloc(ty, ExprInner::Binary { op, left, right, conversion })
    }

    /// `ty` overrides the derived type; `Convert`/`TypeAs` need it, the
    /// rest default to the operand type (`ArrayLength` to int).
    pub fn unary(
        &self,
        op: UnaryOp,
        operand: &'arena Expr<'types, 'arena>,
        ty: Option<&'types Ty<'types>>,
    ) -> &'arena Expr<'types, 'arena> {
        let ty = ty.unwrap_or_else(|| match op {
            UnaryOp::ArrayLength => self.types.int(),
            _ => operand.0,
        });
        self.alloc(ty, ExprInner::Unary { op, operand })
    }

    pub fn conditional(
        &self,
        test: &'arena Expr<'types, 'arena>,
        if_true: &'arena Expr<'types, 'arena>,
        if_false: &'arena Expr<'types, 'arena>,
    ) -> &'arena Expr<'types, 'arena> {
        self.alloc(if_true.0, ExprInner::Conditional { test, if_true, if_false })
    }

    pub fn member(
        &self,
        expr: &'arena Expr<'types, 'arena>,
        member: &'types MemberDef<'types>,
    ) -> &'arena Expr<'types, 'arena> {
        self.alloc(member.ty, ExprInner::Member { expr, member })
    }

    pub fn call(
        &self,
        receiver: Option<&'arena Expr<'types, 'arena>>,
        method: &'types MethodDef<'types>,
        args: &[&'arena Expr<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        let args = &*self.arena.alloc_slice_copy(args);
        self.alloc(method.ret, ExprInner::Call { receiver, method, args })
    }

    pub fn new_object(
        &self,
        ctor: &'types CtorDef<'types>,
        args: &[&'arena Expr<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        self.new_with_members(ctor, args, None)
    }

    pub fn new_with_members(
        &self,
        ctor: &'types CtorDef<'types>,
        args: &[&'arena Expr<'types, 'arena>],
        members: Option<&[&'types MemberDef<'types>]>,
    ) -> &'arena Expr<'types, 'arena> {
        let args = &*self.arena.alloc_slice_copy(args);
        let members = members.map(|list| &*self.arena.alloc_slice_copy(list));
        self.alloc(ctor.declaring, ExprInner::New { ctor, args, members })
    }

    pub fn new_array(
        &self,
        elem: &'types Ty<'types>,
        items: &[&'arena Expr<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        let items = &*self.arena.alloc_slice_copy(items);
        self.alloc(self.types.array(elem), ExprInner::NewArray { elem, items })
    }

    pub fn element_init(&self, args: &[&'arena Expr<'types, 'arena>]) -> ElementInit<'types, 'arena> {
        ElementInit { args: self.arena.alloc_slice_copy(args) }
    }

    pub fn list_init(
        &self,
        new: &'arena Expr<'types, 'arena>,
        inits: &[ElementInit<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        let inits = &*self.arena.alloc_slice_copy(inits);
        self.alloc(new.0, ExprInner::ListInit { new, inits })
    }

    pub fn member_init(
        &self,
        new: &'arena Expr<'types, 'arena>,
        bindings: &[MemberBinding<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        let bindings = &*self.arena.alloc_slice_copy(bindings);
        self.alloc(new.0, ExprInner::MemberInit { new, bindings })
    }

    pub fn invoke(
        &self,
        callee: &'arena Expr<'types, 'arena>,
        args: &[&'arena Expr<'types, 'arena>],
    ) -> &'arena Expr<'types, 'arena> {
        let args = &*self.arena.alloc_slice_copy(args);
        let ty = self.types.func_ret(callee.0).unwrap_or(callee.0);
        self.alloc(ty, ExprInner::Invoke { callee, args })
    }

    pub fn lambda(
        &self,
        params: &[&'arena Expr<'types, 'arena>],
        body: &'arena Expr<'types, 'arena>,
    ) -> &'arena Expr<'types, 'arena> {
        debug_assert!(params.iter().all(|p| matches!(p.1, ExprInner::Parameter { .. })));
        let param_tys: Vec<_> = params.iter().map(|p| p.0).collect();
        let ty = self.types.func(&param_tys, body.0);
        let params = &*self.arena.alloc_slice_copy(params);
        self.alloc(ty, ExprInner::Lambda { params, body })
    }

    pub fn type_is(
        &self,
        expr: &'arena Expr<'types, 'arena>,
        ty: &'types Ty<'types>,
    ) -> &'arena Expr<'types, 'arena> {
        self.alloc(self.types.bool(), ExprInner::TypeIs { expr, ty })
    }

    pub fn opaque(&self, ty: &'types Ty<'types>, label: &str) -> &'arena Expr<'types, 'arena> {
        let label = &*self.arena.alloc_str(label);
        self.alloc(ty, ExprInner::Opaque { label })
    }
}
