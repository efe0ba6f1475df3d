//! Type substitution across a whole expression tree.
//!
//! Replaces every occurrence of the mapped types (including occurrences
//! nested inside generic instantiations, arrays, method signatures,
//! constructors and members) while preserving tree shape and sharing
//! untouched subtrees.

use bumpalo::Bump;
use hashbrown::{DefaultHashBuilder, HashMap};
use tracing::debug;

use crate::errors::RewriteError;
use crate::expr::{Expr, ExprBuilder, ExprInner, Value, kind_name};
use crate::printer::render;
use crate::types::{CtorDef, MemberDef, MethodDef, Ty, TypeDefKind, TypeRegistry};
use crate::visitor::{ExprVisitor, VisitResult};

/// Rewrites `expr` so that every type mapped in `replacements` is
/// replaced by its target. The caches live for one call only, so
/// parameter identity is scoped to the tree being rewritten.
pub fn substitute<'types, 'arena>(
    types: &'types TypeRegistry<'types>,
    arena: &'arena Bump,
    expr: &'arena Expr<'types, 'arena>,
    replacements: &[(&'types Ty<'types>, &'types Ty<'types>)],
) -> Result<&'arena Expr<'types, 'arena>, RewriteError> {
    let mut visitor = TypeSubstitution::new(types, arena, replacements);
    visitor.visit(expr)
}

struct TypeSubstitution<'types, 'arena> {
    types: &'types TypeRegistry<'types>,
    builder: ExprBuilder<'types, 'arena>,
    replacements: HashMap<*const Ty<'types>, &'types Ty<'types>, DefaultHashBuilder, &'arena Bump>,
    /// One replacement node per original parameter node, so every use
    /// site of a parameter rewrites to the same node.
    params: HashMap<
        *const Expr<'types, 'arena>,
        &'arena Expr<'types, 'arena>,
        DefaultHashBuilder,
        &'arena Bump,
    >,
}

impl<'types, 'arena> TypeSubstitution<'types, 'arena> {
    fn new(
        types: &'types TypeRegistry<'types>,
        arena: &'arena Bump,
        replacements: &[(&'types Ty<'types>, &'types Ty<'types>)],
    ) -> Self {
        let mut map = HashMap::new_in(arena);
        for (from, to) in replacements {
            map.insert(from.as_ptr(), *to);
        }
        // An interface key also stands for every interface it extends,
        // unless that parent is mapped explicitly.
        for (from, to) in replacements {
            let is_interface =
                matches!(from, Ty::Named { def, .. } if def.kind == TypeDefKind::Interface);
            if !is_interface {
                continue;
            }
            for parent in types.all_interfaces(from) {
                map.entry(parent.as_ptr()).or_insert(*to);
            }
        }
        Self {
            types,
            builder: ExprBuilder::new(types, arena),
            replacements: map,
            params: HashMap::new_in(arena),
        }
    }

    fn needs_change(&self, ty: &'types Ty<'types>) -> bool {
        if self.replacements.contains_key(&ty.as_ptr()) {
            return true;
        }
        match ty {
            Ty::Named { args, .. } => args.iter().any(|arg| self.needs_change(arg)),
            Ty::Array(elem) => self.needs_change(elem),
            Ty::Var(_) => false,
        }
    }

    fn substitute_ty(&self, ty: &'types Ty<'types>) -> &'types Ty<'types> {
        if let Some(&replacement) = self.replacements.get(&ty.as_ptr()) {
            return replacement;
        }
        match ty {
            Ty::Named { def, args } if !args.is_empty() => {
                let new_args: Vec<_> = args.iter().map(|arg| self.substitute_ty(arg)).collect();
                if new_args.iter().zip(*args).all(|(n, o)| core::ptr::eq(*n, *o)) {
                    ty
                } else {
                    self.types.named(def, &new_args)
                }
            }
            Ty::Array(elem) => {
                let new_elem = self.substitute_ty(elem);
                if core::ptr::eq(new_elem, *elem) { ty } else { self.types.array(new_elem) }
            }
            _ => ty,
        }
    }

    /// Array values carry their element type; rewrite it (and nested
    /// array elements) in place of the value.
    fn convert_value(&self, value: Value<'types, 'arena>) -> Value<'types, 'arena> {
        match value {
            Value::Array { elem, items } => {
                let new_items: Vec<_> =
                    items.iter().map(|item| self.convert_value(*item)).collect();
                Value::Array {
                    elem: self.substitute_ty(elem),
                    items: self.builder.arena().alloc_slice_copy(&new_items),
                }
            }
            other => other,
        }
    }

    fn transform_call(
        &mut self,
        original: &'arena Expr<'types, 'arena>,
        receiver: Option<&'arena Expr<'types, 'arena>>,
        method: &'types MethodDef<'types>,
        args: &'arena [&'arena Expr<'types, 'arena>],
    ) -> VisitResult<'types, 'arena> {
        let type_args: Vec<_> =
            method.type_args.iter().map(|arg| self.substitute_ty(arg)).collect();
        let new_args = self.visit_expr_list(args)?;
        let new_method = self.types.method(method.family, &type_args);
        let rebuilt = self.builder.call(receiver, new_method, new_args);
        debug!(
            before = %render(self.types, self.builder.arena(), original),
            after = %render(self.types, self.builder.arena(), rebuilt),
            "transformed method call"
        );
        Ok(rebuilt)
    }

    fn transform_new(
        &mut self,
        original: &'arena Expr<'types, 'arena>,
        ctor: &'types CtorDef<'types>,
        args: &'arena [&'arena Expr<'types, 'arena>],
        members: Option<&'arena [&'types MemberDef<'types>]>,
    ) -> VisitResult<'types, 'arena> {
        let new_args = self.visit_expr_list(args)?;
        let declaring = self.substitute_ty(ctor.declaring);
        let params: Vec<_> = ctor.params.iter().map(|p| self.substitute_ty(p)).collect();
        let new_ctor = self.types.ctor(declaring, &params).ok_or_else(|| {
            RewriteError::MissingReplacementMember {
                member: format!("constructor/{}", params.len()),
                ty: declaring.to_string(),
            }
        })?;
        let new_members = match members {
            Some(list) => {
                let mut out = Vec::with_capacity(list.len());
                for member in list {
                    let found = self.types.member(declaring, member.name).ok_or_else(|| {
                        RewriteError::MissingReplacementMember {
                            member: member.name.to_string(),
                            ty: declaring.to_string(),
                        }
                    })?;
                    out.push(found);
                }
                debug_assert_eq!(out.len(), list.len());
                Some(out)
            }
            None => None,
        };
        let rebuilt = self.builder.new_with_members(new_ctor, new_args, new_members.as_deref());
        debug!(
            before = %render(self.types, self.builder.arena(), original),
            after = %render(self.types, self.builder.arena(), rebuilt),
            "transformed constructor call"
        );
        Ok(rebuilt)
    }
}

impl<'types, 'arena> ExprVisitor<'types, 'arena> for TypeSubstitution<'types, 'arena> {
    fn builder(&self) -> ExprBuilder<'types, 'arena> {
        self.builder
    }

    // Every node that leaves the rewriter must carry a fully replaced
    // type; a leftover means the registry is missing a replacement
    // counterpart.
    fn visit(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let found = self.dispatch(expr)?;
        if self.needs_change(found.0) {
            return Err(RewriteError::UnresolvedSubstitution {
                node: kind_name(found),
                ty: found.0.to_string(),
            });
        }
        Ok(found)
    }

    fn visit_parameter(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        if let Some(&mapped) = self.params.get(&expr.as_ptr()) {
            return Ok(mapped);
        }
        let ExprInner::Parameter { name } = expr.1 else {
            return Ok(expr);
        };
        if !self.needs_change(expr.0) {
            return Ok(expr);
        }
        let fresh = self.builder.parameter(self.substitute_ty(expr.0), name);
        self.params.insert(expr.as_ptr(), fresh);
        Ok(fresh)
    }

    fn visit_constant(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Constant(value) = expr.1 else {
            return Ok(expr);
        };
        if !self.needs_change(expr.0) {
            return Ok(expr);
        }
        let rebuilt = match value {
            // A null keeps the declared type, replaced.
            Value::Null => self.builder.constant(self.substitute_ty(expr.0), Value::Null),
            // Arrays are retyped element type first, elements after.
            Value::Array { .. } => {
                let converted = self.convert_value(value);
                self.builder.constant(self.substitute_ty(expr.0), converted)
            }
            // Any other value keeps its runtime type; the declared type
            // was only a widening.
            other => match other.runtime_ty(self.types) {
                Some(runtime) => self.builder.constant(runtime, other),
                None => self.builder.constant(self.substitute_ty(expr.0), other),
            },
        };
        Ok(rebuilt)
    }

    fn visit_unary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Unary { op, operand } = expr.1 else {
            return Ok(expr);
        };
        if !self.needs_change(expr.0) {
            return self.walk_unary(expr);
        }
        let new_operand = self.visit(operand)?;
        let new_ty = self.substitute_ty(expr.0);
        Ok(self.builder.unary(op, new_operand, Some(new_ty)))
    }

    fn visit_member(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Member { expr: object, member } = expr.1 else {
            return Ok(expr);
        };
        if !self.needs_change(expr.0) && !self.needs_change(member.declaring) {
            return self.walk_member(expr);
        }
        let new_object = self.visit(object)?;
        let declaring = self.substitute_ty(member.declaring);
        let new_member = self.types.member(declaring, member.name).ok_or_else(|| {
            RewriteError::MissingReplacementMember {
                member: member.name.to_string(),
                ty: declaring.to_string(),
            }
        })?;
        let rebuilt = self.builder.member(new_object, new_member);
        self.walk_member(rebuilt)
    }

    fn visit_call(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Call { receiver, method, args } = expr.1 else {
            return Ok(expr);
        };
        let triggered = self.needs_change(method.ret)
            || method.type_args.iter().any(|arg| self.needs_change(arg))
            || args.iter().any(|arg| self.needs_change(arg.0));
        let expr = if triggered {
            self.transform_call(expr, receiver, method, args)?
        } else {
            expr
        };
        self.walk_call(expr)
    }

    fn visit_new(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::New { ctor, args, members } = expr.1 else {
            return Ok(expr);
        };
        let triggered =
            self.needs_change(expr.0) || args.iter().any(|arg| self.needs_change(arg.0));
        let expr = if triggered {
            self.transform_new(expr, ctor, args, members)?
        } else {
            expr
        };
        self.walk_new(expr)
    }

    fn visit_lambda(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Lambda { params, body } = expr.1 else {
            return Ok(expr);
        };
        if !self.needs_change(expr.0) {
            return self.walk_lambda(expr);
        }
        let new_body = self.visit(body)?;
        let mut new_params = Vec::with_capacity(params.len());
        for param in params {
            new_params.push(self.visit_parameter(param)?);
        }
        Ok(self.builder.lambda(&new_params, new_body))
    }
}
