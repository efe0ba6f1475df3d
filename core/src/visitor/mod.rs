//! Generic traversal and rewrite framework for expression trees.
//!
//! [`ExprVisitor`] gives every node kind an overridable handler plus a
//! provided `walk_*` that recurses into children and rebuilds the node
//! only when a child actually changed (pointer comparison), so untouched
//! subtrees are shared between input and output. Implementors override
//! the handlers they care about and call back into the walk for the
//! default recursion, the same way a subclass would call its base.

use core::ptr;

use crate::errors::RewriteError;
use crate::expr::{ElementInit, Expr, ExprBuilder, ExprInner, MemberBinding, kind_name};

pub type VisitResult<'types, 'arena> = Result<&'arena Expr<'types, 'arena>, RewriteError>;

fn same_opt<'types, 'arena>(
    a: Option<&'arena Expr<'types, 'arena>>,
    b: Option<&'arena Expr<'types, 'arena>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => ptr::eq(x, y),
        _ => false,
    }
}

fn same_binding(a: &MemberBinding<'_, '_>, b: &MemberBinding<'_, '_>) -> bool {
    match (a, b) {
        (
            MemberBinding::Assignment { expr: x, .. },
            MemberBinding::Assignment { expr: y, .. },
        ) => ptr::eq(*x, *y),
        (
            MemberBinding::Nested { bindings: x, .. },
            MemberBinding::Nested { bindings: y, .. },
        ) => ptr::eq(*x, *y),
        (MemberBinding::List { inits: x, .. }, MemberBinding::List { inits: y, .. }) => {
            ptr::eq(*x, *y)
        }
        _ => false,
    }
}

pub trait ExprVisitor<'types, 'arena> {
    /// Builder used to rebuild changed nodes.
    fn builder(&self) -> ExprBuilder<'types, 'arena>;

    /// Entry point for every (sub)tree. Override to wrap each node visit
    /// with extra work (postconditions, logging) around [`Self::dispatch`].
    fn visit(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.dispatch(expr)
    }

    /// Routes a node to its kind handler.
    fn dispatch(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        match expr.1 {
            ExprInner::Constant(_) => self.visit_constant(expr),
            ExprInner::Parameter { .. } => self.visit_parameter(expr),
            ExprInner::Binary { .. } => self.visit_binary(expr),
            ExprInner::Unary { .. } => self.visit_unary(expr),
            ExprInner::Conditional { .. } => self.visit_conditional(expr),
            ExprInner::Member { .. } => self.visit_member(expr),
            ExprInner::Call { .. } => self.visit_call(expr),
            ExprInner::New { .. } => self.visit_new(expr),
            ExprInner::NewArray { .. } => self.visit_new_array(expr),
            ExprInner::ListInit { .. } => self.visit_list_init(expr),
            ExprInner::MemberInit { .. } => self.visit_member_init(expr),
            ExprInner::Invoke { .. } => self.visit_invoke(expr),
            ExprInner::Lambda { .. } => self.visit_lambda(expr),
            ExprInner::TypeIs { .. } => self.visit_type_is(expr),
            ExprInner::Opaque { .. } => self.visit_opaque(expr),
        }
    }

    fn visit_constant(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        Ok(expr)
    }

    fn visit_parameter(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        Ok(expr)
    }

    fn visit_binary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_binary(expr)
    }

    fn walk_binary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Binary { op, left, right, conversion } = expr.1 else {
            return Ok(expr);
        };
        let new_left = self.visit(left)?;
        let new_right = self.visit(right)?;
        let new_conversion = match conversion {
            Some(conv) => Some(self.visit(conv)?),
            None => None,
        };
        if ptr::eq(new_left, left) && ptr::eq(new_right, right) && same_opt(new_conversion, conversion)
        {
            return Ok(expr);
        }
        Ok(self
            .builder()
            .binary_with_conversion(op, new_left, new_right, new_conversion))
    }

    fn visit_unary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_unary(expr)
    }

    fn walk_unary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Unary { op, operand } = expr.1 else {
            return Ok(expr);
        };
        let new_operand = self.visit(operand)?;
        if ptr::eq(new_operand, operand) {
            return Ok(expr);
        }
        Ok(self.builder().unary(op, new_operand, Some(expr.0)))
    }

    fn visit_conditional(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_conditional(expr)
    }

    fn walk_conditional(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Conditional { test, if_true, if_false } = expr.1 else {
            return Ok(expr);
        };
        let new_test = self.visit(test)?;
        let new_true = self.visit(if_true)?;
        let new_false = self.visit(if_false)?;
        if ptr::eq(new_test, test) && ptr::eq(new_true, if_true) && ptr::eq(new_false, if_false) {
            return Ok(expr);
        }
        Ok(self.builder().conditional(new_test, new_true, new_false))
    }

    fn visit_member(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_member(expr)
    }

    fn walk_member(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Member { expr: object, member } = expr.1 else {
            return Ok(expr);
        };
        let new_object = self.visit(object)?;
        if ptr::eq(new_object, object) {
            return Ok(expr);
        }
        Ok(self.builder().member(new_object, member))
    }

    fn visit_call(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_call(expr)
    }

    fn walk_call(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Call { receiver, method, args } = expr.1 else {
            return Ok(expr);
        };
        let new_receiver = match receiver {
            Some(object) => Some(self.visit(object)?),
            None => None,
        };
        let new_args = self.visit_expr_list(args)?;
        if same_opt(new_receiver, receiver) && ptr::eq(new_args, args) {
            return Ok(expr);
        }
        Ok(self.builder().call(new_receiver, method, new_args))
    }

    fn visit_new(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_new(expr)
    }

    fn walk_new(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::New { ctor, args, members } = expr.1 else {
            return Ok(expr);
        };
        let new_args = self.visit_expr_list(args)?;
        if ptr::eq(new_args, args) {
            return Ok(expr);
        }
        Ok(self.builder().new_with_members(ctor, new_args, members))
    }

    fn visit_new_array(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_new_array(expr)
    }

    fn walk_new_array(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::NewArray { elem, items } = expr.1 else {
            return Ok(expr);
        };
        let new_items = self.visit_expr_list(items)?;
        if ptr::eq(new_items, items) {
            return Ok(expr);
        }
        Ok(self.builder().new_array(elem, new_items))
    }

    fn visit_list_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_list_init(expr)
    }

    fn walk_list_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::ListInit { new, inits } = expr.1 else {
            return Ok(expr);
        };
        let new_new = self.visit(new)?;
        let new_inits = self.visit_element_init_list(inits)?;
        if ptr::eq(new_new, new) && ptr::eq(new_inits, inits) {
            return Ok(expr);
        }
        Ok(self.builder().list_init(new_new, new_inits))
    }

    fn visit_member_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_member_init(expr)
    }

    fn walk_member_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::MemberInit { new, bindings } = expr.1 else {
            return Ok(expr);
        };
        let new_new = self.visit(new)?;
        let new_bindings = self.visit_binding_list(bindings)?;
        if ptr::eq(new_new, new) && ptr::eq(new_bindings, bindings) {
            return Ok(expr);
        }
        Ok(self.builder().member_init(new_new, new_bindings))
    }

    fn visit_invoke(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_invoke(expr)
    }

    // Arguments first, callee second.
    fn walk_invoke(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Invoke { callee, args } = expr.1 else {
            return Ok(expr);
        };
        let new_args = self.visit_expr_list(args)?;
        let new_callee = self.visit(callee)?;
        if ptr::eq(new_callee, callee) && ptr::eq(new_args, args) {
            return Ok(expr);
        }
        Ok(self.builder().invoke(new_callee, new_args))
    }

    fn visit_lambda(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_lambda(expr)
    }

    /// Recurses into the body only; parameter nodes are declarations,
    /// not uses.
    fn walk_lambda(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Lambda { params, body } = expr.1 else {
            return Ok(expr);
        };
        let new_body = self.visit(body)?;
        if ptr::eq(new_body, body) {
            return Ok(expr);
        }
        Ok(self.builder().lambda(params, new_body))
    }

    fn visit_type_is(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        self.walk_type_is(expr)
    }

    fn walk_type_is(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::TypeIs { expr: operand, ty } = expr.1 else {
            return Ok(expr);
        };
        let new_operand = self.visit(operand)?;
        if ptr::eq(new_operand, operand) {
            return Ok(expr);
        }
        Ok(self.builder().type_is(new_operand, ty))
    }

    /// Default: no traversal knows what lives behind an opaque leaf.
    fn visit_opaque(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let kind = match expr.1 {
            ExprInner::Opaque { label } => label.to_string(),
            _ => kind_name(expr).to_string(),
        };
        Err(RewriteError::UnsupportedNodeKind { kind })
    }

    /// Visits each element, sharing the input slice when nothing changed
    /// and copying the unchanged prefix once the first change appears.
    fn visit_expr_list(
        &mut self,
        list: &'arena [&'arena Expr<'types, 'arena>],
    ) -> Result<&'arena [&'arena Expr<'types, 'arena>], RewriteError> {
        let mut rebuilt: Option<Vec<&'arena Expr<'types, 'arena>>> = None;
        for (i, expr) in list.iter().enumerate() {
            let visited = self.visit(expr)?;
            if let Some(out) = rebuilt.as_mut() {
                out.push(visited);
            } else if !ptr::eq(visited, *expr) {
                let mut out = Vec::with_capacity(list.len());
                out.extend_from_slice(&list[..i]);
                out.push(visited);
                rebuilt = Some(out);
            }
        }
        Ok(match rebuilt {
            Some(out) => self.builder().arena().alloc_slice_copy(&out),
            None => list,
        })
    }

    fn visit_element_init(
        &mut self,
        init: ElementInit<'types, 'arena>,
    ) -> Result<ElementInit<'types, 'arena>, RewriteError> {
        let args = self.visit_expr_list(init.args)?;
        if ptr::eq(args, init.args) { Ok(init) } else { Ok(ElementInit { args }) }
    }

    fn visit_element_init_list(
        &mut self,
        list: &'arena [ElementInit<'types, 'arena>],
    ) -> Result<&'arena [ElementInit<'types, 'arena>], RewriteError> {
        let mut rebuilt: Option<Vec<ElementInit<'types, 'arena>>> = None;
        for (i, init) in list.iter().enumerate() {
            let visited = self.visit_element_init(*init)?;
            if let Some(out) = rebuilt.as_mut() {
                out.push(visited);
            } else if !ptr::eq(visited.args, init.args) {
                let mut out = Vec::with_capacity(list.len());
                out.extend_from_slice(&list[..i]);
                out.push(visited);
                rebuilt = Some(out);
            }
        }
        Ok(match rebuilt {
            Some(out) => self.builder().arena().alloc_slice_copy(&out),
            None => list,
        })
    }

    fn visit_binding(
        &mut self,
        binding: MemberBinding<'types, 'arena>,
    ) -> Result<MemberBinding<'types, 'arena>, RewriteError> {
        Ok(match binding {
            MemberBinding::Assignment { member, expr } => {
                MemberBinding::Assignment { member, expr: self.visit(expr)? }
            }
            MemberBinding::Nested { member, bindings } => {
                MemberBinding::Nested { member, bindings: self.visit_binding_list(bindings)? }
            }
            MemberBinding::List { member, inits } => {
                MemberBinding::List { member, inits: self.visit_element_init_list(inits)? }
            }
        })
    }

    fn visit_binding_list(
        &mut self,
        list: &'arena [MemberBinding<'types, 'arena>],
    ) -> Result<&'arena [MemberBinding<'types, 'arena>], RewriteError> {
        let mut rebuilt: Option<Vec<MemberBinding<'types, 'arena>>> = None;
        for (i, binding) in list.iter().enumerate() {
            let visited = self.visit_binding(*binding)?;
            if let Some(out) = rebuilt.as_mut() {
                out.push(visited);
            } else if !same_binding(&visited, binding) {
                let mut out = Vec::with_capacity(list.len());
                out.extend_from_slice(&list[..i]);
                out.push(visited);
                rebuilt = Some(out);
            }
        }
        Ok(match rebuilt {
            Some(out) => self.builder().arena().alloc_slice_copy(&out),
            None => list,
        })
    }
}
