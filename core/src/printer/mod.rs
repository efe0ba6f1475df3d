//! Renders expression trees back to readable text.
//!
//! The layout is deterministic: multi-argument calls, conditionals and
//! initializer blocks break across lines with two-space indentation,
//! everything else stays on one line.

use bumpalo::Bump;

use crate::errors::RewriteError;
use crate::expr::{
    BinaryOp, ElementInit, Expr, ExprBuilder, ExprInner, MemberBinding, UnaryOp, Value,
};
use crate::types::{Ty, TypeRegistry};
use crate::visitor::{ExprVisitor, VisitResult};

const INDENT_WIDTH: usize = 2;

pub fn render<'types, 'arena>(
    types: &'types TypeRegistry<'types>,
    arena: &'arena Bump,
    expr: &'arena Expr<'types, 'arena>,
) -> String {
    let mut out = String::new();
    render_into(&mut out, types, arena, expr);
    out
}

/// Appends the rendering to a caller-supplied buffer. A fresh printer is
/// created per call, so concurrent or nested renders cannot interfere.
pub fn render_into<'types, 'arena>(
    out: &mut String,
    types: &'types TypeRegistry<'types>,
    arena: &'arena Bump,
    expr: &'arena Expr<'types, 'arena>,
) {
    let mut printer = ExprPrinter { builder: ExprBuilder::new(types, arena), out, depth: 0 };
    // Every handler below returns Ok.
    let _ = printer.visit(expr);
}

#[derive(Clone, Copy)]
enum Indentation {
    Same,
    Inner,
    Outer,
}

struct ExprPrinter<'types, 'arena, 'out> {
    builder: ExprBuilder<'types, 'arena>,
    out: &'out mut String,
    depth: usize,
}

impl<'types, 'arena> ExprPrinter<'types, 'arena, '_> {
    /// Writes text, re-indenting any embedded line breaks to the current
    /// depth.
    fn write(&mut self, text: &str) {
        if !text.contains('\n') {
            self.out.push_str(text);
            return;
        }
        let mut first = true;
        for line in text.split(['\n', '\r']).filter(|line| !line.is_empty()) {
            if !first {
                self.write_line(Indentation::Same);
            }
            self.out.push_str(line);
            first = false;
        }
    }

    fn write_line(&mut self, style: Indentation) {
        self.out.push('\n');
        self.indent(style);
        for _ in 0..self.depth * INDENT_WIDTH {
            self.out.push(' ');
        }
    }

    fn indent(&mut self, style: Indentation) {
        match style {
            Indentation::Same => {}
            Indentation::Inner => self.depth += 1,
            Indentation::Outer => self.depth = self.depth.saturating_sub(1),
        }
    }

    fn write_type(&mut self, ty: &'types Ty<'types>) {
        self.write(&ty.to_string());
    }

    fn operator(op: BinaryOp) -> &'static str {
        use BinaryOp::*;
        match op {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            BitAnd => "&",
            BitOr => "|",
            Xor => "^",
            AndAlso => "&&",
            OrElse => "||",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Shl => "<<",
            Shr => ">>",
            Coalesce => "??",
            // Bracket and function notation, handled in visit_binary.
            Pow | ArrayIndex => "",
        }
    }
}

impl<'types, 'arena> ExprVisitor<'types, 'arena> for ExprPrinter<'types, 'arena, '_> {
    fn builder(&self) -> ExprBuilder<'types, 'arena> {
        self.builder
    }

    fn visit_binary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Binary { op, left, right, .. } = expr.1 else {
            return Ok(expr);
        };
        match op {
            BinaryOp::ArrayIndex => {
                self.visit(left)?;
                self.write("[");
                self.visit(right)?;
                self.write("]");
            }
            BinaryOp::Pow => {
                self.write("POW(");
                self.visit(left)?;
                self.write(", ");
                self.visit(right)?;
                self.write(")");
            }
            _ => {
                self.visit(left)?;
                self.write(" ");
                self.write(Self::operator(op));
                self.write(" ");
                self.visit(right)?;
            }
        }
        Ok(expr)
    }

    fn visit_unary(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Unary { op, operand } = expr.1 else {
            return Ok(expr);
        };
        match op {
            UnaryOp::Convert => {
                self.write("((");
                self.write_type(expr.0);
                self.write(")");
                self.visit(operand)?;
                self.write(")");
            }
            UnaryOp::TypeAs => {
                self.visit(operand)?;
                self.write(" as ");
                self.write_type(expr.0);
            }
            UnaryOp::ArrayLength => {
                self.visit(operand)?;
                self.write(".Length");
            }
            UnaryOp::Neg => {
                self.write("-");
                self.visit(operand)?;
            }
            UnaryOp::Not => {
                self.write("!");
                self.visit(operand)?;
            }
            // A quoted or unary-plus operand prints as itself.
            UnaryOp::Plus | UnaryOp::Quote => {
                self.visit(operand)?;
            }
        }
        Ok(expr)
    }

    fn visit_conditional(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Conditional { test, if_true, if_false } = expr.1 else {
            return Ok(expr);
        };
        self.visit(test)?;
        self.write_line(Indentation::Inner);
        self.write("? ");
        self.visit(if_true)?;
        self.write_line(Indentation::Same);
        self.write(": ");
        self.visit(if_false)?;
        self.indent(Indentation::Outer);
        Ok(expr)
    }

    fn visit_constant(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Constant(value) = expr.1 else {
            return Ok(expr);
        };
        match value {
            Value::Null => self.write("null"),
            Value::Str(text) => {
                if text.contains(['\n', '\\']) {
                    self.write("@");
                }
                self.write("\"");
                self.write(text);
                self.write("\"");
            }
            Value::DateTime(text) => {
                self.write("new DateTime(\"");
                self.write(text);
                self.write("\")");
            }
            Value::Array { elem, items } => {
                // Print through the regular array path.
                let builder = self.builder;
                let elements: Vec<_> =
                    items.iter().map(|item| builder.constant(elem, *item)).collect();
                let array = builder.new_array(elem, &elements);
                self.visit_new_array(array)?;
            }
            Value::Bool(b) => self.write(if b { "true" } else { "false" }),
            Value::Int(i) => self.write(&i.to_string()),
            Value::Float(x) => self.write(&x.to_string()),
        }
        Ok(expr)
    }

    fn visit_parameter(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        if let ExprInner::Parameter { name } = expr.1 {
            self.write(name);
        }
        Ok(expr)
    }

    fn visit_member(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Member { expr: object, member } = expr.1 else {
            return Ok(expr);
        };
        self.visit(object)?;
        self.write(".");
        self.write(member.name);
        Ok(expr)
    }

    fn visit_call(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Call { receiver, method, args } = expr.1 else {
            return Ok(expr);
        };
        match receiver {
            Some(object) => {
                self.visit(object)?;
            }
            // Static calls print the declaring type in receiver position.
            None => self.write_type(method.declaring()),
        }
        self.write(".");
        self.write(method.name());
        self.write("(");
        if args.len() > 1 {
            self.write_line(Indentation::Inner);
        }
        self.visit_expr_list(args)?;
        if args.len() > 1 {
            self.write_line(Indentation::Outer);
        }
        self.write(")");
        Ok(expr)
    }

    fn visit_new(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::New { ctor, args, .. } = expr.1 else {
            return Ok(expr);
        };
        self.write("new ");
        self.write_type(ctor.declaring);
        self.write("(");
        if args.len() > 1 {
            self.write_line(Indentation::Inner);
        }
        self.visit_expr_list(args)?;
        if args.len() > 1 {
            self.write_line(Indentation::Outer);
        }
        self.write(")");
        Ok(expr)
    }

    fn visit_new_array(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::NewArray { elem, items } = expr.1 else {
            return Ok(expr);
        };
        self.write("new ");
        self.write_type(elem);
        self.write("[] {");
        if items.len() > 1 {
            self.write_line(Indentation::Inner);
        }
        self.visit_expr_list(items)?;
        if items.len() > 1 {
            self.write_line(Indentation::Outer);
        }
        self.write("}");
        Ok(expr)
    }

    fn visit_list_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::ListInit { new, inits } = expr.1 else {
            return Ok(expr);
        };
        self.visit(new)?;
        self.write(" {");
        self.write_line(Indentation::Inner);
        self.visit_element_init_list(inits)?;
        self.write_line(Indentation::Outer);
        self.write("}");
        Ok(expr)
    }

    fn visit_member_init(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::MemberInit { new, bindings } = expr.1 else {
            return Ok(expr);
        };
        self.visit(new)?;
        self.write(" {");
        self.write_line(Indentation::Inner);
        self.visit_binding_list(bindings)?;
        self.write_line(Indentation::Outer);
        self.write("}");
        Ok(expr)
    }

    fn visit_invoke(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Invoke { callee, args } = expr.1 else {
            return Ok(expr);
        };
        self.write("Invoke(");
        self.write_line(Indentation::Inner);
        self.visit_expr_list(args)?;
        self.write(", ");
        self.write_line(Indentation::Same);
        self.visit(callee)?;
        self.write_line(Indentation::Same);
        self.write(")");
        self.indent(Indentation::Outer);
        Ok(expr)
    }

    fn visit_lambda(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::Lambda { params, body } = expr.1 else {
            return Ok(expr);
        };
        if let [single] = params {
            self.visit_parameter(single)?;
        } else {
            self.write("(");
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.visit_parameter(param)?;
            }
            self.write(")");
        }
        self.write(" => ");
        self.visit(body)?;
        Ok(expr)
    }

    fn visit_type_is(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        let ExprInner::TypeIs { expr: operand, ty } = expr.1 else {
            return Ok(expr);
        };
        self.visit(operand)?;
        self.write(" is ");
        self.write_type(ty);
        Ok(expr)
    }

    // Unknown leaves print their label instead of failing; a rendering
    // is diagnostics output, not a rewrite.
    fn visit_opaque(&mut self, expr: &'arena Expr<'types, 'arena>) -> VisitResult<'types, 'arena> {
        if let ExprInner::Opaque { label } = expr.1 {
            self.write(label);
        }
        Ok(expr)
    }

    fn visit_expr_list(
        &mut self,
        list: &'arena [&'arena Expr<'types, 'arena>],
    ) -> Result<&'arena [&'arena Expr<'types, 'arena>], RewriteError> {
        for (i, expr) in list.iter().enumerate() {
            if i > 0 {
                self.write(",");
                self.write_line(Indentation::Same);
            }
            self.visit(expr)?;
        }
        Ok(list)
    }

    fn visit_element_init(
        &mut self,
        init: ElementInit<'types, 'arena>,
    ) -> Result<ElementInit<'types, 'arena>, RewriteError> {
        if let [single] = init.args {
            self.visit(single)?;
        } else {
            self.write("{");
            for (i, arg) in init.args.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.visit(arg)?;
            }
            self.write("}");
        }
        Ok(init)
    }

    fn visit_element_init_list(
        &mut self,
        list: &'arena [ElementInit<'types, 'arena>],
    ) -> Result<&'arena [ElementInit<'types, 'arena>], RewriteError> {
        for (i, init) in list.iter().enumerate() {
            if i > 0 {
                self.write(",");
                self.write_line(Indentation::Same);
            }
            self.visit_element_init(*init)?;
        }
        Ok(list)
    }

    fn visit_binding(
        &mut self,
        binding: MemberBinding<'types, 'arena>,
    ) -> Result<MemberBinding<'types, 'arena>, RewriteError> {
        match binding {
            MemberBinding::Assignment { member, expr } => {
                self.write(member.name);
                self.write(" = ");
                self.visit(expr)?;
            }
            MemberBinding::Nested { member, bindings } => {
                self.write(member.name);
                self.write(" = {");
                self.write_line(Indentation::Inner);
                self.visit_binding_list(bindings)?;
                self.write_line(Indentation::Outer);
                self.write("}");
            }
            MemberBinding::List { member, inits } => {
                self.write(member.name);
                self.write(" = {");
                self.write_line(Indentation::Inner);
                self.visit_element_init_list(inits)?;
                self.write_line(Indentation::Outer);
                self.write("}");
            }
        }
        Ok(binding)
    }

    fn visit_binding_list(
        &mut self,
        list: &'arena [MemberBinding<'types, 'arena>],
    ) -> Result<&'arena [MemberBinding<'types, 'arena>], RewriteError> {
        for (i, binding) in list.iter().enumerate() {
            if i > 0 {
                self.write(",");
                self.write_line(Indentation::Same);
            }
            self.visit_binding(*binding)?;
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests;
