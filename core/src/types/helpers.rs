//! Introspection queries over registered types: sequence element
//! resolution, nullability, integer classification.

use super::registry::TypeRegistry;
use super::ty::{Ty, TypeDefKind};

impl<'types> TypeRegistry<'types> {
    /// The element type `ty` yields when treated as a sequence, or `ty`
    /// itself when it is not one.
    pub fn element_type(&self, ty: &'types Ty<'types>) -> &'types Ty<'types> {
        match self.find_sequence(ty) {
            Some(seq) => seq.generic_args().first().copied().unwrap_or(ty),
            None => ty,
        }
    }

    /// Finds the `Sequence<T>` instantiation `ty` satisfies, searching
    /// its own generic arguments, then implemented interfaces, then the
    /// base chain, and lastly the array element.
    pub fn find_sequence(&self, ty: &'types Ty<'types>) -> Option<&'types Ty<'types>> {
        if let Ty::Named { args, .. } = ty {
            for arg in *args {
                let candidate = self.sequence_of(arg);
                if self.satisfies(ty, candidate) {
                    return Some(candidate);
                }
            }
        }
        for iface in self.interfaces(ty) {
            if let Some(found) = self.find_sequence(iface) {
                return Some(found);
            }
        }
        if let Some(base) = self.base(ty) {
            if let Some(found) = self.find_sequence(base) {
                return Some(found);
            }
        }
        if let Ty::Array(elem) = ty {
            return Some(self.sequence_of(elem));
        }
        None
    }

    /// Whether `ty` is `target` or reaches it through interfaces or the
    /// base chain.
    pub fn satisfies(&self, ty: &'types Ty<'types>, target: &'types Ty<'types>) -> bool {
        if core::ptr::eq(ty, target) {
            return true;
        }
        if self
            .all_interfaces(ty)
            .iter()
            .any(|iface| core::ptr::eq(*iface, target))
        {
            return true;
        }
        match self.base(ty) {
            Some(base) => self.satisfies(base, target),
            None => false,
        }
    }

    pub fn is_nullable(&self, ty: &'types Ty<'types>) -> bool {
        matches!(ty, Ty::Named { def, .. } if core::ptr::eq(*def, self.nullable_def))
    }

    /// Unwraps one `Nullable` layer, if present.
    pub fn non_nullable(&self, ty: &'types Ty<'types>) -> &'types Ty<'types> {
        if self.is_nullable(ty) {
            ty.generic_args().first().copied().unwrap_or(ty)
        } else {
            ty
        }
    }

    pub fn is_null_assignable(&self, ty: &'types Ty<'types>) -> bool {
        match ty {
            Ty::Named { def, .. } => def.kind != TypeDefKind::Value || self.is_nullable(ty),
            Ty::Array(_) => true,
            Ty::Var(_) => false,
        }
    }

    /// A type that can hold null and every value of `ty`: `ty` itself if
    /// already null-assignable, otherwise `Nullable<ty>`.
    pub fn null_assignable(&self, ty: &'types Ty<'types>) -> &'types Ty<'types> {
        if self.is_null_assignable(ty) { ty } else { self.nullable(ty) }
    }

    pub fn is_integer(&self, ty: &'types Ty<'types>) -> bool {
        matches!(self.non_nullable(ty), Ty::Named { def, .. } if def.integer)
    }
}
