use core::fmt::{self, Write as _};
use core::hash::{Hash, Hasher};

/// Classification of a named type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    /// Value semantics: not null-assignable unless wrapped in `Nullable`.
    Value,
    Class,
    Interface,
}

/// Definition of a named type: the part shared by every instantiation.
///
/// Definitions are arena-allocated by the registry and compared by
/// pointer; two definitions with the same name are still distinct types.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeDef<'types> {
    pub name: &'types str,
    /// Number of generic arguments an instantiation must supply.
    pub arity: usize,
    pub kind: TypeDefKind,
    /// Whether values of this (arity-0) type are integral numbers.
    pub integer: bool,
}

/// A type descriptor.
///
/// Always handed out as `&Ty` interned by a
/// [`TypeRegistry`](super::TypeRegistry), so structurally equal types are
/// pointer-equal and `core::ptr::eq` is the type-equality test. The
/// `PartialEq`/`Hash` impls below compare components by pointer for the
/// same reason; they exist for the intern table.
#[derive(Debug, Clone, Copy)]
pub enum Ty<'types> {
    Named {
        def: &'types TypeDef<'types>,
        /// INVARIANT: `args.len() == def.arity`.
        args: &'types [&'types Ty<'types>],
    },
    Array(&'types Ty<'types>),
    /// Placeholder inside generic method signature templates. Never
    /// appears in a caller-built tree.
    Var(u16),
}

impl PartialEq for Ty<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Ty::Named { def: d1, args: a1 }, Ty::Named { def: d2, args: a2 }) => {
                core::ptr::eq(*d1, *d2)
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2.iter()).all(|(x, y)| core::ptr::eq(*x, *y))
            }
            (Ty::Array(e1), Ty::Array(e2)) => core::ptr::eq(*e1, *e2),
            (Ty::Var(v1), Ty::Var(v2)) => v1 == v2,
            _ => false,
        }
    }
}

impl Eq for Ty<'_> {}

impl Hash for Ty<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Ty::Named { def, args } => {
                core::ptr::hash(*def, state);
                for arg in *args {
                    core::ptr::hash(*arg, state);
                }
            }
            Ty::Array(elem) => core::ptr::hash(*elem, state),
            Ty::Var(id) => id.hash(state),
        }
    }
}

impl<'types> Ty<'types> {
    pub fn as_ptr(&self) -> *const Self {
        self as *const _
    }

    pub fn def(&self) -> Option<&'types TypeDef<'types>> {
        match self {
            Ty::Named { def, .. } => Some(def),
            _ => None,
        }
    }

    pub fn generic_args(&self) -> &'types [&'types Ty<'types>] {
        match self {
            Ty::Named { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_args().is_empty()
    }
}

/// Renders the human-readable name: nested-type `+` separators become
/// `.`, a backtick arity suffix is stripped, and generic arguments are
/// listed in angle brackets.
impl fmt::Display for Ty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Named { def, args } => {
                for ch in def.name.chars() {
                    match ch {
                        '`' => break,
                        '+' => f.write_char('.')?,
                        c => f.write_char(c)?,
                    }
                }
                if !args.is_empty() {
                    f.write_char('<')?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_char(',')?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_char('>')?;
                }
                Ok(())
            }
            Ty::Array(elem) => write!(f, "{elem}[]"),
            Ty::Var(id) => write!(f, "${id}"),
        }
    }
}

/// Whether a member is a plain field or a property accessor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// A field or property of a named type.
#[derive(Debug, PartialEq)]
pub struct MemberDef<'types> {
    pub name: &'types str,
    pub kind: MemberKind,
    pub declaring: &'types Ty<'types>,
    /// Type a read of this member produces.
    pub ty: &'types Ty<'types>,
    read_only: bool,
}

impl<'types> MemberDef<'types> {
    pub(super) fn new(
        name: &'types str,
        kind: MemberKind,
        declaring: &'types Ty<'types>,
        ty: &'types Ty<'types>,
        read_only: bool,
    ) -> Self {
        Self { name, kind, declaring, ty, read_only }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// A constructor overload. Parameter lists hold interned types, so
/// overload lookup is element-wise pointer comparison.
#[derive(Debug, PartialEq)]
pub struct CtorDef<'types> {
    pub declaring: &'types Ty<'types>,
    pub params: &'types [&'types Ty<'types>],
}

/// A method declaration: parameter and return templates over [`Ty::Var`].
/// Non-generic methods are families with `type_params == 0`.
#[derive(Debug, PartialEq)]
pub struct MethodFamily<'types> {
    pub name: &'types str,
    pub declaring: &'types Ty<'types>,
    pub type_params: usize,
    pub params: &'types [&'types Ty<'types>],
    pub ret: &'types Ty<'types>,
}

/// A closed method signature: a family instantiated with type arguments.
#[derive(Debug, PartialEq)]
pub struct MethodDef<'types> {
    pub family: &'types MethodFamily<'types>,
    pub type_args: &'types [&'types Ty<'types>],
    pub params: &'types [&'types Ty<'types>],
    pub ret: &'types Ty<'types>,
}

impl<'types> MethodDef<'types> {
    pub fn name(&self) -> &'types str {
        self.family.name
    }

    pub fn declaring(&self) -> &'types Ty<'types> {
        self.family.declaring
    }
}
