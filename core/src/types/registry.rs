use allocator_api2::vec::Vec as ArenaVec;
use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::{DefaultHashBuilder, HashMap};

use super::ty::{
    CtorDef, MemberDef, MemberKind, MethodDef, MethodFamily, Ty, TypeDef, TypeDefKind,
};

type PtrMap<'types, V> = RefCell<HashMap<*const Ty<'types>, V, DefaultHashBuilder, &'types Bump>>;

/// Interning registry for type descriptors plus the metadata tables
/// (interfaces, base types, members, constructors, method families)
/// that rewriting resolves against.
///
/// Every [`Ty`] handed out by the registry is interned in its arena, so
/// equal types are pointer-equal for the registry's whole lifetime.
#[derive(Debug)]
pub struct TypeRegistry<'types> {
    // Arena holding all types and descriptors from this registry.
    arena: &'types Bump,
    interned_strs: RefCell<HashMap<&'types str, &'types str, DefaultHashBuilder, &'types Bump>>,
    interned: RefCell<HashMap<Ty<'types>, &'types Ty<'types>, DefaultHashBuilder, &'types Bump>>,

    interfaces: PtrMap<'types, ArenaVec<&'types Ty<'types>, &'types Bump>>,
    bases: PtrMap<'types, &'types Ty<'types>>,
    members: PtrMap<'types, ArenaVec<&'types MemberDef<'types>, &'types Bump>>,
    ctors: PtrMap<'types, ArenaVec<&'types CtorDef<'types>, &'types Bump>>,
    func_defs: RefCell<HashMap<usize, &'types TypeDef<'types>, DefaultHashBuilder, &'types Bump>>,

    int_ty: &'types Ty<'types>,
    long_ty: &'types Ty<'types>,
    decimal_ty: &'types Ty<'types>,
    float_ty: &'types Ty<'types>,
    bool_ty: &'types Ty<'types>,
    str_ty: &'types Ty<'types>,
    datetime_ty: &'types Ty<'types>,
    pub(super) nullable_def: &'types TypeDef<'types>,
    sequence_def: &'types TypeDef<'types>,
}

fn builtin<'types>(
    arena: &'types Bump,
    name: &'static str,
    kind: TypeDefKind,
    integer: bool,
) -> &'types Ty<'types> {
    let def = &*arena.alloc(TypeDef { name, arity: 0, kind, integer });
    &*arena.alloc(Ty::Named { def, args: &[] })
}

impl<'types> TypeRegistry<'types> {
    pub fn new(arena: &'types Bump) -> &'types Self {
        let int_ty = builtin(arena, "int", TypeDefKind::Value, true);
        let long_ty = builtin(arena, "long", TypeDefKind::Value, true);
        let decimal_ty = builtin(arena, "decimal", TypeDefKind::Value, false);
        let float_ty = builtin(arena, "float", TypeDefKind::Value, false);
        let bool_ty = builtin(arena, "bool", TypeDefKind::Value, false);
        let str_ty = builtin(arena, "string", TypeDefKind::Class, false);
        let datetime_ty = builtin(arena, "DateTime", TypeDefKind::Value, false);
        let nullable_def = &*arena.alloc(TypeDef {
            name: "Nullable",
            arity: 1,
            kind: TypeDefKind::Value,
            integer: false,
        });
        let sequence_def = &*arena.alloc(TypeDef {
            name: "Sequence",
            arity: 1,
            kind: TypeDefKind::Interface,
            integer: false,
        });

        let registry = arena.alloc(Self {
            arena,
            interned_strs: RefCell::new(HashMap::new_in(arena)),
            interned: RefCell::new(HashMap::new_in(arena)),
            interfaces: RefCell::new(HashMap::new_in(arena)),
            bases: RefCell::new(HashMap::new_in(arena)),
            members: RefCell::new(HashMap::new_in(arena)),
            ctors: RefCell::new(HashMap::new_in(arena)),
            func_defs: RefCell::new(HashMap::new_in(arena)),
            int_ty,
            long_ty,
            decimal_ty,
            float_ty,
            bool_ty,
            str_ty,
            datetime_ty,
            nullable_def,
            sequence_def,
        });
        {
            let mut interned = registry.interned.borrow_mut();
            for ty in [int_ty, long_ty, decimal_ty, float_ty, bool_ty, str_ty, datetime_ty] {
                interned.insert(*ty, ty);
            }
        }
        registry
    }

    pub fn intern_str(&self, s: &str) -> &'types str {
        if let Some(&interned_str) = self.interned_strs.borrow().get(s) {
            return interned_str;
        }
        let arena_str = self.arena.alloc_str(s);
        self.interned_strs.borrow_mut().insert(arena_str, arena_str);
        arena_str
    }

    fn intern(&self, ty: Ty<'types>) -> &'types Ty<'types> {
        if let Some(&interned_ty) = self.interned.borrow().get(&ty) {
            return interned_ty;
        }
        let arena_ty = &*self.arena.alloc(ty);
        self.interned.borrow_mut().insert(ty, arena_ty);
        arena_ty
    }

    // Factory methods for types.
    pub fn int(&self) -> &'types Ty<'types> {
        self.int_ty
    }
    pub fn long(&self) -> &'types Ty<'types> {
        self.long_ty
    }
    pub fn decimal(&self) -> &'types Ty<'types> {
        self.decimal_ty
    }
    pub fn float(&self) -> &'types Ty<'types> {
        self.float_ty
    }
    pub fn bool(&self) -> &'types Ty<'types> {
        self.bool_ty
    }
    pub fn str(&self) -> &'types Ty<'types> {
        self.str_ty
    }
    pub fn datetime(&self) -> &'types Ty<'types> {
        self.datetime_ty
    }

    /// Defines a fresh named type. The definition is not interned:
    /// calling this twice with the same name gives two distinct types.
    pub fn define(&self, name: &str, arity: usize, kind: TypeDefKind) -> &'types TypeDef<'types> {
        let name = self.intern_str(name);
        self.arena.alloc(TypeDef { name, arity, kind, integer: false })
    }

    /// Convenience for the common arity-0 case.
    pub fn declare(&self, name: &str, kind: TypeDefKind) -> &'types Ty<'types> {
        let def = self.define(name, 0, kind);
        self.named(def, &[])
    }

    pub fn named(
        &self,
        def: &'types TypeDef<'types>,
        args: &[&'types Ty<'types>],
    ) -> &'types Ty<'types> {
        debug_assert_eq!(args.len(), def.arity);
        let args = &*self.arena.alloc_slice_copy(args);
        self.intern(Ty::Named { def, args })
    }

    pub fn array(&self, elem: &'types Ty<'types>) -> &'types Ty<'types> {
        self.intern(Ty::Array(elem))
    }

    pub fn var(&self, id: u16) -> &'types Ty<'types> {
        self.intern(Ty::Var(id))
    }

    pub fn nullable(&self, ty: &'types Ty<'types>) -> &'types Ty<'types> {
        self.named(self.nullable_def, &[ty])
    }

    /// The single-parameter sequence interface over `elem`.
    pub fn sequence_of(&self, elem: &'types Ty<'types>) -> &'types Ty<'types> {
        self.named(self.sequence_def, &[elem])
    }

    /// Delegate shape with the given parameter types; the return type is
    /// carried as the last generic argument.
    pub fn func(&self, params: &[&'types Ty<'types>], ret: &'types Ty<'types>) -> &'types Ty<'types> {
        let def = self.func_def(params.len() + 1);
        let mut args = Vec::with_capacity(params.len() + 1);
        args.extend_from_slice(params);
        args.push(ret);
        self.named(def, &args)
    }

    fn func_def(&self, arity: usize) -> &'types TypeDef<'types> {
        if let Some(&def) = self.func_defs.borrow().get(&arity) {
            return def;
        }
        let def = &*self.arena.alloc(TypeDef {
            name: "Func",
            arity,
            kind: TypeDefKind::Class,
            integer: false,
        });
        self.func_defs.borrow_mut().insert(arity, def);
        def
    }

    pub fn is_func(&self, ty: &'types Ty<'types>) -> bool {
        let Ty::Named { def, .. } = ty else {
            return false;
        };
        self.func_defs
            .borrow()
            .get(&def.arity)
            .is_some_and(|d| core::ptr::eq(*d, *def))
    }

    pub fn func_ret(&self, ty: &'types Ty<'types>) -> Option<&'types Ty<'types>> {
        if self.is_func(ty) { ty.generic_args().last().copied() } else { None }
    }

    // Metadata tables.

    pub fn implement(&self, ty: &'types Ty<'types>, iface: &'types Ty<'types>) {
        self.interfaces
            .borrow_mut()
            .entry(ty.as_ptr())
            .or_insert_with(|| ArenaVec::new_in(self.arena))
            .push(iface);
    }

    /// Base chains must stay acyclic; the lookup walks below assume it.
    pub fn set_base(&self, ty: &'types Ty<'types>, base: &'types Ty<'types>) {
        let mut current = Some(base);
        while let Some(t) = current {
            assert!(!core::ptr::eq(t, ty), "base chain cycle through {ty}");
            current = self.base(t);
        }
        self.bases.borrow_mut().insert(ty.as_ptr(), base);
    }

    pub fn add_member(
        &self,
        declaring: &'types Ty<'types>,
        name: &str,
        ty: &'types Ty<'types>,
        kind: MemberKind,
        read_only: bool,
    ) -> &'types MemberDef<'types> {
        let name = self.intern_str(name);
        let member = &*self
            .arena
            .alloc(MemberDef::new(name, kind, declaring, ty, read_only));
        self.members
            .borrow_mut()
            .entry(declaring.as_ptr())
            .or_insert_with(|| ArenaVec::new_in(self.arena))
            .push(member);
        member
    }

    pub fn add_ctor(
        &self,
        declaring: &'types Ty<'types>,
        params: &[&'types Ty<'types>],
    ) -> &'types CtorDef<'types> {
        let ctor = &*self.arena.alloc(CtorDef {
            declaring,
            params: self.arena.alloc_slice_copy(params),
        });
        self.ctors
            .borrow_mut()
            .entry(declaring.as_ptr())
            .or_insert_with(|| ArenaVec::new_in(self.arena))
            .push(ctor);
        ctor
    }

    /// Interfaces directly implemented by `ty`.
    pub fn interfaces(&self, ty: &'types Ty<'types>) -> Vec<&'types Ty<'types>> {
        self.interfaces
            .borrow()
            .get(&ty.as_ptr())
            .map(|list| list.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Interfaces implemented by `ty`, transitively, without duplicates.
    pub fn all_interfaces(&self, ty: &'types Ty<'types>) -> Vec<&'types Ty<'types>> {
        let mut seen: Vec<&'types Ty<'types>> = Vec::new();
        let mut pending = vec![ty];
        while let Some(next) = pending.pop() {
            for iface in self.interfaces(next) {
                if !seen.iter().any(|s| core::ptr::eq(*s, iface)) {
                    seen.push(iface);
                    pending.push(iface);
                }
            }
        }
        seen
    }

    pub fn base(&self, ty: &'types Ty<'types>) -> Option<&'types Ty<'types>> {
        self.bases.borrow().get(&ty.as_ptr()).copied()
    }

    /// Members declared directly on `ty`.
    pub fn members(&self, ty: &'types Ty<'types>) -> Vec<&'types MemberDef<'types>> {
        self.members
            .borrow()
            .get(&ty.as_ptr())
            .map(|list| list.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Looks `name` up on `ty`, then along its base chain.
    pub fn member(&self, ty: &'types Ty<'types>, name: &str) -> Option<&'types MemberDef<'types>> {
        let mut current = Some(ty);
        while let Some(t) = current {
            let found = self
                .members
                .borrow()
                .get(&t.as_ptr())
                .and_then(|list| list.iter().copied().find(|m| m.name == name));
            if found.is_some() {
                return found;
            }
            current = self.base(t);
        }
        None
    }

    /// Exact-overload constructor lookup: parameter lists must match
    /// element-wise by pointer.
    pub fn ctor(
        &self,
        ty: &'types Ty<'types>,
        params: &[&'types Ty<'types>],
    ) -> Option<&'types CtorDef<'types>> {
        self.ctors.borrow().get(&ty.as_ptr()).and_then(|list| {
            list.iter().copied().find(|c| {
                c.params.len() == params.len()
                    && c.params.iter().zip(params).all(|(a, b)| core::ptr::eq(*a, *b))
            })
        })
    }

    pub fn declare_method(
        &self,
        declaring: &'types Ty<'types>,
        name: &str,
        type_params: usize,
        params: &[&'types Ty<'types>],
        ret: &'types Ty<'types>,
    ) -> &'types MethodFamily<'types> {
        let name = self.intern_str(name);
        self.arena.alloc(MethodFamily {
            name,
            declaring,
            type_params,
            params: self.arena.alloc_slice_copy(params),
            ret,
        })
    }

    /// Instantiates a family with closed type arguments.
    pub fn method(
        &self,
        family: &'types MethodFamily<'types>,
        type_args: &[&'types Ty<'types>],
    ) -> &'types MethodDef<'types> {
        debug_assert_eq!(type_args.len(), family.type_params);
        let type_args = &*self.arena.alloc_slice_copy(type_args);
        let params: Vec<_> = family
            .params
            .iter()
            .map(|p| self.instantiate(p, type_args))
            .collect();
        self.arena.alloc(MethodDef {
            family,
            type_args,
            params: self.arena.alloc_slice_copy(&params),
            ret: self.instantiate(family.ret, type_args),
        })
    }

    /// Replaces `Var(i)` with `type_args[i]` throughout a signature
    /// template, reusing nodes that contain no variables.
    pub fn instantiate(
        &self,
        template: &'types Ty<'types>,
        type_args: &[&'types Ty<'types>],
    ) -> &'types Ty<'types> {
        match *template {
            Ty::Var(id) => type_args.get(id as usize).copied().unwrap_or(template),
            Ty::Named { def, args } if !args.is_empty() => {
                let new_args: Vec<_> =
                    args.iter().map(|a| self.instantiate(a, type_args)).collect();
                if new_args.iter().zip(args).all(|(n, o)| core::ptr::eq(*n, *o)) {
                    template
                } else {
                    self.named(def, &new_args)
                }
            }
            Ty::Array(elem) => {
                let new_elem = self.instantiate(elem, type_args);
                if core::ptr::eq(new_elem, elem) { template } else { self.array(new_elem) }
            }
            _ => template,
        }
    }
}
