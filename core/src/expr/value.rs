use crate::types::{Ty, TypeRegistry};

/// A literal carried by a `Constant` node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'types, 'arena> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'arena str),
    /// Date-times are carried pre-formatted; nothing in the tree
    /// machinery does calendar arithmetic on them.
    DateTime(&'arena str),
    Array {
        elem: &'types Ty<'types>,
        items: &'arena [Value<'types, 'arena>],
    },
}

impl<'types, 'arena> Value<'types, 'arena> {
    /// The type the value itself witnesses, independent of the declared
    /// type of the node carrying it. `Null` witnesses none.
    pub fn runtime_ty(&self, types: &TypeRegistry<'types>) -> Option<&'types Ty<'types>> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(types.bool()),
            Value::Int(_) => Some(types.int()),
            Value::Float(_) => Some(types.float()),
            Value::Str(_) => Some(types.str()),
            Value::DateTime(_) => Some(types.datetime()),
            Value::Array { elem, .. } => Some(types.array(elem)),
        }
    }

    /// The default value of `ty`: null where null is assignable,
    /// otherwise a zero of the matching scalar shape.
    pub fn default_for(types: &TypeRegistry<'types>, ty: &'types Ty<'types>) -> Self {
        if types.is_null_assignable(ty) {
            return Value::Null;
        }
        if core::ptr::eq(ty, types.bool()) {
            return Value::Bool(false);
        }
        if types.is_integer(ty) {
            return Value::Int(0);
        }
        if core::ptr::eq(ty, types.float()) || core::ptr::eq(ty, types.decimal()) {
            return Value::Float(0.0);
        }
        if core::ptr::eq(ty, types.datetime()) {
            return Value::DateTime("0001-01-01 00:00:00");
        }
        Value::Null
    }
}
