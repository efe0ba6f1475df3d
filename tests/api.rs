//! Smoke test for the facade re-exports.

use pretty_assertions::assert_eq;
use requery::{
    Bump, ExprBuilder, MemberKind, TypeDefKind, TypeRegistry, render, substitute,
};

#[test]
fn facade_exposes_the_full_pipeline() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let dto = types.declare("CustomerDto", TypeDefKind::Class);
    let customer = types.declare("Customer", TypeDefKind::Class);
    for entity in [dto, customer] {
        types.add_member(entity, "Name", types.str(), MemberKind::Property, false);
    }

    let c = builder.parameter(dto, "c");
    let tree = builder.lambda(&[c], builder.member(c, types.member(dto, "Name").unwrap()));

    let result = substitute(types, &arena, tree, &[(dto, customer)]).unwrap();
    assert!(core::ptr::eq(
        result.0,
        types.func(&[customer], types.str())
    ));
    assert_eq!(render(types, &arena, result), "c => c.Name");
}
