use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::expr::{BinaryOp, ElementInit, ExprBuilder, MemberBinding, UnaryOp, Value};
use crate::types::{MemberKind, TypeDefKind, TypeRegistry};

use super::render;

#[test]
fn infix_binaries_print_without_parentheses() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let a = builder.parameter(types.int(), "a");
    let b = builder.parameter(types.int(), "b");
    let c = builder.parameter(types.int(), "c");
    let tree = builder.binary(BinaryOp::Eq, builder.binary(BinaryOp::Add, a, b), c);

    assert_eq!(render(types, &arena, tree), "a + b == c");
}

#[test]
fn power_and_indexing_use_their_own_notation() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let a = builder.parameter(types.float(), "a");
    let b = builder.parameter(types.float(), "b");
    assert_eq!(render(types, &arena, builder.binary(BinaryOp::Pow, a, b)), "POW(a, b)");

    let xs = builder.parameter(types.array(types.int()), "xs");
    let zero = builder.constant(types.int(), Value::Int(0));
    assert_eq!(
        render(types, &arena, builder.binary(BinaryOp::ArrayIndex, xs, zero)),
        "xs[0]"
    );
}

#[test]
fn conditionals_break_across_indented_lines() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let tree = builder.conditional(
        builder.parameter(types.bool(), "flag"),
        builder.constant(types.int(), Value::Int(1)),
        builder.constant(types.int(), Value::Int(2)),
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            flag
              ? 1
              : 2"}
    );
}

#[test]
fn multi_argument_calls_break_one_argument_per_line() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let math = types.declare("Math", TypeDefKind::Class);
    let family = types.declare_method(math, "Max", 0, &[types.int(), types.int()], types.int());
    let tree = builder.call(
        None,
        types.method(family, &[]),
        &[builder.parameter(types.int(), "a"), builder.parameter(types.int(), "b")],
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            Math.Max(
              a,
              b
            )"}
    );
}

#[test]
fn single_argument_calls_stay_inline() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let queryable = types.declare("Queryable", TypeDefKind::Class);
    let first = types.declare_method(
        queryable,
        "First",
        1,
        &[types.sequence_of(types.var(0))],
        types.var(0),
    );
    let xs = builder.parameter(types.sequence_of(types.int()), "xs");
    let tree = builder.call(None, types.method(first, &[types.int()]), &[xs]);

    assert_eq!(render(types, &arena, tree), "Queryable.First(xs)");
}

#[test]
fn string_constants_mark_embedded_escapes_verbatim() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let plain = builder.constant(types.str(), Value::Str("hello"));
    assert_eq!(render(types, &arena, plain), "\"hello\"");

    let tricky = builder.constant(types.str(), Value::Str("a\\b"));
    assert_eq!(render(types, &arena, tricky), "@\"a\\b\"");
}

#[test]
fn embedded_newlines_are_reindented_to_the_current_depth() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let math = types.declare("Text", TypeDefKind::Class);
    let family = types.declare_method(math, "Pair", 0, &[types.int(), types.str()], types.str());
    let tree = builder.call(
        None,
        types.method(family, &[]),
        &[
            builder.parameter(types.int(), "a"),
            builder.constant(types.str(), Value::Str("x\ny")),
        ],
    );

    assert_eq!(
        render(types, &arena, tree),
        "Text.Pair(\n  a,\n  @\"x\n  y\"\n)"
    );
}

#[test]
fn date_and_null_constants_have_fixed_forms() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let date = builder.constant(types.datetime(), Value::DateTime("2009-01-01 00:00:00"));
    assert_eq!(render(types, &arena, date), "new DateTime(\"2009-01-01 00:00:00\")");

    let order = types.declare("Order", TypeDefKind::Class);
    let null = builder.constant(order, Value::Null);
    assert_eq!(render(types, &arena, null), "null");
}

#[test]
fn array_constants_print_as_array_initializers() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let items: &[Value] = &[Value::Int(1), Value::Int(2), Value::Int(3)];
    let tree = builder.constant(
        types.array(types.int()),
        Value::Array { elem: types.int(), items },
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            new int[] {
              1,
              2,
              3
            }"}
    );
}

#[test]
fn single_element_arrays_stay_inline() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let one = builder.constant(types.int(), Value::Int(1));
    let tree = builder.new_array(types.int(), &[one]);
    assert_eq!(render(types, &arena, tree), "new int[] {1}");
}

#[test]
fn lambdas_parenthesize_only_multiple_parameters() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let x = builder.parameter(types.int(), "x");
    let single = builder.lambda(&[x], x);
    assert_eq!(render(types, &arena, single), "x => x");

    let y = builder.parameter(types.int(), "y");
    let pair = builder.lambda(&[x, y], builder.binary(BinaryOp::Add, x, y));
    assert_eq!(render(types, &arena, pair), "(x, y) => x + y");
}

#[test]
fn unary_forms_follow_their_operand_shapes() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let x = builder.parameter(types.int(), "x");
    assert_eq!(
        render(types, &arena, builder.unary(UnaryOp::Convert, x, Some(types.long()))),
        "((long)x)"
    );
    let order = types.declare("Order", TypeDefKind::Class);
    let o = builder.parameter(order, "o");
    assert_eq!(
        render(types, &arena, builder.unary(UnaryOp::TypeAs, o, Some(order))),
        "o as Order"
    );
    let xs = builder.parameter(types.array(types.int()), "xs");
    assert_eq!(
        render(types, &arena, builder.unary(UnaryOp::ArrayLength, xs, None)),
        "xs.Length"
    );
    let flag = builder.parameter(types.bool(), "flag");
    assert_eq!(render(types, &arena, builder.unary(UnaryOp::Not, flag, None)), "!flag");
    assert_eq!(render(types, &arena, builder.unary(UnaryOp::Neg, x, None)), "-x");
    // Quote is transparent.
    let lambda = builder.lambda(&[x], x);
    assert_eq!(
        render(types, &arena, builder.unary(UnaryOp::Quote, lambda, None)),
        "x => x"
    );
}

#[test]
fn generic_type_names_render_recursively() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let order = types.declare("Order", TypeDefKind::Class);
    let xs = builder.parameter(types.str(), "xs");
    let tree = builder.unary(UnaryOp::Convert, xs, Some(types.sequence_of(order)));
    assert_eq!(render(types, &arena, tree), "((Sequence<Order>)xs)");
}

#[test]
fn member_initializers_indent_their_bindings() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let order = types.declare("Order", TypeDefKind::Class);
    types.add_ctor(order, &[]);
    let total = types.add_member(order, "Total", types.decimal(), MemberKind::Property, false);
    let note = types.add_member(order, "Note", types.str(), MemberKind::Property, false);

    let tree = builder.member_init(
        builder.new_object(types.ctor(order, &[]).unwrap(), &[]),
        &[
            MemberBinding::Assignment {
                member: total,
                expr: builder.constant(types.decimal(), Value::Float(1.0)),
            },
            MemberBinding::Assignment {
                member: note,
                expr: builder.constant(types.str(), Value::Str("rush")),
            },
        ],
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            new Order() {
              Total = 1,
              Note = \"rush\"
            }"}
    );
}

#[test]
fn nested_and_list_bindings_indent_like_blocks() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let address = types.declare("Address", TypeDefKind::Class);
    let city = types.add_member(address, "City", types.str(), MemberKind::Property, false);
    let order = types.declare("Order", TypeDefKind::Class);
    types.add_ctor(order, &[]);
    let home = types.add_member(order, "Home", address, MemberKind::Property, false);
    let tags =
        types.add_member(order, "Tags", types.array(types.str()), MemberKind::Property, false);

    let nested_bindings = &*arena.alloc_slice_copy(&[MemberBinding::Assignment {
        member: city,
        expr: builder.constant(types.str(), Value::Str("Reno")),
    }]);
    let inits = &*arena.alloc_slice_copy(&[
        builder.element_init(&[builder.constant(types.str(), Value::Str("a"))]),
        builder.element_init(&[builder.constant(types.str(), Value::Str("b"))]),
    ]);
    let tree = builder.member_init(
        builder.new_object(types.ctor(order, &[]).unwrap(), &[]),
        &[
            MemberBinding::Nested { member: home, bindings: nested_bindings },
            MemberBinding::List { member: tags, inits },
        ],
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            new Order() {
              Home = {
                City = \"Reno\"
              },
              Tags = {
                \"a\",
                \"b\"
              }
            }"}
    );
}

#[test]
fn list_initializers_indent_their_elements() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let list = types.declare("List", TypeDefKind::Class);
    types.add_ctor(list, &[]);
    let one = builder.constant(types.int(), Value::Int(1));
    let two = builder.constant(types.int(), Value::Int(2));
    let tree = builder.list_init(
        builder.new_object(types.ctor(list, &[]).unwrap(), &[]),
        &[
            ElementInit { args: arena.alloc_slice_copy(&[one]) },
            ElementInit { args: arena.alloc_slice_copy(&[two]) },
        ],
    );

    assert_eq!(
        render(types, &arena, tree),
        indoc! {"
            new List() {
              1,
              2
            }"}
    );
}

#[test]
fn invocations_list_arguments_before_the_callee() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let x = builder.parameter(types.int(), "x");
    let callee = builder.lambda(&[x], x);
    let tree = builder.invoke(callee, &[builder.constant(types.int(), Value::Int(7))]);

    assert_eq!(render(types, &arena, tree), "Invoke(\n  7, \n  x => x\n  )");
}

#[test]
fn type_tests_and_opaque_leaves_print_inline() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let order = types.declare("Order", TypeDefKind::Class);
    let o = builder.parameter(types.str(), "o");
    assert_eq!(render(types, &arena, builder.type_is(o, order)), "o is Order");

    let raw = builder.opaque(order, "RawSql(\"select 1\")");
    assert_eq!(render(types, &arena, raw), "RawSql(\"select 1\")");
}

#[test]
fn rendering_is_deterministic() {
    let type_arena = Bump::new();
    let types = TypeRegistry::new(&type_arena);
    let arena = Bump::new();
    let builder = ExprBuilder::new(types, &arena);

    let tree = builder.conditional(
        builder.parameter(types.bool(), "flag"),
        builder.constant(types.str(), Value::Str("yes")),
        builder.constant(types.str(), Value::Str("no")),
    );

    assert_eq!(render(types, &arena, tree), render(types, &arena, tree));
}
