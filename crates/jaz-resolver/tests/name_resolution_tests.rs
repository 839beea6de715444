//! Pass 2 behavior: scoped value lookup, in-place rewriting of bare
//! names, jump-target resolution, and the unused-import lint.

use jaz_common::codes;
use jaz_parser::{NodeId, NodeKind};
use jaz_resolver::{
    ResolutionContext, ResolvePass, Unit, UnitId, category, resolve, unused_imports,
};

fn resolve_source(source: &str) -> (ResolutionContext, UnitId, Result<(), jaz_common::Diagnostic>) {
    let mut ctx = ResolutionContext::new(Vec::new());
    let unit = ctx
        .add_unit("test.jav", source)
        .unwrap_or_else(|d| panic!("parse failed: {d}"));
    let result = resolve(&mut ctx, unit, ResolvePass::Names);
    (ctx, unit, result)
}

fn find_nodes(unit: &Unit, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    (0..unit.arena.len() as u32)
        .map(NodeId)
        .filter(|&n| pred(unit.arena.kind(n)))
        .collect()
}

fn only_node(unit: &Unit, pred: impl Fn(&NodeKind) -> bool) -> NodeId {
    let found = find_nodes(unit, pred);
    assert_eq!(found.len(), 1, "expected exactly one matching node");
    found[0]
}

#[test]
fn local_shadows_field_in_inner_scope() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             int x;\n\
             void f() { int x; x = 1; }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    // The bare `x` in the assignment was rewritten to a local reference.
    let local_ref = only_node(u, |k| matches!(k, NodeKind::LocalRef { .. }));
    let NodeKind::LocalRef { name } = *u.arena.kind(local_ref) else {
        unreachable!()
    };
    let decl = u.decl_of(name).unwrap();
    assert_eq!(ctx.decls.get(decl).category(), category::LOCAL_VAR);
}

#[test]
fn bare_field_name_becomes_this_access() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             int x;\n\
             void f() { x = 1; }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let access = only_node(u, |k| matches!(k, NodeKind::ThisFieldAccess { .. }));
    let NodeKind::ThisFieldAccess { name } = *u.arena.kind(access) else {
        unreachable!()
    };
    let decl = u.decl_of(name).unwrap();
    assert_eq!(ctx.decls.get(decl).category(), category::FIELD);
}

#[test]
fn bare_static_field_name_becomes_type_access() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             static int x;\n\
             void f() { x = 1; }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    only_node(u, |k| matches!(k, NodeKind::TypeFieldAccess { .. }));
    assert!(find_nodes(u, |k| matches!(k, NodeKind::ThisFieldAccess { .. })).is_empty());
}

#[test]
fn label_goes_out_of_scope_with_its_statement() {
    let (_, _, result) = resolve_source(
        "class C {\n\
             void f() {\n\
                 outer: while (true) { break outer; }\n\
                 while (true) { break outer; }\n\
             }\n\
         }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::UNRESOLVED_NAME);
}

#[test]
fn initializer_blocks_are_walked() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             static int n;\n\
             int m;\n\
             static { int t; t = 0; n = t; }\n\
             { m = 1; }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    // `n` in the static block is a static access, `m` an instance access.
    let type_access = only_node(u, |k| matches!(k, NodeKind::TypeFieldAccess { .. }));
    let NodeKind::TypeFieldAccess { name, .. } = *u.arena.kind(type_access) else {
        unreachable!()
    };
    let n = u.decl_of(name).unwrap();
    assert_eq!(ctx.decls.name(n), "n");
    only_node(u, |k| matches!(k, NodeKind::ThisFieldAccess { .. }));
    // The block-local `t` resolved as a local.
    let locals = find_nodes(u, |k| matches!(k, NodeKind::LocalRef { .. }));
    assert_eq!(locals.len(), 2);
}

#[test]
fn initializer_block_locals_do_not_leak() {
    let (_, _, result) = resolve_source(
        "class C {\n\
             static { int t; }\n\
             void f() { t = 1; }\n\
         }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::UNRESOLVED_NAME);
}

#[test]
fn parameter_resolves_before_field() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             int v;\n\
             void f(int v) { v = 1; }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let local_ref = only_node(u, |k| matches!(k, NodeKind::LocalRef { .. }));
    let NodeKind::LocalRef { name } = *u.arena.kind(local_ref) else {
        unreachable!()
    };
    let decl = u.decl_of(name).unwrap();
    assert_eq!(ctx.decls.get(decl).category(), category::PARAMETER);
}

#[test]
fn duplicate_parameter_is_fatal() {
    let (_, _, result) = resolve_source("class C { void f(int a, int a) {} }\n");
    assert_eq!(result.unwrap_err().code, codes::DUPLICATE_DECLARATION);
}

#[test]
fn duplicate_local_in_same_block_is_fatal() {
    let (_, _, result) = resolve_source("class C { void f() { int a; int a; } }\n");
    assert_eq!(result.unwrap_err().code, codes::DUPLICATE_DECLARATION);
}

#[test]
fn nested_block_may_shadow_outer_local() {
    let (_, _, result) = resolve_source("class C { void f() { int a; { int a; } } }\n");
    result.unwrap();
}

#[test]
fn local_shadowing_parameter_is_fatal() {
    let (_, _, result) = resolve_source("class C { void f(int a) { int a; } }\n");
    assert_eq!(result.unwrap_err().code, codes::LOCAL_SHADOWS_PARAMETER);
}

#[test]
fn unlabeled_break_targets_enclosing_loop() {
    let (ctx, unit, result) =
        resolve_source("class C { void f() { while (true) { break; } } }\n");
    result.unwrap();
    let u = ctx.unit(unit);
    let brk = only_node(u, |k| matches!(k, NodeKind::Break { .. }));
    let wh = only_node(u, |k| matches!(k, NodeKind::While { .. }));
    assert_eq!(u.jump_target.get(&brk.0), Some(&wh.0));
}

#[test]
fn break_targets_switch_but_continue_skips_it() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             void f(int n) {\n\
                 while (true) {\n\
                     switch (n) {\n\
                         case 1: break;\n\
                         default: continue;\n\
                     }\n\
                 }\n\
             }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let brk = only_node(u, |k| matches!(k, NodeKind::Break { .. }));
    let cont = only_node(u, |k| matches!(k, NodeKind::Continue { .. }));
    let sw = only_node(u, |k| matches!(k, NodeKind::Switch { .. }));
    let wh = only_node(u, |k| matches!(k, NodeKind::While { .. }));
    assert_eq!(u.jump_target.get(&brk.0), Some(&sw.0));
    assert_eq!(u.jump_target.get(&cont.0), Some(&wh.0));
}

#[test]
fn labeled_break_targets_labeled_statement() {
    let (ctx, unit, result) = resolve_source(
        "class C {\n\
             void f() {\n\
                 outer: while (true) {\n\
                     while (true) { break outer; }\n\
                 }\n\
             }\n\
         }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let brk = only_node(u, |k| matches!(k, NodeKind::Break { .. }));
    let labeled = only_node(u, |k| matches!(k, NodeKind::Labeled { .. }));
    let NodeKind::Labeled { stmt, .. } = *u.arena.kind(labeled) else {
        unreachable!()
    };
    assert_eq!(u.jump_target.get(&brk.0), Some(&stmt.0));
}

#[test]
fn break_outside_loop_is_fatal() {
    let (_, _, result) = resolve_source("class C { void f() { break; } }\n");
    assert_eq!(result.unwrap_err().code, codes::JUMP_OUTSIDE_CONTEXT);
}

#[test]
fn continue_to_non_loop_label_is_fatal() {
    let (_, _, result) = resolve_source(
        "class C {\n\
             void f(int n) {\n\
                 bad: switch (n) {\n\
                     default: continue bad;\n\
                 }\n\
             }\n\
         }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::CONTINUE_NON_LOOP);
}

#[test]
fn unknown_label_is_fatal() {
    let (_, _, result) =
        resolve_source("class C { void f() { while (true) { break missing; } } }\n");
    assert_eq!(result.unwrap_err().code, codes::UNRESOLVED_NAME);
}

#[test]
fn qualified_field_access_is_annotated_not_rewritten() {
    let (ctx, unit, result) = resolve_source(
        "class A { int v; }\n\
         class C { void f(A a) { a.v = 2; } }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let v_name = only_node(u, |k| matches!(k, NodeKind::Name { ident, .. } if ident == "v"));
    let decl = u.decl_of(v_name).unwrap();
    assert_eq!(ctx.decls.get(decl).category(), category::FIELD);
    assert_eq!(ctx.decls.qualified_name(decl), "A.v");
}

#[test]
fn inherited_method_call_resolves() {
    let (ctx, unit, result) = resolve_source(
        "class Base { void run() {} }\n\
         class Derived extends Base {}\n\
         class C { void f(Derived d) { d.run(); } }\n",
    );
    result.unwrap();
    let u = ctx.unit(unit);
    let run_name = only_node(
        u,
        |k| matches!(k, NodeKind::Name { ident, qualifier: Some(_) } if ident == "run"),
    );
    let decl = u.decl_of(run_name).unwrap();
    assert_eq!(ctx.decls.get(decl).category(), category::METHOD);
    assert_eq!(ctx.decls.qualified_name(decl), "Base.run");
}

#[test]
fn java_lang_is_implicitly_imported() {
    let (ctx, unit, result) = resolve_source("class C { String s; }\n");
    result.unwrap();
    let u = ctx.unit(unit);
    let ty_name =
        only_node(u, |k| matches!(k, NodeKind::Name { ident, .. } if ident == "String"));
    assert_eq!(
        u.decl_of(ty_name),
        Some(ctx.loaded_types["java.lang.String"])
    );
}

#[test]
fn ambiguous_wildcard_import_is_fatal_at_use() {
    let mut ctx = ResolutionContext::new(Vec::new());
    let a = ctx
        .add_unit("A.jav", "package liba;\npublic class Util {}\n")
        .unwrap();
    let b = ctx
        .add_unit("B.jav", "package libb;\npublic class Util {}\n")
        .unwrap();
    resolve(&mut ctx, a, ResolvePass::Package).unwrap();
    resolve(&mut ctx, b, ResolvePass::Package).unwrap();

    let unit = ctx
        .add_unit(
            "Main.jav",
            "import liba.*;\nimport libb.*;\nclass Main { void f() { Util u; } }\n",
        )
        .unwrap();
    let err = resolve(&mut ctx, unit, ResolvePass::Names).unwrap_err();
    assert_eq!(err.code, codes::AMBIGUOUS_REFERENCE);
    assert!(err.message.contains("liba.Util"));
    assert!(err.message.contains("libb.Util"));
}

#[test]
fn unused_single_import_is_reported() {
    let mut ctx = ResolutionContext::new(Vec::new());
    let lib = ctx
        .add_unit("Util.jav", "package lib;\npublic class Util {}\n")
        .unwrap();
    resolve(&mut ctx, lib, ResolvePass::Package).unwrap();
    let unit = ctx
        .add_unit("Main.jav", "import lib.Util;\nclass Main {}\n")
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();

    let warnings = unused_imports::check(&ctx, unit);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, codes::UNUSED_IMPORT);
    assert!(!warnings[0].is_error());
}

#[test]
fn used_import_is_not_reported() {
    let mut ctx = ResolutionContext::new(Vec::new());
    let lib = ctx
        .add_unit("Util.jav", "package lib;\npublic class Util {}\n")
        .unwrap();
    resolve(&mut ctx, lib, ResolvePass::Package).unwrap();
    let unit = ctx
        .add_unit(
            "Main.jav",
            "import lib.Util;\nclass Main { Util u; }\n",
        )
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();
    assert!(unused_imports::check(&ctx, unit).is_empty());
}
