//! Pass 1 behavior: class linking, inheritance fill-in, override
//! legality, and the abstractness audit.

use jaz_common::codes;
use jaz_resolver::{DeclId, ResolutionContext, ResolvePass, category, resolve};

fn resolve_source(source: &str) -> (ResolutionContext, Result<(), jaz_common::Diagnostic>) {
    let mut ctx = ResolutionContext::new(Vec::new());
    let unit = ctx
        .add_unit("test.jav", source)
        .unwrap_or_else(|d| panic!("parse failed: {d}"));
    let result = resolve(&mut ctx, unit, ResolvePass::Class);
    (ctx, result)
}

fn member(ctx: &ResolutionContext, ty: &str, name: &str, mask: u16) -> DeclId {
    let decl = ctx.loaded_types[ty];
    let scope = ctx.decls.type_decl(decl).scope.unwrap();
    let found = ctx.scopes.lookup_local(&ctx.decls, scope, name, mask);
    assert_eq!(found.len(), 1, "`{ty}` should have exactly one `{name}`");
    found[0]
}

#[test]
fn inherited_members_copied_into_subtype_scope() {
    let (ctx, result) = resolve_source(
        "class Base { int count; void bump() {} }\n\
         class Derived extends Base {}\n",
    );
    result.unwrap();
    // Fill-in copies declarations, not clones of them.
    assert_eq!(
        member(&ctx, "Derived", "count", category::FIELD),
        member(&ctx, "Base", "count", category::FIELD)
    );
    assert_eq!(
        member(&ctx, "Derived", "bump", category::METHOD),
        member(&ctx, "Base", "bump", category::METHOD)
    );
}

#[test]
fn inherited_inner_type_copied_into_subtype_scope() {
    let (ctx, result) = resolve_source(
        "class Base { class Inner {} }\n\
         class Derived extends Base {}\n",
    );
    result.unwrap();
    assert_eq!(
        member(&ctx, "Derived", "Inner", category::TYPE),
        member(&ctx, "Base", "Inner", category::TYPE)
    );
}

#[test]
fn inherited_inner_type_qualifies_through_the_subtype() {
    let (ctx, result) = resolve_source(
        "class Base { class Inner {} }\n\
         class Derived extends Base { Derived.Inner x; }\n",
    );
    result.unwrap();
    let inner = member(&ctx, "Base", "Inner", category::TYPE);
    let x = member(&ctx, "Derived", "x", category::FIELD);
    let ty = match &ctx.decls.get(x).kind {
        jaz_resolver::DeclKind::Field(f) => f.ty.clone(),
        other => panic!("`x` should be a field, got {other:?}"),
    };
    assert_eq!(ty, Some(jaz_resolver::TypeSig::Named(inner)));
}

#[test]
fn superclass_defaults_to_object() {
    let (ctx, result) = resolve_source("class Lone {}\n");
    result.unwrap();
    let lone = ctx.loaded_types["Lone"];
    let sup = ctx.decls.type_decl(lone).superclass.unwrap();
    assert_eq!(ctx.decls.qualified_name(sup), "java.lang.Object");
    // Object's members come down through fill-in.
    member(&ctx, "Lone", "equals", category::METHOD);
}

#[test]
fn override_links_both_directions() {
    let (ctx, result) = resolve_source(
        "class Base { void run() {} }\n\
         class Derived extends Base { void run() {} }\n",
    );
    result.unwrap();
    let base_run = member(&ctx, "Base", "run", category::METHOD);
    let derived_run = member(&ctx, "Derived", "run", category::METHOD);
    assert_ne!(base_run, derived_run);
    assert_eq!(ctx.decls.method_decl(derived_run).overrides, Some(base_run));
    assert_eq!(
        ctx.decls.method_decl(base_run).overridden_by,
        vec![derived_run]
    );
}

#[test]
fn overriding_final_method_is_rejected() {
    let (_, result) = resolve_source(
        "class Base { final void run() {} }\n\
         class Derived extends Base { void run() {} }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::ILLEGAL_OVERRIDE);
}

#[test]
fn narrowing_visibility_is_rejected() {
    let (_, result) = resolve_source(
        "class Base { public void run() {} }\n\
         class Derived extends Base { private void run() {} }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::ILLEGAL_OVERRIDE);
}

#[test]
fn widening_throws_is_rejected() {
    let (_, result) = resolve_source(
        "class Base { void run() {} }\n\
         class Derived extends Base { void run() throws Exception {} }\n",
    );
    assert_eq!(result.unwrap_err().code, codes::ILLEGAL_OVERRIDE);
}

#[test]
fn unchecked_throws_may_be_added() {
    let (_, result) = resolve_source(
        "class Base { void run() {} }\n\
         class Derived extends Base { void run() throws RuntimeException {} }\n",
    );
    result.unwrap();
}

#[test]
fn narrowing_throws_is_allowed() {
    let (_, result) = resolve_source(
        "class Base { void run() throws Exception {} }\n\
         class Derived extends Base { void run() {} }\n",
    );
    result.unwrap();
}

#[test]
fn extending_an_interface_is_rejected() {
    let (_, result) = resolve_source(
        "interface Marker {}\n\
         class Bad extends Marker {}\n",
    );
    assert_eq!(result.unwrap_err().code, codes::EXTENDS_INTERFACE);
}

#[test]
fn implementing_a_class_is_rejected() {
    let (_, result) = resolve_source(
        "class Plain {}\n\
         class Bad implements Plain {}\n",
    );
    assert_eq!(result.unwrap_err().code, codes::IMPLEMENTS_NON_INTERFACE);
}

#[test]
fn unimplemented_abstract_method_is_rejected() {
    let (_, result) = resolve_source(
        "interface Runner { void run(); }\n\
         class Bad implements Runner {}\n",
    );
    assert_eq!(result.unwrap_err().code, codes::ABSTRACT_NOT_IMPLEMENTED);
}

#[test]
fn abstract_class_may_leave_methods_abstract() {
    let (_, result) = resolve_source(
        "interface Runner { void run(); }\n\
         public abstract class Partial implements Runner {}\n",
    );
    result.unwrap();
}

#[test]
fn diamond_interface_inheritance_is_silent() {
    let (ctx, result) = resolve_source(
        "interface Top { void run(); }\n\
         interface Left extends Top {}\n\
         interface Right extends Top {}\n\
         class Both implements Left, Right { public void run() {} }\n",
    );
    result.unwrap();
    // The same inherited declaration arriving twice must not duplicate.
    member(&ctx, "Both", "run", category::METHOD);
}

#[test]
fn implementing_method_records_interface_link() {
    let (ctx, result) = resolve_source(
        "interface Runner { void run(); }\n\
         class Impl implements Runner { public void run() {} }\n",
    );
    result.unwrap();
    let iface_run = member(&ctx, "Runner", "run", category::METHOD);
    let impl_run = member(&ctx, "Impl", "run", category::METHOD);
    assert_eq!(ctx.decls.method_decl(impl_run).implements, vec![iface_run]);
    assert_eq!(ctx.decls.method_decl(impl_run).overrides, None);
}

#[test]
fn inheritance_cycle_terminates() {
    let (_, result) = resolve_source(
        "class A extends B {}\n\
         class B extends A {}\n",
    );
    // Termination is the property under test; the cycle itself is not
    // reported as of today.
    let _ = result;
}

#[test]
fn fill_in_is_idempotent() {
    let mut ctx = ResolutionContext::new(Vec::new());
    let unit = ctx
        .add_unit(
            "test.jav",
            "class Base { int x; }\nclass Derived extends Base {}\n",
        )
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Class).unwrap();
    let derived = ctx.loaded_types["Derived"];
    let scope = ctx.decls.type_decl(derived).scope.unwrap();
    let before = ctx.scopes.entries(scope).len();
    resolve(&mut ctx, unit, ResolvePass::Class).unwrap();
    assert_eq!(ctx.scopes.entries(scope).len(), before);
}
