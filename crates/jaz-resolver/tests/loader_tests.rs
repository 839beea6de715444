//! On-demand loading from the search path: lazy package scopes,
//! placeholder types, root precedence, and the flattened nested-type
//! retry.

use std::fs;
use std::path::PathBuf;

use jaz_common::codes;
use jaz_resolver::{ResolutionContext, ResolvePass, category, resolve};
use tempfile::TempDir;

fn write_source(root: &TempDir, rel: &str, source: &str) {
    let path = root.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

fn ctx_with_roots(roots: &[&TempDir]) -> ResolutionContext {
    ResolutionContext::new(roots.iter().map(|r| r.path().to_path_buf()).collect())
}

#[test]
fn type_loads_on_demand_through_an_import() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/A.jav", "package pkg;\npublic class A { public int n; }\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit("Main.jav", "import pkg.A;\nclass Main { A a; }\n")
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();

    let a = ctx.loaded_types["pkg.A"];
    assert_eq!(ctx.decls.qualified_name(a), "pkg.A");
    // The import alone leaves a placeholder; the field-type use does not
    // force members either, so the source may or may not have loaded. A
    // member access must force it.
    let unit2 = ctx
        .add_unit(
            "Use.jav",
            "import pkg.A;\nclass Use { void f(A a) { a.n = 1; } }\n",
        )
        .unwrap();
    resolve(&mut ctx, unit2, ResolvePass::Names).unwrap();
    assert!(ctx.decls.type_decl(a).source.is_some());
    let scope = ctx.decls.type_decl(a).scope.unwrap();
    assert_eq!(
        ctx.scopes
            .lookup_local(&ctx.decls, scope, "n", category::FIELD)
            .len(),
        1
    );
}

#[test]
fn mutually_referencing_files_load_together() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/A.jav", "package pkg;\npublic class A { B b; }\n");
    write_source(&root, "pkg/B.jav", "package pkg;\npublic class B { A a; }\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit(
            "Main.jav",
            "import pkg.A;\nclass Main { void f(A a) { a.b.a = null; } }\n",
        )
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();

    assert!(ctx.decls.type_decl(ctx.loaded_types["pkg.A"]).source.is_some());
    assert!(ctx.decls.type_decl(ctx.loaded_types["pkg.B"]).source.is_some());
}

#[test]
fn first_search_root_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_source(&first, "pkg/A.jav", "package pkg;\npublic class A { int fromFirst; }\n");
    write_source(&second, "pkg/A.jav", "package pkg;\npublic class A { int fromSecond; }\n");

    let mut ctx = ctx_with_roots(&[&first, &second]);
    let unit = ctx
        .add_unit(
            "Main.jav",
            "class Main { void f(pkg.A a) { a.fromFirst = 1; } }\n",
        )
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();

    let a = ctx.loaded_types["pkg.A"];
    let source_file = ctx.decls.type_decl(a).source_file.clone().unwrap();
    assert!(source_file.starts_with(first.path()));
    let scope = ctx.decls.type_decl(a).scope.unwrap();
    assert_eq!(
        ctx.scopes
            .lookup_local(&ctx.decls, scope, "fromFirst", category::FIELD)
            .len(),
        1
    );
    assert!(ctx
        .scopes
        .lookup_local(&ctx.decls, scope, "fromSecond", category::FIELD)
        .is_empty());
}

#[test]
fn sibling_package_types_visible_without_import() {
    // A unit loaded from a package directory sees its siblings through
    // the shared package scope.
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/Helper.jav", "package pkg;\npublic class Helper {}\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit("Main.jav", "package pkg;\nclass Main { Helper h; }\n")
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();
    assert!(ctx.loaded_types.contains_key("pkg.Helper"));
}

#[test]
fn flattened_nested_type_found_by_dollar_retry() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/Outer.jav", "package pkg;\npublic class Outer {}\n");
    write_source(&root, "pkg/Outer$Inner.jav", "package pkg;\npublic class X {}\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit("Main.jav", "class Main { pkg.Outer.Inner x; }\n")
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();

    let flat = ctx.loaded_types["pkg.Outer$Inner"];
    let u = ctx.unit(unit);
    // The field type resolved to the flattened placeholder.
    let annotated: Vec<_> = u.resolved_entries().map(|(_, d)| d).collect();
    assert!(annotated.contains(&flat));
}

#[test]
fn missing_type_in_existing_package_is_unresolved() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/A.jav", "package pkg;\npublic class A {}\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit("Main.jav", "import pkg.Missing;\nclass Main {}\n")
        .unwrap();
    let err = resolve(&mut ctx, unit, ResolvePass::Package).unwrap_err();
    assert_eq!(err.code, codes::UNRESOLVED_NAME);
}

#[test]
fn wildcard_import_of_a_type_is_not_a_package() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/A.jav", "package pkg;\npublic class A {}\n");

    let mut ctx = ctx_with_roots(&[&root]);
    let unit = ctx
        .add_unit("Main.jav", "import pkg.A.*;\nclass Main {}\n")
        .unwrap();
    let err = resolve(&mut ctx, unit, ResolvePass::Package).unwrap_err();
    assert_eq!(err.code, codes::NOT_A_PACKAGE);
}

#[test]
fn unreadable_search_roots_are_skipped() {
    let root = TempDir::new().unwrap();
    write_source(&root, "pkg/A.jav", "package pkg;\npublic class A {}\n");
    let missing = PathBuf::from("/nonexistent/source/root");

    let mut ctx = ResolutionContext::new(vec![missing, root.path().to_path_buf()]);
    let unit = ctx
        .add_unit("Main.jav", "import pkg.A;\nclass Main { A a; }\n")
        .unwrap();
    resolve(&mut ctx, unit, ResolvePass::Names).unwrap();
    assert!(ctx.loaded_types.contains_key("pkg.A"));
}
