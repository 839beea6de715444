//! Built-in declarations.
//!
//! The core namespace (`java.lang`) is pre-known: its declarations are
//! synthesized from this compiled-in registry instead of being parsed from
//! source. `install` runs once, from `ResolutionContext::new`, before any
//! user resolution.

use jaz_common::Modifiers;
use smallvec::SmallVec;

use crate::category;
use crate::context::ResolutionContext;
use crate::decl::{Decl, DeclId, DeclKind, FieldDecl, MethodDecl, MethodSig, TypeDecl, TypeSig};

pub(crate) fn install(ctx: &mut ResolutionContext) {
    let java_lang = ctx.get_or_create_package(&["java", "lang"]);
    let lang_scope = ctx.scopes.alloc(Some(ctx.root_scope));
    match &mut ctx.decls.get_mut(java_lang).kind {
        DeclKind::Package { scope, .. } => *scope = Some(lang_scope),
        _ => unreachable!(),
    }
    ctx.java_lang = java_lang;

    // Allocate the type declarations first so members can reference them.
    let object = alloc_type(ctx, java_lang, "Object", category::CLASS, Modifiers::PUBLIC);
    let string = alloc_type(
        ctx,
        java_lang,
        "String",
        category::CLASS,
        Modifiers::PUBLIC | Modifiers::FINAL,
    );
    let cloneable = alloc_type(ctx, java_lang, "Cloneable", category::INTERFACE, Modifiers::PUBLIC);
    let throwable = alloc_type(ctx, java_lang, "Throwable", category::CLASS, Modifiers::PUBLIC);
    let exception = alloc_type(ctx, java_lang, "Exception", category::CLASS, Modifiers::PUBLIC);
    let runtime_exception = alloc_type(
        ctx,
        java_lang,
        "RuntimeException",
        category::CLASS,
        Modifiers::PUBLIC,
    );
    let system = alloc_type(
        ctx,
        java_lang,
        "System",
        category::CLASS,
        Modifiers::PUBLIC | Modifiers::FINAL,
    );

    for &t in &[object, string, cloneable, throwable, exception, runtime_exception, system] {
        ctx.scopes.add(lang_scope, t);
        let qualified = ctx.decls.qualified_name(t);
        ctx.loaded_types.insert(qualified, t);
    }

    link(ctx, object, None);
    link(ctx, string, Some(object));
    link(ctx, cloneable, None);
    link(ctx, throwable, Some(object));
    link(ctx, exception, Some(throwable));
    link(ctx, runtime_exception, Some(exception));
    link(ctx, system, Some(object));

    // Member scopes, chained to the package scope.
    let obj = TypeSig::Named(object);
    let str_ = TypeSig::Named(string);

    let object_scope = member_scope(ctx, object, lang_scope);
    ctor(ctx, object, object_scope, vec![]);
    method(ctx, object, object_scope, "equals", vec![obj.clone()], TypeSig::Prim(jaz_parser::Primitive::Boolean), Modifiers::PUBLIC);
    method(ctx, object, object_scope, "hashCode", vec![], TypeSig::Prim(jaz_parser::Primitive::Int), Modifiers::PUBLIC);
    method(ctx, object, object_scope, "toString", vec![], str_.clone(), Modifiers::PUBLIC);
    method(ctx, object, object_scope, "clone", vec![], obj.clone(), Modifiers::PROTECTED);

    let string_scope = member_scope(ctx, string, lang_scope);
    ctor(ctx, string, string_scope, vec![]);
    method(ctx, string, string_scope, "length", vec![], TypeSig::Prim(jaz_parser::Primitive::Int), Modifiers::PUBLIC);
    method(ctx, string, string_scope, "charAt", vec![TypeSig::Prim(jaz_parser::Primitive::Int)], TypeSig::Prim(jaz_parser::Primitive::Char), Modifiers::PUBLIC);
    method(ctx, string, string_scope, "concat", vec![str_.clone()], str_.clone(), Modifiers::PUBLIC);

    member_scope(ctx, cloneable, lang_scope);

    let throwable_scope = member_scope(ctx, throwable, lang_scope);
    ctor(ctx, throwable, throwable_scope, vec![]);
    ctor(ctx, throwable, throwable_scope, vec![str_.clone()]);
    method(ctx, throwable, throwable_scope, "getMessage", vec![], str_.clone(), Modifiers::PUBLIC);

    let exception_scope = member_scope(ctx, exception, lang_scope);
    ctor(ctx, exception, exception_scope, vec![]);
    ctor(ctx, exception, exception_scope, vec![str_.clone()]);

    let runtime_scope = member_scope(ctx, runtime_exception, lang_scope);
    ctor(ctx, runtime_exception, runtime_scope, vec![]);
    ctor(ctx, runtime_exception, runtime_scope, vec![str_.clone()]);

    let system_scope = member_scope(ctx, system, lang_scope);
    field(ctx, system, system_scope, "out", obj.clone(), Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL);
    method(
        ctx,
        system,
        system_scope,
        "currentTimeMillis",
        vec![],
        TypeSig::Prim(jaz_parser::Primitive::Long),
        Modifiers::PUBLIC | Modifiers::STATIC,
    );

    ctx.object_type = object;
    ctx.runtime_exception = runtime_exception;
    tracing::debug!(types = 7, "installed built-in declarations");
}

fn alloc_type(
    ctx: &mut ResolutionContext,
    container: DeclId,
    name: &str,
    cat: u16,
    modifiers: Modifiers,
) -> DeclId {
    ctx.decls.alloc(Decl {
        name: name.to_string(),
        modifiers,
        kind: DeclKind::Type(TypeDecl {
            category: cat,
            container: Some(container),
            source: None,
            source_file: None,
            superclass: None,
            interfaces: SmallVec::new(),
            scope: None,
        }),
    })
}

fn link(ctx: &mut ResolutionContext, ty: DeclId, superclass: Option<DeclId>) {
    ctx.decls.type_decl_mut(ty).superclass = superclass;
    ctx.class_linked.insert(ty);
}

fn member_scope(ctx: &mut ResolutionContext, ty: DeclId, parent: crate::scope::ScopeId) -> crate::scope::ScopeId {
    let scope = ctx.scopes.alloc(Some(parent));
    ctx.decls.type_decl_mut(ty).scope = Some(scope);
    scope
}

fn ctor(
    ctx: &mut ResolutionContext,
    ty: DeclId,
    scope: crate::scope::ScopeId,
    params: Vec<TypeSig>,
) {
    let name = ctx.decls.name(ty).to_string();
    let decl = ctx.decls.alloc(Decl {
        name,
        modifiers: Modifiers::PUBLIC,
        kind: DeclKind::Method(MethodDecl {
            container: ty,
            source: None,
            is_constructor: true,
            sig: Some(MethodSig {
                params,
                ret: TypeSig::Void,
            }),
            throws: Vec::new(),
            overrides: None,
            overridden_by: Vec::new(),
            implements: Vec::new(),
        }),
    });
    ctx.scopes.add(scope, decl);
}

fn method(
    ctx: &mut ResolutionContext,
    ty: DeclId,
    scope: crate::scope::ScopeId,
    name: &str,
    params: Vec<TypeSig>,
    ret: TypeSig,
    modifiers: Modifiers,
) {
    let decl = ctx.decls.alloc(Decl {
        name: name.to_string(),
        modifiers,
        kind: DeclKind::Method(MethodDecl {
            container: ty,
            source: None,
            is_constructor: false,
            sig: Some(MethodSig { params, ret }),
            throws: Vec::new(),
            overrides: None,
            overridden_by: Vec::new(),
            implements: Vec::new(),
        }),
    });
    ctx.scopes.add(scope, decl);
}

fn field(
    ctx: &mut ResolutionContext,
    ty: DeclId,
    scope: crate::scope::ScopeId,
    name: &str,
    sig: TypeSig,
    modifiers: Modifiers,
) {
    let decl = ctx.decls.alloc(Decl {
        name: name.to_string(),
        modifiers,
        kind: DeclKind::Field(FieldDecl {
            container: ty,
            source: None,
            ty: Some(sig),
        }),
    });
    ctx.scopes.add(scope, decl);
}
