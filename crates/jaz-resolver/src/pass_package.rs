//! Pass 0: package linking, member registration, import resolution.
//!
//! When this pass finishes, every type the unit declares has a declaration
//! in its package scope and a member scope listing the unit's own members
//! (no inherited ones yet), and the unit's import chain is built:
//!
//! ```text
//! file scope -> on-demand imports -> single imports -> package -> root
//! ```
//!
//! Classes without a written constructor get a public no-arg constructor
//! synthesized directly into the syntax tree, so regeneration prints it
//! and downstream passes never special-case its absence.

use jaz_common::{Diagnostic, Modifiers, Span, codes};
use jaz_parser::{NodeId, NodeKind};

use crate::category;
use crate::context::{ResolutionContext, ResolvePass, UnitId};
use crate::decl::{Decl, DeclId, DeclKind, FieldDecl, MethodDecl, SourceRef, TypeDecl};
use crate::loader;
use crate::scope::ScopeId;

pub fn run(ctx: &mut ResolutionContext, unit: UnitId) -> Result<(), Diagnostic> {
    if ctx.unit(unit).reached(ResolvePass::Package) {
        return Ok(());
    }
    let result = run_inner(ctx, unit);
    let u = ctx.unit_mut(unit);
    match result {
        Ok(()) => {
            u.pass_reached = Some(ResolvePass::Package);
            Ok(())
        }
        Err(err) => {
            u.poisoned = true;
            Err(err)
        }
    }
}

fn run_inner(ctx: &mut ResolutionContext, unit: UnitId) -> Result<(), Diagnostic> {
    let root = ctx.unit(unit).root;
    let (package_name, imports, types) = match ctx.unit(unit).arena.kind(root) {
        NodeKind::CompilationUnit {
            package,
            imports,
            types,
        } => (*package, imports.clone(), types.clone()),
        other => unreachable!("unit root is {other:?}"),
    };
    tracing::debug!(file = %ctx.unit(unit).file, types = types.len(), "package pass");

    let pkg = match package_name {
        Some(name_node) => {
            let parts: Vec<String> = ctx
                .unit(unit)
                .arena
                .name_parts(name_node)
                .into_iter()
                .map(str::to_string)
                .collect();
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            let pkg = ctx.get_or_create_package(&refs);
            ctx.unit_mut(unit).set_decl(name_node, pkg);
            pkg
        }
        None => ctx.root_package,
    };
    ctx.unit_mut(unit).package = Some(pkg);

    let pkg_scope = loader::package_scope(ctx, pkg);
    let single = ctx.scopes.alloc(Some(pkg_scope));
    let on_demand = ctx.scopes.alloc(Some(single));
    let file_scope = ctx.scopes.alloc(Some(on_demand));
    {
        let u = ctx.unit_mut(unit);
        u.single_import_frame = Some(single);
        u.on_demand_frame = Some(on_demand);
        u.file_scope = Some(file_scope);
    }

    // The core package is implicitly wildcard-imported everywhere.
    if let Some(lang_scope) = package_decl_scope(ctx, ctx.java_lang) {
        for entry in ctx.scopes.entries(lang_scope).to_vec() {
            if ctx.decls.get(entry).category() & category::TYPE != 0 {
                ctx.scopes.add(on_demand, entry);
            }
        }
    }

    for ty_node in types {
        register_type(ctx, unit, ty_node, pkg, file_scope, pkg_scope)?;
    }

    for import in imports {
        resolve_import(ctx, unit, import, single, on_demand)?;
    }
    Ok(())
}

fn package_decl_scope(ctx: &ResolutionContext, pkg: DeclId) -> Option<ScopeId> {
    match ctx.decls.get(pkg).kind {
        DeclKind::Package { scope, .. } => scope,
        _ => None,
    }
}

/// Register one class or interface declaration: find-or-create its type
/// declaration in `insert_scope` (merging into a loader placeholder when one
/// exists), then build its member scope and register every member.
fn register_type(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    node: NodeId,
    container: DeclId,
    lexical_scope: ScopeId,
    insert_scope: ScopeId,
) -> Result<DeclId, Diagnostic> {
    let file = ctx.unit(unit).file.clone();
    let span = ctx.unit(unit).arena.span(node);
    let (name, modifiers, mut members, is_class) = match ctx.unit(unit).arena.kind(node) {
        NodeKind::ClassDecl {
            modifiers,
            name,
            members,
            ..
        } => (name.clone(), *modifiers, members.clone(), true),
        NodeKind::InterfaceDecl {
            modifiers,
            name,
            members,
            ..
        } => (name.clone(), *modifiers, members.clone(), false),
        other => unreachable!("type declaration is {other:?}"),
    };
    let cat = if is_class {
        category::CLASS
    } else {
        category::INTERFACE
    };

    let existing = ctx
        .scopes
        .lookup_local(&ctx.decls, insert_scope, &name, category::TYPE)
        .first()
        .copied();
    let decl = match existing {
        Some(d) if ctx.decls.type_decl(d).source.is_none() => d,
        Some(_) => {
            return Err(Diagnostic::error(
                &file,
                codes::DUPLICATE_DECLARATION,
                format!("type `{name}` is already declared in this scope"),
            )
            .with_span(span.start, span.len()));
        }
        None => {
            let d = ctx.decls.alloc(Decl {
                name: name.clone(),
                modifiers: Modifiers::empty(),
                kind: DeclKind::Type(TypeDecl {
                    category: cat,
                    container: Some(container),
                    source: None,
                    source_file: None,
                    superclass: None,
                    interfaces: smallvec::SmallVec::new(),
                    scope: None,
                }),
            });
            ctx.scopes.add(insert_scope, d);
            d
        }
    };
    {
        let entry = ctx.decls.get_mut(decl);
        entry.modifiers = modifiers;
        match &mut entry.kind {
            DeclKind::Type(t) => {
                t.category = cat;
                t.source = Some(SourceRef { unit, node });
            }
            _ => unreachable!(),
        }
    }
    let qualified = ctx.decls.qualified_name(decl);
    ctx.loaded_types.insert(qualified, decl);
    ctx.unit_mut(unit).set_decl(node, decl);

    let member_scope = ctx.scopes.alloc(Some(lexical_scope));
    ctx.decls.type_decl_mut(decl).scope = Some(member_scope);
    ctx.unit_mut(unit).scope_of.insert(node.0, member_scope);

    if is_class && !has_constructor(ctx, unit, &members) {
        let ctor = synthesize_constructor(ctx, unit, node, &name);
        members.push(ctor);
    }

    for member in members {
        register_member(ctx, unit, member, decl, member_scope)?;
    }
    Ok(decl)
}

fn has_constructor(ctx: &ResolutionContext, unit: UnitId, members: &[NodeId]) -> bool {
    members
        .iter()
        .any(|&m| matches!(ctx.unit(unit).arena.kind(m), NodeKind::ConstructorDecl { .. }))
}

/// Append `public <Name>() { super(); }` to the class's member list as real
/// syntax, so a regenerated unit re-parses to the same tree.
fn synthesize_constructor(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    class_node: NodeId,
    name: &str,
) -> NodeId {
    let arena = &mut ctx.unit_mut(unit).arena;
    let body = arena.alloc(NodeKind::Block { stmts: Vec::new() }, Span::EMPTY);
    let ctor = arena.alloc(
        NodeKind::ConstructorDecl {
            modifiers: Modifiers::PUBLIC,
            name: name.to_string(),
            params: Vec::new(),
            throws: Vec::new(),
            super_args: Some(Vec::new()),
            body,
        },
        Span::EMPTY,
    );
    let mut kind = arena.kind(class_node).clone();
    match &mut kind {
        NodeKind::ClassDecl { members, .. } => members.push(ctor),
        _ => unreachable!(),
    }
    arena.replace_kind(class_node, kind);
    tracing::trace!(class = name, "synthesized default constructor");
    ctor
}

fn register_member(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    member: NodeId,
    container: DeclId,
    scope: ScopeId,
) -> Result<(), Diagnostic> {
    let file = ctx.unit(unit).file.clone();
    let span = ctx.unit(unit).arena.span(member);
    match ctx.unit(unit).arena.kind(member) {
        NodeKind::FieldDecl {
            modifiers, name, ..
        } => {
            let name = name.clone();
            let modifiers = *modifiers;
            if !ctx
                .scopes
                .lookup_local(&ctx.decls, scope, &name, category::FIELD)
                .is_empty()
            {
                return Err(Diagnostic::error(
                    &file,
                    codes::DUPLICATE_DECLARATION,
                    format!("field `{name}` is already declared in this type"),
                )
                .with_span(span.start, span.len()));
            }
            let decl = ctx.decls.alloc(Decl {
                name,
                modifiers,
                kind: DeclKind::Field(FieldDecl {
                    container,
                    source: Some(SourceRef { unit, node: member }),
                    ty: None,
                }),
            });
            ctx.scopes.add(scope, decl);
            ctx.unit_mut(unit).set_decl(member, decl);
        }
        NodeKind::MethodDecl {
            modifiers, name, ..
        } => {
            let name = name.clone();
            let modifiers = *modifiers;
            let decl = ctx.decls.alloc(Decl {
                name,
                modifiers,
                kind: DeclKind::Method(MethodDecl {
                    container,
                    source: Some(SourceRef { unit, node: member }),
                    is_constructor: false,
                    sig: None,
                    throws: Vec::new(),
                    overrides: None,
                    overridden_by: Vec::new(),
                    implements: Vec::new(),
                }),
            });
            ctx.scopes.add(scope, decl);
            ctx.unit_mut(unit).set_decl(member, decl);
        }
        NodeKind::ConstructorDecl {
            modifiers, name, ..
        } => {
            let name = name.clone();
            let modifiers = *modifiers;
            let decl = ctx.decls.alloc(Decl {
                name,
                modifiers,
                kind: DeclKind::Method(MethodDecl {
                    container,
                    source: Some(SourceRef { unit, node: member }),
                    is_constructor: true,
                    sig: None,
                    throws: Vec::new(),
                    overrides: None,
                    overridden_by: Vec::new(),
                    implements: Vec::new(),
                }),
            });
            ctx.scopes.add(scope, decl);
            ctx.unit_mut(unit).set_decl(member, decl);
        }
        NodeKind::ClassDecl { .. } | NodeKind::InterfaceDecl { .. } => {
            register_type(ctx, unit, member, container, scope, scope)?;
        }
        // Initializer blocks declare nothing at the type level; their
        // bodies are walked by the name pass.
        NodeKind::InitializerBlock { .. } => {}
        other => unreachable!("type member is {other:?}"),
    }
    Ok(())
}

fn resolve_import(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    import: NodeId,
    single: ScopeId,
    on_demand: ScopeId,
) -> Result<(), Diagnostic> {
    let file = ctx.unit(unit).file.clone();
    let span = ctx.unit(unit).arena.span(import);
    match ctx.unit(unit).arena.kind(import) {
        &NodeKind::ImportSingle { name } => {
            let root = ctx.root_scope;
            let decl = loader::resolve_type_name(ctx, unit, root, name)?;
            let simple = ctx.decls.name(decl).to_string();
            for frame in [single, on_demand] {
                if let Some(&other) = ctx
                    .scopes
                    .lookup_local(&ctx.decls, frame, &simple, category::TYPE)
                    .iter()
                    .find(|&&d| d != decl)
                {
                    return Err(conflicting_import(ctx, &file, span, decl, other));
                }
            }
            ctx.scopes.add(single, decl);
            ctx.unit_mut(unit).set_decl(name, decl);
        }
        &NodeKind::ImportOnDemand { name } => {
            let pkg = loader::resolve_package_name(ctx, unit, name)?;
            let pkg_scope = loader::package_scope(ctx, pkg);
            for entry in ctx.scopes.entries(pkg_scope).to_vec() {
                if ctx.decls.get(entry).category() & category::TYPE == 0 {
                    continue;
                }
                let simple = ctx.decls.name(entry).to_string();
                if let Some(&other) = ctx
                    .scopes
                    .lookup_local(&ctx.decls, single, &simple, category::TYPE)
                    .iter()
                    .find(|&&d| d != entry)
                {
                    return Err(conflicting_import(ctx, &file, span, entry, other));
                }
                ctx.scopes.add(on_demand, entry);
            }
            ctx.unit_mut(unit).set_decl(name, pkg);
        }
        other => unreachable!("import is {other:?}"),
    }
    Ok(())
}

fn conflicting_import(
    ctx: &ResolutionContext,
    file: &str,
    span: Span,
    incoming: DeclId,
    present: DeclId,
) -> Diagnostic {
    Diagnostic::error(
        file,
        codes::CONFLICTING_IMPORT,
        format!(
            "import of `{}` conflicts with already-imported `{}`",
            ctx.decls.qualified_name(incoming),
            ctx.decls.qualified_name(present),
        ),
    )
    .with_span(span.start, span.len())
}
