//! On-demand declaration loading.
//!
//! Package scopes are built lazily from the search path: scanning a package
//! directory creates child package declarations and *placeholder* type
//! declarations that remember which file can supply their source. A
//! placeholder's source is only parsed when some resolution step actually
//! needs the type's members ([`require`]).

use std::fs;
use std::path::PathBuf;

use jaz_common::{Diagnostic, codes};
use jaz_parser::NodeId;

use crate::category;
use crate::context::{ResolutionContext, UnitId};
use crate::decl::{Decl, DeclId, DeclKind, TypeDecl};
use crate::scope::ScopeId;
use crate::pass_package;

const SOURCE_EXT: &str = "jav";

/// The scope of a package declaration, building it from the search path on
/// first use. Every package scope chains to the root scope.
pub fn package_scope(ctx: &mut ResolutionContext, pkg: DeclId) -> ScopeId {
    if let DeclKind::Package {
        scope: Some(scope), ..
    } = ctx.decls.get(pkg).kind
    {
        return scope;
    }
    let scope = ctx.scopes.alloc(Some(ctx.root_scope));
    match &mut ctx.decls.get_mut(pkg).kind {
        DeclKind::Package { scope: slot, .. } => *slot = Some(scope),
        _ => unreachable!("package_scope on non-package declaration"),
    }
    let qualified = ctx.decls.qualified_name(pkg);
    tracing::debug!(package = %qualified, "building package scope");

    let rel: PathBuf = qualified.split('.').collect();
    // Roots are consulted in order; the first root to define a name wins.
    for root in ctx.search_path.clone() {
        let dir = root.join(&rel);
        let Ok(read) = fs::read_dir(&dir) else {
            continue;
        };
        let mut entries: Vec<PathBuf> = read.filter_map(|e| e.ok().map(|e| e.path())).collect();
        entries.sort();
        for path in entries {
            if path.is_dir() {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if ctx
                    .scopes
                    .lookup_local(&ctx.decls, scope, name, category::PACKAGE)
                    .is_empty()
                {
                    let mut parts: Vec<&str> = qualified.split('.').filter(|p| !p.is_empty()).collect();
                    parts.push(name);
                    // get_or_create_package adds the child to this scope.
                    ctx.get_or_create_package(&parts);
                }
            } else if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT) {
                let Some(stem) = path.file_stem().and_then(|n| n.to_str()).map(str::to_string)
                else {
                    continue;
                };
                if !ctx
                    .scopes
                    .lookup_local(&ctx.decls, scope, &stem, category::TYPE)
                    .is_empty()
                {
                    continue;
                }
                let placeholder = ctx.decls.alloc(Decl {
                    name: stem.clone(),
                    modifiers: jaz_common::Modifiers::empty(),
                    // Class or interface is unknown until the source loads;
                    // placeholders match either mask.
                    kind: DeclKind::Type(TypeDecl {
                        category: category::TYPE,
                        container: Some(pkg),
                        source: None,
                        source_file: Some(path),
                        superclass: None,
                        interfaces: smallvec::SmallVec::new(),
                        scope: None,
                    }),
                });
                ctx.scopes.add(scope, placeholder);
                let type_name = if qualified.is_empty() {
                    stem
                } else {
                    format!("{qualified}.{stem}")
                };
                ctx.loaded_types.insert(type_name, placeholder);
            }
        }
    }
    scope
}

/// Make sure a type declaration has its declaring source attached, loading
/// and package-resolving the placeholder's file if necessary.
pub fn require(ctx: &mut ResolutionContext, ty: DeclId) -> Result<(), Diagnostic> {
    let decl = ctx.decls.type_decl(ty);
    if decl.source.is_some() {
        return Ok(());
    }
    let Some(file) = decl.source_file.clone() else {
        // Synthesized built-ins have no source to load.
        return Ok(());
    };
    let qualified = ctx.decls.qualified_name(ty);
    tracing::debug!(ty = %qualified, file = %file.display(), "loading type on demand");
    let unit = load_file(ctx, &file)?;
    pass_package::run(ctx, unit)?;
    if ctx.decls.type_decl(ty).source.is_none() {
        return Err(Diagnostic::error(
            file.display().to_string(),
            codes::LOAD_FAILED,
            format!("file does not declare type `{qualified}`"),
        ));
    }
    Ok(())
}

/// Parse a source file into the context. Loading the same file twice
/// returns the existing unit.
pub fn load_file(ctx: &mut ResolutionContext, file: &std::path::Path) -> Result<UnitId, Diagnostic> {
    let name = file.display().to_string();
    let source = fs::read_to_string(file).map_err(|err| {
        Diagnostic::error(&name, codes::LOAD_FAILED, format!("cannot read source: {err}"))
    })?;
    ctx.add_unit(&name, &source)
}

/// Resolve a (possibly qualified) type name against a scope chain.
///
/// The head identifier may name a package or a type; each package step
/// descends through package scopes, and each step past a type descends
/// into its member scope (inner types), loading sources as needed. If a
/// dotted path dies at a member step the remaining components are retried
/// as one `$`-joined identifier, which is how nested types loaded from
/// flattened source files appear in their package scope.
pub fn resolve_type_name(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    scope: ScopeId,
    name: NodeId,
) -> Result<DeclId, Diagnostic> {
    let parts: Vec<String> = ctx
        .unit(unit)
        .arena
        .name_parts(name)
        .into_iter()
        .map(str::to_string)
        .collect();
    let file = ctx.unit(unit).file.clone();
    let span = ctx.unit(unit).arena.span(name);

    let head_mask = if parts.len() == 1 {
        category::TYPE
    } else {
        category::PACKAGE | category::TYPE
    };
    let head = match lookup_unique(ctx, &file, span, scope, &parts[0], head_mask) {
        Ok(d) => d,
        Err(err) if err.code == codes::UNRESOLVED_NAME && head_mask & category::PACKAGE != 0 => {
            top_level_package(ctx, &parts[0]).ok_or(err)?
        }
        Err(err) => return Err(err),
    };
    let mut current = head;
    let mut index = 1;
    while index < parts.len() {
        let part = &parts[index];
        let next = match ctx.decls.get(current).kind {
            DeclKind::Package { .. } => {
                let pkg_scope = package_scope(ctx, current);
                ctx.scopes
                    .lookup_local(&ctx.decls, pkg_scope, part, category::PACKAGE | category::TYPE)
                    .first()
                    .copied()
            }
            DeclKind::Type(_) => find_inner_type(ctx, current, part)?,
            _ => {
                return Err(Diagnostic::error(
                    &file,
                    codes::NOT_A_PACKAGE,
                    format!(
                        "`{}` is {} and cannot qualify a type name",
                        ctx.decls.name(current),
                        category::describe(ctx.decls.get(current).category()),
                    ),
                )
                .with_span(span.start, span.len()));
            }
        };
        match next {
            Some(d) => current = d,
            None => {
                // Flattened nested-type retry: `a.b.C.D` may live in the
                // package `a.b` as the single type `C$D`.
                if let Some(found) = dollar_retry(ctx, current, &parts[index - 1..]) {
                    current = found;
                    index = parts.len();
                    continue;
                }
                let dotted = parts.join(".");
                return Err(Diagnostic::error(
                    &file,
                    codes::UNRESOLVED_NAME,
                    format!("cannot resolve `{part}` in `{dotted}`"),
                )
                .with_span(span.start, span.len()));
            }
        }
        index += 1;
    }
    if ctx.decls.get(current).category() & category::TYPE == 0 {
        return Err(Diagnostic::error(
            &file,
            codes::UNRESOLVED_NAME,
            format!("`{}` does not name a type", parts.join(".")),
        )
        .with_span(span.start, span.len()));
    }
    Ok(current)
}

/// Find a nested type by simple name in a type's scope or anywhere up its
/// supertype graph. Inheritance fill-in copies inherited inner types down
/// eventually, but a qualified name can be stepped during class linking,
/// before the copy exists, so the walk follows superclass and interface
/// links directly, linking each type on demand.
fn find_inner_type(
    ctx: &mut ResolutionContext,
    ty: DeclId,
    name: &str,
) -> Result<Option<DeclId>, Diagnostic> {
    let mut pending = vec![ty];
    let mut visited: Vec<DeclId> = Vec::new();
    while let Some(current) = pending.pop() {
        if visited.contains(&current) {
            continue;
        }
        visited.push(current);
        require(ctx, current)?;
        crate::pass_class::link_type(ctx, current)?;
        if let Some(scope) = ctx.decls.type_decl(current).scope
            && let Some(&found) = ctx
                .scopes
                .lookup_local(&ctx.decls, scope, name, category::TYPE)
                .first()
            && (current == ty || !ctx.decls.get(found).is_private())
        {
            return Ok(Some(found));
        }
        let t = ctx.decls.type_decl(current);
        // Interfaces first so the superclass pops first.
        pending.extend(t.interfaces.iter().copied());
        pending.extend(t.superclass);
    }
    Ok(None)
}

/// A top-level package not yet seen in the root scope, created if any
/// search-path root has a directory of that name.
pub fn top_level_package(ctx: &mut ResolutionContext, name: &str) -> Option<DeclId> {
    if let Some(&pkg) = ctx.packages.get(name) {
        return Some(pkg);
    }
    for root in ctx.search_path.clone() {
        if root.join(name).is_dir() {
            return Some(ctx.get_or_create_package(&[name]));
        }
    }
    None
}

/// Resolve a dotted name where every component must be a package.
pub fn resolve_package_name(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    name: NodeId,
) -> Result<DeclId, Diagnostic> {
    let parts: Vec<String> = ctx
        .unit(unit)
        .arena
        .name_parts(name)
        .into_iter()
        .map(str::to_string)
        .collect();
    let file = ctx.unit(unit).file.clone();
    let span = ctx.unit(unit).arena.span(name);

    let root = ctx.root_scope;
    let head = match lookup_unique(ctx, &file, span, root, &parts[0], category::PACKAGE) {
        Ok(d) => d,
        Err(err) if err.code == codes::UNRESOLVED_NAME => {
            top_level_package(ctx, &parts[0]).ok_or(err)?
        }
        Err(err) => return Err(err),
    };
    let mut current = head;
    for part in &parts[1..] {
        let pkg_scope = package_scope(ctx, current);
        match ctx
            .scopes
            .lookup_local(&ctx.decls, pkg_scope, part, category::PACKAGE)
            .first()
            .copied()
        {
            Some(child) => current = child,
            None => {
                return Err(Diagnostic::error(
                    &file,
                    codes::NOT_A_PACKAGE,
                    format!("`{}` is not a package in `{}`", part, parts.join(".")),
                )
                .with_span(span.start, span.len()));
            }
        }
    }
    Ok(current)
}

/// Retry the tail of a failed dotted lookup as one `$`-joined name in the
/// package containing the last successfully resolved type.
fn dollar_retry(ctx: &mut ResolutionContext, last: DeclId, tail: &[String]) -> Option<DeclId> {
    let DeclKind::Type(t) = &ctx.decls.get(last).kind else {
        return None;
    };
    let pkg = t.container?;
    if !matches!(ctx.decls.get(pkg).kind, DeclKind::Package { .. }) {
        return None;
    }
    let joined = tail.join("$");
    let pkg_scope = package_scope(ctx, pkg);
    ctx.scopes
        .lookup_local(&ctx.decls, pkg_scope, &joined, category::TYPE)
        .first()
        .copied()
}

/// Resolve one identifier against a scope chain, rejecting ambiguity.
///
/// The nearest frame with any match supplies the candidates; distinct
/// declarations in the same frame are a fatal ambiguity (typically two
/// wildcard imports bringing in the same simple name). The same
/// declaration reached twice is not ambiguous.
pub fn lookup_unique(
    ctx: &mut ResolutionContext,
    file: &str,
    span: jaz_common::Span,
    scope: ScopeId,
    name: &str,
    mask: u16,
) -> Result<DeclId, Diagnostic> {
    match ctx.scopes.lookup(&ctx.decls, scope, name, mask) {
        Some((frame, found)) => {
            let first = found[0];
            if let Some(&other) = found.iter().find(|&&d| d != first) {
                return Err(Diagnostic::error(
                    file,
                    codes::AMBIGUOUS_REFERENCE,
                    format!(
                        "reference to `{name}` is ambiguous: both `{}` and `{}` match",
                        ctx.decls.qualified_name(first),
                        ctx.decls.qualified_name(other),
                    ),
                )
                .with_span(span.start, span.len()));
            }
            // Type and package names shadowed in an outer frame resolve to
            // the nearest one, with a warning rather than an error.
            if mask & (category::TYPE | category::PACKAGE) != 0
                && let Some(outer) = ctx.scopes.parent(frame)
                && let Some((_, shadowed)) = ctx.scopes.lookup(&ctx.decls, outer, name, mask)
                && shadowed[0] != first
            {
                tracing::warn!(
                    chosen = %ctx.decls.qualified_name(first),
                    shadowed = %ctx.decls.qualified_name(shadowed[0]),
                    "`{name}` matches in more than one scope; using the nearest"
                );
            }
            Ok(first)
        }
        None => Err(Diagnostic::error(
            file,
            codes::UNRESOLVED_NAME,
            format!(
                "cannot resolve `{name}` as {}; searched:\n{}",
                category::describe(mask),
                ctx.scopes.dump(&ctx.decls, scope),
            ),
        )
        .with_span(span.start, span.len())),
    }
}
