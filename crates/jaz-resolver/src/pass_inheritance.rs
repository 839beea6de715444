//! Pass 1, sub-pass B: inheritance fill-in.
//!
//! Copies inherited members down into each type's scope so later lookups
//! never have to walk the supertype graph. Copying moves `DeclId`s, not
//! clones: an inherited member in a subtype scope is the same declaration
//! as in the supertype, which is what makes the diamond case (one
//! declaration arriving along two interface paths) a silent no-op.
//!
//! The superclass is filled in before interfaces, so a concrete method
//! inherited from the superclass is in place to satisfy like-signatured
//! interface methods.

use jaz_common::{Diagnostic, Modifiers, Span, codes};

use crate::category;
use crate::context::{ResolutionContext, UnitId};
use crate::decl::{DeclId, DeclKind};
use crate::loader;
use crate::pass_class;
use crate::scope::ScopeId;

/// Fill in inherited members for every type this unit declares.
/// Requires sub-pass A.
pub fn fill_unit(ctx: &mut ResolutionContext, unit: UnitId) -> Result<(), Diagnostic> {
    for ty in pass_class::declared_types(ctx, unit) {
        ensure_filled(ctx, ty)?;
    }
    Ok(())
}

/// Fill a type's scope with inherited members, forcing its supertypes
/// first. Idempotent; a type is marked done before the supertype recursion
/// so cycles terminate.
pub(crate) fn ensure_filled(ctx: &mut ResolutionContext, ty: DeclId) -> Result<(), Diagnostic> {
    if ctx.inheritance_done.contains(&ty) {
        return Ok(());
    }
    ctx.inheritance_done.insert(ty);

    loader::require(ctx, ty)?;
    pass_class::link_type(ctx, ty)?;
    let t = ctx.decls.type_decl(ty);
    let superclass = t.superclass;
    let interfaces: Vec<DeclId> = t.interfaces.iter().copied().collect();
    let Some(scope) = t.scope else {
        return Ok(());
    };
    tracing::debug!(ty = %ctx.decls.qualified_name(ty), "inheritance fill-in");

    if let Some(sup) = superclass {
        ensure_filled(ctx, sup)?;
        copy_down(ctx, sup, ty, scope)?;
    }
    for iface in interfaces {
        ensure_filled(ctx, iface)?;
        copy_down(ctx, iface, ty, scope)?;
    }

    audit_abstractness(ctx, ty, scope)?;
    Ok(())
}

/// Copy the inheritable members of `from`'s scope into `to`'s scope,
/// wiring override links where `to` already declares a matching method.
fn copy_down(
    ctx: &mut ResolutionContext,
    from: DeclId,
    to: DeclId,
    to_scope: ScopeId,
) -> Result<(), Diagnostic> {
    let from_scope = match ctx.decls.type_decl(from).scope {
        Some(s) => s,
        None => return Ok(()),
    };
    let from_is_interface = ctx.decls.type_decl(from).category == category::INTERFACE;
    let inherited: Vec<DeclId> = ctx.scopes.entries(from_scope).to_vec();

    for decl in inherited {
        let entry = ctx.decls.get(decl);
        if entry.is_private() {
            continue;
        }
        match &entry.kind {
            DeclKind::Field(_) => {
                let name = entry.name.clone();
                // A field of the same name in the subtype shadows the
                // inherited one; the same declaration arriving twice
                // (diamond) is skipped.
                let present = ctx
                    .scopes
                    .lookup_local(&ctx.decls, to_scope, &name, category::FIELD)
                    .first()
                    .copied();
                if present.is_none() {
                    ctx.scopes.add(to_scope, decl);
                }
            }
            DeclKind::Method(m) => {
                if m.is_constructor {
                    continue;
                }
                let name = entry.name.clone();
                let sig_params = m.sig.as_ref().map(|s| s.params.clone());
                let candidates =
                    ctx.scopes
                        .lookup_local(&ctx.decls, to_scope, &name, category::METHOD);
                let matching = candidates.into_iter().find(|&c| {
                    let cm = ctx.decls.method_decl(c);
                    cm.sig.as_ref().map(|s| s.params.clone()) == sig_params
                });
                match matching {
                    Some(c) if c == decl => {}
                    Some(c) if ctx.decls.method_decl(c).container == to => {
                        check_override(ctx, to, c, decl)?;
                        if from_is_interface {
                            ctx.decls.method_decl_mut(c).implements.push(decl);
                        } else {
                            ctx.decls.method_decl_mut(c).overrides = Some(decl);
                        }
                        ctx.decls.method_decl_mut(decl).overridden_by.push(c);
                    }
                    Some(c) => {
                        // Already satisfied by a member inherited earlier
                        // (superclass fills before interfaces).
                        if from_is_interface && c != decl {
                            ctx.decls.method_decl_mut(c).implements.push(decl);
                            ctx.decls.method_decl_mut(decl).overridden_by.push(c);
                        }
                    }
                    None => ctx.scopes.add(to_scope, decl),
                }
            }
            DeclKind::Type(_) => {
                let name = entry.name.clone();
                // A same-named type declared in the subtype hides the
                // inherited one; a diamond repeat is the same declaration.
                let present = ctx
                    .scopes
                    .lookup_local(&ctx.decls, to_scope, &name, category::TYPE)
                    .first()
                    .copied();
                if present.is_none() {
                    ctx.scopes.add(to_scope, decl);
                }
            }
            // Constructors are handled above; nothing else flows down.
            _ => {}
        }
    }
    Ok(())
}

/// Reject overrides the language forbids: final or static supertype
/// methods, visibility narrowing, changed return types, and broadened
/// checked-throws sets.
fn check_override(
    ctx: &ResolutionContext,
    to: DeclId,
    sub: DeclId,
    sup: DeclId,
) -> Result<(), Diagnostic> {
    let (file, span) = method_site(ctx, sub);
    let sub_decl = ctx.decls.get(sub);
    let sup_decl = ctx.decls.get(sup);
    let describe = |why: &str| {
        Diagnostic::error(
            &file,
            codes::ILLEGAL_OVERRIDE,
            format!(
                "`{}.{}` cannot override `{}`: {why}",
                ctx.decls.name(to),
                sub_decl.name,
                ctx.decls.qualified_name(sup),
            ),
        )
        .with_span(span.start, span.len())
    };

    if sup_decl.modifiers.contains(Modifiers::FINAL) {
        return Err(describe("the overridden method is final"));
    }
    if sup_decl.modifiers.contains(Modifiers::STATIC)
        != sub_decl.modifiers.contains(Modifiers::STATIC)
    {
        return Err(describe("static does not match the overridden method"));
    }
    if visibility_rank(sub_decl.modifiers) < visibility_rank(sup_decl.modifiers) {
        return Err(describe("the override narrows visibility"));
    }
    let sub_m = ctx.decls.method_decl(sub);
    let sup_m = ctx.decls.method_decl(sup);
    if let (Some(a), Some(b)) = (&sub_m.sig, &sup_m.sig) {
        if a.ret != b.ret {
            return Err(describe("the return type differs"));
        }
    }
    // Throws may only narrow: every declared exception must appear in the
    // overridden method's set (by name) or be unchecked.
    let sup_names: Vec<&str> = sup_m.throws.iter().map(|&d| ctx.decls.name(d)).collect();
    for &thrown in &sub_m.throws {
        if sup_names.contains(&ctx.decls.name(thrown)) {
            continue;
        }
        if is_unchecked(ctx, thrown) {
            continue;
        }
        let name = ctx.decls.qualified_name(thrown);
        return Err(describe(&format!("it declares `{name}` which the overridden method does not")));
    }
    Ok(())
}

/// Visibility as an ordered rank: private < package < protected < public.
fn visibility_rank(modifiers: Modifiers) -> u8 {
    if modifiers.contains(Modifiers::PUBLIC) {
        3
    } else if modifiers.contains(Modifiers::PROTECTED) {
        2
    } else if modifiers.contains(Modifiers::PRIVATE) {
        0
    } else {
        1
    }
}

/// Unchecked exceptions descend from the built-in runtime-exception root.
fn is_unchecked(ctx: &ResolutionContext, ty: DeclId) -> bool {
    let mut current = Some(ty);
    while let Some(t) = current {
        if t == ctx.runtime_exception {
            return true;
        }
        current = ctx.decls.get(t).as_type().and_then(|td| td.superclass);
    }
    false
}

/// A concrete class must end fill-in with no abstract method left in its
/// scope, own or inherited.
fn audit_abstractness(
    ctx: &ResolutionContext,
    ty: DeclId,
    scope: ScopeId,
) -> Result<(), Diagnostic> {
    let decl = ctx.decls.get(ty);
    if decl.category() != category::CLASS || decl.modifiers.contains(Modifiers::ABSTRACT) {
        return Ok(());
    }
    for &member in ctx.scopes.entries(scope) {
        let Some(m) = ctx.decls.get(member).as_method() else {
            continue;
        };
        if m.is_constructor {
            continue;
        }
        let container_is_interface = ctx
            .decls
            .get(m.container)
            .as_type()
            .is_some_and(|t| t.category == category::INTERFACE);
        let abstract_method =
            ctx.decls.get(member).modifiers.contains(Modifiers::ABSTRACT) || container_is_interface;
        if abstract_method {
            let (file, span) = type_site(ctx, ty);
            return Err(Diagnostic::error(
                &file,
                codes::ABSTRACT_NOT_IMPLEMENTED,
                format!(
                    "class `{}` is not abstract and does not implement `{}`",
                    ctx.decls.qualified_name(ty),
                    ctx.decls.qualified_name(member),
                ),
            )
            .with_span(span.start, span.len()));
        }
    }
    Ok(())
}

fn method_site(ctx: &ResolutionContext, method: DeclId) -> (String, Span) {
    match ctx.decls.method_decl(method).source {
        Some(src) => {
            let u = ctx.unit(src.unit);
            (u.file.clone(), u.arena.span(src.node))
        }
        None => ("<builtin>".to_string(), Span::EMPTY),
    }
}

fn type_site(ctx: &ResolutionContext, ty: DeclId) -> (String, Span) {
    match ctx.decls.type_decl(ty).source {
        Some(src) => {
            let u = ctx.unit(src.unit);
            (u.file.clone(), u.arena.span(src.node))
        }
        None => ("<builtin>".to_string(), Span::EMPTY),
    }
}
