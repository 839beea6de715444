//! Pass 1, sub-pass A: class linking.
//!
//! Resolves every type-level name a unit declares: superclass and
//! implemented interfaces, field types, method signatures, and declared
//! throws sets. Linking may load further sources on demand (a superclass
//! in another file), which is why Pass 1 as a whole runs as a global
//! fixpoint in `resolve` rather than per unit.

use jaz_common::{Diagnostic, codes};
use jaz_parser::{NodeId, NodeKind};

use crate::category;
use crate::context::{ResolutionContext, UnitId};
use crate::decl::{DeclId, MethodSig, TypeSig};
use crate::loader;
use crate::scope::ScopeId;

/// Link every type declared by this unit. Requires Pass 0.
pub fn link_unit(ctx: &mut ResolutionContext, unit: UnitId) -> Result<(), Diagnostic> {
    for ty in declared_types(ctx, unit) {
        link_type(ctx, ty)?;
    }
    Ok(())
}

/// All type declarations with source in this unit, outermost first.
pub(crate) fn declared_types(ctx: &ResolutionContext, unit: UnitId) -> Vec<DeclId> {
    let u = ctx.unit(unit);
    let mut types: Vec<DeclId> = u
        .resolved_entries()
        .filter_map(|(node, decl)| {
            let is_type_node = matches!(
                u.arena.kind(node),
                NodeKind::ClassDecl { .. } | NodeKind::InterfaceDecl { .. }
            );
            (is_type_node && ctx.decls.get(decl).category() & category::TYPE != 0).then_some(decl)
        })
        .collect();
    types.sort();
    types.dedup();
    types
}

pub(crate) fn link_type(ctx: &mut ResolutionContext, ty: DeclId) -> Result<(), Diagnostic> {
    if ctx.class_linked.contains(&ty) {
        return Ok(());
    }
    let t = ctx.decls.type_decl(ty);
    let Some(source) = t.source else {
        // Placeholder whose file has not been demanded yet.
        return Ok(());
    };
    let Some(scope) = t.scope else {
        return Ok(());
    };
    let unit = source.unit;
    let node = source.node;
    // Marked before supertype recursion so an inheritance cycle terminates
    // instead of recursing forever.
    ctx.class_linked.insert(ty);
    tracing::debug!(ty = %ctx.decls.qualified_name(ty), "linking type");

    let file = ctx.unit(unit).file.clone();
    match ctx.unit(unit).arena.kind(node) {
        NodeKind::ClassDecl {
            extends,
            implements,
            members,
            ..
        } => {
            let extends = *extends;
            let implements = implements.clone();
            let members = members.clone();

            let superclass = match extends {
                Some(name) => {
                    let span = ctx.unit(unit).arena.span(name);
                    let sup = loader::resolve_type_name(ctx, unit, scope, name)?;
                    loader::require(ctx, sup)?;
                    link_type(ctx, sup)?;
                    if ctx.decls.type_decl(sup).category == category::INTERFACE {
                        return Err(Diagnostic::error(
                            &file,
                            codes::EXTENDS_INTERFACE,
                            format!(
                                "class cannot extend interface `{}`",
                                ctx.decls.qualified_name(sup)
                            ),
                        )
                        .with_span(span.start, span.len()));
                    }
                    ctx.unit_mut(unit).set_decl(name, sup);
                    Some(sup)
                }
                // Every class but the root type descends from it.
                None if ty != ctx.object_type => Some(ctx.object_type),
                None => None,
            };
            ctx.decls.type_decl_mut(ty).superclass = superclass;

            for name in implements {
                let span = ctx.unit(unit).arena.span(name);
                let iface = loader::resolve_type_name(ctx, unit, scope, name)?;
                loader::require(ctx, iface)?;
                link_type(ctx, iface)?;
                if ctx.decls.type_decl(iface).category != category::INTERFACE {
                    return Err(Diagnostic::error(
                        &file,
                        codes::IMPLEMENTS_NON_INTERFACE,
                        format!(
                            "`{}` is not an interface",
                            ctx.decls.qualified_name(iface)
                        ),
                    )
                    .with_span(span.start, span.len()));
                }
                ctx.unit_mut(unit).set_decl(name, iface);
                ctx.decls.type_decl_mut(ty).interfaces.push(iface);
            }

            link_members(ctx, unit, scope, &members)?;
        }
        NodeKind::InterfaceDecl {
            extends, members, ..
        } => {
            let extends = extends.clone();
            let members = members.clone();
            for name in extends {
                let span = ctx.unit(unit).arena.span(name);
                let sup = loader::resolve_type_name(ctx, unit, scope, name)?;
                loader::require(ctx, sup)?;
                link_type(ctx, sup)?;
                if ctx.decls.type_decl(sup).category != category::INTERFACE {
                    return Err(Diagnostic::error(
                        &file,
                        codes::EXTENDS_INTERFACE,
                        format!(
                            "interface cannot extend class `{}`",
                            ctx.decls.qualified_name(sup)
                        ),
                    )
                    .with_span(span.start, span.len()));
                }
                ctx.unit_mut(unit).set_decl(name, sup);
                ctx.decls.type_decl_mut(ty).interfaces.push(sup);
            }
            link_members(ctx, unit, scope, &members)?;
        }
        other => unreachable!("linked type is {other:?}"),
    }
    Ok(())
}

fn link_members(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    scope: ScopeId,
    members: &[NodeId],
) -> Result<(), Diagnostic> {
    for &member in members {
        match ctx.unit(unit).arena.kind(member) {
            &NodeKind::FieldDecl { ty, .. } => {
                let sig = resolve_type_sig(ctx, unit, scope, ty)?;
                let decl = ctx
                    .unit(unit)
                    .decl_of(member)
                    .unwrap_or_else(|| unreachable!("member registered by pass 0"));
                match &mut ctx.decls.get_mut(decl).kind {
                    crate::decl::DeclKind::Field(f) => f.ty = Some(sig),
                    _ => unreachable!(),
                }
            }
            NodeKind::MethodDecl {
                return_ty,
                params,
                throws,
                ..
            } => {
                let return_ty = *return_ty;
                let params = params.clone();
                let throws = throws.clone();
                let ret = resolve_type_sig(ctx, unit, scope, return_ty)?;
                let sig = resolve_method_sig(ctx, unit, scope, &params, ret)?;
                let thrown = resolve_throws(ctx, unit, scope, &throws)?;
                let decl = ctx
                    .unit(unit)
                    .decl_of(member)
                    .unwrap_or_else(|| unreachable!("member registered by pass 0"));
                let m = ctx.decls.method_decl_mut(decl);
                m.sig = Some(sig);
                m.throws = thrown;
            }
            NodeKind::ConstructorDecl { params, throws, .. } => {
                let params = params.clone();
                let throws = throws.clone();
                let sig = resolve_method_sig(ctx, unit, scope, &params, TypeSig::Void)?;
                let thrown = resolve_throws(ctx, unit, scope, &throws)?;
                let decl = ctx
                    .unit(unit)
                    .decl_of(member)
                    .unwrap_or_else(|| unreachable!("member registered by pass 0"));
                let m = ctx.decls.method_decl_mut(decl);
                m.sig = Some(sig);
                m.throws = thrown;
            }
            NodeKind::ClassDecl { .. } | NodeKind::InterfaceDecl { .. } => {
                // Inner types link through declared_types.
            }
            NodeKind::InitializerBlock { .. } => {}
            other => unreachable!("type member is {other:?}"),
        }
    }
    Ok(())
}

fn resolve_method_sig(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    scope: ScopeId,
    params: &[NodeId],
    ret: TypeSig,
) -> Result<MethodSig, Diagnostic> {
    let mut sigs = Vec::with_capacity(params.len());
    for &param in params {
        let ty = match ctx.unit(unit).arena.kind(param) {
            &NodeKind::Param { ty, .. } => ty,
            other => unreachable!("parameter is {other:?}"),
        };
        sigs.push(resolve_type_sig(ctx, unit, scope, ty)?);
    }
    Ok(MethodSig { params: sigs, ret })
}

fn resolve_throws(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    scope: ScopeId,
    throws: &[NodeId],
) -> Result<Vec<DeclId>, Diagnostic> {
    let mut resolved = Vec::with_capacity(throws.len());
    for &name in throws {
        let decl = loader::resolve_type_name(ctx, unit, scope, name)?;
        ctx.unit_mut(unit).set_decl(name, decl);
        resolved.push(decl);
    }
    Ok(resolved)
}

/// Resolve a syntactic type to its signature, annotating the contained
/// `Name` node when the type is a class or interface reference.
pub(crate) fn resolve_type_sig(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    scope: ScopeId,
    ty: NodeId,
) -> Result<TypeSig, Diagnostic> {
    match ctx.unit(unit).arena.kind(ty) {
        NodeKind::VoidType => Ok(TypeSig::Void),
        &NodeKind::PrimitiveType(p) => Ok(TypeSig::Prim(p)),
        &NodeKind::ArrayType { element } => Ok(TypeSig::Array(Box::new(resolve_type_sig(
            ctx, unit, scope, element,
        )?))),
        &NodeKind::NamedType { name } => {
            let decl = loader::resolve_type_name(ctx, unit, scope, name)?;
            ctx.unit_mut(unit).set_decl(name, decl);
            Ok(TypeSig::Named(decl))
        }
        other => unreachable!("type annotation is {other:?}"),
    }
}
