//! Multi-pass static-semantic resolution.
//!
//! Given parsed compilation units, determines what every name refers to:
//! packages, classes and interfaces, fields, methods, locals, parameters,
//! and statement labels. Resolution is organized as ordered passes over a
//! shared [`ResolutionContext`]:
//!
//! - **Pass 0** (per unit): package linking, member registration, import
//!   chain construction, default-constructor synthesis.
//! - **Pass 1** (global fixpoint): class linking (supertype and signature
//!   resolution) followed by inheritance fill-in, which copies inherited
//!   members down into each type's scope and checks override legality and
//!   abstractness. Global because inheritance spans files: linking one unit
//!   may load and link sources it references.
//! - **Pass 2** (per unit): name, field, and jump-target resolution through
//!   a chain of block scopes; bare value names are rewritten in place into
//!   resolved access forms.
//!
//! A fatal diagnostic aborts the pass and poisons the unit; there is no
//! partial-result mode.

mod builtins;
pub mod category;
pub mod context;
pub mod decl;
pub mod loader;
pub mod numbering;
pub mod pass_class;
pub mod pass_inheritance;
pub mod pass_name;
pub mod pass_package;
pub mod scope;
pub mod unused_imports;

pub use context::{ResolutionContext, ResolvePass, Unit, UnitId};
pub use decl::{Decl, DeclArena, DeclId, DeclKind, MethodSig, TypeSig};
pub use numbering::{NumberedDecl, number_unit};
pub use scope::{Scope, ScopeArena, ScopeId};

use jaz_common::{Diagnostic, codes};

/// Resolve a unit up to and including `pass`, running whatever earlier
/// passes it still needs. Already-completed passes are not repeated.
pub fn resolve(
    ctx: &mut ResolutionContext,
    unit: UnitId,
    pass: ResolvePass,
) -> Result<(), Diagnostic> {
    if ctx.unit(unit).poisoned {
        return Err(Diagnostic::error(
            ctx.unit(unit).file.clone(),
            codes::LOAD_FAILED,
            "unit previously failed resolution",
        ));
    }
    pass_package::run(ctx, unit)?;
    if pass == ResolvePass::Package {
        return Ok(());
    }

    resolve_classes(ctx)?;
    if pass == ResolvePass::Class {
        return Ok(());
    }

    if !ctx.unit(unit).reached(ResolvePass::Names) {
        tracing::debug!(file = %ctx.unit(unit).file, "name pass");
        match pass_name::run(ctx, unit) {
            Ok(()) => ctx.unit_mut(unit).pass_reached = Some(ResolvePass::Names),
            Err(err) => {
                ctx.unit_mut(unit).poisoned = true;
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Pass 1 as a global fixpoint: link and fill every package-resolved unit,
/// repeating while linking loads further sources.
fn resolve_classes(ctx: &mut ResolutionContext) -> Result<(), Diagnostic> {
    loop {
        let pending: Vec<UnitId> = ctx
            .unit_ids()
            .filter(|&u| {
                let unit = ctx.unit(u);
                !unit.poisoned
                    && unit.reached(ResolvePass::Package)
                    && !unit.reached(ResolvePass::Class)
            })
            .collect();
        if pending.is_empty() {
            return Ok(());
        }
        for u in pending {
            tracing::debug!(file = %ctx.unit(u).file, "class pass");
            let result =
                pass_class::link_unit(ctx, u).and_then(|()| pass_inheritance::fill_unit(ctx, u));
            match result {
                Ok(()) => ctx.unit_mut(u).pass_reached = Some(ResolvePass::Class),
                Err(err) => {
                    ctx.unit_mut(u).poisoned = true;
                    return Err(err);
                }
            }
        }
    }
}
