//! Unused-import detection.
//!
//! Runs after Pass 2, when every `Name` node carries its declaration. An
//! import is used if any annotation outside the import clauses resolves to
//! the imported type (single imports) or to a type of the imported package
//! (on-demand imports). The implicit core-package wildcard is not an
//! import clause and is never reported; neither is an explicit wildcard
//! over the core package.

use jaz_common::{Diagnostic, codes};
use jaz_parser::{NodeId, NodeKind};
use rustc_hash::FxHashSet;

use crate::context::{ResolutionContext, UnitId};
use crate::decl::{DeclId, DeclKind};

/// Warnings for imports nothing in the unit refers to. Requires Pass 2.
pub fn check(ctx: &ResolutionContext, unit: UnitId) -> Vec<Diagnostic> {
    let u = ctx.unit(unit);
    let imports = match u.arena.kind(u.root) {
        NodeKind::CompilationUnit { imports, .. } => imports.clone(),
        other => unreachable!("unit root is {other:?}"),
    };
    if imports.is_empty() {
        return Vec::new();
    }

    // Name nodes belonging to the import clauses themselves don't count
    // as uses.
    let mut import_names: FxHashSet<u32> = FxHashSet::default();
    for &import in &imports {
        match u.arena.kind(import) {
            &NodeKind::ImportSingle { name } | &NodeKind::ImportOnDemand { name } => {
                collect_name_nodes(ctx, unit, name, &mut import_names);
            }
            other => unreachable!("import is {other:?}"),
        }
    }
    let uses: Vec<DeclId> = u
        .resolved_entries()
        .filter(|(node, _)| !import_names.contains(&node.0))
        .map(|(_, decl)| decl)
        .collect();

    let mut warnings = Vec::new();
    for import in imports {
        let (name, on_demand) = match u.arena.kind(import) {
            &NodeKind::ImportSingle { name } => (name, false),
            &NodeKind::ImportOnDemand { name } => (name, true),
            other => unreachable!("import is {other:?}"),
        };
        let Some(target) = u.decl_of(name) else {
            continue;
        };
        let used = if on_demand {
            if target == ctx.java_lang || Some(target) == u.package {
                continue;
            }
            uses.iter().any(|&d| {
                matches!(&ctx.decls.get(d).kind, DeclKind::Type(t) if t.container == Some(target))
            })
        } else {
            uses.contains(&target)
        };
        if !used {
            let span = u.arena.span(import);
            let what = if on_demand {
                format!("{}.*", u.arena.name_to_string(name))
            } else {
                u.arena.name_to_string(name)
            };
            warnings.push(
                Diagnostic::warning(
                    &u.file,
                    codes::UNUSED_IMPORT,
                    format!("import `{what}` is never used"),
                )
                .with_span(span.start, span.len()),
            );
        }
    }
    warnings
}

fn collect_name_nodes(
    ctx: &ResolutionContext,
    unit: UnitId,
    name: NodeId,
    out: &mut FxHashSet<u32>,
) {
    out.insert(name.0);
    if let NodeKind::Name {
        qualifier: Some(q), ..
    } = ctx.unit(unit).arena.kind(name)
    {
        collect_name_nodes(ctx, unit, *q, out);
    }
}
