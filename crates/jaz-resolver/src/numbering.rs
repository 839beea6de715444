//! Declaration numbering.
//!
//! Assigns consecutive serial numbers to the declarations a unit
//! introduces, in children-first (post-order) syntax order. The numbering
//! is a pure function of the resolved tree: regenerating the unit's source,
//! re-parsing, and re-resolving reproduces it exactly, which is how the
//! round-trip tests detect semantic drift.

use jaz_parser::{NodeId, NodeKind};

use crate::context::{ResolutionContext, UnitId};
use crate::decl::DeclId;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NumberedDecl {
    pub serial: u32,
    pub decl: DeclId,
    pub name: String,
    pub category: String,
}

/// Number every declaration introduced by this unit. Requires Pass 2.
pub fn number_unit(ctx: &ResolutionContext, unit: UnitId) -> Vec<NumberedDecl> {
    let mut out = Vec::new();
    let root = ctx.unit(unit).root;
    visit(ctx, unit, root, &mut out);
    out
}

fn visit(ctx: &ResolutionContext, unit: UnitId, node: NodeId, out: &mut Vec<NumberedDecl>) {
    for child in children(ctx, unit, node) {
        visit(ctx, unit, child, out);
    }
    if declares(ctx, unit, node) {
        if let Some(decl) = ctx.unit(unit).decl_of(node) {
            out.push(NumberedDecl {
                serial: out.len() as u32,
                decl,
                name: ctx.decls.name(decl).to_string(),
                category: crate::category::describe(ctx.decls.get(decl).category()),
            });
        }
    }
}

fn declares(ctx: &ResolutionContext, unit: UnitId, node: NodeId) -> bool {
    matches!(
        ctx.unit(unit).arena.kind(node),
        NodeKind::ClassDecl { .. }
            | NodeKind::InterfaceDecl { .. }
            | NodeKind::FieldDecl { .. }
            | NodeKind::MethodDecl { .. }
            | NodeKind::ConstructorDecl { .. }
            | NodeKind::Param { .. }
            | NodeKind::LocalVarDecl { .. }
            | NodeKind::Labeled { .. }
    )
}

/// Child nodes in syntax order. Names and type annotations introduce no
/// declarations, so they are not descended into.
fn children(ctx: &ResolutionContext, unit: UnitId, node: NodeId) -> Vec<NodeId> {
    match ctx.unit(unit).arena.kind(node) {
        NodeKind::CompilationUnit { types, .. } => types.clone(),
        NodeKind::ClassDecl { members, .. } | NodeKind::InterfaceDecl { members, .. } => {
            members.clone()
        }
        &NodeKind::FieldDecl { init, .. } => init.into_iter().collect(),
        NodeKind::MethodDecl { params, body, .. } => {
            let mut v = params.clone();
            v.extend(*body);
            v
        }
        NodeKind::ConstructorDecl {
            params,
            super_args,
            body,
            ..
        } => {
            let mut v = params.clone();
            if let Some(args) = super_args {
                v.extend(args.iter().copied());
            }
            v.push(*body);
            v
        }
        &NodeKind::InitializerBlock { body, .. } => vec![body],
        NodeKind::Block { stmts } => stmts.clone(),
        &NodeKind::LocalVarDecl { init, .. } => init.into_iter().collect(),
        &NodeKind::ExprStmt { expr } => vec![expr],
        &NodeKind::If {
            cond,
            then_stmt,
            else_stmt,
        } => {
            let mut v = vec![cond, then_stmt];
            v.extend(else_stmt);
            v
        }
        &NodeKind::While { cond, body } => vec![cond, body],
        &NodeKind::DoWhile { body, cond } => vec![body, cond],
        NodeKind::For {
            init,
            cond,
            update,
            body,
        } => {
            let mut v = init.clone();
            v.extend(*cond);
            v.extend(update.iter().copied());
            v.push(*body);
            v
        }
        NodeKind::Switch { selector, cases } => {
            let mut v = vec![*selector];
            v.extend(cases.iter().copied());
            v
        }
        NodeKind::SwitchCase { labels, stmts } => {
            let mut v: Vec<NodeId> = labels.iter().copied().flatten().collect();
            v.extend(stmts.iter().copied());
            v
        }
        &NodeKind::Return { expr } => expr.into_iter().collect(),
        &NodeKind::Throw { expr } => vec![expr],
        NodeKind::Try {
            body,
            catches,
            finally,
        } => {
            let mut v = vec![*body];
            v.extend(catches.iter().copied());
            v.extend(*finally);
            v
        }
        &NodeKind::Catch { param, body } => vec![param, body],
        &NodeKind::Labeled { stmt, .. } => vec![stmt],
        &NodeKind::Call { callee, ref args } => {
            let mut v = vec![callee];
            v.extend(args.iter().copied());
            v
        }
        NodeKind::New { args, .. } => args.clone(),
        &NodeKind::Cast { expr, .. } => vec![expr],
        &NodeKind::InstanceOf { expr, .. } => vec![expr],
        &NodeKind::Unary { operand, .. } => vec![operand],
        &NodeKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        &NodeKind::Assign { lhs, rhs, .. } => vec![lhs, rhs],
        &NodeKind::ArrayAccess { array, index } => vec![array, index],
        &NodeKind::Cond {
            cond,
            then_expr,
            else_expr,
        } => vec![cond, then_expr, else_expr],
        &NodeKind::FieldAccess { object, .. } => vec![object],
        // Leaves: literals, names, resolved references, types, imports.
        _ => Vec::new(),
    }
}
