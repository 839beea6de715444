//! Pass 2: name, field, and jump-target resolution.
//!
//! Walks method and constructor bodies with a chain of block scopes rooted
//! at the (inheritance-filled) type scope. Every `Name` node ends up
//! associated with a declaration; bare value names are additionally
//! rewritten in place into their resolved access form (`LocalRef`,
//! `ThisFieldAccess`, or `TypeFieldAccess`), which is what makes
//! regeneration explicit about what each identifier meant.
//!
//! Requires Pass 1 to have stabilized globally: every reachable type scope
//! is inheritance-filled before bodies are walked, except types first
//! demanded here (a package walk can still load a new source), which are
//! filled on first member access.

use jaz_common::{Diagnostic, Modifiers, codes};
use jaz_parser::{NodeId, NodeKind};

use crate::category;
use crate::context::{ResolutionContext, UnitId};
use crate::decl::{Decl, DeclId, DeclKind, SourceRef, TypeSig};
use crate::loader;
use crate::pass_class;
use crate::pass_inheritance;
use crate::scope::ScopeId;

pub fn run(ctx: &mut ResolutionContext, unit: UnitId) -> Result<(), Diagnostic> {
    let root = ctx.unit(unit).root;
    let types = match ctx.unit(unit).arena.kind(root) {
        NodeKind::CompilationUnit { types, .. } => types.clone(),
        other => unreachable!("unit root is {other:?}"),
    };
    let mut walker = Walker {
        unit,
        types: Vec::new(),
        loops: Vec::new(),
        breakables: Vec::new(),
    };
    for ty in types {
        walker.type_body(ctx, ty)?;
    }
    Ok(())
}

/// What a (possibly dotted) name chain denotes after resolution.
enum Resolved {
    /// A value; carries its static type when the declared type is a class
    /// or interface.
    Value(Option<DeclId>),
    Type(DeclId),
    Package(DeclId),
}

struct Walker {
    unit: UnitId,
    /// Enclosing type declarations, innermost last.
    types: Vec<DeclId>,
    /// Enclosing loop statements, for unlabeled `continue`.
    loops: Vec<NodeId>,
    /// Enclosing loop and switch statements, for unlabeled `break`.
    breakables: Vec<NodeId>,
}

impl Walker {
    fn file(&self, ctx: &ResolutionContext) -> String {
        ctx.unit(self.unit).file.clone()
    }

    fn err(
        &self,
        ctx: &ResolutionContext,
        code: u32,
        node: NodeId,
        message: String,
    ) -> Diagnostic {
        let span = ctx.unit(self.unit).arena.span(node);
        Diagnostic::error(self.file(ctx), code, message).with_span(span.start, span.len())
    }

    fn current_type(&self) -> DeclId {
        *self
            .types
            .last()
            .unwrap_or_else(|| unreachable!("body walk outside a type"))
    }

    fn type_body(&mut self, ctx: &mut ResolutionContext, node: NodeId) -> Result<(), Diagnostic> {
        let decl = ctx
            .unit(self.unit)
            .decl_of(node)
            .unwrap_or_else(|| unreachable!("type registered by pass 0"));
        let scope = match ctx.decls.type_decl(decl).scope {
            Some(s) => s,
            None => return Ok(()),
        };
        let members = match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::ClassDecl { members, .. } | NodeKind::InterfaceDecl { members, .. } => {
                members.clone()
            }
            other => unreachable!("type declaration is {other:?}"),
        };
        self.types.push(decl);
        for member in members {
            self.member_body(ctx, member, scope)?;
        }
        self.types.pop();
        Ok(())
    }

    fn member_body(
        &mut self,
        ctx: &mut ResolutionContext,
        member: NodeId,
        type_scope: ScopeId,
    ) -> Result<(), Diagnostic> {
        match ctx.unit(self.unit).arena.kind(member) {
            &NodeKind::FieldDecl { init, .. } => {
                if let Some(init) = init {
                    self.expr(ctx, type_scope, init)?;
                }
            }
            NodeKind::MethodDecl { params, body, .. } => {
                let params = params.clone();
                let body = *body;
                let method_scope = ctx.scopes.alloc(Some(type_scope));
                ctx.unit_mut(self.unit)
                    .scope_of
                    .insert(member.0, method_scope);
                self.declare_params(ctx, method_scope, &params)?;
                if let Some(body) = body {
                    self.stmt(ctx, method_scope, body)?;
                }
            }
            NodeKind::ConstructorDecl {
                params,
                super_args,
                body,
                ..
            } => {
                let params = params.clone();
                let super_args = super_args.clone();
                let body = *body;
                let method_scope = ctx.scopes.alloc(Some(type_scope));
                ctx.unit_mut(self.unit)
                    .scope_of
                    .insert(member.0, method_scope);
                self.declare_params(ctx, method_scope, &params)?;
                if let Some(args) = super_args {
                    for arg in args {
                        self.expr(ctx, method_scope, arg)?;
                    }
                }
                self.stmt(ctx, method_scope, body)?;
            }
            &NodeKind::InitializerBlock { body, .. } => {
                // Locals in an initializer are private to that block.
                let block_scope = ctx.scopes.alloc(Some(type_scope));
                ctx.unit_mut(self.unit)
                    .scope_of
                    .insert(member.0, block_scope);
                self.stmt(ctx, block_scope, body)?;
            }
            NodeKind::ClassDecl { .. } | NodeKind::InterfaceDecl { .. } => {
                self.type_body(ctx, member)?;
            }
            other => unreachable!("type member is {other:?}"),
        }
        Ok(())
    }

    fn declare_params(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        params: &[NodeId],
    ) -> Result<(), Diagnostic> {
        for &param in params {
            let (modifiers, ty, name) = match ctx.unit(self.unit).arena.kind(param) {
                NodeKind::Param {
                    modifiers,
                    ty,
                    name,
                } => (*modifiers, *ty, name.clone()),
                other => unreachable!("parameter is {other:?}"),
            };
            let sig = pass_class::resolve_type_sig(ctx, self.unit, scope, ty)?;
            if !ctx
                .scopes
                .lookup_local(&ctx.decls, scope, &name, category::PARAMETER)
                .is_empty()
            {
                return Err(self.err(
                    ctx,
                    codes::DUPLICATE_DECLARATION,
                    param,
                    format!("parameter `{name}` is already declared"),
                ));
            }
            let decl = ctx.decls.alloc(Decl {
                name,
                modifiers,
                kind: DeclKind::Param {
                    source: SourceRef {
                        unit: self.unit,
                        node: param,
                    },
                    ty: Some(sig),
                },
            });
            ctx.scopes.add(scope, decl);
            ctx.unit_mut(self.unit).set_decl(param, decl);
        }
        Ok(())
    }

    // ----- statements -----

    fn stmt(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
    ) -> Result<(), Diagnostic> {
        match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::Block { stmts } => {
                let stmts = stmts.clone();
                let block_scope = ctx.scopes.alloc(Some(scope));
                ctx.unit_mut(self.unit).scope_of.insert(node.0, block_scope);
                for s in stmts {
                    self.stmt(ctx, block_scope, s)?;
                }
            }
            NodeKind::LocalVarDecl { .. } => self.local_var(ctx, scope, node)?,
            &NodeKind::ExprStmt { expr } => self.expr(ctx, scope, expr)?,
            &NodeKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.expr(ctx, scope, cond)?;
                self.stmt(ctx, scope, then_stmt)?;
                if let Some(e) = else_stmt {
                    self.stmt(ctx, scope, e)?;
                }
            }
            &NodeKind::While { cond, body } => {
                self.expr(ctx, scope, cond)?;
                self.push_loop(node);
                self.stmt(ctx, scope, body)?;
                self.pop_loop();
            }
            &NodeKind::DoWhile { body, cond } => {
                self.push_loop(node);
                self.stmt(ctx, scope, body)?;
                self.pop_loop();
                self.expr(ctx, scope, cond)?;
            }
            NodeKind::For { .. } => self.for_stmt(ctx, scope, node)?,
            NodeKind::Switch { selector, cases } => {
                let selector = *selector;
                let cases = cases.clone();
                self.expr(ctx, scope, selector)?;
                let switch_scope = ctx.scopes.alloc(Some(scope));
                ctx.unit_mut(self.unit)
                    .scope_of
                    .insert(node.0, switch_scope);
                self.breakables.push(node);
                for case in cases {
                    let (labels, stmts) = match ctx.unit(self.unit).arena.kind(case) {
                        NodeKind::SwitchCase { labels, stmts } => (labels.clone(), stmts.clone()),
                        other => unreachable!("switch case is {other:?}"),
                    };
                    for label in labels.into_iter().flatten() {
                        self.expr(ctx, switch_scope, label)?;
                    }
                    for s in stmts {
                        self.stmt(ctx, switch_scope, s)?;
                    }
                }
                self.breakables.pop();
            }
            &NodeKind::Break { label } => self.break_stmt(ctx, scope, node, label)?,
            &NodeKind::Continue { label } => self.continue_stmt(ctx, scope, node, label)?,
            &NodeKind::Return { expr } => {
                if let Some(e) = expr {
                    self.expr(ctx, scope, e)?;
                }
            }
            &NodeKind::Throw { expr } => self.expr(ctx, scope, expr)?,
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                let body = *body;
                let catches = catches.clone();
                let finally = *finally;
                self.stmt(ctx, scope, body)?;
                for catch in catches {
                    let (param, cbody) = match ctx.unit(self.unit).arena.kind(catch) {
                        &NodeKind::Catch { param, body } => (param, body),
                        other => unreachable!("catch clause is {other:?}"),
                    };
                    let catch_scope = ctx.scopes.alloc(Some(scope));
                    ctx.unit_mut(self.unit)
                        .scope_of
                        .insert(catch.0, catch_scope);
                    self.declare_params(ctx, catch_scope, &[param])?;
                    self.stmt(ctx, catch_scope, cbody)?;
                }
                if let Some(f) = finally {
                    self.stmt(ctx, scope, f)?;
                }
            }
            NodeKind::Labeled { label, stmt } => {
                let label = label.clone();
                let stmt = *stmt;
                let decl = ctx.decls.alloc(Decl {
                    name: label,
                    modifiers: Modifiers::empty(),
                    kind: DeclKind::Label {
                        source: SourceRef {
                            unit: self.unit,
                            node,
                        },
                    },
                });
                ctx.unit_mut(self.unit).set_decl(node, decl);
                // The label lives in its own frame wrapping the labeled
                // statement, so it goes out of scope with it.
                let label_scope = ctx.scopes.alloc(Some(scope));
                ctx.scopes.add(label_scope, decl);
                self.stmt(ctx, label_scope, stmt)?;
            }
            NodeKind::EmptyStmt => {}
            other => unreachable!("statement is {other:?}"),
        }
        Ok(())
    }

    fn local_var(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
    ) -> Result<(), Diagnostic> {
        let (modifiers, ty, name, init) = match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::LocalVarDecl {
                modifiers,
                ty,
                name,
                init,
            } => (*modifiers, *ty, name.clone(), *init),
            other => unreachable!("local declaration is {other:?}"),
        };
        let sig = pass_class::resolve_type_sig(ctx, self.unit, scope, ty)?;
        if let Some(init) = init {
            self.expr(ctx, scope, init)?;
        }
        if !ctx
            .scopes
            .lookup_local(&ctx.decls, scope, &name, category::LOCAL_VAR)
            .is_empty()
        {
            return Err(self.err(
                ctx,
                codes::DUPLICATE_DECLARATION,
                node,
                format!("variable `{name}` is already declared in this scope"),
            ));
        }
        if ctx
            .scopes
            .lookup_first(&ctx.decls, scope, &name, category::PARAMETER)
            .is_some()
        {
            return Err(self.err(
                ctx,
                codes::LOCAL_SHADOWS_PARAMETER,
                node,
                format!("variable `{name}` shadows a parameter"),
            ));
        }
        let decl = ctx.decls.alloc(Decl {
            name,
            modifiers,
            kind: DeclKind::Local {
                source: SourceRef {
                    unit: self.unit,
                    node,
                },
                ty: Some(sig),
            },
        });
        ctx.scopes.add(scope, decl);
        ctx.unit_mut(self.unit).set_decl(node, decl);
        Ok(())
    }

    fn for_stmt(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
    ) -> Result<(), Diagnostic> {
        let (init, cond, update, body) = match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => (init.clone(), *cond, update.clone(), *body),
            other => unreachable!("for statement is {other:?}"),
        };
        // The init declarations live in their own scope enclosing the body.
        let for_scope = ctx.scopes.alloc(Some(scope));
        ctx.unit_mut(self.unit).scope_of.insert(node.0, for_scope);
        for i in init {
            self.stmt(ctx, for_scope, i)?;
        }
        if let Some(c) = cond {
            self.expr(ctx, for_scope, c)?;
        }
        self.push_loop(node);
        self.stmt(ctx, for_scope, body)?;
        self.pop_loop();
        for u in update {
            self.expr(ctx, for_scope, u)?;
        }
        Ok(())
    }

    fn push_loop(&mut self, node: NodeId) {
        self.loops.push(node);
        self.breakables.push(node);
    }

    fn pop_loop(&mut self) {
        self.loops.pop();
        self.breakables.pop();
    }

    /// Resolve a jump label through the scope chain; the labeled statement
    /// comes back through the declaration's source link.
    fn resolve_label(
        &self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
        name: NodeId,
    ) -> Result<(DeclId, NodeId), Diagnostic> {
        let ident = ctx.unit(self.unit).arena.name_ident(name).to_string();
        let Some(decl) = ctx
            .scopes
            .lookup_first(&ctx.decls, scope, &ident, category::LABEL)
        else {
            return Err(self.err(
                ctx,
                codes::UNRESOLVED_NAME,
                node,
                format!("unknown label `{ident}`"),
            ));
        };
        let labeled = match ctx.decls.get(decl).kind {
            DeclKind::Label { source } => source.node,
            _ => unreachable!("label lookup returned a non-label"),
        };
        let stmt = match ctx.unit(self.unit).arena.kind(labeled) {
            &NodeKind::Labeled { stmt, .. } => stmt,
            other => unreachable!("labeled statement is {other:?}"),
        };
        ctx.unit_mut(self.unit).set_decl(name, decl);
        Ok((decl, stmt))
    }

    fn break_stmt(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
        label: Option<NodeId>,
    ) -> Result<(), Diagnostic> {
        let target = match label {
            Some(name) => self.resolve_label(ctx, scope, node, name)?.1,
            None => match self.breakables.last() {
                Some(&stmt) => stmt,
                None => {
                    return Err(self.err(
                        ctx,
                        codes::JUMP_OUTSIDE_CONTEXT,
                        node,
                        "break outside of a loop or switch".to_string(),
                    ));
                }
            },
        };
        ctx.unit_mut(self.unit).jump_target.insert(node.0, target.0);
        Ok(())
    }

    fn continue_stmt(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
        label: Option<NodeId>,
    ) -> Result<(), Diagnostic> {
        let target = match label {
            Some(name) => {
                let (decl, stmt) = self.resolve_label(ctx, scope, node, name)?;
                let is_loop = matches!(
                    ctx.unit(self.unit).arena.kind(stmt),
                    NodeKind::While { .. } | NodeKind::DoWhile { .. } | NodeKind::For { .. }
                );
                if !is_loop {
                    return Err(self.err(
                        ctx,
                        codes::CONTINUE_NON_LOOP,
                        node,
                        format!("label `{}` does not name a loop", ctx.decls.name(decl)),
                    ));
                }
                stmt
            }
            None => match self.loops.last() {
                Some(&stmt) => stmt,
                None => {
                    return Err(self.err(
                        ctx,
                        codes::JUMP_OUTSIDE_CONTEXT,
                        node,
                        "continue outside of a loop".to_string(),
                    ));
                }
            },
        };
        ctx.unit_mut(self.unit).jump_target.insert(node.0, target.0);
        Ok(())
    }

    // ----- expressions -----

    fn expr(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
    ) -> Result<(), Diagnostic> {
        match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::Literal { .. } | NodeKind::This => {}
            &NodeKind::NameRef { name } => self.name_ref(ctx, scope, node, name)?,
            // Already-resolved forms only appear on re-entry; idempotent.
            NodeKind::LocalRef { .. }
            | NodeKind::ThisFieldAccess { .. }
            | NodeKind::TypeFieldAccess { .. } => {}
            &NodeKind::FieldAccess { object, name } => {
                self.expr(ctx, scope, object)?;
                if let Some(ty) = self.static_type(ctx, object) {
                    self.member_field(ctx, ty, name)?;
                }
            }
            NodeKind::Call { .. } => self.call(ctx, scope, node)?,
            NodeKind::New { ty, args } => {
                let ty = *ty;
                let args = args.clone();
                let sig = pass_class::resolve_type_sig(ctx, self.unit, scope, ty)?;
                if let Some(t) = sig.named() {
                    pass_inheritance::ensure_filled(ctx, t)?;
                    // The constructor invoked; overloads keyed by name only.
                    let type_name = ctx.decls.name(t).to_string();
                    if let Some(member_scope) = ctx.decls.type_decl(t).scope {
                        if let Some(ctor) = ctx
                            .scopes
                            .lookup_local(&ctx.decls, member_scope, &type_name, category::CONSTRUCTOR)
                            .first()
                            .copied()
                        {
                            ctx.unit_mut(self.unit).set_decl(node, ctor);
                        }
                    }
                }
                for arg in args {
                    self.expr(ctx, scope, arg)?;
                }
            }
            &NodeKind::Cast { ty, expr } => {
                pass_class::resolve_type_sig(ctx, self.unit, scope, ty)?;
                self.expr(ctx, scope, expr)?;
            }
            &NodeKind::InstanceOf { expr, ty } => {
                self.expr(ctx, scope, expr)?;
                pass_class::resolve_type_sig(ctx, self.unit, scope, ty)?;
            }
            &NodeKind::Unary { operand, .. } => self.expr(ctx, scope, operand)?,
            &NodeKind::Binary { lhs, rhs, .. } => {
                self.expr(ctx, scope, lhs)?;
                self.expr(ctx, scope, rhs)?;
            }
            &NodeKind::Assign { lhs, rhs, .. } => {
                self.expr(ctx, scope, lhs)?;
                self.expr(ctx, scope, rhs)?;
            }
            &NodeKind::ArrayAccess { array, index } => {
                self.expr(ctx, scope, array)?;
                self.expr(ctx, scope, index)?;
            }
            &NodeKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(ctx, scope, cond)?;
                self.expr(ctx, scope, then_expr)?;
                self.expr(ctx, scope, else_expr)?;
            }
            other => unreachable!("expression is {other:?}"),
        }
        Ok(())
    }

    /// Resolve a name in expression position and rewrite bare value names
    /// into their resolved access form.
    fn name_ref(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
        name: NodeId,
    ) -> Result<(), Diagnostic> {
        let (qualifier, ident) = match ctx.unit(self.unit).arena.kind(name) {
            NodeKind::Name { qualifier, ident } => (*qualifier, ident.clone()),
            other => unreachable!("name is {other:?}"),
        };
        if qualifier.is_none() {
            let span = ctx.unit(self.unit).arena.span(name);
            let file = self.file(ctx);
            let decl = loader::lookup_unique(ctx, &file, span, scope, &ident, category::VALUE)?;
            ctx.unit_mut(self.unit).set_decl(name, decl);
            let rewritten = match &ctx.decls.get(decl).kind {
                DeclKind::Local { .. } | DeclKind::Param { .. } => NodeKind::LocalRef { name },
                DeclKind::Field(f) => {
                    if ctx.decls.get(decl).modifiers.contains(Modifiers::STATIC) {
                        let container = ctx.decls.qualified_name(f.container);
                        let ty = ctx
                            .unit_mut(self.unit)
                            .arena
                            .intern_dotted_name(&container, span);
                        NodeKind::TypeFieldAccess { ty, name }
                    } else {
                        NodeKind::ThisFieldAccess { name }
                    }
                }
                _ => unreachable!("value lookup returned a non-value"),
            };
            ctx.unit_mut(self.unit).arena.replace_kind(node, rewritten);
            return Ok(());
        }
        match self.chain(ctx, scope, name)? {
            Resolved::Value(_) => Ok(()),
            Resolved::Type(_) | Resolved::Package(_) => Err(self.err(
                ctx,
                codes::UNRESOLVED_NAME,
                name,
                format!(
                    "`{}` does not name a value",
                    ctx.unit(self.unit).arena.name_to_string(name)
                ),
            )),
        }
    }

    /// Resolve a dotted name left to right, annotating every component.
    fn chain(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        name: NodeId,
    ) -> Result<Resolved, Diagnostic> {
        let (qualifier, ident) = match ctx.unit(self.unit).arena.kind(name) {
            NodeKind::Name { qualifier, ident } => (*qualifier, ident.clone()),
            other => unreachable!("name is {other:?}"),
        };
        let Some(qualifier) = qualifier else {
            return self.chain_head(ctx, scope, name, &ident);
        };
        match self.chain(ctx, scope, qualifier)? {
            Resolved::Value(Some(ty)) => self.step_into_type(ctx, ty, name, &ident, false),
            Resolved::Value(None) => Ok(Resolved::Value(None)),
            Resolved::Type(ty) => self.step_into_type(ctx, ty, name, &ident, true),
            Resolved::Package(pkg) => {
                let pkg_scope = loader::package_scope(ctx, pkg);
                let found = ctx
                    .scopes
                    .lookup_local(
                        &ctx.decls,
                        pkg_scope,
                        &ident,
                        category::PACKAGE | category::TYPE,
                    )
                    .first()
                    .copied();
                match found {
                    Some(d) if ctx.decls.get(d).category() == category::PACKAGE => {
                        ctx.unit_mut(self.unit).set_decl(name, d);
                        Ok(Resolved::Package(d))
                    }
                    Some(d) => {
                        ctx.unit_mut(self.unit).set_decl(name, d);
                        Ok(Resolved::Type(d))
                    }
                    None => Err(self.err(
                        ctx,
                        codes::UNRESOLVED_NAME,
                        name,
                        format!(
                            "package `{}` has no member `{ident}`",
                            ctx.decls.qualified_name(pkg)
                        ),
                    )),
                }
            }
        }
    }

    fn chain_head(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        name: NodeId,
        ident: &str,
    ) -> Result<Resolved, Diagnostic> {
        let span = ctx.unit(self.unit).arena.span(name);
        let file = self.file(ctx);
        match loader::lookup_unique(ctx, &file, span, scope, ident, category::VALUE) {
            Ok(decl) => {
                ctx.unit_mut(self.unit).set_decl(name, decl);
                return Ok(Resolved::Value(value_type(ctx, decl)));
            }
            Err(err) if err.code == codes::AMBIGUOUS_REFERENCE => return Err(err),
            Err(_) => {}
        }
        match loader::lookup_unique(ctx, &file, span, scope, ident, category::TYPE) {
            Ok(decl) => {
                ctx.unit_mut(self.unit).set_decl(name, decl);
                return Ok(Resolved::Type(decl));
            }
            Err(err) if err.code == codes::AMBIGUOUS_REFERENCE => return Err(err),
            Err(_) => {}
        }
        if let Ok(decl) = loader::lookup_unique(ctx, &file, span, scope, ident, category::PACKAGE) {
            ctx.unit_mut(self.unit).set_decl(name, decl);
            return Ok(Resolved::Package(decl));
        }
        if let Some(pkg) = loader::top_level_package(ctx, ident) {
            ctx.unit_mut(self.unit).set_decl(name, pkg);
            return Ok(Resolved::Package(pkg));
        }
        Err(Diagnostic::error(
            &file,
            codes::UNRESOLVED_NAME,
            format!(
                "cannot resolve `{ident}`; searched:\n{}",
                ctx.scopes.dump(&ctx.decls, scope)
            ),
        )
        .with_span(span.start, span.len()))
    }

    /// Resolve `ident` as a member of `ty`: a field, or a nested type when
    /// the qualifier itself denoted a type.
    fn step_into_type(
        &mut self,
        ctx: &mut ResolutionContext,
        ty: DeclId,
        name: NodeId,
        ident: &str,
        type_receiver: bool,
    ) -> Result<Resolved, Diagnostic> {
        pass_inheritance::ensure_filled(ctx, ty)?;
        let member_scope = match ctx.decls.type_decl(ty).scope {
            Some(s) => s,
            None => return Ok(Resolved::Value(None)),
        };
        let mask = if type_receiver {
            category::FIELD | category::TYPE
        } else {
            category::FIELD
        };
        let found = ctx
            .scopes
            .lookup_local(&ctx.decls, member_scope, ident, mask)
            .first()
            .copied();
        match found {
            Some(d) if ctx.decls.get(d).category() & category::TYPE != 0 => {
                ctx.unit_mut(self.unit).set_decl(name, d);
                Ok(Resolved::Type(d))
            }
            Some(d) => {
                ctx.unit_mut(self.unit).set_decl(name, d);
                Ok(Resolved::Value(value_type(ctx, d)))
            }
            None => Err(self.err(
                ctx,
                codes::UNRESOLVED_NAME,
                name,
                format!(
                    "`{}` has no field `{ident}`",
                    ctx.decls.qualified_name(ty)
                ),
            )),
        }
    }

    fn member_field(
        &mut self,
        ctx: &mut ResolutionContext,
        ty: DeclId,
        name: NodeId,
    ) -> Result<(), Diagnostic> {
        let ident = ctx.unit(self.unit).arena.name_ident(name).to_string();
        self.step_into_type(ctx, ty, name, &ident, false)?;
        Ok(())
    }

    fn call(
        &mut self,
        ctx: &mut ResolutionContext,
        scope: ScopeId,
        node: NodeId,
    ) -> Result<(), Diagnostic> {
        let (callee, args) = match ctx.unit(self.unit).arena.kind(node) {
            NodeKind::Call { callee, args } => (*callee, args.clone()),
            other => unreachable!("call is {other:?}"),
        };
        match ctx.unit(self.unit).arena.kind(callee) {
            &NodeKind::NameRef { name } => {
                let (qualifier, ident) = match ctx.unit(self.unit).arena.kind(name) {
                    NodeKind::Name { qualifier, ident } => (*qualifier, ident.clone()),
                    other => unreachable!("name is {other:?}"),
                };
                match qualifier {
                    None => {
                        let span = ctx.unit(self.unit).arena.span(name);
                        let file = self.file(ctx);
                        let method = loader::lookup_unique(
                            ctx,
                            &file,
                            span,
                            scope,
                            &ident,
                            category::METHOD,
                        )?;
                        ctx.unit_mut(self.unit).set_decl(name, method);
                    }
                    Some(q) => match self.chain(ctx, scope, q)? {
                        Resolved::Value(Some(ty)) | Resolved::Type(ty) => {
                            self.member_method(ctx, ty, name, &ident)?;
                        }
                        Resolved::Value(None) => {}
                        Resolved::Package(pkg) => {
                            return Err(self.err(
                                ctx,
                                codes::UNRESOLVED_NAME,
                                name,
                                format!(
                                    "`{}` is a package, not a method receiver",
                                    ctx.decls.qualified_name(pkg)
                                ),
                            ));
                        }
                    },
                }
            }
            &NodeKind::FieldAccess { object, name } => {
                self.expr(ctx, scope, object)?;
                if let Some(ty) = self.static_type(ctx, object) {
                    let ident = ctx.unit(self.unit).arena.name_ident(name).to_string();
                    self.member_method(ctx, ty, name, &ident)?;
                }
            }
            _ => self.expr(ctx, scope, callee)?,
        }
        for arg in args {
            self.expr(ctx, scope, arg)?;
        }
        Ok(())
    }

    fn member_method(
        &mut self,
        ctx: &mut ResolutionContext,
        ty: DeclId,
        name: NodeId,
        ident: &str,
    ) -> Result<(), Diagnostic> {
        pass_inheritance::ensure_filled(ctx, ty)?;
        let member_scope = match ctx.decls.type_decl(ty).scope {
            Some(s) => s,
            None => return Ok(()),
        };
        match ctx
            .scopes
            .lookup_local(&ctx.decls, member_scope, ident, category::METHOD)
            .first()
            .copied()
        {
            Some(m) => {
                ctx.unit_mut(self.unit).set_decl(name, m);
                Ok(())
            }
            None => Err(self.err(
                ctx,
                codes::UNRESOLVED_NAME,
                name,
                format!(
                    "`{}` has no method `{ident}`",
                    ctx.decls.qualified_name(ty)
                ),
            )),
        }
    }

    /// Best-effort static type of a resolved expression: the named type
    /// declaration it evaluates to, when that is knowable without full
    /// type checking.
    fn static_type(&self, ctx: &ResolutionContext, node: NodeId) -> Option<DeclId> {
        let u = ctx.unit(self.unit);
        match u.arena.kind(node) {
            NodeKind::This => Some(self.current_type()),
            &NodeKind::LocalRef { name }
            | &NodeKind::ThisFieldAccess { name }
            | &NodeKind::TypeFieldAccess { name, .. }
            | &NodeKind::NameRef { name }
            | &NodeKind::FieldAccess { name, .. } => {
                let decl = u.decl_of(name)?;
                value_type(ctx, decl)
            }
            NodeKind::Call { callee, .. } => {
                let name = match u.arena.kind(*callee) {
                    &NodeKind::NameRef { name } | &NodeKind::FieldAccess { name, .. } => name,
                    _ => return None,
                };
                let method = u.decl_of(name)?;
                ctx.decls
                    .get(method)
                    .as_method()
                    .and_then(|m| m.sig.as_ref())
                    .and_then(|s| s.ret.named())
            }
            NodeKind::New { ty, .. } => self.type_node_decl(ctx, *ty),
            NodeKind::Cast { ty, .. } => self.type_node_decl(ctx, *ty),
            _ => None,
        }
    }

    fn type_node_decl(&self, ctx: &ResolutionContext, ty: NodeId) -> Option<DeclId> {
        let u = ctx.unit(self.unit);
        match u.arena.kind(ty) {
            &NodeKind::NamedType { name } => u.decl_of(name),
            _ => None,
        }
    }
}

/// The named type a value declaration evaluates to, if its declared type
/// is a class or interface.
fn value_type(ctx: &ResolutionContext, decl: DeclId) -> Option<DeclId> {
    let ty = match &ctx.decls.get(decl).kind {
        DeclKind::Field(f) => f.ty.as_ref(),
        DeclKind::Local { ty, .. } | DeclKind::Param { ty, .. } => ty.as_ref(),
        _ => None,
    };
    ty.and_then(TypeSig::named)
}
