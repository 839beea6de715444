//! Source regeneration.
//!
//! Prints a (possibly resolved) syntax tree back to compilable source.
//! Resolved access forms print their explicit spelling (`this.x`,
//! `Type.x`), synthesized constructors print like hand-written ones, and
//! re-parsing the output yields a tree that resolves identically.

use jaz_parser::{BinaryOp, Literal, NodeArena, NodeId, NodeKind, UnaryOp};

/// Regenerate a whole compilation unit.
pub fn emit_unit(arena: &NodeArena, root: NodeId) -> String {
    let mut printer = Printer::new(arena);
    printer.unit(root);
    printer.finish()
}

pub struct Printer<'a> {
    arena: &'a NodeArena,
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a NodeArena) -> Printer<'a> {
        Printer {
            arena,
            out: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    // ----- output helpers -----

    fn write(&mut self, text: &str) {
        if self.at_line_start && !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    fn write_space(&mut self) {
        self.write(" ");
    }

    fn write_line(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    fn increase_indent(&mut self) {
        self.indent += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    // ----- structure -----

    pub fn unit(&mut self, root: NodeId) {
        let NodeKind::CompilationUnit {
            package,
            imports,
            types,
        } = self.arena.kind(root)
        else {
            return;
        };
        if let Some(pkg) = package {
            self.write("package ");
            self.write(&self.arena.name_to_string(*pkg));
            self.write(";");
            self.write_line();
            self.write_line();
        }
        for &import in imports {
            match self.arena.kind(import) {
                NodeKind::ImportSingle { name } => {
                    self.write("import ");
                    self.write(&self.arena.name_to_string(*name));
                    self.write(";");
                }
                NodeKind::ImportOnDemand { name } => {
                    self.write("import ");
                    self.write(&self.arena.name_to_string(*name));
                    self.write(".*;");
                }
                _ => {}
            }
            self.write_line();
        }
        if !imports.is_empty() {
            self.write_line();
        }
        for &ty in types {
            self.type_decl(ty);
            self.write_line();
        }
    }

    fn modifiers(&mut self, modifiers: jaz_common::Modifiers) {
        for kw in modifiers.keywords() {
            self.write(kw);
            self.write_space();
        }
    }

    fn type_decl(&mut self, node: NodeId) {
        match self.arena.kind(node) {
            NodeKind::ClassDecl {
                modifiers,
                name,
                extends,
                implements,
                members,
            } => {
                let (modifiers, name) = (*modifiers, name.clone());
                let extends = *extends;
                let implements = implements.clone();
                let members = members.clone();
                self.modifiers(modifiers);
                self.write("class ");
                self.write(&name);
                if let Some(sup) = extends {
                    self.write(" extends ");
                    self.write(&self.arena.name_to_string(sup));
                }
                if !implements.is_empty() {
                    self.write(" implements ");
                    for (i, iface) in implements.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.write(&self.arena.name_to_string(*iface));
                    }
                }
                self.member_block(&members);
            }
            NodeKind::InterfaceDecl {
                modifiers,
                name,
                extends,
                members,
            } => {
                let (modifiers, name) = (*modifiers, name.clone());
                let extends = extends.clone();
                let members = members.clone();
                self.modifiers(modifiers);
                self.write("interface ");
                self.write(&name);
                if !extends.is_empty() {
                    self.write(" extends ");
                    for (i, sup) in extends.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.write(&self.arena.name_to_string(*sup));
                    }
                }
                self.member_block(&members);
            }
            _ => {}
        }
    }

    fn member_block(&mut self, members: &[NodeId]) {
        self.write(" {");
        self.write_line();
        self.increase_indent();
        for &member in members {
            self.member(member);
        }
        self.decrease_indent();
        self.write("}");
        self.write_line();
    }

    fn member(&mut self, node: NodeId) {
        match self.arena.kind(node) {
            NodeKind::FieldDecl {
                modifiers,
                ty,
                name,
                init,
            } => {
                let (modifiers, ty, name, init) = (*modifiers, *ty, name.clone(), *init);
                self.modifiers(modifiers);
                self.type_ann(ty);
                self.write_space();
                self.write(&name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.expr(init, 0);
                }
                self.write(";");
                self.write_line();
            }
            NodeKind::MethodDecl {
                modifiers,
                return_ty,
                name,
                params,
                throws,
                body,
            } => {
                let (modifiers, return_ty, name) = (*modifiers, *return_ty, name.clone());
                let params = params.clone();
                let throws = throws.clone();
                let body = *body;
                self.modifiers(modifiers);
                self.type_ann(return_ty);
                self.write_space();
                self.write(&name);
                self.param_list(&params);
                self.throws_clause(&throws);
                match body {
                    Some(body) => {
                        self.write_space();
                        self.stmt(body);
                    }
                    None => {
                        self.write(";");
                        self.write_line();
                    }
                }
            }
            NodeKind::ConstructorDecl {
                modifiers,
                name,
                params,
                throws,
                super_args,
                body,
            } => {
                let (modifiers, name) = (*modifiers, name.clone());
                let params = params.clone();
                let throws = throws.clone();
                let super_args = super_args.clone();
                let body = *body;
                self.modifiers(modifiers);
                self.write(&name);
                self.param_list(&params);
                self.throws_clause(&throws);
                self.write(" {");
                self.write_line();
                self.increase_indent();
                if let Some(args) = super_args {
                    self.write("super(");
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.expr(*arg, 0);
                    }
                    self.write(");");
                    self.write_line();
                }
                if let NodeKind::Block { stmts } = self.arena.kind(body) {
                    for &s in &stmts.clone() {
                        self.stmt_line(s);
                    }
                }
                self.decrease_indent();
                self.write("}");
                self.write_line();
            }
            &NodeKind::InitializerBlock { is_static, body } => {
                if is_static {
                    self.write("static ");
                }
                self.stmt(body);
            }
            NodeKind::ClassDecl { .. } | NodeKind::InterfaceDecl { .. } => {
                self.type_decl(node);
            }
            _ => {}
        }
    }

    fn param_list(&mut self, params: &[NodeId]) {
        self.write("(");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let NodeKind::Param {
                modifiers,
                ty,
                name,
            } = self.arena.kind(param)
            {
                let (modifiers, ty, name) = (*modifiers, *ty, name.clone());
                self.modifiers(modifiers);
                self.type_ann(ty);
                self.write_space();
                self.write(&name);
            }
        }
        self.write(")");
    }

    fn throws_clause(&mut self, throws: &[NodeId]) {
        if throws.is_empty() {
            return;
        }
        self.write(" throws ");
        for (i, &name) in throws.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&self.arena.name_to_string(name));
        }
    }

    fn type_ann(&mut self, node: NodeId) {
        match self.arena.kind(node) {
            NodeKind::PrimitiveType(p) => self.write(p.keyword()),
            NodeKind::VoidType => self.write("void"),
            NodeKind::NamedType { name } => {
                self.write(&self.arena.name_to_string(*name));
            }
            &NodeKind::ArrayType { element } => {
                self.type_ann(element);
                self.write("[]");
            }
            _ => {}
        }
    }

    // ----- statements -----

    fn stmt_line(&mut self, node: NodeId) {
        self.stmt(node);
    }

    fn stmt(&mut self, node: NodeId) {
        match self.arena.kind(node) {
            NodeKind::Block { stmts } => {
                let stmts = stmts.clone();
                self.write("{");
                self.write_line();
                self.increase_indent();
                for s in stmts {
                    self.stmt_line(s);
                }
                self.decrease_indent();
                self.write("}");
                self.write_line();
            }
            NodeKind::LocalVarDecl {
                modifiers,
                ty,
                name,
                init,
            } => {
                let (modifiers, ty, name, init) = (*modifiers, *ty, name.clone(), *init);
                self.modifiers(modifiers);
                self.type_ann(ty);
                self.write_space();
                self.write(&name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.expr(init, 0);
                }
                self.write(";");
                self.write_line();
            }
            &NodeKind::ExprStmt { expr } => {
                self.expr(expr, 0);
                self.write(";");
                self.write_line();
            }
            &NodeKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.write("if (");
                self.expr(cond, 0);
                self.write(") ");
                self.stmt(then_stmt);
                if let Some(e) = else_stmt {
                    self.write("else ");
                    self.stmt(e);
                }
            }
            &NodeKind::While { cond, body } => {
                self.write("while (");
                self.expr(cond, 0);
                self.write(") ");
                self.stmt(body);
            }
            &NodeKind::DoWhile { body, cond } => {
                self.write("do ");
                self.stmt(body);
                self.write("while (");
                self.expr(cond, 0);
                self.write(");");
                self.write_line();
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                let init = init.clone();
                let cond = *cond;
                let update = update.clone();
                let body = *body;
                self.write("for (");
                for (i, item) in init.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.for_init(*item, i == 0);
                }
                self.write("; ");
                if let Some(c) = cond {
                    self.expr(c, 0);
                }
                self.write("; ");
                for (i, u) in update.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.expr(*u, 0);
                }
                self.write(") ");
                self.stmt(body);
            }
            NodeKind::Switch { selector, cases } => {
                let selector = *selector;
                let cases = cases.clone();
                self.write("switch (");
                self.expr(selector, 0);
                self.write(") {");
                self.write_line();
                for case in cases {
                    self.switch_case(case);
                }
                self.write("}");
                self.write_line();
            }
            &NodeKind::Break { label } => {
                self.write("break");
                if let Some(l) = label {
                    self.write_space();
                    self.write(&self.arena.name_to_string(l));
                }
                self.write(";");
                self.write_line();
            }
            &NodeKind::Continue { label } => {
                self.write("continue");
                if let Some(l) = label {
                    self.write_space();
                    self.write(&self.arena.name_to_string(l));
                }
                self.write(";");
                self.write_line();
            }
            &NodeKind::Return { expr } => {
                self.write("return");
                if let Some(e) = expr {
                    self.write_space();
                    self.expr(e, 0);
                }
                self.write(";");
                self.write_line();
            }
            &NodeKind::Throw { expr } => {
                self.write("throw ");
                self.expr(expr, 0);
                self.write(";");
                self.write_line();
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                let body = *body;
                let catches = catches.clone();
                let finally = *finally;
                self.write("try ");
                self.stmt(body);
                for catch in catches {
                    if let &NodeKind::Catch { param, body } = self.arena.kind(catch) {
                        self.write("catch ");
                        self.param_list(&[param]);
                        self.write_space();
                        self.stmt(body);
                    }
                }
                if let Some(f) = finally {
                    self.write("finally ");
                    self.stmt(f);
                }
            }
            NodeKind::Labeled { label, stmt } => {
                let (label, stmt) = (label.clone(), *stmt);
                self.write(&label);
                self.write(": ");
                self.stmt(stmt);
            }
            NodeKind::EmptyStmt => {
                self.write(";");
                self.write_line();
            }
            _ => {
                // An expression in statement position (for-update rewrites).
                self.expr(node, 0);
                self.write(";");
                self.write_line();
            }
        }
    }

    /// For-init items share one declared type; only the first prints it.
    fn for_init(&mut self, node: NodeId, first: bool) {
        match self.arena.kind(node) {
            NodeKind::LocalVarDecl {
                modifiers,
                ty,
                name,
                init,
            } => {
                let (modifiers, ty, name, init) = (*modifiers, *ty, name.clone(), *init);
                if first {
                    self.modifiers(modifiers);
                    self.type_ann(ty);
                    self.write_space();
                }
                self.write(&name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.expr(init, 0);
                }
            }
            &NodeKind::ExprStmt { expr } => self.expr(expr, 0),
            _ => {}
        }
    }

    fn switch_case(&mut self, node: NodeId) {
        let NodeKind::SwitchCase { labels, stmts } = self.arena.kind(node) else {
            return;
        };
        let labels = labels.clone();
        let stmts = stmts.clone();
        for label in labels {
            match label {
                Some(expr) => {
                    self.write("case ");
                    self.expr(expr, 0);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.write_line();
        }
        self.increase_indent();
        for s in stmts {
            self.stmt_line(s);
        }
        self.decrease_indent();
    }

    // ----- expressions -----

    /// Print an expression, parenthesizing when its precedence is below
    /// what the surrounding context requires.
    fn expr(&mut self, node: NodeId, min_prec: u8) {
        let prec = self.precedence(node);
        if prec < min_prec {
            self.write("(");
            self.expr_inner(node);
            self.write(")");
        } else {
            self.expr_inner(node);
        }
    }

    fn expr_inner(&mut self, node: NodeId) {
        match self.arena.kind(node) {
            NodeKind::Literal { value } => {
                let value = value.clone();
                self.literal(&value);
            }
            NodeKind::This => self.write("this"),
            NodeKind::NameRef { name } | NodeKind::LocalRef { name } => {
                self.write(&self.arena.name_to_string(*name));
            }
            NodeKind::ThisFieldAccess { name } => {
                self.write("this.");
                self.write(&self.arena.name_to_string(*name));
            }
            NodeKind::TypeFieldAccess { ty, name } => {
                self.write(&self.arena.name_to_string(*ty));
                self.write(".");
                self.write(self.arena.name_ident(*name));
            }
            &NodeKind::FieldAccess { object, name } => {
                self.expr(object, PREC_POSTFIX);
                self.write(".");
                self.write(self.arena.name_ident(name));
            }
            NodeKind::Call { callee, args } => {
                let callee = *callee;
                let args = args.clone();
                self.expr(callee, PREC_POSTFIX);
                self.arg_list(&args);
            }
            NodeKind::New { ty, args } => {
                let ty = *ty;
                let args = args.clone();
                self.write("new ");
                self.type_ann(ty);
                self.arg_list(&args);
            }
            &NodeKind::Cast { ty, expr } => {
                self.write("(");
                self.type_ann(ty);
                self.write(") ");
                self.expr(expr, PREC_UNARY);
            }
            &NodeKind::InstanceOf { expr, ty } => {
                self.expr(expr, PREC_RELATIONAL);
                self.write(" instanceof ");
                self.type_ann(ty);
            }
            &NodeKind::Unary { op, operand } => match op {
                UnaryOp::PostInc => {
                    self.expr(operand, PREC_POSTFIX);
                    self.write("++");
                }
                UnaryOp::PostDec => {
                    self.expr(operand, PREC_POSTFIX);
                    self.write("--");
                }
                _ => {
                    self.write(unary_token(op));
                    self.expr(operand, PREC_UNARY);
                }
            },
            &NodeKind::Binary { op, lhs, rhs } => {
                let prec = binary_prec(op);
                self.expr(lhs, prec);
                self.write_space();
                self.write(binary_token(op));
                self.write_space();
                // Left-associative: the right operand needs one level more.
                self.expr(rhs, prec + 1);
            }
            &NodeKind::Assign { op, lhs, rhs } => {
                self.expr(lhs, PREC_UNARY);
                self.write_space();
                if let Some(op) = op {
                    self.write(binary_token(op));
                }
                self.write("=");
                self.write_space();
                self.expr(rhs, PREC_ASSIGN);
            }
            &NodeKind::ArrayAccess { array, index } => {
                self.expr(array, PREC_POSTFIX);
                self.write("[");
                self.expr(index, 0);
                self.write("]");
            }
            &NodeKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(cond, PREC_COND + 1);
                self.write(" ? ");
                self.expr(then_expr, 0);
                self.write(" : ");
                self.expr(else_expr, PREC_COND);
            }
            _ => {}
        }
    }

    fn arg_list(&mut self, args: &[NodeId]) {
        self.write("(");
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(arg, 0);
        }
        self.write(")");
    }

    fn literal(&mut self, value: &Literal) {
        match value {
            Literal::Null => self.write("null"),
            Literal::Bool(true) => self.write("true"),
            Literal::Bool(false) => self.write("false"),
            Literal::Int(v) => self.write(&v.to_string()),
            Literal::Long(v) => self.write(&format!("{v}L")),
            Literal::Float(text) => self.write(&format!("{text}f")),
            Literal::Double(text) => {
                if text.contains('.') {
                    self.write(text);
                } else {
                    self.write(&format!("{text}d"));
                }
            }
            Literal::Char(c) => {
                self.write("'");
                self.write(&escape_char(*c, '\''));
                self.write("'");
            }
            Literal::Str(s) => {
                self.write("\"");
                for c in s.chars() {
                    let escaped = escape_char(c, '"');
                    self.write(&escaped);
                }
                self.write("\"");
            }
        }
    }

    fn precedence(&self, node: NodeId) -> u8 {
        match self.arena.kind(node) {
            NodeKind::Assign { .. } => PREC_ASSIGN,
            NodeKind::Cond { .. } => PREC_COND,
            &NodeKind::Binary { op, .. } => binary_prec(op),
            NodeKind::InstanceOf { .. } => PREC_RELATIONAL,
            NodeKind::Cast { .. } => PREC_UNARY,
            NodeKind::Unary { op, .. } => match op {
                UnaryOp::PostInc | UnaryOp::PostDec => PREC_POSTFIX,
                _ => PREC_UNARY,
            },
            _ => PREC_PRIMARY,
        }
    }
}

const PREC_ASSIGN: u8 = 1;
const PREC_COND: u8 = 2;
const PREC_RELATIONAL: u8 = 9;
const PREC_UNARY: u8 = 13;
const PREC_POSTFIX: u8 = 14;
const PREC_PRIMARY: u8 = 15;

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 3,
        BinaryOp::And => 4,
        BinaryOp::BitOr => 5,
        BinaryOp::BitXor => 6,
        BinaryOp::BitAnd => 7,
        BinaryOp::Eq | BinaryOp::Ne => 8,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => PREC_RELATIONAL,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 10,
        BinaryOp::Add | BinaryOp::Sub => 11,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 12,
    }
}

fn binary_token(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::UShr => ">>>",
        BinaryOp::Lt => "<",
        BinaryOp::Gt => ">",
        BinaryOp::Le => "<=",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitXor => "^",
        BinaryOp::BitOr => "|",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

fn unary_token(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Plus => "+",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::PreInc => "++",
        UnaryOp::PreDec => "--",
        UnaryOp::PostInc | UnaryOp::PostDec => unreachable!("postfix handled by caller"),
    }
}

fn escape_char(c: char, quote: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\\' => "\\\\".to_string(),
        '\0' => "\\0".to_string(),
        c if c == quote => format!("\\{quote}"),
        c => c.to_string(),
    }
}
