//! Statement grammar.

use jaz_common::{Diagnostic, Modifiers};

use super::{Parser, primitive_for};
use crate::node::{NodeId, NodeKind};
use crate::scanner::{Kw, TokenKind};

impl<'a> Parser<'a> {
    pub(crate) fn block(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.unexpected("'}' closing block"));
            }
            self.statement_into(&mut stmts)?;
        }
        let span = start.to(self.span());
        Ok(self.arena.alloc(NodeKind::Block { stmts }, span))
    }

    /// Parse one statement into `out`. A comma declarator list contributes
    /// one `LocalVarDecl` per declarator so the declared names all land in
    /// the enclosing block's scope.
    pub(crate) fn statement_into(&mut self, out: &mut Vec<NodeId>) -> Result<(), Diagnostic> {
        if self.looks_like_local_decl() {
            self.local_var_decls(out)?;
            self.expect(&TokenKind::Semi, "';' after local declaration")?;
            Ok(())
        } else {
            out.push(self.statement()?);
            Ok(())
        }
    }

    pub(crate) fn statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        match self.peek() {
            TokenKind::LBrace => self.block(),
            TokenKind::Semi => {
                self.bump();
                Ok(self.arena.alloc(NodeKind::EmptyStmt, start))
            }
            TokenKind::Keyword(Kw::If) => self.if_statement(),
            TokenKind::Keyword(Kw::While) => self.while_statement(),
            TokenKind::Keyword(Kw::Do) => self.do_while_statement(),
            TokenKind::Keyword(Kw::For) => self.for_statement(),
            TokenKind::Keyword(Kw::Switch) => self.switch_statement(),
            TokenKind::Keyword(Kw::Try) => self.try_statement(),
            TokenKind::Keyword(Kw::Return) => {
                self.bump();
                let expr = if self.at(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(&TokenKind::Semi, "';' after return")?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::Return { expr }, span))
            }
            TokenKind::Keyword(Kw::Throw) => {
                self.bump();
                let expr = self.expression()?;
                self.expect(&TokenKind::Semi, "';' after throw")?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::Throw { expr }, span))
            }
            TokenKind::Keyword(Kw::Break) => {
                self.bump();
                let label = self.jump_label()?;
                self.expect(&TokenKind::Semi, "';' after break")?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::Break { label }, span))
            }
            TokenKind::Keyword(Kw::Continue) => {
                self.bump();
                let label = self.jump_label()?;
                self.expect(&TokenKind::Semi, "';' after continue")?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::Continue { label }, span))
            }
            // `label: stmt`
            TokenKind::Ident(_) if self.peek_at(1) == &TokenKind::Colon => {
                let label = self.expect_ident("label")?;
                self.bump(); // ':'
                let stmt = self.statement()?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::Labeled { label, stmt }, span))
            }
            _ if self.looks_like_local_decl() => {
                // Only reachable as a sole statement body (e.g. an `if`
                // branch); declarator lists in blocks go via statement_into.
                let mut stmts = Vec::new();
                self.local_var_decls(&mut stmts)?;
                self.expect(&TokenKind::Semi, "';' after local declaration")?;
                if let [stmt] = stmts.as_slice() {
                    Ok(*stmt)
                } else {
                    let span = start.to(self.span());
                    Ok(self.arena.alloc(NodeKind::Block { stmts }, span))
                }
            }
            _ => {
                let expr = self.expression()?;
                self.expect(&TokenKind::Semi, "';' after expression")?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::ExprStmt { expr }, span))
            }
        }
    }

    fn jump_label(&mut self) -> Result<Option<NodeId>, Diagnostic> {
        if let TokenKind::Ident(_) = self.peek() {
            let ident = self.expect_ident("label")?;
            let span = self.span();
            Ok(Some(self.arena.alloc(
                NodeKind::Name {
                    qualifier: None,
                    ident,
                },
                span,
            )))
        } else {
            Ok(None)
        }
    }

    /// Token-level lookahead deciding local-declaration vs expression:
    /// `[final] (primitive | Name) ('[' ']')* Ident` begins a declaration.
    fn looks_like_local_decl(&self) -> bool {
        let mut i = 0;
        if self.peek_at(i) == &TokenKind::Keyword(Kw::Final) {
            return true;
        }
        match self.peek_at(i) {
            TokenKind::Keyword(kw) if primitive_for(*kw).is_some() => i += 1,
            TokenKind::Ident(_) => {
                i += 1;
                while self.peek_at(i) == &TokenKind::Dot
                    && matches!(self.peek_at(i + 1), TokenKind::Ident(_))
                {
                    i += 2;
                }
            }
            _ => return false,
        }
        while self.peek_at(i) == &TokenKind::LBracket && self.peek_at(i + 1) == &TokenKind::RBracket
        {
            i += 2;
        }
        matches!(self.peek_at(i), TokenKind::Ident(_))
    }

    /// Parse `[final] Type a = x, b, c` into one LocalVarDecl per declarator.
    /// The trailing ';' is left for the caller (for-init shares this path).
    fn local_var_decls(&mut self, out: &mut Vec<NodeId>) -> Result<(), Diagnostic> {
        let start = self.span();
        let modifiers = if self.eat_kw(Kw::Final) {
            Modifiers::FINAL
        } else {
            Modifiers::empty()
        };
        let ty = self.parse_type()?;
        loop {
            let name = self.expect_ident("variable name")?;
            let init = if self.eat(&TokenKind::Assign) {
                Some(self.expression()?)
            } else {
                None
            };
            let span = start.to(self.span());
            out.push(self.arena.alloc(
                NodeKind::LocalVarDecl {
                    modifiers,
                    ty,
                    name,
                    init,
                },
                span,
            ));
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn if_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::If, "'if'")?;
        self.expect(&TokenKind::LParen, "'(' after if")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let then_stmt = self.statement()?;
        let else_stmt = if self.eat_kw(Kw::Else) {
            Some(self.statement()?)
        } else {
            None
        };
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::If {
                cond,
                then_stmt,
                else_stmt,
            },
            span,
        ))
    }

    fn while_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::While, "'while'")?;
        self.expect(&TokenKind::LParen, "'(' after while")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = self.statement()?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(NodeKind::While { cond, body }, span))
    }

    fn do_while_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::Do, "'do'")?;
        let body = self.statement()?;
        self.expect_kw(Kw::While, "'while' after do body")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        self.expect(&TokenKind::Semi, "';' after do-while")?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(NodeKind::DoWhile { body, cond }, span))
    }

    fn for_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::For, "'for'")?;
        self.expect(&TokenKind::LParen, "'(' after for")?;

        let mut init = Vec::new();
        if !self.at(&TokenKind::Semi) {
            if self.looks_like_local_decl() {
                self.local_var_decls(&mut init)?;
            } else {
                loop {
                    let expr = self.expression()?;
                    let span = self.arena.span(expr);
                    init.push(self.arena.alloc(NodeKind::ExprStmt { expr }, span));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
        }
        self.expect(&TokenKind::Semi, "';' after for-init")?;

        let cond = if self.at(&TokenKind::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&TokenKind::Semi, "';' after for-condition")?;

        let mut update = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                update.push(self.expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')' after for-update")?;

        let body = self.statement()?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::For {
                init,
                cond,
                update,
                body,
            },
            span,
        ))
    }

    fn switch_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::Switch, "'switch'")?;
        self.expect(&TokenKind::LParen, "'(' after switch")?;
        let selector = self.expression()?;
        self.expect(&TokenKind::RParen, "')' after selector")?;
        self.expect(&TokenKind::LBrace, "'{' opening switch body")?;

        let mut cases = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.unexpected("'}' closing switch"));
            }
            let case_start = self.span();
            let mut labels = Vec::new();
            loop {
                if self.eat_kw(Kw::Case) {
                    let expr = self.expression()?;
                    self.expect(&TokenKind::Colon, "':' after case label")?;
                    labels.push(Some(expr));
                } else if self.eat_kw(Kw::Default) {
                    self.expect(&TokenKind::Colon, "':' after default")?;
                    labels.push(None);
                } else {
                    break;
                }
            }
            if labels.is_empty() {
                return Err(self.unexpected("'case' or 'default'"));
            }
            let mut stmts = Vec::new();
            while !self.at(&TokenKind::RBrace)
                && !self.at_kw(Kw::Case)
                && !self.at_kw(Kw::Default)
            {
                self.statement_into(&mut stmts)?;
            }
            let span = case_start.to(self.span());
            cases.push(self.arena.alloc(NodeKind::SwitchCase { labels, stmts }, span));
        }
        let span = start.to(self.span());
        Ok(self.arena.alloc(NodeKind::Switch { selector, cases }, span))
    }

    fn try_statement(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::Try, "'try'")?;
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.at_kw(Kw::Catch) {
            let catch_start = self.span();
            self.bump();
            self.expect(&TokenKind::LParen, "'(' after catch")?;
            let param_start = self.span();
            let ty = self.parse_type()?;
            let name = self.expect_ident("catch parameter")?;
            let param_span = param_start.to(self.span());
            let param = self.arena.alloc(
                NodeKind::Param {
                    modifiers: Modifiers::empty(),
                    ty,
                    name,
                },
                param_span,
            );
            self.expect(&TokenKind::RParen, "')' after catch parameter")?;
            let catch_body = self.block()?;
            let span = catch_start.to(self.span());
            catches.push(self.arena.alloc(
                NodeKind::Catch {
                    param,
                    body: catch_body,
                },
                span,
            ));
        }
        let finally = if self.eat_kw(Kw::Finally) {
            Some(self.block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(self.unexpected("'catch' or 'finally' after try block"));
        }
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::Try {
                body,
                catches,
                finally,
            },
            span,
        ))
    }
}
