//! Recursive-descent parser producing [`NodeArena`] trees.
//!
//! Split by syntactic family: this module holds the parser state plus the
//! compilation-unit, declaration, and type grammars; `statements` and
//! `expressions` carry the executable-code grammars.

mod expressions;
mod statements;

use jaz_common::{Diagnostic, Modifiers, Span, codes};

use crate::node::{NodeArena, NodeId, NodeKind, Primitive};
use crate::scanner::{Kw, Scanner, Token, TokenKind};

/// A parsed compilation unit: the arena plus its root node.
#[derive(Debug)]
pub struct ParsedUnit {
    pub file: String,
    pub arena: NodeArena,
    pub root: NodeId,
}

/// Parse one source file to a tree. Any lexical or syntactic error aborts
/// the parse.
pub fn parse_unit(file: &str, source: &str) -> Result<ParsedUnit, Diagnostic> {
    let tokens = Scanner::new(file, source).tokenize()?;
    let mut parser = Parser {
        file,
        tokens,
        pos: 0,
        arena: NodeArena::new(),
    };
    let root = parser.compilation_unit()?;
    tracing::debug!(file, nodes = parser.arena.len(), "parsed unit");
    Ok(ParsedUnit {
        file: file.to_string(),
        arena: parser.arena,
        root,
    })
}

pub(crate) struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) arena: NodeArena,
}

impl<'a> Parser<'a> {
    // ----- token plumbing -----

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub(crate) fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn bump(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn at_kw(&self, kw: Kw) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if *k == kw)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_kw(&mut self, kw: Kw) -> bool {
        if self.at_kw(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), Diagnostic> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn expect_kw(&mut self, kw: Kw, what: &str) -> Result<(), Diagnostic> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<String, Diagnostic> {
        match self.peek() {
            TokenKind::Ident(_) => match self.bump() {
                TokenKind::Ident(name) => Ok(name),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected(what)),
        }
    }

    pub(crate) fn unexpected(&self, what: &str) -> Diagnostic {
        let span = self.span();
        Diagnostic::error(
            self.file,
            codes::SYNTAX_ERROR,
            format!("expected {what}, found {:?}", self.peek()),
        )
        .with_span(span.start, span.len())
    }

    // ----- compilation unit -----

    fn compilation_unit(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let package = if self.eat_kw(Kw::Package) {
            let name = self.qualified_name()?;
            self.expect(&TokenKind::Semi, "';' after package clause")?;
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at_kw(Kw::Import) {
            imports.push(self.import_decl()?);
        }

        let mut types = Vec::new();
        while !self.at(&TokenKind::Eof) {
            types.push(self.type_decl()?);
        }

        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            },
            span,
        ))
    }

    fn import_decl(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        self.expect_kw(Kw::Import, "'import'")?;
        let mut name = {
            let ident = self.expect_ident("package or type name")?;
            let span = self.span();
            self.arena.alloc(
                NodeKind::Name {
                    qualifier: None,
                    ident,
                },
                span,
            )
        };
        let mut on_demand = false;
        while self.eat(&TokenKind::Dot) {
            if self.eat(&TokenKind::Star) {
                on_demand = true;
                break;
            }
            let ident = self.expect_ident("name component")?;
            let span = self.span();
            name = self.arena.alloc(
                NodeKind::Name {
                    qualifier: Some(name),
                    ident,
                },
                span,
            );
        }
        self.expect(&TokenKind::Semi, "';' after import")?;
        let span = start.to(self.span());
        Ok(if on_demand {
            self.arena.alloc(NodeKind::ImportOnDemand { name }, span)
        } else {
            self.arena.alloc(NodeKind::ImportSingle { name }, span)
        })
    }

    /// `a.b.c` as a left-nested `Name` chain.
    pub(crate) fn qualified_name(&mut self) -> Result<NodeId, Diagnostic> {
        let ident = self.expect_ident("name")?;
        let span = self.span();
        let mut name = self.arena.alloc(
            NodeKind::Name {
                qualifier: None,
                ident,
            },
            span,
        );
        while matches!(self.peek(), TokenKind::Dot)
            && matches!(self.peek_at(1), TokenKind::Ident(_))
        {
            self.bump();
            let ident = self.expect_ident("name component")?;
            let span = self.span();
            name = self.arena.alloc(
                NodeKind::Name {
                    qualifier: Some(name),
                    ident,
                },
                span,
            );
        }
        Ok(name)
    }

    // ----- declarations -----

    pub(crate) fn modifiers(&mut self) -> Modifiers {
        let mut mods = Modifiers::empty();
        loop {
            let m = match self.peek() {
                TokenKind::Keyword(Kw::Public) => Modifiers::PUBLIC,
                TokenKind::Keyword(Kw::Protected) => Modifiers::PROTECTED,
                TokenKind::Keyword(Kw::Private) => Modifiers::PRIVATE,
                TokenKind::Keyword(Kw::Static) => Modifiers::STATIC,
                TokenKind::Keyword(Kw::Abstract) => Modifiers::ABSTRACT,
                TokenKind::Keyword(Kw::Final) => Modifiers::FINAL,
                TokenKind::Keyword(Kw::Native) => Modifiers::NATIVE,
                TokenKind::Keyword(Kw::Synchronized) => Modifiers::SYNCHRONIZED,
                TokenKind::Keyword(Kw::Transient) => Modifiers::TRANSIENT,
                TokenKind::Keyword(Kw::Volatile) => Modifiers::VOLATILE,
                TokenKind::Keyword(Kw::Strictfp) => Modifiers::STRICTFP,
                _ => return mods,
            };
            self.bump();
            mods |= m;
        }
    }

    fn type_decl(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let modifiers = self.modifiers();
        if self.at_kw(Kw::Class) {
            self.class_decl(modifiers, start)
        } else if self.at_kw(Kw::Interface) {
            self.interface_decl(modifiers, start)
        } else {
            Err(self.unexpected("'class' or 'interface'"))
        }
    }

    fn class_decl(&mut self, modifiers: Modifiers, start: Span) -> Result<NodeId, Diagnostic> {
        self.expect_kw(Kw::Class, "'class'")?;
        let name = self.expect_ident("class name")?;
        let extends = if self.eat_kw(Kw::Extends) {
            Some(self.qualified_name()?)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat_kw(Kw::Implements) {
            loop {
                implements.push(self.qualified_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let members = self.class_body(&name)?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::ClassDecl {
                modifiers,
                name,
                extends,
                implements,
                members,
            },
            span,
        ))
    }

    fn interface_decl(&mut self, modifiers: Modifiers, start: Span) -> Result<NodeId, Diagnostic> {
        self.expect_kw(Kw::Interface, "'interface'")?;
        let name = self.expect_ident("interface name")?;
        let mut extends = Vec::new();
        if self.eat_kw(Kw::Extends) {
            loop {
                extends.push(self.qualified_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let members = self.class_body(&name)?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::InterfaceDecl {
                modifiers,
                name,
                extends,
                members,
            },
            span,
        ))
    }

    fn class_body(&mut self, type_name: &str) -> Result<Vec<NodeId>, Diagnostic> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.unexpected("'}' closing type body"));
            }
            self.member(type_name, &mut members)?;
        }
        Ok(members)
    }

    fn member(&mut self, type_name: &str, out: &mut Vec<NodeId>) -> Result<(), Diagnostic> {
        let start = self.span();
        let modifiers = self.modifiers();

        // Nested type declarations.
        if self.at_kw(Kw::Class) {
            out.push(self.class_decl(modifiers, start)?);
            return Ok(());
        }
        if self.at_kw(Kw::Interface) {
            out.push(self.interface_decl(modifiers, start)?);
            return Ok(());
        }

        // Initializer block: `static { ... }` or a bare `{ ... }`.
        if self.at(&TokenKind::LBrace) {
            let body = self.block()?;
            let span = start.to(self.span());
            out.push(self.arena.alloc(
                NodeKind::InitializerBlock {
                    is_static: modifiers.contains(Modifiers::STATIC),
                    body,
                },
                span,
            ));
            return Ok(());
        }

        // Constructor: the type's own name followed by '('.
        if let TokenKind::Ident(name) = self.peek()
            && name == type_name
            && matches!(self.peek_at(1), TokenKind::LParen)
        {
            out.push(self.constructor_decl(modifiers, start)?);
            return Ok(());
        }

        // Method or field: both start with a type.
        let ty = self.parse_type()?;
        let name = self.expect_ident("member name")?;
        if self.at(&TokenKind::LParen) {
            out.push(self.method_decl(modifiers, ty, name, start)?);
        } else {
            self.field_decls(modifiers, ty, name, start, out)?;
        }
        Ok(())
    }

    fn constructor_decl(&mut self, modifiers: Modifiers, start: Span) -> Result<NodeId, Diagnostic> {
        let name = self.expect_ident("constructor name")?;
        let params = self.param_list()?;
        let throws = self.throws_clause()?;
        self.expect(&TokenKind::LBrace, "constructor body")?;

        // A leading `super(...)` call is recorded on the declaration itself.
        let super_args = if self.at_kw(Kw::Super) && matches!(self.peek_at(1), TokenKind::LParen) {
            self.bump();
            let args = self.arg_list()?;
            self.expect(&TokenKind::Semi, "';' after super call")?;
            Some(args)
        } else {
            None
        };

        let body_start = self.span();
        let mut stmts = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.unexpected("'}' closing constructor body"));
            }
            self.statement_into(&mut stmts)?;
        }
        let body_span = body_start.to(self.span());
        let body = self.arena.alloc(NodeKind::Block { stmts }, body_span);

        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::ConstructorDecl {
                modifiers,
                name,
                params,
                throws,
                super_args,
                body,
            },
            span,
        ))
    }

    fn method_decl(
        &mut self,
        modifiers: Modifiers,
        return_ty: NodeId,
        name: String,
        start: Span,
    ) -> Result<NodeId, Diagnostic> {
        let params = self.param_list()?;
        let throws = self.throws_clause()?;
        let body = if self.eat(&TokenKind::Semi) {
            None
        } else {
            Some(self.block()?)
        };
        let span = start.to(self.span());
        Ok(self.arena.alloc(
            NodeKind::MethodDecl {
                modifiers,
                return_ty,
                name,
                params,
                throws,
                body,
            },
            span,
        ))
    }

    fn field_decls(
        &mut self,
        modifiers: Modifiers,
        ty: NodeId,
        first_name: String,
        start: Span,
        out: &mut Vec<NodeId>,
    ) -> Result<(), Diagnostic> {
        // Comma-separated declarator lists desugar to one FieldDecl each.
        let mut name = first_name;
        loop {
            let init = if self.eat(&TokenKind::Assign) {
                Some(self.expression()?)
            } else {
                None
            };
            let span = start.to(self.span());
            out.push(self.arena.alloc(
                NodeKind::FieldDecl {
                    modifiers,
                    ty,
                    name,
                    init,
                },
                span,
            ));
            if self.eat(&TokenKind::Comma) {
                name = self.expect_ident("field name")?;
            } else {
                break;
            }
        }
        self.expect(&TokenKind::Semi, "';' after field declaration")
    }

    pub(crate) fn param_list(&mut self) -> Result<Vec<NodeId>, Diagnostic> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let start = self.span();
                let modifiers = if self.eat_kw(Kw::Final) {
                    Modifiers::FINAL
                } else {
                    Modifiers::empty()
                };
                let ty = self.parse_type()?;
                let name = self.expect_ident("parameter name")?;
                let span = start.to(self.span());
                params.push(
                    self.arena
                        .alloc(NodeKind::Param { modifiers, ty, name }, span),
                );
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn throws_clause(&mut self) -> Result<Vec<NodeId>, Diagnostic> {
        let mut throws = Vec::new();
        if self.eat_kw(Kw::Throws) {
            loop {
                throws.push(self.qualified_name()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(throws)
    }

    // ----- types -----

    pub(crate) fn parse_type(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let mut ty = match self.peek() {
            TokenKind::Keyword(Kw::Void) => {
                self.bump();
                self.arena.alloc(NodeKind::VoidType, start)
            }
            TokenKind::Keyword(kw) => {
                let prim = primitive_for(*kw).ok_or_else(|| self.unexpected("type"))?;
                self.bump();
                self.arena.alloc(NodeKind::PrimitiveType(prim), start)
            }
            TokenKind::Ident(_) => {
                let name = self.qualified_name()?;
                let span = start.to(self.span());
                self.arena.alloc(NodeKind::NamedType { name }, span)
            }
            _ => return Err(self.unexpected("type")),
        };
        while self.at(&TokenKind::LBracket) && self.peek_at(1) == &TokenKind::RBracket {
            self.bump();
            self.bump();
            let span = start.to(self.span());
            ty = self.arena.alloc(NodeKind::ArrayType { element: ty }, span);
        }
        Ok(ty)
    }
}

pub(crate) fn primitive_for(kw: Kw) -> Option<Primitive> {
    Some(match kw {
        Kw::Boolean => Primitive::Boolean,
        Kw::Byte => Primitive::Byte,
        Kw::Short => Primitive::Short,
        Kw::Int => Primitive::Int,
        Kw::Long => Primitive::Long,
        Kw::Char => Primitive::Char,
        Kw::Float => Primitive::Float,
        Kw::Double => Primitive::Double,
        _ => return None,
    })
}
