//! Expression grammar, precedence-climbing.

use jaz_common::Diagnostic;

use super::{Parser, primitive_for};
use crate::node::{BinaryOp, Literal, NodeId, NodeKind, UnaryOp};
use crate::scanner::{Kw, TokenKind};

impl<'a> Parser<'a> {
    pub(crate) fn expression(&mut self) -> Result<NodeId, Diagnostic> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let lhs = self.conditional()?;
        let op = match self.peek() {
            TokenKind::Assign => None,
            TokenKind::PlusAssign => Some(BinaryOp::Add),
            TokenKind::MinusAssign => Some(BinaryOp::Sub),
            TokenKind::StarAssign => Some(BinaryOp::Mul),
            TokenKind::SlashAssign => Some(BinaryOp::Div),
            TokenKind::PercentAssign => Some(BinaryOp::Rem),
            TokenKind::AmpAssign => Some(BinaryOp::BitAnd),
            TokenKind::PipeAssign => Some(BinaryOp::BitOr),
            TokenKind::CaretAssign => Some(BinaryOp::BitXor),
            TokenKind::ShlAssign => Some(BinaryOp::Shl),
            TokenKind::ShrAssign => Some(BinaryOp::Shr),
            TokenKind::UShrAssign => Some(BinaryOp::UShr),
            _ => return Ok(lhs),
        };
        self.bump();
        let rhs = self.assignment()?;
        let span = start.to(self.span());
        Ok(self.arena.alloc(NodeKind::Assign { op, lhs, rhs }, span))
    }

    fn conditional(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let cond = self.binary(0)?;
        if self.eat(&TokenKind::Question) {
            let then_expr = self.expression()?;
            self.expect(&TokenKind::Colon, "':' in conditional expression")?;
            let else_expr = self.conditional()?;
            let span = start.to(self.span());
            Ok(self.arena.alloc(
                NodeKind::Cond {
                    cond,
                    then_expr,
                    else_expr,
                },
                span,
            ))
        } else {
            Ok(cond)
        }
    }

    /// Binary operators by precedence level; `instanceof` sits at the
    /// relational level and takes a type operand.
    fn binary(&mut self, min_level: u8) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let mut lhs = self.unary()?;
        loop {
            if self.at_kw(Kw::Instanceof) {
                if relational_level() < min_level {
                    return Ok(lhs);
                }
                self.bump();
                let ty = self.parse_type()?;
                let span = start.to(self.span());
                lhs = self.arena.alloc(NodeKind::InstanceOf { expr: lhs, ty }, span);
                continue;
            }
            let (op, level) = match binary_op(self.peek()) {
                Some(pair) => pair,
                None => return Ok(lhs),
            };
            if level < min_level {
                return Ok(lhs);
            }
            self.bump();
            let rhs = self.binary(level + 1)?;
            let span = start.to(self.span());
            lhs = self.arena.alloc(NodeKind::Binary { op, lhs, rhs }, span);
        }
    }

    fn unary(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.unary()?;
            let span = start.to(self.span());
            return Ok(self.arena.alloc(NodeKind::Unary { op, operand }, span));
        }
        if self.at(&TokenKind::LParen) && self.looks_like_cast() {
            self.bump();
            let ty = self.parse_type()?;
            self.expect(&TokenKind::RParen, "')' closing cast")?;
            let expr = self.unary()?;
            let span = start.to(self.span());
            return Ok(self.arena.alloc(NodeKind::Cast { ty, expr }, span));
        }
        self.postfix()
    }

    /// Lookahead for `(Type) unary`. Primitive casts are unambiguous; a
    /// parenthesized name is a cast only when followed by a token that can
    /// begin an operand (so `(a) + b` parses as addition, not a cast).
    fn looks_like_cast(&self) -> bool {
        let mut i = 1;
        match self.peek_at(i) {
            TokenKind::Keyword(kw) if primitive_for(*kw).is_some() => {
                i += 1;
                while self.peek_at(i) == &TokenKind::LBracket
                    && self.peek_at(i + 1) == &TokenKind::RBracket
                {
                    i += 2;
                }
                self.peek_at(i) == &TokenKind::RParen
            }
            TokenKind::Ident(_) => {
                i += 1;
                while self.peek_at(i) == &TokenKind::Dot
                    && matches!(self.peek_at(i + 1), TokenKind::Ident(_))
                {
                    i += 2;
                }
                let mut saw_brackets = false;
                while self.peek_at(i) == &TokenKind::LBracket
                    && self.peek_at(i + 1) == &TokenKind::RBracket
                {
                    saw_brackets = true;
                    i += 2;
                }
                if self.peek_at(i) != &TokenKind::RParen {
                    return false;
                }
                if saw_brackets {
                    return true;
                }
                matches!(
                    self.peek_at(i + 1),
                    TokenKind::Ident(_)
                        | TokenKind::IntLit(_)
                        | TokenKind::LongLit(_)
                        | TokenKind::FloatLit(_)
                        | TokenKind::DoubleLit(_)
                        | TokenKind::CharLit(_)
                        | TokenKind::StrLit(_)
                        | TokenKind::LParen
                        | TokenKind::Bang
                        | TokenKind::Tilde
                        | TokenKind::Keyword(Kw::This)
                        | TokenKind::Keyword(Kw::New)
                        | TokenKind::Keyword(Kw::Null)
                        | TokenKind::Keyword(Kw::True)
                        | TokenKind::Keyword(Kw::False)
                )
            }
            _ => false,
        }
    }

    fn postfix(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.bump();
                    let ident = self.expect_ident("member name")?;
                    let name_span = self.span();
                    let name = self.arena.alloc(
                        NodeKind::Name {
                            qualifier: None,
                            ident,
                        },
                        name_span,
                    );
                    let span = start.to(self.span());
                    expr = self
                        .arena
                        .alloc(NodeKind::FieldAccess { object: expr, name }, span);
                }
                TokenKind::LParen => {
                    let args = self.arg_list()?;
                    let span = start.to(self.span());
                    expr = self.arena.alloc(NodeKind::Call { callee: expr, args }, span);
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']' closing index")?;
                    let span = start.to(self.span());
                    expr = self
                        .arena
                        .alloc(NodeKind::ArrayAccess { array: expr, index }, span);
                }
                TokenKind::PlusPlus => {
                    self.bump();
                    let span = start.to(self.span());
                    expr = self.arena.alloc(
                        NodeKind::Unary {
                            op: UnaryOp::PostInc,
                            operand: expr,
                        },
                        span,
                    );
                }
                TokenKind::MinusMinus => {
                    self.bump();
                    let span = start.to(self.span());
                    expr = self.arena.alloc(
                        NodeKind::Unary {
                            op: UnaryOp::PostDec,
                            operand: expr,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<NodeId, Diagnostic> {
        let start = self.span();
        match self.peek().clone() {
            TokenKind::IntLit(v) => {
                self.bump();
                Ok(self.literal(Literal::Int(v), start))
            }
            TokenKind::LongLit(v) => {
                self.bump();
                Ok(self.literal(Literal::Long(v), start))
            }
            TokenKind::FloatLit(text) => {
                self.bump();
                Ok(self.literal(Literal::Float(text), start))
            }
            TokenKind::DoubleLit(text) => {
                self.bump();
                Ok(self.literal(Literal::Double(text), start))
            }
            TokenKind::CharLit(c) => {
                self.bump();
                Ok(self.literal(Literal::Char(c), start))
            }
            TokenKind::StrLit(s) => {
                self.bump();
                Ok(self.literal(Literal::Str(s), start))
            }
            TokenKind::Keyword(Kw::Null) => {
                self.bump();
                Ok(self.literal(Literal::Null, start))
            }
            TokenKind::Keyword(Kw::True) => {
                self.bump();
                Ok(self.literal(Literal::Bool(true), start))
            }
            TokenKind::Keyword(Kw::False) => {
                self.bump();
                Ok(self.literal(Literal::Bool(false), start))
            }
            TokenKind::Keyword(Kw::This) => {
                self.bump();
                Ok(self.arena.alloc(NodeKind::This, start))
            }
            TokenKind::Keyword(Kw::New) => {
                self.bump();
                let name = self.qualified_name()?;
                let ty_span = start.to(self.span());
                let ty = self.arena.alloc(NodeKind::NamedType { name }, ty_span);
                let args = self.arg_list()?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::New { ty, args }, span))
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Ident(_) => {
                let name = self.qualified_name()?;
                let span = start.to(self.span());
                Ok(self.arena.alloc(NodeKind::NameRef { name }, span))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn literal(&mut self, value: Literal, start: jaz_common::Span) -> NodeId {
        self.arena.alloc(NodeKind::Literal { value }, start)
    }

    pub(crate) fn arg_list(&mut self) -> Result<Vec<NodeId>, Diagnostic> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')' closing arguments")?;
        Ok(args)
    }
}

fn relational_level() -> u8 {
    6
}

fn binary_op(tok: &TokenKind) -> Option<(BinaryOp, u8)> {
    Some(match tok {
        TokenKind::PipePipe => (BinaryOp::Or, 0),
        TokenKind::AmpAmp => (BinaryOp::And, 1),
        TokenKind::Pipe => (BinaryOp::BitOr, 2),
        TokenKind::Caret => (BinaryOp::BitXor, 3),
        TokenKind::Amp => (BinaryOp::BitAnd, 4),
        TokenKind::EqEq => (BinaryOp::Eq, 5),
        TokenKind::Ne => (BinaryOp::Ne, 5),
        TokenKind::Lt => (BinaryOp::Lt, 6),
        TokenKind::Gt => (BinaryOp::Gt, 6),
        TokenKind::Le => (BinaryOp::Le, 6),
        TokenKind::Ge => (BinaryOp::Ge, 6),
        TokenKind::Shl => (BinaryOp::Shl, 7),
        TokenKind::Shr => (BinaryOp::Shr, 7),
        TokenKind::UShr => (BinaryOp::UShr, 7),
        TokenKind::Plus => (BinaryOp::Add, 8),
        TokenKind::Minus => (BinaryOp::Sub, 8),
        TokenKind::Star => (BinaryOp::Mul, 9),
        TokenKind::Slash => (BinaryOp::Div, 9),
        TokenKind::Percent => (BinaryOp::Rem, 9),
        _ => return None,
    })
}
