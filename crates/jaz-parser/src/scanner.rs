//! Hand-written scanner for the jaz language.

use jaz_common::{Diagnostic, Span, codes};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Kw),
    IntLit(i64),
    LongLit(i64),
    FloatLit(String),
    DoubleLit(String),
    CharLit(char),
    StrLit(String),

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Question,
    Colon,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Bang,
    Tilde,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    UShr,

    Eof,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kw {
    Package,
    Import,
    Class,
    Interface,
    Extends,
    Implements,
    Throws,
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Void,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    New,
    This,
    Super,
    Return,
    If,
    Else,
    While,
    Do,
    For,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    Instanceof,
    Null,
    True,
    False,
}

fn keyword(ident: &str) -> Option<Kw> {
    Some(match ident {
        "package" => Kw::Package,
        "import" => Kw::Import,
        "class" => Kw::Class,
        "interface" => Kw::Interface,
        "extends" => Kw::Extends,
        "implements" => Kw::Implements,
        "throws" => Kw::Throws,
        "public" => Kw::Public,
        "protected" => Kw::Protected,
        "private" => Kw::Private,
        "static" => Kw::Static,
        "abstract" => Kw::Abstract,
        "final" => Kw::Final,
        "native" => Kw::Native,
        "synchronized" => Kw::Synchronized,
        "transient" => Kw::Transient,
        "volatile" => Kw::Volatile,
        "strictfp" => Kw::Strictfp,
        "void" => Kw::Void,
        "boolean" => Kw::Boolean,
        "byte" => Kw::Byte,
        "short" => Kw::Short,
        "int" => Kw::Int,
        "long" => Kw::Long,
        "char" => Kw::Char,
        "float" => Kw::Float,
        "double" => Kw::Double,
        "new" => Kw::New,
        "this" => Kw::This,
        "super" => Kw::Super,
        "return" => Kw::Return,
        "if" => Kw::If,
        "else" => Kw::Else,
        "while" => Kw::While,
        "do" => Kw::Do,
        "for" => Kw::For,
        "switch" => Kw::Switch,
        "case" => Kw::Case,
        "default" => Kw::Default,
        "break" => Kw::Break,
        "continue" => Kw::Continue,
        "throw" => Kw::Throw,
        "try" => Kw::Try,
        "catch" => Kw::Catch,
        "finally" => Kw::Finally,
        "instanceof" => Kw::Instanceof,
        "null" => Kw::Null,
        "true" => Kw::True,
        "false" => Kw::False,
        _ => return None,
    })
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Scanner<'a> {
    file: &'a str,
    src: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(file: &'a str, source: &'a str) -> Scanner<'a> {
        Scanner {
            file,
            src: source.as_bytes(),
            pos: 0,
        }
    }

    /// Scan the whole input. Stops at the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let at_end = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if at_end {
                return Ok(tokens);
            }
        }
    }

    fn error(&self, start: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(self.file, codes::SYNTAX_ERROR, message)
            .with_span(start as u32, (self.pos - start) as u32)
    }

    fn peek(&self) -> u8 {
        self.src.get(self.pos).copied().unwrap_or(0)
    }

    fn peek2(&self) -> u8 {
        self.src.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u8 {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == c {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.pos += 1;
                }
                b'/' if self.peek2() == b'/' => {
                    while self.pos < self.src.len() && self.peek() != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.peek2() == b'*' => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.pos >= self.src.len() {
                            return Err(self.error(start, "unterminated block comment"));
                        }
                        if self.peek() == b'*' && self.peek2() == b'/' {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, Diagnostic> {
        self.skip_trivia()?;
        let start = self.pos;
        if self.pos >= self.src.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start as u32, start as u32),
            });
        }
        let c = self.bump();
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semi,
            b',' => TokenKind::Comma,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,
            b'~' => TokenKind::Tilde,
            b'.' => TokenKind::Dot,
            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Bang
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    TokenKind::Le
                } else if self.eat(b'<') {
                    if self.eat(b'=') {
                        TokenKind::ShlAssign
                    } else {
                        TokenKind::Shl
                    }
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::Ge
                } else if self.eat(b'>') {
                    if self.eat(b'>') {
                        if self.eat(b'=') {
                            TokenKind::UShrAssign
                        } else {
                            TokenKind::UShr
                        }
                    } else if self.eat(b'=') {
                        TokenKind::ShrAssign
                    } else {
                        TokenKind::Shr
                    }
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else if self.eat(b'=') {
                    TokenKind::AmpAssign
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else if self.eat(b'=') {
                    TokenKind::PipeAssign
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => {
                if self.eat(b'=') {
                    TokenKind::CaretAssign
                } else {
                    TokenKind::Caret
                }
            }
            b'\'' => self.char_literal(start)?,
            b'"' => self.string_literal(start)?,
            b'0'..=b'9' => self.number(start)?,
            c if c == b'_' || c == b'$' || c.is_ascii_alphabetic() => {
                self.pos -= 1;
                self.identifier()
            }
            _ => return Err(self.error(start, format!("unexpected character '{}'", c as char))),
        };
        Ok(Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
        })
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while {
            let c = self.peek();
            c == b'_' || c == b'$' || c.is_ascii_alphanumeric()
        } {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default();
        match keyword(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(text.to_string()),
        }
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == b'.' && self.peek2().is_ascii_digit() {
            is_float = true;
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .unwrap_or_default()
            .to_string();
        if is_float {
            if self.eat(b'f') || self.eat(b'F') {
                return Ok(TokenKind::FloatLit(text));
            }
            let _ = self.eat(b'd') || self.eat(b'D');
            return Ok(TokenKind::DoubleLit(text));
        }
        if self.eat(b'f') || self.eat(b'F') {
            return Ok(TokenKind::FloatLit(text));
        }
        if self.eat(b'd') || self.eat(b'D') {
            return Ok(TokenKind::DoubleLit(text));
        }
        let long = self.eat(b'l') || self.eat(b'L');
        let value: i64 = text
            .parse()
            .map_err(|_| self.error(start, format!("integer literal '{text}' out of range")))?;
        Ok(if long {
            TokenKind::LongLit(value)
        } else {
            TokenKind::IntLit(value)
        })
    }

    fn escape(&mut self, start: usize) -> Result<char, Diagnostic> {
        Ok(match self.bump() {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'0' => '\0',
            b'\\' => '\\',
            b'\'' => '\'',
            b'"' => '"',
            other => {
                return Err(self.error(
                    start,
                    format!("unknown escape sequence '\\{}'", other as char),
                ));
            }
        })
    }

    fn char_literal(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        let c = match self.bump() {
            b'\\' => self.escape(start)?,
            0 => return Err(self.error(start, "unterminated character literal")),
            c => c as char,
        };
        if !self.eat(b'\'') {
            return Err(self.error(start, "unterminated character literal"));
        }
        Ok(TokenKind::CharLit(c))
    }

    fn string_literal(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        let mut value = String::new();
        loop {
            match self.bump() {
                b'"' => return Ok(TokenKind::StrLit(value)),
                b'\\' => value.push(self.escape(start)?),
                0 => return Err(self.error(start, "unterminated string literal")),
                b'\n' => return Err(self.error(start, "unterminated string literal")),
                c => value.push(c as char),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Scanner::new("test.jav", src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_declaration_header() {
        assert_eq!(
            kinds("public class A extends B {"),
            vec![
                TokenKind::Keyword(Kw::Public),
                TokenKind::Keyword(Kw::Class),
                TokenKind::Ident("A".into()),
                TokenKind::Keyword(Kw::Extends),
                TokenKind::Ident("B".into()),
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_operators_maximal_munch() {
        assert_eq!(
            kinds(">>= >>> >> > ++ += +"),
            vec![
                TokenKind::ShrAssign,
                TokenKind::UShr,
                TokenKind::Shr,
                TokenKind::Gt,
                TokenKind::PlusPlus,
                TokenKind::PlusAssign,
                TokenKind::Plus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_literals() {
        assert_eq!(
            kinds("42 42L 1.5 1.5f \"hi\\n\" 'x' null true"),
            vec![
                TokenKind::IntLit(42),
                TokenKind::LongLit(42),
                TokenKind::DoubleLit("1.5".into()),
                TokenKind::FloatLit("1.5".into()),
                TokenKind::StrLit("hi\n".into()),
                TokenKind::CharLit('x'),
                TokenKind::Keyword(Kw::Null),
                TokenKind::Keyword(Kw::True),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_trivia() {
        assert_eq!(
            kinds("a // line\n /* block\n */ b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_error() {
        let err = Scanner::new("t.jav", "\"oops").tokenize().unwrap_err();
        assert_eq!(err.code, codes::SYNTAX_ERROR);
    }
}
