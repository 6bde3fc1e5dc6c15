//! The internal scanner: turns a `SourceView` into a `TokenStream` (§6).
//! Tokens are text-free; an identifier's exact spelling is read back out of
//! the source view on demand, never copied into the token itself.

use crate::registers;
use crate::signature;
use crate::source::{SourceView, Span};
use crate::token::{Token, TokenKind, TokenStream};
use crate::types_uvm::UvmType;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

struct Lexer<'a> {
    source: &'a SourceView,
    chars: Vec<(usize, char)>,
    pos: usize,
    line_row: u32,
    line_col: u32,
    tokens: Vec<Token>,
}

pub fn tokenize(source: &SourceView) -> Result<TokenStream, LexError> {
    let mut lexer = Lexer {
        source,
        chars: source.as_str().char_indices().collect(),
        pos: 0,
        line_row: 1,
        line_col: 1,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(TokenStream::new(lexer.tokens))
}

impl<'a> Lexer<'a> {
    fn current(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn byte_index(&self) -> usize {
        self.current()
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.source.len())
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.current()?;
        self.pos += 1;
        if c == '\n' {
            self.line_row += 1;
            self.line_col = 1;
        } else {
            self.line_col += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, index: usize, size: usize, row: u32, col: u32) {
        self.tokens.push(Token::new(kind, index, size, row, col));
    }

    fn run(&mut self) -> Result<(), LexError> {
        loop {
            let Some((index, c)) = self.current() else {
                break;
            };
            let (row, col) = (self.line_row, self.line_col);

            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.push(TokenKind::Eol, index, 1, row, col);
                }
                '{' => self.single(TokenKind::LeftCurly, index, row, col),
                '}' => self.single(TokenKind::RightCurly, index, row, col),
                '[' => self.single(TokenKind::LeftSquare, index, row, col),
                ']' => self.single(TokenKind::RightSquare, index, row, col),
                '+' => self.single(TokenKind::Plus, index, row, col),
                '-' => self.single(TokenKind::Minus, index, row, col),
                '*' => self.single(TokenKind::Asterisk, index, row, col),
                ':' => self.single(TokenKind::Colon, index, row, col),
                ',' => self.single(TokenKind::Comma, index, row, col),
                '=' => self.single(TokenKind::Equals, index, row, col),
                '"' => self.string(index, row, col)?,
                '@' => self.label_def(index, row, col)?,
                c if c.is_ascii_digit() => self.number(index, row, col),
                c if c == '_' || c.is_alphabetic() => self.word(index, row, col),
                other => {
                    return Err(LexError {
                        message: format!("unexpected character '{other}'"),
                        span: Span::new(index, other.len_utf8(), row, col),
                    });
                }
            }
        }
        let eof_index = self.source.len();
        self.push(TokenKind::EndOfFile, eof_index, 0, self.line_row, self.line_col);
        Ok(())
    }

    fn single(&mut self, kind: TokenKind, index: usize, row: u32, col: u32) {
        self.advance();
        self.push(kind, index, 1, row, col);
    }

    fn string(&mut self, index: usize, row: u32, col: u32) -> Result<(), LexError> {
        self.advance(); // opening quote
        loop {
            match self.current() {
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        span: Span::new(index, self.byte_index() - index, row, col),
                    });
                }
                Some((_, '"')) => {
                    self.advance();
                    break;
                }
                Some((_, '\\')) => {
                    self.advance();
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let size = self.byte_index() - index;
        self.push(TokenKind::String, index, size, row, col);
        Ok(())
    }

    fn label_def(&mut self, index: usize, row: u32, col: u32) -> Result<(), LexError> {
        self.advance(); // '@'
        let name_start = self.byte_index();
        while matches!(self.current(), Some((_, c)) if c == '_' || c.is_alphanumeric()) {
            self.advance();
        }
        if self.byte_index() == name_start {
            return Err(LexError {
                message: "expected a label name after '@'".to_string(),
                span: Span::new(index, 1, row, col),
            });
        }
        let size = self.byte_index() - index;
        self.push(TokenKind::LabelDef, index, size, row, col);
        Ok(())
    }

    fn number(&mut self, index: usize, row: u32, col: u32) {
        let hex = self.current() == Some((index, '0'))
            && self.chars.get(self.pos + 1).map(|(_, c)| *c) == Some('x');
        if hex {
            self.advance();
            self.advance();
            while matches!(self.current(), Some((_, c)) if c.is_ascii_hexdigit()) {
                self.advance();
            }
            let size = self.byte_index() - index;
            self.push(TokenKind::IntegerNumber, index, size, row, col);
            return;
        }

        let mut is_float = false;
        while matches!(self.current(), Some((_, c)) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.current().map(|(_, c)| c) == Some('.')
            && self
                .chars
                .get(self.pos + 1)
                .map(|(_, c)| c.is_ascii_digit())
                .unwrap_or(false)
        {
            is_float = true;
            self.advance();
            while matches!(self.current(), Some((_, c)) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let size = self.byte_index() - index;
        let kind = if is_float {
            TokenKind::FloatNumber
        } else {
            TokenKind::IntegerNumber
        };
        self.push(kind, index, size, row, col);
    }

    fn word(&mut self, index: usize, row: u32, col: u32) {
        while matches!(self.current(), Some((_, c)) if c == '_' || c.is_alphanumeric()) {
            self.advance();
        }
        let size = self.byte_index() - index;
        let text = self.source.substring(index, size);

        if let Some(ty) = UvmType::from_name(text) {
            self.push(TokenKind::TypeInfo, index, size, row, col);
            self.tokens.last_mut().unwrap().tag = ty as u32;
            return;
        }
        if let Some(id) = registers::lookup(text) {
            self.push(TokenKind::RegisterDefinition, index, size, row, col);
            self.tokens.last_mut().unwrap().tag = id as u32;
            return;
        }
        if signature::known_mnemonics().any(|m| m == text) {
            self.push(TokenKind::Instruction, index, size, row, col);
            return;
        }
        self.push(TokenKind::Identifier, index, size, row, col);
    }
}
