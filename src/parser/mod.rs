//! Recursive-descent parser (§4.1): one-token lookahead over the token
//! stream, building the AST directly. Stops at the first unexpected token.

mod literals;
mod register_offset;

use crate::ast::*;
use crate::diagnostics::{Diagnostic, Stage};
use crate::registers;
use crate::source::{SourceView, Span};
use crate::token::{Token, TokenKind, TokenStream};
use crate::types_uvm::UvmType;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub Diagnostic);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

struct Parser<'a> {
    tokens: TokenStream,
    source: &'a SourceView,
}

type PResult<T> = Result<T, ParseError>;

pub fn build_ast(source: &SourceView, tokens: TokenStream) -> PResult<FileRoot> {
    let mut parser = Parser { tokens, source };
    parser.parse_file()
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token {
        self.tokens.peek()
    }

    fn peek_at(&self, offset: usize) -> Token {
        self.tokens.peek_at(offset)
    }

    fn eat(&mut self) -> Token {
        self.tokens.eat()
    }

    fn text(&self, token: Token) -> &str {
        self.source.substring(token.index, token.size)
    }

    fn error(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError(Diagnostic::new(Stage::Parser, message, span, self.source))
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> PResult<Token> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.eat())
        } else {
            Err(self.error(
                token.span(),
                format!("expected {context}, found {:?}", token.kind),
            ))
        }
    }

    fn skip_eols(&mut self) {
        while self.peek().kind == TokenKind::Eol {
            self.eat();
        }
    }

    /// Consumes the statement-terminating EOL if present; tolerates being
    /// immediately at `}` or EOF instead.
    fn eat_statement_end(&mut self) -> PResult<()> {
        match self.peek().kind {
            TokenKind::Eol => {
                self.eat();
                Ok(())
            }
            TokenKind::RightCurly | TokenKind::EndOfFile => Ok(()),
            _ => {
                let token = self.peek();
                Err(self.error(token.span(), "expected end of line"))
            }
        }
    }

    fn parse_file(&mut self) -> PResult<FileRoot> {
        let start = self.peek().span();
        self.skip_eols();

        let mut file = FileRoot {
            span: start,
            static_section: None,
            global_section: None,
            code_section: None,
        };

        while self.peek().kind != TokenKind::EndOfFile {
            let section = self.parse_section()?;
            match section.kind {
                SectionKind::Static if file.static_section.is_some() => {
                    return Err(self.error(section.span, "duplicate 'static' section"));
                }
                SectionKind::Global if file.global_section.is_some() => {
                    return Err(self.error(section.span, "duplicate 'global' section"));
                }
                SectionKind::Code if file.code_section.is_some() => {
                    return Err(self.error(section.span, "duplicate 'code' section"));
                }
                _ => {}
            }
            match section.kind {
                SectionKind::Static => file.static_section = Some(section),
                SectionKind::Global => file.global_section = Some(section),
                SectionKind::Code => file.code_section = Some(section),
            }
            self.skip_eols();
        }

        Ok(file)
    }

    fn parse_section(&mut self) -> PResult<Section> {
        let keyword = self.expect(TokenKind::Identifier, "a section name")?;
        let name = self.text(keyword).to_string();
        let kind = match name.as_str() {
            "static" => SectionKind::Static,
            "global" => SectionKind::Global,
            "code" => SectionKind::Code,
            other => return Err(self.error(keyword.span(), format!("unknown section '{other}'"))),
        };

        self.expect(TokenKind::LeftCurly, "'{'")?;
        self.skip_eols();

        let body = match kind {
            SectionKind::Static | SectionKind::Global => self.parse_var_decl_body()?,
            SectionKind::Code => self.parse_code_body()?,
        };

        let close = self.expect(TokenKind::RightCurly, "'}'")?;
        Ok(Section {
            span: Span::new(
                keyword.index,
                close.index + close.size - keyword.index,
                keyword.line_row,
                keyword.line_col,
            ),
            kind,
            name,
            body,
        })
    }

    fn parse_var_decl_body(&mut self) -> PResult<Vec<BodyItem>> {
        let mut body = Vec::new();
        loop {
            self.skip_eols();
            if self.peek().kind == TokenKind::RightCurly {
                break;
            }
            body.push(BodyItem::Variable(self.parse_var_decl()?));
            self.eat_statement_end()?;
        }
        Ok(body)
    }

    fn parse_var_decl(&mut self) -> PResult<Variable> {
        let name_token = self.expect(TokenKind::Identifier, "a variable name")?;
        let name = self.text(name_token).to_string();
        self.expect(TokenKind::Colon, "':'")?;
        let type_token = self.expect(TokenKind::TypeInfo, "a type")?;
        let data_type = UvmType::from_tag(type_token.tag)
            .ok_or_else(|| self.error(type_token.span(), "invalid type tag"))?;
        let type_info = TypeInfo {
            span: type_token.span(),
            data_type,
        };
        self.expect(TokenKind::Equals, "'='")?;

        let value = match self.peek().kind {
            TokenKind::String => {
                let token = self.eat();
                LiteralValue::Str(StringLiteral {
                    span: token.span(),
                    bytes: literals::decode_string(self.text(token)),
                })
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::IntegerNumber | TokenKind::FloatNumber => {
                self.parse_signed_number_literal(Some(data_type))?
            }
            _ => {
                let token = self.peek();
                return Err(self.error(token.span(), "expected a literal value"));
            }
        };

        Ok(Variable {
            span: Span::new(
                name_token.index,
                self.tokens.peek_at(0).index.saturating_sub(name_token.index),
                name_token.line_row,
                name_token.line_col,
            ),
            name,
            type_info,
            value,
        })
    }

    /// Parses `[sign] (IntegerNumber | FloatNumber)`. When `declared_type`
    /// is given (variable declarations), the literal's fit is checked
    /// immediately against it; instruction operands pass `None` and are
    /// re-checked later once the matcher has determined their type.
    fn parse_signed_number_literal(&mut self, declared_type: Option<UvmType>) -> PResult<LiteralValue> {
        let sign_token = match self.peek().kind {
            TokenKind::Plus | TokenKind::Minus => Some(self.eat()),
            _ => None,
        };
        let number = self.peek();
        if !matches!(number.kind, TokenKind::IntegerNumber | TokenKind::FloatNumber) {
            return Err(self.error(number.span(), "expected a number"));
        }
        if let Some(sign) = sign_token {
            if sign.index + sign.size != number.index {
                return Err(self.error(sign.span(), "unexpected operator"));
            }
        }
        let number = self.eat();
        let signed = matches!(sign_token.map(|t| t.kind), Some(TokenKind::Minus));
        let span = Span::new(
            sign_token.unwrap_or(number).index,
            number.index + number.size - sign_token.unwrap_or(number).index,
            sign_token.unwrap_or(number).line_row,
            sign_token.unwrap_or(number).line_col,
        );

        match number.kind {
            TokenKind::IntegerNumber => {
                let text = self.text(number);
                let magnitude = literals::parse_int_magnitude(text)
                    .ok_or_else(|| self.error(number.span(), "malformed integer literal"))?;
                if let Some(ty) = declared_type {
                    if !crate::numeric::int_fits(magnitude, ty) {
                        return Err(self.error(
                            span,
                            "Integer does not fit into given type",
                        ));
                    }
                }
                Ok(LiteralValue::Int(IntLiteral {
                    span,
                    magnitude,
                    signed,
                    data_type: declared_type,
                }))
            }
            TokenKind::FloatNumber => {
                let text = self.text(number);
                let mut value = literals::parse_float(text)
                    .ok_or_else(|| self.error(number.span(), "malformed float literal"))?;
                if signed {
                    value = -value;
                }
                if let Some(ty) = declared_type {
                    if !crate::numeric::float_fits(value, ty) {
                        return Err(self.error(span, "Float does not fit into given type"));
                    }
                }
                Ok(LiteralValue::Float(FloatLiteral {
                    span,
                    value,
                    data_type: declared_type,
                }))
            }
            _ => unreachable!(),
        }
    }

    fn parse_code_body(&mut self) -> PResult<Vec<BodyItem>> {
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RightCurly => break,
                TokenKind::Eol => {
                    self.eat();
                }
                TokenKind::LabelDef => {
                    let token = self.eat();
                    let name = self.text(token).trim_start_matches('@').to_string();
                    body.push(BodyItem::LabelDef(LabelDef {
                        span: token.span(),
                        name,
                    }));
                    self.eat_statement_end()?;
                    // §9: a label definition consumes one additional EOL
                    // beyond the ordinary per-statement terminator.
                    if self.peek().kind == TokenKind::Eol {
                        self.eat();
                    }
                }
                TokenKind::Instruction => {
                    body.push(BodyItem::Instruction(self.parse_instruction()?));
                    self.eat_statement_end()?;
                }
                _ => {
                    let token = self.peek();
                    return Err(self.error(token.span(), "expected a label or an instruction"));
                }
            }
        }
        Ok(body)
    }

    fn parse_instruction(&mut self) -> PResult<Instruction> {
        let mnemonic_token = self.eat();
        let mnemonic = self.text(mnemonic_token).to_string();
        let mut operands = Vec::new();

        if !matches!(
            self.peek().kind,
            TokenKind::Eol | TokenKind::RightCurly | TokenKind::EndOfFile
        ) {
            operands.push(self.parse_operand()?);
            while self.peek().kind == TokenKind::Comma {
                self.eat();
                operands.push(self.parse_operand()?);
            }
        }

        Ok(Instruction {
            span: mnemonic_token.span(),
            mnemonic,
            operands,
            resolved: None,
        })
    }

    fn parse_operand(&mut self) -> PResult<Operand> {
        let token = self.peek();
        match token.kind {
            TokenKind::TypeInfo => {
                self.eat();
                let data_type = UvmType::from_tag(token.tag)
                    .ok_or_else(|| self.error(token.span(), "invalid type tag"))?;
                Ok(Operand::TypeInfo(TypeInfo {
                    span: token.span(),
                    data_type,
                }))
            }
            TokenKind::RegisterDefinition => {
                self.eat();
                Ok(Operand::RegisterId(RegisterId {
                    span: token.span(),
                    id: token.tag as u8,
                }))
            }
            TokenKind::LeftSquare => {
                self.eat();
                Ok(Operand::RegisterOffset(register_offset::parse(self)?))
            }
            TokenKind::Identifier => {
                self.eat();
                Ok(Operand::Identifier(Identifier {
                    span: token.span(),
                    name: self.text(token).to_string(),
                }))
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::IntegerNumber | TokenKind::FloatNumber => {
                match self.parse_signed_number_literal(None)? {
                    LiteralValue::Int(lit) => Ok(Operand::IntLiteral(lit)),
                    LiteralValue::Float(lit) => Ok(Operand::FloatLiteral(lit)),
                    LiteralValue::Str(_) => unreachable!(),
                }
            }
            _ => Err(self.error(token.span(), "expected an operand")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(text: &str) -> PResult<FileRoot> {
        let source = SourceView::new(text);
        let tokens = tokenize(&source).expect("lex ok");
        build_ast(&source, tokens)
    }

    #[test]
    fn parses_happy_path_scenario() {
        let file = parse(
            "code {\n@main\n    push i32, 42\n    exit\n}\n",
        )
        .unwrap();
        let code = file.code_section.unwrap();
        assert_eq!(code.body.len(), 3);
        match &code.body[0] {
            BodyItem::LabelDef(l) => assert_eq!(l.name, "main"),
            _ => panic!("expected label"),
        }
    }

    #[test]
    fn rejects_sign_with_a_gap() {
        let err = parse("code {\n@main\n    push i32, - 1\n    exit\n}\n").unwrap_err();
        assert!(err.to_string().contains("unexpected operator"));
    }

    #[test]
    fn parses_static_and_global_sections() {
        let file = parse(
            "static {\n  msg : i8 = \"hi\"\n}\nglobal {\n  counter : i64 = 0\n}\ncode {\n@main\n  exit\n}\n",
        )
        .unwrap();
        assert!(file.static_section.is_some());
        assert!(file.global_section.is_some());
    }

    #[test]
    fn variable_literal_out_of_range_is_rejected_at_parse_time() {
        let err = parse("static {\n x : i16 = 70000\n}\ncode {\n@main\n exit\n}\n").unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn parses_register_offset_forms() {
        let file = parse("code {\n@main\n  load i32, [bp - 4], r0\n  exit\n}\n").unwrap();
        let code = file.code_section.unwrap();
        match &code.body[1] {
            BodyItem::Instruction(instr) => match &instr.operands[1] {
                Operand::RegisterOffset(ro) => {
                    assert_eq!(ro.layout, 0x80 | 0x2F);
                    assert_eq!(ro.base.unwrap().id, registers::REG_BP);
                    assert_eq!(ro.immediate, Some(Immediate::U32(4)));
                }
                _ => panic!("expected register offset"),
            },
            _ => panic!("expected instruction"),
        }
    }
}
