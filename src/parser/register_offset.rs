//! The bracketed register-offset sub-parser (§4.1). Called after the
//! opening `[` has already been consumed by the operand dispatcher.

use super::{literals, PResult, Parser};
use crate::ast::{Identifier, Immediate, RegisterId, RegisterOffset};
use crate::numeric;
use crate::registers;
use crate::source::Span;
use crate::token::TokenKind;

const LAYOUT_REG_ONLY: u8 = 0x4F;
const LAYOUT_REG_IMM32: u8 = 0x2F;
const LAYOUT_REG_REG_IMM16: u8 = 0x1F;
const SIGN_BIT: u8 = 0x80;

pub(super) fn parse(parser: &mut Parser<'_>) -> PResult<RegisterOffset> {
    let start = parser.peek().span();

    if parser.peek().kind == TokenKind::Identifier {
        let token = parser.eat();
        let var = Identifier {
            span: token.span(),
            name: parser.text(token).to_string(),
        };
        let close = parser.expect(TokenKind::RightSquare, "']'")?;
        return Ok(RegisterOffset {
            span: enclosing_span(start, close.span()),
            layout: 0,
            base: None,
            offset_register: None,
            immediate: None,
            var: Some(var),
        });
    }

    let base_token = parser.expect(TokenKind::RegisterDefinition, "a register")?;
    let base = int_register(parser, base_token)?;

    if parser.peek().kind == TokenKind::RightSquare {
        let close = parser.eat();
        return Ok(RegisterOffset {
            span: enclosing_span(start, close.span()),
            layout: LAYOUT_REG_ONLY,
            base: Some(base),
            offset_register: None,
            immediate: None,
            var: None,
        });
    }

    let sign = match parser.peek().kind {
        TokenKind::Plus | TokenKind::Minus => parser.eat(),
        _ => {
            let token = parser.peek();
            return Err(parser.error(token.span(), "expected '+', '-', or ']'"));
        }
    };
    let negative = sign.kind == TokenKind::Minus;

    if parser.peek().kind == TokenKind::RegisterDefinition {
        let offset_token = parser.eat();
        let offset_register = int_register(parser, offset_token)?;
        parser.expect(TokenKind::Asterisk, "'*'")?;
        let imm_token = parser.expect(TokenKind::IntegerNumber, "a 16-bit immediate")?;
        let magnitude = literals::parse_int_magnitude(parser.text(imm_token))
            .ok_or_else(|| parser.error(imm_token.span(), "malformed integer literal"))?;
        if !numeric::fits_bits(magnitude, 16) {
            return Err(parser.error(imm_token.span(), "immediate does not fit in 16 bits"));
        }
        let close = parser.expect(TokenKind::RightSquare, "']'")?;
        let layout = LAYOUT_REG_REG_IMM16 | if negative { SIGN_BIT } else { 0 };
        return Ok(RegisterOffset {
            span: enclosing_span(start, close.span()),
            layout,
            base: Some(base),
            offset_register: Some(offset_register),
            immediate: Some(Immediate::U16(magnitude as u16)),
            var: None,
        });
    }

    let imm_token = parser.expect(TokenKind::IntegerNumber, "a 32-bit immediate")?;
    let magnitude = literals::parse_int_magnitude(parser.text(imm_token))
        .ok_or_else(|| parser.error(imm_token.span(), "malformed integer literal"))?;
    if !numeric::fits_bits(magnitude, 32) {
        return Err(parser.error(imm_token.span(), "immediate does not fit in 32 bits"));
    }
    let close = parser.expect(TokenKind::RightSquare, "']'")?;
    let layout = LAYOUT_REG_IMM32 | if negative { SIGN_BIT } else { 0 };
    Ok(RegisterOffset {
        span: enclosing_span(start, close.span()),
        layout,
        base: Some(base),
        offset_register: None,
        immediate: Some(Immediate::U32(magnitude as u32)),
        var: None,
    })
}

fn int_register(parser: &Parser<'_>, token: crate::token::Token) -> PResult<RegisterId> {
    let id = token.tag as u8;
    if !registers::is_int_register(id) {
        return Err(parser.error(token.span(), "expected an integer register"));
    }
    Ok(RegisterId {
        span: token.span(),
        id,
    })
}

fn enclosing_span(start: Span, end: Span) -> Span {
    Span::new(
        start.index,
        (end.index + end.size).saturating_sub(start.index),
        start.line_row,
        start.line_col,
    )
}
