//! The instruction-signature matcher (§4.2): a trie over operand
//! categories, compiled once from an embedded JSON description
//! (`instructions.json`) via `once_cell::sync::Lazy`.

mod table;

pub use table::known_mnemonics;

use crate::ast::{Identifier, Operand};
use crate::registers::{is_float_register, is_int_register};
use crate::types_uvm::UvmType;
use std::collections::HashMap;

bitflags::bitflags! {
    /// `ENCODE_TYPE` and `TYPE_VARIANTS` are mutually exclusive (§6): a
    /// signature either carries a single opcode regardless of the
    /// accompanying `TypeInfo`, or branches to a distinct opcode per type.
    #[derive(Default)]
    pub struct EncodingFlags: u8 {
        const ENCODE_TYPE = 0b0000_0001;
        const TYPE_VARIANTS = 0b0000_0010;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamCategory {
    IntType,
    FloatType,
    IntReg,
    FloatReg,
    RegOffset,
    IntNum,
    FloatNum,
    LabelId,
    SysInt,
}

impl ParamCategory {
    /// Whether this category accepts the given operand, given whatever
    /// `INT_TYPE`/`FLOAT_TYPE` was remembered earlier in the same
    /// instruction (§4.2 per-category acceptance rules).
    fn accepts(self, operand: &Operand) -> bool {
        match (self, operand) {
            (ParamCategory::IntType, Operand::TypeInfo(t)) => t.data_type.is_int(),
            (ParamCategory::FloatType, Operand::TypeInfo(t)) => t.data_type.is_float(),
            (ParamCategory::IntReg, Operand::RegisterId(r)) => is_int_register(r.id),
            (ParamCategory::FloatReg, Operand::RegisterId(r)) => is_float_register(r.id),
            (ParamCategory::RegOffset, Operand::RegisterOffset(_)) => true,
            (ParamCategory::IntNum, Operand::IntLiteral(_)) => true,
            (ParamCategory::FloatNum, Operand::FloatLiteral(_)) => true,
            (ParamCategory::LabelId, Operand::Identifier(_)) => true,
            (ParamCategory::SysInt, Operand::IntLiteral(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub opcode: u8,
    pub flags: EncodingFlags,
    pub type_variants: HashMap<UvmType, u8>,
    /// Position of this signature within its mnemonic's list in
    /// `instructions.json` (§3: `Instruction` carries the matched
    /// signature's index).
    pub index: usize,
}

impl Signature {
    /// Opcode selection (§4.2): a `TYPE_VARIANTS` signature looks the
    /// remembered type up in its variant table; otherwise the base opcode
    /// applies unconditionally.
    fn resolve_opcode(&self, remembered_type: Option<UvmType>) -> u8 {
        if self.flags.contains(EncodingFlags::TYPE_VARIANTS) {
            remembered_type
                .and_then(|ty| self.type_variants.get(&ty).copied())
                .unwrap_or(self.opcode)
        } else {
            self.opcode
        }
    }
}

#[derive(Default)]
struct SignatureNode {
    children: Vec<(ParamCategory, SignatureNode)>,
    signature: Option<Signature>,
}

pub struct SignatureTable {
    roots: HashMap<String, SignatureNode>,
}

/// What the matcher discovers while walking an instruction's operands:
/// the matched signature's final opcode and flags, plus every label and
/// register-offset-variable reference it needs resolved later (§4.2,
/// §4.4 steps 5-6).
pub struct MatchOutcome {
    pub opcode: u8,
    pub flags: EncodingFlags,
    pub signature_index: usize,
    pub label_refs: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    UnknownMnemonic,
    NoMatchingSignature { operand_index: usize },
    TooFewOperands,
    OperandOutOfRange { operand_index: usize },
}

impl SignatureTable {
    /// Matches the operands of `mnemonic` against the trie, following the
    /// algorithm in §4.2. Also re-checks `INT_NUM`/`FLOAT_NUM` range fit and
    /// forces `SYS_INT` operands to `I8`, mutating the caller's operand
    /// list in place the same way the type checker's walk does.
    pub fn match_instruction(
        &self,
        mnemonic: &str,
        operands: &mut [Operand],
    ) -> Result<MatchOutcome, SignatureError> {
        let mut node = self
            .roots
            .get(mnemonic)
            .ok_or(SignatureError::UnknownMnemonic)?;
        let mut remembered_type: Option<UvmType> = None;
        let mut label_refs = Vec::new();

        for (i, operand) in operands.iter_mut().enumerate() {
            let category = node
                .children
                .iter()
                .find(|(cat, _)| cat.accepts(operand))
                .map(|(cat, _)| *cat)
                .ok_or(SignatureError::NoMatchingSignature { operand_index: i })?;

            match (category, operand) {
                (ParamCategory::IntType, Operand::TypeInfo(t)) => {
                    remembered_type = Some(t.data_type);
                }
                (ParamCategory::FloatType, Operand::TypeInfo(t)) => {
                    remembered_type = Some(t.data_type);
                }
                (ParamCategory::IntNum, Operand::IntLiteral(lit)) => {
                    lit.data_type = remembered_type;
                    if let Some(ty) = remembered_type {
                        if !crate::numeric::int_fits(lit.magnitude, ty) {
                            return Err(SignatureError::OperandOutOfRange { operand_index: i });
                        }
                    }
                }
                (ParamCategory::FloatNum, Operand::FloatLiteral(lit)) => {
                    lit.data_type = remembered_type;
                    if let Some(ty) = remembered_type {
                        if !crate::numeric::float_fits(lit.value, ty) {
                            return Err(SignatureError::OperandOutOfRange { operand_index: i });
                        }
                    }
                }
                (ParamCategory::SysInt, Operand::IntLiteral(lit)) => {
                    lit.data_type = Some(UvmType::I8);
                }
                (ParamCategory::LabelId, Operand::Identifier(ident)) => {
                    label_refs.push(ident.clone());
                }
                _ => {}
            }

            node = &node
                .children
                .iter()
                .find(|(cat, _)| *cat == category)
                .unwrap()
                .1;
        }

        let signature = node
            .signature
            .as_ref()
            .ok_or(SignatureError::TooFewOperands)?;

        Ok(MatchOutcome {
            opcode: signature.resolve_opcode(remembered_type),
            flags: signature.flags,
            signature_index: signature.index,
            label_refs,
        })
    }
}

pub fn table() -> &'static SignatureTable {
    table::table()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{IntLiteral, RegisterId, TypeInfo};
    use crate::source::Span;

    fn span() -> Span {
        Span::new(0, 1, 1, 1)
    }

    fn type_info(ty: UvmType) -> Operand {
        Operand::TypeInfo(TypeInfo {
            span: span(),
            data_type: ty,
        })
    }

    fn reg(id: u8) -> Operand {
        Operand::RegisterId(RegisterId { span: span(), id })
    }

    fn int_lit(magnitude: u64) -> Operand {
        Operand::IntLiteral(IntLiteral {
            span: span(),
            magnitude,
            signed: false,
            data_type: None,
        })
    }

    #[test]
    fn push_i32_resolves_to_type_variant_opcode() {
        let mut operands = vec![type_info(UvmType::I32), int_lit(42)];
        let outcome = table().match_instruction("push", &mut operands).unwrap();
        assert_eq!(outcome.opcode, 0x03);
        match &operands[1] {
            Operand::IntLiteral(lit) => assert_eq!(lit.data_type, Some(UvmType::I32)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn exit_and_nop_are_zero_operand_terminals() {
        let outcome = table().match_instruction("exit", &mut []).unwrap();
        assert_eq!(outcome.opcode, 0x50);
        let outcome = table().match_instruction("nop", &mut []).unwrap();
        assert_eq!(outcome.opcode, 0xA0);
    }

    #[test]
    fn add_rejects_mismatched_register_class() {
        // add f32, r0, r1 -- wrong register class for the float branch
        let mut operands = vec![type_info(UvmType::F32), reg(0x05), reg(0x06)];
        assert!(table().match_instruction("add", &mut operands).is_err());

        // add i32, f0, r1 -- wrong register class for the int branch
        let mut operands = vec![type_info(UvmType::I32), reg(0x16), reg(0x06)];
        assert!(table().match_instruction("add", &mut operands).is_err());

        // add i32, r0, r1 -- succeeds
        let mut operands = vec![type_info(UvmType::I32), reg(0x05), reg(0x06)];
        assert!(table().match_instruction("add", &mut operands).is_ok());
    }

    #[test]
    fn push_i8_range_boundary() {
        let mut operands = vec![type_info(UvmType::I8), int_lit(255)];
        assert!(table().match_instruction("push", &mut operands).is_ok());

        let mut operands = vec![type_info(UvmType::I8), int_lit(256)];
        assert_eq!(
            table().match_instruction("push", &mut operands),
            Err(SignatureError::OperandOutOfRange { operand_index: 1 })
        );
    }

    #[test]
    fn unknown_mnemonic_is_rejected() {
        assert_eq!(
            table().match_instruction("frobnicate", &mut []),
            Err(SignatureError::UnknownMnemonic)
        );
    }

    #[test]
    fn too_few_operands_is_rejected() {
        let mut operands = vec![type_info(UvmType::I32)];
        assert_eq!(
            table().match_instruction("push", &mut operands),
            Err(SignatureError::TooFewOperands)
        );
    }
}
