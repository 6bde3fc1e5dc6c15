//! The AST data model (§3): a closed set of node variants, each carrying a
//! common `Span` header. Nodes are created by the parser, mutated only by
//! the type checker (to attach opcode/flags/numeric type), and read by a
//! downstream generator. Ownership forms a strict tree: `Identifier`
//! operands are non-owning by name only — resolution lives in the type
//! checker's `SymbolTables`, never as a pointer back into this tree.

use crate::signature::EncodingFlags;
use crate::source::Span;
use crate::types_uvm::UvmType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Static,
    Global,
    Code,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRoot {
    pub span: Span,
    pub static_section: Option<Section>,
    pub global_section: Option<Section>,
    pub code_section: Option<Section>,
}

impl FileRoot {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        match kind {
            SectionKind::Static => self.static_section.as_ref(),
            SectionKind::Global => self.global_section.as_ref(),
            SectionKind::Code => self.code_section.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub span: Span,
    pub kind: SectionKind,
    pub name: String,
    pub body: Vec<BodyItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Variable(Variable),
    LabelDef(LabelDef),
    Instruction(Instruction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub span: Span,
    pub name: String,
    pub type_info: TypeInfo,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(IntLiteral),
    Float(FloatLiteral),
    Str(StringLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDef {
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub span: Span,
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    pub resolved: Option<ResolvedInstruction>,
}

/// Populated by the type checker once a signature has been matched (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInstruction {
    pub opcode: u8,
    pub flags: EncodingFlags,
    pub signature_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    TypeInfo(TypeInfo),
    RegisterId(RegisterId),
    RegisterOffset(RegisterOffset),
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    Identifier(Identifier),
}

impl Operand {
    pub fn span(&self) -> Span {
        match self {
            Operand::TypeInfo(n) => n.span,
            Operand::RegisterId(n) => n.span,
            Operand::RegisterOffset(n) => n.span,
            Operand::IntLiteral(n) => n.span,
            Operand::FloatLiteral(n) => n.span,
            Operand::Identifier(n) => n.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub span: Span,
    pub data_type: UvmType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterId {
    pub span: Span,
    pub id: u8,
}

/// `layout` is `0` for the variable-addressed form (§4.1, §8 scenario S4:
/// "layout byte left zero"); otherwise it is one of `0x4F`, `0x2F`, `0x1F`,
/// optionally OR'd with the sign bit `0x80`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOffset {
    pub span: Span,
    pub layout: u8,
    pub base: Option<RegisterId>,
    pub offset_register: Option<RegisterId>,
    pub immediate: Option<Immediate>,
    pub var: Option<Identifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Immediate {
    U16(u16),
    U32(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntLiteral {
    pub span: Span,
    pub magnitude: u64,
    pub signed: bool,
    pub data_type: Option<UvmType>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatLiteral {
    pub span: Span,
    pub value: f64,
    pub data_type: Option<UvmType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub span: Span,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub span: Span,
    pub name: String,
}
