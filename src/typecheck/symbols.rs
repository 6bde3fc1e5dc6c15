//! Symbol tables (§4.4, §9): side structures resolved by name, never by
//! pointer fix-up into the AST.

use crate::ast::SectionKind;
use crate::source::Span;
use crate::types_uvm::UvmType;
use std::collections::HashMap;

bitflags::bitflags! {
    /// Computed with OR, not the bitwise AND that would silently zero every
    /// permission out (§9): Static ⇒ READ, Global ⇒ READ | WRITE.
    #[derive(Default)]
    pub struct SectionPermissions: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXECUTE = 0b100;
    }
}

impl SectionPermissions {
    pub fn for_section(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Static => SectionPermissions::READ,
            SectionKind::Global => SectionPermissions::READ | SectionPermissions::WRITE,
            SectionKind::Code => SectionPermissions::READ | SectionPermissions::EXECUTE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableEntry {
    pub span: Span,
    pub data_type: UvmType,
    pub section_kind: SectionKind,
    pub permissions: SectionPermissions,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelEntry {
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    pub variables: HashMap<String, VariableEntry>,
    pub labels: HashMap<String, LabelEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_are_computed_with_or() {
        assert_eq!(
            SectionPermissions::for_section(SectionKind::Global),
            SectionPermissions::READ | SectionPermissions::WRITE
        );
        assert_eq!(
            SectionPermissions::for_section(SectionKind::Static),
            SectionPermissions::READ
        );
        assert!(!SectionPermissions::for_section(SectionKind::Static).is_empty());
    }
}
