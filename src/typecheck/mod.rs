//! Type checker (§4.4): walks the AST built by the parser, matches every
//! instruction against the signature table, builds the symbol tables, and
//! resolves label and variable references. Errors accumulate; the walk
//! never stops early.

pub mod symbols;

use crate::ast::{BodyItem, FileRoot, Identifier, Operand, ResolvedInstruction, SectionKind};
use crate::diagnostics::{Diagnostic, Stage};
use crate::signature::{self, SignatureError};
use crate::source::SourceView;
use symbols::{LabelEntry, SectionPermissions, SymbolTables, VariableEntry};

pub struct TypeCheckOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTables,
    pub success: bool,
}

pub fn type_check(file: &mut FileRoot, source: &SourceView) -> TypeCheckOutcome {
    let mut diagnostics = Vec::new();
    let mut symbols = SymbolTables::default();

    for kind in [SectionKind::Static, SectionKind::Global] {
        let Some(section) = file.section(kind) else {
            continue;
        };
        for item in &section.body {
            let BodyItem::Variable(var) = item else {
                continue;
            };
            if symbols.variables.contains_key(&var.name) {
                diagnostics.push(Diagnostic::new(
                    Stage::TypeChecker,
                    format!("variable '{}' already defined", var.name),
                    var.span,
                    source,
                ));
                continue;
            }
            symbols.variables.insert(
                var.name.clone(),
                VariableEntry {
                    span: var.span,
                    data_type: var.type_info.data_type,
                    section_kind: kind,
                    permissions: SectionPermissions::for_section(kind),
                },
            );
        }
    }

    let code_span = file.span;
    let Some(code) = file.code_section.as_mut() else {
        diagnostics.push(Diagnostic::new(
            Stage::TypeChecker,
            "missing main label",
            code_span,
            source,
        ));
        return TypeCheckOutcome {
            diagnostics,
            symbols,
            success: false,
        };
    };
    if code.body.is_empty() {
        diagnostics.push(Diagnostic::new(
            Stage::TypeChecker,
            "missing main label",
            code.span,
            source,
        ));
        return TypeCheckOutcome {
            diagnostics,
            symbols,
            success: false,
        };
    }

    let has_main = code.body.iter().any(|item| {
        matches!(item, BodyItem::LabelDef(l) if l.name == "main")
    });
    if !has_main {
        diagnostics.push(Diagnostic::new(
            Stage::TypeChecker,
            "missing main label",
            code.span,
            source,
        ));
    }

    let mut label_refs: Vec<Identifier> = Vec::new();
    let mut var_refs: Vec<Identifier> = Vec::new();
    let table = signature::table();

    for item in &mut code.body {
        match item {
            BodyItem::LabelDef(label) => {
                if symbols.labels.contains_key(&label.name) {
                    diagnostics.push(Diagnostic::new(
                        Stage::TypeChecker,
                        format!("label '{}' already defined", label.name),
                        label.span,
                        source,
                    ));
                    continue;
                }
                symbols
                    .labels
                    .insert(label.name.clone(), LabelEntry { span: label.span });
            }
            BodyItem::Instruction(instr) => {
                for operand in &instr.operands {
                    if let Operand::RegisterOffset(ro) = operand {
                        if let Some(var) = &ro.var {
                            var_refs.push(var.clone());
                        }
                    }
                }
                match table.match_instruction(&instr.mnemonic, &mut instr.operands) {
                    Ok(outcome) => {
                        instr.resolved = Some(ResolvedInstruction {
                            opcode: outcome.opcode,
                            flags: outcome.flags,
                            signature_index: outcome.signature_index,
                        });
                        label_refs.extend(outcome.label_refs);
                    }
                    Err(err) => diagnostics.push(signature_error_diagnostic(
                        err, instr, source,
                    )),
                }
            }
            BodyItem::Variable(_) => {}
        }
    }

    for ident in &label_refs {
        if !symbols.labels.contains_key(&ident.name) {
            diagnostics.push(Diagnostic::new(
                Stage::TypeChecker,
                format!("unresolved label '{}'", ident.name),
                ident.span,
                source,
            ));
        }
    }
    for ident in &var_refs {
        if !symbols.variables.contains_key(&ident.name) {
            diagnostics.push(Diagnostic::new(
                Stage::TypeChecker,
                format!("unresolved variable '{}'", ident.name),
                ident.span,
                source,
            ));
        }
    }

    let success = diagnostics.is_empty();
    TypeCheckOutcome {
        diagnostics,
        symbols,
        success,
    }
}

fn signature_error_diagnostic(
    err: SignatureError,
    instr: &crate::ast::Instruction,
    source: &SourceView,
) -> Diagnostic {
    match err {
        SignatureError::UnknownMnemonic => Diagnostic::new(
            Stage::TypeChecker,
            format!("unknown mnemonic '{}'", instr.mnemonic),
            instr.span,
            source,
        ),
        SignatureError::TooFewOperands => Diagnostic::new(
            Stage::TypeChecker,
            format!("too few operands for '{}'", instr.mnemonic),
            instr.span,
            source,
        ),
        SignatureError::NoMatchingSignature { operand_index } => {
            let span = instr
                .operands
                .get(operand_index)
                .map(|op| op.span())
                .unwrap_or(instr.span);
            Diagnostic::new(
                Stage::TypeChecker,
                format!("no matching signature for '{}'", instr.mnemonic),
                span,
                source,
            )
        }
        SignatureError::OperandOutOfRange { operand_index } => {
            let span = instr
                .operands
                .get(operand_index)
                .map(|op| op.span())
                .unwrap_or(instr.span);
            Diagnostic::new(
                Stage::TypeChecker,
                "Integer does not fit into given type",
                span,
                source,
            )
        }
    }
}
