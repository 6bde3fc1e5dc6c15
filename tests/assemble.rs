//! Black-box integration tests driving `Pipeline::assemble` end to end,
//! covering the scenarios and boundary behaviours of the front end.

use uvmasm::Pipeline;

fn assemble_ok(text: &str) -> uvmasm::pipeline::Assembled {
    Pipeline::assemble(text).unwrap_or_else(|diags| {
        panic!(
            "expected success, got diagnostics: {}",
            diags.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("\n")
        )
    })
}

fn assemble_err(text: &str) -> Vec<uvmasm::diagnostics::Diagnostic> {
    match Pipeline::assemble(text) {
        Ok(_) => panic!("expected failure"),
        Err(diags) => diags,
    }
}

#[test]
fn s1_happy_path() {
    let assembled = assemble_ok("code {\n@main\n    push i32, 42\n    exit\n}\n");
    let code = assembled.file.code_section.unwrap();
    use uvmasm::ast::BodyItem;
    let instrs: Vec<_> = code
        .body
        .iter()
        .filter_map(|item| match item {
            BodyItem::Instruction(i) => Some(i),
            _ => None,
        })
        .collect();
    assert_eq!(instrs[0].mnemonic, "push");
    assert_eq!(instrs[0].resolved.unwrap().opcode, 0x03);
    assert_eq!(instrs[1].resolved.unwrap().opcode, 0x50);
}

#[test]
fn s2_label_resolution() {
    assemble_ok("code {\n@main\n    jmp loop\n@loop\n    sys 0\n    exit\n}\n");
    let diags = assemble_err("code {\n@main\n    jmp missing\n    exit\n}\n");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unresolved label"));
}

#[test]
fn s3_register_offset_layout_byte() {
    use uvmasm::ast::{BodyItem, Immediate, Operand};
    let assembled = assemble_ok("code {\n@main\n  load i32, [bp - 4], r0\n  exit\n}\n");
    let code = assembled.file.code_section.unwrap();
    let instr = code.body.iter().find_map(|item| match item {
        BodyItem::Instruction(i) if i.mnemonic == "load" => Some(i),
        _ => None,
    }).unwrap();
    match &instr.operands[1] {
        Operand::RegisterOffset(ro) => {
            assert_eq!(ro.layout, 0xAF);
            assert_eq!(ro.base.unwrap().id, uvmasm::registers::REG_BP);
            assert_eq!(ro.immediate, Some(Immediate::U32(4)));
        }
        other => panic!("expected register offset, got {other:?}"),
    }
}

#[test]
fn s4_variable_addressing() {
    use uvmasm::ast::{BodyItem, Operand};
    let assembled = assemble_ok(
        "static {\n  msg : i8 = \"hi\"\n}\ncode {\n@main\n  lea [msg], r0\n  exit\n}\n",
    );
    let code = assembled.file.code_section.unwrap();
    let instr = code.body.iter().find_map(|item| match item {
        BodyItem::Instruction(i) if i.mnemonic == "lea" => Some(i),
        _ => None,
    }).unwrap();
    match &instr.operands[0] {
        Operand::RegisterOffset(ro) => {
            assert_eq!(ro.layout, 0);
            assert_eq!(ro.var.as_ref().unwrap().name, "msg");
        }
        other => panic!("expected register offset, got {other:?}"),
    }
    assert!(assembled.symbols.variables.contains_key("msg"));
}

#[test]
fn s5_duplicate_label() {
    let diags = assemble_err("code {\n@main\n  exit\n@main\n  exit\n}\n");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("already defined"));
}

#[test]
fn s6_overflow_in_variable_declaration() {
    let diags = assemble_err("static {\n  x : i16 = 70000\n}\ncode {\n@main\n  exit\n}\n");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("does not fit"));
}

#[test]
fn boundary_push_i8_range() {
    assemble_ok("code {\n@main\n  push i8, 255\n  exit\n}\n");
    let diags = assemble_err("code {\n@main\n  push i8, 256\n  exit\n}\n");
    assert!(diags[0].message.contains("does not fit"));
}

#[test]
fn boundary_register_offset_32_bit_overflow() {
    assemble_ok("code {\n@main\n  load i32, [bp - 0xFFFFFFFF], r0\n  exit\n}\n");
    let diags = assemble_err("code {\n@main\n  load i32, [bp - 0x100000000], r0\n  exit\n}\n");
    assert!(diags[0].message.contains("32 bits"));
}

#[test]
fn boundary_register_class_mismatch() {
    assemble_ok("code {\n@main\n  add i32, r0, r1\n  exit\n}\n");
    let diags = assemble_err("code {\n@main\n  add f32, r0, r1\n  exit\n}\n");
    assert!(diags[0].message.contains("no matching signature"));
    let diags = assemble_err("code {\n@main\n  add i32, f0, r1\n  exit\n}\n");
    assert!(diags[0].message.contains("no matching signature"));
}

#[test]
fn boundary_sign_gap_is_rejected() {
    let diags = assemble_err("code {\n@main\n  push i32, - 1\n  exit\n}\n");
    assert!(diags[0].message.contains("unexpected operator"));
}

#[test]
fn boundary_missing_code_and_missing_main() {
    let diags = assemble_err("static {\n  x : i8 = 1\n}\n");
    assert!(diags[0].message.contains("missing main label"));

    let diags = assemble_err("code {\n@other\n  exit\n}\n");
    assert!(diags[0].message.contains("missing main label"));
}

#[test]
fn idempotent_reassembly_of_the_same_source() {
    let text = "code {\n@main\n    push i32, 42\n    exit\n}\n";
    let first = assemble_ok(text);
    let second = assemble_ok(text);
    use uvmasm::ast::BodyItem;
    let opcode_of = |assembled: &uvmasm::pipeline::Assembled| {
        assembled
            .file
            .code_section
            .as_ref()
            .unwrap()
            .body
            .iter()
            .find_map(|item| match item {
                BodyItem::Instruction(i) if i.mnemonic == "push" => i.resolved.map(|r| r.opcode),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(opcode_of(&first), opcode_of(&second));
}
