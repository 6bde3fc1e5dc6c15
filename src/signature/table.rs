//! Loads `instructions.json`, embedded at compile time, into the trie
//! structures defined in the parent module. Built once behind a
//! `once_cell::sync::Lazy`, mirroring the pack's JSON-driven table
//! generation (grounded in an external-JSON-to-trie pattern) but compiled
//! at first use rather than in a build script.

use super::{EncodingFlags, ParamCategory, Signature, SignatureNode, SignatureTable};
use crate::types_uvm::UvmType;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

const INSTRUCTIONS_JSON: &str = include_str!("instructions.json");

#[derive(Deserialize)]
struct RawFile {
    mnemonics: HashMap<String, Vec<RawSignature>>,
}

#[derive(Deserialize)]
struct RawSignature {
    params: Vec<String>,
    #[serde(default)]
    flags: Vec<String>,
    opcode: u8,
    #[serde(default)]
    type_variants: HashMap<UvmType, u8>,
}

fn parse_category(name: &str) -> ParamCategory {
    match name {
        "IntType" => ParamCategory::IntType,
        "FloatType" => ParamCategory::FloatType,
        "IntReg" => ParamCategory::IntReg,
        "FloatReg" => ParamCategory::FloatReg,
        "RegOffset" => ParamCategory::RegOffset,
        "IntNum" => ParamCategory::IntNum,
        "FloatNum" => ParamCategory::FloatNum,
        "LabelId" => ParamCategory::LabelId,
        "SysInt" => ParamCategory::SysInt,
        other => panic!("unknown operand category '{other}' in instruction table"),
    }
}

fn parse_flags(names: &[String]) -> EncodingFlags {
    let mut flags = EncodingFlags::empty();
    for name in names {
        flags |= match name.as_str() {
            "EncodeType" => EncodingFlags::ENCODE_TYPE,
            "TypeVariants" => EncodingFlags::TYPE_VARIANTS,
            other => panic!("unknown encoding flag '{other}' in instruction table"),
        };
    }
    flags
}

impl SignatureNode {
    fn insert(&mut self, params: &[ParamCategory], signature: Signature) {
        match params.split_first() {
            None => self.signature = Some(signature),
            Some((head, rest)) => {
                let child = match self.children.iter_mut().find(|(cat, _)| *cat == *head) {
                    Some((_, node)) => node,
                    None => {
                        self.children.push((*head, SignatureNode::default()));
                        &mut self.children.last_mut().unwrap().1
                    }
                };
                child.insert(rest, signature);
            }
        }
    }
}

fn build() -> SignatureTable {
    let raw: RawFile =
        serde_json::from_str(INSTRUCTIONS_JSON).expect("instructions.json must parse");
    let mut roots = HashMap::new();
    for (mnemonic, signatures) in raw.mnemonics {
        let mut root = SignatureNode::default();
        for (index, sig) in signatures.into_iter().enumerate() {
            let params: Vec<ParamCategory> = sig.params.iter().map(|p| parse_category(p)).collect();
            let flags = parse_flags(&sig.flags);
            root.insert(
                &params,
                Signature {
                    opcode: sig.opcode,
                    flags,
                    type_variants: sig.type_variants,
                    index,
                },
            );
        }
        roots.insert(mnemonic, root);
    }
    SignatureTable { roots }
}

static TABLE: Lazy<SignatureTable> = Lazy::new(build);

pub(super) fn table() -> &'static SignatureTable {
    &TABLE
}

/// Every mnemonic the lexer needs to recognize as an `Instruction` token
/// rather than a plain `Identifier` (§6).
pub fn known_mnemonics() -> impl Iterator<Item = &'static str> {
    TABLE.roots.keys().map(String::as_str)
}
