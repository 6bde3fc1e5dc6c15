//! UVM numeric type codes (§6). The parser and type checker only ever
//! compare these codes; the concrete values are an implementation detail
//! of this crate, not something the surrounding VM dictates back to us.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum UvmType {
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    F32 = 5,
    F64 = 6,
}

impl UvmType {
    pub fn is_int(self) -> bool {
        matches!(self, UvmType::I8 | UvmType::I16 | UvmType::I32 | UvmType::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, UvmType::F32 | UvmType::F64)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i8" => Some(UvmType::I8),
            "i16" => Some(UvmType::I16),
            "i32" => Some(UvmType::I32),
            "i64" => Some(UvmType::I64),
            "f32" => Some(UvmType::F32),
            "f64" => Some(UvmType::F64),
            _ => None,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(UvmType::I8),
            2 => Some(UvmType::I16),
            3 => Some(UvmType::I32),
            4 => Some(UvmType::I64),
            5 => Some(UvmType::F32),
            6 => Some(UvmType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for UvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UvmType::I8 => "i8",
            UvmType::I16 => "i16",
            UvmType::I32 => "i32",
            UvmType::I64 => "i64",
            UvmType::F32 => "f32",
            UvmType::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<String> for UvmType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UvmType::from_name(&value).ok_or_else(|| format!("unknown UVM type '{value}'"))
    }
}
