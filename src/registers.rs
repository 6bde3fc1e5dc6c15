//! Register id map (§6): `ip=0x01, sp=0x02, bp=0x03, r0..r15=0x05..0x14,
//! f0..f15=0x16..0x25`. Id `0x04` (the flags register) is reserved and
//! unreachable through syntax; no mnemonic surfaces it.

pub const REG_IP: u8 = 0x01;
pub const REG_SP: u8 = 0x02;
pub const REG_BP: u8 = 0x03;
pub const REG_FLAGS: u8 = 0x04;

const INT_GP_BASE: u8 = 0x05;
const FLOAT_GP_BASE: u8 = 0x16;
const GP_COUNT: u8 = 16;

/// Resolves a lowercase register name (`ip`, `sp`, `bp`, `r0`..`r15`,
/// `f0`..`f15`) to its id byte, or `None` if it isn't a register name.
pub fn lookup(name: &str) -> Option<u8> {
    match name {
        "ip" => return Some(REG_IP),
        "sp" => return Some(REG_SP),
        "bp" => return Some(REG_BP),
        _ => {}
    }
    let mut chars = name.chars();
    let prefix = chars.next()?;
    let rest = chars.as_str();
    let n: u8 = rest.parse().ok()?;
    if n >= GP_COUNT {
        return None;
    }
    match prefix {
        'r' => Some(INT_GP_BASE + n),
        'f' => Some(FLOAT_GP_BASE + n),
        _ => None,
    }
}

/// Integer registers are `ip`, `sp`, `bp`, and `r0..r15`: ids `0x01..=0x14`
/// excluding the reserved flags id `0x04`.
pub fn is_int_register(id: u8) -> bool {
    (0x01..=0x14).contains(&id) && id != REG_FLAGS
}

/// Float registers are `f0..f15`: ids `0x16..=0x25`.
pub fn is_float_register(id: u8) -> bool {
    (0x16..=0x25).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_special_and_general_purpose_registers() {
        assert_eq!(lookup("ip"), Some(0x01));
        assert_eq!(lookup("sp"), Some(0x02));
        assert_eq!(lookup("bp"), Some(0x03));
        assert_eq!(lookup("r0"), Some(0x05));
        assert_eq!(lookup("r15"), Some(0x14));
        assert_eq!(lookup("f0"), Some(0x16));
        assert_eq!(lookup("f15"), Some(0x25));
    }

    #[test]
    fn rejects_out_of_range_and_unknown_names() {
        assert_eq!(lookup("r16"), None);
        assert_eq!(lookup("f16"), None);
        assert_eq!(lookup("zz"), None);
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("µ"), None);
    }

    #[test]
    fn classifies_register_ranges() {
        assert!(is_int_register(REG_IP));
        assert!(is_int_register(REG_SP));
        assert!(is_int_register(REG_BP));
        assert!(is_int_register(0x05));
        assert!(is_int_register(0x14));
        assert!(!is_int_register(REG_FLAGS));
        assert!(!is_int_register(0x16));
        assert!(is_float_register(0x16));
        assert!(is_float_register(0x25));
        assert!(!is_float_register(0x26));
    }
}
