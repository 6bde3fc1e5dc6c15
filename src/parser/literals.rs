//! Numeric and string literal parsing (§4.1). Tokens are text-free, so
//! every function here takes the raw source slice and produces the AST's
//! owned representation.

/// Parses an integer literal's text (`0x`-prefixed hex or plain decimal)
/// into its unsigned magnitude.
pub fn parse_int_magnitude(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

pub fn parse_float(text: &str) -> Option<f64> {
    text.parse().ok()
}

/// Strips the surrounding quotes and expands escapes. An unknown escape
/// sequence truncates the string at that point without erroring (§9).
pub fn decode_string(text: &str) -> Vec<u8> {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('t') => bytes.push(b'\t'),
            Some('v') => bytes.push(0x0B),
            Some('0') => bytes.push(0x00),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0C),
            Some('n') => bytes.push(b'\n'),
            Some('r') => bytes.push(b'\r'),
            Some('"') => bytes.push(b'"'),
            Some('\\') => bytes.push(b'\\'),
            _ => break,
        }
    }
    bytes
}
