//! Byte previews and safe string rendering.

/// Replace every byte outside printable ASCII (0x20..=0x7E) with `.`.
pub fn dotdump(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '.' })
        .collect()
}

/// Lowercase hex of the bytes.
pub fn hex_preview(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode lossily and escape control characters as `\xNN`.
pub fn safe_str(data: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(data);
    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        if c.is_control() && (c as u32) < 0x100 {
            out.push_str(&format!("\\x{:02x}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotdump() {
        assert_eq!(dotdump(b"MZ\x90\x00\x03"), "MZ...");
        assert_eq!(dotdump(b"a b~\x7f"), "a b~.");
        assert_eq!(dotdump(b""), "");
    }

    #[test]
    fn test_hex_preview() {
        assert_eq!(hex_preview(b"MZ\x90"), "4d5a90");
    }

    #[test]
    fn test_safe_str() {
        assert_eq!(safe_str(b"PDF document"), "PDF document");
        assert_eq!(safe_str(b"a\x01b"), "a\\x01b");
        assert_eq!(safe_str(b"\xff"), "\u{fffd}");
    }
}
