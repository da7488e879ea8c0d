//! CaRT container metadata.
//!
//! CaRT wraps a payload with an RC4-obfuscated JSON header and footer so
//! the payload cannot be executed or scanned by accident. Only the metadata
//! is read here; the declared type lives at `metadata["al"]["type"]`.
//!
//! Layout (little-endian):
//! - mandatory header, 38 bytes: `CART`, version `i16` (1), reserved `u64`,
//!   RC4 key `[u8; 16]`, optional header length `u64`
//! - optional header: RC4-encrypted JSON
//! - payload
//! - optional footer: RC4-encrypted JSON
//! - mandatory footer, 28 bytes: `TRAC`, reserved `u64`, optional footer
//!   position `u64`, optional footer length `u64`

use crate::core::identification::canonical_tag;
use crate::error::{IdentifyError, Result};
use crate::ident::io::Subject;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const CART_MAGIC: &[u8; 4] = b"CART";
pub const TRAC_MAGIC: &[u8; 4] = b"TRAC";
pub const CART_VERSION: i16 = 1;
pub const MANDATORY_HEADER_LEN: usize = 38;
pub const MANDATORY_FOOTER_LEN: usize = 28;

/// Key written by default CaRT encoders.
pub const DEFAULT_ARC4_KEY: [u8; 16] = *b"\x03\x01\x04\x01\x05\x09\x02\x06\x03\x01\x04\x01\x05\x09\x02\x06";

/// Upper bound on a single optional header or footer.
const MAX_METADATA_LEN: u64 = 64 * 1024 * 1024;

pub const CORRUPTED_TAG: &str = "corrupted/cart";
pub const ARCHIVE_TAG: &str = "archive/cart";

/// Reads metadata out of a wrapped container.
pub trait ContainerMetadataExtractor {
    /// Merged metadata; `Ok(None)` when the container is intact but its
    /// metadata cannot be decrypted.
    fn metadata(&self, subject: &Subject<'_>) -> Result<Option<Map<String, Value>>>;
}

/// RC4 keystream.
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    pub fn new(key: &[u8]) -> Self {
        let mut s = [0u8; 256];
        for (i, v) in s.iter_mut().enumerate() {
            *v = i as u8;
        }
        if !key.is_empty() {
            let mut j = 0u8;
            for i in 0..256 {
                j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
                s.swap(i, j as usize);
            }
        }
        Self { s, i: 0, j: 0 }
    }

    /// XOR the keystream into `data`.
    pub fn apply(&mut self, data: &mut [u8]) {
        for b in data.iter_mut() {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.s[self.i as usize]);
            self.s.swap(self.i as usize, self.j as usize);
            let k = self.s[(self.s[self.i as usize].wrapping_add(self.s[self.j as usize])) as usize];
            *b ^= k;
        }
    }
}

fn u64_at(b: &[u8], off: usize) -> u64 {
    let mut a = [0u8; 8];
    a.copy_from_slice(&b[off..off + 8]);
    u64::from_le_bytes(a)
}

/// Mandatory header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartHeader {
    pub version: i16,
    pub key: [u8; 16],
    pub opt_header_len: u64,
}

impl CartHeader {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < MANDATORY_HEADER_LEN {
            return Err(IdentifyError::Container(format!(
                "header truncated: {} bytes",
                raw.len()
            )));
        }
        if &raw[..4] != CART_MAGIC {
            return Err(IdentifyError::Container("bad CART magic".to_string()));
        }
        let version = i16::from_le_bytes([raw[4], raw[5]]);
        if version != CART_VERSION {
            return Err(IdentifyError::Container(format!(
                "unsupported CaRT version {}",
                version
            )));
        }
        let mut key = [0u8; 16];
        key.copy_from_slice(&raw[14..30]);
        Ok(Self {
            version,
            key,
            opt_header_len: u64_at(raw, 30),
        })
    }
}

/// Mandatory footer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartFooter {
    pub opt_footer_pos: u64,
    pub opt_footer_len: u64,
}

impl CartFooter {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < MANDATORY_FOOTER_LEN || &raw[..4] != TRAC_MAGIC {
            return Err(IdentifyError::Container("bad TRAC footer".to_string()));
        }
        Ok(Self {
            opt_footer_pos: u64_at(raw, 12),
            opt_footer_len: u64_at(raw, 20),
        })
    }
}

/// Default extractor for CaRT files.
#[derive(Debug, Clone, Default)]
pub struct CartReader {
    private_key: Option<[u8; 16]>,
}

impl CartReader {
    pub fn new(private_key: Option<[u8; 16]>) -> Self {
        Self { private_key }
    }

    fn effective_key(&self, header_key: [u8; 16]) -> Option<[u8; 16]> {
        if header_key == [0u8; 16] {
            self.private_key
        } else {
            Some(header_key)
        }
    }

    fn decode_section(key: &[u8; 16], mut raw: Vec<u8>, what: &str) -> Result<Map<String, Value>> {
        Rc4::new(key).apply(&mut raw);
        match serde_json::from_slice::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(IdentifyError::Container(format!("{} is not a JSON object", what))),
        }
    }
}

fn read_exact_at(subject: &Subject<'_>, offset: u64, len: u64, what: &str) -> Result<Vec<u8>> {
    if len > MAX_METADATA_LEN {
        return Err(IdentifyError::Container(format!("{} too large: {}", what, len)));
    }
    let raw = subject.read_at(offset, len as usize)?;
    if (raw.len() as u64) < len {
        return Err(IdentifyError::ParseError {
            offset,
            message: format!("{} truncated", what),
        });
    }
    Ok(raw)
}

impl ContainerMetadataExtractor for CartReader {
    fn metadata(&self, subject: &Subject<'_>) -> Result<Option<Map<String, Value>>> {
        let size = subject.size()?;
        let header = CartHeader::parse(&subject.read_at(0, MANDATORY_HEADER_LEN)?)?;
        let min_size = (MANDATORY_HEADER_LEN + MANDATORY_FOOTER_LEN) as u64;
        if size < min_size.saturating_add(header.opt_header_len) {
            return Err(IdentifyError::Container("container truncated".to_string()));
        }
        let footer_off = size - MANDATORY_FOOTER_LEN as u64;
        let footer = CartFooter::parse(&subject.read_at(footer_off, MANDATORY_FOOTER_LEN)?)?;
        if footer.opt_footer_len > 0
            && footer
                .opt_footer_pos
                .checked_add(footer.opt_footer_len)
                .map_or(true, |end| end > footer_off)
        {
            return Err(IdentifyError::Container("optional footer out of range".to_string()));
        }

        let Some(key) = self.effective_key(header.key) else {
            debug!("CaRT key is zeroed and no private key is configured");
            return Ok(None);
        };

        let mut merged = Map::new();
        if header.opt_header_len > 0 {
            let raw = read_exact_at(
                subject,
                MANDATORY_HEADER_LEN as u64,
                header.opt_header_len,
                "optional header",
            )?;
            merged.extend(Self::decode_section(&key, raw, "optional header")?);
        }
        if footer.opt_footer_len > 0 {
            let raw = read_exact_at(
                subject,
                footer.opt_footer_pos,
                footer.opt_footer_len,
                "optional footer",
            )?;
            merged.extend(Self::decode_section(&key, raw, "optional footer")?);
        }
        Ok(Some(merged))
    }
}

/// Declared type of a CaRT container.
///
/// Unreadable containers become `corrupted/cart`; readable ones without a
/// declared type stay `archive/cart`.
pub fn cart_ident(extractor: &dyn ContainerMetadataExtractor, subject: &Subject<'_>) -> String {
    match extractor.metadata(subject) {
        Ok(Some(meta)) => meta
            .get("al")
            .and_then(|al| al.get("type"))
            .and_then(Value::as_str)
            .and_then(canonical_tag)
            .unwrap_or_else(|| ARCHIVE_TAG.to_string()),
        Ok(None) => ARCHIVE_TAG.to_string(),
        Err(e) => {
            warn!("CaRT container unreadable: {}", e);
            CORRUPTED_TAG.to_string()
        }
    }
}
