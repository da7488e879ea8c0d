//! Compound-document class ID lookup.
//!
//! The root directory entry of an OLE2 file carries the CLSID of the
//! application that wrote it, 0x50 bytes past the UTF-16LE `Root Entry`
//! name. Known CLSIDs name the office application. A zeroed CLSID next to
//! a `Details` entry is how McAfee quarantine files look.

use crate::ident::tables::OLE_CLSIDS;
use memchr::memmem;
use once_cell::sync::Lazy;
use tracing::debug;
use uuid::Uuid;

pub const QUARANTINE_TAG: &str = "quarantine/mcafee";

const CLSID_OFFSET: usize = 0x50;
const DETAILS_WINDOW: usize = 0x100;

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

static ROOT_ENTRY: Lazy<Vec<u8>> = Lazy::new(|| utf16le("Root Entry"));
static DETAILS: Lazy<Vec<u8>> = Lazy::new(|| utf16le("Details"));

/// Canonical upper-case GUID for a 16-byte little-endian CLSID.
pub fn clsid_string(raw: &[u8; 16]) -> String {
    Uuid::from_bytes_le(*raw)
        .hyphenated()
        .encode_upper(&mut Uuid::encode_buffer())
        .to_string()
}

/// Tag implied by the root entry's CLSID, if any.
///
/// Returns `None` when the buffer has no root entry, is too short to hold
/// the CLSID, or the CLSID is unknown.
pub fn ole_guid_lookup(buf: &[u8]) -> Option<&'static str> {
    let root = memmem::find(buf, &ROOT_ENTRY)?;
    let start = root + CLSID_OFFSET;
    let raw: [u8; 16] = buf.get(start..start + 16)?.try_into().ok()?;

    if raw != [0u8; 16] {
        let guid = clsid_string(&raw);
        let tag = OLE_CLSIDS.get(&guid).copied();
        debug!(%guid, ?tag, "root entry CLSID");
        return tag;
    }

    let window = &buf[..buf.len().min(root + DETAILS_WINDOW)];
    if memmem::find(window, &DETAILS).is_some() {
        debug!("zeroed CLSID with Details entry");
        return Some(QUARANTINE_TAG);
    }
    None
}
