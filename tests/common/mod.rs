//! Builders for synthetic samples shared by the integration tests.
//!
//! Real-world samples are not shipped with the crate, so every fixture is
//! assembled byte by byte from the layout each refiner reads.

#![allow(dead_code)]

use filetriage::error::Result;
use filetriage::ident::refiners::cart::{Rc4, CART_MAGIC, CART_VERSION, DEFAULT_ARC4_KEY, TRAC_MAGIC};
use filetriage::ident::refiners::encryption::OLE_MAGIC;
use filetriage::ident::{ScanMode, ScanTarget, SignatureScanner};
use serde_json::Value;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `data` into a fresh temp dir; the dir lives as long as the guard.
pub fn write_temp(name: &str, data: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, data).expect("write sample");
    (dir, path)
}

pub fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// DOS header pointing at a COFF header with no optional header.
///
/// Signature scanning sees only "MS-DOS executable"; the DOS refiner finds
/// the real width and kind.
pub fn pe_stub(machine: u16, characteristics: u16) -> Vec<u8> {
    let mut buf = vec![0u8; 0x100];
    buf[..2].copy_from_slice(b"MZ");
    buf[0x3c..0x40].copy_from_slice(&0x40u32.to_le_bytes());
    buf[0x40..0x44].copy_from_slice(b"PE\0\0");
    buf[0x44..0x46].copy_from_slice(&machine.to_le_bytes());
    buf[0x56..0x58].copy_from_slice(&characteristics.to_le_bytes());
    buf
}

/// Stored zip with one tiny member per name.
pub fn zip_with(names: &[&str]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut w = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for n in names {
            w.start_file(*n, opts).expect("start member");
            w.write_all(b"x").expect("write member");
        }
        w.finish().expect("finish zip");
    }
    buf.into_inner()
}

/// One 128-byte compound-file directory entry.
pub fn dir_entry(name: &str, kind: u8, start: u32, size: u32) -> [u8; 128] {
    let mut e = [0u8; 128];
    let n = utf16le(name);
    e[..n.len()].copy_from_slice(&n);
    e[0x40..0x42].copy_from_slice(&((n.len() + 2) as u16).to_le_bytes());
    e[0x42] = kind;
    e[0x74..0x78].copy_from_slice(&start.to_le_bytes());
    e[0x78..0x7c].copy_from_slice(&size.to_le_bytes());
    e
}

/// Compound file: 512-byte header, one directory sector, then stream
/// sectors.
pub fn compound_file(entries: &[[u8; 128]], sectors: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0u8; 512];
    data[..8].copy_from_slice(OLE_MAGIC);
    data[0x1e..0x20].copy_from_slice(&9u16.to_le_bytes());
    data[0x38..0x3c].copy_from_slice(&0x1000u32.to_le_bytes());
    let mut dir = vec![0u8; 512];
    for (i, e) in entries.iter().enumerate() {
        dir[i * 128..(i + 1) * 128].copy_from_slice(e);
    }
    data.extend(dir);
    for s in sectors {
        let mut s = s.clone();
        s.resize(512, 0);
        data.extend(s);
    }
    data
}

/// Compound file whose root entry carries `clsid` (little-endian bytes).
pub fn ole_with_clsid(clsid: [u8; 16], extra_entries: &[[u8; 128]]) -> Vec<u8> {
    let mut root = dir_entry("Root Entry", 5, 0, 0);
    root[0x50..0x60].copy_from_slice(&clsid);
    let mut entries = vec![root];
    entries.extend_from_slice(extra_entries);
    compound_file(&entries, &[])
}

/// Word document holding an encrypted package stream.
pub fn encrypted_word() -> Vec<u8> {
    compound_file(
        &[
            dir_entry("Root Entry", 5, 0, 0),
            dir_entry("WordDocument", 2, 1, 0x2000),
            dir_entry("EncryptionInfo", 2, 2, 200),
            dir_entry("EncryptedPackage", 2, 3, 0x4000),
        ],
        &[vec![0u8; 16]],
    )
}

fn seal(key: &[u8; 16], section: &Value) -> Vec<u8> {
    let mut raw = serde_json::to_vec(section).expect("json");
    Rc4::new(key).apply(&mut raw);
    raw
}

/// CaRT container with the default key and the given metadata sections.
pub fn cart(header: &Value, footer: &Value) -> Vec<u8> {
    let opt_header = seal(&DEFAULT_ARC4_KEY, header);
    let opt_footer = seal(&DEFAULT_ARC4_KEY, footer);
    let mut out = Vec::new();
    out.extend_from_slice(CART_MAGIC);
    out.extend_from_slice(&CART_VERSION.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&DEFAULT_ARC4_KEY);
    out.extend_from_slice(&(opt_header.len() as u64).to_le_bytes());
    out.extend_from_slice(&opt_header);
    out.extend_from_slice(b"compressed payload");
    let footer_pos = out.len() as u64;
    out.extend_from_slice(&opt_footer);
    out.extend_from_slice(TRAC_MAGIC);
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&footer_pos.to_le_bytes());
    out.extend_from_slice(&(opt_footer.len() as u64).to_le_bytes());
    out
}

/// Scanner replaying fixed output for each mode.
pub struct Scripted {
    pub describe: &'static str,
    pub mime: &'static str,
}

impl SignatureScanner for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn scan(&mut self, _target: &ScanTarget<'_>, mode: ScanMode) -> Result<Vec<u8>> {
        Ok(match mode {
            ScanMode::Describe => self.describe.as_bytes().to_vec(),
            ScanMode::Mime => self.mime.as_bytes().to_vec(),
        })
    }
}
