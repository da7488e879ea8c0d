//! Hostile and degenerate inputs must still produce a record.

use crate::common::{pe_stub, write_temp, Scripted};
use filetriage::error::{IdentifyError, Result};
use filetriage::ident::{IdentifyConfig, Identifier, ScanMode, ScanTarget, SignalAdapter, SignatureScanner};
use filetriage::{fileinfo, fileinfo_bytes, ident};

struct Broken;

impl SignatureScanner for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn scan(&mut self, _target: &ScanTarget<'_>, _mode: ScanMode) -> Result<Vec<u8>> {
        Err(IdentifyError::Scanner("scanner unavailable".to_string()))
    }
}

fn never_double_unknown(data: &[u8]) {
    let info = fileinfo_bytes(data);
    assert_ne!(info.type_tag(), "unknown/unknown", "input {:?}", &data[..data.len().min(16)]);
    assert!(!info.type_tag().is_empty());
}

#[test]
fn test_empty_input() {
    let info = fileinfo_bytes(b"");
    assert_eq!(info.type_tag(), "empty");
    assert_eq!(info.sha256, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");

    let (_dir, path) = write_temp("empty.bin", b"");
    assert_eq!(fileinfo(&path).unwrap().type_tag(), "empty");
}

#[test]
fn test_never_unknown_unknown() {
    let samples: Vec<Vec<u8>> = vec![
        vec![0u8; 4096],
        (0..=255u8).cycle().take(10_000).collect(),
        b"MZ".to_vec(),
        b"PK\x03\x04garbage".to_vec(),
        b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1".to_vec(),
        b"%PDF-".to_vec(),
        b"\x7fELF\x09\x09".to_vec(),
        b"CART\xff\xff".to_vec(),
        "\u{feff}plain text with a bom".as_bytes().to_vec(),
    ];
    for s in &samples {
        never_double_unknown(s);
    }
}

#[test]
fn test_hostile_pe_header_offset() {
    let mut b = pe_stub(0x8664, 0x0002);
    b[0x3c..0x40].copy_from_slice(&u32::MAX.to_le_bytes());
    assert_eq!(fileinfo_bytes(&b).type_tag(), "executable/windows/dos");
}

#[test]
fn test_broken_zip_keeps_zip_tag() {
    let info = fileinfo_bytes(b"PK\x03\x04\x14\x00\x00\x00truncated member");
    assert_eq!(info.type_tag(), "archive/zip");
}

#[test]
fn test_failing_scanner_degrades_to_unknown() {
    let adapter = SignalAdapter::new(Box::new(Broken), Box::new(Broken));
    let id = Identifier::with_adapter(IdentifyConfig::default(), adapter);
    let r = id.ident(b"\x01\x02\x03", 3, None);
    assert_eq!(r.type_tag, "unknown");
    assert!(r.descriptive_label.is_none());
    assert!(r.mime_guess.is_none());
    assert_eq!(r.hex_preview.as_deref(), Some("010203"));
}

#[test]
fn test_one_failing_mode_keeps_the_other() {
    let adapter = SignalAdapter::new(
        Box::new(Scripted {
            describe: "gzip compressed data",
            mime: "",
        }),
        Box::new(Broken),
    );
    let id = Identifier::with_adapter(IdentifyConfig::default(), adapter);
    let r = id.ident(b"\x1f\x8b\x08", 3, None);
    assert_eq!(r.type_tag, "archive/gzip");
    assert!(r.mime_guess.is_none());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = fileinfo(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, IdentifyError::Io(_)));
}

#[test]
fn test_length_past_buffer_is_clamped() {
    let r = ident(b"%PDF-1.5", 1 << 20, None);
    assert_eq!(r.type_tag, "document/pdf");
}
