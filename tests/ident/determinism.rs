use crate::common::{encrypted_word, pe_stub, write_temp, zip_with};
use filetriage::core::identification::{FileInfo, SUMMARY_FIELDS};
use filetriage::{fileinfo, fileinfo_bytes, ident};
use std::thread;

#[test]
fn test_repeated_runs_agree() {
    let samples = [
        pe_stub(0x8664, 0x2002),
        zip_with(&["AndroidManifest.xml", "classes.dex", "META-INF/MANIFEST.MF"]),
        encrypted_word(),
        b"#!/bin/sh\necho hi\n".to_vec(),
    ];
    for s in &samples {
        let first = fileinfo_bytes(s).to_json_string().unwrap();
        for _ in 0..3 {
            assert_eq!(fileinfo_bytes(s).to_json_string().unwrap(), first);
        }
    }
}

#[test]
fn test_path_and_bytes_agree() {
    let data = zip_with(&["[Content_Types].xml", "_rels/.rels", "ppt/presentation.xml"]);
    let (_dir, path) = write_temp("deck.pptx", &data);
    let from_disk = fileinfo(&path).unwrap();
    let from_memory = fileinfo_bytes(&data);
    assert_eq!(from_disk.type_tag(), "document/office/powerpoint");
    assert_eq!(from_disk, from_memory);
}

#[test]
fn test_concurrent_identification() {
    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            thread::spawn(move || {
                let data = if i % 2 == 0 {
                    pe_stub(0x014c, 0x0002)
                } else {
                    b"%PDF-1.4 /Encrypt".to_vec()
                };
                (i, ident(&data, data.len(), None).type_tag, fileinfo_bytes(&data).ident.type_tag)
            })
        })
        .collect();
    for h in handles {
        let (i, provisional, refined) = h.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(provisional, "executable/windows/dos");
            assert_eq!(refined, "executable/windows/pe32");
        } else {
            assert_eq!(provisional, "document/pdf");
            assert_eq!(refined, "document/pdf/passwordprotected");
        }
    }
}

#[test]
fn test_json_record_round_trips() {
    let info = fileinfo_bytes(&pe_stub(0x8664, 0x0002));
    let json = info.to_json_string().unwrap();
    for key in ["\"ascii\"", "\"hex\"", "\"magic\"", "\"mime\"", "\"type\"", "\"sha256\""] {
        assert!(json.contains(key), "missing {} in {}", key, json);
    }
    assert_eq!(FileInfo::from_json_str(&json).unwrap(), info);
}

#[test]
fn test_summary_line_fields() {
    let line = fileinfo_bytes(b"hello world\n").summary_line();
    assert_eq!(line.split('\t').count(), SUMMARY_FIELDS.len());
    assert!(line.contains("text/plain"));
}
