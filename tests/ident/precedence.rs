use crate::common::Scripted;
use filetriage::ident::{IdentifyConfig, Identifier, SignalAdapter};

fn scripted(describe: &'static str, mime: &'static str) -> Identifier {
    let adapter = SignalAdapter::new(
        Box::new(Scripted { describe, mime }),
        Box::new(Scripted { describe, mime }),
    );
    Identifier::with_adapter(IdentifyConfig::default(), adapter)
}

fn tag_of(id: &Identifier) -> String {
    id.ident(b"payload", 7, None).type_tag
}

#[test]
fn test_custom_label_beats_trusted_mime() {
    let id = scripted("custom: malware/sample\n- PDF document, version 1.4", "application/pdf");
    assert_eq!(tag_of(&id), "malware/sample");
}

#[test]
fn test_custom_prefix_any_case() {
    let id = scripted("CUSTOM: x", "application/octet-stream");
    assert_eq!(tag_of(&id), "x");
}

#[test]
fn test_custom_label_cannot_force_double_unknown() {
    let id = scripted("custom: unknown/unknown", "application/octet-stream");
    assert_eq!(tag_of(&id), "unknown");
}

#[test]
fn test_blank_custom_label_falls_through() {
    let id = scripted("custom:   \n- PDF document, version 1.4", "application/pdf");
    assert_eq!(tag_of(&id), "document/pdf");
}

#[test]
fn test_trusted_mime_beats_cascade() {
    // the label alone would cascade to a windows executable
    let id = scripted("PE32 executable (GUI) Intel 80386, for MS Windows", "application/pdf");
    assert_eq!(tag_of(&id), "document/pdf");
}

#[test]
fn test_first_trusted_mime_wins() {
    let id = scripted("data", "application/octet-stream\n- application/zip\n- application/pdf");
    assert_eq!(tag_of(&id), "archive/zip");
}

#[test]
fn test_earliest_toplevel_match_wins_across_labels() {
    // the shortcut pattern sits above the pdf pattern in the top-level table
    let id = scripted("PDF document, version 1.4\n- MS Windows shortcut", "application/octet-stream");
    assert_eq!(tag_of(&id), "shortcut/windows");
}

#[test]
fn test_cascade_composes_toplevel_and_subtype() {
    let id = scripted("ELF 64-bit LSB executable, x86-64", "application/octet-stream");
    assert_eq!(tag_of(&id), "executable/linux/elf64");
}

#[test]
fn test_unmatched_labels_are_unknown() {
    let id = scripted("qqq zzz", "application/octet-stream");
    let r = id.ident(b"payload", 7, None);
    assert_eq!(r.type_tag, "unknown");
    assert_eq!(r.descriptive_label.as_deref(), Some("qqq zzz"));
}

#[test]
fn test_text_mime_promotes_unknown() {
    let id = scripted("qqq zzz", "text/x-unheard-of");
    assert_eq!(tag_of(&id), "text/plain");
}

#[test]
fn test_magic_joins_all_labels() {
    let id = scripted("first\n- second", "application/octet-stream");
    let r = id.ident(b"payload", 7, None);
    assert_eq!(r.descriptive_label.as_deref(), Some("first | second"));
    assert_eq!(r.mime_guess.as_deref(), Some("application/octet-stream"));
}

#[test]
fn test_word_label_promoted_before_overrides() {
    let id = scripted(
        "Composite Document File V2 Document, Cannot read section info\n- OLE 2 Compound Document : Microsoft Word Document",
        "application/CDFV2",
    );
    let r = id.ident(b"payload", 7, None);
    assert_eq!(r.type_tag, "document/office/word");
    assert!(r
        .descriptive_label
        .as_deref()
        .unwrap()
        .starts_with("OLE 2 Compound Document"));
}
