use crate::common::{
    cart, compound_file, dir_entry, encrypted_word, ole_with_clsid, pe_stub, write_temp, zip_with,
};
use filetriage::{fileinfo, fileinfo_bytes};
use serde_json::json;
use uuid::Uuid;

fn clsid(guid: &str) -> [u8; 16] {
    Uuid::parse_str(guid).unwrap().to_bytes_le()
}

#[test]
fn test_pe_hidden_behind_dos_header() {
    assert_eq!(fileinfo_bytes(&pe_stub(0x8664, 0x0002)).type_tag(), "executable/windows/pe64");
    assert_eq!(fileinfo_bytes(&pe_stub(0x8664, 0x2002)).type_tag(), "executable/windows/dll64");
    assert_eq!(fileinfo_bytes(&pe_stub(0x014c, 0x0102)).type_tag(), "executable/windows/pe32");
}

#[test]
fn test_plain_dos_stays_dos() {
    // neither DLL nor executable image
    assert_eq!(fileinfo_bytes(&pe_stub(0x014c, 0x0100)).type_tag(), "executable/windows/dos");
    let mut truncated = b"MZ".to_vec();
    truncated.resize(0x20, 0);
    assert_eq!(fileinfo_bytes(&truncated).type_tag(), "executable/windows/dos");
}

#[test]
fn test_zip_family() {
    let apk = zip_with(&["META-INF/MANIFEST.MF", "AndroidManifest.xml", "classes.dex"]);
    assert_eq!(fileinfo_bytes(&apk).type_tag(), "android/apk");

    let ipa = zip_with(&["Payload/Demo.app/Info.plist", "Payload/Demo.app/Demo"]);
    assert_eq!(fileinfo_bytes(&ipa).type_tag(), "ios/ipa");

    let xlsx = zip_with(&["[Content_Types].xml", "_rels/.rels", "xl/workbook.xml"]);
    assert_eq!(fileinfo_bytes(&xlsx).type_tag(), "document/office/excel");

    let jar = zip_with(&["META-INF/MANIFEST.MF", "a/A.class", "a/B.class"]);
    assert_eq!(fileinfo_bytes(&jar).type_tag(), "java/jar");

    let plain = zip_with(&["readme.txt", "data.bin"]);
    assert_eq!(fileinfo_bytes(&plain).type_tag(), "archive/zip");
}

#[test]
fn test_zip_from_disk() {
    let docx = zip_with(&["[Content_Types].xml", "docProps/core.xml", "word/document.xml"]);
    let (_dir, path) = write_temp("report.docx", &docx);
    let info = fileinfo(&path).unwrap();
    assert_eq!(info.type_tag(), "document/office/word");
    assert_eq!(info.size, docx.len() as u64);
}

#[test]
fn test_ole_clsid_names_application() {
    let doc = ole_with_clsid(clsid("00020906-0000-0000-C000-000000000046"), &[]);
    let info = fileinfo_bytes(&doc);
    assert_eq!(info.type_tag(), "document/office/word");
    assert!(info
        .ident
        .descriptive_label
        .as_deref()
        .unwrap()
        .starts_with("Composite Document File"));
}

#[test]
fn test_ole_zeroed_clsid_with_details_is_quarantine() {
    let q = ole_with_clsid([0u8; 16], &[dir_entry("Details", 2, 1, 100)]);
    assert_eq!(fileinfo_bytes(&q).type_tag(), "quarantine/mcafee");
}

#[test]
fn test_ole_unknown_clsid_stays_unknown_office() {
    let doc = ole_with_clsid([0x11; 16], &[]);
    assert_eq!(fileinfo_bytes(&doc).type_tag(), "document/office/unknown");
}

#[test]
fn test_encrypted_office_document() {
    let info = fileinfo_bytes(&encrypted_word());
    assert_eq!(info.type_tag(), "document/office/passwordprotected");
    assert_eq!(info.ident.mime_guess.as_deref(), Some("application/CDFV2"));
}

#[test]
fn test_unencrypted_word_document() {
    let doc = compound_file(
        &[dir_entry("Root Entry", 5, 0, 0), dir_entry("WordDocument", 2, 1, 0x2000)],
        &[vec![0xec, 0xa5]],
    );
    assert_eq!(fileinfo_bytes(&doc).type_tag(), "document/office/word");
}

#[test]
fn test_pdf_markers() {
    let enc = b"%PDF-1.6\n1 0 obj\n<</Encrypt 2 0 R>>\nendobj\n%%EOF\n";
    assert_eq!(fileinfo_bytes(enc).type_tag(), "document/pdf/passwordprotected");

    let portfolio = b"%PDF-1.7\n1 0 obj\n<</Type/Catalog/Collection 3 0 R>>\nendobj\n";
    assert_eq!(fileinfo_bytes(portfolio).type_tag(), "document/pdf/portfolio");

    let plain = b"%PDF-1.4\n1 0 obj\n<</Type/Catalog>>\nendobj\n";
    assert_eq!(fileinfo_bytes(plain).type_tag(), "document/pdf");
}

#[test]
fn test_cart_declared_type() {
    let data = cart(
        &json!({"name": "sample.exe"}),
        &json!({"al": {"type": "executable/windows/pe32"}}),
    );
    assert_eq!(fileinfo_bytes(&data).type_tag(), "executable/windows/pe32");

    let untyped = cart(&json!({"name": "sample"}), &json!({}));
    assert_eq!(fileinfo_bytes(&untyped).type_tag(), "archive/cart");
}

#[test]
fn test_cart_declared_type_is_sanitized() {
    let double = cart(&json!({}), &json!({"al": {"type": "unknown/unknown"}}));
    assert_eq!(fileinfo_bytes(&double).type_tag(), "unknown");

    let blank = cart(&json!({}), &json!({"al": {"type": ""}}));
    assert_eq!(fileinfo_bytes(&blank).type_tag(), "archive/cart");
}

#[test]
fn test_corrupted_cart() {
    let mut data = cart(&json!({"al": {"type": "document/pdf"}}), &json!({}));
    let n = data.len();
    data.truncate(n - 10);
    assert_eq!(fileinfo_bytes(&data).type_tag(), "corrupted/cart");
    assert_eq!(fileinfo_bytes(b"CART").type_tag(), "corrupted/cart");
}

#[test]
fn test_script_language_guess_from_disk() {
    let src = b"import os\nimport sys\n\ndef main():\n    print(sys.argv)\n\nif __name__ == '__main__':\n    main()\n";
    let (_dir, path) = write_temp("tool.py", src);
    assert_eq!(fileinfo(&path).unwrap().type_tag(), "code/python");
}
