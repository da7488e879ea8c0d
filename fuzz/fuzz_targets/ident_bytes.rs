#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    let r = filetriage::ident(data, data.len(), Some(Path::new("<fuzz>")));
    assert_ne!(r.type_tag, "unknown/unknown");
    let _ = filetriage::fileinfo_bytes(data);
});
