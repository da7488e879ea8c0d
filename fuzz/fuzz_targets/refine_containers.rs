#![no_main]
use filetriage::ident::io::Subject;
use filetriage::ident::refiners::{cart_ident, dos_ident, CartReader, OfficeEncryptionProbe};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let subject = Subject::Bytes(data);
    let _ = dos_ident(&subject);
    let _ = cart_ident(&CartReader::default(), &subject);
    let _ = OfficeEncryptionProbe::probe_bytes(data);
    let _ = filetriage::ident::refiners::ole_guid_lookup(data);
});
