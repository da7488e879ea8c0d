//! Cryptographic digests and entropy computed in one streaming pass.
//!
//! `digest_reader` walks the input block by block, feeding MD5, SHA-1,
//! SHA-256 and the entropy histogram, and hands the first block to a
//! caller-supplied callback. Identification runs on that first block so the
//! file is only read once for the bulk of the record.

use crate::entropy::Histogram;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Default block size for streaming digests (64KB).
pub const DEFAULT_BLOCK_SIZE: usize = 65536;

/// Digests of a complete input.
#[derive(Debug, Clone, PartialEq)]
pub struct Digests {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub entropy: f64,
    pub size: u64,
}

/// Computes the MD5 digest of the given data as a hex string.
pub fn md5_digest(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Computes the SHA-1 digest of the given data as a hex string.
pub fn sha1_digest(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes the SHA-256 digest of the given data as a hex string.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Fill `buf` from `reader`, tolerating short reads. Returns bytes read.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Stream `reader` to completion, computing digests and entropy.
///
/// `on_first_block` is called exactly once with the first block (empty for
/// empty input) before any further data is read.
pub fn digest_reader<R, F>(reader: &mut R, block_size: usize, on_first_block: F) -> io::Result<Digests>
where
    R: Read,
    F: FnOnce(&[u8]),
{
    let block_size = block_size.max(1);
    let mut md5_ctx = md5::Context::new();
    let mut sha1 = Sha1::new();
    let mut sha256 = Sha256::new();
    let mut hist = Histogram::new();
    let mut buf = vec![0u8; block_size];

    let mut feed = |chunk: &[u8]| {
        md5_ctx.consume(chunk);
        sha1.update(chunk);
        sha256.update(chunk);
        hist.add_slice(chunk);
    };

    let n = read_block(reader, &mut buf)?;
    on_first_block(&buf[..n]);
    feed(&buf[..n]);

    if n == block_size {
        loop {
            let n = read_block(reader, &mut buf)?;
            if n == 0 {
                break;
            }
            feed(&buf[..n]);
        }
    }

    Ok(Digests {
        md5: format!("{:x}", md5_ctx.compute()),
        sha1: hex::encode(sha1.finalize()),
        sha256: format!("{:x}", sha256.finalize()),
        entropy: hist.entropy(),
        size: hist.len(),
    })
}
