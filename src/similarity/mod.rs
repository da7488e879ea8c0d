//! Fuzzy hashing (context-triggered piecewise hashing).
//!
//! Fills the `ssdeep` slot of the file-info record. A rolling hash over a
//! small window triggers piece boundaries; each piece contributes a short
//! BLAKE3-XOF hex fragment. The digest is
//! `"<window>:<modulus>:<block1>:<block2>:..."` and two digests compare by
//! Jaccard similarity over their blocks. The trigger modulus grows with the
//! input so the digest stays short.

use std::collections::{HashSet, VecDeque};

/// CTPH parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtphConfig {
    pub window_size: usize,
    pub digest_size: usize,
    /// Rolling hash width in bits: 8, 16, 32 or 64.
    pub precision: u8,
}

impl Default for CtphConfig {
    fn default() -> Self {
        Self {
            window_size: 8,
            digest_size: 4,
            precision: 8,
        }
    }
}

/// Rolling sum-and-rotate hash over a fixed window, truncated to `mask`.
struct RollingHash {
    window: VecDeque<u64>,
    window_size: usize,
    bits: u32,
    mask: u64,
    hash: u64,
}

impl RollingHash {
    fn new(window_size: usize, precision: u8) -> Self {
        let bits = match precision {
            16 => 16,
            32 => 32,
            64 => 64,
            _ => 8,
        };
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            bits,
            mask,
            hash: 0,
        }
    }

    fn rotl(&self, v: u64) -> u64 {
        ((v << 1) | (v >> (self.bits - 1))) & self.mask
    }

    fn update(&mut self, byte: u8) {
        if self.window.len() == self.window_size {
            if let Some(old) = self.window.pop_front() {
                self.hash = self.hash.wrapping_sub(old) & self.mask;
            }
        }
        self.window.push_back(byte as u64);
        self.hash = self.rotl(self.hash.wrapping_add(byte as u64) & self.mask);
    }
}

/// Upper bound on pieces per digest; the last piece absorbs the remainder.
pub const MAX_PIECES: usize = 64;

fn finish_piece(hasher: &mut blake3::Hasher, out_len: usize) -> String {
    let mut out = vec![0u8; out_len];
    hasher.finalize_xof().fill(&mut out);
    hasher.reset();
    hex::encode(out)
}

/// Trigger modulus for an input of `len` bytes: `digest_size`, doubled
/// until the expected piece count fits in [`MAX_PIECES`].
pub fn trigger_modulus(len: usize, digest_size: usize) -> u64 {
    let mut modulus = digest_size.max(1) as u64;
    while (len as u64) / modulus > MAX_PIECES as u64 && modulus < u64::MAX / 2 {
        modulus *= 2;
    }
    modulus
}

/// Compute the CTPH digest for `data`.
///
/// The digest holds at most [`MAX_PIECES`] pieces whatever the input
/// size. The second header field is the trigger modulus, so digests of
/// inputs of very different sizes do not compare.
pub fn ctph_hash(data: &[u8], cfg: &CtphConfig) -> String {
    let group = cfg.digest_size.max(1);
    let modulus = trigger_modulus(data.len(), cfg.digest_size);
    let piece_len = match cfg.precision {
        16 => 2,
        32 | 64 => 4,
        _ => 1,
    };
    // a narrow rolling hash cannot reach a large modulus; cut by length too
    let max_piece = (64 * cfg.window_size.max(1)).max(usize::try_from(modulus).unwrap_or(usize::MAX));

    let mut rolling = RollingHash::new(cfg.window_size, cfg.precision);
    let mut pieces: Vec<String> = Vec::new();
    let mut piece = blake3::Hasher::new();
    let mut cur_len = 0usize;

    for (i, &b) in data.iter().enumerate() {
        rolling.update(b);
        piece.update(&[b]);
        cur_len += 1;
        let last_slot = pieces.len() + 1 >= MAX_PIECES;
        let more = i + 1 < data.len();
        if more && !last_slot && (rolling.hash % modulus == modulus - 1 || cur_len >= max_piece) {
            pieces.push(finish_piece(&mut piece, piece_len));
            cur_len = 0;
        }
    }
    if cur_len > 0 {
        pieces.push(finish_piece(&mut piece, piece_len));
    }
    let blocks: Vec<String> = pieces.chunks(group).map(|c| c.concat()).collect();
    format!("{}:{}:{}", cfg.window_size, modulus, blocks.join(":"))
}

/// Compare two CTPH digests using Jaccard similarity over piece blocks.
pub fn ctph_similarity(a: &str, b: &str) -> f64 {
    let at: Vec<&str> = a.split(':').collect();
    let bt: Vec<&str> = b.split(':').collect();
    if at.len() < 3 || bt.len() < 3 {
        return 0.0;
    }
    if at[0] != bt[0] || at[1] != bt[1] {
        return 0.0;
    }
    let as_: HashSet<&str> = at[2..].iter().copied().collect();
    let bs: HashSet<&str> = bt[2..].iter().copied().collect();
    let inter = as_.intersection(&bs).count();
    let union = as_.union(&bs).count();
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}
