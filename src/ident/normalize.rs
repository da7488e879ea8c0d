//! Label reordering.
//!
//! Scanners sometimes rank a generic label ahead of a more specific one
//! from the same scan. Known specific substrings are promoted to the front
//! so later stages see them first.

use crate::ident::sniffers::Signals;
use memchr::memmem;
use tracing::debug;

/// A substring whose first carrier is promoted to the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCase {
    pub needle: &'static [u8],
    /// Apply the same move to the MIME list when both lists line up
    pub reorder_mime: bool,
}

/// Promotion cases, applied in this order.
pub const SPECIAL_CASES: &[SpecialCase] = &[
    SpecialCase {
        needle: b"OLE 2 Compound Document : Microsoft Word Document",
        reorder_mime: false,
    },
    SpecialCase {
        needle: b"Lotus 1-2-3 WorKsheet",
        reorder_mime: true,
    },
];

/// Apply [`SPECIAL_CASES`] to `signals` in place.
pub fn normalize(signals: &mut Signals) {
    normalize_with(SPECIAL_CASES, &mut signals.labels, &mut signals.mimes);
}

/// Apply `cases` in order; for each, the first label containing the needle
/// moves to index 0.
pub fn normalize_with(cases: &[SpecialCase], labels: &mut Vec<Vec<u8>>, mimes: &mut Vec<Vec<u8>>) {
    for case in cases {
        let Some(index) = labels
            .iter()
            .position(|l| memmem::find(l, case.needle).is_some())
        else {
            continue;
        };
        let label = labels.remove(index);
        labels.insert(0, label);
        if case.reorder_mime && labels.len() == mimes.len() {
            let mime = mimes.remove(index);
            mimes.insert(0, mime);
        }
        debug!(index, reorder_mime = case.reorder_mime, "promoted special-case label");
    }
}
