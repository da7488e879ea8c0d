//! Pattern cascade: descriptive labels to a provisional `top/sub` tag.
//!
//! Each label is matched against the top-level table; the label reaching
//! the lowest index wins, ties going to the earlier label. Later labels are
//! only scanned up to the current best index, and scanning stops once a
//! label hits index 0. The winning label alone decides the sub-type.

use crate::core::identification::UNKNOWN_TAG;
use crate::ident::preview::dotdump;
use crate::ident::tables::{PatternTable, SUBTYPE_PATTERNS, SUBTYPE_TO_TOPLEVEL, TOPLEVEL_PATTERNS};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of a cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cascade {
    /// Index of the winning label, `None` when there were no labels
    pub winner: Option<usize>,
    /// Top-level table index reached by the winner
    pub best_index: usize,
    pub subtype: &'static str,
    pub toplevel: &'static str,
    /// Composed tag, never `unknown/unknown`
    pub tag: String,
}

/// Join top-level and sub-type, collapsing the double unknown.
pub fn compose(toplevel: &str, subtype: &str) -> String {
    if toplevel == UNKNOWN_TAG && subtype == UNKNOWN_TAG {
        UNKNOWN_TAG.to_string()
    } else {
        format!("{}/{}", toplevel, subtype)
    }
}

/// Run the cascade over the built-in tables.
pub fn resolve(labels: &[Vec<u8>]) -> Cascade {
    resolve_with(labels, &TOPLEVEL_PATTERNS, &SUBTYPE_PATTERNS, &SUBTYPE_TO_TOPLEVEL)
}

pub fn resolve_with(
    labels: &[Vec<u8>],
    toplevel: &PatternTable,
    subtypes: &PatternTable,
    subtype_to_toplevel: &HashMap<&'static str, &'static str>,
) -> Cascade {
    let mut best = toplevel.len();
    let mut winner = None;
    let mut subtype = UNKNOWN_TAG;

    for (i, label) in labels.iter().enumerate() {
        let label = dotdump(label);
        let index = toplevel.first_match_within(&label, best);
        if index < best {
            best = index;
            winner = Some(i);
            subtype = subtypes.first_tag(&label);
            if best == 0 {
                break;
            }
        }
    }

    let toplevel_tag = subtype_to_toplevel
        .get(subtype)
        .copied()
        .unwrap_or_else(|| toplevel.tag_at(best));
    let tag = compose(toplevel_tag, subtype);
    debug!(?winner, best_index = best, subtype, toplevel = toplevel_tag, %tag, "cascade resolved");

    Cascade {
        winner,
        best_index: best,
        subtype,
        toplevel: toplevel_tag,
        tag,
    }
}
