//! Operator overrides and trusted MIME types.
//!
//! A `custom: <tag>` label forces the tag outright. Failing that, the first
//! MIME guess found in the trusted table decides. Only when neither applies
//! does the pattern cascade run.

use crate::core::identification::canonical_tag;
use crate::ident::preview::dotdump;
use crate::ident::tables::TRUSTED_MIMES;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static CUSTOM_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^custom: ").expect("valid custom prefix regex"));

/// How an override was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// Forced by a `custom:` label
    Custom(String),
    /// Mapped from a trusted MIME type
    TrustedMime(&'static str),
}

impl Override {
    pub fn tag(&self) -> &str {
        match self {
            Override::Custom(t) => t,
            Override::TrustedMime(t) => t,
        }
    }

    pub fn into_tag(self) -> String {
        match self {
            Override::Custom(t) => t,
            Override::TrustedMime(t) => t.to_string(),
        }
    }
}

/// Tag forced by the first `custom:` label, prefix in any letter case.
/// A label with nothing after the prefix forces nothing.
pub fn custom_tag(labels: &[Vec<u8>]) -> Option<String> {
    labels.iter().find_map(|label| {
        let label = dotdump(label);
        CUSTOM_PREFIX
            .find(&label)
            .and_then(|m| canonical_tag(&label[m.end()..]))
    })
}

/// Tag for the first MIME guess found in the trusted table.
pub fn trusted_mime_tag(mimes: &[Vec<u8>]) -> Option<&'static str> {
    mimes
        .iter()
        .find_map(|mime| TRUSTED_MIMES.get(dotdump(mime).as_str()).copied())
}

/// Custom label first, then trusted MIME.
pub fn resolve(labels: &[Vec<u8>], mimes: &[Vec<u8>]) -> Option<Override> {
    if let Some(tag) = custom_tag(labels) {
        debug!(%tag, "custom label override");
        return Some(Override::Custom(tag));
    }
    if let Some(tag) = trusted_mime_tag(mimes) {
        debug!(tag, "trusted mime override");
        return Some(Override::TrustedMime(tag));
    }
    None
}
