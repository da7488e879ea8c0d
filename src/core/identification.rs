//! Identification records produced by the pipeline.

use crate::error::IdentifyError;
use crate::ident::preview::dotdump;
use crate::ident::tables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag used when nothing better is known.
pub const UNKNOWN_TAG: &str = "unknown";

/// Tag trimmed, with the double unknown collapsed. `None` when blank.
///
/// Tags can come from file content (CaRT metadata, `custom:` labels), so
/// every final tag passes through here.
pub fn canonical_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else if tag.eq_ignore_ascii_case("unknown/unknown") {
        Some(UNKNOWN_TAG.to_string())
    } else {
        Some(tag.to_string())
    }
}

/// Result of identifying a single buffer.
///
/// Serialized with the flat field names used downstream
/// (`ascii`, `hex`, `magic`, `mime`, `type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentificationResult {
    /// First bytes, non-printables replaced by `.`
    #[serde(rename = "ascii")]
    pub ascii_preview: Option<String>,
    /// Hex of the same bytes
    #[serde(rename = "hex")]
    pub hex_preview: Option<String>,
    /// Descriptive labels from the signature scan joined with `" | "`
    #[serde(rename = "magic")]
    pub descriptive_label: Option<String>,
    /// First non-empty MIME guess
    #[serde(rename = "mime")]
    pub mime_guess: Option<String>,
    /// Hierarchical slash-separated content type
    #[serde(rename = "type")]
    pub type_tag: String,
}

impl Default for IdentificationResult {
    fn default() -> Self {
        Self {
            ascii_preview: None,
            hex_preview: None,
            descriptive_label: None,
            mime_guess: None,
            type_tag: UNKNOWN_TAG.to_string(),
        }
    }
}

impl IdentificationResult {
    /// Flat field-name → string mapping; absent fields map to `"None"`.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
        m.insert("ascii".to_string(), opt(&self.ascii_preview));
        m.insert("hex".to_string(), opt(&self.hex_preview));
        m.insert("magic".to_string(), opt(&self.descriptive_label));
        m.insert("mime".to_string(), opt(&self.mime_guess));
        m.insert("type".to_string(), self.type_tag.clone());
        m
    }
}

/// Full record for a file: identification plus digests and fuzzy hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(flatten)]
    pub ident: IdentificationResult,
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub entropy: f64,
    /// Fuzzy hash; empty when disabled
    pub ssdeep: String,
}

/// Column order of the tab-separated summary line.
pub const SUMMARY_FIELDS: [&str; 11] = [
    "type", "ascii", "entropy", "hex", "magic", "mime", "md5", "sha1", "sha256", "ssdeep", "size",
];

impl FileInfo {
    pub fn type_tag(&self) -> &str {
        &self.ident.type_tag
    }

    /// Conventional file extension for the resolved type, if any.
    pub fn suggested_extension(&self) -> Option<&'static str> {
        tables::tag_to_extension(&self.ident.type_tag)
    }

    /// Flat field-name → string mapping for logging and pipeline handoff.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        let mut m = self.ident.to_flat_map();
        m.insert("size".to_string(), self.size.to_string());
        m.insert("md5".to_string(), self.md5.clone());
        m.insert("sha1".to_string(), self.sha1.clone());
        m.insert("sha256".to_string(), self.sha256.clone());
        m.insert("entropy".to_string(), self.entropy.to_string());
        m.insert("ssdeep".to_string(), self.ssdeep.clone());
        m
    }

    /// One tab-separated line in `SUMMARY_FIELDS` order, each value dot-dumped.
    pub fn summary_line(&self) -> String {
        let flat = self.to_flat_map();
        SUMMARY_FIELDS
            .iter()
            .map(|k| dotdump(flat.get(*k).map(String::as_str).unwrap_or("None").as_bytes()))
            .collect::<Vec<_>>()
            .join("\t")
    }

    pub fn to_json_string(&self) -> Result<String, IdentifyError> {
        serde_json::to_string(self)
            .map_err(|e| IdentifyError::Serialization(format!("JSON serialization error: {}", e)))
    }

    pub fn from_json_str(json_str: &str) -> Result<Self, IdentifyError> {
        serde_json::from_str(json_str)
            .map_err(|e| IdentifyError::Serialization(format!("JSON deserialization error: {}", e)))
    }
}
