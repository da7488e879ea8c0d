//! File-type identification for content-analysis pipelines.
//!
//! Fuses signature-scanner labels, MIME guesses, trusted-MIME and regex
//! pattern tables, and format-specific probes into one hierarchical type
//! tag such as `document/office/word` or `executable/windows/pe64`.

/// Core data types module
pub mod core;
pub mod entropy;
pub mod error;
pub mod hashing;
pub mod ident;
pub mod logging;
pub mod similarity;

pub use crate::core::identification::{FileInfo, IdentificationResult};
pub use crate::error::{IdentifyError, Result};
pub use crate::ident::api::{fileinfo, fileinfo_bytes, ident, Identifier};
pub use crate::ident::config::IdentifyConfig;
