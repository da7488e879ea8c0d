//! Core data types for filetriage.
//!
//! Records produced by the identification pipeline and handed to callers.

pub mod identification;

pub use self::identification::{
    canonical_tag, FileInfo, IdentificationResult, SUMMARY_FIELDS, UNKNOWN_TAG,
};
