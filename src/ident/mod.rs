//! Identification pipeline.
//!
//! Raw bytes and an optional path flow through signal acquisition,
//! label normalization, overrides and the pattern cascade into a
//! provisional tag, which the refiners may then rewrite.

pub mod api;
pub mod cascade;
pub mod config;
pub mod io;
pub mod normalize;
pub mod overrides;
pub mod preview;
pub mod refiners;
pub mod sniffers;
pub mod tables;

pub use self::api::{global, Identifier};
pub use self::config::IdentifyConfig;
pub use self::sniffers::{BuiltinScanner, ScanMode, ScanTarget, SignalAdapter, SignatureScanner};
