//! Shannon entropy over file content.
//!
//! The identification record carries the entropy of the whole file. It is
//! computed incrementally while the digests stream over the file, so the
//! histogram type here accepts data in arbitrary chunks.
//!
//! # Example
//!
//! ```
//! use filetriage::entropy::{shannon_entropy, Histogram};
//!
//! let mut hist = Histogram::new();
//! hist.add_slice(b"Hello, ");
//! hist.add_slice(b"World!");
//! assert!((hist.entropy() - shannon_entropy(b"Hello, World!")).abs() < 1e-12);
//! ```

pub mod core;

pub use self::core::{shannon_entropy, Histogram};
