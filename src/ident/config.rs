//! Configuration for the identification pipeline.
//!
//! Every section has defaults, so a JSON file only needs the keys it wants
//! to change.

use crate::error::{IdentifyError, Result};
use crate::ident::io::IOLimits;
use crate::similarity::CtphConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for the identification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    /// I/O limits for file reading.
    pub io: IOConfig,
    /// Fuzzy hash (`ssdeep` field) configuration.
    pub similarity: SimilarityConfig,
    /// Zip listing configuration.
    pub zip: ZipConfig,
    /// CaRT container configuration.
    pub cart: CartConfig,
    /// Language fallback configuration.
    pub language: LanguageConfig,
    /// Bytes shown in the ascii/hex previews.
    pub preview_len: usize,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            io: IOConfig::default(),
            similarity: SimilarityConfig::default(),
            zip: ZipConfig::default(),
            cart: CartConfig::default(),
            language: LanguageConfig::default(),
            preview_len: 64,
        }
    }
}

impl IdentifyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.io.first_block_size == 0 {
            return Err(IdentifyError::Configuration(
                "io.first_block_size must be positive".to_string(),
            ));
        }
        if !matches!(self.similarity.precision, 8 | 16 | 32 | 64) {
            return Err(IdentifyError::Configuration(format!(
                "similarity.precision must be 8, 16, 32 or 64, got {}",
                self.similarity.precision
            )));
        }
        self.cart.private_key_bytes()?;
        Ok(())
    }
}

/// I/O configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Leading bytes handed to signature scanning and previews
    pub first_block_size: usize,
    /// Cap on bytes read by whole-content refiners and the fuzzy hash
    pub max_read_bytes: u64,
    /// Whole-content refiners skip files larger than this
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            first_block_size: crate::hashing::DEFAULT_BLOCK_SIZE,
            max_read_bytes: 100 * 1024 * 1024,
            max_file_size: 1024 * 1024 * 1024,
        }
    }
}

impl IOConfig {
    pub fn limits(&self) -> IOLimits {
        IOLimits {
            max_read_bytes: self.max_read_bytes,
            max_file_size: self.max_file_size,
        }
    }
}

/// Similarity (CTPH) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Compute the fuzzy hash; the `ssdeep` field is empty otherwise
    pub enable_ctph: bool,
    pub window_size: usize,
    pub digest_size: usize,
    /// Rolling hash precision (8,16,32,64)
    pub precision: u8,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            enable_ctph: true,
            window_size: 8,
            digest_size: 4,
            precision: 8,
        }
    }
}

impl SimilarityConfig {
    pub fn ctph(&self) -> CtphConfig {
        CtphConfig {
            window_size: self.window_size,
            digest_size: self.digest_size,
            precision: self.precision,
        }
    }
}

/// Zip listing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipConfig {
    /// Shell out to an external lister when the zip reader fails
    pub unzip_fallback: bool,
    /// Program invoked as `<program> -l <path>`
    pub unzip_program: String,
}

impl Default for ZipConfig {
    fn default() -> Self {
        Self {
            unzip_fallback: true,
            unzip_program: "unzip".to_string(),
        }
    }
}

/// CaRT container configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Hex-encoded 16-byte RC4 key for containers whose header key is zeroed
    pub private_key: Option<String>,
}

impl CartConfig {
    pub fn private_key_bytes(&self) -> Result<Option<[u8; 16]>> {
        let Some(text) = &self.private_key else {
            return Ok(None);
        };
        let raw = hex::decode(text.trim())
            .map_err(|e| IdentifyError::Configuration(format!("cart.private_key: {}", e)))?;
        let key: [u8; 16] = raw.try_into().map_err(|v: Vec<u8>| {
            IdentifyError::Configuration(format!(
                "cart.private_key must be 16 bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Some(key))
    }
}

/// Language fallback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Leading bytes examined
    pub sample_size: usize,
    /// Minimum indicator score for a code language to win
    pub min_score: u32,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            sample_size: 65536,
            min_score: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = IdentifyConfig::default();
        assert_eq!(cfg.preview_len, 64);
        assert_eq!(cfg.io.first_block_size, 65536);
        assert!(cfg.zip.unzip_fallback);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let cfg = IdentifyConfig::from_json_str(r#"{"zip": {"unzip_fallback": false}}"#).unwrap();
        assert!(!cfg.zip.unzip_fallback);
        assert_eq!(cfg.zip.unzip_program, "unzip");
        assert_eq!(cfg.similarity, SimilarityConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut cfg = IdentifyConfig::default();
        cfg.language.min_score = 7;
        let back = IdentifyConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            IdentifyConfig::from_json_str(r#"{"similarity": {"precision": 12}}"#),
            Err(IdentifyError::Configuration(_))
        ));
        assert!(matches!(
            IdentifyConfig::from_json_str(r#"{"cart": {"private_key": "0011"}}"#),
            Err(IdentifyError::Configuration(_))
        ));
        assert!(matches!(
            IdentifyConfig::from_json_str("not json"),
            Err(IdentifyError::Serialization(_))
        ));
    }

    #[test]
    fn test_private_key_parses() {
        let cart = CartConfig {
            private_key: Some("000102030405060708090a0b0c0d0e0f".to_string()),
        };
        let key = cart.private_key_bytes().unwrap().unwrap();
        assert_eq!(key[15], 0x0f);
    }
}
