//! Public entry points: `ident` for a buffer, `fileinfo` for a file.

use crate::core::identification::{canonical_tag, FileInfo, IdentificationResult, UNKNOWN_TAG};
use crate::error::Result;
use crate::hashing::{digest_reader, Digests};
use crate::ident::cascade;
use crate::ident::config::IdentifyConfig;
use crate::ident::io::Subject;
use crate::ident::normalize::normalize;
use crate::ident::overrides;
use crate::ident::preview::{dotdump, hex_preview, safe_str};
use crate::ident::refiners::{self, ole_guid_lookup, Collaborators};
use crate::ident::sniffers::{ScanTarget, SignalAdapter};
use crate::ident::tables;
use crate::similarity::ctph_hash;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Identification pipeline: scanner handles, collaborators and config.
///
/// One instance can be shared across threads; only the two scanner handles
/// are serialized.
#[derive(Debug)]
pub struct Identifier {
    config: IdentifyConfig,
    adapter: SignalAdapter,
    collab: Collaborators,
}

impl Default for Identifier {
    fn default() -> Self {
        Self::new(IdentifyConfig::default())
    }
}

impl Identifier {
    /// Built-in scanner and collaborators.
    ///
    /// Panics if a static pattern table is malformed.
    pub fn new(config: IdentifyConfig) -> Self {
        Self::with_adapter(config, SignalAdapter::builtin())
    }

    pub fn with_adapter(config: IdentifyConfig, adapter: SignalAdapter) -> Self {
        let collab = Collaborators::from_config(&config);
        Self::with_parts(config, adapter, collab)
    }

    pub fn with_parts(config: IdentifyConfig, adapter: SignalAdapter, collab: Collaborators) -> Self {
        tables::ensure_loaded();
        Self {
            config,
            adapter,
            collab,
        }
    }

    pub fn config(&self) -> &IdentifyConfig {
        &self.config
    }

    /// Identify the first `length` bytes of `buf`.
    ///
    /// `path`, when given, is handed to the scanner. Never fails: the worst
    /// case is an `unknown` tag with empty label fields.
    pub fn ident(&self, buf: &[u8], length: usize, path: Option<&Path>) -> IdentificationResult {
        let mut data = IdentificationResult::default();
        let buf = &buf[..length.min(buf.len())];
        if buf.is_empty() {
            return data;
        }

        let header = &buf[..buf.len().min(self.config.preview_len)];
        data.ascii_preview = Some(dotdump(header));
        data.hex_preview = Some(hex_preview(header));

        let mut signals = self.adapter.acquire(&ScanTarget { path, head: buf });
        normalize(&mut signals);

        if !signals.labels.is_empty() {
            data.descriptive_label = Some(safe_str(&signals.labels.join(&b" | "[..])));
        }
        data.mime_guess = signals
            .mimes
            .iter()
            .find(|m| !m.is_empty())
            .map(|m| safe_str(m));

        data.type_tag = match overrides::resolve(&signals.labels, &signals.mimes) {
            Some(o) => o.into_tag(),
            None => cascade::resolve(&signals.labels).tag,
        };

        if data.type_tag == UNKNOWN_TAG
            && data.mime_guess.as_deref().is_some_and(|m| m.starts_with("text/"))
        {
            data.type_tag = refiners::language::TEXT_TAG.to_string();
        }

        if data.type_tag == "document/office/unknown" {
            if let Some(tag) = ole_guid_lookup(buf) {
                data.type_tag = tag.to_string();
            }
        }

        data.type_tag = canonical_tag(&data.type_tag).unwrap_or_else(|| UNKNOWN_TAG.to_string());
        debug!(tag = %data.type_tag, magic = ?data.descriptive_label, mime = ?data.mime_guess, "ident");
        data
    }

    fn fuzzy_hash(&self, subject: &Subject<'_>) -> String {
        let sim = &self.config.similarity;
        if !sim.enable_ctph {
            return String::new();
        }
        match subject.read_bounded(&self.config.io.limits()) {
            Ok(content) => ctph_hash(&content, &sim.ctph()),
            Err(e) => {
                warn!("fuzzy hash skipped: {}", e);
                String::new()
            }
        }
    }

    fn assemble<R: Read>(&self, reader: &mut R, subject: Subject<'_>) -> Result<FileInfo> {
        let mut ident = None;
        let Digests {
            md5,
            sha1,
            sha256,
            entropy,
            size,
        } = digest_reader(reader, self.config.io.first_block_size, |block| {
            ident = Some(self.ident(block, block.len(), subject.path()));
        })?;
        let mut ident = ident.unwrap_or_default();
        let ssdeep = self.fuzzy_hash(&subject);
        ident.type_tag = refiners::refine(&ident, size, &subject, &self.collab, &self.config);

        Ok(FileInfo {
            ident,
            size,
            md5,
            sha1,
            sha256,
            entropy,
            ssdeep,
        })
    }

    /// Full record for a file on disk.
    ///
    /// Errors only when the file cannot be read at all.
    pub fn fileinfo<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo> {
        let path = path.as_ref();
        let span = crate::span_trace!("fileinfo", path = %path.display());
        let _guard = span.enter();

        let mut file = File::open(path)?;
        info!("classifying file");
        let info = self.assemble(&mut file, Subject::Path(path))?;
        info!(size = info.size, tag = %info.ident.type_tag, "classified");
        Ok(info)
    }

    /// Full record for an in-memory buffer.
    pub fn fileinfo_bytes(&self, data: &[u8]) -> FileInfo {
        let span = crate::span_trace!("fileinfo", path = "<memory>", size = data.len());
        let _guard = span.enter();

        let mut cursor = Cursor::new(data);
        match self.assemble(&mut cursor, Subject::Bytes(data)) {
            Ok(info) => info,
            // reading from memory cannot fail; keep a record anyway
            Err(e) => {
                warn!("in-memory classification failed: {}", e);
                FileInfo {
                    ident: IdentificationResult::default(),
                    size: data.len() as u64,
                    md5: crate::hashing::md5_digest(data),
                    sha1: crate::hashing::sha1_digest(data),
                    sha256: crate::hashing::sha256_digest(data),
                    entropy: crate::entropy::shannon_entropy(data),
                    ssdeep: String::new(),
                }
            }
        }
    }
}

static GLOBAL: Lazy<Identifier> = Lazy::new(Identifier::default);

/// Process-wide identifier with default configuration.
pub fn global() -> &'static Identifier {
    &GLOBAL
}

/// [`Identifier::ident`] on the process-wide identifier.
pub fn ident(buf: &[u8], length: usize, path: Option<&Path>) -> IdentificationResult {
    global().ident(buf, length, path)
}

/// [`Identifier::fileinfo`] on the process-wide identifier.
pub fn fileinfo<P: AsRef<Path>>(path: P) -> Result<FileInfo> {
    global().fileinfo(path)
}

/// [`Identifier::fileinfo_bytes`] on the process-wide identifier.
pub fn fileinfo_bytes(data: &[u8]) -> FileInfo {
    global().fileinfo_bytes(data)
}
