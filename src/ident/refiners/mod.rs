//! Format-specific refinement of a provisional tag.
//!
//! Each refiner inspects the content more deeply than signature scanning
//! and may rewrite the tag. Every refiner is exception-safe on its own:
//! a failure keeps the tag it was given.

pub mod cart;
pub mod dos;
pub mod encryption;
pub mod language;
pub mod ole;
pub mod pdf;
pub mod zip;

pub use self::cart::{cart_ident, CartReader, ContainerMetadataExtractor};
pub use self::dos::dos_ident;
pub use self::encryption::{office_encrypted, EncryptionProbe, OfficeEncryptionProbe};
pub use self::language::{guess_language, HeuristicLanguageGuesser, LanguageGuesser};
pub use self::ole::ole_guid_lookup;
pub use self::pdf::pdf_ident;
pub use self::zip::{zip_ident, ZipMarkers};

use crate::core::identification::{canonical_tag, IdentificationResult, UNKNOWN_TAG};
use crate::ident::config::IdentifyConfig;
use crate::ident::io::Subject;
use tracing::{debug, warn};

pub const EMPTY_TAG: &str = "empty";

/// Tags whose content may be a zip with a more specific meaning.
pub const ZIP_CANDIDATES: [&str; 3] = ["archive/zip", "java/jar", "document/office/unknown"];

/// Tags checked for office encryption.
pub const OFFICE_CANDIDATES: [&str; 4] = [
    "document/office/word",
    "document/office/excel",
    "document/office/powerpoint",
    "document/office/unknown",
];

/// Pluggable collaborators used during refinement.
pub struct Collaborators {
    pub container: Box<dyn ContainerMetadataExtractor + Send + Sync>,
    pub encryption: Box<dyn EncryptionProbe + Send + Sync>,
    pub language: Box<dyn LanguageGuesser + Send + Sync>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Built-in implementations configured from `cfg`.
    pub fn from_config(cfg: &IdentifyConfig) -> Self {
        let private_key = cfg.cart.private_key_bytes().unwrap_or_else(|e| {
            warn!("ignoring CaRT private key: {}", e);
            None
        });
        Self {
            container: Box::new(CartReader::new(private_key)),
            encryption: Box::new(OfficeEncryptionProbe::new(cfg.io.limits())),
            language: Box::new(HeuristicLanguageGuesser::new(cfg.language.clone())),
        }
    }
}

fn needs_language_guess(tag: &str) -> bool {
    tag == UNKNOWN_TAG || tag == language::TEXT_TAG || tag.contains(UNKNOWN_TAG)
}

/// Run the refinement chain over a provisional result.
///
/// Order: empty short-circuit; then exactly one of zip listing, CaRT
/// metadata, PE probe or language guess; then office encryption; then PDF
/// markers.
pub fn refine(
    current: &IdentificationResult,
    size: u64,
    subject: &Subject<'_>,
    collab: &Collaborators,
    cfg: &IdentifyConfig,
) -> String {
    if size == 0 {
        return EMPTY_TAG.to_string();
    }

    let provisional = current.type_tag.as_str();
    let mut tag = if ZIP_CANDIDATES.contains(&provisional) {
        zip_ident(subject, provisional, &cfg.zip)
    } else if provisional == cart::ARCHIVE_TAG {
        cart_ident(collab.container.as_ref(), subject)
    } else if provisional == dos::DOS_TAG {
        dos_ident(subject)
    } else if needs_language_guess(provisional) {
        guess_language(collab.language.as_ref(), subject, current, provisional)
    } else {
        provisional.to_string()
    };

    if OFFICE_CANDIDATES.contains(&tag.as_str()) && office_encrypted(collab.encryption.as_ref(), subject) {
        tag = encryption::PASSWORD_PROTECTED_TAG.to_string();
    }

    if tag == pdf::PDF_TAG {
        match pdf_ident(subject, &cfg.io.limits()) {
            Ok(refined) => tag = refined.to_string(),
            Err(e) => warn!("pdf marker scan skipped: {}", e),
        }
    }

    let tag = canonical_tag(&tag).unwrap_or_else(|| UNKNOWN_TAG.to_string());
    if tag != provisional {
        debug!(from = provisional, to = %tag, "refined");
    }
    tag
}
