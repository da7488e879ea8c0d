//! PDF encryption and portfolio markers.

use crate::error::Result;
use crate::ident::io::{IOLimits, Subject};
use memchr::memmem;
use tracing::debug;

pub const PDF_TAG: &str = "document/pdf";
pub const PASSWORD_PROTECTED_TAG: &str = "document/pdf/passwordprotected";
pub const PORTFOLIO_TAG: &str = "document/pdf/portfolio";

/// Refine from raw PDF bytes. `/Encrypt` wins over a portfolio catalog.
pub fn classify_pdf_bytes(data: &[u8]) -> &'static str {
    if memmem::find(data, b"/Encrypt").is_some() {
        PASSWORD_PROTECTED_TAG
    } else if memmem::find(data, b"/Type/Catalog/Collection").is_some() {
        PORTFOLIO_TAG
    } else {
        PDF_TAG
    }
}

/// Scan up to `limits.max_read_bytes` of the subject.
pub fn pdf_ident(subject: &Subject<'_>, limits: &IOLimits) -> Result<&'static str> {
    let data = subject.read_bounded(limits)?;
    let tag = classify_pdf_bytes(&data);
    debug!(scanned = data.len(), tag, "pdf markers");
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(
            classify_pdf_bytes(b"%PDF-1.4\n1 0 obj<</Encrypt 5 0 R>>"),
            PASSWORD_PROTECTED_TAG
        );
        assert_eq!(
            classify_pdf_bytes(b"%PDF-1.7\n<</Type/Catalog/Collection 3 0 R>>"),
            PORTFOLIO_TAG
        );
        assert_eq!(
            classify_pdf_bytes(b"%PDF-1.7 /Type/Catalog/Collection /Encrypt"),
            PASSWORD_PROTECTED_TAG
        );
        // spacing variants are not recognised
        assert_eq!(classify_pdf_bytes(b"%PDF-1.7 /Type /Catalog /Collection"), PDF_TAG);
    }

    #[test]
    fn test_read_limit_applies() {
        let data = b"%PDF-1.4 ............ /Encrypt";
        let limits = IOLimits {
            max_read_bytes: 10,
            max_file_size: 1 << 20,
        };
        assert_eq!(pdf_ident(&Subject::Bytes(data), &limits).unwrap(), PDF_TAG);
        assert_eq!(
            pdf_ident(&Subject::Bytes(data), &IOLimits::default()).unwrap(),
            PASSWORD_PROTECTED_TAG
        );
    }
}
