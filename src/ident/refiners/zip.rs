//! Zip member-name classification.
//!
//! Distinguishes Android and iOS packages, Java archives and OOXML office
//! documents from plain zip archives by the names of their members.
//! Listing uses the `zip` crate; when it cannot open the archive and the
//! subject lives on disk, `unzip -l` output is parsed instead.

use crate::error::{IdentifyError, Result};
use crate::ident::config::ZipConfig;
use crate::ident::io::Subject;
use crate::ident::preview::safe_str;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Member-name signals gathered from one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipMarkers {
    pub total_files: usize,
    pub total_class: usize,
    pub total_jar: usize,
    pub jar_manifest: bool,
    pub android_manifest: bool,
    pub android_dex: bool,
    pub ipa: bool,
    pub word: bool,
    pub excel: bool,
    pub powerpoint: bool,
    pub doc_props: bool,
    pub doc_rels: bool,
    pub content_types: bool,
}

impl ZipMarkers {
    /// Scan member names. Each name feeds at most one marker.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut m = Self::default();
        for name in names {
            let name = name.as_ref();
            if name.get(..8) == Some("META-INF") && name.get(9..) == Some("MANIFEST.MF") {
                m.jar_manifest = true;
            } else if name == "AndroidManifest.xml" {
                m.android_manifest = true;
            } else if name == "classes.dex" {
                m.android_dex = true;
            } else if name.starts_with("Payload/") && name.ends_with(".app/Info.plist") {
                m.ipa = true;
            } else if name.ends_with(".class") {
                m.total_class += 1;
            } else if name.ends_with(".jar") {
                m.total_jar += 1;
            } else if name.starts_with("word/") {
                m.word = true;
            } else if name.starts_with("xl/") {
                m.excel = true;
            } else if name.starts_with("ppt/") {
                m.powerpoint = true;
            } else if name.starts_with("docProps/") {
                m.doc_props = true;
            } else if name.starts_with("_rels/") {
                m.doc_rels = true;
            } else if name == "[Content_Types].xml" {
                m.content_types = true;
            }
            m.total_files += 1;
        }
        m
    }

    /// Java content dominates: class and jar members outnumber half the
    /// listing.
    pub fn mostly_java(&self) -> bool {
        self.total_files > 0 && self.total_files < (self.total_class + self.total_jar) * 2
    }

    pub fn classify(&self) -> &'static str {
        let jar = self.jar_manifest || self.mostly_java();
        if jar && self.android_manifest && self.android_dex {
            "android/apk"
        } else if self.ipa {
            "ios/ipa"
        } else if jar {
            "java/jar"
        } else if (self.doc_props || self.doc_rels) && self.content_types {
            if self.word {
                "document/office/word"
            } else if self.excel {
                "document/office/excel"
            } else if self.powerpoint {
                "document/office/powerpoint"
            } else {
                "document/office/unknown"
            }
        } else {
            "archive/zip"
        }
    }
}

/// Member names using the zip reader.
pub fn list_with_reader(subject: &Subject<'_>) -> Result<Vec<String>> {
    let reader = subject.open()?;
    let archive = ::zip::ZipArchive::new(reader)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Member names from `<program> -l <path>`.
pub fn list_with_unzip(path: &Path, program: &str) -> Result<Vec<String>> {
    let output = Command::new(program)
        .arg("-l")
        .arg(path)
        .output()
        .map_err(|e| IdentifyError::Archive(format!("failed to run {}: {}", program, e)))?;
    parse_unzip_listing(&output.stdout)
}

/// Parse `unzip -l` output: the `Name` column position comes from the
/// header line, members sit between the dashed rule and the totals.
pub fn parse_unzip_listing(stdout: &[u8]) -> Result<Vec<String>> {
    let lines: Vec<&[u8]> = stdout
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .collect();
    // trailing newline leaves an empty final element
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => &lines[..],
    };
    let header = lines
        .get(1)
        .ok_or_else(|| IdentifyError::Archive("unzip listing too short".to_string()))?;
    let column = memchr::memmem::find(header, b"Name")
        .ok_or_else(|| IdentifyError::Archive("unzip listing has no Name column".to_string()))?;
    let end = lines.len().saturating_sub(2);
    if end <= 3 {
        return Ok(Vec::new());
    }
    Ok(lines[3..end]
        .iter()
        .map(|l| safe_str(l.get(column..).unwrap_or_default()))
        .collect())
}

/// Member names, trying the reader first and the external lister second.
pub fn list_members(subject: &Subject<'_>, cfg: &ZipConfig) -> Result<Vec<String>> {
    match list_with_reader(subject) {
        Ok(names) => Ok(names),
        Err(e) => {
            debug!("zip reader failed: {}", e);
            match subject.path() {
                Some(path) if cfg.unzip_fallback => list_with_unzip(path, &cfg.unzip_program),
                _ => Err(e),
            }
        }
    }
}

/// Refine a zip-family tag; any listing failure returns `fallback`.
pub fn zip_ident(subject: &Subject<'_>, fallback: &str, cfg: &ZipConfig) -> String {
    match list_members(subject, cfg) {
        Ok(names) => {
            let markers = ZipMarkers::from_names(&names);
            let tag = markers.classify();
            debug!(members = names.len(), tag, "zip listing classified");
            tag.to_string()
        }
        Err(e) => {
            warn!("zip listing failed, keeping {}: {}", fallback, e);
            fallback.to_string()
        }
    }
}
