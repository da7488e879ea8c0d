//! Signal acquisition: descriptive labels and MIME guesses for a file.
//!
//! A [`SignatureScanner`] produces raw, newline-separated scanner output in
//! one of two modes. [`SignalAdapter`] owns one scanner handle per mode, each
//! behind its own mutex, and turns the raw output into cleaned label lists.
//! Scanner failures never leave the adapter: they are logged and surface as
//! empty lists.
//!
//! [`BuiltinScanner`] is the default scanner. It recognises common formats
//! from their magic bytes and emits labels worded like libmagic's so the
//! pattern tables apply unchanged; `infer` supplies MIME types for anything
//! it does not know itself.

use crate::error::{IdentifyError, Result};
use memchr::memmem;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Output mode of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// Human-readable descriptive labels, all plausible matches
    Describe,
    /// MIME types, one per plausible match
    Mime,
}

/// What a scanner looks at.
#[derive(Debug, Clone, Copy)]
pub struct ScanTarget<'a> {
    /// Path on disk, for scanners that read the file themselves
    pub path: Option<&'a Path>,
    /// Leading bytes of the content
    pub head: &'a [u8],
}

/// A signature-matching backend.
///
/// Implementations return raw output: one match per line, continuation
/// matches prefixed with `"- "`, most confident first. Handles are not
/// required to be shareable; the adapter serializes access.
pub trait SignatureScanner {
    fn name(&self) -> &str;
    fn scan(&mut self, target: &ScanTarget<'_>, mode: ScanMode) -> Result<Vec<u8>>;
}

/// Cleaned output of both scan modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub labels: Vec<Vec<u8>>,
    pub mimes: Vec<Vec<u8>>,
}

type ScannerHandle = Mutex<Box<dyn SignatureScanner + Send>>;

/// Two independently locked scanner handles, one per mode.
pub struct SignalAdapter {
    describe: ScannerHandle,
    mime: ScannerHandle,
}

impl std::fmt::Debug for SignalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalAdapter").finish_non_exhaustive()
    }
}

impl Default for SignalAdapter {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignalAdapter {
    pub fn new(
        describe: Box<dyn SignatureScanner + Send>,
        mime: Box<dyn SignatureScanner + Send>,
    ) -> Self {
        Self {
            describe: Mutex::new(describe),
            mime: Mutex::new(mime),
        }
    }

    /// Adapter backed by two [`BuiltinScanner`] handles.
    pub fn builtin() -> Self {
        Self::new(Box::new(BuiltinScanner::new()), Box::new(BuiltinScanner::new()))
    }

    /// Run both scans. Never fails; a failed scan yields an empty list.
    pub fn acquire(&self, target: &ScanTarget<'_>) -> Signals {
        Signals {
            labels: Self::run(&self.describe, target, ScanMode::Describe),
            mimes: Self::run(&self.mime, target, ScanMode::Mime),
        }
    }

    fn run(handle: &ScannerHandle, target: &ScanTarget<'_>, mode: ScanMode) -> Vec<Vec<u8>> {
        let mut scanner = lock_recovering(handle);
        match scanner.scan(target, mode) {
            Ok(raw) => split_labels(&raw),
            Err(e) => {
                warn!(scanner = scanner.name(), ?mode, "signature scan failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// A panic inside one scan must not disable scanning for the whole process.
fn lock_recovering(handle: &ScannerHandle) -> MutexGuard<'_, Box<dyn SignatureScanner + Send>> {
    handle.lock().unwrap_or_else(|poisoned| {
        warn!("scanner lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Split raw scanner output into labels, dropping `"- "` continuation
/// markers and surrounding whitespace.
pub fn split_labels(raw: &[u8]) -> Vec<Vec<u8>> {
    raw.split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_prefix(b"- ").unwrap_or(line);
            trim_ascii(line).to_vec()
        })
        .collect()
}

fn trim_ascii(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if !first.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    while let [rest @ .., last] = s {
        if !last.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}

/// One plausible match: descriptive label plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub label: String,
    pub mime: String,
}

impl Detection {
    fn new(label: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            mime: mime.into(),
        }
    }
}

const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Magic-byte scanner emitting libmagic-style labels.
#[derive(Debug, Clone, Default)]
pub struct BuiltinScanner;

impl BuiltinScanner {
    pub fn new() -> Self {
        Self
    }

    /// All matches for `head`, most specific first.
    pub fn detect(head: &[u8]) -> Vec<Detection> {
        if head.is_empty() {
            return vec![Detection::new("empty", "application/x-empty")];
        }
        if head.starts_with(b"CART") {
            return vec![Detection::new("custom: archive/cart", "application/octet-stream")];
        }
        if head.starts_with(b"MZ") {
            let label = pe_label(head).unwrap_or_else(|| "MS-DOS executable".to_string());
            return vec![Detection::new(label, "application/x-dosexec")];
        }
        if head.starts_with(b"\x7fELF") {
            if let Some(label) = elf_label(head) {
                return vec![Detection::new(label, "application/x-executable")];
            }
        }
        if head.starts_with(b"PK\x03\x04") {
            let version = u16_le(head, 4).unwrap_or(20);
            let label = format!(
                "Zip archive data, at least v{}.{} to extract",
                version / 10,
                version % 10
            );
            return vec![Detection::new(label, "application/zip")];
        }
        if head.starts_with(b"PK\x05\x06") {
            return vec![Detection::new("Zip archive data (empty)", "application/zip")];
        }
        if head.starts_with(OLE_MAGIC) {
            return ole_detections(head);
        }
        if let Some(d) = Self::detect_simple(head) {
            return vec![d];
        }
        if let Some(d) = detect_text(head) {
            return vec![d];
        }
        let mime = infer::get(head)
            .map(|k| k.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        debug!(%mime, "no builtin signature, falling back to generic data");
        vec![Detection::new("data", mime)]
    }

    fn detect_simple(head: &[u8]) -> Option<Detection> {
        if head.starts_with(b"%PDF-") {
            let version: String = head[5..]
                .iter()
                .take_while(|b| b.is_ascii_digit() || **b == b'.')
                .map(|&b| b as char)
                .collect();
            return Some(Detection::new(
                format!("PDF document, version {}", version),
                "application/pdf",
            ));
        }
        if head.starts_with(b"\x1f\x8b") {
            return Some(Detection::new("gzip compressed data", "application/gzip"));
        }
        if head.starts_with(b"BZh") && head.len() > 3 && (b'1'..=b'9').contains(&head[3]) {
            let label = format!(
                "bzip2 compressed data, block size = {}00k",
                head[3] as char
            );
            return Some(Detection::new(label, "application/x-bzip2"));
        }
        if head.starts_with(b"\xfd7zXZ\x00") {
            return Some(Detection::new("XZ compressed data", "application/x-xz"));
        }
        if head.starts_with(b"7z\xbc\xaf\x27\x1c") {
            let label = match (head.get(6), head.get(7)) {
                (Some(maj), Some(min)) => format!("7-zip archive data, version {}.{}", maj, min),
                _ => "7-zip archive data".to_string(),
            };
            return Some(Detection::new(label, "application/x-7z-compressed"));
        }
        if head.starts_with(b"Rar!\x1a\x07") {
            return Some(Detection::new("RAR archive data", "application/x-rar"));
        }
        if head.len() >= 262 && &head[257..262] == b"ustar" {
            return Some(Detection::new("POSIX tar archive", "application/x-tar"));
        }
        if head.starts_with(b"\x89PNG\r\n\x1a\n") {
            let label = match (u32_be(head, 16), u32_be(head, 20)) {
                (Some(w), Some(h)) => format!("PNG image data, {} x {}", w, h),
                _ => "PNG image data".to_string(),
            };
            return Some(Detection::new(label, "image/png"));
        }
        if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
            let label = format!("GIF image data, version {}", String::from_utf8_lossy(&head[3..6]));
            return Some(Detection::new(label, "image/gif"));
        }
        if head.starts_with(b"\xff\xd8\xff") {
            return Some(Detection::new("JPEG image data", "image/jpeg"));
        }
        if head.starts_with(b"BM") && matches!(u32_le(head, 14), Some(12 | 40 | 56 | 108 | 124)) {
            return Some(Detection::new("PC bitmap, Windows 3.x format", "image/bmp"));
        }
        if head.starts_with(b"{\\rtf") {
            return Some(Detection::new("Rich Text Format data, version 1", "text/rtf"));
        }
        if head.starts_with(b"\xca\xfe\xba\xbe") {
            if let (Some(minor), Some(major)) = (u16_be(head, 4), u16_be(head, 6)) {
                if major >= 45 {
                    let label = format!("compiled Java class data, version {}.{}", major, minor);
                    return Some(Detection::new(label, "application/x-java-applet"));
                }
            }
        }
        if head.starts_with(b"L\x00\x00\x00\x01\x14\x02\x00") {
            return Some(Detection::new(
                "MS Windows shortcut",
                "application/octet-stream",
            ));
        }
        const MACHO: [&[u8]; 4] = [
            b"\xfe\xed\xfa\xce",
            b"\xfe\xed\xfa\xcf",
            b"\xce\xfa\xed\xfe",
            b"\xcf\xfa\xed\xfe",
        ];
        if MACHO.iter().any(|m| head.starts_with(m)) {
            return Some(Detection::new("Mach-O executable", "application/x-mach-binary"));
        }
        None
    }
}

impl SignatureScanner for BuiltinScanner {
    fn name(&self) -> &str {
        "builtin"
    }

    fn scan(&mut self, target: &ScanTarget<'_>, mode: ScanMode) -> Result<Vec<u8>> {
        let detections = Self::detect(target.head);
        if detections.is_empty() {
            return Err(IdentifyError::Scanner("no detections".to_string()));
        }
        let lines: Vec<&str> = detections
            .iter()
            .map(|d| match mode {
                ScanMode::Describe => d.label.as_str(),
                ScanMode::Mime => d.mime.as_str(),
            })
            .collect();
        Ok(lines.join("\n- ").into_bytes())
    }
}

fn u16_le(b: &[u8], off: usize) -> Option<u16> {
    b.get(off..off + 2).map(|s| u16::from_le_bytes([s[0], s[1]]))
}

fn u16_be(b: &[u8], off: usize) -> Option<u16> {
    b.get(off..off + 2).map(|s| u16::from_be_bytes([s[0], s[1]]))
}

fn u32_le(b: &[u8], off: usize) -> Option<u32> {
    b.get(off..off + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}

fn u32_be(b: &[u8], off: usize) -> Option<u32> {
    b.get(off..off + 4)
        .map(|s| u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
}

/// Full PE description, or `None` when the PE part is missing or too
/// damaged to describe (the caller falls back to plain MS-DOS).
fn pe_label(head: &[u8]) -> Option<String> {
    let pe = u32_le(head, 0x3c)? as usize;
    if head.get(pe..pe.checked_add(4)?)? != b"PE\0\0" {
        return None;
    }
    let machine = u16_le(head, pe + 4)?;
    let characteristics = u16_le(head, pe + 22)?;
    let opt = pe + 24;
    let plus = match u16_le(head, opt)? {
        0x10b => false,
        0x20b => true,
        _ => return None,
    };
    let subsystem = u16_le(head, opt + 68).unwrap_or(0);

    let mut label = String::from(if plus { "PE32+ executable" } else { "PE32 executable" });
    if characteristics & 0x2000 != 0 {
        label.push_str(" (DLL)");
    }
    match subsystem {
        2 => label.push_str(" (GUI)"),
        3 => label.push_str(" (console)"),
        1 => label.push_str(" (native)"),
        _ => {}
    }
    let arch = match machine {
        0x014c => "Intel 80386",
        0x8664 => "x86-64",
        0x0200 => "Intel Itanium",
        0xaa64 => "Aarch64",
        0x01c0 | 0x01c4 => "ARM",
        _ => "Unknown processor type",
    };
    label.push(' ');
    label.push_str(arch);
    label.push_str(", for MS Windows");
    Some(label)
}

fn elf_label(head: &[u8]) -> Option<String> {
    let bits = match *head.get(4)? {
        1 => "32-bit",
        2 => "64-bit",
        _ => return None,
    };
    let (order, e_type, machine) = match *head.get(5)? {
        1 => ("LSB", u16_le(head, 16)?, u16_le(head, 18)?),
        2 => ("MSB", u16_be(head, 16)?, u16_be(head, 18)?),
        _ => return None,
    };
    let kind = match e_type {
        1 => "relocatable",
        2 => "executable",
        3 => "shared object",
        4 => "core file",
        _ => "processor-specific",
    };
    let arch = match machine {
        0x03 => "Intel 80386",
        0x28 => "ARM",
        0x3e => "x86-64",
        0xb7 => "ARM aarch64",
        0x08 => "MIPS",
        _ => "unknown arch",
    };
    Some(format!("ELF {} {} {}, {}", bits, order, kind, arch))
}

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn contains_utf16(hay: &[u8], needle: &str) -> bool {
    memmem::find(hay, &utf16le(needle)).is_some()
}

fn ole_detections(head: &[u8]) -> Vec<Detection> {
    let generic = Detection::new(
        "Composite Document File V2 Document, Cannot read section info",
        "application/CDFV2",
    );
    if contains_utf16(head, "WordDocument") {
        return vec![
            generic,
            Detection::new(
                "OLE 2 Compound Document : Microsoft Word Document",
                "application/msword",
            ),
        ];
    }
    if contains_utf16(head, "Workbook") || contains_utf16(head, "Book") {
        return vec![Detection::new(
            "Composite Document File V2 Document, Name of Creating Application: Microsoft Excel",
            "application/vnd.ms-excel",
        )];
    }
    if contains_utf16(head, "PowerPoint Document") {
        return vec![Detection::new(
            "Composite Document File V2 Document, Name of Creating Application: Microsoft Office PowerPoint",
            "application/vnd.ms-powerpoint",
        )];
    }
    vec![generic]
}

fn detect_text(head: &[u8]) -> Option<Detection> {
    if head.contains(&0) {
        return None;
    }
    let text = std::str::from_utf8(head).ok().or_else(|| {
        // a multi-byte sequence may be cut at the end of the head
        let valid = match std::str::from_utf8(head) {
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            _ => return None,
        };
        std::str::from_utf8(&head[..valid]).ok()
    })?;
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0c'))
        .count();
    if printable * 100 < text.chars().count() * 95 {
        return None;
    }
    let encoding = if text.is_ascii() { "ASCII text" } else { "Unicode text, UTF-8 text" };
    let start = text.trim_start();
    let lower: String = start.chars().take(256).collect::<String>().to_ascii_lowercase();

    let (label, mime) = if lower.starts_with("<?xml") {
        (format!("XML 1.0 document, {}", encoding), "text/xml")
    } else if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        (format!("HTML document, {}", encoding), "text/html")
    } else if lower.starts_with("#!") {
        let first = lower.lines().next().unwrap_or("");
        if first.contains("python") {
            (format!("Python script, {} executable", encoding), "text/x-python")
        } else if first.contains("perl") {
            (format!("Perl script text executable, {}", encoding), "text/x-perl")
        } else if first.ends_with("sh") || first.contains("bash") {
            (
                format!("POSIX shell script, {} executable", encoding),
                "text/x-shellscript",
            )
        } else {
            (format!("a script, {} executable", encoding), "text/plain")
        }
    } else if lower.starts_with("<?php") {
        (format!("PHP script, {}", encoding), "text/x-php")
    } else {
        (encoding.to_string(), "text/plain")
    };
    Some(Detection::new(label, mime))
}
