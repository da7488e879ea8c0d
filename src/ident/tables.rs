//! Static classification tables.
//!
//! Ordered regex tables resolve a descriptive label into a sub-type and a
//! top-level category; position in a table is precedence (first match wins).
//! Both ordered tables end in a catch-all entry resolving to `unknown`, which
//! is checked when the table is built. The lookup maps (trusted MIME types,
//! sub-type to top-level, OLE class IDs, extensions) are plain hash maps.

use crate::error::IdentifyError;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// One `(tag, pattern)` row of an ordered table.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub tag: &'static str,
    pub pattern: Regex,
}

fn is_match_all(src: &str) -> bool {
    matches!(src.trim(), "" | ".*")
}

/// Ordered, case-insensitive pattern table with a mandatory catch-all.
#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    /// Compile `(tag, regex)` rows; the last row must be an `unknown`
    /// catch-all whose pattern is exactly `.*` (or empty).
    pub fn try_new(rows: &[(&'static str, &str)]) -> Result<Self, IdentifyError> {
        let mut entries = Vec::with_capacity(rows.len());
        for (tag, src) in rows {
            let pattern = RegexBuilder::new(src)
                .case_insensitive(true)
                .build()
                .map_err(|e| IdentifyError::Configuration(format!("bad pattern for {tag}: {e}")))?;
            entries.push(PatternEntry { tag, pattern });
        }
        match entries.last() {
            Some(last) if last.tag == "unknown" && is_match_all(last.pattern.as_str()) => {}
            _ => {
                return Err(IdentifyError::Configuration(
                    "pattern table is missing its final match-all => unknown entry".to_string(),
                ))
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tag at `index`; indices past the end resolve to the catch-all.
    pub fn tag_at(&self, index: usize) -> &'static str {
        self.entries
            .get(index)
            .or_else(|| self.entries.last())
            .map(|e| e.tag)
            .unwrap_or("unknown")
    }

    /// Index of the first entry matching `label`, scanning no further than
    /// `limit` entries. Returns `limit.min(len)` when nothing matched.
    pub fn first_match_within(&self, label: &str, limit: usize) -> usize {
        let limit = limit.min(self.entries.len());
        self.entries[..limit]
            .iter()
            .position(|e| e.pattern.is_match(label))
            .unwrap_or(limit)
    }

    /// Tag of the first entry matching `label`.
    pub fn first_tag(&self, label: &str) -> &'static str {
        self.tag_at(self.first_match_within(label, self.entries.len()))
    }
}

const SUBTYPE_ROWS: &[(&str, &str)] = &[
    ("tnef", r"Transport Neutral Encapsulation Format"),
    ("chm", r"MS Windows HtmlHelp Data"),
    ("windows/dll64", r"pe32\+[^|]+dll[^|]+x86-64"),
    ("windows/pe64", r"pe32\+[^|]+x86-64[^|]+windows"),
    ("windows/ia/dll64", r"pe32\+?[^|]+dll[^|]+Intel Itanium[^|]+windows"),
    ("windows/ia/pe64", r"pe32\+?[^|]+Intel Itanium[^|]+windows"),
    ("windows/arm/dll64", r"pe32\+?[^|]+dll[^|]+Aarch64[^|]+windows"),
    ("windows/arm/pe64", r"pe32\+?[^|]+Aarch64[^|]+windows"),
    ("windows/dll64", r"pe32\+[^|]+dll[^|]+windows"),
    ("windows/pe64", r"pe32\+[^|]+windows"),
    ("windows/dll32", r"pe32[^|]+dll"),
    ("windows/pe32", r"pe32[^|]+windows"),
    ("windows/pe", r"pe unknown[^|]+windows"),
    ("windows/dos", r"(ms-)?dos executable"),
    ("windows/com", r"^com executable"),
    ("windows/dos", r"^8086 relocatable"),
    ("windows/coff", r"^MS Windows COFF"),
    ("linux/elf32", r"^elf 32-bit (l|m)sb +executable"),
    ("linux/elf64", r"^elf 64-bit (l|m)sb +(pie )?executable"),
    ("linux/so32", r"^elf 32-bit (l|m)sb +shared object"),
    ("linux/so64", r"^elf 64-bit (l|m)sb +shared object"),
    ("linux/coff32", r"^(Intel 80386|i386|80386) COFF"),
    ("linux/coff64", r"^64-bit XCOFF"),
    ("linux/ia/coff64", r"^Intel ia64 COFF"),
    ("linux/misp/ecoff", r"^MIPS[^|]+ ECOFF"),
    ("linux/a.out", r"^a.out"),
    ("mach-o", r"^Mach-O"),
    ("7-zip", r"^7-zip archive data"),
    ("ace", r"^ACE archive data"),
    ("bzip2", r"^bzip2 compressed data"),
    ("cabinet", r"^installshield cab"),
    ("cabinet", r"^microsoft cabinet archive data"),
    ("cpio", r"cpio archive"),
    ("gzip", r"^gzip compressed data"),
    ("iso", r"ISO 9660"),
    ("lzma", r"^LZMA compressed data"),
    ("rar", r"^rar archive data"),
    ("tar", r"^(GNU|POSIX) tar archive"),
    ("ar", r"ar archive"),
    ("xz", r"^XZ compressed data"),
    ("zip", r"^zip archive data"),
    ("tcpdump", r"^(tcpdump|pcap)"),
    ("pdf", r"^pdf document"),
    ("bmp", r"^pc bitmap"),
    ("gif", r"^gif image data"),
    ("jpg", r"^jpeg image data"),
    ("png", r"^png image data"),
    ("webp", r"Web/P image"),
    ("installer/windows", r"(Installation Database|Windows Installer)"),
    ("office/excel", r"Microsoft[^|]+Excel"),
    ("office/powerpoint", r"Microsoft.*PowerPoint"),
    ("office/word", r"Microsoft[^|]+Word"),
    ("office/rtf", r"Rich Text Format"),
    ("office/ole", r"OLE 2"),
    ("office/hwp", r"Hangul \(Korean\) Word Processor File"),
    ("office/unknown", r"Composite Document File|CDFV2"),
    ("office/unknown", r"Microsoft[^|]+(OOXML|Document)"),
    ("office/unknown", r"Number of (Characters|Pages|Words)"),
    ("flash", r"Macromedia Flash"),
    ("autorun", r"microsoft windows autorun"),
    ("batch", r"dos batch file"),
    ("jar", r"[ (]Jar[) ]"),
    ("class", r"java class data"),
    ("pyc", r"python [^|]+byte"),
    ("xml", r"OpenGIS KML"),
    ("html", r"html"),
    ("sgml", r"sgml"),
    ("xml", r"xml"),
    ("tim", r"TIM image"),
    ("sff", r"Frame Format"),
    ("windows", r"^MS Windows shortcut"),
    ("email", r"Mime entity text"),
    ("sysmon/evt", r"MS Windows Vista Event Log"),
    ("emf", r"Windows Enhanced Metafile"),
    ("msvc", r"MSVC \.res"),
    ("unknown", r".*"),
];

const TOPLEVEL_ROWS: &[(&str, &str)] = &[
    ("shortcut", r"^MS Windows shortcut"),
    (
        "document",
        r"Composite Document File|CDFV2|Corel|OLE 2|OpenDocument |Rich Text Format|Microsoft.*(Document|Excel|PowerPoint|Word|OOXML)|Number of (Characters|Pages|Words)",
    ),
    ("document", r"PostScript|pdf|MIME entity text"),
    ("document", r"Hangul \(Korean\) Word Processor File"),
    ("network", r"capture"),
    ("unknown", r"CoreFoundation|Dreamcast|KEYBoard|OSF/Rose|Zope|quota|uImage"),
    ("unknown", r"disk|file[ ]*system|floppy|tape"),
    (
        "audiovisual",
        r"Macromedia Flash|Matroska|MIDI data|MPEG|MP4|MPG|MP3|QuickTime|RIFF|WebM|animation|audio|movie|music|ogg|sound|tracker|video|voice data",
    ),
    (
        "executable",
        r"803?86|COFF|ELF|Mach-O|ia32|executable|kernel|library|libtool|object",
    ),
    ("java", r"jar |java"),
    ("unknown", r"Emulator"),
    ("image", r"DjVu|Surface|XCursor|bitmap|cursor|font|graphics|icon|image|jpeg"),
    (
        "archive",
        r"BinHex|InstallShield CAB|Transport Neutral Encapsulation Format|archive data|compress|mcrypt|MS Windows HtmlHelp Data|current ar archive|cpio archive|ISO 9660",
    ),
    ("metadata", r"MS Windows Vista Event Log"),
    ("unknown", r".*"),
];

/// Fine-grained sub-type table.
pub static SUBTYPE_PATTERNS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::try_new(SUBTYPE_ROWS).expect("valid sub-type pattern table")
});

/// Coarse top-level table.
pub static TOPLEVEL_PATTERNS: Lazy<PatternTable> = Lazy::new(|| {
    PatternTable::try_new(TOPLEVEL_ROWS).expect("valid top-level pattern table")
});

const SUBTYPE_TO_TOPLEVEL_ROWS: &[(&str, &str)] = &[
    ("windows/com", "executable"),
    ("windows/dos", "executable"),
    ("windows/pe", "executable"),
    ("windows/pe32", "executable"),
    ("windows/pe64", "executable"),
    ("windows/dll32", "executable"),
    ("windows/dll64", "executable"),
    ("windows/ia/pe64", "executable"),
    ("windows/ia/dll64", "executable"),
    ("windows/arm/pe64", "executable"),
    ("windows/arm/dll64", "executable"),
    ("windows/coff", "executable"),
    ("windows", "shortcut"),
    ("linux/elf32", "executable"),
    ("linux/elf64", "executable"),
    ("linux/so32", "executable"),
    ("linux/so64", "executable"),
    ("linux/coff32", "executable"),
    ("linux/coff64", "executable"),
    ("linux/ia/coff64", "executable"),
    ("linux/misp/ecoff", "executable"),
    ("linux/a.out", "executable"),
    ("mach-o", "executable"),
    ("7-zip", "archive"),
    ("flash", "audiovisual"),
    ("sff", "network"),
    ("ar", "archive"),
    ("ace", "archive"),
    ("chm", "archive"),
    ("cpio", "archive"),
    ("bzip2", "archive"),
    ("cabinet", "archive"),
    ("gzip", "archive"),
    ("iso", "archive"),
    ("lzma", "archive"),
    ("rar", "archive"),
    ("tar", "archive"),
    ("xz", "archive"),
    ("zip", "archive"),
    ("tnef", "network"),
    ("tcpdump", "network"),
    ("installer/windows", "document"),
    ("office/excel", "document"),
    ("office/powerpoint", "document"),
    ("office/word", "document"),
    ("office/ole", "document"),
    ("office/hwp", "document"),
    ("office/rtf", "document"),
    ("office/unknown", "document"),
    ("pdf", "document"),
    ("email", "document"),
    ("bmp", "image"),
    ("emf", "image"),
    ("gif", "image"),
    ("jpg", "image"),
    ("png", "image"),
    ("webp", "image"),
    ("tim", "image"),
    ("msvc", "resource"),
    ("pyc", "resource"),
    ("sysmon/evt", "metadata"),
    ("jar", "java"),
    ("class", "java"),
    ("autorun", "code"),
    ("batch", "code"),
    ("html", "code"),
    ("sgml", "code"),
    ("xml", "code"),
];

/// Sub-type → top-level overrides.
pub static SUBTYPE_TO_TOPLEVEL: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SUBTYPE_TO_TOPLEVEL_ROWS.iter().copied().collect());

const TRUSTED_MIME_ROWS: &[(&str, &str)] = &[
    // MPEG audio
    ("audio/mp2", "audio/mp2"),
    ("audio/x-mp2", "audio/mp2"),
    ("audio/mpeg", "audio/mp3"),
    ("audio/mp3", "audio/mp3"),
    ("audio/mpg", "audio/mp3"),
    ("audio/x-mpeg", "audio/mp3"),
    ("audio/x-mp3", "audio/mp3"),
    ("audio/x-mpg", "audio/mp3"),
    ("audio/x-mp4a-latm", "audio/mp4"),
    ("audio/x-m4a", "audio/mp4"),
    ("audio/m4a", "audio/mp4"),
    // WAV
    ("audio/x-wav", "audio/wav"),
    ("audio/wav", "audio/wav"),
    ("audio/vnd.wav", "audio/wav"),
    ("audio/ogg", "audio/ogg"),
    ("audio/x-ogg", "audio/ogg"),
    ("audio/s3m", "audio/s3m"),
    ("audio/x-s3m", "audio/s3m"),
    ("audio/midi", "audio/midi"),
    ("audio/x-midi", "audio/midi"),
    // Video
    ("video/mp4", "video/mp4"),
    ("video/x-msvideo", "video/avi"),
    ("video/x-avi", "video/avi"),
    ("video/avi", "video/avi"),
    ("video/msvideo", "video/avi"),
    ("video/divx", "video/divx"),
    ("video/vnd.divx", "video/divx"),
    ("video/quicktime", "video/quicktime"),
    // Source and text
    ("text/x-c++", "text/plain"),
    ("text/x-c", "text/plain"),
    ("application/x-wine-extension-ini", "text/ini"),
    ("text/x-python", "code/python"),
    ("text/x-php", "code/php"),
    ("text/xml", "code/xml"),
    ("text/html", "text/plain"),
    ("text/x-shellscript", "code/shell"),
    ("text/rtf", "document/office/rtf"),
    ("text/x-java", "code/java"),
    ("text/x-msdos-batch", "code/batch"),
    ("application/json", "text/json"),
    ("application/x-setupscript", "code/autorun"),
    ("application/x-bittorrent", "application/torrent"),
    ("application/x-torrent", "application/torrent"),
    // Databases and fonts
    ("application/x-dbf", "db/dbf"),
    ("application/x-sqlite3", "db/sqlite"),
    ("application/vnd.ms-opentype", "resource/font/opentype"),
    ("application/x-font-sfn", "resource/font/x11"),
    // Images
    ("image/vnd.microsoft.icon", "image/icon"),
    ("application/ico", "image/icon"),
    ("image/ico", "image/icon"),
    ("image/icon", "image/icon"),
    ("image/x-ico", "image/icon"),
    ("image/x-icon", "image/icon"),
    ("text/ico", "image/icon"),
    ("image/x-icns", "image/icon"),
    ("image/gif", "image/gif"),
    ("image/webp", "image/webp"),
    ("image/bmp", "image/bmp"),
    ("image/x-bmp", "image/bmp"),
    ("image/x-ms-bmp", "image/bmp"),
    ("image/wmf", "image/wmf"),
    ("image/svg", "image/svg"),
    ("image/svg+xml", "image/svg"),
    ("image/jpeg", "image/jpg"),
    ("image/pjpeg", "image/jpg"),
    ("image/png", "image/png"),
    ("image/x-tga", "image/tga"),
    ("image/x-icb", "image/tga"),
    ("image/x-win-bitmap", "image/cursor"),
    // Office
    ("application/vnd.ms-outlook", "document/office/email"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "document/office/powerpoint",
    ),
    ("application/vnd.ms-powerpoint", "document/office/powerpoint"),
    ("application/vnd.ms-excel", "document/office/excel"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "document/office/excel",
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "document/office/word",
    ),
    ("application/msword", "document/office/word"),
    ("application/encrypted", "document/office/passwordprotected"),
    ("application/vnd.ms-msi", "document/installer/windows"),
    ("application/pdf", "document/pdf"),
    ("application/postscript", "document/ps"),
    // OpenDocument
    ("application/vnd.oasis.opendocument.chart", "document/odt/chart"),
    ("application/vnd.oasis.opendocument.chart-template", "document/odt/chart"),
    ("application/vnd.oasis.opendocument.database", "db/odt"),
    ("application/vnd.oasis.opendocument.formula", "document/odt/formula"),
    ("application/vnd.oasis.opendocument.formula-template", "document/odt/formula"),
    ("application/vnd.oasis.opendocument.graphics", "document/odt/graphics"),
    ("application/vnd.oasis.opendocument.graphics-flat-xml", "document/odt/graphics"),
    ("application/vnd.oasis.opendocument.graphics-template", "document/odt/graphics"),
    ("application/vnd.oasis.opendocument.presentation", "document/odt/presentation"),
    (
        "application/vnd.oasis.opendocument.presentation-flat-xml",
        "document/odt/presentation",
    ),
    (
        "application/vnd.oasis.opendocument.presentation-template",
        "document/odt/presentation",
    ),
    ("application/vnd.oasis.opendocument.spreadsheet", "document/odt/spreadsheet"),
    (
        "application/vnd.oasis.opendocument.spreadsheet-flat-xml",
        "document/odt/spreadsheet",
    ),
    (
        "application/vnd.oasis.opendocument.spreadsheet-template",
        "document/odt/spreadsheet",
    ),
    ("application/vnd.oasis.opendocument.text", "document/odt/text"),
    ("application/vnd.oasis.opendocument.text-flat-xml", "document/odt/text"),
    ("application/vnd.oasis.opendocument.text-template", "document/odt/text"),
    ("application/vnd.oasis.opendocument.text-master", "document/odt/text"),
    ("application/vnd.oasis.opendocument.text-master-template", "document/odt/text"),
    ("application/vnd.oasis.opendocument.web", "document/odt/web"),
    // Archives
    ("application/x-7z-compressed", "archive/7-zip"),
    ("application/x-tar", "archive/tar"),
    ("application/x-tarapplication/x-dbt", "archive/tar"),
    ("application/gzip", "archive/gzip"),
    ("application/vnd.ms-tnef", "archive/tnef"),
    ("application/x-cpio", "archive/cpio"),
    ("application/x-archive", "archive/ar"),
    ("application/zip", "archive/zip"),
    ("application/zlib", "archive/zlib"),
    ("application/x-arj", "archive/arj"),
    ("application/x-lzip", "archive/lzip"),
    ("application/x-lzh-compressed", "archive/lzh"),
    ("application/x-ms-compress-szdd", "archive/szdd"),
    ("application/x-arc", "archive/arc"),
    ("application/x-iso9660-image", "archive/iso"),
    ("application/x-rar", "archive/rar"),
    ("application/x-xz", "archive/xz"),
    ("application/vnd.ms-cab-compressed", "archive/cabinet"),
    // Misc
    ("application/x-java-applet", "java/class"),
    ("application/vnd.tcpdump.pcap", "network/tcpdump"),
    ("message/rfc822", "document/email"),
    ("text/calendar", "text/calendar"),
    ("application/x-mach-binary", "executable/mach-o"),
    ("application/x-gettext-translation", "resource/mo"),
    ("application/x-hwp", "document/office/hwp"),
    ("application/vnd.iccprofile", "metadata/iccprofile"),
    ("application/vnd.lotus-1-2-3", "document/lotus/spreadsheet"),
];

/// Exact MIME string → final type tag.
pub static TRUSTED_MIMES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TRUSTED_MIME_ROWS.iter().copied().collect());

const OLE_CLSID_ROWS: &[(&str, &str)] = &[
    ("00020803-0000-0000-C000-000000000046", "document/office/word"), // MS Graph Chart
    ("00020900-0000-0000-C000-000000000046", "document/office/word"), // Word 95
    ("00020901-0000-0000-C000-000000000046", "document/office/word"), // Word 6.0-7.0 Picture
    ("00020906-0000-0000-C000-000000000046", "document/office/word"), // Word 97
    ("00020907-0000-0000-C000-000000000046", "document/office/word"),
    ("00020C01-0000-0000-C000-000000000046", "document/office/excel"),
    ("00020821-0000-0000-C000-000000000046", "document/office/excel"),
    ("00020820-0000-0000-C000-000000000046", "document/office/excel"), // Excel 97
    ("00020810-0000-0000-C000-000000000046", "document/office/excel"), // Excel 95
    ("00021A14-0000-0000-C000-000000000046", "document/office/visio"),
    ("0002CE02-0000-0000-C000-000000000046", "document/office/equation"), // Equation 3.0
    ("0003000A-0000-0000-C000-000000000046", "document/office/paintbrush"),
    ("0003000C-0000-0000-C000-000000000046", "document/office/package"),
    ("000C1084-0000-0000-C000-000000000046", "document/installer/windows"), // MSI
    ("00020D0B-0000-0000-C000-000000000046", "document/office/email"),
    ("29130400-2EED-1069-BF5D-00DD011186B7", "document/office/wordpro"), // Lotus WordPro
    ("46E31370-3F7A-11CE-BED6-00AA00611080", "document/office/word"), // Forms 2.0 MultiPage
    ("5512D110-5CC6-11CF-8D67-00AA00BDCE1D", "document/office/word"),
    ("5512D11A-5CC6-11CF-8D67-00AA00BDCE1D", "document/office/word"),
    ("5512D11C-5CC6-11CF-8D67-00AA00BDCE1D", "document/office/word"),
    ("64818D10-4F9B-11CF-86EA-00AA00B929E8", "document/office/powerpoint"),
    ("64818D11-4F9B-11CF-86EA-00AA00B929E8", "document/office/powerpoint"),
    ("11943940-36DE-11CF-953E-00C0A84029E9", "document/office/word"), // Photo Editor 3.0
    ("B801CA65-A1FC-11D0-85AD-444553540000", "document/pdf"), // Acrobat Document
    ("A25250C4-50C1-11D3-8EA3-0090271BECDD", "document/office/wordperfect"),
    ("C62A69F0-16DC-11CE-9E98-00AA00574A4F", "document/office/word"), // Forms 2.0 Form
    ("F4754C9B-64F5-4B40-8AF4-679732AC0607", "document/office/word"), // Word.Document.12
    ("BDD1F04B-858B-11D1-B16A-00C0F0283628", "document/office/word"), // CVE-2012-0158 carrier
];

/// Canonical upper-case GUID string → type tag.
pub static OLE_CLSIDS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    OLE_CLSID_ROWS
        .iter()
        .map(|(guid, tag)| (guid.to_ascii_uppercase(), *tag))
        .collect()
});

const TAG_EXTENSION_ROWS: &[(&str, &str)] = &[
    ("archive/chm", ".chm"),
    ("audiovisual/flash", ".swf"),
    ("code/batch", ".bat"),
    ("code/c", ".c"),
    ("code/csharp", ".cs"),
    ("code/hta", ".hta"),
    ("code/html", ".html"),
    ("code/java", ".java"),
    ("code/javascript", ".js"),
    ("code/jscript", ".js"),
    ("code/pdfjs", ".js"),
    ("code/perl", ".pl"),
    ("code/php", ".php"),
    ("code/ps1", ".ps1"),
    ("code/python", ".py"),
    ("code/ruby", ".rb"),
    ("code/vbs", ".vbs"),
    ("code/wsf", ".wsf"),
    ("document/installer/windows", ".msi"),
    ("document/office/excel", ".xls"),
    ("document/office/mhtml", ".mhtml"),
    ("document/office/ole", ".doc"),
    ("document/office/powerpoint", ".ppt"),
    ("document/office/rtf", ".doc"),
    ("document/office/unknown", ".doc"),
    ("document/office/visio", ".vsd"),
    ("document/office/word", ".doc"),
    ("document/office/wordperfect", ".wp"),
    ("document/office/wordpro", ".lwp"),
    ("document/office/onenote", ".one"),
    ("document/pdf", ".pdf"),
    ("document/email", ".eml"),
    ("executable/windows/pe32", ".exe"),
    ("executable/windows/pe64", ".exe"),
    ("executable/windows/dll32", ".dll"),
    ("executable/windows/dll64", ".dll"),
    ("executable/windows/dos", ".exe"),
    ("executable/windows/com", ".exe"),
    ("executable/linux/elf32", ".elf"),
    ("executable/linux/elf64", ".elf"),
    ("executable/linux/so32", ".so"),
    ("executable/linux/so64", ".so"),
    ("java/jar", ".jar"),
    ("silverlight/xap", ".xap"),
    ("shortcut/windows", ".lnk"),
];

static TAG_TO_EXTENSION: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TAG_EXTENSION_ROWS.iter().copied().collect());

/// Conventional extension (with leading dot) for a type tag.
pub fn tag_to_extension(tag: &str) -> Option<&'static str> {
    TAG_TO_EXTENSION.get(tag).copied()
}

/// Force construction of every table so configuration defects abort at startup.
pub fn ensure_loaded() {
    Lazy::force(&SUBTYPE_PATTERNS);
    Lazy::force(&TOPLEVEL_PATTERNS);
    Lazy::force(&SUBTYPE_TO_TOPLEVEL);
    Lazy::force(&TRUSTED_MIMES);
    Lazy::force(&OLE_CLSIDS);
    Lazy::force(&TAG_TO_EXTENSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_load() {
        ensure_loaded();
        assert_eq!(TOPLEVEL_PATTERNS.tag_at(TOPLEVEL_PATTERNS.len() - 1), "unknown");
        assert_eq!(SUBTYPE_PATTERNS.first_tag("no such thing"), "unknown");
    }

    #[test]
    fn test_missing_catch_all_is_rejected() {
        let err = PatternTable::try_new(&[("zip", r"^zip archive data")]).unwrap_err();
        assert!(matches!(err, IdentifyError::Configuration(_)));
        let err = PatternTable::try_new(&[("unknown", r"^x")]).unwrap_err();
        assert!(matches!(err, IdentifyError::Configuration(_)));
        assert!(PatternTable::try_new(&[]).is_err());
    }

    #[test]
    fn test_catch_all_must_match_everything() {
        // these match the empty label but not real ones
        for src in [r"^$", r"x*", r"^\s*$"] {
            let err = PatternTable::try_new(&[("zip", "zip"), ("unknown", src)]).unwrap_err();
            assert!(matches!(err, IdentifyError::Configuration(_)), "{src}");
        }
        assert!(PatternTable::try_new(&[("zip", "zip"), ("unknown", ".*")]).is_ok());
        assert!(PatternTable::try_new(&[("zip", "zip"), ("unknown", "")]).is_ok());
    }

    #[test]
    fn test_bad_regex_is_configuration_error() {
        let err = PatternTable::try_new(&[("x", r"("), ("unknown", ".*")]).unwrap_err();
        assert!(matches!(err, IdentifyError::Configuration(_)));
    }

    #[test]
    fn test_subtype_precedence() {
        let t = &*SUBTYPE_PATTERNS;
        assert_eq!(
            t.first_tag("PE32+ executable (DLL) (GUI) x86-64, for MS Windows"),
            "windows/dll64"
        );
        assert_eq!(
            t.first_tag("PE32+ executable (GUI) x86-64, for MS Windows"),
            "windows/pe64"
        );
        assert_eq!(
            t.first_tag("PE32 executable (DLL) (GUI) Intel 80386, for MS Windows"),
            "windows/dll32"
        );
        assert_eq!(
            t.first_tag("PE32 executable (console) Intel 80386, for MS Windows"),
            "windows/pe32"
        );
        assert_eq!(t.first_tag("MS-DOS executable"), "windows/dos");
        assert_eq!(t.first_tag("Zip archive data, at least v2.0 to extract"), "zip");
        assert_eq!(t.first_tag("ELF 64-bit LSB pie executable, x86-64"), "linux/elf64");
    }

    #[test]
    fn test_toplevel_case_insensitive() {
        let t = &*TOPLEVEL_PATTERNS;
        assert_eq!(t.first_tag("pdf document, version 1.4"), "document");
        assert_eq!(t.first_tag("ZIP ARCHIVE DATA"), "archive");
        assert_eq!(t.first_tag("random words"), "unknown");
    }

    #[test]
    fn test_first_match_within_limit() {
        let t = &*TOPLEVEL_PATTERNS;
        // "executable" is well below index 2; capped scans report the cap
        assert_eq!(t.first_match_within("MS-DOS executable", 2), 2);
        assert!(t.first_match_within("MS-DOS executable", t.len()) > 2);
    }

    #[test]
    fn test_lookup_maps() {
        assert_eq!(TRUSTED_MIMES.get("application/pdf"), Some(&"document/pdf"));
        assert_eq!(SUBTYPE_TO_TOPLEVEL.get("windows"), Some(&"shortcut"));
        assert_eq!(
            OLE_CLSIDS.get("00021A14-0000-0000-C000-000000000046"),
            Some(&"document/office/visio")
        );
        assert_eq!(tag_to_extension("java/jar"), Some(".jar"));
        assert_eq!(tag_to_extension("nope"), None);
    }
}
