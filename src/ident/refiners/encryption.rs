//! Office encryption detection for compound (OLE2) files.
//!
//! Encrypted OOXML is stored as an OLE2 file holding `EncryptionInfo` and
//! `EncryptedPackage` streams. Legacy binary formats flag encryption
//! inside their main stream: Word sets `fEncrypted` in the FIB, Excel
//! writes a `FILEPASS` record after the workbook `BOF`, and PowerPoint
//! carries an `EncryptedSummary` stream.
//!
//! Directory entries are located by scanning 128-byte slots rather than
//! following the FAT chain; only entry names and the first sector of a
//! stream are ever needed.

use crate::error::{IdentifyError, Result};
use crate::ident::io::{IOLimits, ReadExt, Subject};
use tracing::{debug, warn};

pub const PASSWORD_PROTECTED_TAG: &str = "document/office/passwordprotected";

pub const OLE_MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

const HEADER_LEN: usize = 512;
const DIR_ENTRY_LEN: usize = 128;

const FIB_MAGIC_WORD97: u16 = 0xa5ec;
const FIB_MAGIC_WORD6: u16 = 0xa5dc;
const FIB_F_ENCRYPTED: u16 = 0x0100;

const BIFF_BOF: u16 = 0x0809;
const BIFF_EOF: u16 = 0x000a;
const BIFF_FILEPASS: u16 = 0x002f;

/// Tells whether an office document is password protected.
pub trait EncryptionProbe {
    /// Errors mean "could not tell"; callers treat them as not encrypted.
    fn is_encrypted(&self, subject: &Subject<'_>) -> Result<bool>;
}

/// Object type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Storage,
    Stream,
    Root,
}

/// One compound-file directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub start_sector: u32,
    pub size: u32,
}

/// Minimal view over a compound file held in memory.
#[derive(Debug)]
pub struct CompoundFile<'a> {
    data: &'a [u8],
    sector_size: usize,
    mini_cutoff: u32,
    entries: Vec<DirEntry>,
}

fn parse_entry(raw: &[u8]) -> Option<DirEntry> {
    let name_len = raw.read_u16_le_at(0x40)? as usize;
    if name_len < 2 || name_len > 64 || name_len % 2 != 0 {
        return None;
    }
    let kind = match raw[0x42] {
        1 => EntryKind::Storage,
        2 => EntryKind::Stream,
        5 => EntryKind::Root,
        _ => return None,
    };
    let units: Vec<u16> = raw[..name_len - 2]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let name = String::from_utf16(&units).ok()?;
    Some(DirEntry {
        name,
        kind,
        start_sector: raw.read_u32_le_at(0x74)?,
        size: raw.read_u32_le_at(0x78)?,
    })
}

impl<'a> CompoundFile<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN || &data[..8] != OLE_MAGIC {
            return Err(IdentifyError::InvalidFormat("not a compound file".to_string()));
        }
        let shift = data.read_u16_le_at(0x1e).unwrap_or(0);
        if shift != 9 && shift != 12 {
            return Err(IdentifyError::ParseError {
                offset: 0x1e,
                message: format!("bad sector shift {}", shift),
            });
        }
        let mini_cutoff = data.read_u32_le_at(0x38).unwrap_or(0x1000);
        let entries = data[HEADER_LEN..]
            .chunks_exact(DIR_ENTRY_LEN)
            .filter_map(parse_entry)
            .collect();
        Ok(Self {
            data,
            sector_size: 1usize << shift,
            mini_cutoff,
            entries,
        })
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn stream(&self, name: &str) -> Option<&DirEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == EntryKind::Stream && e.name == name)
    }

    /// First regular sector of a stream. Streams below the mini-stream
    /// cutoff live elsewhere and are not resolved.
    pub fn first_sector(&self, entry: &DirEntry) -> Result<&'a [u8]> {
        if entry.size < self.mini_cutoff {
            return Err(IdentifyError::InvalidFormat(format!(
                "{} is stored in the mini stream",
                entry.name
            )));
        }
        let start = (entry.start_sector as usize)
            .checked_add(1)
            .and_then(|s| s.checked_mul(self.sector_size))
            .ok_or_else(|| IdentifyError::InvalidFormat("sector overflow".to_string()))?;
        self.data
            .get(start..start + self.sector_size)
            .ok_or_else(|| IdentifyError::ParseError {
                offset: start as u64,
                message: format!("{} first sector out of range", entry.name),
            })
    }
}

/// `fEncrypted` from a Word FIB.
pub fn word_fib_encrypted(fib: &[u8]) -> Result<bool> {
    let ident = fib.read_u16_le_at(0).unwrap_or(0);
    if ident != FIB_MAGIC_WORD97 && ident != FIB_MAGIC_WORD6 {
        return Err(IdentifyError::InvalidFormat(format!("bad FIB ident {:#06x}", ident)));
    }
    let flags = fib
        .read_u16_le_at(0x0a)
        .ok_or_else(|| IdentifyError::InvalidFormat("FIB truncated".to_string()))?;
    Ok(flags & FIB_F_ENCRYPTED != 0)
}

/// Whether a `FILEPASS` record appears in the BIFF records of `sector`.
pub fn workbook_has_filepass(sector: &[u8]) -> Result<bool> {
    if sector.read_u16_le_at(0) != Some(BIFF_BOF) {
        return Err(IdentifyError::InvalidFormat("workbook does not start with BOF".to_string()));
    }
    let mut off = 0usize;
    while let (Some(kind), Some(len)) =
        (sector.read_u16_le_at(off), sector.read_u16_le_at(off + 2))
    {
        match kind {
            BIFF_FILEPASS => return Ok(true),
            BIFF_EOF => break,
            _ => off += 4 + len as usize,
        }
    }
    Ok(false)
}

/// Default probe over OLE2 office files.
#[derive(Debug, Clone, Default)]
pub struct OfficeEncryptionProbe {
    limits: IOLimits,
}

impl OfficeEncryptionProbe {
    pub fn new(limits: IOLimits) -> Self {
        Self { limits }
    }

    pub fn probe_bytes(data: &[u8]) -> Result<bool> {
        if !data.starts_with(OLE_MAGIC) {
            // OOXML zips and everything else carry no OLE encryption
            return Ok(false);
        }
        let cf = CompoundFile::parse(data)?;
        if cf.stream("EncryptionInfo").is_some() || cf.stream("EncryptedPackage").is_some() {
            debug!("encrypted OOXML package");
            return Ok(true);
        }
        if cf.stream("EncryptedSummary").is_some() {
            debug!("PowerPoint encrypted summary");
            return Ok(true);
        }
        if let Some(entry) = cf.stream("WordDocument") {
            return word_fib_encrypted(cf.first_sector(entry)?);
        }
        if let Some(entry) = cf.stream("Workbook").or_else(|| cf.stream("Book")) {
            return workbook_has_filepass(cf.first_sector(entry)?);
        }
        Ok(false)
    }
}

impl EncryptionProbe for OfficeEncryptionProbe {
    fn is_encrypted(&self, subject: &Subject<'_>) -> Result<bool> {
        let data = subject.read_bounded(&self.limits)?;
        Self::probe_bytes(&data)
    }
}

/// Probe result with failures folded into "not encrypted".
pub fn office_encrypted(probe: &dyn EncryptionProbe, subject: &Subject<'_>) -> bool {
    match probe.is_encrypted(subject) {
        Ok(v) => v,
        Err(e) => {
            warn!("office encryption probe failed, assuming not encrypted: {}", e);
            false
        }
    }
}
