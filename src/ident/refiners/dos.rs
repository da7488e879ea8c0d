//! PE header check for files labeled as plain MS-DOS executables.
//!
//! Scanners fall back to "MS-DOS executable" when the PE optional header is
//! damaged or missing. Following `e_lfanew` to a `PE\0\0` signature and
//! reading the COFF machine and characteristics is enough to recover the
//! width and the DLL/EXE distinction.

use crate::error::{IdentifyError, Result};
use crate::ident::io::{ReadExt, Subject};
use bitflags::bitflags;
use tracing::debug;

pub const DOS_TAG: &str = "executable/windows/dos";

pub const IMAGE_FILE_MACHINE_I386: u16 = 0x014c;
pub const IMAGE_FILE_MACHINE_AMD64: u16 = 0x8664;

bitflags! {
    /// COFF file header characteristics used to tell images apart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Characteristics: u16 {
        const EXECUTABLE_IMAGE = 0x0002;
        const DLL = 0x2000;
    }
}

/// What the COFF header says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeStub {
    pub width: u32,
    pub characteristics: Characteristics,
}

impl PeStub {
    pub fn tag(&self) -> Option<String> {
        let kind = if self.characteristics.contains(Characteristics::DLL) {
            "dll"
        } else if self.characteristics.contains(Characteristics::EXECUTABLE_IMAGE) {
            "pe"
        } else {
            return None;
        };
        Some(format!("executable/windows/{}{}", kind, self.width))
    }
}

pub const DOS_SIGNATURE: &[u8; 2] = b"MZ";
pub const PE_SIGNATURE: &[u8; 4] = b"PE\0\0";
pub const DOS_HEADER_SIZE: usize = 0x40;
pub const COFF_HEADER_SIZE: usize = 20;

/// The two COFF fields the tag depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoffHeader {
    pub machine: u16,
    pub characteristics: Characteristics,
}

fn truncated(offset: u64, expected: usize, actual: usize) -> IdentifyError {
    IdentifyError::ParseError {
        offset,
        message: format!("header truncated: expected {} bytes, got {}", expected, actual),
    }
}

/// `e_lfanew` from a DOS header.
pub fn parse_dos_header(data: &[u8]) -> Result<u32> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(truncated(0, DOS_HEADER_SIZE, data.len()));
    }
    if &data[..2] != DOS_SIGNATURE {
        return Err(IdentifyError::InvalidFormat("missing MZ signature".to_string()));
    }
    data.read_u32_le_at(0x3c).ok_or_else(|| truncated(0x3c, 4, data.len()))
}

/// COFF header following the `PE\0\0` signature. `data` starts at the
/// signature, which sits at `offset` in the file.
pub fn parse_coff_header(data: &[u8], offset: u64) -> Result<CoffHeader> {
    let need = PE_SIGNATURE.len() + COFF_HEADER_SIZE;
    if data.len() < need {
        return Err(truncated(offset, need, data.len()));
    }
    if &data[..4] != PE_SIGNATURE {
        return Err(IdentifyError::ParseError {
            offset,
            message: "missing PE signature".to_string(),
        });
    }
    let coff = &data[4..];
    let machine = coff
        .read_u16_le_at(0)
        .ok_or_else(|| truncated(offset + 4, 2, coff.len()))?;
    let characteristics = coff
        .read_u16_le_at(18)
        .ok_or_else(|| truncated(offset + 22, 2, coff.len()))?;
    Ok(CoffHeader {
        machine,
        characteristics: Characteristics::from_bits_retain(characteristics),
    })
}

/// Follow the DOS header to the COFF header and read width and kind.
pub fn parse_pe_stub(subject: &Subject<'_>) -> Result<PeStub> {
    let dos = subject.read_at(0, DOS_HEADER_SIZE)?;
    let header_pos = parse_dos_header(&dos)? as u64;
    let nt = subject.read_at(header_pos, PE_SIGNATURE.len() + COFF_HEADER_SIZE)?;
    let coff = parse_coff_header(&nt, header_pos)?;
    let width = match coff.machine {
        IMAGE_FILE_MACHINE_I386 => 32,
        IMAGE_FILE_MACHINE_AMD64 => 64,
        other => {
            return Err(IdentifyError::ParseError {
                offset: header_pos + 4,
                message: format!("unsupported machine {:#06x}", other),
            })
        }
    };
    Ok(PeStub {
        width,
        characteristics: coff.characteristics,
    })
}

/// Refined PE tag, or the plain DOS tag when any check fails.
pub fn dos_ident(subject: &Subject<'_>) -> String {
    match parse_pe_stub(subject).map(|stub| stub.tag()) {
        Ok(Some(tag)) => tag,
        Ok(None) => {
            debug!("PE stub is neither DLL nor executable image");
            DOS_TAG.to_string()
        }
        Err(e) => {
            debug!("not a disguised PE: {}", e);
            DOS_TAG.to_string()
        }
    }
}
