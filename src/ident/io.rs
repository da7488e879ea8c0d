//! Bounded I/O for refiners.
//!
//! Refiners inspect either a file on disk or an in-memory buffer through a
//! [`Subject`]. Every whole-content read goes through a [`BoundedReader`]
//! so hostile inputs cannot make a refiner allocate without limit.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

/// Resource limits for I/O operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IOLimits {
    pub max_read_bytes: u64,
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_read_bytes: 100 * 1024 * 1024, // 100MB
            max_file_size: 1024 * 1024 * 1024, // 1GB
        }
    }
}

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;

        if self.bytes_read >= self.limit {
            debug!("BoundedReader limit reached after {} bytes", self.bytes_read);
        }
        Ok(n)
    }
}

/// Anything a structured format reader can consume.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// What a refiner inspects: a file on disk or bytes already in memory.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> Subject<'a> {
    /// Filesystem path, when there is one.
    pub fn path(&self) -> Option<&'a Path> {
        match self {
            Subject::Path(p) => Some(p),
            Subject::Bytes(_) => None,
        }
    }

    /// Total size in bytes.
    pub fn size(&self) -> io::Result<u64> {
        match self {
            Subject::Path(p) => Ok(std::fs::metadata(p)?.len()),
            Subject::Bytes(b) => Ok(b.len() as u64),
        }
    }

    /// Open a seekable reader positioned at the start.
    ///
    /// The handle is scoped to the caller and released when dropped.
    pub fn open(&self) -> io::Result<Box<dyn ReadSeek + 'a>> {
        match self {
            Subject::Path(p) => Ok(Box::new(File::open(p)?)),
            Subject::Bytes(b) => Ok(Box::new(Cursor::new(*b))),
        }
    }

    /// Read at most `len` bytes starting at `offset`.
    pub fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        match self {
            Subject::Bytes(b) => {
                let start = usize::try_from(offset).unwrap_or(usize::MAX).min(b.len());
                let end = start.saturating_add(len).min(b.len());
                Ok(b[start..end].to_vec())
            }
            Subject::Path(_) => {
                let mut r = self.open()?;
                r.seek(SeekFrom::Start(offset))?;
                let mut out = Vec::with_capacity(len.min(1 << 20));
                BoundedReader::new(r, len as u64).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }

    /// Whole content, capped at `limits.max_read_bytes`.
    ///
    /// Files larger than `limits.max_file_size` are refused.
    pub fn read_bounded(&self, limits: &IOLimits) -> io::Result<Cow<'a, [u8]>> {
        match self {
            Subject::Bytes(b) => {
                let cap = usize::try_from(limits.max_read_bytes).unwrap_or(usize::MAX);
                Ok(Cow::Borrowed(&b[..b.len().min(cap)]))
            }
            Subject::Path(p) => {
                let file = File::open(p)?;
                let size = file.metadata()?.len();
                if size > limits.max_file_size {
                    warn!(
                        "File too large: {} bytes (limit: {})",
                        size, limits.max_file_size
                    );
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "File too large: {} bytes (limit: {})",
                            size, limits.max_file_size
                        ),
                    ));
                }
                let mut data = Vec::with_capacity(size.min(limits.max_read_bytes) as usize);
                BoundedReader::new(file, limits.max_read_bytes).read_to_end(&mut data)?;
                Ok(Cow::Owned(data))
            }
        }
    }
}

/// Bounds-checked little-endian reads from byte slices.
pub trait ReadExt {
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }
}
