use std::io::Read;
use std::path::Path;

use crate::error::{ElfError, Result};

/// Read-only, randomly addressable view over an ELF file's bytes.
///
/// The whole file is read into memory at open time and released when the
/// source is dropped, so decoded entities never outlive the bytes they
/// were cut from. All access is bounds-checked; no decoding happens here.
pub struct ByteSource {
    bytes: Vec<u8>,
}

impl ByteSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns exactly `len` bytes starting at `offset`, or
    /// [`ElfError::OutOfBounds`] if the range exceeds the source.
    pub fn read(&self, offset: u64, len: u64) -> Result<&[u8]> {
        let end = offset.checked_add(len).filter(|&end| end <= self.len());
        match end {
            Some(end) => Ok(&self.bytes[offset as usize..end as usize]),
            None => Err(ElfError::OutOfBounds {
                offset,
                len,
                size: self.len(),
            }),
        }
    }

    /// Zero-copy view with the same bounds contract as [`ByteSource::read`].
    pub fn slice(&self, offset: u64, len: u64) -> Result<&[u8]> {
        self.read(offset, len)
    }
}
