use crate::error::{ElfError, Result};

/// The section name string table: a byte blob of NUL-terminated names
/// indexed by offset. One table, located via the header's string-table
/// index, resolves the name of every section in the file.
#[derive(Debug, Clone)]
pub struct StringTable {
    bytes: Vec<u8>,
}

impl StringTable {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Resolves the NUL-terminated name starting at `offset`.
    pub fn resolve(&self, offset: u32) -> Result<String> {
        let start = offset as usize;
        if start >= self.bytes.len() {
            return Err(ElfError::NameOutOfBounds {
                offset: u64::from(offset),
                size: self.bytes.len() as u64,
            });
        }
        let tail = &self.bytes[start..];
        match tail.iter().position(|&b| b == 0) {
            Some(end) => Ok(String::from_utf8_lossy(&tail[..end]).into_owned()),
            None => Err(ElfError::UnterminatedName(u64::from(offset))),
        }
    }
}
