use crate::error::{ElfError, Result};
use crate::source::ByteSource;

/// Location of a fixed-stride table, as declared by the file header.
/// Producer-controlled; nothing here is trusted until checked against the
/// byte source's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLocation {
    pub offset: u64,
    pub count: u64,
    pub entry_size: u64,
}

impl TableLocation {
    /// Total byte size of the table, saturating on pathological inputs so
    /// the subsequent bounds check fails instead of wrapping.
    pub fn byte_size(&self) -> u64 {
        self.count.saturating_mul(self.entry_size)
    }

    /// Verifies the whole declared range lies within `size` bytes. A table
    /// with no entries occupies no range and always passes.
    pub fn check_within(&self, size: u64, table: &'static str) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }
        let end = self.offset.saturating_add(self.byte_size());
        if end > size {
            return Err(ElfError::TruncatedTable { table, end, size });
        }
        Ok(())
    }

    /// File offset of entry `index`, without bounds knowledge.
    pub fn entry_offset(&self, index: u64) -> u64 {
        self.offset.saturating_add(index.saturating_mul(self.entry_size))
    }
}

/// Lazy walk over a table's raw entry spans at the declared stride.
///
/// Bounds are checked per entry, so a table valid up to entry `k` still
/// yields entries `0..k` before failing with `TruncatedTable`. Walks are
/// cheap to restart; construct a fresh walker from the same location.
pub struct TableWalker<'a> {
    source: &'a ByteSource,
    location: TableLocation,
    index: u64,
}

impl<'a> TableWalker<'a> {
    pub fn new(source: &'a ByteSource, location: TableLocation) -> Self {
        Self {
            source,
            location,
            index: 0,
        }
    }
}

impl<'a> Iterator for TableWalker<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.location.count {
            return None;
        }
        let offset = self.location.entry_offset(self.index);
        self.index += 1;
        let span = self
            .source
            .slice(offset, self.location.entry_size)
            .map_err(|_| ElfError::TruncatedTable {
                table: "table entry",
                end: offset.saturating_add(self.location.entry_size),
                size: self.source.len(),
            });
        Some(span)
    }
}
