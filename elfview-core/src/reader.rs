use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::error::{ElfError, Result};
use crate::header::{AddressClass, ByteOrder};

/// Sequential field reader over one raw entry span.
///
/// Honors the file's detected byte order for every multi-byte read and
/// widens class-dependent words to `u64` so downstream code stays
/// class-agnostic.
pub(crate) struct EntryReader<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> EntryReader<'a> {
    pub(crate) fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, pos: 0, order }
    }

    pub(crate) fn at(data: &'a [u8], pos: usize, order: ByteOrder) -> Self {
        Self { data, pos, order }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(ElfError::OutOfBounds {
                offset: self.pos as u64,
                len: len as u64,
                size: self.data.len() as u64,
            }),
        }
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(match self.order {
            ByteOrder::Little => LittleEndian::read_u16(bytes),
            ByteOrder::Big => BigEndian::read_u16(bytes),
        })
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(match self.order {
            ByteOrder::Little => LittleEndian::read_u32(bytes),
            ByteOrder::Big => BigEndian::read_u32(bytes),
        })
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(match self.order {
            ByteOrder::Little => LittleEndian::read_u64(bytes),
            ByteOrder::Big => BigEndian::read_u64(bytes),
        })
    }

    /// Reads an address/offset-sized word: 4 bytes under ELF32, 8 under
    /// ELF64, widened to `u64` either way.
    pub(crate) fn read_word(&mut self, class: AddressClass) -> Result<u64> {
        match class {
            AddressClass::ThirtyTwoBit => Ok(u64::from(self.read_u32()?)),
            AddressClass::SixtyFourBit => self.read_u64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_byte_orders() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        let mut le = EntryReader::new(&bytes, ByteOrder::Little);
        assert_eq!(le.read_u32().unwrap(), 0x0403_0201);
        let mut be = EntryReader::new(&bytes, ByteOrder::Big);
        assert_eq!(be.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn word_width_follows_class() {
        let bytes = [0xaa, 0, 0, 0, 0, 0, 0, 0];
        let mut r = EntryReader::new(&bytes, ByteOrder::Little);
        assert_eq!(r.read_word(AddressClass::ThirtyTwoBit).unwrap(), 0xaa);
        let mut r = EntryReader::new(&bytes, ByteOrder::Little);
        assert_eq!(r.read_word(AddressClass::SixtyFourBit).unwrap(), 0xaa);
    }

    #[test]
    fn short_span_is_out_of_bounds() {
        let bytes = [0u8; 3];
        let mut r = EntryReader::new(&bytes, ByteOrder::Little);
        assert!(matches!(r.read_u32(), Err(ElfError::OutOfBounds { .. })));
    }
}
