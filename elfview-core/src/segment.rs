use crate::error::Result;
use crate::header::{AddressClass, ByteOrder};
use crate::reader::EntryReader;

const PT_LOOS: u32 = 0x6000_0000;
const PT_HIOS: u32 = 0x6fff_ffff;
const PT_LOPROC: u32 = 0x7000_0000;
const PT_HIPROC: u32 = 0x7fff_ffff;

const PF_X: u32 = 1 << 0;
const PF_W: u32 = 1 << 1;
const PF_R: u32 = 1 << 2;

/// Program header entry type. Codes outside every named value degrade to
/// the range classifications instead of failing; a viewer must keep
/// decoding files that use extensions it has never heard of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Unused table entry; filtered out of the public segment list.
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    /// Reserved, unspecified semantics.
    ShLib,
    /// The program header table itself.
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    SunwBss,
    SunwStack,
    OsSpecific(u32),
    ProcessorSpecific(u32),
    Other(u32),
}

impl SegmentKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => SegmentKind::Null,
            1 => SegmentKind::Load,
            2 => SegmentKind::Dynamic,
            3 => SegmentKind::Interp,
            4 => SegmentKind::Note,
            5 => SegmentKind::ShLib,
            6 => SegmentKind::Phdr,
            7 => SegmentKind::Tls,
            0x6474_e550 => SegmentKind::GnuEhFrame,
            0x6474_e551 => SegmentKind::GnuStack,
            0x6474_e552 => SegmentKind::GnuRelro,
            0x6fff_fffa => SegmentKind::SunwBss,
            0x6fff_fffb => SegmentKind::SunwStack,
            PT_LOOS..=PT_HIOS => SegmentKind::OsSpecific(code),
            PT_LOPROC..=PT_HIPROC => SegmentKind::ProcessorSpecific(code),
            other => SegmentKind::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Null => "NULL",
            SegmentKind::Load => "LOAD",
            SegmentKind::Dynamic => "DYNAMIC",
            SegmentKind::Interp => "INTERP",
            SegmentKind::Note => "NOTE",
            SegmentKind::ShLib => "SHLIB",
            SegmentKind::Phdr => "PHDR",
            SegmentKind::Tls => "TLS",
            SegmentKind::GnuEhFrame => "GNU_EH_FRAME",
            SegmentKind::GnuStack => "GNU_STACK",
            SegmentKind::GnuRelro => "GNU_RELRO",
            SegmentKind::SunwBss => "SUNWBSS",
            SegmentKind::SunwStack => "SUNWSTACK",
            SegmentKind::OsSpecific(_) => "OS-specific",
            SegmentKind::ProcessorSpecific(_) => "Processor-specific",
            SegmentKind::Other(_) => "Other",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded program header entry, normalized across classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Offset of the segment's bytes in the file.
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub file_size: u64,
    pub mem_size: u64,
    pub flags: u32,
    pub align: u64,
}

impl Segment {
    /// Decodes one raw table entry.
    ///
    /// The on-disk field order differs by class: ELF32 places `p_flags`
    /// after `p_memsz`, ELF64 places it directly after `p_type`. This is
    /// mandated by the format, not a normalization opportunity.
    pub fn decode(entry: &[u8], class: AddressClass, order: ByteOrder) -> Result<Self> {
        let mut r = EntryReader::new(entry, order);
        let kind = SegmentKind::from_code(r.read_u32()?);

        match class {
            AddressClass::ThirtyTwoBit => {
                let offset = r.read_word(class)?;
                let vaddr = r.read_word(class)?;
                let paddr = r.read_word(class)?;
                let file_size = r.read_word(class)?;
                let mem_size = r.read_word(class)?;
                let flags = r.read_u32()?;
                let align = r.read_word(class)?;
                Ok(Segment {
                    kind,
                    offset,
                    vaddr,
                    paddr,
                    file_size,
                    mem_size,
                    flags,
                    align,
                })
            }
            AddressClass::SixtyFourBit => {
                let flags = r.read_u32()?;
                let offset = r.read_word(class)?;
                let vaddr = r.read_word(class)?;
                let paddr = r.read_word(class)?;
                let file_size = r.read_word(class)?;
                let mem_size = r.read_word(class)?;
                let align = r.read_word(class)?;
                Ok(Segment {
                    kind,
                    offset,
                    vaddr,
                    paddr,
                    file_size,
                    mem_size,
                    flags,
                    align,
                })
            }
        }
    }

    /// Fixed-width `RWE` permission summary; unset bits render as a space
    /// so columns stay aligned.
    pub fn flags_display(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(if self.flags & PF_R != 0 { 'R' } else { ' ' });
        s.push(if self.flags & PF_W != 0 { 'W' } else { ' ' });
        s.push(if self.flags & PF_X != 0 { 'E' } else { ' ' });
        s
    }
}
