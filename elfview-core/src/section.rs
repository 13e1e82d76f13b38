use crate::error::Result;
use crate::header::{AddressClass, ByteOrder};
use crate::reader::EntryReader;
use crate::source::ByteSource;
use crate::strtab::StringTable;

const SHT_LOOS: u32 = 0x6000_0000;
const SHT_HIOS: u32 = 0x6fff_ffff;
const SHT_LOSUNW: u32 = 0x6fff_fffa;
const SHT_LOPROC: u32 = 0x7000_0000;
const SHT_HIPROC: u32 = 0x7fff_ffff;
const SHT_LOUSER: u32 = 0x8000_0000;
const SHT_HIUSER: u32 = 0x8fff_ffff;

pub const SHF_WRITE: u64 = 1 << 0;
pub const SHF_ALLOC: u64 = 1 << 1;
pub const SHF_EXECINSTR: u64 = 1 << 2;
pub const SHF_MERGE: u64 = 1 << 4;
pub const SHF_STRINGS: u64 = 1 << 5;
pub const SHF_INFO_LINK: u64 = 1 << 6;
pub const SHF_LINK_ORDER: u64 = 1 << 7;
pub const SHF_OS_NONCONFORMING: u64 = 1 << 8;
pub const SHF_GROUP: u64 = 1 << 9;
pub const SHF_TLS: u64 = 1 << 10;
pub const SHF_COMPRESSED: u64 = 1 << 11;
pub const SHF_MASKOS: u64 = 0x0ff0_0000;
pub const SHF_MASKPROC: u64 = 0xf000_0000;
pub const SHF_EXCLUDE: u64 = 1 << 31;

/// Section header type.
///
/// Interpretation runs in three tiers: the application- and
/// processor-reserved numeric ranges map straight to generic
/// classifications; the OS-reserved range is consulted against the named
/// Sun and GNU extension codes before degrading to a generic vendor
/// label; everything else goes through the standard table, degrading to
/// `Other`. Unrecognized codes are never a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Unused table entry; filtered out of the public section list.
    Null,
    ProgBits,
    SymTab,
    StrTab,
    Rela,
    Hash,
    Dynamic,
    Note,
    /// Occupies no file bytes (e.g. `.bss`).
    NoBits,
    Rel,
    ShLib,
    DynSym,
    InitArray,
    FiniArray,
    PreinitArray,
    Group,
    SymTabShndx,
    GnuAttributes,
    GnuHash,
    GnuLiblist,
    Checksum,
    SunwMove,
    SunwComdat,
    SunwSyminfo,
    GnuVerdef,
    GnuVerneed,
    GnuVersym,
    OsSpecific(u32),
    SunSpecific(u32),
    ProcessorSpecific(u32),
    ApplicationSpecific(u32),
    Other(u32),
}

impl SectionKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            SHT_LOUSER..=SHT_HIUSER => SectionKind::ApplicationSpecific(code),
            SHT_LOPROC..=SHT_HIPROC => SectionKind::ProcessorSpecific(code),
            SHT_LOSUNW..=SHT_HIOS => match code {
                0x6fff_fffa => SectionKind::SunwMove,
                0x6fff_fffb => SectionKind::SunwComdat,
                0x6fff_fffc => SectionKind::SunwSyminfo,
                0x6fff_fffd => SectionKind::GnuVerdef,
                0x6fff_fffe => SectionKind::GnuVerneed,
                0x6fff_ffff => SectionKind::GnuVersym,
                _ => SectionKind::SunSpecific(code),
            },
            SHT_LOOS..=SHT_HIOS => match code {
                0x6fff_fff5 => SectionKind::GnuAttributes,
                0x6fff_fff6 => SectionKind::GnuHash,
                0x6fff_fff7 => SectionKind::GnuLiblist,
                0x6fff_fff8 => SectionKind::Checksum,
                _ => SectionKind::OsSpecific(code),
            },
            0 => SectionKind::Null,
            1 => SectionKind::ProgBits,
            2 => SectionKind::SymTab,
            3 => SectionKind::StrTab,
            4 => SectionKind::Rela,
            5 => SectionKind::Hash,
            6 => SectionKind::Dynamic,
            7 => SectionKind::Note,
            8 => SectionKind::NoBits,
            9 => SectionKind::Rel,
            10 => SectionKind::ShLib,
            11 => SectionKind::DynSym,
            14 => SectionKind::InitArray,
            15 => SectionKind::FiniArray,
            16 => SectionKind::PreinitArray,
            17 => SectionKind::Group,
            18 => SectionKind::SymTabShndx,
            other => SectionKind::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Null => "NULL",
            SectionKind::ProgBits => "PROGBITS",
            SectionKind::SymTab => "SYMTAB",
            SectionKind::StrTab => "STRTAB",
            SectionKind::Rela => "RELA",
            SectionKind::Hash => "HASH",
            SectionKind::Dynamic => "DYNAMIC",
            SectionKind::Note => "NOTE",
            SectionKind::NoBits => "NOBITS",
            SectionKind::Rel => "REL",
            SectionKind::ShLib => "SHLIB",
            SectionKind::DynSym => "DYNSYM",
            SectionKind::InitArray => "INIT_ARRAY",
            SectionKind::FiniArray => "FINI_ARRAY",
            SectionKind::PreinitArray => "PREINIT_ARRAY",
            SectionKind::Group => "GROUP",
            SectionKind::SymTabShndx => "SYMTAB_SHNDX",
            SectionKind::GnuAttributes => "GNU_ATTRIBUTES",
            SectionKind::GnuHash => "GNU_HASH",
            SectionKind::GnuLiblist => "GNU_LIBLIST",
            SectionKind::Checksum => "CHECKSUM",
            SectionKind::SunwMove => "SUNW_move",
            SectionKind::SunwComdat => "SUNW_COMDAT",
            SectionKind::SunwSyminfo => "SUNW_SYMINFO",
            SectionKind::GnuVerdef => "GNU_VERDEF",
            SectionKind::GnuVerneed => "GNU_VERNEED",
            SectionKind::GnuVersym => "GNU_VERSYM",
            SectionKind::OsSpecific(_) => "OS-specific",
            SectionKind::SunSpecific(_) => "Sun-specific",
            SectionKind::ProcessorSpecific(_) => "Processor-specific",
            SectionKind::ApplicationSpecific(_) => "Application-specific",
            SectionKind::Other(_) => "other",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded section header entry plus the section's content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Resolved name; empty when no string table was available.
    pub name: String,
    /// Raw offset of the name in the section name string table.
    pub name_offset: u32,
    pub kind: SectionKind,
    pub flags: u64,
    pub addr: u64,
    /// Offset of the section's content in the file.
    pub offset: u64,
    pub size: u64,
    /// Index of a related section; meaning depends on `kind`.
    pub link: u32,
    /// Auxiliary field; meaning depends on `kind`.
    pub info: u32,
    pub addralign: u64,
    /// Fixed entry size for table-like sections, 0 otherwise.
    pub entsize: u64,
    /// Copy of the file bytes `[offset, offset + size)`. Empty for
    /// `NoBits` sections, which occupy no file space.
    pub content: Vec<u8>,
}

impl Section {
    /// Decodes one raw table entry.
    ///
    /// `name` and `type` are fixed 4-byte fields in both classes. Of the
    /// remaining fields, ELF64 widens flags/addr/offset/size and
    /// addralign/entsize to 8 bytes while `sh_link` and `sh_info` stay at
    /// 4 — that asymmetry is the on-disk format, preserved as-is.
    ///
    /// `names` is `None` exactly when the string-table section itself is
    /// being decoded ahead of name resolution; the name stays empty then.
    pub fn decode(
        entry: &[u8],
        class: AddressClass,
        order: ByteOrder,
        source: &ByteSource,
        names: Option<&StringTable>,
    ) -> Result<Self> {
        let mut r = EntryReader::new(entry, order);
        let name_offset = r.read_u32()?;
        let kind = SectionKind::from_code(r.read_u32()?);
        let flags = r.read_word(class)?;
        let addr = r.read_word(class)?;
        let offset = r.read_word(class)?;
        let size = r.read_word(class)?;
        let link = r.read_u32()?;
        let info = r.read_u32()?;
        let addralign = r.read_word(class)?;
        let entsize = r.read_word(class)?;

        let name = match names {
            Some(table) => table.resolve(name_offset)?,
            None => String::new(),
        };

        let content = if matches!(kind, SectionKind::NoBits | SectionKind::Null) {
            Vec::new()
        } else {
            source.read(offset, size)?.to_vec()
        };

        Ok(Section {
            name,
            name_offset,
            kind,
            flags,
            addr,
            offset,
            size,
            link,
            info,
            addralign,
            entsize,
            content,
        })
    }

    /// Letter-code render of the flag bitmask, one character per set bit
    /// in canonical order. Reserved OS and processor mask bits each
    /// contribute their own lowercase marker.
    pub fn flags_display(&self) -> String {
        let mut s = String::new();
        if self.flags & SHF_WRITE != 0 {
            s.push('W');
        }
        if self.flags & SHF_ALLOC != 0 {
            s.push('A');
        }
        if self.flags & SHF_EXECINSTR != 0 {
            s.push('X');
        }
        if self.flags & SHF_MERGE != 0 {
            s.push('M');
        }
        if self.flags & SHF_STRINGS != 0 {
            s.push('S');
        }
        if self.flags & SHF_INFO_LINK != 0 {
            s.push('I');
        }
        if self.flags & SHF_LINK_ORDER != 0 {
            s.push('L');
        }
        if self.flags & SHF_OS_NONCONFORMING != 0 {
            s.push('O');
        }
        if self.flags & SHF_GROUP != 0 {
            s.push('G');
        }
        if self.flags & SHF_TLS != 0 {
            s.push('T');
        }
        if self.flags & SHF_COMPRESSED != 0 {
            s.push('C');
        }
        if self.flags & SHF_MASKOS != 0 {
            s.push('o');
        }
        if self.flags & SHF_MASKPROC != 0 {
            s.push('p');
        }
        if self.flags & SHF_EXCLUDE != 0 {
            s.push('E');
        }
        s
    }
}
