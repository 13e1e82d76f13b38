use crate::error::{ElfError, Result};
use crate::reader::EntryReader;
use crate::source::ByteSource;
use crate::table::TableLocation;

/// `\x7fELF`, the first four identification bytes of every ELF file.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const EI_OSABI: usize = 7;
const EI_NIDENT: usize = 16;

const EHDR_SIZE_32: u64 = 52;
const EHDR_SIZE_64: u64 = 64;

/// The file's declared address width, decided once from identification
/// byte 4. Every class-dependent field width and the program-header field
/// ordering hang off this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    ThirtyTwoBit,
    SixtyFourBit,
}

impl AddressClass {
    fn from_ident(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(AddressClass::ThirtyTwoBit),
            2 => Ok(AddressClass::SixtyFourBit),
            other => Err(ElfError::InvalidClass(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AddressClass::ThirtyTwoBit => "ELF32",
            AddressClass::SixtyFourBit => "ELF64",
        }
    }
}

/// Multi-byte integer encoding, decided once from identification byte 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn from_ident(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(ByteOrder::Little),
            2 => Ok(ByteOrder::Big),
            other => Err(ElfError::InvalidEncoding(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Little => "little-endian",
            ByteOrder::Big => "big-endian",
        }
    }
}

/// The decoded ELF file header (`Elf32_Ehdr`/`Elf64_Ehdr`), normalized so
/// that address-sized fields are `u64` regardless of class.
///
/// Decoding order matters: the magic is verified before anything else is
/// interpreted, because the class byte gates the layout of every field
/// after the identification block, and the data-encoding byte gates how
/// every number is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Raw identification bytes (magic, class, encoding, version, OS/ABI).
    pub ident: [u8; 16],
    pub class: AddressClass,
    pub order: ByteOrder,
    /// OS/ABI identification byte.
    pub osabi: u8,
    /// Object file type (`ET_REL`, `ET_EXEC`, `ET_DYN`, ...).
    pub object_type: u16,
    /// Target architecture (`EM_X86_64`, `EM_AARCH64`, ...).
    pub machine: u16,
    pub version: u32,
    /// Virtual address of the program entry point.
    pub entry: u64,
    /// File offset of the program header table.
    pub phoff: u64,
    /// File offset of the section header table.
    pub shoff: u64,
    pub flags: u32,
    /// Size of this header in the file.
    pub ehsize: u16,
    pub phentsize: u16,
    pub phnum: u16,
    pub shentsize: u16,
    pub shnum: u16,
    /// Index of the section holding the section name string table.
    pub shstrndx: u16,
}

impl FileHeader {
    pub fn decode(source: &ByteSource) -> Result<Self> {
        // Magic first: nothing else may be interpreted until the file is
        // known to be ELF at all.
        if source.read(0, 4).map_or(true, |magic| magic != ELF_MAGIC) {
            return Err(ElfError::NotAnElfFile);
        }
        let mut ident = [0u8; 16];
        ident.copy_from_slice(source.read(0, EI_NIDENT as u64)?);

        let class = AddressClass::from_ident(ident[EI_CLASS])?;
        let order = ByteOrder::from_ident(ident[EI_DATA])?;
        let osabi = ident[EI_OSABI];

        let ehdr_size = match class {
            AddressClass::ThirtyTwoBit => EHDR_SIZE_32,
            AddressClass::SixtyFourBit => EHDR_SIZE_64,
        };
        let bytes = source.read(0, ehdr_size)?;
        let mut reader = EntryReader::at(bytes, EI_NIDENT, order);

        let header = FileHeader {
            ident,
            class,
            order,
            osabi,
            object_type: reader.read_u16()?,
            machine: reader.read_u16()?,
            version: reader.read_u32()?,
            entry: reader.read_word(class)?,
            phoff: reader.read_word(class)?,
            shoff: reader.read_word(class)?,
            flags: reader.read_u32()?,
            ehsize: reader.read_u16()?,
            phentsize: reader.read_u16()?,
            phnum: reader.read_u16()?,
            shentsize: reader.read_u16()?,
            shnum: reader.read_u16()?,
            shstrndx: reader.read_u16()?,
        };

        header
            .program_table()
            .check_within(source.len(), "program header table")?;
        header
            .section_table()
            .check_within(source.len(), "section header table")?;

        Ok(header)
    }

    /// Location of the program header table, as declared by this header.
    pub fn program_table(&self) -> TableLocation {
        TableLocation {
            offset: self.phoff,
            count: u64::from(self.phnum),
            entry_size: u64::from(self.phentsize),
        }
    }

    /// Location of the section header table, as declared by this header.
    pub fn section_table(&self) -> TableLocation {
        TableLocation {
            offset: self.shoff,
            count: u64::from(self.shnum),
            entry_size: u64::from(self.shentsize),
        }
    }

    pub fn object_type_name(&self) -> &'static str {
        match self.object_type {
            0 => "NONE",
            1 => "REL (relocatable file)",
            2 => "EXEC (executable file)",
            3 => "DYN (shared object)",
            4 => "CORE (core dump)",
            0xfe00..=0xfeff => "OS-specific",
            0xff00..=0xffff => "Processor-specific",
            _ => "Other",
        }
    }

    pub fn machine_name(&self) -> &'static str {
        match self.machine {
            0 => "None",
            2 => "SPARC",
            3 => "Intel 80386",
            8 => "MIPS",
            20 => "PowerPC",
            21 => "PowerPC64",
            22 => "IBM S/390",
            40 => "ARM",
            50 => "Intel IA-64",
            62 => "AMD x86-64",
            183 => "AArch64",
            243 => "RISC-V",
            _ => "Other",
        }
    }

    pub fn osabi_name(&self) -> &'static str {
        match self.osabi {
            0 => "UNIX - System V",
            1 => "HP-UX",
            2 => "NetBSD",
            3 => "Linux",
            6 => "Solaris",
            9 => "FreeBSD",
            12 => "OpenBSD",
            _ => "Other",
        }
    }
}
