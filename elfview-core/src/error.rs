use thiserror::Error;

/// Failure kinds for ELF decoding.
///
/// Structural violations (bad magic, truncated tables, out-of-range reads)
/// abort the whole parse. Unrecognized type or flag codes are *not* errors;
/// they degrade to generic classifications so that files using future ELF
/// extensions still decode.
#[derive(Debug, Error)]
pub enum ElfError {
    #[error("not an ELF file (bad magic)")]
    NotAnElfFile,

    #[error("unrecognized ELF class byte {0:#04x}")]
    InvalidClass(u8),

    #[error("unrecognized ELF data encoding byte {0:#04x}")]
    InvalidEncoding(u8),

    #[error("{table} extends past the end of the file ({end:#x} > {size:#x})")]
    TruncatedTable {
        table: &'static str,
        end: u64,
        size: u64,
    },

    #[error("read of {len} bytes at offset {offset:#x} is out of bounds (source size {size:#x})")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    #[error("name offset {offset:#x} lies outside the string table (size {size:#x})")]
    NameOutOfBounds { offset: u64, size: u64 },

    #[error("unterminated name at string table offset {0:#x}")]
    UnterminatedName(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElfError>;
