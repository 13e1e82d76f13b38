//! Read-only decoder for the on-disk layout of ELF object files.
//!
//! [`ElfImage`] is the entry point: it owns the file's bytes, the decoded
//! [`FileHeader`], and the materialized segment and section lists. No
//! linking, relocation, or execution semantics — structural decoding only.

pub mod error;
pub mod header;
pub mod image;
mod reader;
pub mod section;
pub mod segment;
pub mod source;
pub mod strtab;
pub mod table;

pub use error::{ElfError, Result};
pub use header::{AddressClass, ByteOrder, FileHeader};
pub use image::ElfImage;
pub use section::{Section, SectionKind};
pub use segment::{Segment, SegmentKind};
pub use source::ByteSource;
pub use strtab::StringTable;
pub use table::{TableLocation, TableWalker};
