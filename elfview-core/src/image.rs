use std::path::Path;

use crate::error::{ElfError, Result};
use crate::header::FileHeader;
use crate::section::{Section, SectionKind};
use crate::segment::{Segment, SegmentKind};
use crate::source::ByteSource;
use crate::strtab::StringTable;
use crate::table::TableWalker;

/// A fully decoded ELF file: the header plus the materialized segment and
/// section lists, each sorted by ascending file offset. This is the public
/// entry point; construction either decodes everything or fails fast with
/// the first structural violation, releasing the byte source either way.
pub struct ElfImage {
    source: ByteSource,
    header: FileHeader,
    segments: Vec<Segment>,
    sections: Vec<Section>,
}

impl ElfImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source(ByteSource::open(path)?)
    }

    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        Self::from_source(ByteSource::new(bytes))
    }

    fn from_source(source: ByteSource) -> Result<Self> {
        let header = FileHeader::decode(&source)?;

        let names = Self::name_table(&source, &header)?;
        let segments = Self::decode_segments(&source, &header)?;
        let sections = Self::decode_sections(&source, &header, names.as_ref())?;

        log::info!(
            "decoded {} header ({}): {} segments, {} sections",
            header.class.name(),
            header.order.name(),
            segments.len(),
            sections.len()
        );

        Ok(Self {
            source,
            header,
            segments,
            sections,
        })
    }

    /// Loads the section name string table.
    ///
    /// The designated section header is decoded directly from its computed
    /// table slot, without name resolution (only its content matters
    /// here). Index 0 means the file declares no name table; `None` is
    /// returned and every name stays empty.
    fn name_table(source: &ByteSource, header: &FileHeader) -> Result<Option<StringTable>> {
        let table = header.section_table();
        if header.shnum == 0 || header.shstrndx == 0 {
            log::warn!("no section name table; section names will be empty");
            return Ok(None);
        }
        if u64::from(header.shstrndx) >= table.count {
            return Err(ElfError::TruncatedTable {
                table: "section name table entry",
                end: table.entry_offset(u64::from(header.shstrndx) + 1),
                size: source.len(),
            });
        }
        let offset = table.entry_offset(u64::from(header.shstrndx));
        let entry = source.slice(offset, table.entry_size)?;
        let names = Section::decode(entry, header.class, header.order, source, None)?;
        Ok(Some(StringTable::new(names.content)))
    }

    fn decode_segments(source: &ByteSource, header: &FileHeader) -> Result<Vec<Segment>> {
        let mut segments = Vec::with_capacity(usize::from(header.phnum));
        if header.phnum > 0 && header.phoff != 0 {
            for entry in TableWalker::new(source, header.program_table()) {
                let segment = Segment::decode(entry?, header.class, header.order)?;
                // NULL entries are table padding, not segments.
                if segment.kind != SegmentKind::Null {
                    segments.push(segment);
                }
            }
        }
        // Table order carries no layout guarantee; present by file offset.
        segments.sort_by_key(|segment| segment.offset);
        Ok(segments)
    }

    fn decode_sections(
        source: &ByteSource,
        header: &FileHeader,
        names: Option<&StringTable>,
    ) -> Result<Vec<Section>> {
        let mut sections = Vec::with_capacity(usize::from(header.shnum));
        if header.shnum > 0 && header.shoff != 0 {
            for entry in TableWalker::new(source, header.section_table()) {
                let section =
                    Section::decode(entry?, header.class, header.order, source, names)?;
                if section.kind != SectionKind::Null {
                    sections.push(section);
                }
            }
        }
        sections.sort_by_key(|section| section.offset);
        Ok(sections)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Segments sorted by ascending file offset, NULL entries discarded.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sections sorted by ascending file offset, NULL entries discarded.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Raw file bytes, bounds-checked; for byte-range dump rendering.
    pub fn bytes(&self, offset: u64, len: u64) -> Result<&[u8]> {
        self.source.read(offset, len)
    }

    /// Total size of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.source.len()
    }
}
