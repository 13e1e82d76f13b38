//! End-to-end decoding tests over synthetic ELF files built byte by byte,
//! covering both address classes and both byte orders.

use elfview_core::{AddressClass, ByteOrder, ElfError, ElfImage, SectionKind, SegmentKind};

#[derive(Clone, Copy)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn ident_byte(self) -> u8 {
        match self {
            Endian::Little => 1,
            Endian::Big => 2,
        }
    }

    fn u16(self, v: u16) -> [u8; 2] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u32(self, v: u32) -> [u8; 4] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u64(self, v: u64) -> [u8; 8] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }
}

fn pad_to(bytes: &mut Vec<u8>, offset: usize) {
    assert!(bytes.len() <= offset, "fixture layout overlap");
    bytes.resize(offset, 0);
}

fn phdr64(e: Endian, kind: u32, flags: u32, offset: u64, vaddr: u64, filesz: u64, memsz: u64, align: u64) -> Vec<u8> {
    let mut p = Vec::with_capacity(56);
    p.extend_from_slice(&e.u32(kind));
    p.extend_from_slice(&e.u32(flags));
    p.extend_from_slice(&e.u64(offset));
    p.extend_from_slice(&e.u64(vaddr));
    p.extend_from_slice(&e.u64(vaddr)); // paddr mirrors vaddr
    p.extend_from_slice(&e.u64(filesz));
    p.extend_from_slice(&e.u64(memsz));
    p.extend_from_slice(&e.u64(align));
    p
}

#[allow(clippy::too_many_arguments)]
fn shdr64(
    e: Endian,
    name: u32,
    kind: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    addralign: u64,
) -> Vec<u8> {
    let mut s = Vec::with_capacity(64);
    s.extend_from_slice(&e.u32(name));
    s.extend_from_slice(&e.u32(kind));
    s.extend_from_slice(&e.u64(flags));
    s.extend_from_slice(&e.u64(addr));
    s.extend_from_slice(&e.u64(offset));
    s.extend_from_slice(&e.u64(size));
    s.extend_from_slice(&e.u32(0)); // link
    s.extend_from_slice(&e.u32(0)); // info
    s.extend_from_slice(&e.u64(addralign));
    s.extend_from_slice(&e.u64(0)); // entsize
    s
}

const TEXT64_OFFSET: u64 = 0x100;
const TEXT64_BYTES: [u8; 8] = [0x55, 0x48, 0x89, 0xe5, 0x90, 0x5d, 0xc3, 0x00];
const NAMES: &[u8] = b"\0.text\0.shstrtab\0";
const STRTAB64_OFFSET: u64 = 0x110;
const SHDRS64_OFFSET: u64 = 0x130;

/// Minimal 64-bit executable: one PT_NULL + one PT_LOAD, and a section
/// table holding a null entry, `.shstrtab`, then `.text` — deliberately
/// not in file-offset order, with the name table at index 1.
fn build_elf64(e: Endian) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, e.ident_byte(), 1, 0]);
    bytes.extend_from_slice(&[0; 8]);
    bytes.extend_from_slice(&e.u16(2)); // ET_EXEC
    bytes.extend_from_slice(&e.u16(62)); // EM_X86_64
    bytes.extend_from_slice(&e.u32(1));
    bytes.extend_from_slice(&e.u64(0x401000)); // entry
    bytes.extend_from_slice(&e.u64(64)); // phoff
    bytes.extend_from_slice(&e.u64(SHDRS64_OFFSET)); // shoff
    bytes.extend_from_slice(&e.u32(0)); // flags
    bytes.extend_from_slice(&e.u16(64)); // ehsize
    bytes.extend_from_slice(&e.u16(56)); // phentsize
    bytes.extend_from_slice(&e.u16(2)); // phnum
    bytes.extend_from_slice(&e.u16(64)); // shentsize
    bytes.extend_from_slice(&e.u16(3)); // shnum
    bytes.extend_from_slice(&e.u16(1)); // shstrndx -> .shstrtab
    assert_eq!(bytes.len(), 64);

    bytes.extend_from_slice(&phdr64(e, 0, 0, 0, 0, 0, 0, 0)); // PT_NULL padding
    bytes.extend_from_slice(&phdr64(e, 1, 0x5, TEXT64_OFFSET, 0x401000, 8, 8, 0x1000));

    pad_to(&mut bytes, TEXT64_OFFSET as usize);
    bytes.extend_from_slice(&TEXT64_BYTES);

    pad_to(&mut bytes, STRTAB64_OFFSET as usize);
    bytes.extend_from_slice(NAMES);

    pad_to(&mut bytes, SHDRS64_OFFSET as usize);
    bytes.extend_from_slice(&shdr64(e, 0, 0, 0, 0, 0, 0, 0)); // SHT_NULL
    bytes.extend_from_slice(&shdr64(e, 7, 3, 0, 0, STRTAB64_OFFSET, NAMES.len() as u64, 1));
    bytes.extend_from_slice(&shdr64(e, 1, 1, 0x6, 0x401000, TEXT64_OFFSET, 8, 16));
    bytes
}

/// Minimal 32-bit little-endian file exercising the narrow field widths
/// and the ELF32 program-header field order (flags after the sizes).
fn build_elf32() -> Vec<u8> {
    let e = Endian::Little;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x7f, b'E', b'L', b'F', 1, 1, 1, 0]);
    bytes.extend_from_slice(&[0; 8]);
    bytes.extend_from_slice(&e.u16(2));
    bytes.extend_from_slice(&e.u16(3)); // EM_386
    bytes.extend_from_slice(&e.u32(1));
    bytes.extend_from_slice(&e.u32(0x8048000)); // entry
    bytes.extend_from_slice(&e.u32(52)); // phoff
    bytes.extend_from_slice(&e.u32(120)); // shoff
    bytes.extend_from_slice(&e.u32(0));
    bytes.extend_from_slice(&e.u16(52));
    bytes.extend_from_slice(&e.u16(32));
    bytes.extend_from_slice(&e.u16(1));
    bytes.extend_from_slice(&e.u16(40));
    bytes.extend_from_slice(&e.u16(3));
    bytes.extend_from_slice(&e.u16(1));
    assert_eq!(bytes.len(), 52);

    // ELF32 phdr: type, offset, vaddr, paddr, filesz, memsz, flags, align.
    for v in [1u32, 96, 0x8048000, 0x8048000, 4, 4, 0x5, 0x1000] {
        bytes.extend_from_slice(&e.u32(v));
    }

    pad_to(&mut bytes, 96);
    bytes.extend_from_slice(&[0xcd, 0x80, 0x90, 0xc3]);
    pad_to(&mut bytes, 100);
    bytes.extend_from_slice(NAMES);

    pad_to(&mut bytes, 120);
    let shdr32 = |name: u32, kind: u32, flags: u32, addr: u32, offset: u32, size: u32, align: u32| {
        let mut s = Vec::with_capacity(40);
        for v in [name, kind, flags, addr, offset, size, 0, 0, align, 0] {
            s.extend_from_slice(&e.u32(v));
        }
        s
    };
    bytes.extend_from_slice(&shdr32(0, 0, 0, 0, 0, 0, 0));
    bytes.extend_from_slice(&shdr32(7, 3, 0, 0, 100, NAMES.len() as u32, 1));
    bytes.extend_from_slice(&shdr32(1, 1, 0x6, 0x8048000, 96, 4, 4));
    bytes
}

#[test]
fn minimal_elf64_end_to_end() {
    let image = ElfImage::parse(build_elf64(Endian::Little)).unwrap();

    let header = image.header();
    assert_eq!(header.class, AddressClass::SixtyFourBit);
    assert_eq!(header.order, ByteOrder::Little);
    assert_eq!(header.machine, 62);
    assert_eq!(header.entry, 0x401000);

    // The PT_NULL entry is discarded.
    assert_eq!(image.segments().len(), 1);
    let load = &image.segments()[0];
    assert_eq!(load.kind, SegmentKind::Load);
    assert_eq!(load.offset, TEXT64_OFFSET);
    assert_eq!(load.file_size, 8);
    assert_eq!(load.flags_display(), "R E");

    // SHT_NULL discarded, remainder sorted by file offset despite the
    // table listing .shstrtab first.
    let names: Vec<&str> = image.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![".text", ".shstrtab"]);
    let text = image.section_by_name(".text").unwrap();
    assert_eq!(text.kind, SectionKind::ProgBits);
    assert_eq!(text.flags_display(), "AX");
    assert_eq!(text.addralign, 16);
    let strtab = image.section_by_name(".shstrtab").unwrap();
    assert_eq!(strtab.kind, SectionKind::StrTab);
}

#[test]
fn content_matches_file_byte_ranges() {
    let image = ElfImage::parse(build_elf64(Endian::Little)).unwrap();
    for section in image.sections() {
        assert_eq!(section.content.len() as u64, section.size);
        assert_eq!(
            section.content.as_slice(),
            image.bytes(section.offset, section.size).unwrap()
        );
    }
    assert_eq!(
        image.section_by_name(".text").unwrap().content,
        TEXT64_BYTES
    );
}

#[test]
fn parsing_is_idempotent() {
    let bytes = build_elf64(Endian::Little);
    let first = ElfImage::parse(bytes.clone()).unwrap();
    let second = ElfImage::parse(bytes).unwrap();
    assert_eq!(first.header(), second.header());
    assert_eq!(first.segments(), second.segments());
    assert_eq!(first.sections(), second.sections());
}

#[test]
fn elf32_decodes_at_narrow_widths() {
    let image = ElfImage::parse(build_elf32()).unwrap();

    let header = image.header();
    assert_eq!(header.class, AddressClass::ThirtyTwoBit);
    assert_eq!(header.entry, 0x8048000);
    assert_eq!(header.phentsize, 32);
    assert_eq!(header.shentsize, 40);

    // ELF32 field order: flags decoded from after the sizes, not after type.
    let load = &image.segments()[0];
    assert_eq!(load.kind, SegmentKind::Load);
    assert_eq!(load.offset, 96);
    assert_eq!(load.file_size, 4);
    assert_eq!(load.mem_size, 4);
    assert_eq!(load.flags_display(), "R E");
    assert_eq!(load.align, 0x1000);

    let names: Vec<&str> = image.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![".text", ".shstrtab"]);
    assert_eq!(image.section_by_name(".text").unwrap().content, [0xcd, 0x80, 0x90, 0xc3]);
}

#[test]
fn big_endian_decodes_correctly() {
    let image = ElfImage::parse(build_elf64(Endian::Big)).unwrap();

    let header = image.header();
    assert_eq!(header.order, ByteOrder::Big);
    assert_eq!(header.machine, 62);
    assert_eq!(header.entry, 0x401000);

    assert_eq!(image.segments().len(), 1);
    assert_eq!(image.segments()[0].kind, SegmentKind::Load);
    let names: Vec<&str> = image.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec![".text", ".shstrtab"]);
}

#[test]
fn truncated_section_table_is_rejected() {
    let mut bytes = build_elf64(Endian::Little);
    // Cut the file mid-way through the section header table.
    bytes.truncate(SHDRS64_OFFSET as usize + 100);
    match ElfImage::parse(bytes) {
        Err(ElfError::TruncatedTable { .. }) => {}
        other => panic!("expected TruncatedTable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_name_table_yields_empty_names() {
    let mut bytes = build_elf64(Endian::Little);
    bytes[62] = 0; // shstrndx = SHN_UNDEF: sections, but no name table
    let image = ElfImage::parse(bytes).expect("a file without a name table must still decode");

    // Structure decodes as usual; only the resolved names are absent.
    assert_eq!(image.segments().len(), 1);
    let kinds: Vec<SectionKind> = image.sections().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SectionKind::ProgBits, SectionKind::StrTab]);
    assert!(image.sections().iter().all(|s| s.name.is_empty()));
    // Raw name-table offsets are still exposed.
    let offsets: Vec<u32> = image.sections().iter().map(|s| s.name_offset).collect();
    assert_eq!(offsets, vec![1, 7]);
}

#[test]
fn name_table_index_outside_table_is_rejected() {
    let mut bytes = build_elf64(Endian::Little);
    bytes[62] = 7; // shstrndx, little-endian low byte
    assert!(matches!(
        ElfImage::parse(bytes),
        Err(ElfError::TruncatedTable { .. })
    ));
}

#[test]
fn non_elf_input_is_rejected_before_anything_else() {
    let mut bytes = build_elf64(Endian::Little);
    bytes[3] = b'Z';
    assert!(matches!(ElfImage::parse(bytes), Err(ElfError::NotAnElfFile)));
    assert!(matches!(
        ElfImage::parse(b"#!/bin/sh\necho hi\n".to_vec()),
        Err(ElfError::NotAnElfFile)
    ));
}
