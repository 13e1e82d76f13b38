use anyhow::{Result, bail};
use colored::Colorize;
use elfview_core::{AddressClass, ElfImage, Section, Segment};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Hex width for address-sized values: 8 digits for ELF32, 16 for ELF64.
fn addr_width(class: AddressClass) -> usize {
    match class {
        AddressClass::ThirtyTwoBit => 8,
        AddressClass::SixtyFourBit => 16,
    }
}

fn hex(value: u64, width: usize) -> String {
    format!("0x{value:0width$x}")
}

#[derive(Serialize)]
struct HeaderJson {
    class: &'static str,
    encoding: &'static str,
    os_abi: &'static str,
    object_type: &'static str,
    machine: &'static str,
    version: u32,
    entry: u64,
    program_header_offset: u64,
    section_header_offset: u64,
    flags: u32,
    header_size: u16,
    program_entry_size: u16,
    program_entry_count: u16,
    section_entry_size: u16,
    section_entry_count: u16,
    string_table_index: u16,
}

pub fn header(image: &ElfImage, json: bool) -> Result<()> {
    let h = image.header();
    if json {
        let out = HeaderJson {
            class: h.class.name(),
            encoding: h.order.name(),
            os_abi: h.osabi_name(),
            object_type: h.object_type_name(),
            machine: h.machine_name(),
            version: h.version,
            entry: h.entry,
            program_header_offset: h.phoff,
            section_header_offset: h.shoff,
            flags: h.flags,
            header_size: h.ehsize,
            program_entry_size: h.phentsize,
            program_entry_count: h.phnum,
            section_entry_size: h.shentsize,
            section_entry_count: h.shnum,
            string_table_index: h.shstrndx,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let width = addr_width(h.class);
    println!("{}", "ELF Header".bold());
    println!("  Class:      {}", h.class.name());
    println!("  Data:       {}", h.order.name());
    println!("  OS/ABI:     {}", h.osabi_name());
    println!("  Type:       {}", h.object_type_name());
    println!("  Machine:    {}", h.machine_name());
    println!("  Version:    {}", h.version);
    println!("  Entry:      {}", hex(h.entry, width).green());
    println!(
        "  Program headers: {} entries of {} bytes at {}",
        h.phnum,
        h.phentsize,
        hex(h.phoff, width)
    );
    println!(
        "  Section headers: {} entries of {} bytes at {}",
        h.shnum,
        h.shentsize,
        hex(h.shoff, width)
    );
    println!("  Section name table index: {}", h.shstrndx);
    Ok(())
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "VirtAddr")]
    vaddr: String,
    #[tabled(rename = "PhysAddr")]
    paddr: String,
    #[tabled(rename = "FileSiz")]
    file_size: u64,
    #[tabled(rename = "MemSiz")]
    mem_size: u64,
    #[tabled(rename = "Flg")]
    flags: String,
    #[tabled(rename = "Align")]
    align: String,
}

#[derive(Serialize)]
struct SegmentJson<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    offset: u64,
    virtual_address: u64,
    physical_address: u64,
    file_size: u64,
    memory_size: u64,
    flags: u32,
    permissions: String,
    align: u64,
}

pub fn segments(image: &ElfImage, json: bool) -> Result<()> {
    if json {
        let rows: Vec<SegmentJson> = image
            .segments()
            .iter()
            .map(|s: &Segment| SegmentJson {
                kind: s.kind.name(),
                offset: s.offset,
                virtual_address: s.vaddr,
                physical_address: s.paddr,
                file_size: s.file_size,
                memory_size: s.mem_size,
                flags: s.flags,
                permissions: s.flags_display(),
                align: s.align,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if image.segments().is_empty() {
        println!("No segments (the file declares no program headers).");
        return Ok(());
    }
    let width = addr_width(image.header().class);
    let rows: Vec<SegmentRow> = image
        .segments()
        .iter()
        .map(|s| SegmentRow {
            kind: s.kind.name().to_string(),
            offset: hex(s.offset, width),
            vaddr: hex(s.vaddr, width),
            paddr: hex(s.paddr, width),
            file_size: s.file_size,
            mem_size: s.mem_size,
            flags: s.flags_display(),
            align: format!("0x{:x}", s.align),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Address")]
    addr: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Lk")]
    link: u32,
    #[tabled(rename = "Inf")]
    info: u32,
    #[tabled(rename = "Al")]
    addralign: u64,
}

#[derive(Serialize)]
struct SectionJson<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    address: u64,
    offset: u64,
    size: u64,
    flags: u64,
    flag_letters: String,
    link: u32,
    info: u32,
    address_align: u64,
    entry_size: u64,
}

pub fn sections(image: &ElfImage, json: bool) -> Result<()> {
    if json {
        let rows: Vec<SectionJson> = image
            .sections()
            .iter()
            .map(|s: &Section| SectionJson {
                name: &s.name,
                kind: s.kind.name(),
                address: s.addr,
                offset: s.offset,
                size: s.size,
                flags: s.flags,
                flag_letters: s.flags_display(),
                link: s.link,
                info: s.info,
                address_align: s.addralign,
                entry_size: s.entsize,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if image.sections().is_empty() {
        println!("No sections (possibly a stripped or core file).");
        return Ok(());
    }
    let width = addr_width(image.header().class);
    let rows: Vec<SectionRow> = image
        .sections()
        .iter()
        .map(|s| SectionRow {
            name: s.name.clone(),
            kind: s.kind.name().to_string(),
            addr: hex(s.addr, width),
            offset: hex(s.offset, width),
            size: s.size,
            flags: s.flags_display(),
            link: s.link,
            info: s.info,
            addralign: s.addralign,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}

pub fn dump(image: &ElfImage, name: &str) -> Result<()> {
    let Some(section) = image.section_by_name(name) else {
        bail!(
            "no section named {:?}; available: {}",
            name,
            image
                .sections()
                .iter()
                .map(|s| s.name.as_str())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };
    println!(
        "{} {} ({}, {} bytes at {})",
        "Section".bold(),
        section.name.cyan(),
        section.kind,
        section.size,
        hex(section.offset, addr_width(image.header().class))
    );
    if section.content.is_empty() {
        println!("<no content in file>");
    } else {
        print!("{}", hexdump(&section.content, section.offset));
    }
    Ok(())
}

/// Classic three-column hex dump: file offset, 16 hex bytes, ASCII gutter.
fn hexdump(bytes: &[u8], base: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let cells: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{:08x}  {:<47}  |{}|\n",
            base + (i as u64) * 16,
            cells.join(" "),
            ascii
        ));
    }
    out
}

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Component")]
    component: String,
}

/// Every component of the file (header, both tables, every section) in
/// ascending file-offset order, showing how the bytes are laid out.
pub fn layout(image: &ElfImage) {
    let h = image.header();
    let width = addr_width(h.class);

    let mut components: Vec<(u64, u64, String)> = vec![(
        0,
        u64::from(h.ehsize),
        "ELF header".cyan().to_string(),
    )];
    let ph = h.program_table();
    if ph.count > 0 {
        components.push((
            ph.offset,
            ph.byte_size(),
            "program header table".cyan().to_string(),
        ));
    }
    let sh = h.section_table();
    if sh.count > 0 {
        components.push((
            sh.offset,
            sh.byte_size(),
            "section header table".cyan().to_string(),
        ));
    }
    for section in image.sections() {
        components.push((section.offset, section.size, section.name.clone()));
    }
    components.sort_by_key(|&(offset, _, _)| offset);

    let rows: Vec<LayoutRow> = components
        .into_iter()
        .map(|(offset, size, component)| LayoutRow {
            offset: hex(offset, width),
            size,
            component,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::psql()));
    println!("total file size: {} bytes", image.file_size());
}
