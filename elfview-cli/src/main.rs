use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use elfview_core::ElfImage;

mod render;

/// ELF layout inspection CLI
#[derive(Parser)]
#[command(
    name = "elfview",
    about = "Inspect the layout of ELF object files (header, segments, sections)",
    version,
    author
)]
struct Cli {
    /// Path to an ELF file
    #[arg(required = true)]
    path: std::path::PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the decoded file header
    Header {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List segments (program headers) in file-offset order
    Segments {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List sections in file-offset order
    Sections {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Hex dump one section's content
    Dump {
        /// Section name, e.g. .text
        section: String,
    },
    /// List every file component in ascending file-offset order
    Layout,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.path.exists() {
        bail!("file {} does not exist", cli.path.display());
    }
    std::fs::File::open(&cli.path)
        .with_context(|| format!("file {} is not readable", cli.path.display()))?;

    let image = ElfImage::open(&cli.path)
        .with_context(|| format!("failed to decode {}", cli.path.display()))?;
    log::debug!(
        "{}: {} segments, {} sections",
        cli.path.display(),
        image.segments().len(),
        image.sections().len()
    );

    match cli.command {
        Command::Header { json } => render::header(&image, json)?,
        Command::Segments { json } => render::segments(&image, json)?,
        Command::Sections { json } => render::sections(&image, json)?,
        Command::Dump { section } => render::dump(&image, &section)?,
        Command::Layout => render::layout(&image),
    }

    Ok(())
}
