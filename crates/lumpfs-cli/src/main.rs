//! Command-line inspector for lumpfs.
//!
//! Mounts the given files in order, then lists, resolves or extracts lumps
//! through the same lookup path a game would use.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumpfs::{Container, EntryInfo, LumpNum, OpenMode, Vfs, VfsConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "lumpfs",
    about = "Inspect Doom-engine WAD and PK3 files through a virtual file system",
    version
)]
struct Cli {
    /// Base path that relative paths and Zip entries are rooted at
    #[arg(long, env = "LUMPFS_BASE", global = true)]
    base: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, env = "LUMPFS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// File to mount; repeat to mount several, in load order
    #[arg(short, long = "file", global = true)]
    files: Vec<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every lump in index order
    List {
        /// More files to mount after the --file ones
        paths: Vec<String>,
    },

    /// Resolve a lump name, optionally size-qualified (`DEMO1>=100`)
    Lookup {
        /// Lump name
        name: String,
    },

    /// Write a lump or virtual file to disk
    Extract {
        /// Lump name or virtual path
        name: String,
        /// Output file
        output: PathBuf,
    },

    /// Print mounted containers
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut vfs = Vfs::new(config);
    let extra = match &cli.command {
        Commands::List { paths } => paths.as_slice(),
        _ => &[],
    };
    for path in cli.files.iter().chain(extra) {
        if vfs
            .add_file(path, false)
            .with_context(|| format!("Failed to mount {path}"))?
            .is_none()
        {
            warn!("{} was not mounted", path);
        }
    }
    vfs.end_startup();

    match &cli.command {
        Commands::List { .. } => list(&vfs, cli.json),
        Commands::Lookup { name } => lookup(&vfs, name, cli.json)?,
        Commands::Extract { name, output } => extract(&vfs, name, output)?,
        Commands::Info => print_info(&vfs, cli.json),
    }

    vfs.shutdown();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<VfsConfig> {
    let mut config = match &cli.config {
        Some(path) => VfsConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => VfsConfig::default(),
    };

    if let Some(base) = &cli.base {
        config = config.with_base_path(base);
    }
    Ok(config)
}

fn source_of<'a>(vfs: &'a Vfs, entry: &EntryInfo) -> &'a str {
    vfs.container(entry.container)
        .map_or("?", |file| file.path())
}

fn list(vfs: &Vfs, as_json: bool) {
    let lumps = vfs.primary_index().iter().chain(vfs.zip_index().iter());

    if as_json {
        let records: Vec<_> = lumps
            .map(|entry| {
                json!({
                    "name": entry.name,
                    "path": entry.path,
                    "size": entry.size,
                    "compressed_size": entry.compressed_size,
                    "source": source_of(vfs, entry),
                })
            })
            .collect();
        println!("{}", json!(records));
        return;
    }

    println!("{:<8} {:>10} {:>10}  SOURCE", "NAME", "SIZE", "PACKED");
    for entry in lumps {
        println!(
            "{:<8} {:>10} {:>10}  {}",
            entry.name,
            entry.size,
            entry.compressed_size,
            source_of(vfs, entry)
        );
    }
}

fn lookup(vfs: &Vfs, name: &str, as_json: bool) -> Result<()> {
    let lump = vfs
        .check_lump_num_for_name(name, true)
        .with_context(|| format!("Lump {name} not found"))?;
    let entry = vfs.lump_info(lump)?;
    let custom = vfs.lump_is_custom(lump)?;

    if as_json {
        println!(
            "{}",
            json!({
                "lump": lump.get(),
                "auxiliary": lump.is_auxiliary(),
                "name": entry.name,
                "path": entry.path,
                "size": entry.size,
                "last_modified": entry.last_modified,
                "custom": custom,
                "source": source_of(vfs, &entry),
            })
        );
        return Ok(());
    }

    println!("{name} -> lump {lump}");
    println!("  name:     {}", entry.name);
    println!("  size:     {}", entry.size);
    println!("  modified: {}", entry.last_modified);
    println!("  custom:   {custom}");
    println!("  source:   {}", source_of(vfs, &entry));
    Ok(())
}

fn read_lump(vfs: &Vfs, lump: LumpNum) -> Result<Vec<u8>> {
    let mut data = vec![0u8; vfs.lump_length(lump)?];
    let read = vfs.read_lump(lump, &mut data)?;
    data.truncate(read);
    Ok(data)
}

fn extract(vfs: &Vfs, name: &str, output: &Path) -> Result<()> {
    let data = match vfs.check_lump_num_for_name(name, true) {
        Some(lump) => read_lump(vfs, lump)?,
        None => vfs
            .open(name, OpenMode::READ)?
            .with_context(|| format!("{name} not found"))?
            .read_all()?,
    };

    std::fs::write(output, &data)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} bytes to {}", data.len(), output.display());
    Ok(())
}

fn print_info(vfs: &Vfs, as_json: bool) {
    if as_json {
        let files: Vec<_> = vfs
            .loaded_files()
            .map(|file| {
                let core = file.core();
                json!({
                    "path": core.path(),
                    "kind": file.kind().to_string(),
                    "lumps": file.lump_count(),
                    "load_order": core.load_order(),
                    "startup": core.is_startup(),
                    "custom": core.is_custom(),
                    "file_id": core.file_id().map(|id| id.to_string()),
                })
            })
            .collect();
        println!("{}", json!(files));
        return;
    }

    for file in vfs.loaded_files() {
        let core = file.core();
        println!(
            "#{:<3} {:<5} {:>6} lumps  {}{}{}",
            core.load_order(),
            file.kind().to_string(),
            file.lump_count(),
            core.path(),
            if core.is_startup() { " [startup]" } else { "" },
            if core.is_custom() { "" } else { " [original]" },
        );
    }
    println!(
        "{} lumps in the primary index, {} Zip entries",
        vfs.lump_count(),
        vfs.zip_index().len()
    );
}
