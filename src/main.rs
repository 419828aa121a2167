use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use songmeta::config::AppConfig;
use songmeta::model::ArtistRole;
use songmeta::{ArtistNameSplitter, FileDescriptor, MetadataAggregator, SUPPORTED_EXTENSIONS};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "songmeta", version, about = "Song metadata extraction from tags and filenames")]
struct Cli {
    /// Path to a config file (defaults to ~/.config/songmeta/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Primary,
    Remixer,
    Featuring,
}

impl From<RoleArg> for ArtistRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Primary => ArtistRole::Primary,
            RoleArg::Remixer => ArtistRole::Remixer,
            RoleArg::Featuring => ArtistRole::Featuring,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metadata from audio files and print it as JSON
    Analyse {
        /// Files or directories to analyse
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Pretty-print each JSON object
        #[arg(long)]
        pretty: bool,
    },

    /// Split a raw artist string into individual names
    Split {
        /// Text such as "A & B feat. C"
        text: String,

        /// Role assigned to names before any featuring marker
        #[arg(short, long, value_enum, default_value = "primary")]
        role: RoleArg,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Explicit --config must load; the default location is optional
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Analyse { paths, pretty } => analyse(&config, &paths, pretty)?,

        Commands::Split { text, role } => {
            let splitter = ArtistNameSplitter::new(&config.known_artists);
            for artist in splitter.extract(&text, role.into()) {
                match artist.suffix {
                    Some(suffix) => println!("{:<10} {} [{}]", format!("{:?}", artist.role), artist.name, suffix),
                    None => println!("{:<10} {}", format!("{:?}", artist.role), artist.name),
                }
            }
        }
    }

    Ok(())
}

fn analyse(config: &AppConfig, paths: &[PathBuf], pretty: bool) -> Result<()> {
    let files = collect_audio_files(paths);
    if files.is_empty() {
        anyhow::bail!("No supported audio files found ({})", SUPPORTED_EXTENSIONS.join(", "));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let aggregator = MetadataAggregator::from_config(config);
    let catalog = config.catalog();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) ({eta}) {msg}",
        )
        .context("Invalid progress template")?
        .progress_chars("#>-"),
    );
    pb.set_message("Analysing...");

    let mut failed = 0u64;
    for path in &files {
        let buffer = match std::fs::read(path) {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                failed += 1;
                pb.inc(1);
                continue;
            }
        };

        let file = describe(path);
        let metadata = runtime.block_on(aggregator.analyse(&file, &buffer, &catalog));
        let record = serde_json::json!({
            "file": path.display().to_string(),
            "metadata": metadata,
        });
        let line = if pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        pb.suspend(|| println!("{}", line));
        pb.inc(1);
    }

    pb.finish_with_message(format!(
        "Done: {} analysed, {} unreadable",
        files.len() as u64 - failed,
        failed
    ));
    Ok(())
}

/// Every supported audio file under `paths`, in walk order.
fn collect_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        for entry in WalkDir::new(path).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = extension(entry.path());
            if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                files.push(entry.into_path());
            }
        }
    }
    files
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn describe(path: &Path) -> FileDescriptor {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    FileDescriptor {
        container: path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        blob: name.clone(),
        original_filename: name,
        file_extension: extension(path),
    }
}
