//! Matter Storage CLI
//!
//! On-demand maintenance surface for the persistence core.
//!
//! ## Usage
//!
//! ```bash
//! # Export everything (metadata + referenced files) to a portable archive
//! matter-storage export backup.zip
//!
//! # Restore from an archive, replacing current data
//! matter-storage import backup.zip
//!
//! # Delete blobs no matter or template references anymore
//! matter-storage gc
//!
//! # Show collection and blob store statistics
//! matter-storage stats
//!
//! # All commands accept a custom data directory
//! matter-storage --data-dir /data/matters stats
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use matter_storage::{backup, BlobStore, Config, MetadataStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "matter-storage")]
#[command(about = "Local-first persistence core for matter tracking")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, env = "MATTER_STORAGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export matters, templates, and referenced files to a zip archive
    Export {
        /// Archive file to write
        output: PathBuf,
    },
    /// Import a zip archive, replacing current matters and templates
    Import {
        /// Archive file to read
        input: PathBuf,
    },
    /// Delete blobs not referenced by any matter or template
    Gc,
    /// Show storage statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("matter_storage=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        Config::load(config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        Config::default()
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    // Persist a default config next to the data so it can be edited later
    let config_path = config.config_path();
    if !config_path.exists() {
        config.save(&config_path)?;
        info!(path = %config_path.display(), "Created default config");
    }

    let metadata = MetadataStore::open(&config.data_dir).await?;
    let blobs = BlobStore::open(config.blobs_dir()).await?;

    match args.command {
        Command::Export { output } => {
            let summary = backup::export_to_file(&metadata, &blobs, &output)
                .await
                .context("export failed; no data was modified")?;
            println!(
                "Exported {} matters, {} templates, {} files to {}",
                summary.matters,
                summary.templates,
                summary.files,
                output.display()
            );
        }
        Command::Import { input } => {
            let summary = backup::import_from_file(&metadata, &blobs, &input)
                .await
                .context("import failed; current collections were left unchanged")?;
            println!(
                "Restored {} matters, {} templates, {} files",
                summary.matters, summary.templates, summary.files
            );
        }
        Command::Gc => {
            let removed = backup::sweep_orphan_blobs(&metadata, &blobs).await?;
            println!("Removed {removed} orphaned blobs");
        }
        Command::Stats => {
            let matters = metadata.load_matters().await?;
            let templates = metadata.load_templates().await?;
            let stats = blobs.stats().await?;
            let referenced = backup::referenced_blob_ids(&matters, &templates);
            println!("Matters:    {}", matters.len());
            println!("Templates:  {}", templates.len());
            println!(
                "Blobs:      {} ({} bytes, {} referenced)",
                stats.total_blobs,
                stats.total_bytes,
                referenced.len()
            );
            let window = chrono::Duration::days(config.attention_window_days);
            let items = matter_storage::attention_scan(&matters, chrono::Utc::now(), window);
            println!(
                "Attention:  {} items due within {} days",
                items.len(),
                config.attention_window_days
            );
        }
    }

    Ok(())
}
