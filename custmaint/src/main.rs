//! custmaint - customer lookup console
//!
//! Opens a fixed-width customer file and answers lookups by customer ID
//! until the user enters `X`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use custfile_engine::{RecordLayout, RecordStore};

mod config;
mod session;

use config::{Config, LayoutPreset};
use session::{OutputFormat, Session};

/// Customer lookup console for fixed-width record files
#[derive(Parser, Debug)]
#[command(name = "custmaint")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Customer data file [default: custfile.dat]
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML config file with data file and field layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in record layout (overrides the config file)
    #[arg(short, long, value_enum)]
    layout: Option<LayoutPreset>,

    /// Output format for found records
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {:?}", level))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Open the data file; the error already names the path, so it is not wrapped
fn open_store(path: &Path, layout: Arc<RecordLayout>) -> Result<RecordStore> {
    Ok(RecordStore::open(path, layout)?)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let path = config.data_file(args.file.as_deref());
    let layout = Arc::new(config.resolve_layout(args.layout)?);

    let mut store = open_store(&path, layout)?;

    info!("Opened {} ({} byte records)", path.display(), store.layout().total_width());
    match store.record_count() {
        Ok(count) => info!("{} customer records", count),
        Err(e) => warn!("Cannot size {}: {}", path.display(), e),
    }

    let result = Session::new(&store, args.format).run(io::stdin().lock(), io::stdout().lock());
    store.close();

    let stats = result.context("console I/O failed")?;
    info!(
        "Session ended: {} lookups, {} found, {} errors",
        stats.lookups, stats.found, stats.errors
    );

    Ok(())
}
