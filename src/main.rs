use anyhow::{Context, Result};
use castlist::app::{App, AppEvent};
use castlist::config::Config;
use castlist::episodes::Library;
use castlist::{store, ui};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/castlist/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("castlist"))
}

#[derive(Parser, Debug)]
#[command(name = "castlist", about = "Terminal episode browser for podcast and feed libraries")]
struct Args {
    /// Library snapshot (JSON). Defaults to ~/.config/castlist/library.json
    #[arg(value_name = "LIBRARY")]
    library: Option<PathBuf>,

    /// Config file. Defaults to ~/.config/castlist/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Episodes added per "load more"
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Show the oldest episodes first
    #[arg(long)]
    oldest_first: bool,

    /// Write logs to FILE instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    // Command-line flags win over the config file
    if let Some(n) = args.page_size {
        config.page_size = usize::try_from(n).context("--page-size is too large")?;
    }
    if args.oldest_first {
        config.newest_first = false;
    }

    let library_path = args
        .library
        .clone()
        .unwrap_or_else(|| config_dir.join("library.json"));
    if !library_path.exists() {
        eprintln!("Error: No library found at {}", library_path.display());
        eprintln!();
        eprintln!("Pass a library snapshot explicitly:");
        eprintln!("  castlist /path/to/library.json");
        std::process::exit(1);
    }
    let library = Library::load(&library_path)
        .with_context(|| format!("Failed to load library '{}'", library_path.display()))?;

    if library.sources.is_empty() {
        eprintln!("Warning: Library contains no sources");
    }
    tracing::info!(
        sources = library.sources.len(),
        episodes = library.episode_count(),
        page_size = config.page_size,
        newest_first = config.newest_first,
        "Starting castlist"
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let sources = library.sources.clone();
    let (store, store_task) = store::spawn(library, event_tx);

    let mut app = App::new(sources, store, &config);
    ui::run(&mut app, event_rx).await?;

    // Dropping the app drops the last store handle and ends the store task
    drop(app);
    if let Err(e) = store_task.await {
        tracing::warn!(error = %e, "Store task ended abnormally");
    }

    Ok(())
}
