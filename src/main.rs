use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yt_recs::{create_lookup, Config, LookupProvider, Pipeline, RunOptions};

#[derive(Parser)]
#[command(name = "yt-recs")]
#[command(version, about = "Collect YouTube recommendations from a chat export")]
struct Cli {
    /// The filepath of the chat export JSON
    filepath: Option<PathBuf>,

    /// Ignore existing cache file
    #[arg(long)]
    ignore_cache: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Cache file to read and write
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Title lookup backend (oembed, ytdlp, page)
    #[arg(long, value_name = "PROVIDER")]
    lookup: Option<LookupProvider>,

    /// Skip title lookups; only merge and save
    #[arg(long)]
    no_lookup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "yt_recs=debug,info"
    } else {
        "yt_recs=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(cache) = cli.cache {
        config.cache.path = cache;
    }
    if let Some(provider) = cli.lookup {
        config.lookup.provider = provider;
    }
    config.validate()?;

    info!("🚀 yt-recs starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let lookup = if cli.no_lookup {
        None
    } else {
        Some(create_lookup(&config.lookup)?)
    };

    let pipeline = Pipeline::new(&config, lookup)?;
    let options = RunOptions {
        export_path: cli.filepath,
        ignore_cache: cli.ignore_cache,
    };

    let start_time = std::time::Instant::now();
    let (_, summary) = pipeline.run(&options).await?;
    let duration = start_time.elapsed();

    info!("🎉 Finished in {:.2}s", duration.as_secs_f64());
    info!("📦 Cached: {}", summary.cached);
    info!("➕ New: {} (of {} parsed links)", summary.added, summary.parsed);
    info!("✅ Titles resolved: {}", summary.resolved);
    info!("❌ Lookups failed: {}", summary.failed);
    info!("📊 Total recommendations: {}", summary.total);

    Ok(())
}
