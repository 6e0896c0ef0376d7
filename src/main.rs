use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use omnidash::config::AppConfig;
use omnidash::{build_dispatcher, BoardHealthTracker, Ingestor, RenderLoop};
use omnidash_core::SeriesCatalog;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// omnidash - live time series from CAN and DAQ telemetry
#[derive(Parser, Debug, Clone)]
#[command(name = "omnidash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=warn, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Config file to use instead of the platform default
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only dispatch messages whose channel starts with this prefix
    #[arg(long = "channel", value_name = "PREFIX")]
    channel: Option<String>,

    /// Render tick period in milliseconds
    #[arg(long = "tick-ms", value_name = "MS")]
    tick_ms: Option<u64>,

    /// Print frames as JSON lines
    #[arg(long = "json")]
    json: bool,

    /// List every series with its latest point once input ends
    #[arg(short = 'l', long = "list-series")]
    list_series: bool,

    /// Write the effective configuration back to disk
    #[arg(long = "save-config")]
    save_config: bool,

    /// JSON-lines input file ("-" or absent for stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting omnidash v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli);
    if cli.save_config {
        save_config(&cli, &config)?;
    }

    let tracker = BoardHealthTracker::shared(config.health.history_len, config.health.timeout());
    let dispatcher = build_dispatcher(&tracker);
    let catalog = dispatcher.catalog();
    let mut ingestor = Ingestor::new(dispatcher, &config.ingest);
    let mut render = RenderLoop::new(catalog.clone(), tracker, config.render.clone());

    let reader = open_input(cli.input.as_deref())?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let stats = rt.block_on(async {
        // Ingestion owns the dispatcher on a blocking thread
        let ingest = tokio::task::spawn_blocking(move || ingestor.run(reader));
        tokio::pin!(ingest);

        info!("Starting render loop");
        tokio::select! {
            joined = &mut ingest => joined.context("Ingestion thread panicked")?,
            _ = render.run() => unreachable!("render loop never returns"),
        }
    })?;

    let frame = render.render_frame();
    render.emit(&frame);
    if config.render.json {
        println!("{}", serde_json::json!({ "ingest": stats }));
    }

    if cli.list_series {
        list_series(&catalog);
    }

    if stats.malformed > 0 || stats.parser_failures > 0 {
        warn!(
            "{} malformed messages, {} parser failures",
            stats.malformed, stats.parser_failures
        );
    }
    Ok(())
}

/// Load config from `--config` or the platform location, then apply CLI overrides
fn load_config(cli: &Cli) -> AppConfig {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        error!("Failed to load config: {}", e);
        AppConfig::default()
    });

    if let Some(channel) = &cli.channel {
        config.ingest.channel_filter = channel.clone();
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.render.tick_interval_ms = tick_ms;
    }
    if cli.json {
        config.render.json = true;
    }
    config
}

fn save_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    match &cli.config {
        Some(path) => config.save_to_path(path)?,
        None => config.save()?,
    }
    info!("Configuration saved");
    Ok(())
}

fn open_input(path: Option<&std::path::Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            let file = File::open(p).with_context(|| format!("Failed to open {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn list_series(catalog: &SeriesCatalog) {
    for channel in catalog.channels() {
        let Some(registry) = catalog.registry(&channel) else {
            continue;
        };
        println!("{} ({} series)", channel, registry.len());
        for series in registry.all() {
            match series.last() {
                Some((t, v)) => println!(
                    "  {:<40} {:>8} pts  last ({:.3}, {:.4})",
                    series.name(),
                    series.len(),
                    t,
                    v
                ),
                None => println!("  {:<40} {:>8} pts", series.name(), series.len()),
            }
        }
    }
}
