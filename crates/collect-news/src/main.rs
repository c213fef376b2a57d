use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{
    archive_old_files, save_report, select_sources, Config, Deduplicator, DigestGenerator,
    FeedClient, Item, ReportFile,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collect-news")]
#[command(about = "Fetch news feeds, drop near-duplicate stories and write a dated Markdown digest")]
struct Args {
    /// Path to the YAML configuration (defaults to $NEWS_DIGEST_CONFIG or config/config.yaml)
    config: Option<PathBuf>,

    /// Replace the configured categories; pass the flag with no value to collect everything
    #[arg(short, long, value_delimiter = ',', num_args = 0..)]
    categories: Option<Vec<String>>,

    /// Write the duplicate report as JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Skip archiving older digests even if enabled in the config
    #[arg(long)]
    no_archive: bool,
}

fn configure_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let args = Args::parse();
    let config_path = Config::resolve_path(args.config)?;
    let config = Config::load(&config_path)?;
    info!("Loaded configuration from {}", config_path.display());

    let now = Utc::now();
    let enabled_categories = config.enabled_categories(args.categories.as_deref());
    let sources = select_sources(
        &config.sources,
        &enabled_categories,
        config.output.max_items_per_source,
    );

    if sources.is_empty() {
        println!("No enabled sources match the selected categories.");
    }

    println!("\n📡 Fetching {} feed(s)...", sources.len());
    let client = FeedClient::new()?;
    let fetched = client.fetch_sources(&sources, &enabled_categories).await;

    let batch: Vec<Item> = fetched.into_iter().flat_map(|s| s.items).collect();
    println!("✓ Collected {} article(s)", batch.len());

    let items = if config.dedup.enabled {
        println!("\n🔍 Removing near-duplicate stories...");
        let outcome = Deduplicator::new(&config.dedup).resolve(&batch);
        println!(
            "✓ Kept {}/{} articles ({} duplicate(s) removed)",
            outcome.kept.len(),
            batch.len(),
            outcome.report.len()
        );

        if let Some(report_path) = &args.report {
            let data = ReportFile::new(now, &config.dedup, batch.len(), outcome.report);
            let saved = save_report(&data, report_path).context("Failed to save duplicate report")?;
            println!("✓ Duplicate report saved to: {}", saved.display());
        }

        outcome.kept
    } else {
        batch
    };

    println!("\n📝 Generating Markdown digest...");
    let content = DigestGenerator::generate_markdown(now, &items);
    let output_file = DigestGenerator::save(&content, &config.output.dir, now)
        .context("Failed to save digest")?;

    println!("\n✅ Digest written: {}", output_file.display());

    if config.archive.enabled && !args.no_archive {
        println!("\n🗄  Archiving old digests...");
        let moved = archive_old_files(
            &config.output.dir,
            &config.output.archive_dir,
            &DigestGenerator::filename(now),
            &config.archive.format,
            now,
        )
        .context("Failed to archive old digests")?;
        println!("✓ Archived {} file(s)", moved.len());
    }

    Ok(())
}
