use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{find_digest_files, write_summaries, Config, SiteGenerator};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate-index")]
#[command(about = "Build the site index, archive pages and monthly summaries from saved digests")]
struct Args {
    /// Docs directory holding the digests (defaults to output.dir from the configuration)
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Path to the YAML configuration, used when --docs is not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only write the index pages
    #[arg(long)]
    no_summaries: bool,
}

fn configure_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    configure_logging();

    let args = Args::parse();
    let docs_dir = match args.docs {
        Some(dir) => dir,
        None => {
            let config_path = Config::resolve_path(args.config)?;
            info!("Loaded configuration from {}", config_path.display());
            Config::load(&config_path)?.output.dir
        }
    };

    println!("🔍 Scanning {} for digests...", docs_dir.display());
    let digests = find_digest_files(&docs_dir)?;
    if digests.is_empty() {
        anyhow::bail!("No digest files found in {}", docs_dir.display());
    }
    println!("✓ Found {} digest(s)", digests.len());

    println!("\n📝 Generating index pages...");
    let pages = SiteGenerator::write(&docs_dir, &digests, Utc::now())
        .context("Failed to write index pages")?;
    for page in &pages {
        info!("Wrote {}", page.display());
    }
    println!("✓ Wrote {} index page(s)", pages.len());

    if !args.no_summaries {
        println!("\n📊 Generating monthly summaries...");
        let summaries =
            write_summaries(&docs_dir, &digests).context("Failed to write summaries")?;
        for page in &summaries {
            info!("Wrote {}", page.display());
        }
        // the summaries index is the last page
        println!("✓ Wrote {} monthly summary page(s)", summaries.len().saturating_sub(1));
    }

    println!(
        "\n✅ Done! Latest digest: {} ({} total)",
        digests[0].date.format("%Y-%m-%d"),
        digests.len()
    );

    Ok(())
}
