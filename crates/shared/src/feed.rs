use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::models::Item;

const MAX_SUMMARY_CHARS: usize = 300;
const MAX_CONCURRENT_FEEDS: usize = 8;

/// An entry as parsed from the feed, before it is tied to a source
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn into_item(self, source: &str, category: &str) -> Item {
        Item {
            title: self.title,
            summary: self.summary,
            url: self.link,
            source: source.to_string(),
            published_at: self.published,
            category: category.to_string(),
        }
    }
}

/// Items fetched from one source
#[derive(Debug, Clone)]
pub struct SourceItems {
    pub source: String,
    pub items: Vec<Item>,
}

/// Remove HTML tags, decode entities and collapse whitespace
pub fn strip_html(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to `max_chars` characters, appending '…' when shortened
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Parse an RSS or Atom document into at most `max_items` entries
pub fn parse_feed(body: &[u8], max_items: usize) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(body).context("Failed to parse feed")?;

    let entries = feed
        .entries
        .into_iter()
        .take(max_items)
        .map(|entry| {
            let title = entry
                .title
                .map(|t| strip_html(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No title".to_string());

            let raw_summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            FeedEntry {
                title,
                link: entry
                    .links
                    .first()
                    .map(|link| link.href.clone())
                    .unwrap_or_default(),
                summary: truncate(&strip_html(&raw_summary), MAX_SUMMARY_CHARS),
                published: entry.published.or(entry.updated),
            }
        })
        .collect();

    Ok(entries)
}

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; NewsDigest/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch_feed(&self, url: &str, max_items: usize) -> Result<Vec<FeedEntry>> {
        let mut last_error = None;

        for attempt in 0..3 {
            match self.try_fetch_feed(url, max_items).await {
                Ok(entries) => return Ok(entries),
                Err(e) => {
                    debug!("Attempt {} for {} failed: {:#}", attempt + 1, url, e);
                    last_error = Some(e);
                    if attempt < 2 {
                        let backoff = std::time::Duration::from_millis(500 * (2_u64.pow(attempt)));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Failed to fetch {}", url)))
    }

    async fn try_fetch_feed(&self, url: &str, max_items: usize) -> Result<Vec<FeedEntry>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let body = response.bytes().await.context("Failed to read response body")?;

        parse_feed(&body, max_items)
    }

    /// Fetch every source in configured order.
    ///
    /// A failing source is logged and left out; the run carries on.
    pub async fn fetch_sources(
        &self,
        sources: &[(SourceConfig, usize)],
        enabled_categories: &HashSet<String>,
    ) -> Vec<SourceItems> {
        let results: Vec<Option<SourceItems>> = stream::iter(sources)
            .map(|(source, max_items)| async move {
                println!("  Fetching {} …", source.name);
                match self.fetch_feed(&source.url, *max_items).await {
                    Ok(entries) => {
                        let category = source.primary_category(enabled_categories);
                        let items: Vec<Item> = entries
                            .into_iter()
                            .map(|entry| entry.into_item(&source.name, &category))
                            .collect();
                        println!("    → {} article(s) from {}", items.len(), source.name);
                        Some(SourceItems {
                            source: source.name.clone(),
                            items,
                        })
                    }
                    Err(e) => {
                        warn!("Failed to fetch {}: {:#}", source.name, e);
                        None
                    }
                }
            })
            // buffered keeps output in source order
            .buffered(MAX_CONCURRENT_FEEDS)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}

/// Sources that should be fetched this run, paired with their item limits
pub fn select_sources(
    sources: &[SourceConfig],
    enabled_categories: &HashSet<String>,
    default_max_items: usize,
) -> Vec<(SourceConfig, usize)> {
    sources
        .iter()
        .filter(|source| source.enabled)
        .filter(|source| {
            if source.source_type != "rss" {
                warn!(
                    "Unsupported source type '{}' for {}",
                    source.source_type, source.name
                );
                return false;
            }
            true
        })
        .filter(|source| source.matches_categories(enabled_categories))
        .map(|source| {
            (
                source.clone(),
                source.max_items.unwrap_or(default_max_items),
            )
        })
        .collect()
}
