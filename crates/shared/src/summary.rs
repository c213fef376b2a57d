use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::site::{group_by_period, plural, write_page, DigestFile, Period, ARCHIVE_DIR};

/// Categories listed in a monthly breakdown
const TOP_CATEGORIES: usize = 10;
/// Sources listed per category in a monthly breakdown
const TOP_SOURCES: usize = 5;

const FOOTER: &str = "<div style=\"text-align: center; padding: 2rem 0; color: #666;\">\n  <p>📊 Summary generated by news-digest</p>\n</div>\n";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    pub title: String,
    pub summary: String,
    pub source: Option<String>,
}

/// One `##` category section of a digest
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCategory {
    pub label: String,
    pub sources: Vec<String>,
    pub articles: Vec<ParsedArticle>,
}

/// A digest read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDigest {
    pub file: DigestFile,
    pub categories: Vec<ParsedCategory>,
}

impl ParsedDigest {
    pub fn article_count(&self) -> usize {
        self.categories.iter().map(|c| c.articles.len()).sum()
    }
}

/// `## 🔬 Technology & AI {#technology-ai}` → `🔬 Technology & AI`
fn anchored_heading(text: &str) -> Option<&str> {
    let text = text.trim_end();
    if !text.ends_with('}') {
        return None;
    }
    text.rfind(" {#").map(|index| text[..index].trim())
}

/// `[Title](url)` or `1. Title` → `Title`
fn article_title(heading: &str) -> String {
    let heading = heading.trim();

    if let Some(rest) = heading.strip_prefix('[') {
        if let Some(end) = rest.rfind("](") {
            return rest[..end].replace("\\[", "[").replace("\\]", "]");
        }
    }

    match heading.split_once(". ") {
        Some((number, title)) if number.chars().all(|c| c.is_ascii_digit()) => {
            title.trim().to_string()
        }
        _ => heading.to_string(),
    }
}

/// Whether a line under an article heading is its summary text
fn summary_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty()
        || line.starts_with('#')
        || line.starts_with('*')
        || line.starts_with('<')
        || line.starts_with("---")
        || line.starts_with('🕒')
        || line.starts_with('🔗')
    {
        return None;
    }
    Some(line.strip_prefix("> ").unwrap_or(line))
}

/// Read a digest's categories, sources and articles back out of its Markdown
pub fn parse_digest(file: DigestFile, content: &str) -> ParsedDigest {
    let mut categories: Vec<ParsedCategory> = Vec::new();
    let mut current_source: Option<String> = None;
    let mut awaiting_summary = false;

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            awaiting_summary = false;
            current_source = None;
            if let Some(label) = anchored_heading(heading) {
                categories.push(ParsedCategory {
                    label: label.to_string(),
                    sources: Vec::new(),
                    articles: Vec::new(),
                });
            }
            continue;
        }

        let Some(category) = categories.last_mut() else {
            continue;
        };

        if let Some(heading) = line.strip_prefix("### ") {
            awaiting_summary = false;
            let name = heading.trim().trim_start_matches('📰').trim();
            let name = anchored_heading(name).unwrap_or(name).to_string();
            if !category.sources.contains(&name) {
                category.sources.push(name.clone());
            }
            current_source = Some(name);
            continue;
        }

        if let Some(heading) = line.strip_prefix("#### ") {
            category.articles.push(ParsedArticle {
                title: article_title(heading),
                summary: String::new(),
                source: current_source.clone(),
            });
            awaiting_summary = true;
            continue;
        }

        if awaiting_summary {
            if let (Some(text), Some(article)) = (summary_line(line), category.articles.last_mut())
            {
                article.summary = text.to_string();
                awaiting_summary = false;
            }
        }
    }

    ParsedDigest { file, categories }
}

pub fn parse_digest_file(docs_dir: &Path, file: &DigestFile) -> Result<ParsedDigest> {
    let path = docs_dir.join(&file.path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read digest: {}", path.display()))?;

    Ok(parse_digest(file.clone(), &content))
}

struct CategoryTotals<'a> {
    label: &'a str,
    articles: usize,
    sources: BTreeSet<&'a str>,
}

/// `archive/YYYY/MM/summary.md` for one month
pub fn generate_period_summary(period: &Period, digests: &[ParsedDigest]) -> String {
    let total_days = digests.len();
    let total_articles: usize = digests.iter().map(ParsedDigest::article_count).sum();
    let average = if total_days > 0 {
        total_articles / total_days
    } else {
        0
    };

    let mut totals: Vec<CategoryTotals> = Vec::new();
    for digest in digests {
        for category in &digest.categories {
            let index = match totals.iter().position(|t| t.label == category.label) {
                Some(index) => index,
                None => {
                    totals.push(CategoryTotals {
                        label: &category.label,
                        articles: 0,
                        sources: BTreeSet::new(),
                    });
                    totals.len() - 1
                }
            };
            totals[index].articles += category.articles.len();
            totals[index]
                .sources
                .extend(category.sources.iter().map(String::as_str));
        }
    }
    // stable: ties keep first-seen order
    totals.sort_by(|a, b| b.articles.cmp(&a.articles));

    let mut md = String::new();
    md.push_str(&format!(
        "---\nlayout: default\ntitle: 📊 {} Summary\n---\n\n",
        period.label
    ));
    md.push_str(&format!("# 📊 {} Summary\n\n", period.label));
    md.push_str(&format!("> News digest summary for {}\n\n", period.label));
    md.push_str(
        "[← Back to Summaries](../../summaries/) | [← Back to Archive](../../) | [← Back to Home](../../../)\n\n",
    );

    md.push_str("## 📈 Overview\n\n");
    md.push_str(&format!("- **Total Days**: {}\n", total_days));
    md.push_str(&format!("- **Total Articles**: {}\n", total_articles));
    md.push_str(&format!("- **Average Articles per Day**: {}\n\n", average));

    md.push_str("## 📊 Category Breakdown\n\n");
    for entry in totals.iter().take(TOP_CATEGORIES) {
        let sources: Vec<&str> = entry.sources.iter().take(TOP_SOURCES).copied().collect();
        md.push_str(&format!("### {}\n\n", entry.label));
        md.push_str(&format!("- **Articles**: {}\n", entry.articles));
        md.push_str(&format!("- **Sources**: {}\n\n", sources.join(", ")));
    }

    md.push_str("## 📅 Daily Summaries\n\n");
    let mut by_date: Vec<&ParsedDigest> = digests.iter().collect();
    by_date.sort_by_key(|d| d.file.date);

    for digest in by_date {
        md.push_str(&format!(
            "### [{}]({}) - {}\n\n",
            digest.file.date.format("%Y-%m-%d"),
            period.link_to(&digest.file),
            digest.file.date.format("%A")
        ));
        md.push_str(&format!(
            "**{} articles** collected from:\n\n",
            digest.article_count()
        ));
        for category in digest.categories.iter().filter(|c| !c.articles.is_empty()) {
            md.push_str(&format!(
                "- {}: {} articles\n",
                category.label,
                category.articles.len()
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str(FOOTER);

    md
}

/// `archive/summaries/index.md`. `periods` must be newest first.
pub fn generate_summary_index(periods: &[Period]) -> String {
    let mut md = String::new();

    md.push_str("---\nlayout: default\ntitle: 📊 News Summaries\n---\n\n");
    md.push_str("# 📊 News Summaries\n\n");
    md.push_str("> Monthly summaries of news digests\n\n");
    md.push_str("[← Back to Home](../../)\n\n");
    md.push_str("## 📅 Available Summaries\n\n");

    for period in periods {
        let count = period.digests.len();
        md.push_str(&format!(
            "- [{}](../{}/summary.html) - {} digest{}\n",
            period.label,
            period.dir(),
            count,
            plural(count)
        ));
    }

    md.push_str("\n---\n\n");
    md.push_str(FOOTER);

    md
}

/// Parse every digest and write one summary per month plus the summaries index.
///
/// Returns the written paths, the index last.
pub fn write_summaries(docs_dir: &Path, digests: &[DigestFile]) -> Result<Vec<PathBuf>> {
    let archive_dir = docs_dir.join(ARCHIVE_DIR);
    let periods = group_by_period(digests);
    let mut written = Vec::with_capacity(periods.len() + 1);

    for period in &periods {
        let parsed = period
            .digests
            .iter()
            .map(|file| parse_digest_file(docs_dir, file))
            .collect::<Result<Vec<_>>>()?;

        let path = archive_dir
            .join(period.year.to_string())
            .join(format!("{:02}", period.month))
            .join("summary.md");
        write_page(&path, &generate_period_summary(period, &parsed))?;
        written.push(path);
    }

    let index_path = archive_dir.join("summaries").join("index.md");
    write_page(&index_path, &generate_summary_index(&periods))?;
    written.push(index_path);

    Ok(written)
}
