use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::digest::DigestGenerator;

/// Directory under the docs root that holds archived digests and generated pages
pub const ARCHIVE_DIR: &str = "archive";

/// Digests listed individually on the front page
const RECENT_LIMIT: usize = 30;

const FOOTER: &str = "<div style=\"text-align: center; padding: 2rem 0; color: #666;\">\n  <p>📰 Generated by news-digest</p>\n</div>\n";

/// A dated digest found under the docs root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DigestFile {
    pub date: NaiveDate,
    /// Path relative to the docs root, `/`-separated
    pub path: String,
}

impl DigestFile {
    pub fn new(date: NaiveDate, path: impl Into<String>) -> Self {
        Self {
            date,
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Path of the rendered page, as GitHub Pages serves it
    pub fn html_path(&self) -> String {
        html_link(&self.path)
    }
}

fn html_link(path: &str) -> String {
    match path.strip_suffix(".md") {
        Some(stem) => format!("{}.html", stem),
        None => path.to_string(),
    }
}

/// Digests of one calendar month, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
    /// e.g. "February 2026"
    pub label: String,
    pub digests: Vec<DigestFile>,
}

impl Period {
    /// `YYYY/MM`, relative to the archive directory
    pub fn dir(&self) -> String {
        format!("{}/{:02}", self.year, self.month)
    }

    /// Link from a page inside this period's directory to `digest`
    pub fn link_to(&self, digest: &DigestFile) -> String {
        let here = format!("{}/{}/{}", ARCHIVE_DIR, self.dir(), digest.file_name());
        if digest.path == here {
            html_link(digest.file_name())
        } else {
            format!("../../../{}", digest.html_path())
        }
    }
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Find every `YYYY-MM-DD.md` digest in `docs_dir` and anywhere under its archive, newest first
pub fn find_digest_files(docs_dir: &Path) -> Result<Vec<DigestFile>> {
    let mut digests = Vec::new();

    for entry in fs::read_dir(docs_dir)
        .with_context(|| format!("Failed to read docs directory: {}", docs_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(date) = DigestGenerator::parse_filename(name) {
                digests.push(DigestFile::new(date, name));
            }
        }
    }

    let archive_dir = docs_dir.join(ARCHIVE_DIR);
    if archive_dir.is_dir() {
        collect_archived(&archive_dir, ARCHIVE_DIR, &mut digests)?;
    }

    digests.sort();
    digests.reverse();

    Ok(digests)
}

fn collect_archived(dir: &Path, prefix: &str, digests: &mut Vec<DigestFile>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read archive directory: {}", dir.display()))?
    {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("Skipping non UTF-8 path {}", path.display());
            continue;
        };
        let relative = format!("{}/{}", prefix, name);

        if path.is_dir() {
            collect_archived(&path, &relative, digests)?;
        } else if let Some(date) = DigestGenerator::parse_filename(name) {
            digests.push(DigestFile::new(date, relative));
        }
    }

    Ok(())
}

/// Group digests by month, newest month first. Input order is kept within a month.
pub fn group_by_period(digests: &[DigestFile]) -> Vec<Period> {
    let mut periods: Vec<Period> = Vec::new();

    for digest in digests {
        let (year, month) = (digest.date.year(), digest.date.month());
        match periods
            .iter()
            .position(|p| p.year == year && p.month == month)
        {
            Some(index) => periods[index].digests.push(digest.clone()),
            None => periods.push(Period {
                year,
                month,
                label: digest.date.format("%B %Y").to_string(),
                digests: vec![digest.clone()],
            }),
        }
    }

    periods.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    periods
}

/// Landing page and archive pages for the digest site
pub struct SiteGenerator;

impl SiteGenerator {
    fn period_list(periods: &[Period], prefix: &str) -> String {
        if periods.is_empty() {
            return "- No archived digests yet\n".to_string();
        }

        let mut list = String::new();
        for period in periods {
            let count = period.digests.len();
            list.push_str(&format!(
                "- [{}]({}{}/) - {} digest{}\n",
                period.label,
                prefix,
                period.dir(),
                count,
                plural(count)
            ));
        }
        list
    }

    /// `index.md` at the docs root. `digests` must be newest first.
    pub fn generate_index(digests: &[DigestFile], generated_at: DateTime<Utc>) -> String {
        let mut md = String::new();

        md.push_str("---\nlayout: default\ntitle: 📰 Daily News Digest\n---\n\n");
        md.push_str("# 📰 Daily News Digest\n\n");
        md.push_str("> Your daily curated news from around the world\n\n");

        md.push_str("## 📅 Latest Digest\n\n");
        match digests.first() {
            Some(latest) => md.push_str(&format!(
                "🌟 **{}** - [📖 Read the latest digest →]({})\n\n",
                latest.date.format("%Y-%m-%d"),
                latest.html_path()
            )),
            None => md.push_str("*No digests have been published yet.*\n\n"),
        }

        md.push_str("## 🗂️ Archive\n\n### 📆 Recent Digests\n\n");
        for (i, digest) in digests.iter().take(RECENT_LIMIT).enumerate() {
            let (emoji, label) = if i == 0 {
                ("🌟", "Latest digest".to_string())
            } else {
                ("📰", digest.date.format("%A").to_string())
            };
            md.push_str(&format!(
                "- [{} {}]({}) - {}\n",
                emoji,
                digest.date.format("%Y-%m-%d"),
                digest.html_path(),
                label
            ));
        }

        md.push_str("\n### 📚 Full Archive by Period\n\n");
        let periods = group_by_period(digests);
        md.push_str(&Self::period_list(&periods, &format!("{}/", ARCHIVE_DIR)));

        md.push_str(&format!(
            "\n## 🔗 Links\n\n- [Archive]({}/) - Browse past digests\n- [Summaries]({}/summaries/) - Monthly overviews\n\n",
            ARCHIVE_DIR, ARCHIVE_DIR
        ));

        md.push_str("---\n\n");
        md.push_str(&format!(
            "*Last updated: {}*\n\n",
            generated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md.push_str(FOOTER);

        md
    }

    /// `archive/index.md`, one line per month
    pub fn generate_archive_index(digests: &[DigestFile]) -> String {
        let mut md = String::new();

        md.push_str("---\nlayout: default\ntitle: 📰 News Archive\n---\n\n");
        md.push_str("# 📰 News Archive\n\n");
        md.push_str("> Browse all past news digests\n\n");
        md.push_str("[← Back to Home](../)\n\n");
        md.push_str("## 📚 Archive by Period\n\n");
        md.push_str(&Self::period_list(&group_by_period(digests), ""));
        md.push_str("\n---\n\n");
        md.push_str(FOOTER);

        md
    }

    /// `archive/YYYY/MM/index.md`
    pub fn generate_period_index(period: &Period) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "---\nlayout: default\ntitle: 📰 {} Archive\n---\n\n",
            period.label
        ));
        md.push_str(&format!("# 📰 {} Archive\n\n", period.label));
        md.push_str(&format!("> News digests from {}\n\n", period.label));
        md.push_str("[← Back to Archive](../../) | [← Back to Home](../../../)\n\n");
        md.push_str("## 📅 Digests\n\n");

        if period.digests.is_empty() {
            md.push_str("- No digests for this period\n");
        }
        for digest in &period.digests {
            md.push_str(&format!(
                "- [{}]({}) - {}\n",
                digest.date.format("%Y-%m-%d"),
                period.link_to(digest),
                digest.date.format("%A")
            ));
        }

        md.push_str("\n---\n\n");
        md.push_str(FOOTER);

        md
    }

    /// Write the landing page, the archive index and one index per month.
    ///
    /// Returns the written paths in that order.
    pub fn write(
        docs_dir: &Path,
        digests: &[DigestFile],
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let index_path = docs_dir.join("index.md");
        write_page(&index_path, &Self::generate_index(digests, generated_at))?;
        written.push(index_path);

        let archive_dir = docs_dir.join(ARCHIVE_DIR);
        let archive_index = archive_dir.join("index.md");
        write_page(&archive_index, &Self::generate_archive_index(digests))?;
        written.push(archive_index);

        for period in group_by_period(digests) {
            let path = archive_dir
                .join(period.year.to_string())
                .join(format!("{:02}", period.month))
                .join("index.md");
            write_page(&path, &Self::generate_period_index(&period))?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Write `content` to `path`, creating parent directories
pub(crate) fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
