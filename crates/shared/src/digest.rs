use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Item;

/// Items of one source inside a category, in fetch order
struct SourceSection<'a> {
    name: &'a str,
    items: Vec<&'a Item>,
}

struct CategorySection<'a> {
    key: &'a str,
    sources: Vec<SourceSection<'a>>,
}

pub struct DigestGenerator;

impl DigestGenerator {
    /// File name of the digest for `date`
    pub fn filename(date: DateTime<Utc>) -> String {
        format!("{}.md", date.format("%Y-%m-%d"))
    }

    /// Date of a digest file name written by [`Self::filename`]; `None` for anything else
    pub fn parse_filename(name: &str) -> Option<NaiveDate> {
        let stem = name.strip_suffix(".md")?;
        let date = NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()?;
        // reject unpadded forms such as 2024-3-5
        (date.format("%Y-%m-%d").to_string() == stem).then_some(date)
    }

    /// Display label for a category key
    pub fn category_label(key: &str) -> String {
        match key {
            "technology" => "🔬 Technology & AI".to_string(),
            "coding" => "💻 Coding & Development".to_string(),
            "business" => "💼 Business & Finance".to_string(),
            "world" => "🌍 World News".to_string(),
            "health" => "🏥 Health".to_string(),
            "science" => "🔭 Science".to_string(),
            other => other
                .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
        }
    }

    /// Heading anchor: emoji and punctuation dropped, words joined by single hyphens
    pub fn anchor(text: &str) -> String {
        let kept: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
            .collect();

        kept.trim()
            .replace(' ', "-")
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    fn escape_link_text(text: &str) -> String {
        text.replace('[', "\\[").replace(']', "\\]")
    }

    fn group(items: &[Item]) -> Vec<CategorySection<'_>> {
        let mut categories: Vec<CategorySection> = Vec::new();

        for item in items {
            let index = match categories.iter().position(|c| c.key == item.category) {
                Some(index) => index,
                None => {
                    categories.push(CategorySection {
                        key: &item.category,
                        sources: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            let category = &mut categories[index];

            match category.sources.iter().position(|s| s.name == item.source) {
                Some(index) => category.sources[index].items.push(item),
                None => category.sources.push(SourceSection {
                    name: &item.source,
                    items: vec![item],
                }),
            }
        }

        categories
    }

    pub fn generate_markdown(date: DateTime<Utc>, items: &[Item]) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "# 📰 News Digest – {}\n\n",
            date.format("%Y-%m-%d")
        ));
        md.push_str(&format!(
            "> Generated at {} UTC\n\n",
            date.format("%Y-%m-%d %H:%M")
        ));
        md.push_str("---\n\n");

        if items.is_empty() {
            md.push_str("*No articles were collected. Check your configuration.*\n");
            return md;
        }

        let categories = Self::group(items);

        // Table of contents
        md.push_str("## 📑 Table of Contents\n\n");
        for category in &categories {
            let label = Self::category_label(category.key);
            md.push_str(&format!("- [{}](#{})\n", label, Self::anchor(&label)));
            for source in &category.sources {
                md.push_str(&format!(
                    "  - [{}](#{})\n",
                    source.name,
                    Self::anchor(source.name)
                ));
            }
        }
        md.push_str("\n---\n\n");

        for category in &categories {
            let label = Self::category_label(category.key);
            md.push_str(&format!("## {} {{#{}}}\n\n", label, Self::anchor(&label)));

            for source in &category.sources {
                md.push_str(&format!("### 📰 {}\n\n", source.name));

                for item in &source.items {
                    let title = if item.title.is_empty() {
                        "Untitled".to_string()
                    } else {
                        Self::escape_link_text(&item.title)
                    };

                    if item.url.is_empty() {
                        md.push_str(&format!("#### {}\n\n", title));
                    } else {
                        md.push_str(&format!("#### [{}]({})\n\n", title, item.url));
                    }

                    if let Some(published) = item.published_at {
                        md.push_str(&format!(
                            "*{}*\n\n",
                            published.format("%a, %d %b %Y %H:%M UTC")
                        ));
                    }

                    if !item.summary.is_empty() {
                        md.push_str(&format!("{}\n\n", item.summary));
                    }

                    if !item.url.is_empty() {
                        md.push_str(&format!(
                            "<a href=\"{}\" target=\"_blank\">Read Full Article →</a>\n\n",
                            item.url
                        ));
                    }
                }
            }

            md.push_str("---\n\n");
        }

        md
    }

    /// Write the digest to `<output_dir>/<YYYY-MM-DD>.md`
    pub fn save(content: &str, output_dir: &Path, date: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        let filepath = output_dir.join(Self::filename(date));

        fs::write(&filepath, content).context("Failed to write digest file")?;

        Ok(filepath)
    }
}
