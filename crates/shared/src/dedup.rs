use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::models::Item;
use crate::shingles::{Fingerprint, Shingler, Tokenizer};
use crate::similarity::{Score, Scorer};

/// Tunable parameters of the near-duplicate detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub enabled: bool,
    pub shingle_size: usize,
    pub similarity_threshold: f64,
    pub length_filter_ratio: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shingle_size: 3,
            similarity_threshold: 0.7,
            length_filter_ratio: 0.5,
        }
    }
}

impl DedupConfig {
    pub fn new(
        shingle_size: usize,
        similarity_threshold: f64,
        length_filter_ratio: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            enabled: true,
            shingle_size,
            similarity_threshold,
            length_filter_ratio,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its domain. NaN is never in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shingle_size < 1 {
            return Err(ConfigError::ShingleSize(self.shingle_size));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::SimilarityThreshold(self.similarity_threshold));
        }
        if !(0.0..=1.0).contains(&self.length_filter_ratio) {
            return Err(ConfigError::LengthFilterRatio(self.length_filter_ratio));
        }
        Ok(())
    }
}

/// Score between two items of the same run.
///
/// A length-filtered pair carries a score of 0 like any other non-match.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult<'a> {
    pub candidate: &'a str,
    pub kept: &'a str,
    pub score: f64,
    /// Shingles were never compared
    pub length_filtered: bool,
}

/// What happened to one input item
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionDecision {
    Kept,
    Duplicate { representative: String, score: f64 },
}

impl RetentionDecision {
    pub fn is_kept(&self) -> bool {
        matches!(self, RetentionDecision::Kept)
    }
}

/// A rejected item and the kept item it duplicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardEntry {
    pub url: String,
    pub title: String,
    pub category: String,
    pub representative: String,
    pub score: f64,
}

/// Rejected items in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscardReport {
    pub entries: Vec<DiscardEntry>,
}

impl DiscardReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for a rejected item's url
    pub fn get(&self, url: &str) -> Option<&DiscardEntry> {
        self.entries.iter().find(|entry| entry.url == url)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonStats {
    /// Pairs handed to the scorer
    pub comparisons: usize,
    /// Pairs rejected by the length pre-filter
    pub length_filtered: usize,
}

/// Result of one deduplication pass
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Surviving items in input order
    pub kept: Vec<Item>,
    /// One decision per input item, aligned with the input
    pub decisions: Vec<RetentionDecision>,
    pub report: DiscardReport,
    pub stats: ComparisonStats,
}

/// Kept items of one category with their cached fingerprints
struct Partition<'a> {
    kept: Vec<(&'a Item, Fingerprint)>,
}

/// Near-duplicate resolver.
///
/// Items are visited in input order and compared only against kept items of
/// the same category. The first kept item scoring at or above the threshold
/// becomes the representative; there is no search for a better match.
pub struct Deduplicator<T = Shingler> {
    tokenizer: T,
    scorer: Scorer,
    threshold: f64,
}

impl Deduplicator<Shingler> {
    pub fn new(config: &DedupConfig) -> Self {
        Self::with_tokenizer(config, Shingler::new(config.shingle_size))
    }
}

impl<T: Tokenizer> Deduplicator<T> {
    /// `config` is expected to be validated already
    pub fn with_tokenizer(config: &DedupConfig, tokenizer: T) -> Self {
        Self {
            tokenizer,
            scorer: Scorer::new(config.length_filter_ratio),
            threshold: config.similarity_threshold,
        }
    }

    pub fn fingerprint(&self, item: &Item) -> Fingerprint {
        self.tokenizer.fingerprint(&item.dedup_text())
    }

    pub fn compare<'a>(
        &self,
        candidate: (&'a Item, &Fingerprint),
        kept: (&'a Item, &Fingerprint),
    ) -> ComparisonResult<'a> {
        let score = self.scorer.score(candidate.1, kept.1);
        ComparisonResult {
            candidate: &candidate.0.url,
            kept: &kept.0.url,
            score: score.value(),
            length_filtered: score == Score::Filtered,
        }
    }

    pub fn resolve(&self, items: &[Item]) -> DedupOutcome {
        let mut partitions: HashMap<&str, Partition> = HashMap::new();
        let mut decisions = Vec::with_capacity(items.len());
        let mut report = DiscardReport::default();
        let mut stats = ComparisonStats::default();

        for item in items {
            let fingerprint = self.fingerprint(item);
            let partition = partitions
                .entry(item.category.as_str())
                .or_insert_with(|| Partition { kept: Vec::new() });

            let mut matched = None;
            // an empty fingerprint scores 0 against everything
            if !fingerprint.is_empty() {
                for (kept_item, kept_fingerprint) in &partition.kept {
                    let result =
                        self.compare((item, &fingerprint), (*kept_item, kept_fingerprint));
                    stats.comparisons += 1;
                    if result.length_filtered {
                        stats.length_filtered += 1;
                    }
                    if result.score >= self.threshold {
                        matched = Some((*kept_item, result));
                        break;
                    }
                }
            }

            match matched {
                Some((representative, result)) => {
                    let score = result.score;
                    debug!(
                        url = %result.candidate,
                        representative = %result.kept,
                        score,
                        length_filtered = result.length_filtered,
                        "Dropping near-duplicate: '{}' matches '{}'",
                        item.title,
                        representative.title
                    );
                    report.entries.push(DiscardEntry {
                        url: item.url.clone(),
                        title: item.title.clone(),
                        category: item.category.clone(),
                        representative: representative.url.clone(),
                        score,
                    });
                    decisions.push(RetentionDecision::Duplicate {
                        representative: representative.url.clone(),
                        score,
                    });
                }
                None => {
                    partition.kept.push((item, fingerprint));
                    decisions.push(RetentionDecision::Kept);
                }
            }
        }

        let kept: Vec<Item> = items
            .iter()
            .zip(&decisions)
            .filter(|(_, decision)| decision.is_kept())
            .map(|(item, _)| item.clone())
            .collect();

        info!(
            input = items.len(),
            kept = kept.len(),
            removed = report.len(),
            comparisons = stats.comparisons,
            length_filtered = stats.length_filtered,
            "Deduplication complete (threshold: {:.2})",
            self.threshold
        );

        DedupOutcome {
            kept,
            decisions,
            report,
            stats,
        }
    }
}
