use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dedup::{DedupConfig, DiscardReport};

/// Discard report as written to disk
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportFile {
    pub version: String,
    pub created_at: String,
    pub shingle_size: usize,
    pub similarity_threshold: f64,
    pub length_filter_ratio: f64,
    pub input_count: usize,
    pub kept_count: usize,
    pub discarded: DiscardReport,
}

impl ReportFile {
    pub fn new(
        run_date: DateTime<Utc>,
        config: &DedupConfig,
        input_count: usize,
        report: DiscardReport,
    ) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: run_date.to_rfc3339(),
            shingle_size: config.shingle_size,
            similarity_threshold: config.similarity_threshold,
            length_filter_ratio: config.length_filter_ratio,
            input_count,
            kept_count: input_count.saturating_sub(report.len()),
            discarded: report,
        }
    }
}

/// Save the discard report as pretty JSON
pub fn save_report(data: &ReportFile, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(data).context("Failed to serialize discard report")?;

    fs::write(path, json).context("Failed to write discard report")?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DiscardEntry;
    use chrono::TimeZone;

    fn report() -> DiscardReport {
        DiscardReport {
            entries: vec![DiscardEntry {
                url: "http://b.com".to_string(),
                title: "Breaking news".to_string(),
                category: "world".to_string(),
                representative: "http://a.com".to_string(),
                score: 1.0,
            }],
        }
    }

    #[test]
    fn test_report_counts() {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let data = ReportFile::new(date, &DedupConfig::default(), 5, report());
        assert_eq!(data.kept_count, 4);
        assert_eq!(data.similarity_threshold, 0.7);
        assert_eq!(data.created_at, "2024-03-15T08:00:00+00:00");
    }

    #[test]
    fn test_save_report_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("dedup.json");
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let data = ReportFile::new(date, &DedupConfig::default(), 2, report());

        let written = save_report(&data, &path).unwrap();
        assert_eq!(written, path);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"representative\": \"http://a.com\""));

        let loaded: ReportFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded.discarded, report());
        assert_eq!(loaded.input_count, 2);
        assert_eq!(loaded.kept_count, 1);
    }
}
