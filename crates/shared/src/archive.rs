use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Move digests older than today into `archive_dir/<run_date formatted>/`.
///
/// Today's digest and `README.md` stay where they are. Returns the
/// destination of every moved file.
pub fn archive_old_files(
    output_dir: &Path,
    archive_dir: &Path,
    today_filename: &str,
    archive_format: &str,
    run_date: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read output directory: {}", output_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("md"))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name != today_filename && name != "README.md")
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut subdir = String::new();
    write!(subdir, "{}", run_date.format(archive_format))
        .map_err(|_| anyhow::anyhow!("Invalid archive format: {}", archive_format))?;
    let dest_dir = archive_dir.join(subdir);
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("Failed to create archive directory: {}", dest_dir.display()))?;

    let mut moved = Vec::with_capacity(candidates.len());
    for path in candidates {
        // filtered above to paths with a UTF-8 file name
        let Some(name) = path.file_name() else {
            continue;
        };
        let dest = dest_dir.join(name);
        fs::rename(&path, &dest).with_context(|| {
            format!("Failed to move {} to {}", path.display(), dest.display())
        })?;
        info!("Archived {} → {}", path.display(), dest.display());
        moved.push(dest);
    }

    Ok(moved)
}
