use thiserror::Error;

/// A deduplication parameter outside its valid domain.
///
/// Raised while loading configuration; a run never starts with one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("dedup.shingle_size must be at least 1, got {0}")]
    ShingleSize(usize),

    #[error("dedup.similarity_threshold must be within [0, 1], got {0}")]
    SimilarityThreshold(f64),

    #[error("dedup.length_filter_ratio must be within [0, 1], got {0}")]
    LengthFilterRatio(f64),
}

impl ConfigError {
    /// Name of the offending configuration field
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::ShingleSize(_) => "shingle_size",
            ConfigError::SimilarityThreshold(_) => "similarity_threshold",
            ConfigError::LengthFilterRatio(_) => "length_filter_ratio",
        }
    }
}
