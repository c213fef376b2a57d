// Public modules
pub mod archive;
pub mod config;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod feed;
pub mod io;
pub mod models;
pub mod shingles;
pub mod similarity;
pub mod site;
pub mod summary;

// Re-export commonly used types
pub use archive::archive_old_files;
pub use config::{Config, SourceConfig};
pub use dedup::{DedupConfig, DedupOutcome, Deduplicator, DiscardReport, RetentionDecision};
pub use digest::DigestGenerator;
pub use error::ConfigError;
pub use feed::{select_sources, FeedClient, SourceItems};
pub use io::{save_report, ReportFile};
pub use models::Item;
pub use shingles::{Fingerprint, Shingler, Tokenizer};
pub use similarity::Scorer;
pub use site::{find_digest_files, DigestFile, SiteGenerator};
pub use summary::write_summaries;
