use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod arxiv;
pub mod config_file;
pub mod crawler;
pub mod fetch;
pub mod mock;
pub mod oracle;
pub mod resolver;
pub mod state;

// Re-export for convenience
pub use crawler::Crawler;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use oracle::{Oracle, OracleError, OpenAiOracle};
pub use resolver::{OracleReply, ReferenceResolver};
pub use state::{CrawlState, SessionDocument};

/// One crawled paper and its extracted artifacts.
///
/// Created only when extraction succeeds; mutated in place when the
/// resolver runs; never deleted within a crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperNode {
    /// Normalized arXiv identifier, e.g. "2106.14835" or "2106.14835v2".
    pub id: String,
    /// The URL the document was fetched from.
    pub source_url: String,
    /// Extracted plain text.
    pub text_content: String,
    /// Rendered page images, in page order.
    pub images: Vec<ImageHandle>,
    /// False until the resolver has run for this node; flips true exactly once.
    pub references_processed: bool,
    /// Bibliography entries, populated once resolved.
    pub references: Vec<ReferenceEntry>,
}

/// A single bibliography entry and its best-guess external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// The citation string as found in the source text.
    pub raw_text: String,
    /// Candidate PDF URL, or `None` when the oracle reported no identifier.
    pub resolved_link: Option<String>,
}

/// Handle to one image artifact written during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    /// File name within the paper's storage directory.
    pub file_name: String,
    /// Full path of the written image.
    pub path: PathBuf,
}

/// Output of a successful extraction.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub text: String,
    pub images: Vec<ImageHandle>,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to extract content: {0}")]
    Extraction(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte-level document extractor.
///
/// Implementations must not panic on malformed input; failures are
/// reported through `Err` so the crawler can degrade the paper to a
/// visited-but-absent node.
pub trait Extractor: Send + Sync {
    /// Extract plain text and image artifacts from raw document bytes.
    ///
    /// `paper_id` names the per-paper storage directory for any written
    /// artifacts.
    fn extract(&self, bytes: &[u8], paper_id: &str) -> Result<Extracted, ExtractError>;
}

/// Outcome of a [`Crawler::process_paper`] call.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The paper was downloaded, extracted, and stored.
    Processed {
        text: String,
        images: Vec<ImageHandle>,
    },
    /// The paper was not (re)processed.
    Skipped(SkipReason),
}

impl ProcessOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, ProcessOutcome::Processed { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            ProcessOutcome::Skipped(reason) => Some(*reason),
            ProcessOutcome::Processed { .. } => None,
        }
    }
}

/// Why a `process_paper` call declined to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The URL did not match the arXiv PDF shape.
    InvalidUrl,
    /// The identifier was already attempted; dedup no-op.
    Duplicate,
    /// Download failed; the identifier stays visited with no node.
    FetchFailed,
    /// The extractor rejected the bytes; the identifier stays visited with no node.
    ExtractionFailed,
}
