//! Mock collaborators for exercising the crawler without network or PDFs.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fetch::{FetchError, Fetcher};
use crate::{ExtractError, Extracted, Extractor};

/// Marker prefix that makes [`MockExtractor`] report a failure.
pub const POISON: &[u8] = b"%BROKEN%";

/// In-memory [`Fetcher`]: registered URLs map to canned bytes,
/// everything else is a 404.
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    fetch_count: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Register the bytes served for `url`.
    pub fn insert(&self, url: &str, bytes: &[u8]) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
    }

    /// How many times `fetch()` has been called.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for MockFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let found = self.responses.lock().unwrap().get(url).cloned();
        Box::pin(async move { found.ok_or(FetchError::Status(reqwest::StatusCode::NOT_FOUND)) })
    }
}

/// [`Extractor`] that treats document bytes as UTF-8 text and never
/// writes any image artifacts. Bytes starting with [`POISON`] fail.
pub struct MockExtractor {
    extract_count: AtomicUsize,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            extract_count: AtomicUsize::new(0),
        }
    }

    /// How many times `extract()` has been called.
    pub fn extract_count(&self) -> usize {
        self.extract_count.load(Ordering::SeqCst)
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, bytes: &[u8], _paper_id: &str) -> Result<Extracted, ExtractError> {
        self.extract_count.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(POISON) {
            return Err(ExtractError::Extraction("unreadable document".into()));
        }
        Ok(Extracted {
            text: String::from_utf8_lossy(bytes).into_owned(),
            images: Vec::new(),
        })
    }
}
