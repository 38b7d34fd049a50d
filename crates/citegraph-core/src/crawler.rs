use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::fetch::Fetcher;
use crate::oracle::Oracle;
use crate::resolver::ReferenceResolver;
use crate::state::CrawlState;
use crate::{Extractor, PaperNode, ProcessOutcome, SkipReason, arxiv};

/// The paper processor: orchestrates normalizer, fetcher, extractor, and
/// resolver over a private [`CrawlState`].
///
/// Per identifier the state machine is
/// `Unseen -> Visited(Failed)` or `Unseen -> Extracted -> ReferencesResolved`.
/// Processing is strictly sequential: each download, extraction, and
/// oracle call completes before the next begins, so visitation order is
/// total and reproducible.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    resolver: ReferenceResolver,
    state: CrawlState,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        oracle: Arc<dyn Oracle>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            resolver: ReferenceResolver::new(oracle),
            state: CrawlState::new(),
        }
    }

    /// Process one paper URL.
    ///
    /// With `expand_references` set, the node's bibliography is resolved
    /// immediately and every resolved link is processed with expansion
    /// off, so discovered papers do not recurse further.
    ///
    /// An identifier is downloaded/extracted/resolved at most once per
    /// crawler; repeats return [`SkipReason::Duplicate`], including
    /// identifiers whose earlier extraction failed.
    pub async fn process_paper(&mut self, url: &str, expand_references: bool) -> ProcessOutcome {
        self.process_boxed(url.to_string(), expand_references).await
    }

    /// Process the seed paper without touching its references.
    pub async fn process_initial_paper(&mut self, url: &str) -> ProcessOutcome {
        self.process_paper(url, false).await
    }

    // Recursion goes through a boxed future: `process_paper` re-enters
    // itself for every resolved link.
    fn process_boxed(
        &mut self,
        url: String,
        expand_references: bool,
    ) -> Pin<Box<dyn Future<Output = ProcessOutcome> + Send + '_>> {
        Box::pin(async move {
            let Some(id) = arxiv::id_from_url(&url) else {
                tracing::warn!(url = %url, "could not extract an arXiv id from URL");
                return ProcessOutcome::Skipped(SkipReason::InvalidUrl);
            };

            if self.state.is_visited(&id) {
                tracing::debug!(id = %id, "already processed, skipping duplicate");
                return ProcessOutcome::Skipped(SkipReason::Duplicate);
            }
            // Mark before any I/O so a re-entry for the same id during
            // this call's own execution is deduped too.
            self.state.mark_visited(&id);

            let pdf_url = arxiv::ensure_pdf_suffix(&url);
            let bytes = match self.fetcher.fetch(&pdf_url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(id = %id, url = %pdf_url, error = %e, "download failed");
                    return ProcessOutcome::Skipped(SkipReason::FetchFailed);
                }
            };
            tracing::info!(id = %id, url = %pdf_url, bytes = bytes.len(), "downloaded paper");

            let extracted = match self.extractor.extract(&bytes, &id) {
                Ok(extracted) => extracted,
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "extraction failed");
                    return ProcessOutcome::Skipped(SkipReason::ExtractionFailed);
                }
            };
            tracing::info!(id = %id, images = extracted.images.len(), "extraction complete");

            self.state.put(PaperNode {
                id: id.clone(),
                source_url: url.clone(),
                text_content: extracted.text.clone(),
                images: extracted.images.clone(),
                references_processed: false,
                references: Vec::new(),
            });

            if expand_references {
                self.expand_node(&id).await;
            }

            ProcessOutcome::Processed {
                text: extracted.text,
                images: extracted.images,
            }
        })
    }

    /// Breadth-first expansion of the currently-known unresolved frontier.
    ///
    /// Snapshots the node ids known right now and resolves each
    /// unresolved one; papers discovered during this call are not in the
    /// snapshot and stay unresolved until a future call. Legal on an
    /// unseeded crawler (iterates zero nodes).
    pub async fn process_references(&mut self) {
        let snapshot: Vec<String> = self.state.ids().to_vec();
        tracing::info!(known = snapshot.len(), "expanding reference frontier");
        for id in snapshot {
            let already_resolved = self
                .state
                .get(&id)
                .map(|n| n.references_processed)
                .unwrap_or(true);
            if already_resolved {
                continue;
            }
            self.expand_node(&id).await;
        }
    }

    /// Resolve one node's bibliography and crawl the resolved links.
    ///
    /// `references_processed` flips before the links are crawled and is
    /// never reset.
    async fn expand_node(&mut self, id: &str) {
        let Some(text) = self.state.get(id).map(|n| n.text_content.clone()) else {
            return;
        };

        let references = self.resolver.extract_reference_list(&text).await;
        let entries = self.resolver.resolve_links(&references).await;

        let links: Vec<String> = entries
            .iter()
            .filter_map(|e| e.resolved_link.clone())
            .collect();

        if let Some(node) = self.state.get_mut(id) {
            node.references = entries;
            node.references_processed = true;
        }

        for link in links {
            tracing::info!(parent = %id, url = %link, "processing reference paper");
            self.process_boxed(link, false).await;
        }
    }

    // ── Query surface ──

    pub fn node(&self, id: &str) -> Option<&PaperNode> {
        self.state.get(id)
    }

    /// Stored node ids in discovery order; the zeroth entry is the seed
    /// when it succeeded.
    pub fn ids(&self) -> &[String] {
        self.state.ids()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PaperNode> {
        self.state.nodes()
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }
}
