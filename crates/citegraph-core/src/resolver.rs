use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::oracle::Oracle;
use crate::{ReferenceEntry, arxiv};

/// Where an oracle answer landed after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleReply {
    /// A well-formed arXiv identifier.
    Identifier(String),
    /// The oracle explicitly reported no identifier.
    NotFound,
    /// The cleaned answer did not validate as an identifier.
    Unparseable,
}

/// Parse a raw oracle answer into a tagged reply. Total; never fails.
pub fn parse_reply(response: &str) -> OracleReply {
    if response.contains("Not found") || response.contains("No arXiv ID found") {
        return OracleReply::NotFound;
    }
    static CLEAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9v.]").unwrap());
    let cleaned = CLEAN_RE.replace_all(response, "").to_string();
    if arxiv::is_valid_id(&cleaned) {
        OracleReply::Identifier(cleaned)
    } else {
        OracleReply::Unparseable
    }
}

/// Locate the bibliography: everything after a case-insensitive
/// "References" heading, with "Bibliography" as fallback.
pub fn find_references_section(text: &str) -> Option<String> {
    static REFERENCES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)References\s*\n").unwrap());
    static BIBLIOGRAPHY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)Bibliography\s*\n").unwrap());

    for re in [&*REFERENCES_RE, &*BIBLIOGRAPHY_RE] {
        if let Some(m) = re.find(text) {
            return Some(text[m.end()..].to_string());
        }
    }
    None
}

/// Strip leading `N.` markers from a numbered-list reply, passing
/// unmarked lines through unchanged. Blank lines are dropped.
pub fn parse_numbered_list(text: &str) -> Vec<String> {
    static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*(.+)").unwrap());

    text.trim()
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match MARKER_RE.captures(line) {
                Some(caps) => Some(caps[1].trim().to_string()),
                None => Some(line.to_string()),
            }
        })
        .collect()
}

/// Turns a paper's full text into candidate external links via the oracle.
pub struct ReferenceResolver {
    oracle: Arc<dyn Oracle>,
}

impl ReferenceResolver {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Extract the ordered raw reference strings from document text.
    ///
    /// No heading means no bibliography: returns an empty list without
    /// consulting the oracle. An oracle failure also yields an empty
    /// list; citation source data is noisy and the crawl must go on.
    pub async fn extract_reference_list(&self, text: &str) -> Vec<String> {
        let Some(section) = find_references_section(text) else {
            tracing::debug!("no references or bibliography heading found");
            return Vec::new();
        };

        let prompt = format!(
            "Extract all the references from the following text and provide them in a numbered list:\n{section}"
        );
        match self.oracle.ask(&prompt).await {
            Ok(reply) => parse_numbered_list(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "oracle call failed during reference extraction");
                Vec::new()
            }
        }
    }

    /// Resolve each raw reference to a candidate PDF link, strictly in
    /// order, one oracle call per entry. A failed call leaves that entry
    /// unresolved and never aborts the batch.
    pub async fn resolve_links(&self, references: &[String]) -> Vec<ReferenceEntry> {
        let mut entries = Vec::with_capacity(references.len());
        for (idx, raw) in references.iter().enumerate() {
            tracing::debug!(index = idx + 1, reference = %raw, "resolving reference");
            let resolved_link = self.resolve_one(raw).await;
            entries.push(ReferenceEntry {
                raw_text: raw.clone(),
                resolved_link,
            });
        }
        entries
    }

    async fn resolve_one(&self, reference: &str) -> Option<String> {
        let prompt = format!(
            "Find the arXiv ID for the following reference. Provide only the arXiv ID, \
             in the format 'XXXX.XXXXX' or 'XXXX.XXXXXvY'. If not available, say 'Not found'.\n\
             Reference: {reference}"
        );
        let reply = match self.oracle.ask(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "oracle call failed while resolving a reference");
                return None;
            }
        };
        match parse_reply(&reply) {
            OracleReply::Identifier(id) => Some(arxiv::pdf_url_for_id(&id)),
            OracleReply::NotFound => None,
            OracleReply::Unparseable => {
                tracing::debug!(reply = %reply, "oracle reply did not validate as an arXiv id");
                None
            }
        }
    }
}
