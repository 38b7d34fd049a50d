use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::PaperNode;

/// Nodes and visitation bookkeeping for one crawl.
///
/// Pure data holder; the [`Crawler`](crate::Crawler) is the sole mutator.
/// `visited` is a superset of the stored node keys: identifiers whose
/// extraction failed are visited but never get a node.
#[derive(Debug, Default)]
pub struct CrawlState {
    nodes: HashMap<String, PaperNode>,
    /// Discovery order of stored node ids; index 0 is the seed when it succeeds.
    order: Vec<String>,
    visited: HashSet<String>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PaperNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PaperNode> {
        self.nodes.get_mut(id)
    }

    /// Store a node, recording discovery order on first insertion.
    pub fn put(&mut self, node: PaperNode) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn mark_visited(&mut self, id: &str) {
        self.visited.insert(id.to_string());
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Stored node ids in discovery order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &PaperNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Project the state into the per-session JSON document.
    pub fn session_document(&self) -> SessionDocument<'_> {
        let mut visited: Vec<&str> = self.visited.iter().map(String::as_str).collect();
        visited.sort_unstable();
        SessionDocument {
            papers: self.nodes().collect(),
            visited,
        }
    }
}

/// Serializable snapshot of a crawl session, written once at session end.
#[derive(Debug, Serialize)]
pub struct SessionDocument<'a> {
    /// Stored nodes in discovery order.
    pub papers: Vec<&'a PaperNode>,
    /// All attempted identifiers, sorted for stable output.
    pub visited: Vec<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> PaperNode {
        PaperNode {
            id: id.to_string(),
            source_url: format!("https://arxiv.org/pdf/{id}.pdf"),
            text_content: "text".into(),
            images: vec![],
            references_processed: false,
            references: vec![],
        }
    }

    #[test]
    fn test_put_records_discovery_order() {
        let mut state = CrawlState::new();
        state.put(node("2106.14835"));
        state.put(node("1706.03762"));
        state.put(node("1810.04805"));
        assert_eq!(state.ids(), ["2106.14835", "1706.03762", "1810.04805"]);
    }

    #[test]
    fn test_put_same_id_does_not_reorder() {
        let mut state = CrawlState::new();
        state.put(node("2106.14835"));
        state.put(node("1706.03762"));
        state.put(node("2106.14835"));
        assert_eq!(state.ids(), ["2106.14835", "1706.03762"]);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_visited_is_superset_of_nodes() {
        let mut state = CrawlState::new();
        state.mark_visited("2106.14835");
        state.put(node("2106.14835"));
        // A failed extraction: visited, never stored.
        state.mark_visited("9999.00001");

        assert!(state.is_visited("2106.14835"));
        assert!(state.is_visited("9999.00001"));
        assert!(state.has("2106.14835"));
        assert!(!state.has("9999.00001"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_session_document_orders_papers() {
        let mut state = CrawlState::new();
        state.mark_visited("2106.14835");
        state.put(node("2106.14835"));
        state.mark_visited("1706.03762");
        state.put(node("1706.03762"));
        state.mark_visited("0000.00000");

        let doc = state.session_document();
        let ids: Vec<&str> = doc.papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2106.14835", "1706.03762"]);
        assert_eq!(doc.visited, ["0000.00000", "1706.03762", "2106.14835"]);
    }
}
