//! Integration tests for the [`Crawler`].
//!
//! These tests wire the crawler to mock collaborators so no HTTP
//! requests are made: the fetcher serves canned bytes, the extractor
//! treats bytes as UTF-8 text, and the oracle replays a scripted
//! sequence of completions.

use std::sync::Arc;

use citegraph_core::mock::{MockExtractor, MockFetcher, POISON};
use citegraph_core::oracle::mock::{MockOracle, MockReply};
use citegraph_core::{Crawler, ProcessOutcome, SkipReason};

fn pdf_url(id: &str) -> String {
    format!("https://arxiv.org/pdf/{id}.pdf")
}

/// Build a crawler over the given fetcher/oracle with the passthrough
/// extractor.
fn crawler_with(
    fetcher: Arc<MockFetcher>,
    extractor: Arc<MockExtractor>,
    oracle: Arc<MockOracle>,
) -> Crawler {
    Crawler::new(fetcher, extractor, oracle)
}

/// Paper body carrying a References section the resolver will find.
fn body_with_references(title: &str) -> String {
    format!(
        "{title}\n\nSome body text about the method.\n\nReferences\n[1] First entry.\n[2] Second entry.\n"
    )
}

#[tokio::test]
async fn dedup_processes_each_id_once() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), b"Paper A body.");
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::new(MockReply::text("Not found")));
    let mut crawler = crawler_with(fetcher.clone(), extractor.clone(), oracle);

    let first = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", false)
        .await;
    assert!(first.is_processed());

    // A second URL mapping to the same id is a silent no-op.
    let second = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835", false)
        .await;
    assert_eq!(second.skip_reason(), Some(SkipReason::Duplicate));

    assert_eq!(crawler.ids(), ["2106.14835"]);
    assert_eq!(extractor.extract_count(), 1);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn failed_extraction_poisons_the_id() {
    let fetcher = Arc::new(MockFetcher::new());
    let mut broken = POISON.to_vec();
    broken.extend_from_slice(b" garbage");
    fetcher.insert(&pdf_url("2106.14835"), &broken);
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::new(MockReply::text("Not found")));
    let mut crawler = crawler_with(fetcher.clone(), extractor, oracle);

    let first = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", false)
        .await;
    assert_eq!(first.skip_reason(), Some(SkipReason::ExtractionFailed));
    assert!(crawler.node("2106.14835").is_none());

    // The id stays visited: no retry, no new download.
    let second = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", false)
        .await;
    assert_eq!(second.skip_reason(), Some(SkipReason::Duplicate));
    assert!(crawler.node("2106.14835").is_none());
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn failed_download_poisons_the_id() {
    // Nothing registered: every fetch 404s.
    let fetcher = Arc::new(MockFetcher::new());
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::new(MockReply::text("Not found")));
    let mut crawler = crawler_with(fetcher, extractor, oracle);

    let first = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", false)
        .await;
    assert_eq!(first.skip_reason(), Some(SkipReason::FetchFailed));

    let second = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", false)
        .await;
    assert_eq!(second.skip_reason(), Some(SkipReason::Duplicate));
    assert!(crawler.ids().is_empty());
}

#[tokio::test]
async fn invalid_url_is_rejected_not_thrown() {
    let fetcher = Arc::new(MockFetcher::new());
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::new(MockReply::text("Not found")));
    let mut crawler = crawler_with(fetcher.clone(), extractor, oracle.clone());

    let outcome = crawler
        .process_paper("https://example.com/not-arxiv.pdf", false)
        .await;
    assert_eq!(outcome.skip_reason(), Some(SkipReason::InvalidUrl));
    assert!(crawler.ids().is_empty());
    assert_eq!(fetcher.fetch_count(), 0);
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn breadth_first_frontier_expands_known_nodes_only() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), body_with_references("Paper A").as_bytes());
    fetcher.insert(&pdf_url("1706.03762"), b"Paper B body, no bibliography.");
    fetcher.insert(&pdf_url("2004.05150"), b"Paper C body, no bibliography.");
    let extractor = Arc::new(MockExtractor::new());

    // One list-extraction call for A, then one resolution per entry:
    // B resolves, C resolves, D is not found.
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text("1. Ref to paper B.\n2. Ref to paper C.\n3. Ref to paper D."),
        MockReply::text("1706.03762"),
        MockReply::text("2004.05150"),
        MockReply::text("Not found"),
    ]));
    let mut crawler = crawler_with(fetcher, extractor, oracle.clone());

    let seeded = crawler
        .process_initial_paper("https://arxiv.org/pdf/2106.14835.pdf")
        .await;
    assert!(seeded.is_processed());
    // Seeding alone never touches the oracle.
    assert_eq!(oracle.call_count(), 0);

    crawler.process_references().await;

    assert_eq!(crawler.ids(), ["2106.14835", "1706.03762", "2004.05150"]);

    let a = crawler.node("2106.14835").unwrap();
    assert!(a.references_processed);
    assert_eq!(a.references.len(), 3);
    assert_eq!(
        a.references[0].resolved_link.as_deref(),
        Some("https://arxiv.org/pdf/1706.03762.pdf")
    );
    assert_eq!(a.references[2].resolved_link, None);

    // Newly discovered papers were not in the snapshot: still unresolved.
    assert!(!crawler.node("1706.03762").unwrap().references_processed);
    assert!(!crawler.node("2004.05150").unwrap().references_processed);
    assert_eq!(oracle.call_count(), 4);
}

#[tokio::test]
async fn resolution_flips_at_most_once_per_node() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), body_with_references("Paper A").as_bytes());
    fetcher.insert(&pdf_url("1706.03762"), b"Paper B body, no bibliography.");
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text("1. Ref to paper B.\n2. Ref to paper D."),
        MockReply::text("1706.03762"),
        MockReply::text("Not found"),
    ]));
    let mut crawler = crawler_with(fetcher, extractor, oracle.clone());

    crawler
        .process_initial_paper("https://arxiv.org/pdf/2106.14835.pdf")
        .await;
    crawler.process_references().await;
    assert_eq!(oracle.call_count(), 3);

    // Second pass resolves B (whose body has no bibliography heading, so
    // no oracle calls happen) and must not re-resolve A.
    crawler.process_references().await;
    assert_eq!(oracle.call_count(), 3);

    let a = crawler.node("2106.14835").unwrap();
    assert!(a.references_processed);
    assert_eq!(a.references.len(), 2);

    let b = crawler.node("1706.03762").unwrap();
    assert!(b.references_processed);
    assert!(b.references.is_empty());

    // A third pass finds the whole frontier resolved.
    crawler.process_references().await;
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn deep_expansion_stops_after_one_level() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), body_with_references("Paper A").as_bytes());
    // B also carries a bibliography, but must not be auto-expanded.
    fetcher.insert(&pdf_url("1706.03762"), body_with_references("Paper B").as_bytes());
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text("1. Ref to paper B.\n2. Ref to paper D."),
        MockReply::text("1706.03762"),
        MockReply::text("Not found"),
    ]));
    let mut crawler = crawler_with(fetcher, extractor, oracle.clone());

    let outcome = crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", true)
        .await;
    assert!(outcome.is_processed());

    assert_eq!(crawler.ids(), ["2106.14835", "1706.03762"]);
    assert!(crawler.node("2106.14835").unwrap().references_processed);
    assert!(!crawler.node("1706.03762").unwrap().references_processed);
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn self_citation_does_not_recurse() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), body_with_references("Paper A").as_bytes());
    let extractor = Arc::new(MockExtractor::new());
    // The single reference resolves back to the seed itself.
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text("1. The seed paper citing itself."),
        MockReply::text("2106.14835"),
    ]));
    let mut crawler = crawler_with(fetcher.clone(), extractor, oracle);

    crawler
        .process_paper("https://arxiv.org/pdf/2106.14835.pdf", true)
        .await;

    assert_eq!(crawler.ids(), ["2106.14835"]);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn oracle_failure_unresolves_single_entry_only() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.insert(&pdf_url("2106.14835"), body_with_references("Paper A").as_bytes());
    fetcher.insert(&pdf_url("1706.03762"), b"Paper B body.");
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text("1. Entry one.\n2. Entry two.\n3. Entry three."),
        MockReply::Error("oracle unavailable".into()),
        MockReply::text("1706.03762"),
        MockReply::text("garbage answer"),
    ]));
    let mut crawler = crawler_with(fetcher, extractor, oracle);

    crawler
        .process_initial_paper("https://arxiv.org/pdf/2106.14835.pdf")
        .await;
    crawler.process_references().await;

    let a = crawler.node("2106.14835").unwrap();
    assert_eq!(a.references.len(), 3);
    assert_eq!(a.references[0].resolved_link, None);
    assert_eq!(
        a.references[1].resolved_link.as_deref(),
        Some("https://arxiv.org/pdf/1706.03762.pdf")
    );
    assert_eq!(a.references[2].resolved_link, None);
    assert_eq!(crawler.ids(), ["2106.14835", "1706.03762"]);
}

#[tokio::test]
async fn process_references_before_seeding_is_a_noop() {
    let fetcher = Arc::new(MockFetcher::new());
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::new(MockReply::text("Not found")));
    let mut crawler = crawler_with(fetcher, extractor, oracle.clone());

    crawler.process_references().await;
    assert!(crawler.ids().is_empty());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn end_to_end_seed_and_one_resolvable_reference() {
    let fetcher = Arc::new(MockFetcher::new());
    let seed_body = "A Survey Paper\n\nLong body.\n\nReferences\n\
                     [1] Vaswani et al. Attention Is All You Need.\n\
                     [2] An obscure technical report.\n";
    fetcher.insert(&pdf_url("2106.14835"), seed_body.as_bytes());
    fetcher.insert(&pdf_url("1706.03762"), b"Attention Is All You Need body.");
    let extractor = Arc::new(MockExtractor::new());
    let oracle = Arc::new(MockOracle::with_sequence(vec![
        MockReply::text(
            "1. Vaswani et al. Attention Is All You Need.\n2. An obscure technical report.",
        ),
        MockReply::text("1706.03762"),
        MockReply::text("Not found"),
    ]));
    let mut crawler = crawler_with(fetcher, extractor, oracle);

    // The seed URL is missing its .pdf extension; the crawler corrects it.
    let outcome = crawler
        .process_initial_paper("https://arxiv.org/pdf/2106.14835")
        .await;
    match &outcome {
        ProcessOutcome::Processed { text, .. } => assert!(text.contains("A Survey Paper")),
        ProcessOutcome::Skipped(reason) => panic!("seed was skipped: {reason:?}"),
    }

    crawler.process_references().await;

    assert_eq!(crawler.ids(), ["2106.14835", "1706.03762"]);
    let seed = crawler.node("2106.14835").unwrap();
    assert_eq!(seed.references.len(), 2);
    assert!(seed.references[0].resolved_link.is_some());
    assert!(seed.references[1].resolved_link.is_none());
    assert!(
        crawler
            .node("1706.03762")
            .unwrap()
            .text_content
            .contains("Attention")
    );
}
