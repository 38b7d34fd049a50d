use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use citegraph_core::{Crawler, HttpFetcher, OpenAiOracle, ProcessOutcome, SkipReason};
use citegraph_pdf_mupdf::MupdfExtractor;

use crate::models::{ErrorBody, ProcessRequest, ProcessResponse};
use crate::state::{AppState, Session};

/// Process a seed document: create a session, crawl the seed paper, and
/// return its extracted text plus the session handle.
pub async fn process_paper(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Response {
    if req.pdf_url.is_empty() || req.api_key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Please provide both pdf_url and api_key")),
        )
            .into_response();
    }

    let session_id = AppState::new_session_id();
    let session_dir = state.storage_root.join(&session_id);

    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to initialize session")),
            )
                .into_response();
        }
    };
    let extractor = Arc::new(MupdfExtractor::new(&session_dir));
    let oracle = match OpenAiOracle::with_model(&req.api_key, &state.model, Duration::from_secs(60))
    {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            tracing::error!(error = %e, "failed to build oracle client");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to initialize session")),
            )
                .into_response();
        }
    };

    let mut crawler = Crawler::new(fetcher, extractor, oracle);
    let outcome = crawler.process_initial_paper(&req.pdf_url).await;

    match outcome {
        ProcessOutcome::Processed { text, images } => {
            let paper_id = crawler
                .ids()
                .first()
                .cloned()
                .unwrap_or_default();
            let image_ids: Vec<String> = images
                .iter()
                .map(|img| format!("{}/{}", paper_id, img.file_name))
                .collect();

            tracing::info!(session = %session_id, paper = %paper_id, "seed paper processed");
            state.sessions.insert(
                session_id.clone(),
                Arc::new(Mutex::new(Session {
                    crawler,
                    dir: session_dir,
                })),
            );

            Json(ProcessResponse {
                status: "success".into(),
                session_id,
                paper_id,
                extracted_text: text,
                images: image_ids,
            })
            .into_response()
        }
        ProcessOutcome::Skipped(SkipReason::InvalidUrl) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Not a valid arXiv PDF URL")),
        )
            .into_response(),
        ProcessOutcome::Skipped(SkipReason::FetchFailed) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody::new("Failed to download paper")),
        )
            .into_response(),
        ProcessOutcome::Skipped(SkipReason::ExtractionFailed) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody::new("Failed to extract text from paper")),
        )
            .into_response(),
        // A fresh crawler cannot have visited anything yet.
        ProcessOutcome::Skipped(SkipReason::Duplicate) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Failed to process paper")),
        )
            .into_response(),
    }
}
