use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{ErrorBody, ReferenceJson, ReferencesRequest, ReferencesResponse};
use crate::state::AppState;

/// Expand references for a session: run one breadth pass over the known
/// frontier and report the seed's resolved reference list.
pub async fn process_references(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReferencesRequest>,
) -> Response {
    let Some(entry) = state.sessions.get(&req.session_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Unknown session")),
        )
            .into_response();
    };
    let session = Arc::clone(entry.value());
    drop(entry);

    let mut session = session.lock().await;
    session.crawler.process_references().await;

    let ids = session.crawler.ids();
    let references: Vec<ReferenceJson> = ids
        .first()
        .and_then(|seed_id| session.crawler.node(seed_id))
        .map(|seed| seed.references.iter().map(ReferenceJson::from).collect())
        .unwrap_or_default();

    // Index 0 is the seed; index 1 is the first discovered reference.
    let first_reference_text = ids
        .get(1)
        .and_then(|id| session.crawler.node(id))
        .map(|node| node.text_content.clone());

    if references.is_empty() && first_reference_text.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("No references found.")),
        )
            .into_response();
    }

    // Partial success (some entries unresolved) is still success.
    Json(ReferencesResponse {
        status: "success".into(),
        references,
        first_reference_text,
    })
    .into_response()
}
