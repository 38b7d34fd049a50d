use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::models::ErrorBody;
use crate::state::AppState;

/// Serve one image artifact for a session.
///
/// The image identifier is `<paper_id>/<file_name>` as reported by the
/// process endpoint. The resolved path must stay inside the session's
/// private storage directory.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path((session_id, image)): Path<(String, String)>,
) -> Response {
    let Some(entry) = state.sessions.get(&session_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Unknown session")),
        )
            .into_response();
    };
    let session = Arc::clone(entry.value());
    drop(entry);

    let session = session.lock().await;
    let Some(path) = resolve_contained(&session.dir, &image) else {
        tracing::warn!(session = %session_id, image = %image, "rejected image path");
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Unknown image")),
        )
            .into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Unknown image")),
        )
            .into_response(),
    }
}

/// Resolve `relative` against `root`, refusing anything that would
/// escape it. Returns the canonicalized path only when it exists and
/// stays under the canonicalized root.
fn resolve_contained(root: &FsPath, relative: &str) -> Option<PathBuf> {
    if relative.is_empty()
        || relative.starts_with('/')
        || relative.contains('\\')
        || relative.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return None;
    }
    let canonical_root = root.canonicalize().ok()?;
    let canonical = root.join(relative).canonicalize().ok()?;
    if canonical.starts_with(&canonical_root) {
        Some(canonical)
    } else {
        None
    }
}
