use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use citegraph_core::Crawler;

/// One crawl session: a crawler plus its private storage directory.
///
/// Sessions replace the original system's single global processor; each
/// is referenced only by its opaque handle.
pub struct Session {
    pub crawler: Crawler,
    pub dir: PathBuf,
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    /// Active sessions keyed by opaque handle. The per-session mutex
    /// serializes crawl operations; distinct sessions are independent.
    pub sessions: DashMap<String, Arc<Mutex<Session>>>,
    /// Root under which per-session directories are created.
    pub storage_root: PathBuf,
    /// Completion model used for every session's oracle.
    pub model: String,
}

impl AppState {
    /// Generate an opaque session handle.
    pub fn new_session_id() -> String {
        format!("{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..))
    }
}
