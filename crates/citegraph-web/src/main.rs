use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

mod handlers;
mod models;
mod state;

use citegraph_core::oracle::openai::DEFAULT_MODEL;
use dashmap::DashMap;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let storage_root = std::env::var("CITEGRAPH_STORAGE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("citegraph-sessions"));
    std::fs::create_dir_all(&storage_root)?;

    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let state = Arc::new(AppState {
        sessions: DashMap::new(),
        storage_root,
        model,
    });

    let app = axum::Router::new()
        .route(
            "/api/papers",
            axum::routing::post(handlers::papers::process_paper),
        )
        .route(
            "/api/references",
            axum::routing::post(handlers::references::process_references),
        )
        .route(
            "/api/sessions/{session_id}/images/{*image}",
            axum::routing::get(handlers::images::get_image),
        )
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    println!("Citegraph server running at http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
