use empdesk_server::api::{self, AppState};
use empdesk_server::store::Store;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Open the store ─────────────────────────────────────────
    let db_path = env::var("EMPDESK_DB").unwrap_or_else(|_| "empdesk.redb".to_string());
    let store = Store::open(&db_path).expect("Failed to open store");

    let employees = store.list_employees().expect("Failed to read employees");
    let tasks = store.list_tasks().expect("Failed to read tasks");
    tracing::info!(
        "Store loaded from {db_path}: {} employees, {} tasks",
        employees.len(),
        tasks.len(),
    );

    // ── Router ─────────────────────────────────────────────────
    let state = Arc::new(AppState { store });
    let app = api::router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    // ── Start ──────────────────────────────────────────────────
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(4000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server is running on port {port}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
