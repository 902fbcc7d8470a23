use nav_server::config::ServiceConfig;
use nav_server::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env().expect("Invalid configuration");
    let state = AppState::from_config(&config).expect("Failed to create providers");
    let app = create_router(state);

    let addr = config.bind_addr;
    info!(%addr, "Route planner listening");
    info!("  GET  /health                - Health check");
    info!("  POST /route                 - Resolve and schedule a route");
    info!("  POST /optimize              - Alias for /route");
    info!("  POST /route/optimize-order  - Reorder stops by proximity");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
