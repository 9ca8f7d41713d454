use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use rules_mcp::config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rules_mcp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().expect("Failed to load configuration");
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    // Create data directory if not exists / 创建数据目录
    let data_dir = std::path::PathBuf::from(&app_config.repo.data_dir);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let state = Arc::new(AppState::new(app_config.repo.clone()));

    // Initial clone/pull + register load; an unreachable rules repo fails startup / 初始同步
    state.refresh().await?;

    // Re-pull at most once per configured interval / 按配置的间隔定时拉取
    state::spawn_refresher(state.clone());

    let app = Router::new()
        .route("/api/health", get(api::health_check))
        .route("/mcp", post(api::mcp::handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Rules MCP server running at http://{}/mcp", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
