use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tender_match_rust::{api, create_pool, AppConfig, AutoMatchService};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);
    config.matching.validate()?;

    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    let auto_match_service = Arc::new(AutoMatchService::new(pool, config.matching.clone()));

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/match/auto", post(api::auto_match))
        .with_state(auto_match_service)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/match/auto  - run auto-matching for a project");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
