pub mod routes;

use crate::config::AppConfig;
use crate::errors::EngineResult;
use crate::state::AppState;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/api/evaluate", axum::routing::post(routes::evaluate))
        .route("/api/health", axum::routing::get(routes::health))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(config: AppConfig) -> EngineResult<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
