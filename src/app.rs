use std::net::SocketAddr;

use axum::{http::Uri, response::IntoResponse, routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{now_rfc3339, ApiError};
use crate::state::AppState;
use crate::{auth, products};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "API is running",
        "timestamp": now_rfc3339(),
    }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    ApiError::NotFound(format!("Cannot find {uri} on this server"))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
