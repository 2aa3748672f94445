use std::sync::Arc;

use anyhow::Context;

mod app;
mod auth;
mod config;
mod error;
mod gate;
mod identity;
mod products;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "storegate=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let state = match config.database_url.clone() {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .context("connect to database")?;
            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                tracing::warn!(error = %e, "migration failed; continuing");
            }
            AppState::with_postgres(pool, config)
        }
        None => {
            tracing::info!("no DATABASE_URL set; using in-memory repositories");
            AppState::in_memory(config)
        }
    };

    let app = app::build_app(state);
    app::serve(app).await
}
