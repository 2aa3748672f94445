use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::identity::repo::{IdentityRepo, MemoryIdentityRepo, PgIdentityRepo};
use crate::products::repo::{MemoryProductRepo, PgProductRepo, ProductRepo};

#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<dyn IdentityRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Repositories backed by the shared Postgres pool.
    pub fn with_postgres(pool: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            identities: Arc::new(PgIdentityRepo::new(pool.clone())),
            products: Arc::new(PgProductRepo::new(pool)),
            config,
        }
    }

    /// Process-local repositories with the demo catalog preloaded.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            identities: Arc::new(MemoryIdentityRepo::default()),
            products: Arc::new(MemoryProductRepo::with_demo_data()),
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            lookup_timeout_ms: 200,
        });
        Self::in_memory(config)
    }
}
