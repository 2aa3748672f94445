use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Identity, NewIdentity};

/// Lookup capability injected into the credential gate and the auth handlers.
/// The gate never owns storage; anything satisfying this trait can back it,
/// as long as concurrent reads are safe.
#[async_trait]
pub trait IdentityRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>>;
    async fn insert(&self, new: NewIdentity) -> anyhow::Result<Identity>;
}

/// Process-local store. Lock is never held across an await point.
#[derive(Default)]
pub struct MemoryIdentityRepo {
    inner: RwLock<HashMap<Uuid, Identity>>,
}

#[async_trait]
impl IdentityRepo for MemoryIdentityRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("identity store lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("identity store lock poisoned"))?;
        Ok(map.values().find(|i| i.email == email).cloned())
    }

    async fn insert(&self, new: NewIdentity) -> anyhow::Result<Identity> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("identity store lock poisoned"))?;
        if map.values().any(|i| i.email == new.email) {
            anyhow::bail!("email already taken: {}", new.email);
        }
        let identity = Identity {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: OffsetDateTime::now_utc(),
        };
        map.insert(identity.id, identity.clone());
        Ok(identity)
    }
}

pub struct PgIdentityRepo {
    pool: PgPool,
}

impl PgIdentityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepo for PgIdentityRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn insert(&self, new: NewIdentity) -> anyhow::Result<Identity> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(identity)
    }
}
