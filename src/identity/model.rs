use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Access level of an identity. Closed set: an unknown role cannot be
/// constructed, deserialized, or read back from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "identity_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Authenticated actor record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, not exposed in JSON
    pub role: Role,
    pub created_at: OffsetDateTime,
}

/// Fields needed to create an identity; id and timestamp are assigned by the
/// repository.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[cfg(test)]
impl Identity {
    pub(crate) fn fixture(role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            password_hash: "unused".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
