use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::model::{Identity, Role};

/// Body for identity registration. Role defaults to `user`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub identity: PublicIdentity,
}

/// Client-safe view of an identity; no credential material.
#[derive(Debug, Serialize)]
pub struct PublicIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Identity> for PublicIdentity {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            role: identity.role,
        }
    }
}
