use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::model::Role;

/// JWT payload carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // identity ID
    pub email: String,
    pub role: Role,
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}
