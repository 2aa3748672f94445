use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::error::ApiError;
use crate::gate::authz::authenticate;
use crate::gate::error::GateError;
use crate::gate::keys::TokenKeys;
use crate::identity::model::Identity;
use crate::state::AppState;

/// Extracts the bearer token, verifies it and re-resolves the subject.
///
/// A handler taking this extractor only runs once the caller is
/// authenticated; role checks stay in the handler via
/// [`authorize`](crate::gate::authorize).
#[derive(Debug)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(GateError::MissingToken)?;

        // Expect "Bearer <token>"
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(GateError::InvalidToken)?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!("token rejected");
            e
        })?;

        let identity = authenticate(
            &claims,
            state.identities.as_ref(),
            state.config.lookup_timeout(),
        )
        .await?;

        Ok(CurrentIdentity(identity))
    }
}
