use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::gate::{CurrentIdentity, TokenKeys};
use crate::identity::model::{NewIdentity, Role};
use crate::identity::password::{hash_password, verify_password};
use crate::state::AppState;

use super::dto::{AuthResponse, LoginRequest, PublicIdentity, RegisterRequest};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    if state
        .identities
        .find_by_email(&payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let identity = state
        .identities
        .insert(NewIdentity {
            email: payload.email,
            password_hash: hash,
            role: payload.role.unwrap_or(Role::User),
        })
        .await?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.issue(&identity)?;

    info!(identity_id = %identity.id, email = %identity.email, "identity registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            identity: identity.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let identity = match state.identities.find_by_email(&payload.email).await? {
        Some(identity) => identity,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &identity.password_hash)? {
        warn!(email = %payload.email, identity_id = %identity.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = TokenKeys::from_ref(&state);
    let token = keys.issue(&identity)?;

    info!(identity_id = %identity.id, email = %identity.email, "identity logged in");
    Ok(Json(AuthResponse {
        token,
        identity: identity.into(),
    }))
}

#[instrument(skip_all)]
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<PublicIdentity> {
    Json(identity.into())
}
