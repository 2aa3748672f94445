use axum::http::StatusCode;

/// Operational failures of the credential gate. All of these are expected,
/// user-facing outcomes; `Internal` carries unexpected faults (e.g. a signing
/// misconfiguration) which must never reach the client verbatim.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Invalid or malformed token")]
    InvalidToken,
    #[error("Token expired, please log in again")]
    ExpiredToken,
    #[error("Identity for this token no longer exists")]
    IdentityNotFound,
    #[error("You do not have permission to perform this operation")]
    Forbidden,
    #[error("Identity lookup timed out")]
    LookupTimeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::MissingToken
            | GateError::InvalidToken
            | GateError::ExpiredToken
            | GateError::IdentityNotFound
            | GateError::LookupTimeout => StatusCode::UNAUTHORIZED,
            GateError::Forbidden => StatusCode::FORBIDDEN,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
