use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::JwtConfig;
use crate::gate::claims::Claims;
use crate::gate::error::GateError;
use crate::identity::model::Identity;
use crate::state::AppState;

/// Signing and verification keys plus token metadata. Built once per request
/// from the read-only config; the secret never leaves this struct.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl TokenKeys {
    /// Issue a signed, time-bounded token embedding the identity's claims.
    pub fn issue(&self, identity: &Identity) -> Result<String, GateError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| GateError::Internal(e.into()))?;
        debug!(identity_id = %identity.id, "token issued");
        Ok(token)
    }

    /// Check signature, structure, expiry, issuer and audience; return the
    /// embedded claims. An elapsed expiry is the only failure reported as
    /// [`GateError::ExpiredToken`]; every other decode failure collapses to
    /// [`GateError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Claims, GateError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => GateError::ExpiredToken,
                _ => GateError::InvalidToken,
            })?;
        debug!(identity_id = %data.claims.sub, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::model::Role;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> TokenKeys {
        TokenKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn issue_then_verify_returns_the_identity_claims() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let identity = Identity::fixture(Role::User);
        let token = keys.issue(&identity).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, identity.id);
        assert_eq!(claims.email, identity.email);
        assert_eq!(claims.role, identity.role);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let identity = Identity::fixture(Role::User);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        // expiry well past the decoder's default leeway
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: (now - 600) as usize,
            exp: (now - 300) as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        let err = keys.verify(&token).expect_err("expired token must fail");
        assert!(matches!(err, GateError::ExpiredToken));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&Identity::fixture(Role::Admin)).expect("issue");
        let (rest, sig) = token.rsplit_once('.').expect("three segments");
        let mut sig = sig.to_string();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        sig.replace_range(0..1, flipped);
        let err = keys
            .verify(&format!("{rest}.{sig}"))
            .expect_err("tampered token must fail");
        assert!(matches!(err, GateError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let err = keys.verify("not-a-token").expect_err("garbage must fail");
        assert!(matches!(err, GateError::InvalidToken));
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys
            .issue(&Identity::fixture(Role::User))
            .expect("issue");
        let err = bad_keys.verify(&token).expect_err("claims mismatch");
        assert!(matches!(err, GateError::InvalidToken));
    }
}
