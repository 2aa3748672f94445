use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::gate::claims::Claims;
use crate::gate::error::GateError;
use crate::identity::model::{Identity, Role};
use crate::identity::repo::IdentityRepo;

/// Re-resolve verified claims against the live identity store.
///
/// Tokens are stateless and cannot be revoked, so liveness is re-checked on
/// every request. The lookup is bounded: a store that does not answer within
/// `lookup_timeout` is treated the same as a missing identity.
pub async fn authenticate(
    claims: &Claims,
    identities: &dyn IdentityRepo,
    lookup_timeout: Duration,
) -> Result<Identity, GateError> {
    match timeout(lookup_timeout, identities.find_by_id(claims.sub)).await {
        Err(_) => {
            warn!(identity_id = %claims.sub, "identity lookup timed out");
            Err(GateError::LookupTimeout)
        }
        Ok(Err(e)) => Err(GateError::Internal(e)),
        Ok(Ok(None)) => {
            warn!(identity_id = %claims.sub, "token subject no longer exists");
            Err(GateError::IdentityNotFound)
        }
        Ok(Ok(Some(identity))) => Ok(identity),
    }
}

/// Allow the request iff the identity's role is in the allowed set.
pub fn authorize(identity: &Identity, allowed: &[Role]) -> Result<(), GateError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        warn!(identity_id = %identity.id, role = ?identity.role, "role not permitted");
        Err(GateError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::identity::model::NewIdentity;
    use crate::identity::repo::MemoryIdentityRepo;

    fn claims_for(identity: &Identity) -> Claims {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        Claims {
            sub: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            iat: now,
            exp: now + 300,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        }
    }

    #[test]
    fn authorize_enforces_the_allowed_set() {
        let admin = Identity::fixture(Role::Admin);
        assert!(authorize(&admin, &[Role::Admin]).is_ok());

        let user = Identity::fixture(Role::User);
        let err = authorize(&user, &[Role::Admin]).expect_err("user is not admin");
        assert!(matches!(err, GateError::Forbidden));

        assert!(authorize(&user, &[Role::User, Role::Admin]).is_ok());
    }

    #[tokio::test]
    async fn authenticate_resolves_a_live_identity() {
        let repo = MemoryIdentityRepo::default();
        let identity = repo
            .insert(NewIdentity {
                email: "live@example.com".into(),
                password_hash: "hash".into(),
                role: Role::User,
            })
            .await
            .expect("insert");

        let resolved = authenticate(&claims_for(&identity), &repo, Duration::from_millis(200))
            .await
            .expect("resolve");
        assert_eq!(resolved.id, identity.id);
    }

    #[tokio::test]
    async fn authenticate_rejects_a_removed_subject() {
        let repo = MemoryIdentityRepo::default();
        let ghost = Identity::fixture(Role::User);
        let err = authenticate(&claims_for(&ghost), &repo, Duration::from_millis(200))
            .await
            .expect_err("subject is gone");
        assert!(matches!(err, GateError::IdentityNotFound));
    }

    #[tokio::test]
    async fn authenticate_times_out_on_a_slow_store() {
        struct SlowRepo;

        #[async_trait]
        impl IdentityRepo for SlowRepo {
            async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Identity>> {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(None)
            }
            async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<Identity>> {
                Ok(None)
            }
            async fn insert(&self, _new: NewIdentity) -> anyhow::Result<Identity> {
                anyhow::bail!("read-only stub")
            }
        }

        let ghost = Identity::fixture(Role::User);
        let err = authenticate(&claims_for(&ghost), &SlowRepo, Duration::from_millis(20))
            .await
            .expect_err("lookup must time out");
        assert!(matches!(err, GateError::LookupTimeout));
    }
}
