use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::{
    domain::{
        credential::{Credential, CredentialState},
        token_status::TokenStatus,
    },
    ports::{
        clock::Clock,
        credential_store::{CredentialError, CredentialStore, TokenRefresher},
    },
};

/// Owns the credential lifecycle: load, decide, refresh, persist.
pub struct CredentialManager {
    store: Box<dyn CredentialStore>,
    refresher: Box<dyn TokenRefresher>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialManager {{ store: {} }}", self.store.location())
    }
}

impl CredentialManager {
    pub fn new(
        store: Box<dyn CredentialStore>,
        refresher: Box<dyn TokenRefresher>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            refresher,
            clock,
        }
    }

    /// Read-only diagnostic. Problems are reported as a status, never as an error.
    #[instrument]
    pub fn check_token(&self) -> TokenStatus {
        match self.store.load() {
            Ok(None) => TokenStatus::Missing,
            Ok(Some(credential)) => TokenStatus::from_credential(&credential, self.clock.now()),
            Err(report) => {
                tracing::debug!("Credential not loadable: {:?}", report);
                TokenStatus::Malformed {
                    reason: report.current_context().to_string(),
                }
            }
        }
    }

    /// Returns a credential that is valid right now, refreshing and persisting it if needed.
    #[instrument]
    pub fn ensure_credential(&self) -> error_stack::Result<Credential, CredentialError> {
        let credential = self
            .store
            .load()?
            .ok_or_else(|| report!(CredentialError::Missing))
            .attach_printable_lazy(|| format!("Expected a token at {}", self.store.location()))?;

        let now = self.clock.now();
        let state = credential.assess(now);
        tracing::debug!(%state, "Credential assessed");

        match state {
            CredentialState::Valid => Ok(credential),
            CredentialState::Unrecoverable => Err(report!(CredentialError::ExpiredWithoutRefreshToken))
                .attach_printable_lazy(|| {
                    format!("Regenerate the token at {}", self.store.location())
                }),
            CredentialState::NeedsRefresh => {
                tracing::info!("🔄 Refreshing expired token...");
                let response = self.refresher.refresh(&credential)?;
                let refreshed = credential.apply_refresh(response, self.clock.now());

                self.store.save(&refreshed)?;
                tracing::info!("✅ Token refreshed, valid until {:?}", refreshed.expiry);
                Ok(refreshed)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::fakes::{FakeRefresher, MemoryStore};
    use super::*;
    use crate::domain::credential::fixtures::{credential, now};
    use crate::ports::clock::FixedClock;

    fn manager(store: &MemoryStore, refresher: &FakeRefresher) -> CredentialManager {
        CredentialManager::new(
            Box::new(store.clone()),
            Box::new(refresher.clone()),
            Box::new(FixedClock(now())),
        )
    }

    #[test]
    fn test_check_token_missing_is_a_status() {
        let store = MemoryStore::with(None);
        let status = manager(&store, &FakeRefresher::rejecting()).check_token();
        assert_eq!(status, TokenStatus::Missing);
    }

    #[test]
    fn test_check_token_valid() {
        let store = MemoryStore::with(Some(credential(Some(now() + Duration::hours(1)))));
        let status = manager(&store, &FakeRefresher::rejecting()).check_token();
        assert!(status.is_valid());
    }

    #[test]
    fn test_check_token_malformed_is_a_status() {
        let store = MemoryStore::broken(CredentialError::Malformed);
        let status = manager(&store, &FakeRefresher::rejecting()).check_token();
        assert!(matches!(status, TokenStatus::Malformed { .. }));
    }

    #[test]
    fn test_check_token_does_not_refresh() {
        let store = MemoryStore::with(Some(credential(Some(now() - Duration::hours(1)))));
        let refresher = FakeRefresher::granting("ya29.fresh", 3600);

        let status = manager(&store, &refresher).check_token();

        assert_eq!(status, TokenStatus::Expired { refreshable: true });
        assert_eq!(*refresher.calls.borrow(), 0);
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn test_valid_credential_is_used_as_is() {
        let cred = credential(Some(now() + Duration::hours(1)));
        let store = MemoryStore::with(Some(cred.clone()));
        let refresher = FakeRefresher::granting("ya29.fresh", 3600);

        let ensured = manager(&store, &refresher).ensure_credential().unwrap();

        assert_eq!(ensured, cred);
        assert_eq!(*refresher.calls.borrow(), 0);
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn test_expired_credential_is_refreshed_and_persisted() {
        let old = credential(Some(now() - Duration::minutes(5)));
        let store = MemoryStore::with(Some(old.clone()));
        let refresher = FakeRefresher::granting("ya29.fresh", 3600);
        let manager = manager(&store, &refresher);

        let refreshed = manager.ensure_credential().unwrap();

        assert_eq!(refreshed.access_token, "ya29.fresh");
        assert!(refreshed.expiry > old.expiry);
        assert_eq!(store.stored(), Some(refreshed));
        assert_eq!(*store.saves.borrow(), 1);
        assert!(manager.check_token().is_valid());
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let store = MemoryStore::with(None);
        let report = manager(&store, &FakeRefresher::rejecting())
            .ensure_credential()
            .unwrap_err();
        assert_eq!(report.current_context(), &CredentialError::Missing);
    }

    #[test]
    fn test_revoked_refresh_token_is_fatal_and_keeps_file() {
        let old = credential(Some(now() - Duration::minutes(5)));
        let store = MemoryStore::with(Some(old.clone()));
        let refresher = FakeRefresher::rejecting();

        let report = manager(&store, &refresher).ensure_credential().unwrap_err();

        assert!(matches!(
            report.current_context(),
            CredentialError::RefreshRejected(_)
        ));
        assert_eq!(*refresher.calls.borrow(), 1);
        assert_eq!(store.stored(), Some(old));
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn test_expired_without_refresh_token_never_calls_refresher() {
        let mut old = credential(Some(now() - Duration::minutes(5)));
        old.refresh_token = None;
        let store = MemoryStore::with(Some(old));
        let refresher = FakeRefresher::granting("ya29.fresh", 3600);

        let report = manager(&store, &refresher).ensure_credential().unwrap_err();

        assert_eq!(
            report.current_context(),
            &CredentialError::ExpiredWithoutRefreshToken
        );
        assert_eq!(*refresher.calls.borrow(), 0);
    }
}
