use chrono::{DateTime, Utc};

use super::credential::{Credential, CredentialState};

/// Result of inspecting the credential file without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Missing,
    Malformed { reason: String },
    Expired { refreshable: bool },
    Valid { expires_at: Option<DateTime<Utc>> },
}

impl TokenStatus {
    pub fn from_credential(credential: &Credential, now: DateTime<Utc>) -> Self {
        match credential.assess(now) {
            CredentialState::Valid => TokenStatus::Valid {
                expires_at: credential.expiry,
            },
            CredentialState::NeedsRefresh => TokenStatus::Expired { refreshable: true },
            CredentialState::Unrecoverable => TokenStatus::Expired { refreshable: false },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid { .. })
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStatus::Missing => write!(f, "missing"),
            TokenStatus::Malformed { reason } => write!(f, "malformed ({})", reason),
            TokenStatus::Expired { refreshable: true } => {
                write!(f, "expired, will be refreshed on next run")
            }
            TokenStatus::Expired { refreshable: false } => {
                write!(f, "expired, no usable refresh token")
            }
            TokenStatus::Valid {
                expires_at: Some(expires_at),
            } => write!(f, "valid until {}", expires_at.to_rfc3339()),
            TokenStatus::Valid { expires_at: None } => write!(f, "valid, no expiry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::fixtures::{credential, now};
    use chrono::Duration;

    #[test]
    fn test_status_from_credential() {
        let valid = credential(Some(now() + Duration::hours(1)));
        assert!(TokenStatus::from_credential(&valid, now()).is_valid());

        let expired = credential(Some(now() - Duration::hours(1)));
        let status = TokenStatus::from_credential(&expired, now());
        assert_eq!(status, TokenStatus::Expired { refreshable: true });
        assert!(!status.is_valid());
    }

    #[test]
    fn test_only_valid_is_valid() {
        assert!(!TokenStatus::Missing.is_valid());
        assert!(!TokenStatus::Malformed {
            reason: "eof".to_string()
        }
        .is_valid());
        assert!(!TokenStatus::Expired { refreshable: false }.is_valid());
        assert!(TokenStatus::Valid { expires_at: None }.is_valid());
    }
}
