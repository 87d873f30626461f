use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Tokens are treated as expired this long before their real expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Used when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// OAuth user credential, stored in the `authorized_user` JSON layout
/// that Google's client libraries write (`token`, `refresh_token`, `expiry`, ...).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credential {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialState {
    Valid,
    NeedsRefresh,
    /// Expired and not refreshable; a human has to re-authenticate.
    Unrecoverable,
}

/// Successful response of the OAuth token endpoint for a `refresh_token` grant.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        non_empty(&self.refresh_token) && non_empty(&self.client_id) && non_empty(&self.client_secret)
    }

    pub fn assess(&self, now: DateTime<Utc>) -> CredentialState {
        if self.access_token.is_empty() || self.is_expired(now) {
            if self.can_refresh() {
                CredentialState::NeedsRefresh
            } else {
                CredentialState::Unrecoverable
            }
        } else {
            CredentialState::Valid
        }
    }

    /// Builds the credential that replaces `self` after a successful refresh.
    /// A rotated refresh token replaces the stored one; otherwise it is kept.
    pub fn apply_refresh(&self, response: TokenResponse, now: DateTime<Utc>) -> Credential {
        let lifetime = response
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        let scopes = match response.scope.as_deref() {
            Some(scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_owned).collect()
            }
            _ => self.scopes.clone(),
        };

        Credential {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|token| !token.is_empty())
                .or_else(|| self.refresh_token.clone()),
            token_uri: self.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes,
            expiry: Some(now + Duration::seconds(lifetime)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{credential, now};
    use super::*;

    #[test]
    fn test_unexpired_credential_is_valid() {
        let cred = credential(Some(now() + Duration::minutes(30)));
        assert!(!cred.is_expired(now()));
        assert_eq!(cred.assess(now()), CredentialState::Valid);
    }

    #[test]
    fn test_expiry_skew_boundary() {
        let just_inside = credential(Some(now() + Duration::seconds(EXPIRY_SKEW_SECS)));
        assert!(just_inside.is_expired(now()));

        let just_outside = credential(Some(now() + Duration::seconds(EXPIRY_SKEW_SECS + 1)));
        assert!(!just_outside.is_expired(now()));
    }

    #[test]
    fn test_credential_without_expiry_never_expires() {
        assert_eq!(credential(None).assess(now()), CredentialState::Valid);
    }

    #[test]
    fn test_expired_with_refresh_token_needs_refresh() {
        let cred = credential(Some(now() - Duration::hours(1)));
        assert_eq!(cred.assess(now()), CredentialState::NeedsRefresh);
    }

    #[test]
    fn test_expired_without_refresh_token_is_unrecoverable() {
        let mut cred = credential(Some(now() - Duration::hours(1)));
        cred.refresh_token = None;
        assert_eq!(cred.assess(now()), CredentialState::Unrecoverable);

        let mut cred = credential(Some(now() - Duration::hours(1)));
        cred.client_secret = Some(String::new());
        assert_eq!(cred.assess(now()), CredentialState::Unrecoverable);
    }

    #[test]
    fn test_apply_refresh_extends_expiry_and_keeps_refresh_token() {
        let old = credential(Some(now() - Duration::hours(1)));
        let response = TokenResponse {
            access_token: "ya29.fresh".to_string(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
            token_type: Some("Bearer".to_string()),
        };

        let refreshed = old.apply_refresh(response, now());

        assert_eq!(refreshed.access_token, "ya29.fresh");
        assert_eq!(refreshed.refresh_token, old.refresh_token);
        assert_eq!(refreshed.expiry, Some(now() + Duration::seconds(3599)));
        assert!(refreshed.expiry > old.expiry);
        assert_eq!(refreshed.assess(now()), CredentialState::Valid);
    }

    #[test]
    fn test_apply_refresh_takes_rotated_refresh_token_and_scopes() {
        let old = credential(Some(now()));
        let response = TokenResponse {
            access_token: "ya29.fresh".to_string(),
            expires_in: None,
            refresh_token: Some("1//rotated".to_string()),
            scope: Some("a b".to_string()),
            token_type: None,
        };

        let refreshed = old.apply_refresh(response, now());

        assert_eq!(refreshed.refresh_token.as_deref(), Some("1//rotated"));
        assert_eq!(refreshed.scopes, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            refreshed.expiry,
            Some(now() + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS))
        );
    }

    #[test]
    fn test_reads_authorized_user_layout() {
        let json = r#"{
            "token": "ya29.a0",
            "refresh_token": "1//0g",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
            "expiry": "2024-05-01T12:30:00.123456Z"
        }"#;

        let cred: Credential = serde_json::from_str(json).unwrap();

        assert_eq!(cred.access_token, "ya29.a0");
        assert!(cred.can_refresh());
        assert_eq!(cred.assess(now()), CredentialState::Valid);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", credential(None));
        assert!(!debug.contains("ya29.access"));
        assert!(!debug.contains("1//refresh"));
        assert!(!debug.contains("\"secret\""));
    }
}
