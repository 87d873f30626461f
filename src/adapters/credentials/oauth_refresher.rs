use std::time::Duration;

use error_stack::{report, ResultExt};
use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::credential::{Credential, TokenResponse},
    ports::credential_store::{CredentialError, TokenRefresher},
};

/// Error body of an OAuth 2.0 token endpoint (RFC 6749 section 5.2).
#[derive(Deserialize, Debug, Default)]
struct OAuthErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn describe_oauth_error(status: StatusCode, body: &str) -> String {
    let parsed: OAuthErrorBody = serde_json::from_str(body).unwrap_or_default();
    match (parsed.error, parsed.error_description) {
        (Some(error), Some(description)) => format!("{} ({})", error, description),
        (Some(error), None) => error,
        _ => format!("HTTP {}", status.as_u16()),
    }
}

/// A 4xx from the token endpoint means the grant itself is bad (revoked,
/// expired, wrong client); retrying on the next tick will not help.
fn classify_refresh_failure(status: StatusCode, body: &str) -> CredentialError {
    if status.is_client_error() {
        CredentialError::RefreshRejected(describe_oauth_error(status, body))
    } else {
        CredentialError::RefreshTransport
    }
}

/// `refresh_token` grant against the credential's own `token_uri`.
#[derive(Debug, Clone)]
pub struct OAuthTokenRefresher {
    client: Client,
}

impl OAuthTokenRefresher {
    pub fn new(timeout: Duration) -> error_stack::Result<Self, CredentialError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .change_context(CredentialError::RefreshTransport)?;
        Ok(Self { client })
    }
}

impl TokenRefresher for OAuthTokenRefresher {
    #[instrument(skip(self, credential), fields(token_uri = %credential.token_uri))]
    fn refresh(
        &self,
        credential: &Credential,
    ) -> error_stack::Result<TokenResponse, CredentialError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            credential.refresh_token.as_deref(),
            credential.client_id.as_deref(),
            credential.client_secret.as_deref(),
        ) else {
            return Err(report!(CredentialError::ExpiredWithoutRefreshToken));
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .client
            .post(&credential.token_uri)
            .form(&params)
            .send()
            .change_context(CredentialError::RefreshTransport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(report!(classify_refresh_failure(status, &body)))
                .attach_printable_lazy(|| format!("Token endpoint answered {}", status));
        }

        response
            .json::<TokenResponse>()
            .change_context(CredentialError::RefreshTransport)
            .attach_printable("Token endpoint returned an unexpected body")
    }
}
