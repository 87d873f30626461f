use thiserror::Error;

use crate::domain::credential::{Credential, TokenResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No credential found, run the interactive authorization to create one")]
    Missing,
    #[error("Credential file could not be read")]
    Unreadable,
    #[error("Credential file is not a valid token")]
    Malformed,
    #[error("Credential expired and has no usable refresh token, re-authorize interactively")]
    ExpiredWithoutRefreshToken,
    #[error("Token endpoint rejected the refresh: {0}")]
    RefreshRejected(String),
    #[error("Could not reach the token endpoint")]
    RefreshTransport,
    #[error("Could not persist the refreshed credential")]
    Persist,
}

/// Where the credential lives between runs.
pub trait CredentialStore {
    /// `Ok(None)` when no credential has been stored yet.
    fn load(&self) -> error_stack::Result<Option<Credential>, CredentialError>;

    fn save(&self, credential: &Credential) -> error_stack::Result<(), CredentialError>;

    /// Human readable location, for logs.
    fn location(&self) -> String;
}

/// Exchanges a refresh token for a new access token.
pub trait TokenRefresher {
    fn refresh(&self, credential: &Credential)
        -> error_stack::Result<TokenResponse, CredentialError>;
}
