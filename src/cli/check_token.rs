use std::time::Duration;

use crate::{
    config::{
        app_config::AppConfig, credentials_config::CredentialsConfig,
        scraping_config::DEFAULT_TIMEOUT_SECS,
    },
    domain::token_status::TokenStatus,
};

/// Inputs of `--check-token`. Without a loaded config the defaults apply.
#[derive(Debug, Clone)]
pub struct TokenCheck {
    pub credentials: CredentialsConfig,
    pub timeout: Duration,
}

impl TokenCheck {
    pub fn from_config(config: Option<&AppConfig>) -> Self {
        match config {
            Some(config) => Self {
                credentials: config.credentials.clone(),
                timeout: Duration::from_secs(config.scraping.timeout_secs),
            },
            None => Self {
                credentials: CredentialsConfig::default(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
        }
    }
}

/// Only a present, unexpired token passes. An expired token fails even when
/// the next run could refresh it.
pub fn check_token_passes(status: &TokenStatus) -> bool {
    status.is_valid()
}
