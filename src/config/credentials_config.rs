use std::path::PathBuf;

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct CredentialsConfig {
    /// Authorized-user token file, refreshed in place.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}
