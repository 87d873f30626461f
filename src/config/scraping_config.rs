pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

fn default_user_agent() -> Box<str> {
    DEFAULT_USER_AGENT.into()
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ScrapingConfig {
    /// Petition page to scrape. `--csv-url` overrides it for one run.
    pub source_url: Box<str>,
    #[serde(default = "default_user_agent")]
    pub user_agent: Box<str>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
