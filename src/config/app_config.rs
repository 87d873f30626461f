use config::Config;
use error_stack::{report, ResultExt};
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use super::{
    credentials_config::CredentialsConfig, scraping_config::ScrapingConfig,
    sheets_config::SpreadsheetConfig,
};

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const ENV_PREFIX: &str = "PETITION_TALLY";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    pub scraping: ScrapingConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file '{0}'")]
    Read(String),
    #[error("Invalid config at field '{field}'")]
    Field { field: String },
    #[error("Invalid config value")]
    Value,
}

impl AppConfig {
    /// Reads `config_path` (any format the `config` crate knows, extension optional)
    /// and applies `PETITION_TALLY__SECTION__KEY` environment overrides on top.
    pub fn load(config_path: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name(config_path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .change_context_lazy(|| ConfigError::Read(config_path.to_string()))?;

        Self::from_config(config)
            .attach_printable_lazy(|| format!("Config file: {}", config_path))
    }

    pub fn from_config(config: Config) -> error_stack::Result<Self, ConfigError> {
        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(ConfigError::Value)?;

        use serde::de::IntoDeserializer;
        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        AppConfig::deserialize(path_de).map_err(|e| {
            let field = track
                .path()
                .iter()
                .map(|seg| match seg {
                    Segment::Seq { index } => format!("[{}]", index),
                    Segment::Map { key } => format!(".{}", key),
                    Segment::Enum { variant } => format!("::{}", variant),
                    Segment::Unknown => String::from("<?>"),
                })
                .collect::<String>()
                .trim_start_matches('.')
                .to_string();
            report!(ConfigError::Field { field }).attach_printable(e.to_string())
        })
    }
}
