use std::fmt::Display;

use clap::{Parser, ValueEnum};

use crate::config::app_config::DEFAULT_CONFIG_PATH;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Scrape a Change.org signature count into a Google Sheet.
#[derive(Debug, Parser)]
#[command(name = "petition-tally", version)]
pub struct Args {
    /// Report whether the stored token is usable, then exit.
    #[arg(long, conflicts_with_all = ["sync_sheet", "csv_url"])]
    pub check_token: bool,

    /// Petition page to scrape instead of the configured one.
    #[arg(long, value_name = "URL")]
    pub csv_url: Option<String>,

    /// Update the tally column of every petition in the sheet table.
    #[arg(long, conflicts_with = "csv_url")]
    pub sync_sheet: bool,

    /// Seconds to wait between two petition fetches.
    #[arg(long, value_name = "SECS", requires = "sync_sheet")]
    pub delay: Option<f64>,

    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}
