use std::{process::ExitCode, sync::Mutex, time::Duration};

use clap::Parser;
use error_stack::ResultExt;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use petition_tally::{
    adapters::{
        credentials::{file_store::FileCredentialStore, oauth_refresher::OAuthTokenRefresher},
        http::page_fetcher::HttpPageSource,
        sheets::sheets_client::SheetsRestClient,
    },
    application::{
        credential_manager::CredentialManager,
        sheet_sync::{SheetSync, TableLayout},
        update_tally::UpdateTallyRoutine,
        updater::{UpdateTarget, Updater},
    },
    cli::{
        args::Args,
        check_token::{check_token_passes, TokenCheck},
    },
    config::{app_config::AppConfig, credentials_config::CredentialsConfig},
    ports::{clock::SystemClock, routine::Routine},
    prettyprint::prettyprint::PrettyFormatter,
};

const LOG_FILE: &str = "petition_tally.log";

#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration is unusable")]
    Config,
    #[error("Could not set up the {0}")]
    Setup(&'static str),
}

fn init_tracing(level: tracing::Level) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = match std::fs::File::create(LOG_FILE) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        ),
        Err(error) => {
            eprintln!("Could not create {}: {}", LOG_FILE, error);
            None
        }
    };

    Registry::default()
        .with(tracing_subscriber::filter::Targets::new().with_target("petition_tally", level))
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

fn credential_manager(
    config: &CredentialsConfig,
    timeout: Duration,
) -> error_stack::Result<CredentialManager, AppError> {
    let refresher =
        OAuthTokenRefresher::new(timeout).change_context(AppError::Setup("token refresher"))?;
    Ok(CredentialManager::new(
        Box::new(FileCredentialStore::new(&config.token_path)),
        Box::new(refresher),
        Box::new(SystemClock),
    ))
}

fn build_updater(config: &AppConfig) -> error_stack::Result<Updater, AppError> {
    let timeout = Duration::from_secs(config.scraping.timeout_secs);
    let credentials = credential_manager(&config.credentials, timeout)?;
    let pages =
        HttpPageSource::new(&config.scraping).change_context(AppError::Setup("page fetcher"))?;
    let sheets = SheetsRestClient::new(&config.sheets, timeout)
        .change_context(AppError::Setup("Sheets client"))?;

    Ok(Updater::new(credentials, Box::new(pages), Box::new(sheets)))
}

fn build_routine(
    args: &Args,
    config: &AppConfig,
) -> error_stack::Result<Box<dyn Routine>, AppError> {
    let updater = build_updater(config)?;
    let spreadsheet_id = config
        .sheets
        .spreadsheet_id()
        .change_context(AppError::Config)
        .attach_printable("sheets.spreadsheet")?;

    if args.sync_sheet {
        let layout = TableLayout::from_config(&config.sheets.sync)
            .change_context(AppError::Config)
            .attach_printable("sheets.sync.table_range")?;
        let delay_secs = args.delay.unwrap_or(config.sheets.sync.delay_secs);
        let delay = Duration::try_from_secs_f64(delay_secs)
            .change_context(AppError::Config)
            .attach_printable_lazy(|| format!("Invalid delay: {}", delay_secs))?;

        return Ok(Box::new(SheetSync::new(updater, spreadsheet_id, layout, delay)));
    }

    let range = config
        .sheets
        .range()
        .change_context(AppError::Config)
        .attach_printable("sheets.range")?;
    let source_url = match &args.csv_url {
        Some(url) => {
            tracing::info!("Using source URL from the command line: {}", url);
            url.clone()
        }
        None => config.scraping.source_url.to_string(),
    };

    Ok(Box::new(UpdateTallyRoutine::new(
        updater,
        UpdateTarget {
            source_url,
            spreadsheet_id,
            range,
        },
    )))
}

/// Works without a config file: the token path then falls back to its default.
fn check_token(config: Option<&AppConfig>) -> ExitCode {
    let check = TokenCheck::from_config(config);
    let manager = match credential_manager(&check.credentials, check.timeout) {
        Ok(manager) => manager,
        Err(report) => {
            tracing::error!("❌ {:?}", report);
            return ExitCode::FAILURE;
        }
    };

    let status = manager.check_token();
    println!("Token at {}: {}", check.credentials.token_path.display(), status);

    if check_token_passes(&status) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.into());

    let config = AppConfig::load(&args.config);

    if args.check_token {
        if let Err(report) = &config {
            tracing::warn!("Config not loaded, using default token path: {:?}", report);
        }
        return check_token(config.as_ref().ok());
    }

    let config = match config {
        Ok(config) => config,
        Err(report) => {
            tracing::error!("❌ {:?}", report);
            return ExitCode::FAILURE;
        }
    };

    let routine = match build_routine(&args, &config) {
        Ok(routine) => routine,
        Err(report) => {
            tracing::error!("❌ {:?}", report);
            return ExitCode::FAILURE;
        }
    };

    let span = tracing::info_span!("routine", routine = routine.name());
    let _enter = span.enter();
    match routine.run() {
        Ok(()) => {
            tracing::info!("✅ {}: OK", routine.name());
            ExitCode::SUCCESS
        }
        Err(report) => {
            tracing::error!("❌ {}: {:?}", routine.name(), report);
            ExitCode::FAILURE
        }
    }
}
