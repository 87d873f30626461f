use std::time::Duration;

use error_stack::{report, ResultExt};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    redirect::Policy,
};
use tracing::instrument;

use crate::{
    config::scraping_config::ScrapingConfig,
    ports::page_source::{PageSource, ScrapeError},
};

const MAX_REDIRECTS: usize = 10;

/// Plain HTTP page source. Petition pages embed their counters in the
/// server-rendered state, so no browser is needed.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &ScrapingConfig) -> error_stack::Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(&*config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .change_context(ScrapeError::ClientSetup)?;

        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    fn fetch(&self, url: &str) -> error_stack::Result<String, ScrapeError> {
        let parsed = reqwest::Url::parse(url)
            .change_context_lazy(|| ScrapeError::InvalidSourceUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(report!(ScrapeError::InvalidSourceUrl(url.to_string())))
                .attach_printable("Only http and https pages can be scraped");
        }

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .change_context(ScrapeError::Fetch)
            .attach_printable_lazy(|| format!("GET {}", url))?;

        if response.url() != &parsed {
            tracing::info!(final_url = %response.url(), "Followed redirect");
        }

        let response = response
            .error_for_status()
            .change_context(ScrapeError::Fetch)
            .attach_printable_lazy(|| format!("GET {}", url))?;

        let body = response.text().change_context(ScrapeError::Fetch)?;
        tracing::debug!(bytes = body.len(), "Page fetched");
        Ok(body)
    }
}
