use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),
    #[error("Failed to set up the page client")]
    ClientSetup,
    #[error("Failed to fetch source page")]
    Fetch,
    #[error("No signature count found on the page")]
    CountNotFound,
}

pub trait PageSource {
    fn fetch(&self, url: &str) -> error_stack::Result<String, ScrapeError>;
}
