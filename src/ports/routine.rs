use thiserror::Error;

/// Stage at which a routine gave up. The stage is only visible in the log;
/// every variant maps to the same non-zero exit status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterError {
    #[error("Credential stage failed")]
    Credential,
    #[error("Scrape stage failed")]
    Scrape,
    #[error("Spreadsheet read failed")]
    Read,
    #[error("Spreadsheet write failed")]
    Write,
}

pub trait Routine {
    fn name(&self) -> &str;

    fn run(&self) -> error_stack::Result<(), UpdaterError>;
}
