pub mod clock;
pub mod credential_store;
pub mod page_source;
pub mod routine;
pub mod spreadsheet_api;
