pub mod file_store;
pub mod oauth_refresher;
