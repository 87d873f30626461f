pub mod app_config;
pub mod credentials_config;
pub mod scraping_config;
pub mod sheets_config;
