pub mod sheets_client;
pub mod value_range_factory;
