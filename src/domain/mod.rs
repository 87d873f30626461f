pub mod credential;
pub mod sheets;
pub mod signature;
pub mod token_status;
