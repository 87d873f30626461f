pub mod args;
pub mod check_token;
