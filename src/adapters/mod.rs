pub mod credentials;
pub mod http;
pub mod sheets;

#[cfg(test)]
pub(crate) mod test_server;
