use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

/// Local mock HTTP server for the blocking adapters. It is served from a
/// worker thread, so a blocking client on the test thread can reach it.
pub struct TestServer {
    server: MockServer,
    runtime: Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}
