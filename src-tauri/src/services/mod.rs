pub mod parser;
pub mod push;

use reqwest::Client;
use std::sync::OnceLock;
use tokio::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reusable HTTP client singleton (created once, reused for all requests)
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

pub(crate) fn get_http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to create HTTP client")
    })
}
