/// HTTP client for the FAST2 API and its OAuth2 token endpoint.
///
/// Plain reqwest with pooling and timeouts. Transient transport failures
/// are not retried at this level: the dispatcher's single retry is reserved
/// for auth failures, and a timeout must surface to the caller unchanged.
use std::time::Duration;

#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(16)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}
