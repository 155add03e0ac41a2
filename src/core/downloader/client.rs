use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::core::config::{Credentials, ResolutionConfig};
use crate::core::error::{ResolverError, ResolverResult};
use crate::core::http::build_http_client;

/// Fetches a single URL. One call is one GET; retries, if any, are the
/// implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Return the full body of a 2xx response. Any other outcome is an error.
    async fn fetch(&self, url: &str, credentials: Option<&Credentials>) -> ResolverResult<Vec<u8>>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ResolutionConfig) -> ResolverResult<Self> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, credentials: Option<&Credentials>) -> ResolverResult<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.username, creds.password.as_deref());
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ResolverError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
