use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

const APP_USER_AGENT: &str = concat!("maven-resource/", env!("CARGO_PKG_VERSION"));

/// Build the shared client used for repository downloads.
///
/// Artifacts are stored byte-for-byte, so transfer encoding is pinned to
/// `identity`.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .timeout(timeout)
        .build()
}
