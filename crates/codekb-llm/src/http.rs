//! HTTP client for embedding requests.

use std::time::Duration;

use crate::error::Result;

/// Time allowed to open a connection to the embedding endpoint.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for one embedding request, response body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the client used for `/embeddings` calls.
///
/// The connect timeout never exceeds `request_timeout`. Redirects are not
/// followed, so a redirecting endpoint surfaces as a status error.
///
/// # Errors
///
/// Returns [`LlmError::Http`](crate::LlmError::Http) if the TLS backend cannot
/// be initialised.
pub fn embedding_client(request_timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .user_agent(concat!("codekb/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}
