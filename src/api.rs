use crate::FetchOutcome;
use async_trait::async_trait;

/// Trait for setlist API operations that can be mocked for testing.
///
/// Neither method returns a `Result`: transport errors, bad status codes,
/// `"error": true` envelopes and malformed bodies are all reported inside the
/// returned [`FetchOutcome`], so a caller iterating over several endpoints
/// never has one failure abort the rest.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockSetlistApi`
/// that implements this trait using the `mockall` library.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait SetlistApi {
    /// The versioned base URL requests are issued against.
    fn base_url(&self) -> String;

    /// Fetch `<base_url>/<endpoint>.json` with optional query parameters,
    /// using the short probe timeout.
    async fn fetch(&self, endpoint: &str, query_params: &[(String, String)]) -> FetchOutcome;

    /// Fetch every record an endpoint serves, using the long bulk timeout.
    async fn fetch_all(&self, endpoint: &str) -> FetchOutcome;
}
