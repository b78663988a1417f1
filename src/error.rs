use thiserror::Error;

/// Error types for elgoose.net fetch operations.
///
/// Every stage of the pipeline reports failures through this enum. The
/// fetcher never lets these escape as fatal errors: they are carried inside a
/// [`FetchOutcome`](crate::FetchOutcome) so the remaining endpoints can still
/// be processed.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use elgoose_fetch::{ElGooseClient, FetchConfig, FetchError, SetlistApi};
///
/// #[tokio::main]
/// async fn main() {
///     let client = ElGooseClient::new(
///         Box::new(http_client::native::NativeClient::new()),
///         &FetchConfig::default(),
///     );
///
///     let outcome = client.fetch("shows", &[]).await;
///     match outcome.error {
///         None => println!("{} records", outcome.records.len()),
///         Some(FetchError::Api(msg)) => eprintln!("API rejected the request: {}", msg),
///         Some(FetchError::Status { status, .. }) => eprintln!("HTTP {}", status),
///         Some(e) => eprintln!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, DNS errors, and failures while
    /// reading the response body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-2xx status code.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// The HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out after {seconds} seconds")]
    Timeout {
        /// The URL that was requested
        url: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// The API answered with `"error": true` in its envelope.
    #[error("API error: {0}")]
    Api(String),

    /// The body was not JSON, or not a shape we know how to unwrap.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid configuration or command-line input.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors while writing output files.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization errors while writing output files.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
