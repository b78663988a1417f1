use crate::events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use crate::{
    Endpoint, EnvelopeShape, FetchConfig, FetchError, FetchOutcome, Record, Result, SetlistApi,
};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// HTTP client for the elgoose.net setlist API.
///
/// Issues one GET per call against `<base_url>/<endpoint>.json` and unwraps the
/// response, whichever of the two shapes the API used:
///
/// - a bare JSON array of records (what `v1` serves), or
/// - an envelope object `{"error": bool, "error_message": str, "data": [...]}`
///   (what `v2` normally serves).
///
/// The shape is detected per response rather than assumed from the version.
///
/// # Examples
///
/// ```rust,no_run
/// use elgoose_fetch::{ElGooseClient, FetchConfig, SetlistApi};
///
/// # tokio_test::block_on(async {
/// let http_client = http_client::native::NativeClient::new();
/// let client = ElGooseClient::new(Box::new(http_client), &FetchConfig::default());
///
/// let outcome = client.fetch_all("shows").await;
/// if outcome.success() {
///     println!("{} shows", outcome.records.len());
/// }
/// # });
/// ```
#[derive(Clone)]
pub struct ElGooseClient {
    client: Arc<dyn HttpClient + Send + Sync>,
    base_url: String,
    probe_timeout: Duration,
    bulk_timeout: Duration,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl ElGooseClient {
    /// Create a client using the base URL and timeouts from `config`.
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, config: &FetchConfig) -> Self {
        Self::with_base_url(client, config.base_url())
            .with_timeouts(config.probe_timeout, config.bulk_timeout)
    }

    /// Create a client against a custom base URL with default timeouts.
    ///
    /// This is useful for testing against a local server.
    pub fn with_base_url(client: Box<dyn HttpClient + Send + Sync>, base_url: String) -> Self {
        Self {
            client: Arc::from(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            probe_timeout: Duration::from_secs(30),
            bulk_timeout: Duration::from_secs(120),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    pub fn with_timeouts(mut self, probe_timeout: Duration, bulk_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self.bulk_timeout = bulk_timeout;
        self
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    /// Build the request URL for `endpoint`, with `query_params` appended.
    pub fn request_url(&self, endpoint: &str, query_params: &[(String, String)]) -> Result<Url> {
        let endpoint = Endpoint::new(endpoint)?;
        let mut url = endpoint.url(&self.base_url).parse::<Url>().map_err(|e| {
            FetchError::Config(format!("invalid base URL '{}': {e}", self.base_url))
        })?;

        if !query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn fetch_with_timeout(
        &self,
        endpoint: &str,
        query_params: &[(String, String)],
        timeout: Duration,
    ) -> FetchOutcome {
        let url = match self.request_url(endpoint, query_params) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Cannot build request for '{endpoint}': {e}");
                return FetchOutcome::failed(endpoint, "", None, e);
            }
        };
        let url_string = url.to_string();

        let request_info = RequestInfo::from_url_and_method(&url_string, "GET");
        let request_start = Instant::now();

        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
            timeout_secs: timeout.as_secs(),
        });
        log::debug!("GET {url_string} (timeout {}s)", timeout.as_secs());

        let mut request = Request::new(Method::Get, url);
        let _ = request.insert_header("Accept", "application/json");

        let exchange = async {
            let mut response = self
                .client
                .send(request)
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;
            let status: u16 = response.status().into();
            let body = response
                .body_string()
                .await
                .map_err(|e| FetchError::Http(e.to_string()))?;
            Ok::<_, FetchError>((status, body))
        };

        let (status, body) = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(exchange)) => exchange,
            Ok(Err(e)) => {
                return self.request_failed(endpoint, request_info, request_start, e);
            }
            Err(_) => {
                let e = FetchError::Timeout {
                    url: url_string.clone(),
                    seconds: timeout.as_secs(),
                };
                return self.request_failed(endpoint, request_info, request_start, e);
            }
        };

        self.broadcaster.broadcast_event(ClientEvent::RequestCompleted {
            request: request_info,
            status_code: status,
            duration_ms: request_start.elapsed().as_millis() as u64,
        });

        if !(200..300).contains(&status) {
            log::warn!("GET {url_string} returned HTTP {status}");
            return FetchOutcome::failed(
                endpoint,
                &url_string,
                None,
                FetchError::Status {
                    status,
                    url: url_string.clone(),
                },
            );
        }

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("GET {url_string} returned malformed JSON: {e}");
                return FetchOutcome::failed(
                    endpoint,
                    &url_string,
                    None,
                    FetchError::Parse(format!("malformed JSON body: {e}")),
                );
            }
        };

        let shape = envelope_shape(&value);
        match unwrap_envelope(value) {
            Ok((shape, records)) => {
                log::debug!("GET {url_string}: {} records ({shape})", records.len());
                FetchOutcome::succeeded(endpoint, &url_string, shape, records)
            }
            Err(e) => {
                log::warn!("GET {url_string}: {e}");
                FetchOutcome::failed(endpoint, &url_string, shape, e)
            }
        }
    }

    fn request_failed(
        &self,
        endpoint: &str,
        request_info: RequestInfo,
        request_start: Instant,
        error: FetchError,
    ) -> FetchOutcome {
        log::warn!("{} failed: {error}", request_info.short_description());
        let url = request_info.uri.clone();
        self.broadcaster.broadcast_event(ClientEvent::RequestFailed {
            request: request_info,
            error: error.to_string(),
            duration_ms: request_start.elapsed().as_millis() as u64,
        });
        FetchOutcome::failed(endpoint, &url, None, error)
    }
}

#[async_trait(?Send)]
impl SetlistApi for ElGooseClient {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch(&self, endpoint: &str, query_params: &[(String, String)]) -> FetchOutcome {
        self.fetch_with_timeout(endpoint, query_params, self.probe_timeout)
            .await
    }

    async fn fetch_all(&self, endpoint: &str) -> FetchOutcome {
        self.fetch_with_timeout(endpoint, &[], self.bulk_timeout)
            .await
    }
}

/// Shape of a decoded response body, or `None` for anything that is neither an
/// array nor an object.
pub fn envelope_shape(value: &Value) -> Option<EnvelopeShape> {
    match value {
        Value::Array(_) => Some(EnvelopeShape::Bare),
        Value::Object(map) => Some(EnvelopeShape::Wrapped {
            keys: map.keys().cloned().collect(),
        }),
        _ => None,
    }
}

/// Unwrap a decoded response body into its records.
///
/// - A bare array is taken as the record list.
/// - An object with a truthy `error` becomes [`FetchError::Api`] carrying
///   `error_message` (or "Unknown error").
/// - Otherwise the object's `data` array is the record list.
///
/// Anything else, including array elements that are not objects, is a
/// [`FetchError::Parse`].
pub fn unwrap_envelope(value: Value) -> Result<(EnvelopeShape, Vec<Record>)> {
    match value {
        Value::Array(items) => Ok((EnvelopeShape::Bare, into_records(items)?)),
        Value::Object(mut map) => {
            let keys: Vec<String> = map.keys().cloned().collect();

            if map.get("error").is_some_and(is_truthy) {
                let message = match map.get("error_message") {
                    Some(Value::String(msg)) if !msg.trim().is_empty() => msg.clone(),
                    _ => "Unknown error".to_string(),
                };
                return Err(FetchError::Api(message));
            }

            match map.remove("data") {
                Some(Value::Array(items)) => {
                    Ok((EnvelopeShape::Wrapped { keys }, into_records(items)?))
                }
                Some(other) => Err(FetchError::Parse(format!(
                    "envelope 'data' is {}, expected a list",
                    json_type_name(&other)
                ))),
                None => Err(FetchError::Parse(format!(
                    "envelope has no 'data' key (keys: {keys:?})"
                ))),
            }
        }
        other => Err(FetchError::Parse(format!(
            "response body is {}, expected a list or an envelope object",
            json_type_name(&other)
        ))),
    }
}

fn into_records(items: Vec<Value>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(FetchError::Parse(format!(
                "record {index} is {}, expected an object",
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Name of a JSON value's kind, for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_bare_list() {
        let (shape, records) =
            unwrap_envelope(json!([{"show_id": 1, "artist": "Goose"}, {"show_id": 2}])).unwrap();
        assert_eq!(shape, EnvelopeShape::Bare);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["artist"], "Goose");
    }

    #[test]
    fn test_unwrap_envelope_data() {
        let (shape, records) = unwrap_envelope(json!({
            "error": false,
            "error_message": "",
            "data": [{"song_id": 7}]
        }))
        .unwrap();
        assert_eq!(
            shape,
            EnvelopeShape::Wrapped {
                keys: vec![
                    "error".to_string(),
                    "error_message".to_string(),
                    "data".to_string()
                ]
            }
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_unwrap_envelope_error_flag() {
        let err = unwrap_envelope(json!({
            "error": true,
            "error_message": "Invalid method",
            "data": []
        }))
        .unwrap_err();
        assert!(matches!(err, FetchError::Api(ref msg) if msg == "Invalid method"));

        let err = unwrap_envelope(json!({"error": 1})).unwrap_err();
        assert!(matches!(err, FetchError::Api(ref msg) if msg == "Unknown error"));
    }

    #[test]
    fn test_unwrap_envelope_missing_or_bad_data() {
        assert!(matches!(
            unwrap_envelope(json!({"error": false})),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            unwrap_envelope(json!({"error": false, "data": {"a": 1}})),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(unwrap_envelope(json!("nope")), Err(FetchError::Parse(_))));
        assert!(matches!(unwrap_envelope(json!([1, 2])), Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_envelope_shape_detection() {
        assert_eq!(envelope_shape(&json!([])), Some(EnvelopeShape::Bare));
        assert!(matches!(
            envelope_shape(&json!({"data": []})),
            Some(EnvelopeShape::Wrapped { .. })
        ));
        assert_eq!(envelope_shape(&json!(42)), None);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!({"a": 1})), "dict");
    }
}
