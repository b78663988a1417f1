#![allow(dead_code)]
use async_trait::async_trait;
use elgoose_fetch::ElGooseClient;
use http_client::{Error, HttpClient, Request, Response};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned reply for one endpoint path.
#[derive(Debug, Clone)]
pub enum Reply {
    Body { status: u16, body: String },
    TransportError(String),
    Hang(Duration),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Body {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Body {
            status,
            body: body.into(),
        }
    }
}

/// In-process HTTP client that answers by URL path and records every URL it
/// was asked for. Unknown paths get a 404.
#[derive(Debug, Clone, Default)]
pub struct StubHttpClient {
    replies: Arc<HashMap<String, Reply>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StubHttpClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = (S, Reply)>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(replies.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let url = req.url().clone();
        self.requested.lock().unwrap().push(url.to_string());

        let reply = self.replies.get(url.path()).cloned();
        match reply {
            Some(Reply::Body { status, body }) => {
                let mut response = Response::new(status);
                response.set_body(body);
                Ok(response)
            }
            Some(Reply::TransportError(message)) => {
                Err(Error::from_str(http_types::StatusCode::BadGateway, message))
            }
            Some(Reply::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(Response::new(200))
            }
            None => {
                let mut response = Response::new(404);
                response.set_body("not found");
                Ok(response)
            }
        }
    }
}

pub const BASE_URL: &str = "http://elgoose.test/api/v1";

/// Client pointed at [`BASE_URL`] and backed by `stub`.
pub fn stub_client(stub: &StubHttpClient) -> ElGooseClient {
    ElGooseClient::with_base_url(Box::new(stub.clone()), BASE_URL.to_string())
}
