//! Shared test fixtures for resource tests.

use crate::HttpError;
use crate::auth::TOKEN_GRANT_PATH;
use crate::client::MerchantClient;
use crate::config::ClientConfig;
use crate::environment::Environment;
use crate::retry::RetryOptions;
use crate::time::InstantSleeper;
use crate::transport::{HttpClient, HttpRequest, HttpResponse, Transport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "tok_test";

/// Mock API that answers token grants itself and replays queued
/// responses for every other request.
pub struct MockApi {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    grants: AtomicUsize,
    grant_status: http::StatusCode,
}

impl MockApi {
    pub fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            grants: AtomicUsize::new(0),
            grant_status: http::StatusCode::OK,
        })
    }

    pub fn replying(status: http::StatusCode, body: &serde_json::Value) -> Arc<Self> {
        Self::new(vec![HttpResponse::json(status, body)])
    }

    pub fn rejecting_credentials() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            grants: AtomicUsize::new(0),
            grant_status: http::StatusCode::UNAUTHORIZED,
        })
    }

    /// Requests other than token grants.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn grants(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }
}

impl HttpClient for MockApi {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        if req.url.path() == TOKEN_GRANT_PATH {
            self.grants.fetch_add(1, Ordering::SeqCst);
            return Ok(HttpResponse::json(
                self.grant_status,
                &serde_json::json!({
                    "access_token": TOKEN,
                    "token_type": "Bearer",
                    "expires_in": 3_600_000,
                }),
            ));
        }

        self.requests.lock().unwrap().push(req);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::json(http::StatusCode::OK, &serde_json::json!({}))))
    }
}

pub type TestClient = MerchantClient<Arc<MockApi>, InstantSleeper>;

pub fn client(environment: Environment, api: &Arc<MockApi>) -> TestClient {
    let config = ClientConfig::new(environment, "client_1", "secret_1")
        .unwrap()
        .with_base_url("https://api.test")
        .unwrap();
    let retry = RetryOptions::new().with_max_number_of_retries(0);
    let transport = Transport::new(Arc::clone(api), retry).with_sleeper(InstantSleeper);

    MerchantClient::from_transport(config, transport)
}

/// Returns the bearer token sent with `req`.
pub fn bearer(req: &HttpRequest) -> &str {
    req.headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
}
