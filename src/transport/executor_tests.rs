//! Tests for `Transport`.

use super::{HttpClient, HttpRequest, HttpResponse, RequestConfig, SDK_VERSION_HEADER, Transport};
use crate::retry::RetryOptions;
use crate::time::InstantSleeper;
use crate::{HttpError, SdkError};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn ok_json(body: &serde_json::Value) -> Self {
        Self::new(vec![Ok(HttpResponse::json(http::StatusCode::OK, body))])
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Customer {
    id: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct NewCustomer<'a> {
    email: &'a str,
}

fn test_url() -> url::Url {
    url::Url::parse("https://api.example.com/api/v1/merchant/customers").unwrap()
}

fn transport(client: MockClient) -> Transport<MockClient, InstantSleeper> {
    let retry = RetryOptions::new()
        .with_max_number_of_retries(2)
        .with_delay(Duration::from_millis(1));
    Transport::new(client, retry).with_sleeper(InstantSleeper)
}

fn customer_json() -> serde_json::Value {
    serde_json::json!({"id": "cus_1", "email": "a@example.com"})
}

mod request_building {
    use super::*;

    #[tokio::test]
    async fn sets_default_headers() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let _: Customer = transport
            .get(test_url(), &RequestConfig::new())
            .await
            .unwrap();

        let request = &transport.client().captured_requests()[0];
        assert_eq!(request.method, http::Method::GET);
        assert_eq!(
            request.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(
            request.headers[SDK_VERSION_HEADER]
                .to_str()
                .unwrap()
                .starts_with("merchant-sdk-rust/")
        );
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn caller_headers_win_on_conflict() {
        let transport = transport(MockClient::ok_json(&customer_json()));
        let config = RequestConfig::new()
            .with_header(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/vnd.merchant+json"),
            )
            .with_bearer("tok_abc")
            .unwrap();

        let _: Customer = transport.get(test_url(), &config).await.unwrap();

        let request = &transport.client().captured_requests()[0];
        let content_types: Vec<_> = request
            .headers
            .get_all(http::header::CONTENT_TYPE)
            .iter()
            .collect();
        assert_eq!(content_types, vec!["application/vnd.merchant+json"]);
        assert_eq!(
            request.headers.get(http::header::AUTHORIZATION).unwrap(),
            "Bearer tok_abc"
        );
        assert!(request.headers.contains_key(SDK_VERSION_HEADER));
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let _: Customer = transport
            .post(
                test_url(),
                &NewCustomer {
                    email: "a@example.com",
                },
                &RequestConfig::new(),
            )
            .await
            .unwrap();

        let request = &transport.client().captured_requests()[0];
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(request.body_text(), Some(r#"{"email":"a@example.com"}"#));
    }

    #[tokio::test]
    async fn put_serializes_json_body() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let body = serde_json::json!({"email": "b"});

        let _: Customer = transport
            .put(test_url(), &body, &RequestConfig::new())
            .await
            .unwrap();

        let request = &transport.client().captured_requests()[0];
        assert_eq!(request.method, http::Method::PUT);
        assert_eq!(request.body_text(), Some(r#"{"email":"b"}"#));
    }

    #[tokio::test]
    async fn patch_without_body_sends_no_body() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let body: Option<&serde_json::Value> = None;

        let _: Customer = transport
            .patch(test_url(), body, &RequestConfig::new())
            .await
            .unwrap();

        let request = &transport.client().captured_requests()[0];
        assert_eq!(request.method, http::Method::PATCH);
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn patch_with_empty_object_sends_braces() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let body = serde_json::json!({});

        let _: Customer = transport
            .patch(test_url(), Some(&body), &RequestConfig::new())
            .await
            .unwrap();

        let request = &transport.client().captured_requests()[0];
        assert_eq!(request.body_text(), Some("{}"));
    }
}

mod response_classification {
    use super::*;

    #[tokio::test]
    async fn success_returns_parsed_body() {
        let transport = transport(MockClient::ok_json(&customer_json()));

        let customer: Customer = transport
            .get(test_url(), &RequestConfig::new())
            .await
            .unwrap();

        assert_eq!(
            customer,
            Customer {
                id: "cus_1".to_string(),
                email: "a@example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_unit() {
        let client = MockClient::new(vec![Ok(HttpResponse::new(
            http::StatusCode::NO_CONTENT,
            http::HeaderMap::new(),
            vec![],
        ))]);
        let transport = transport(client);

        let result: Result<(), _> = transport.delete(test_url(), &RequestConfig::new()).await;

        assert!(result.is_ok());
        assert_eq!(
            transport.client().captured_requests()[0].method,
            http::Method::DELETE
        );
    }

    #[tokio::test]
    async fn non_retryable_status_returns_api_error_with_details() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", http::HeaderValue::from_static("req_9"));
        let client = MockClient::new(vec![Ok(HttpResponse::new(
            http::StatusCode::UNPROCESSABLE_ENTITY,
            headers,
            br#"{"message":"email is invalid","code":"invalid_email"}"#.to_vec(),
        ))]);
        let transport = transport(client);

        let error = transport
            .get::<Customer>(test_url(), &RequestConfig::new())
            .await
            .unwrap_err();

        match &error {
            SdkError::Api {
                status,
                message,
                body,
                headers,
            } => {
                assert_eq!(*status, http::StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(message, "email is invalid");
                assert_eq!(body["code"], "invalid_email");
                assert_eq!(headers.get("X-Request-Id").unwrap(), "req_9");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
        assert_eq!(transport.client().calls(), 1);
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_as_text() {
        let client = MockClient::new(vec![Ok(HttpResponse::new(
            http::StatusCode::FORBIDDEN,
            http::HeaderMap::new(),
            b"<html>denied</html>".to_vec(),
        ))]);
        let transport = transport(client);

        let error = transport
            .get::<Customer>(test_url(), &RequestConfig::new())
            .await
            .unwrap_err();

        assert_eq!(
            error.body(),
            Some(&serde_json::json!("<html>denied</html>"))
        );
        assert_eq!(error.to_string(), "API error (403 Forbidden): Forbidden");
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error_and_not_retried() {
        let client = MockClient::new(vec![
            Ok(HttpResponse::new(
                http::StatusCode::OK,
                http::HeaderMap::new(),
                b"{not json".to_vec(),
            )),
            Ok(HttpResponse::json(http::StatusCode::OK, &customer_json())),
        ]);
        let transport = transport(client);

        let error = transport
            .get::<Customer>(test_url(), &RequestConfig::new())
            .await
            .unwrap_err();

        assert!(matches!(error, SdkError::Parse { .. }));
        assert_eq!(transport.client().calls(), 1);
    }

    #[tokio::test]
    async fn invalid_url_is_not_retried() {
        let client = MockClient::new(vec![
            Err(HttpError::InvalidUrl("bad host".to_string())),
            Ok(HttpResponse::json(http::StatusCode::OK, &customer_json())),
        ]);
        let transport = transport(client);

        let error = transport
            .get::<Customer>(test_url(), &RequestConfig::new())
            .await
            .unwrap_err();

        assert!(matches!(error, SdkError::Sdk { .. }));
        assert_eq!(transport.client().calls(), 1);
    }
}

mod retries {
    use super::*;

    #[tokio::test]
    async fn server_error_then_success_returns_ok() {
        let client = MockClient::new(vec![
            Ok(HttpResponse::json(
                http::StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({"message": "try later"}),
            )),
            Ok(HttpResponse::json(http::StatusCode::OK, &customer_json())),
        ]);
        let retry = RetryOptions::new()
            .with_max_number_of_retries(1)
            .with_retry_on_status([500]);
        let transport = Transport::new(client, retry).with_sleeper(InstantSleeper);

        let customer: Customer = transport
            .get(test_url(), &RequestConfig::new())
            .await
            .unwrap();

        assert_eq!(customer.id, "cus_1");
        assert_eq!(transport.client().calls(), 2);
    }

    #[tokio::test]
    async fn retries_repeat_the_full_request() {
        let client = MockClient::new(vec![
            Err(HttpError::Timeout),
            Ok(HttpResponse::json(http::StatusCode::CREATED, &customer_json())),
        ]);
        let transport = transport(client);

        let body = NewCustomer { email: "x" };

        let _: Customer = transport
            .post(test_url(), &body, &RequestConfig::new())
            .await
            .unwrap();

        let requests = transport.client().captured_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(requests[1].method, http::Method::POST);
    }

    #[tokio::test]
    async fn connection_errors_exhaust_into_network_error() {
        let client = MockClient::new(vec![
            Err(HttpError::Connection(Box::new(std::io::Error::other("refused")))),
            Err(HttpError::Connection(Box::new(std::io::Error::other("refused")))),
            Err(HttpError::Connection(Box::new(std::io::Error::other("refused")))),
        ]);
        let transport = transport(client);

        let error = transport
            .get::<Customer>(test_url(), &RequestConfig::new())
            .await
            .unwrap_err();

        assert!(error.is_network());
        assert_eq!(transport.client().calls(), 3);
    }

    #[tokio::test]
    async fn per_call_retry_override_wins() {
        let client = MockClient::new(vec![
            Ok(HttpResponse::json(
                http::StatusCode::SERVICE_UNAVAILABLE,
                &serde_json::json!({}),
            )),
            Ok(HttpResponse::json(http::StatusCode::OK, &customer_json())),
        ]);
        let transport = transport(client);
        let retry = RetryOptions::new().with_max_number_of_retries(0);
        let config = RequestConfig::new().with_retry(retry);

        let error = transport
            .get::<Customer>(test_url(), &config)
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(503));
        assert_eq!(transport.client().calls(), 1);
    }

    #[tokio::test]
    async fn cancelled_signal_skips_the_request() {
        let transport = transport(MockClient::ok_json(&customer_json()));
        let signal = CancellationToken::new();
        signal.cancel();

        let result = transport
            .get::<Customer>(test_url(), &RequestConfig::new().with_signal(signal))
            .await;

        assert!(matches!(result, Err(SdkError::Cancelled)));
        assert_eq!(transport.client().calls(), 0);
    }
}
