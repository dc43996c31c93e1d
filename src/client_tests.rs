//! End-to-end tests for `MerchantClient` against a mock server.

use super::MerchantClient;
use crate::config::{ClientConfig, RetryOverrides};
use crate::environment::{Environment, EnvironmentResolver};
use crate::resources::{CreateCustomer, ListCustomers};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_grant(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/merchant/token/grant"))
        .and(body_json(serde_json::json!({
            "client_id": "client_1",
            "client_secret": "secret_1",
            "grant_type": "client_credentials",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok_live",
            "token_type": "Bearer",
            "expires_in": 3_600_000,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn config(server: &MockServer, environment: Environment) -> ClientConfig {
    ClientConfig::new(environment, "client_1", "secret_1")
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
        .with_retry(RetryOverrides {
            max_number_of_retries: Some(1),
            delay: Some(Duration::from_millis(1)),
            max_delay: Some(Duration::from_millis(5)),
            ..RetryOverrides::default()
        })
        .unwrap()
}

#[tokio::test]
async fn lists_customers_after_retrying_a_server_error() {
    let server = MockServer::start().await;
    mount_grant(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/merchant/customers"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/merchant/customers"))
        .and(query_param("limit", "2"))
        .and(header("authorization", "Bearer tok_live"))
        .and(header("x-sdk-version", crate::transport::sdk_version().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "cus_1", "email": "a@example.com"}],
            "has_more": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MerchantClient::new(config(&server, Environment::Sandbox));
    let filter = ListCustomers {
        limit: Some(2),
        ..ListCustomers::default()
    };

    let page = client.customers().list(&filter).await.unwrap();

    assert_eq!(page.data[0].id, "cus_1");
}

#[tokio::test]
async fn reuses_token_across_resources() {
    let server = MockServer::start().await;
    mount_grant(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/merchant/customers"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"id": "cus_9", "email": "b@example.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/merchant/payments/pay_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "pay_1",
            "status": "processing",
            "amount": 10,
            "currency": "EUR",
            "provider": "bank_transfer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MerchantClient::new(config(&server, Environment::Sandbox));

    let customer = client
        .customers()
        .create(&CreateCustomer::new("b@example.com"))
        .await
        .unwrap();
    let payment = client.payments().get("pay_1").await.unwrap();

    assert_eq!(customer.id, "cus_9");
    assert_eq!(payment.provider, "bank_transfer");
}

#[tokio::test]
async fn rejected_credentials_surface_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/merchant/token/grant"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error_description": "bad client"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MerchantClient::new(config(&server, Environment::Sandbox));

    let error = client.customers().get("cus_1").await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert_eq!(
        error.to_string(),
        "API error (401 Unauthorized): bad client"
    );
}

#[test]
fn resolves_environment_from_config() {
    let config = ClientConfig::new(Environment::Production, "id", "secret").unwrap();
    let client = MerchantClient::new(config);

    assert_eq!(client.environment(), Environment::Production);
    assert_eq!(
        client.config().base_url.as_str(),
        "https://api.merchant-pay.com/"
    );
}
