//! Integration tests for `HyperClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use auto_api::middleware::LoggingLayer;
use auto_api::{HttpClient, HyperClient, Method, Request};
use serde_json::json;
use tower::limit::ConcurrencyLimitLayer;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

#[tokio::test]
async fn test_get_request() {
    let mock_server = MockServer::start().await;

    let filters = json!({"brands": ["Kia", "Hyundai"]});

    Mock::given(method("GET"))
        .and(path("/api/v2/encar/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&filters))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let url = url::Url::parse(&format!("{}/api/v2/encar/filters", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Get, url)
        .header("Accept", "application/json")
        .build();

    let response = client.execute(request).await.expect("response");

    assert!(response.is_success());
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().expect("json");
    assert_eq!(body, filters);
}

#[tokio::test]
async fn test_post_request_with_json_body() {
    let mock_server = MockServer::start().await;

    let lookup = json!({"url": "https://fem.encar.com/cars/detail/40427050"});

    Mock::given(method("POST"))
        .and(path("/api/v1/offer/info"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(&lookup))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"inner_id": "40427050"})))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let url = url::Url::parse(&format!("{}/api/v1/offer/info", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Post, url)
        .json(&lookup)
        .expect("json body")
        .build();

    let response = client.execute(request).await.expect("response");

    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_http_error_status_is_a_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let url = url::Url::parse(&format!("{}/missing", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Get, url).build();

    let response = client.execute(request).await.expect("response");

    assert!(!response.is_success());
    assert_eq!(response.status(), 404);
    assert_eq!(response.body().as_ref(), b"Not Found");
}

#[tokio::test]
async fn test_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/encar/offers"))
        .and(query_param("brand", "Hyundai"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let url = url::Url::parse(&format!("{}/api/v2/encar/offers", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Get, url)
        .query("page", "1")
        .query("brand", "Hyundai")
        .build();

    let response = client.execute(request).await.expect("response");

    assert!(response.is_success());
}

#[tokio::test]
async fn test_response_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/headers"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Request-Id", "req-7"))
        .mount(&mock_server)
        .await;

    let client = HyperClient::new();
    let url = url::Url::parse(&format!("{}/headers", mock_server.uri())).expect("url");

    let response = client
        .execute(Request::builder(Method::Get, url).build())
        .await
        .expect("response");

    assert_eq!(response.header("x-request-id"), Some("req-7"));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = HyperClient::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let url = url::Url::parse(&format!("{}/slow", mock_server.uri())).expect("url");

    let result = client.execute(Request::builder(Method::Get, url).build()).await;

    let err = result.expect_err("expected timeout error");
    assert!(err.is_timeout(), "Expected timeout error, got: {err}");
}

#[tokio::test]
async fn test_connection_error() {
    let client = HyperClient::builder()
        .connect_timeout(Duration::from_secs(2))
        .build();
    let url = url::Url::parse("http://127.0.0.1:1").expect("url");

    let result = client.execute(Request::builder(Method::Get, url).build()).await;

    let err = result.expect_err("expected connection error");
    assert!(err.is_connection(), "Expected connection error, got: {err}");
}

#[tokio::test]
async fn test_logging_layer_passes_responses_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logged"))
        .and(query_param("api_key", "secret"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HyperClient::builder().layer(LoggingLayer::debug()).build();
    let url = url::Url::parse(&format!("{}/logged?api_key=secret", mock_server.uri())).expect("url");

    let response = client
        .execute(Request::builder(Method::Get, url).build())
        .await
        .expect("response");

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_readiness_gated_layers_are_polled_before_each_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = HyperClient::builder()
        .layer(ConcurrencyLimitLayer::new(1))
        .layer(LoggingLayer::new())
        .build();
    let url = url::Url::parse(&format!("{}/limited", mock_server.uri())).expect("url");

    assert_eq!(status_of(&client, url.clone()).await, 200);
    assert_eq!(status_of(&client, url.clone()).await, 200);

    let other = client.clone();
    assert_eq!(status_of(other, url).await, 200);
}

#[tokio::test]
async fn test_follow_redirects_layer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(308).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = url::Url::parse(&format!("{}/old", mock_server.uri())).expect("url");

    assert_eq!(status_of(HyperClient::new(), url.clone()).await, 308);
    assert_eq!(status_of(HyperClient::builder().with_follow_redirects().build(), url).await, 200);
}

async fn status_of<C: HttpClient>(client: C, url: url::Url) -> u16 {
    client
        .execute(Request::builder(Method::Get, url).build())
        .await
        .expect("response")
        .status()
}

#[tokio::test]
async fn test_shared_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = Arc::new(HyperClient::new());
    let url = url::Url::parse(&format!("{}/shared", mock_server.uri())).expect("url");

    assert_eq!(status_of(Arc::clone(&client), url.clone()).await, 200);
    assert_eq!(status_of(client.as_ref(), url).await, 200);
}
