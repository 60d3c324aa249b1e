// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::helpers::{bearer, create_test_app, create_test_app_with, scrape_success, API_KEY, FIRECRAWL_KEY};

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_extract_with_schema_returns_json_data() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .and(header("authorization", format!("Bearer {}", FIRECRAWL_KEY).as_str()))
        .and(body_partial_json(json!({
            "url": "https://example.com",
            "formats": [
                "markdown",
                {
                    "type": "json",
                    "schema": {"type": "object", "properties": {"title": {"type": "string"}}}
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_success(json!({
            "markdown": "# Example Domain",
            "json": {"title": "Example Domain"},
            "metadata": {"title": "Example Domain", "sourceURL": "https://example.com/"}
        }))))
        .expect(1)
        .mount(&app.firecrawl)
        .await;

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&json!({
            "url": "https://example.com",
            "outputSchema": {"type": "object", "properties": {"title": {"type": "string"}}}
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!({"title": "Example Domain"}));
    assert_eq!(body["metadata"]["title"], "Example Domain");
    assert_eq!(body["metadata"]["sourceURL"], "https://example.com/");
}

#[tokio::test]
async fn test_extract_with_prompt_falls_back_to_markdown() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .and(body_partial_json(json!({
            "formats": ["markdown", {"type": "json", "prompt": "Get the heading"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_success(json!({
            "markdown": "# Example Domain"
        }))))
        .expect(1)
        .mount(&app.firecrawl)
        .await;

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&json!({"url": "https://example.com/page", "prompt": "Get the heading"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"], "# Example Domain");
    assert!(body["metadata"].get("title").is_none());
    assert_eq!(body["metadata"]["sourceURL"], "https://example.com/page");
}

#[tokio::test]
async fn test_schema_and_prompt_are_sent_together() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_success(json!({
            "json": {"price": 10}
        }))))
        .expect(1)
        .mount(&app.firecrawl)
        .await;

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&json!({
            "url": "https://example.com",
            "prompt": "Focus on the price",
            "outputSchema": {"type": "object"}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let requests = app.firecrawl.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        sent["formats"],
        json!([
            "markdown",
            {"type": "json", "schema": {"type": "object"}, "prompt": "Focus on the price"}
        ])
    );
}

#[tokio::test]
async fn test_invalid_requests_never_reach_firecrawl() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.firecrawl)
        .await;

    let cases = [
        (
            json!({"url": "http://169.254.169.254/latest/meta-data", "prompt": "x"}),
            "url: private and internal IP addresses are not allowed",
        ),
        (
            json!({"url": "http://localhost:8080/admin", "prompt": "x"}),
            "url: local and loopback addresses are not allowed",
        ),
        (
            json!({"url": "ftp://example.com/file", "prompt": "x"}),
            "url: only HTTP and HTTPS protocols are allowed",
        ),
        (
            json!({"url": "https://example.com"}),
            "Either prompt or outputSchema must be provided",
        ),
    ];

    for (payload, expected) in cases {
        let response = app
            .server
            .post("/v1/extract")
            .add_header("Authorization", bearer(API_KEY))
            .json(&payload)
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{payload}");
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(error_code(&body), "BAD_REQUEST");
        assert_eq!(body["error"]["message"], expected);
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .text("{not json")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_extract_requires_api_key() {
    let app = create_test_app().await;
    let payload = json!({"url": "https://example.com", "prompt": "x"});

    let response = app.server.post("/v1/extract").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(error_code(&body), "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Authentication required");

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer("wrong-key"))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let app = create_test_app_with(|builder| {
        builder
            .set_override("rate_limiting.default_rpm", 1)
            .unwrap()
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_success(json!({
            "markdown": "ok"
        }))))
        .expect(1)
        .mount(&app.firecrawl)
        .await;

    let payload = json!({"url": "https://example.com", "prompt": "x"});
    let first = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&payload)
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.headers().get("x-ratelimit-limit").unwrap(), "1");
    assert_eq!(first.headers().get("x-ratelimit-remaining").unwrap(), "0");
    assert!(first.headers().get("x-ratelimit-reset").is_some());

    let second = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&payload)
        .await;
    assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().get("retry-after").is_some());
    assert_eq!(second.headers().get("x-ratelimit-limit").unwrap(), "1");
    assert_eq!(second.headers().get("x-ratelimit-remaining").unwrap(), "0");
    assert!(second.headers().get("x-ratelimit-reset").is_some());
    let body: Value = second.json();
    assert_eq!(error_code(&body), "TOO_MANY_REQUESTS");

    // Health checks are never rate limited.
    let health = app.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_firecrawl_errors_are_mapped() {
    let cases = [
        (
            ResponseTemplate::new(429).set_body_json(json!({"success": false, "error": "Rate limit exceeded"})),
            StatusCode::TOO_MANY_REQUESTS,
            "TOO_MANY_REQUESTS",
            "Rate limit exceeded. Please try again later.",
        ),
        (
            ResponseTemplate::new(404).set_body_json(json!({"success": false, "error": "Not found"})),
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "The URL could not be found or is not accessible.",
        ),
        (
            ResponseTemplate::new(500).set_body_json(json!({"success": false, "error": "Request timeout while loading page"})),
            StatusCode::GATEWAY_TIMEOUT,
            "TIMEOUT",
            "The request timed out. The page may be too large or slow to respond.",
        ),
        (
            ResponseTemplate::new(500).set_body_json(json!({"success": false, "error": "database exploded"})),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An error occurred while scraping the URL",
        ),
        (
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "Something odd"})),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An error occurred while scraping the URL",
        ),
    ];

    for (template, status, code, message) in cases {
        let app = create_test_app().await;
        Mock::given(method("POST"))
            .and(path("/v2/scrape"))
            .respond_with(template)
            .expect(1)
            .mount(&app.firecrawl)
            .await;

        let response = app
            .server
            .post("/v1/extract")
            .add_header("Authorization", bearer(API_KEY))
            .json(&json!({"url": "https://example.com", "prompt": "x"}))
            .await;

        assert_eq!(response.status_code(), status, "{code}");
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(error_code(&body), code);
        assert_eq!(body["error"]["message"], message);
        assert!(!body.to_string().contains("database exploded"));
    }
}

#[tokio::test]
async fn test_slow_firecrawl_times_out() {
    let app = create_test_app_with(|builder| {
        builder
            .set_override("firecrawl.timeout_secs", 1)
            .unwrap()
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/v2/scrape"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(scrape_success(json!({"markdown": "late"})))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&app.firecrawl)
        .await;

    let response = app
        .server
        .post("/v1/extract")
        .add_header("Authorization", bearer(API_KEY))
        .json(&json!({"url": "https://example.com", "prompt": "x"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json();
    assert_eq!(error_code(&body), "TIMEOUT");
}
