mod common;

#[tokio::test]
async fn health_check_reports_database_up() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to call /health");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Invalid health body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "up");
}

#[tokio::test]
async fn metrics_endpoint_is_public_plaintext() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let response = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .expect("Failed to call /metrics");

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to call /health");

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
}
