mod common;

#[tokio::test]
async fn ethos_upsert_round_trip() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    // Nothing recorded yet.
    let response = app
        .client
        .get(app.url("/ethos"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = app
        .client
        .put(app.url("/ethos"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "statement": "Move every day." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Upsert replaces, never duplicates.
    let response = app
        .client
        .put(app.url("/ethos"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "statement": "Move every single day." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/ethos"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["statement"], "Move every single day.");
}

#[tokio::test]
async fn summary_covers_the_requested_range() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;
    app.create_activity(
        &user,
        "morning run",
        "2024-03-01T07:00:00Z",
        "2024-03-01T08:00:00Z",
        "felt strong",
    )
    .await;
    app.create_activity(
        &user,
        "outside range",
        "2024-04-01T07:00:00Z",
        "2024-04-01T08:00:00Z",
        "",
    )
    .await;

    let response = app
        .client
        .post(app.url("/insights/summary"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "from": "2024-03-01", "to": "2024-03-07" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["activity_count"], 1);
    assert_eq!(body["day_count"], 1);
    // The mock provider echoes the prompt, which embeds the digest.
    assert!(body["summary"].as_str().unwrap().contains("morning run"));
}

#[tokio::test]
async fn feedback_returns_structured_mood() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;
    app.create_activity(
        &user,
        "morning run",
        "2024-03-01T07:00:00Z",
        "2024-03-01T08:00:00Z",
        "felt strong",
    )
    .await;

    let response = app
        .client
        .post(app.url("/insights/feedback"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "from": "2024-03-01", "to": "2024-03-07" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["mood"], "steady");
    assert!(!body["feedback"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn inverted_insight_range_is_rejected() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .post(app.url("/insights/summary"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "from": "2024-03-07", "to": "2024-03-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn malformed_insight_dates_are_rejected() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .post(app.url("/insights/summary"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "from": "last tuesday", "to": "2024-03-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
