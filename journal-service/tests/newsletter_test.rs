mod common;

#[tokio::test]
async fn self_service_send_records_the_dispatch() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    // Opt out of the periodic batch so a concurrently running batch test
    // cannot add extra history entries; the explicit send ignores opt-in.
    let response = app
        .client
        .patch(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "newsletter_opt_in": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    app.create_activity(
        &user,
        "morning run",
        &(chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339(),
        &(chrono::Utc::now() - chrono::Duration::days(1) + chrono::Duration::hours(1)).to_rfc3339(),
        "felt strong",
    )
    .await;

    let response = app
        .client
        .post(app.url("/newsletters/send"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["subject"]
        .as_str()
        .unwrap()
        .starts_with("Your week in review"));

    let response = app
        .client
        .get(app.url("/newsletters"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let history: serde_json::Value = response.json().await.unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind_code"], "newsletter");
    // The quote index mock is enabled, so its quote lands in the body.
    assert!(entries[0]["body_text"]
        .as_str()
        .unwrap()
        .contains("Will Durant"));
}

#[tokio::test]
async fn newsletter_batch_respects_opt_out() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    // Opt out, then run the batch job body directly.
    let response = app
        .client
        .patch(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "newsletter_opt_in": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    journal_service::jobs::newsletter::run(&app.state)
        .await
        .expect("batch should not fail");

    let response = app
        .client
        .get(app.url("/newsletters"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    let history: serde_json::Value = response.json().await.unwrap();
    assert_eq!(history.as_array().unwrap().len(), 0);
}
