mod common;

#[tokio::test]
async fn register_then_fetch_profile_with_basic_auth() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .get(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .expect("Failed to fetch profile");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], user.username.as_str());
    assert!(body.get("password_hash").is_none(), "hash must never leak");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .post(app.url("/accounts"))
        .json(&serde_json::json!({
            "username": user.username,
            "email": format!("other_{}", user.email),
            "password": "another-password",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn invalid_registration_is_rejected_before_any_write() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let response = app
        .client
        .post(app.url("/accounts"))
        .json(&serde_json::json!({
            "username": "ok-name",
            "email": "not-an-email",
            "password": "long-enough-password",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn wrong_password_and_missing_header_are_unauthorized() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .get(app.url("/users/me"))
        .basic_auth(&user.username, Some("wrong-password"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app.client.get(app.url("/users/me")).send().await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn bearer_token_lifecycle() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    // Mint a token with basic auth.
    let response = app
        .client
        .post(app.url("/auth/tokens"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "label": "cli" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let minted: serde_json::Value = response.json().await.unwrap();
    let token = minted["token"].as_str().unwrap().to_string();
    let token_id = minted["token_id"].as_str().unwrap().to_string();
    assert!(token.starts_with("jrnl_"));

    // The bearer token authenticates.
    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Listing shows metadata but never the secret.
    let response = app
        .client
        .get(app.url("/auth/tokens"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(listed[0].get("token").is_none());
    assert!(listed[0].get("token_hash").is_none());

    // Revoke, then the token stops working.
    let response = app
        .client
        .delete(app.url(&format!("/auth/tokens/{}", token_id)))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn password_change_requires_basic_auth() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .post(app.url("/auth/tokens"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({ "label": "cli" }))
        .send()
        .await
        .unwrap();
    let minted: serde_json::Value = response.json().await.unwrap();
    let token = minted["token"].as_str().unwrap().to_string();

    // Bearer-authenticated change is forbidden.
    let response = app
        .client
        .post(app.url("/users/me/password"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "current_password": user.password,
            "new_password": "an-even-stronger-one",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Basic-authenticated change succeeds and rotates the credential.
    let response = app
        .client
        .post(app.url("/users/me/password"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({
            "current_password": user.password,
            "new_password": "an-even-stronger-one",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .get(app.url("/users/me"))
        .basic_auth(&user.username, Some("an-even-stronger-one"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn profile_update_persists() {
    let Some(app) = common::try_spawn_app().await else {
        eprintln!("Skipping: TEST_DATABASE_URL not set");
        return;
    };

    let user = app.register_user().await;

    let response = app
        .client
        .patch(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .json(&serde_json::json!({
            "display_name": "Sam Journals",
            "newsletter_opt_in": false,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/users/me"))
        .basic_auth(&user.username, Some(&user.password))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["display_name"], "Sam Journals");
    assert_eq!(body["newsletter_opt_in"], false);
}
