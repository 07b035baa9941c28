//! Common test utilities for journal-service integration tests.
//!
//! Suites run against a real PostgreSQL pointed to by TEST_DATABASE_URL
//! and skip cleanly when it is unset. Outbound providers are mocks.

#![allow(dead_code)]

use journal_service::config::{
    DatabaseConfig, Environment, JobsConfig, JournalConfig, LlmConfig, QuotesConfig,
    SecurityConfig, SmtpConfig,
};
use journal_service::services::{
    Database, EmailProvider, InsightService, MockEmailProvider, MockQuoteIndex, MockTextProvider,
    QuoteIndex, TextProvider,
};
use journal_service::{build_router, AppState};
use service_core::config::Config as CommonConfig;
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Once};
use tokio::net::TcpListener;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,journal_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn test_config(database_url: String) -> JournalConfig {
    JournalConfig {
        common: CommonConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        environment: Environment::Dev,
        service_name: "journal-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        database: DatabaseConfig {
            url: database_url,
            max_connections: 2,
            min_connections: 1,
        },
        smtp: SmtpConfig {
            enabled: false,
            host: "localhost".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_email: "journal@localhost".to_string(),
            from_name: "Journal".to_string(),
        },
        llm: LlmConfig {
            api_key: String::new(),
            model: "mock".to_string(),
        },
        quotes: QuotesConfig {
            enabled: false,
            base_url: "http://localhost:6333".to_string(),
            collection: "quotes".to_string(),
            api_key: String::new(),
        },
        jobs: JobsConfig {
            activity_refresh_hours: 6,
            active_window_days: 4,
            newsletter_interval_hours: 168,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

/// A spawned test application plus a client to talk to it.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub state: AppState,
}

/// Credentials of a freshly registered account.
pub struct TestUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Spawn the app against TEST_DATABASE_URL, or None to let the suite
/// skip when no database is available.
pub async fn try_spawn_app() -> Option<TestApp> {
    init_tracing();

    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    let db = Database::new(pool);
    db.migrate().await.expect("Failed to migrate test database");

    let state = AppState {
        config: test_config(database_url),
        db,
        insight: InsightService::new(Arc::new(MockTextProvider::new(true)) as Arc<dyn TextProvider>),
        email: Arc::new(MockEmailProvider::new(true)) as Arc<dyn EmailProvider>,
        quotes: Arc::new(MockQuoteIndex::new(true)) as Arc<dyn QuoteIndex>,
    };

    let router = build_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Some(TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        state,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Register a unique account and return its credentials.
    pub async fn register_user(&self) -> TestUser {
        let suffix = Uuid::new_v4().simple().to_string();
        let user = TestUser {
            username: format!("user_{}", &suffix[..12]),
            password: "a-strong-password".to_string(),
            email: format!("user_{}@example.com", &suffix[..12]),
        };

        let response = self
            .client
            .post(self.url("/accounts"))
            .json(&serde_json::json!({
                "username": user.username,
                "email": user.email,
                "password": user.password,
            }))
            .send()
            .await
            .expect("Failed to register user");
        assert_eq!(response.status(), 201, "registration should succeed");

        user
    }

    /// Create an activity with explicit timestamps for the given user.
    pub async fn create_activity(
        &self,
        user: &TestUser,
        name: &str,
        begin: &str,
        end: &str,
        memo: &str,
    ) -> serde_json::Value {
        let response = self
            .client
            .post(self.url("/activities"))
            .basic_auth(&user.username, Some(&user.password))
            .json(&serde_json::json!({
                "name": name,
                "begin": begin,
                "end": end,
                "memo": memo,
            }))
            .send()
            .await
            .expect("Failed to create activity");
        assert_eq!(response.status(), 201, "activity creation should succeed");

        response.json().await.expect("Invalid activity response")
    }
}
