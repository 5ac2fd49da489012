//! Common test utilities for integration tests.
//!
//! Tests run against a real PostgreSQL database named by
//! `TEST_DATABASE_URL`. When the variable is unset, [`TestContext::new`]
//! returns `None` and the test returns early.
//!
//! Every fixture uses fresh ids and emails, so tests can share one
//! database and run in parallel without truncating tables.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use prestaci_api::{
    app::create_app,
    config::{
        Config, DatabaseConfig, JwtAuthConfig, LoggingConfig, NotificationsConfig,
        SecurityConfig, ServerConfig,
    },
};
use serde_json::Value;
use shared::jwt::JwtConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Test configuration. Rate limiting is disabled.
pub fn test_config(database_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0,
        },
        jwt: JwtAuthConfig {
            secret: TEST_JWT_SECRET.to_string(),
            leeway_secs: 30,
        },
        notifications: NotificationsConfig::default(),
    }
}

/// Pool, router and token minting for one test.
pub struct TestContext {
    pub pool: PgPool,
    pub app: Router,
    pub jwt: JwtConfig,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping integration test");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../persistence/src/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let app = create_app(test_config(&database_url), pool.clone())
            .expect("Failed to build application");
        let jwt = JwtConfig::new(TEST_JWT_SECRET, 30).expect("Invalid test JWT secret");

        Some(Self { pool, app, jwt })
    }

    pub fn token(&self, user_id: Uuid, role: &str) -> String {
        self.jwt
            .issue(user_id, role, 3600)
            .expect("Failed to issue test token")
    }

    /// Sends a request and returns the status and JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn client(&self) -> TestUser {
        let id = seed_user(&self.pool, "client").await;
        TestUser {
            id,
            token: self.token(id, "client"),
        }
    }

    pub async fn admin(&self) -> TestUser {
        let id = seed_user(&self.pool, "admin").await;
        TestUser {
            id,
            token: self.token(id, "admin"),
        }
    }

    /// Provider subscribed to a plan allowing `max_services` services,
    /// expiring in 30 days.
    pub async fn subscribed_provider(&self, max_services: i32) -> TestProvider {
        let plan_id = seed_plan(&self.pool, 5000, max_services, 5).await;
        self.provider(Some(plan_id), Some(Duration::days(30))).await
    }

    /// Provider with an optional plan and subscription end relative to now.
    pub async fn provider(
        &self,
        plan_id: Option<Uuid>,
        expires_in: Option<Duration>,
    ) -> TestProvider {
        let user_id = seed_user(&self.pool, "prestataire").await;
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO prestataires (user_id, nom_commercial, ville, plan_actuel_id,
                                      abonnement_expires_at)
            VALUES ($1, $2, 'Abidjan', $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(format!("Salon {}", Uuid::new_v4().simple()))
        .bind(plan_id)
        .bind(expires_in.map(|d| Utc::now() + d))
        .fetch_one(&self.pool)
        .await
        .expect("Failed to seed provider");

        TestProvider {
            id,
            user_id,
            token: self.token(user_id, "prestataire"),
        }
    }
}

/// A seeded user with a bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// A seeded provider profile with its user's bearer token.
pub struct TestProvider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
}

pub async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, nom, role)
        VALUES ($1, 'Test', $2::user_role)
        RETURNING id
        "#,
    )
    .bind(format!("test_{}@example.com", Uuid::new_v4()))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

pub async fn seed_plan(pool: &PgPool, prix: i64, max_services: i32, max_photos: i32) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO plans_abonnement (nom, prix, duree_jours, max_services, max_photos_par_service)
        VALUES ($1, $2, 30, $3, $4)
        RETURNING id
        "#,
    )
    .bind(format!("Plan {}", Uuid::new_v4().simple()))
    .bind(rust_decimal::Decimal::from(prix))
    .bind(max_services)
    .bind(max_photos)
    .fetch_one(pool)
    .await
    .expect("Failed to seed plan")
}

/// An active sub-category from the reference catalog.
pub async fn sous_categorie_id(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("SELECT id FROM sous_categories WHERE nom = 'Coiffure'")
        .fetch_one(pool)
        .await
        .expect("Reference catalog missing")
}

/// Inserts a service directly, bypassing the quota guard.
pub async fn seed_service(
    pool: &PgPool,
    prestataire_id: Uuid,
    prix: i64,
    duree_minutes: i32,
) -> Uuid {
    let sous_categorie = sous_categorie_id(pool).await;
    sqlx::query_scalar(
        r#"
        INSERT INTO services (prestataire_id, sous_categorie_id, nom, prix, duree_minutes)
        VALUES ($1, $2, 'Coupe homme', $3, $4)
        RETURNING id
        "#,
    )
    .bind(prestataire_id)
    .bind(sous_categorie)
    .bind(rust_decimal::Decimal::from(prix))
    .bind(duree_minutes)
    .fetch_one(pool)
    .await
    .expect("Failed to seed service")
}

/// Inserts a reservation in the given status id (3 = terminee).
pub async fn seed_reservation(
    pool: &PgPool,
    client_id: Uuid,
    prestataire_id: Uuid,
    service_id: Uuid,
    statut_id: i16,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO reservations (client_id, prestataire_id, service_id, statut_id,
                                  date_reservation, heure_debut, heure_fin, prix_final)
        VALUES ($1, $2, $3, $4, CURRENT_DATE, '10:00', '11:00', 3000)
        RETURNING id
        "#,
    )
    .bind(client_id)
    .bind(prestataire_id)
    .bind(service_id)
    .bind(statut_id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed reservation")
}

/// A date a week from now.
pub fn future_date() -> NaiveDate {
    (Utc::now() + Duration::days(7)).date_naive()
}

/// Outbox rows queued for a user.
pub async fn outbox_types(pool: &PgPool, user_id: Uuid) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT type FROM notification_outbox WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .expect("Failed to read outbox")
}

/// Admin log actions recorded for a target.
pub async fn admin_log_actions(pool: &PgPool, target_id: Uuid) -> Vec<String> {
    sqlx::query_scalar("SELECT action FROM admin_logs WHERE target_id = $1 ORDER BY created_at")
        .bind(target_id)
        .fetch_all(pool)
        .await
        .expect("Failed to read admin logs")
}

/// Helper to make a JSON request with bearer auth.
pub fn json_request_with_auth(
    method: Method,
    uri: &str,
    body: Value,
    token: &str,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to make a body-less request with bearer auth.
pub fn request_with_auth(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    request_with_auth(Method::GET, uri, token)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "Failed to parse response body: {:?}",
            String::from_utf8_lossy(&body)
        )
    })
}
