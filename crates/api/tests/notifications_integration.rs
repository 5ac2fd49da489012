//! Integration tests for the notification outbox, in-app notifications
//! and admin fan-outs.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{
    get_request_with_auth, json_request_with_auth, outbox_types,
    request_with_auth, TestContext,
};
use domain::services::NotificationMessage;
use prestaci_api::config::NotificationsConfig;
use prestaci_api::jobs::{Job, NotificationOutboxJob};
use prestaci_api::services::{NotificationDispatcher, PgNotificationService};
use serde_json::json;
use uuid::Uuid;

fn outbox_job(ctx: &TestContext) -> NotificationOutboxJob {
    let config = NotificationsConfig {
        batch_size: 500,
        ..NotificationsConfig::default()
    };
    NotificationOutboxJob::new(
        ctx.pool.clone(),
        Arc::new(PgNotificationService::new(ctx.pool.clone())),
        &config,
    )
}

async fn outbox_status(ctx: &TestContext, user_id: Uuid) -> Vec<String> {
    sqlx::query_scalar("SELECT status::text FROM notification_outbox WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(&ctx.pool)
        .await
        .unwrap()
}

async fn push_platforms(ctx: &TestContext, user_id: Uuid) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT platform FROM push_deliveries WHERE user_id = $1 ORDER BY platform",
    )
    .bind(user_id)
    .fetch_all(&ctx.pool)
    .await
    .unwrap()
}

/// Runs the outbox job until every row of `user_id` left `pending`.
/// Parallel tests may claim the same rows, so a few passes are allowed.
async fn drain_for(ctx: &TestContext, user_id: Uuid) {
    let job = outbox_job(ctx);
    for _ in 0..20 {
        job.execute().await.unwrap();
        if !outbox_status(ctx, user_id)
            .await
            .iter()
            .any(|s| s == "pending")
        {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("outbox rows for {} still pending", user_id);
}

#[tokio::test]
async fn test_outbox_delivers_in_app_notification() {
    let Some(ctx) = TestContext::new().await else { return };
    let client = ctx.client().await;

    NotificationDispatcher::new(ctx.pool.clone())
        .notify(client.id, NotificationMessage::review_approved(Uuid::new_v4()))
        .await;
    assert_eq!(outbox_status(&ctx, client.id).await, vec!["pending".to_string()]);

    drain_for(&ctx, client.id).await;
    assert_eq!(outbox_status(&ctx, client.id).await, vec!["delivered".to_string()]);

    let (status, body) = ctx
        .send(get_request_with_auth("/api/notifications", &client.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 1);
    assert_eq!(body["data"][0]["type"], "avis_approuve");
    assert_eq!(body["data"][0]["is_read"], false);
    assert!(push_platforms(&ctx, client.id).await.is_empty());
}

#[tokio::test]
async fn test_outbox_records_push_delivery_per_device() {
    let Some(ctx) = TestContext::new().await else { return };
    let client = ctx.client().await;
    for platform in ["android", "ios"] {
        sqlx::query("INSERT INTO push_tokens (user_id, token, platform) VALUES ($1, $2, $3)")
            .bind(client.id)
            .bind(format!("tok-{}", Uuid::new_v4()))
            .bind(platform)
            .execute(&ctx.pool)
            .await
            .unwrap();
    }

    NotificationDispatcher::new(ctx.pool.clone())
        .notify(client.id, NotificationMessage::review_approved(Uuid::new_v4()))
        .await;
    drain_for(&ctx, client.id).await;

    assert_eq!(
        push_platforms(&ctx, client.id).await,
        vec!["android".to_string(), "ios".to_string()]
    );

    let (notification_id, titre): (Uuid, String) =
        sqlx::query_as("SELECT id, titre FROM notifications WHERE user_id = $1")
            .bind(client.id)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    let pushed: Vec<(Uuid, String)> = sqlx::query_as(
        "SELECT notification_id, titre FROM push_deliveries WHERE user_id = $1",
    )
    .bind(client.id)
    .fetch_all(&ctx.pool)
    .await
    .unwrap();
    assert!(pushed.iter().all(|(id, t)| *id == notification_id && *t == titre));
}

#[tokio::test]
async fn test_mark_read_and_read_all() {
    let Some(ctx) = TestContext::new().await else { return };
    let client = ctx.client().await;
    let dispatcher = NotificationDispatcher::new(ctx.pool.clone());
    for _ in 0..3 {
        dispatcher
            .notify(client.id, NotificationMessage::review_approved(Uuid::new_v4()))
            .await;
    }
    drain_for(&ctx, client.id).await;

    let (_, body) = ctx
        .send(get_request_with_auth("/api/notifications", &client.token))
        .await;
    assert_eq!(body["unread_count"], 3);
    let first = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(request_with_auth(
            Method::POST,
            &format!("/api/notifications/{}/read", first),
            &client.token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    // Another user's notification is invisible.
    let other = ctx.client().await;
    let (status, _) = ctx
        .send(request_with_auth(
            Method::POST,
            &format!("/api/notifications/{}/read", first),
            &other.token,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = ctx
        .send(get_request_with_auth(
            "/api/notifications?unread_only=true",
            &client.token,
        ))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = ctx
        .send(request_with_auth(
            Method::POST,
            "/api/notifications/read-all",
            &client.token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, body) = ctx
        .send(get_request_with_auth("/api/notifications", &client.token))
        .await;
    assert_eq!(body["unread_count"], 0);
}

#[tokio::test]
async fn test_targeted_notification() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.admin().await;
    let first = ctx.client().await;
    let second = ctx.client().await;

    let (status, body) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/targeted",
            json!({
                "user_ids": [first.id, second.id],
                "titre": "Bienvenue",
                "message": "Merci d'utiliser PrestaCI"
            }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    assert_eq!(body["recipients"], 2);

    assert_eq!(outbox_types(&ctx.pool, first.id).await, vec!["annonce".to_string()]);
    assert_eq!(outbox_types(&ctx.pool, second.id).await, vec!["annonce".to_string()]);

    let logged: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM admin_logs WHERE admin_id = $1 AND action = 'targeted_notification'",
    )
    .bind(admin.id)
    .fetch_one(&ctx.pool)
    .await
    .unwrap();
    assert_eq!(logged, 1);
}

#[tokio::test]
async fn test_template_notification() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.admin().await;
    let client = ctx.client().await;

    let (status, body) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/template",
            json!({
                "template": "maintenance",
                "variables": { "date": "12/11", "debut": "02h", "fin": "04h" },
                "user_ids": [client.id]
            }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    assert_eq!(body["recipients"], 1);

    let message: String =
        sqlx::query_scalar("SELECT message FROM notification_outbox WHERE user_id = $1")
            .bind(client.id)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(message, "PrestaCI sera indisponible le 12/11 de 02h à 04h.");

    // Missing variable.
    let (status, _) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/template",
            json!({
                "template": "maintenance",
                "variables": { "date": "12/11" },
                "user_ids": [client.id]
            }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/template",
            json!({ "template": "inconnu", "user_ids": [client.id] }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_broadcast_by_role() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.admin().await;
    let provider = ctx.subscribed_provider(1).await;

    let (status, body) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/broadcast",
            json!({
                "titre": "Nouveau tarif",
                "message": "Les plans évoluent le mois prochain",
                "role": "prestataire"
            }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    assert!(body["recipients"].as_u64().unwrap() >= 1);
    assert!(outbox_types(&ctx.pool, provider.user_id)
        .await
        .contains(&"annonce".to_string()));

    let action: String =
        sqlx::query_scalar("SELECT action FROM admin_logs WHERE admin_id = $1")
            .bind(admin.id)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(action, "broadcast_notification");
}

#[tokio::test]
async fn test_fan_out_requires_admin() {
    let Some(ctx) = TestContext::new().await else { return };
    let client = ctx.client().await;

    let (status, _) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/notifications/broadcast",
            json!({ "titre": "x", "message": "y" }),
            &client.token,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
