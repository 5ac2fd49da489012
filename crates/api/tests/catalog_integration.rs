//! Integration tests for the public catalog, plans and health endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{get_request, json_request_with_auth, seed_service, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_endpoints() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx.send(get_request("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = ctx.send(get_request("/api/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_categories_grouped_with_sous_categories() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx.send(get_request("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);

    let beaute = body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["nom"] == "Beauté & Bien-être")
        .expect("seeded category");
    let noms: Vec<&str> = beaute["sous_categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["nom"].as_str().unwrap())
        .collect();
    assert!(noms.contains(&"Coiffure"));
    assert!(noms.contains(&"Massage"));
}

#[tokio::test]
async fn test_public_provider_profile_and_services() {
    let Some(ctx) = TestContext::new().await else { return };
    let provider = ctx.subscribed_provider(3).await;
    seed_service(&ctx.pool, provider.id, 3000, 30).await;

    let (status, body) = ctx
        .send(get_request(&format!("/api/prestataires/{}", provider.id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], provider.id.to_string());

    let (status, services) = ctx
        .send(get_request(&format!("/api/prestataires/{}/services", provider.id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services.as_array().unwrap().len(), 1);

    let (status, body) = ctx
        .send(get_request(&format!("/api/prestataires/{}", Uuid::new_v4())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Prestataire introuvable");
}

#[tokio::test]
async fn test_plan_management_keeps_single_popular_plan() {
    let Some(ctx) = TestContext::new().await else { return };
    let admin = ctx.admin().await;

    let plan = |nom: &str| {
        json!({
            "nom": nom,
            "prix": 10000,
            "duree_jours": 30,
            "max_services": 10,
            "max_photos_par_service": 8,
            "fonctionnalites": ["Mise en avant"],
            "is_popular": true
        })
    };

    let (status, first) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/plans",
            plan("Premium A"),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["is_popular"], true);

    let (status, second) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/plans",
            plan("Premium B"),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let popular: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM plans_abonnement WHERE is_popular")
            .fetch_all(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(popular, vec![second["id"].as_str().unwrap().parse::<Uuid>().unwrap()]);

    let (status, updated) = ctx
        .send(json_request_with_auth(
            Method::PUT,
            &format!("/api/admin/plans/{}", first["id"].as_str().unwrap()),
            json!({ "is_popular": true, "prix": 12000 }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["is_popular"], true);
    assert_eq!(updated["prix"].as_f64(), Some(12000.0));

    let (status, _) = ctx
        .send(json_request_with_auth(
            Method::PUT,
            &format!("/api/admin/plans/{}", Uuid::new_v4()),
            json!({ "nom": "Fantôme" }),
            &admin.token,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, plans) = ctx.send(get_request("/api/plans")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(plans
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["nom"] == "Premium A" && p["is_popular"] == true));
}

#[tokio::test]
async fn test_plan_creation_requires_admin() {
    let Some(ctx) = TestContext::new().await else { return };
    let client = ctx.client().await;

    let (status, _) = ctx
        .send(json_request_with_auth(
            Method::POST,
            "/api/admin/plans",
            json!({
                "nom": "X",
                "prix": 1,
                "duree_jours": 30,
                "max_services": 1,
                "max_photos_par_service": 1
            }),
            &client.token,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
