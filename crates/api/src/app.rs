use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    avis, catalog, health, notifications, plans, reservations, services, wave_transactions,
};
use crate::services::NotificationDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub notifier: NotificationDispatcher,
}

/// Builds the router. Fails only if the JWT secret is unusable.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);
    let jwt = Arc::new(JwtConfig::new(&config.jwt.secret, config.jwt.leeway_secs)?);

    // None when rate_limit_per_minute is 0
    let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        notifier: NotificationDispatcher::new(pool.clone()),
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes; role checks happen in the services.
    // Middleware order: auth runs first, then rate limiting keyed by user.
    let protected_routes = Router::new()
        .route("/api/subscription", get(services::get_subscription))
        .route("/api/services", post(services::create_service))
        .route("/api/services/quota", get(services::get_quota))
        .route(
            "/api/services/:id",
            put(services::update_service).delete(services::delete_service),
        )
        .route(
            "/api/wave-transactions",
            post(wave_transactions::submit_transaction)
                .get(wave_transactions::list_own_transactions),
        )
        .route(
            "/api/reservations",
            post(reservations::create_reservation).get(reservations::list_reservations),
        )
        .route("/api/reservations/:id", get(reservations::get_reservation))
        .route(
            "/api/reservations/:id/historique",
            get(reservations::get_history),
        )
        .route(
            "/api/reservations/:id/accept",
            post(reservations::accept_reservation),
        )
        .route(
            "/api/reservations/:id/reject",
            post(reservations::reject_reservation),
        )
        .route(
            "/api/reservations/:id/complete",
            post(reservations::complete_reservation),
        )
        .route(
            "/api/reservations/:id/cancel",
            post(reservations::cancel_reservation),
        )
        .route("/api/avis", post(avis::create_avis))
        .route("/api/avis/:id", axum::routing::delete(avis::delete_avis))
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route(
            "/api/admin/wave-transactions",
            get(wave_transactions::admin_list_transactions),
        )
        .route(
            "/api/admin/wave-transactions/:id/validate",
            post(wave_transactions::validate_transaction),
        )
        .route(
            "/api/admin/wave-transactions/:id/reject",
            post(wave_transactions::reject_transaction),
        )
        .route("/api/admin/plans", post(plans::create_plan))
        .route("/api/admin/plans/:id", put(plans::update_plan))
        .route(
            "/api/admin/avis/bulk-moderate",
            post(avis::bulk_moderate_avis),
        )
        .route("/api/admin/avis/:id/moderate", post(avis::moderate_avis))
        .route(
            "/api/admin/notifications/broadcast",
            post(notifications::broadcast),
        )
        .route(
            "/api/admin/notifications/targeted",
            post(notifications::targeted),
        )
        .route(
            "/api/admin/notifications/template",
            post(notifications::template),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/plans", get(plans::list_plans))
        .route("/api/prestataires/:id", get(catalog::get_prestataire))
        .route(
            "/api/prestataires/:id/services",
            get(catalog::list_prestataire_services),
        )
        .route(
            "/api/prestataires/:id/avis",
            get(catalog::list_prestataire_avis),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
