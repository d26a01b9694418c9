use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use persistence::changes::ChangeHub;
use shared::jwt::TokenSigner;
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
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{auth, calendar, changes, chats, families, health, messages, profile, uploads};
use crate::services::uploads::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub signer: Arc<TokenSigner>,
    pub change_hub: ChangeHub,
    pub uploads: UploadStore,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let signer = Arc::new(TokenSigner::new(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.access_token_expiry_secs,
        config.jwt.refresh_token_expiry_secs,
        config.jwt.leeway_secs,
    )?);

    // rate_limit_per_minute = 0 disables rate limiting
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        signer,
        change_hub: ChangeHub::new(),
        uploads: UploadStore::new(&config.uploads.dir, config.uploads.max_size_bytes),
        rate_limiter,
    };

    Ok(build_router(config, state))
}

fn build_router(config: Arc<Config>, state: AppState) -> Router {
    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
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

    // Session endpoints: no bearer token, rate limited by peer address.
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Everything else requires a valid access token. Rate limiting runs
    // after auth so it can key on the user.
    let protected_routes = Router::new()
        // Profile
        .route("/api/v1/me", get(profile::get_me).patch(profile::update_me))
        // Families
        .route("/api/v1/families", post(families::create_family))
        .route("/api/v1/families/join", post(families::join_family))
        .route("/api/v1/families/members", get(families::list_members))
        .route("/api/v1/families/deputy", put(families::set_deputy))
        .route(
            "/api/v1/families/members/:member_id",
            delete(families::remove_member),
        )
        .route("/api/v1/families/leave", post(families::leave_family))
        // Calendar
        .route(
            "/api/v1/calendar",
            get(calendar::list_items).post(calendar::create_item),
        )
        .route(
            "/api/v1/calendar/:item_id",
            put(calendar::update_item).delete(calendar::delete_item),
        )
        .route(
            "/api/v1/calendar/:item_id/complete",
            post(calendar::complete_item),
        )
        .route("/api/v1/leaderboard", get(calendar::leaderboard))
        // Chats and messages
        .route("/api/v1/chats", get(chats::list_chats).post(chats::create_chat))
        .route(
            "/api/v1/chats/:chat_id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/api/v1/chats/:chat_id/read", post(messages::mark_read))
        .route("/api/v1/messages/:message_id", delete(messages::delete_message))
        // Uploads
        .route("/api/v1/uploads", post(uploads::upload_blob))
        .route("/api/v1/uploads/:reference", get(uploads::download_blob))
        // Change stream
        .route("/api/v1/changes/ws", get(changes::change_stream))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Auth runs first (outermost route layer)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        // Global middleware (bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
