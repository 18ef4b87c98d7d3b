use super::handlers::{auth, comments, content};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::PUT];

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins == "*" {
        return CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        // 凭据 Cookie 需要明确的来源和请求头
        tracing::info!("CORS enabled for origins: {:?}", origins);
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(origins)
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    }
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/session", get(auth::session))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/register", post(auth::register))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/update-profile", put(auth::update_profile))
        .route(
            "/api/auth/upload-avatar",
            post(auth::upload_avatar).layer(DefaultBodyLimit::max(auth::MAX_AVATAR_BYTES)),
        );

    let comment_routes = Router::new()
        .route("/api/comments/create", post(comments::create))
        .route("/api/comments/reply", post(comments::reply))
        .route("/api/comments/report", post(comments::report))
        .route("/api/comments/:relation", get(comments::list))
        .route("/api/comments/:relation/thread", get(comments::thread));

    let content_routes = Router::new()
        .route("/api/content/home", get(content::home))
        .route("/api/content/navigation", get(content::navigation))
        .route("/api/content/articles/:slug", get(content::article))
        .route("/api/content/categories/:slug", get(content::category))
        .route("/api/content/tags/:slug", get(content::tag))
        .route("/api/content/authors/:slug", get(content::author))
        .route("/api/content/partners", get(content::partners));

    Router::new()
        .merge(auth_routes)
        .merge(comment_routes)
        .merge(content_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
