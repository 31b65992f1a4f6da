//! LedgerPen Backend - library for app logic and testing

pub mod db;
pub mod email;
pub mod error;
pub mod logging;
pub mod routes;

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::error::AppError;

/// Origins the marketing site is served from. Overridable for staging via
/// ALLOWED_ORIGINS.
const DEFAULT_ORIGINS: [&str; 3] = [
    "https://ledgerpen.com",
    "https://www.ledgerpen.com",
    "http://localhost:3000",
];

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) when set, otherwise the fixed
/// site origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() { None } else { Some(origins) }
        })
        .unwrap_or_else(|| {
            DEFAULT_ORIGINS
                .iter()
                .map(|origin| origin.parse().unwrap())
                .collect()
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Unmatched routes get the same fail envelope as every other 4xx.
async fn fallback() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Create and configure the application router.
pub fn create_app() -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/clients",
            get(routes::clients::list_clients).post(routes::clients::create_client),
        )
        .route(
            "/api/clients/{id}",
            put(routes::clients::update_client)
                .patch(routes::clients::update_client)
                .delete(routes::clients::delete_client),
        )
        .route(
            "/api/services",
            get(routes::services::list_services).post(routes::services::create_service),
        )
        .route(
            "/api/services/{id}",
            get(routes::services::get_service)
                .put(routes::services::update_service)
                .patch(routes::services::update_service)
                .delete(routes::services::delete_service),
        )
        .route(
            "/api/portfolio",
            get(routes::portfolio::list_items).post(routes::portfolio::create_item),
        )
        .route(
            "/api/portfolio/featured",
            get(routes::portfolio::featured_items),
        )
        .route("/api/portfolio/latest", get(routes::portfolio::latest_items))
        .route("/api/portfolio/stats", get(routes::portfolio::portfolio_stats))
        .route("/api/portfolio/search", get(routes::portfolio::search_items))
        .route(
            "/api/portfolio/type/{type}",
            get(routes::portfolio::items_by_type),
        )
        .route(
            "/api/portfolio/category/{category}",
            get(routes::portfolio::items_by_category),
        )
        .route(
            "/api/portfolio/industry/{industry}",
            get(routes::portfolio::items_by_industry),
        )
        .route("/api/portfolio/blogs", get(routes::portfolio::list_blogs))
        .route("/api/portfolio/blog/{id}", get(routes::portfolio::get_blog))
        .route(
            "/api/portfolio/blog/{id}/related",
            get(routes::portfolio::related_blogs),
        )
        .route("/api/portfolio/videos", get(routes::portfolio::list_videos))
        .route(
            "/api/portfolio/videos/duration",
            get(routes::portfolio::videos_by_duration),
        )
        .route(
            "/api/portfolio/{id}",
            get(routes::portfolio::get_item)
                .put(routes::portfolio::update_item)
                .patch(routes::portfolio::update_item)
                .delete(routes::portfolio::delete_item),
        )
        .route(
            "/api/testimonials",
            get(routes::testimonials::list_testimonials)
                .post(routes::testimonials::create_testimonial),
        )
        .route(
            "/api/testimonials/{id}",
            put(routes::testimonials::update_testimonial)
                .patch(routes::testimonials::update_testimonial)
                .delete(routes::testimonials::delete_testimonial),
        )
        .route(
            "/api/contactus",
            post(routes::contact::create_contact).get(routes::contact::list_contacts),
        )
        .route(
            "/api/contactus/{id}",
            delete(routes::contact::delete_contact),
        )
        .route("/api/newsletter", post(routes::newsletter::subscribe))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .fallback(fallback)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    // Refuse to start in production with the insecure default JWT secret.
    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || secret == "default-jwt-secret-change-in-production" {
            panic!(
                "FATAL: JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
            );
        }
    }

    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without database.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
    }

    let app = create_app();

    // Bind address is configurable via HOST / PORT env vars.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_create_app_returns_router() {
        let _app = create_app();
        // Just test that it compiles and doesn't panic
    }

    #[test]
    fn test_default_origins_parse_as_header_values() {
        for origin in DEFAULT_ORIGINS {
            assert!(origin.parse::<HeaderValue>().is_ok());
        }
    }

    #[tokio::test]
    async fn test_unknown_route_gets_fail_envelope() {
        let app = create_app();
        let res = app
            .oneshot(
                Request::get("/api/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_health_ping_through_full_stack() {
        let app = create_app();
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_route_without_database_returns_unavailable() {
        let app = create_app();
        let res = app
            .oneshot(Request::get("/api/clients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
