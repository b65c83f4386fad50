mod feed;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::cache::FeedCache;
use crate::middleware::{enforce_feed_rate_limit, request_id, FeedRateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: FeedCache,
    pub config: Arc<dukafeed_core::AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn feed_router(rate_limit: FeedRateLimitState) -> Router<AppState> {
    Router::new()
        .route("/feed.xml", get(feed::serve_feed))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_feed_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: FeedRateLimitState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(feed_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match dukafeed_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_config() -> dukafeed_core::AppConfig {
        dukafeed_core::AppConfig {
            database_url: "postgres://unused".to_string(),
            env: dukafeed_core::Environment::Test,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            log_level: "info".to_string(),
            store_name: "Duka Kenya".to_string(),
            store_url: "https://shop.example.co.ke".to_string(),
            brand: "Duka Kenya".to_string(),
            currency: "KES".to_string(),
            storage_base_url: "https://storage.example.co.ke".to_string(),
            storage_subpath: "products".to_string(),
            placeholder_image_url: "https://shop.example.co.ke/images/placeholder.png"
                .to_string(),
            feed_cache_ttl_secs: 3600,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 3600,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
        }
    }

    fn test_state(pool: sqlx::PgPool) -> AppState {
        AppState {
            pool,
            cache: FeedCache::new(Duration::from_secs(3600)),
            config: Arc::new(test_config()),
        }
    }

    /// Stub router exercising only the rate-limit middleware, no database.
    fn rate_limited_stub() -> Router {
        let rate_limit = FeedRateLimitState::new(10, Duration::from_secs(3600));
        Router::new()
            .route("/feed.xml", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                rate_limit,
                enforce_feed_rate_limit,
            ))
    }

    fn feed_request(user_agent: &str) -> Request<Body> {
        Request::builder()
            .uri("/feed.xml")
            .header("user-agent", user_agent)
            .header("x-forwarded-for", "41.90.12.7")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn eleventh_request_in_window_is_rejected_with_retry_after() {
        let app = rate_limited_stub();

        for i in 0..10 {
            let response = app
                .clone()
                .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK, "request {i} should pass");
        }

        let response = app
            .clone()
            .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("3600")
        );
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/plain")
        );
    }

    #[tokio::test]
    async fn crawlers_are_never_rate_limited() {
        let app = rate_limited_stub();
        let crawler_ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

        for i in 0..12 {
            let response = app
                .clone()
                .oneshot(feed_request(crawler_ua))
                .await
                .expect("response");
            assert_eq!(
                response.status(),
                StatusCode::OK,
                "crawler request {i} should pass"
            );
        }
    }

    // -------------------------------------------------------------------------
    // Feed endpoint — integration tests (with DB)
    // -------------------------------------------------------------------------

    async fn seed_product(pool: &sqlx::PgPool, id: &str) {
        sqlx::query(
            "INSERT INTO products (id, name, slug, price, compare_at_price, status, images) \
             VALUES ($1, $2, $3, 1000, 1200, 'active', \
                     '[{\"url\": \"https://cdn.example/a.jpg\"}]'::jsonb)",
        )
        .bind(id)
        .bind(format!("Product {id}"))
        .bind(format!("product-{}", id.to_lowercase()))
        .execute(pool)
        .await
        .expect("seed product");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn feed_returns_xml_with_cache_headers(pool: sqlx::PgPool) {
        seed_product(&pool, "P1").await;

        let app = build_app(
            test_state(pool),
            FeedRateLimitState::new(10, Duration::from_secs(3600)),
        );
        let response = app
            .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/xml")
        );
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("public, max-age=3600, stale-while-revalidate=86400")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let xml = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(xml.contains("<g:id>P1</g:id>"));
        assert!(xml.contains("<g:price>1200.00 KES</g:price>"));
        assert!(xml.contains("<g:sale_price>1000.00 KES</g:sale_price>"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn repeated_requests_within_window_serve_identical_bytes(pool: sqlx::PgPool) {
        seed_product(&pool, "P1").await;

        let app = build_app(
            test_state(pool.clone()),
            FeedRateLimitState::new(10, Duration::from_secs(3600)),
        );

        let first = app
            .clone()
            .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
            .await
            .expect("response");
        let first_body = to_bytes(first.into_body(), usize::MAX).await.expect("body");

        // A catalog change between requests must not show up while the cache
        // window is open.
        seed_product(&pool, "P2").await;

        let second = app
            .clone()
            .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
            .await
            .expect("response");
        let second_body = to_bytes(second.into_body(), usize::MAX)
            .await
            .expect("body");

        assert_eq!(first_body, second_body);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn empty_catalog_returns_500_error_document(pool: sqlx::PgPool) {
        let app = build_app(
            test_state(pool),
            FeedRateLimitState::new(10, Duration::from_secs(3600)),
        );
        let response = app
            .oneshot(feed_request("Mozilla/5.0 Firefox/128.0"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/xml")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let xml = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(xml.contains("<title>Error</title>"));

        let mut reader = quick_xml::Reader::from_str(&xml);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("error document should parse cleanly: {e}"),
            }
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok_with_live_database(pool: sqlx::PgPool) {
        let app = build_app(
            test_state(pool),
            FeedRateLimitState::new(10, Duration::from_secs(3600)),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert_eq!(json["data"]["database"].as_str(), Some("ok"));
    }
}
