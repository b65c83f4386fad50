use std::{
    collections::HashMap,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Request, State},
    http::{
        header::{CONTENT_TYPE, RETRY_AFTER, USER_AGENT},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::RegexSet;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// User-agent fragments exempt from rate limiting: search-engine and
/// shopping crawlers that are expected to poll the feed.
const CRAWLER_PATTERNS: &[&str] = &[
    "googlebot",
    "storebot-google",
    "google-shopping",
    "adsbot-google",
    "bingbot",
    "yandex",
    "baiduspider",
    "duckduckbot",
    "slurp",
    "facebookexternalhit",
    "pinterestbot",
];

/// Entries swept from the client map once it grows past this size; keeps the
/// map bounded over the process lifetime.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Outcome of a rate-limit check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Fixed-window limiter keyed by client network identity, with a crawler
/// allow-list.
#[derive(Debug, Clone)]
pub struct FeedRateLimitState {
    max_requests: usize,
    window: Duration,
    crawlers: Arc<RegexSet>,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl FeedRateLimitState {
    /// # Panics
    ///
    /// Panics if the built-in crawler patterns fail to compile, which would
    /// be a programming error caught by tests.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let crawlers = regex::RegexSetBuilder::new(CRAWLER_PATTERNS)
            .case_insensitive(true)
            .build()
            .expect("crawler allow-list patterns must compile");

        Self {
            max_requests,
            window,
            crawlers: Arc::new(crawlers),
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn is_crawler(&self, user_agent: &str) -> bool {
        self.crawlers.is_match(user_agent)
    }

    /// Counts one request against `key` and decides whether it may proceed.
    ///
    /// The window resets once its duration has elapsed. A rejected request
    /// is not counted, so a client probing while limited does not extend its
    /// penalty.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let mut clients = self.clients.lock().await;

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| w.started_at.elapsed() < window);
        }

        let entry = clients
            .entry(key.to_string())
            .or_insert_with(|| ClientWindow {
                started_at: Instant::now(),
                count: 0,
            });

        if entry.started_at.elapsed() >= self.window {
            entry.started_at = Instant::now();
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            return RateLimitDecision::Limited {
                retry_after_secs: self.window.as_secs(),
            };
        }

        entry.count += 1;
        RateLimitDecision::Allowed
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware guarding the feed endpoint: crawler user-agents pass through,
/// everyone else is counted per client key. Rejection happens before the
/// handler runs, so a limited request never reaches the database.
pub async fn enforce_feed_rate_limit(
    State(rate_limit): State<FeedRateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if rate_limit.is_crawler(user_agent) {
        return next.run(req).await;
    }

    let key = client_key(req.headers());
    match rate_limit.check(&key).await {
        RateLimitDecision::Allowed => next.run(req).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            tracing::warn!(client = %key, "feed rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [
                    (RETRY_AFTER, retry_after_secs.to_string()),
                    (CONTENT_TYPE, "text/plain".to_string()),
                ],
                "rate limit exceeded, retry later\n",
            )
                .into_response()
        }
    }
}

/// Client identity for rate limiting: the first hop of `x-forwarded-for`,
/// then `x-real-ip`, then a shared bucket for direct connections without
/// proxy headers.
fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(max: usize, window_secs: u64) -> FeedRateLimitState {
        FeedRateLimitState::new(max, Duration::from_secs(window_secs))
    }

    #[test]
    fn crawler_match_is_case_insensitive_substring() {
        let s = state(10, 3600);
        assert!(s.is_crawler(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        ));
        assert!(s.is_crawler("Mozilla/5.0 (compatible; BingBot/2.0)"));
        assert!(s.is_crawler("Storebot-Google/1.0"));
        assert!(!s.is_crawler("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"));
        assert!(!s.is_crawler(""));
    }

    #[test]
    fn client_key_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("41.90.12.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "41.90.12.7");
    }

    #[test]
    fn client_key_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "10.0.0.2");

        assert_eq!(client_key(&HeaderMap::new()), "unknown");
    }

    #[tokio::test]
    async fn requests_over_the_limit_are_rejected() {
        let s = state(3, 3600);
        for _ in 0..3 {
            assert_eq!(s.check("41.90.12.7").await, RateLimitDecision::Allowed);
        }
        assert_eq!(
            s.check("41.90.12.7").await,
            RateLimitDecision::Limited {
                retry_after_secs: 3600
            }
        );
    }

    #[tokio::test]
    async fn limits_are_tracked_per_client_key() {
        let s = state(1, 3600);
        assert_eq!(s.check("41.90.12.7").await, RateLimitDecision::Allowed);
        assert_eq!(s.check("197.248.1.1").await, RateLimitDecision::Allowed);
        assert!(matches!(
            s.check("41.90.12.7").await,
            RateLimitDecision::Limited { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn window_elapse_resets_the_counter() {
        let s = state(2, 3600);
        assert_eq!(s.check("k").await, RateLimitDecision::Allowed);
        assert_eq!(s.check("k").await, RateLimitDecision::Allowed);
        assert!(matches!(s.check("k").await, RateLimitDecision::Limited { .. }));

        tokio::time::advance(Duration::from_secs(3601)).await;
        assert_eq!(s.check("k").await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_requests_do_not_extend_the_window() {
        let s = state(1, 3600);
        assert_eq!(s.check("k").await, RateLimitDecision::Allowed);

        // Probe while limited, half way through the window.
        tokio::time::advance(Duration::from_secs(1800)).await;
        assert!(matches!(s.check("k").await, RateLimitDecision::Limited { .. }));

        // The original window still expires on schedule.
        tokio::time::advance(Duration::from_secs(1801)).await;
        assert_eq!(s.check("k").await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_expired_entries_once_threshold_is_passed() {
        let s = state(10, 3600);
        for i in 0..=SWEEP_THRESHOLD {
            let _ = s.check(&format!("client-{i}")).await;
        }
        tokio::time::advance(Duration::from_secs(3601)).await;

        // This check triggers the sweep; all prior windows have expired.
        let _ = s.check("fresh-client").await;
        let clients = s.clients.lock().await;
        assert_eq!(clients.len(), 1);
        assert!(clients.contains_key("fresh-client"));
    }
}
