use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub store_name: String,
    /// Storefront origin, no trailing slash. Canonical product links are
    /// built as `{store_url}/products/{slug}`.
    pub store_url: String,
    pub brand: String,
    /// ISO 4217 code appended to every rendered price.
    pub currency: String,
    /// Object-storage origin for relative image paths. Empty means relative
    /// paths cannot be resolved and the placeholder is used instead.
    pub storage_base_url: String,
    pub storage_subpath: String,
    pub placeholder_image_url: String,
    pub feed_cache_ttl_secs: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("store_name", &self.store_name)
            .field("store_url", &self.store_url)
            .field("brand", &self.brand)
            .field("currency", &self.currency)
            .field("storage_base_url", &self.storage_base_url)
            .field("storage_subpath", &self.storage_subpath)
            .field("placeholder_image_url", &self.placeholder_image_url)
            .field("feed_cache_ttl_secs", &self.feed_cache_ttl_secs)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
