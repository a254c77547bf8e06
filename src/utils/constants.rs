//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 5 * 60;
// the identity endpoint does not report a ttl
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 60 * 60;

// Key-value store keys
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const AUTH_TOKEN_EXPIRY_KEY: &str = "auth_token_expiry";

// Upstream endpoints
pub const DEFAULT_IDENTITY_URL: &str = "https://console.snowplowanalytics.com";
pub const ATTRIBUTES_PATH: &str = "/api/v1/get-online-attributes";

// Inbound routes
pub const ATTRIBUTES_ROUTE: &str = "/attributes";
pub const HEALTH_ROUTE: &str = "/health";
pub const CACHE_STATUS_ROUTE: &str = "/api/cache-status";
pub const CACHE_STATUS_ALIAS_ROUTE: &str = "/cache-status";
pub const AVAILABLE_ENDPOINTS: [&str; 3] = [ATTRIBUTES_ROUTE, HEALTH_ROUTE, CACHE_STATUS_ROUTE];

// Default selector mapping
pub const SELECTOR_USER_ID: &str = "user_id";
pub const SELECTOR_DOMAIN_USERID: &str = "domain_userid";
pub const SERVICE_BATCH_ATTRIBUTES: &str = "batch_attributes";
pub const SERVICE_ECOM_ATTRIBUTES: &str = "ecom_attributes";
