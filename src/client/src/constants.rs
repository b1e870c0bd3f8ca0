pub const CLIENT_NAME: &str = "raven-rust";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SENTRY_PROTOCOL_VERSION: &str = "2.0";
pub const PLATFORM: &str = "rust";

// second precision, no offset: "2025-05-01T12:12:12"
pub const AUTH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const PAYLOAD_CONTENT_TYPE: &str = "application/octet-stream";
pub const SENTRY_AUTH_HEADER: &str = "X-Sentry-Auth";

pub const ENV_PREFIX: &str = "RAVEN";
