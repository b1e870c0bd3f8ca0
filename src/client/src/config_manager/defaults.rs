use crate::config_manager::ClientDefaults;
use crate::constants::{CLIENT_NAME, CLIENT_VERSION, PLATFORM, SENTRY_PROTOCOL_VERSION};

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            client_name: CLIENT_NAME.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            protocol_version: SENTRY_PROTOCOL_VERSION.to_string(),
            platform: PLATFORM.to_string(),

            request_timeout_ms: None,
            dsn: None,
        }
    }
}
