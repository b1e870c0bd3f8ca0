use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLIENT_NAME, CLIENT_VERSION, ENV_PREFIX, PLATFORM, SENTRY_PROTOCOL_VERSION,
};
use crate::error::Result;
use config::{Config as RConfig, Environment, File};

/// Identifiers and transport settings injected into a [`crate::RavenClient`].
/// Never mutated once a client owns it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClientDefaults {
    pub client_name: String,
    pub client_version: String,
    pub protocol_version: String,
    pub platform: String,

    /// Per-request deadline. `None` keeps the HTTP client's own defaults.
    pub request_timeout_ms: Option<u64>,
    pub dsn: Option<String>,
}

impl ClientDefaults {
    /// Value sent as `User-Agent` and as `sentry_client` in the auth header.
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.client_name, self.client_version)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_default_config() -> Result<ClientDefaults> {
        Self::load_config(None)
    }

    /// Layers, lowest precedence first: built-in constants, the optional
    /// config file, then `RAVEN_*` environment variables.
    pub fn load_config(path: Option<&str>) -> Result<ClientDefaults> {
        let mut builder = RConfig::builder();

        // set defaults
        builder = builder
            .set_default("client_name", CLIENT_NAME)?
            .set_default("client_version", CLIENT_VERSION)?
            .set_default("protocol_version", SENTRY_PROTOCOL_VERSION)?
            .set_default("platform", PLATFORM)?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: ClientDefaults = builder.build()?.try_deserialize()?;

        Ok(config)
    }
}
