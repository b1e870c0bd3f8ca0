use thiserror::Error;

pub type Result<T> = std::result::Result<T, RavenError>;

/// Failures surfaced by the reporting pipeline.
///
/// `InvalidDsn` is returned from setup; `Encoding` and `Transport` come out of
/// [`crate::RavenClient::report`] and are only logged by `report_quietly`.
#[derive(Error, Debug)]
pub enum RavenError {
    #[error("invalid DSN `{dsn}`: {reason}")]
    InvalidDsn { dsn: String, reason: String },

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to encode event payload: {0}")]
    Encoding(#[from] std::io::Error),

    #[error("failed to send event: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl RavenError {
    pub fn invalid_dsn<D: Into<String>, R: Into<String>>(dsn: D, reason: R) -> Self {
        Self::InvalidDsn {
            dsn: dsn.into(),
            reason: reason.into(),
        }
    }

    /// Serialization and compression failures both belong to the encoding stage.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Serialize(_) | Self::Encoding(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
