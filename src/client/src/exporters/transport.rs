use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config_manager::ClientDefaults;
use crate::constants::{AUTH_TIMESTAMP_FORMAT, PAYLOAD_CONTENT_TYPE, SENTRY_AUTH_HEADER};
use crate::dsn::Dsn;
use crate::error::Result;
use crate::events::Event;
use crate::exporters::encoder::encode_event;

/// Outcome of a request that reached the server, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub body: String,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Value of the `X-Sentry-Auth` header. `sentry_secret` is always present,
/// with an empty value when the DSN has no secret key.
pub fn auth_header(dsn: &Dsn, defaults: &ClientDefaults, timestamp: DateTime<Utc>) -> String {
    format!(
        "Sentry sentry_version={}, sentry_client={}, sentry_timestamp={}, sentry_key={}, sentry_secret={}",
        defaults.protocol_version,
        defaults.user_agent(),
        timestamp.format(AUTH_TIMESTAMP_FORMAT),
        dsn.public_key,
        dsn.secret_key,
    )
}

pub async fn send_event(
    client: &Client,
    dsn: &Dsn,
    defaults: &ClientDefaults,
    event: &Event,
) -> Result<Delivery> {
    let payload = encode_event(event)?;
    send_event_payload(client, dsn, defaults, payload).await
}

/// POSTs an encoded payload to the project's store endpoint in a single
/// attempt. Non-2xx responses are returned in the [`Delivery`], not as errors.
pub async fn send_event_payload(
    client: &Client,
    dsn: &Dsn,
    defaults: &ClientDefaults,
    payload: Vec<u8>,
) -> Result<Delivery> {
    let url = dsn.store_url();

    let mut request = client
        .post(&url)
        .header(SENTRY_AUTH_HEADER, auth_header(dsn, defaults, Utc::now()))
        .header(USER_AGENT, defaults.user_agent())
        .header(CONTENT_TYPE, PAYLOAD_CONTENT_TYPE)
        .body(payload);

    if let Some(timeout) = defaults.request_timeout() {
        request = request.timeout(timeout)
    }

    let response = request.send().await?;

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if status.is_success() {
        debug!("Event accepted by {}: {} {}", url, status, body);
    } else {
        warn!("Event rejected by {}: {} {}", url, status, body);
    }

    Ok(Delivery {
        status: status.as_u16(),
        body,
    })
}
