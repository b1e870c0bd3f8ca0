// src/raven_client.rs
use std::fmt::Display;
use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info};

use crate::config_manager::ClientDefaults;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::dsn::Dsn;
use crate::error::{RavenError, Result};
use crate::events::{capture_stack, Event, Extra};
use crate::exporters::encoder::encode_json;
use crate::exporters::transport::{send_event_payload, Delivery};

/// Parsed DSN plus everything needed to report events to it.
///
/// Built once from a single DSN string and never mutated; clones share the
/// HTTP connection pool and the diagnostic sink, so one client can serve
/// concurrent reports.
#[derive(Clone)]
pub struct RavenClient {
    dsn: Dsn,
    defaults: ClientDefaults,
    http: Client,
    sink: Arc<dyn DiagnosticSink>,
}

impl RavenClient {
    /// Parses `dsn` and builds a client with the built-in defaults.
    pub fn setup(dsn: &str) -> Result<RavenClient> {
        Self::new(dsn, ClientDefaults::default(), Arc::new(TracingSink))
    }

    pub fn new(
        dsn: &str,
        defaults: ClientDefaults,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<RavenClient> {
        let dsn = Dsn::parse(dsn)?;
        info!(
            "Initializing RavenClient for project {} at {}",
            dsn.project_id, dsn.host
        );

        Ok(RavenClient {
            dsn,
            defaults,
            http: Client::new(),
            sink,
        })
    }

    /// Uses the DSN carried by the loaded configuration.
    pub fn from_defaults(defaults: ClientDefaults) -> Result<RavenClient> {
        let dsn = defaults
            .dsn
            .clone()
            .ok_or_else(|| RavenError::invalid_dsn("", "no DSN configured"))?;
        Self::new(&dsn, defaults, Arc::new(TracingSink))
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> RavenClient {
        self.sink = sink;
        self
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    pub fn build_event(
        &self,
        panic_value: impl Display,
        message: &str,
        extra: Extra,
        stack: &str,
    ) -> Event {
        Event::from_panic(
            &self.dsn.project_id,
            &self.defaults.platform,
            &panic_value.to_string(),
            message,
            stack,
            extra,
        )
    }

    /// Reports an error with the caller's current stack. Encoding and transport
    /// failures are returned; a response of any status counts as delivered.
    pub async fn report(
        &self,
        panic_value: impl Display + Send,
        message: &str,
        extra: Extra,
    ) -> Result<Delivery> {
        let stack = capture_stack();
        self.report_with_stack(panic_value, message, extra, &stack)
            .await
    }

    pub async fn report_with_stack(
        &self,
        panic_value: impl Display + Send,
        message: &str,
        extra: Extra,
        stack: &str,
    ) -> Result<Delivery> {
        let event = self.build_event(panic_value, message, extra, stack);

        self.sink.record(&format!("Built event: {:?}", event));
        let json = serde_json::to_vec(&event)?;
        self.sink
            .record(&format!("JSON body: {}", String::from_utf8_lossy(&json)));

        let payload = encode_json(&json)?;
        let delivery =
            send_event_payload(&self.http, &self.dsn, &self.defaults, payload).await?;
        self.sink.record(&format!(
            "Response: {} {}",
            delivery.status, delivery.body
        ));

        Ok(delivery)
    }

    /// Fire-and-forget variant of [`RavenClient::report`]: failures only reach
    /// the diagnostic sink and the log.
    pub async fn report_quietly(
        &self,
        panic_value: impl Display + Send,
        message: &str,
        extra: Extra,
    ) {
        let stack = capture_stack();
        self.report_with_stack_quietly(panic_value, message, extra, &stack)
            .await
    }

    pub async fn report_with_stack_quietly(
        &self,
        panic_value: impl Display + Send,
        message: &str,
        extra: Extra,
        stack: &str,
    ) {
        if let Err(e) = self
            .report_with_stack(panic_value, message, extra, stack)
            .await
        {
            self.sink.record(&format!("ERR: {}", e));
            error!("Failed to report event: {}", e);
        }
    }
}

impl std::fmt::Debug for RavenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RavenClient")
            .field("dsn", &self.dsn.to_string())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
