use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::error;

use crate::events::{capture_stack, Extra};
use crate::raven_client::RavenClient;

// Set while a panic report is in flight. A panic raised by the report itself
// (in the sink, the encoder or the transport) runs this hook again and must
// not start another report.
static REPORTING: AtomicBool = AtomicBool::new(false);

struct ReportingGuard;

impl ReportingGuard {
    fn acquire() -> Option<Self> {
        (!REPORTING.swap(true, Ordering::AcqRel)).then_some(ReportingGuard)
    }
}

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTING.store(false, Ordering::Release);
    }
}

/// Reports every panic through `client` before handing over to the hook that
/// was installed previously (by default the one printing to stderr).
///
/// The report is sent from a short-lived thread with its own current-thread
/// runtime, so the hook works whether or not the panicking thread is inside a
/// tokio runtime. The panicking thread blocks until the report finishes.
/// Panics raised while a report is in flight, including by the report itself,
/// are only passed to the previous hook.
pub fn install_panic_hook(client: RavenClient) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        previous(info);

        let Some(_guard) = ReportingGuard::acquire() else {
            return;
        };

        let panic_value = panic_message(info.payload());
        let message = match info.location() {
            Some(location) => format!(
                "panicked at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            None => "panicked".to_string(),
        };
        let stack = capture_stack();
        let client = client.clone();

        let reporter = thread::spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(client.report_with_stack_quietly(
                    panic_value,
                    &message,
                    Extra::new(),
                    &stack,
                )),
                Err(e) => error!("Failed to start runtime for panic report: {}", e),
            }
        });

        if reporter.join().is_err() {
            error!("Panic reporter thread panicked");
        }
    }));
}

/// Text of a panic payload; `panic!` produces either `&str` or `String`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::diagnostics::DiagnosticSink;
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[derive(Default)]
    struct PanickingSink {
        calls: AtomicUsize,
    }

    impl DiagnosticSink for PanickingSink {
        fn record(&self, message: &str) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            panic!("sink failed on {message}");
        }
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn Any + Send> = Box::new(format!("formatted {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "Box<dyn Any>");
    }

    #[test]
    #[serial]
    fn test_hook_reports_panics() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sink = Arc::new(MemorySink::new());
        let client = RavenClient::setup(&format!("http://key@127.0.0.1:{}/5", port))
            .unwrap()
            .with_sink(sink.clone());

        install_panic_hook(client);
        let result = panic::catch_unwind(|| panic!("kaboom"));
        // back to the default hook
        let _ = panic::take_hook();

        assert!(result.is_err());
        let records = sink.records();
        let built = records
            .iter()
            .find(|r| r.starts_with("JSON body: "))
            .expect("event was not built");
        assert!(built.contains("\"type\":\"kaboom\""));
        assert!(built.contains("panicked at "));
        assert!(records.last().unwrap().starts_with("ERR: "));
    }

    #[test]
    #[serial]
    fn test_panicking_sink_does_not_reenter_hook() {
        let sink = Arc::new(PanickingSink::default());
        let client = RavenClient::setup("http://key@127.0.0.1:9/5")
            .unwrap()
            .with_sink(sink.clone());

        install_panic_hook(client);
        let result = panic::catch_unwind(|| panic!("first"));
        let _ = panic::take_hook();

        assert!(result.is_err());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
        assert!(!REPORTING.load(Ordering::SeqCst));
    }
}
