pub mod stack;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::utils::system_info::hostname;
pub use stack::{capture_stack, frames_from_stack, stack_lines};

/// Free-form key/value data attached to an event.
pub type Extra = BTreeMap<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Fatal,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
        }
    }
}

/// One entry of a captured call stack. Only `abs_path` is filled in: it holds
/// the raw stack line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub abs_path: String,
    pub filename: String,
    pub module: String,
    pub function: String,
    pub lineno: String,
    pub context_line: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Stacktrace {
    pub frames: Vec<Frame>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionInfo {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub module: String,
}

/// A single error report in the store-endpoint wire shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub message: String,
    pub project: String,
    pub timestamp: DateTime<Utc>,
    pub event_id: String,
    pub server_name: String,
    pub level: Level,
    #[serde(rename = "sentry.interfaces.Stacktrace")]
    pub stacktrace: Stacktrace,
    pub platform: String,
    pub context_lines: Vec<String>,
    #[serde(rename = "sentry.interfaces.Exception")]
    pub exception: ExceptionInfo,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
}

impl Event {
    /// Assembles an error-level event from a panic value and raw stack text,
    /// stamping it with a fresh id, the current time and the local hostname.
    pub fn from_panic(
        project: &str,
        platform: &str,
        panic_value: &str,
        message: &str,
        stack: &str,
        extra: Extra,
    ) -> Self {
        Event {
            message: message.to_string(),
            project: project.to_string(),
            timestamp: Utc::now(),
            event_id: Uuid::new_v4().to_string(),
            server_name: hostname(),
            level: Level::Error,
            stacktrace: Stacktrace {
                frames: frames_from_stack(stack),
            },
            platform: platform.to_string(),
            context_lines: stack_lines(stack),
            exception: ExceptionInfo {
                value: stack.to_string(),
                kind: panic_value.to_string(),
                module: String::new(),
            },
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STACK: &str = "   0: app::handler\n             at ./src/handler.rs:12:9\n   1: app::main";

    fn sample_event() -> Event {
        Event::from_panic("1234", "rust", "boom", "something broke", STACK, Extra::new())
    }

    #[test]
    fn test_from_panic_fills_fixed_fields() {
        let event = sample_event();

        assert_eq!(event.message, "something broke");
        assert_eq!(event.project, "1234");
        assert_eq!(event.level, Level::Error);
        assert_eq!(event.platform, "rust");
        assert_eq!(event.exception.kind, "boom");
        assert_eq!(event.exception.value, STACK);
        assert_eq!(event.exception.module, "");
        assert_eq!(event.context_lines.len(), 3);
        assert_eq!(event.stacktrace.frames.len(), 3);
        assert_eq!(
            event.stacktrace.frames[1].abs_path,
            "             at ./src/handler.rs:12:9"
        );
        assert!(Uuid::parse_str(&event.event_id).is_ok());
    }

    #[test]
    fn test_event_ids_are_unique() {
        assert_ne!(sample_event().event_id, sample_event().event_id);
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(sample_event()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "message",
            "project",
            "timestamp",
            "event_id",
            "server_name",
            "level",
            "sentry.interfaces.Stacktrace",
            "platform",
            "context_lines",
            "sentry.interfaces.Exception",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("extra"));
        assert_eq!(value["level"], "error");
        assert_eq!(value["sentry.interfaces.Exception"]["type"], "boom");

        let frame = &value["sentry.interfaces.Stacktrace"]["frames"][0];
        assert_eq!(frame["abs_path"], "   0: app::handler");
        for key in ["filename", "module", "function", "lineno", "context_line"] {
            assert_eq!(frame[key], "", "{key} should be empty");
        }
    }

    #[test]
    fn test_extra_is_serialized_when_present() {
        let mut extra = Extra::new();
        extra.insert("user_id".to_string(), json!(42));
        let event = Event::from_panic("1", "rust", "boom", "msg", STACK, extra);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["extra"]["user_id"], 42);
    }

    #[test]
    fn test_level_display_matches_wire() {
        for level in [Level::Debug, Level::Info, Level::Warning, Level::Error, Level::Fatal] {
            let wire = serde_json::to_value(level).unwrap();
            assert_eq!(wire, level.to_string());
        }
    }
}
