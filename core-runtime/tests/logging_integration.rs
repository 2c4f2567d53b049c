//! Integration tests for logging system

use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_locator, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl LoggerSink for CollectingSink {
    fn log(&self, entry: LogEntry) -> bridge_traits::error::Result<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

// A global subscriber can only be installed once per process, so every
// assertion about `init_logging` lives in this one test.
#[test]
fn test_init_logging_installs_sink_once() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first init succeeds");

    tracing::info!(target: "core_playback::session", phase = "ready", "Engine ready");
    tracing::debug!(target: "core_playback::session", "below sink level");
    tracing::info!(target: "hyper", "filtered out by default directive");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Engine ready");
        assert_eq!(entries[0].fields.get("phase"), Some(&"ready".to_string()));
    }

    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());
}

#[test]
fn test_redacted_locator_hides_signature() {
    let url = url::Url::parse("https://cdn.media.ccc.de/congress/talk.mp4?token=s3cr3t").unwrap();
    let redacted = redact_locator(&url);
    assert!(!redacted.contains("s3cr3t"));
    assert!(redacted.starts_with("https://cdn.media.ccc.de/congress/talk.mp4"));
}
