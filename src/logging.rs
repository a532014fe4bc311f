use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

static ENABLED: AtomicBool = AtomicBool::new(false);

#[derive(Clone, Debug, Serialize)]
struct LogLine<'a> {
    timestamp: String,
    level: &'a str,
    event: &'a str,
    details: Value,
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn emit(level: &str, event: &str, details: Value) {
    if !is_enabled() {
        return;
    }
    match format_line(level, event, details) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[keychase] failed to encode log line {event}: {error}"),
    }
}

fn format_line(level: &str, event: &str, details: Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&LogLine {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        event,
        details,
    })
}
