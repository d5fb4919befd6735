use serde_json::json;
use std::{cell::Cell, cmp::Ordering};

pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

thread_local! {
    static MIN_LEVEL: Cell<LogLevel> = const { Cell::new(DEFAULT_LOG_LEVEL) };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
                LogLevel::Error => 3,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

pub fn set_min_level(level: LogLevel) {
    MIN_LEVEL.with(|slot| slot.set(level));
}

pub fn min_level() -> LogLevel {
    MIN_LEVEL.with(Cell::get)
}

/// Builds the single-line JSON record for an event.
pub fn event_line(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert("ts".to_string(), serde_json::Value::Number(ts.into()));
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_string()),
    );
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload).to_string()
}

pub fn log_event(level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < min_level() {
        return;
    }

    sink::emit(level, &event_line(sink::now_unix_millis(), level, event, fields));
}

#[cfg(target_arch = "wasm32")]
mod sink {
    use super::LogLevel;
    use wasm_bindgen::JsValue;

    pub fn now_unix_millis() -> u64 {
        js_sys::Date::now() as u64
    }

    pub fn emit(level: LogLevel, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            LogLevel::Debug => web_sys::console::debug_1(&line),
            LogLevel::Info => web_sys::console::log_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod sink {
    use super::LogLevel;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn now_unix_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|value| value.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn emit(level: LogLevel, line: &str) {
        if level >= LogLevel::Warn {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

/// Raw navigation timing marks in milliseconds since the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NavigationTiming {
    pub navigation_start: f64,
    pub request_start: f64,
    pub response_end: f64,
    pub dom_loading: f64,
    pub dom_complete: f64,
    pub load_event_end: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMetrics {
    pub page_load_ms: u64,
    pub server_response_ms: u64,
    pub render_ms: u64,
}

impl NavigationTiming {
    /// `None` until the load event has finished and every mark is set.
    pub fn metrics(&self) -> Option<PageMetrics> {
        if self.load_event_end <= 0.0 || self.navigation_start <= 0.0 {
            return None;
        }

        let span = |start: f64, end: f64| (end - start).max(0.0).round() as u64;
        Some(PageMetrics {
            page_load_ms: span(self.navigation_start, self.load_event_end),
            server_response_ms: span(self.request_start, self.response_end),
            render_ms: span(self.dom_loading, self.dom_complete),
        })
    }
}

pub fn log_page_metrics(timing: &NavigationTiming) {
    let Some(metrics) = timing.metrics() else {
        log_event(LogLevel::Debug, "page_metrics_unavailable", json!({}));
        return;
    };

    log_event(
        LogLevel::Info,
        "page_metrics",
        json!({
            "page_load_ms": metrics.page_load_ms,
            "server_response_ms": metrics.server_response_ms,
            "render_ms": metrics.render_ms,
        }),
    );
}

/// `(text, css)` pairs printed with `%c` styling at startup.
pub const BRANDING: [(&str, &str); 3] = [
    (
        "%c◆ Decypher AI",
        "color: #70a9ff; font-size: 28px; font-weight: bold; text-shadow: 2px 2px 4px rgba(0,0,0,0.3); padding: 10px;",
    ),
    (
        "%cBuilt with premium design principles ✨",
        "color: #84e1bc; font-size: 14px; font-weight: 500;",
    ),
    (
        "%cInterested in joining our team? → careers@decypher.ai",
        "color: #9aa0a6; font-size: 12px;",
    ),
];
