use crate::actions::Action;
use crate::plugin::Plugin;
use crate::plugins::base_convert::parse_int_prefix;
use chrono::{DateTime, Local, Utc};

/// Largest distance from the epoch a calendar date may have, in milliseconds.
pub const MAX_TIMESTAMP_MS: i64 = 8_640_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    fn to_millis(self, value: i64) -> Option<i64> {
        match self {
            TimeUnit::Seconds => value.checked_mul(1000),
            TimeUnit::Milliseconds => Some(value),
        }
    }
}

/// All renderings of a valid instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampView {
    pub local: String,
    pub iso: String,
    pub utc: String,
    pub date: String,
    pub time: String,
    pub unix_seconds: String,
}

impl TimestampView {
    fn from_utc(dt: DateTime<Utc>) -> Self {
        let local = dt.with_timezone(&Local);
        Self {
            local: local.format("%Y-%m-%d %H:%M:%S").to_string(),
            iso: dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            utc: dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            date: local.format("%a %b %d %Y").to_string(),
            time: local.format("%H:%M:%S GMT%z").to_string(),
            unix_seconds: dt.timestamp_millis().div_euclid(1000).to_string(),
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 6] {
        [
            ("Local Time", self.local.as_str()),
            ("ISO 8601", self.iso.as_str()),
            ("UTC Time", self.utc.as_str()),
            ("Date String", self.date.as_str()),
            ("Time String", self.time.as_str()),
            ("Unix (Seconds)", self.unix_seconds.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampResult {
    Valid(TimestampView),
    Invalid,
}

impl TimestampResult {
    pub fn view(&self) -> Option<&TimestampView> {
        match self {
            TimestampResult::Valid(v) => Some(v),
            TimestampResult::Invalid => None,
        }
    }
}

pub fn convert(input: &str, unit: TimeUnit) -> TimestampResult {
    let Some(value) = parse_int_prefix(input, 10).and_then(|v| i64::try_from(v).ok()) else {
        return TimestampResult::Invalid;
    };
    let Some(ms) = unit.to_millis(value) else {
        return TimestampResult::Invalid;
    };
    if ms.unsigned_abs() > MAX_TIMESTAMP_MS as u64 {
        return TimestampResult::Invalid;
    }
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => TimestampResult::Valid(TimestampView::from_utc(dt)),
        None => TimestampResult::Invalid,
    }
}

/// The value the "now" shortcut writes into the input.
pub fn now_string(unit: TimeUnit, now: DateTime<Utc>) -> String {
    match unit {
        TimeUnit::Seconds => now.timestamp().to_string(),
        TimeUnit::Milliseconds => now.timestamp_millis().to_string(),
    }
}

/// Input state of the timestamp converter view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampConverter {
    pub input: String,
    pub unit: TimeUnit,
}

impl Default for TimestampConverter {
    fn default() -> Self {
        Self {
            input: now_string(TimeUnit::Seconds, Utc::now()),
            unit: TimeUnit::Seconds,
        }
    }
}

impl TimestampConverter {
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn set_unit(&mut self, unit: TimeUnit) {
        self.unit = unit;
    }

    pub fn fill_now(&mut self, now: DateTime<Utc>) {
        self.input = now_string(self.unit, now);
    }

    pub fn result(&self) -> TimestampResult {
        convert(&self.input, self.unit)
    }
}

pub struct TimestampPlugin;

impl Plugin for TimestampPlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        const PREFIX: &str = "ts ";
        const MS_PREFIX: &str = "tsm ";
        let trimmed = query.trim_start();
        let (arg, unit) = if let Some(rest) = crate::common::strip_prefix_ci(trimmed, MS_PREFIX) {
            (rest.trim(), TimeUnit::Milliseconds)
        } else if let Some(rest) = crate::common::strip_prefix_ci(trimmed, PREFIX) {
            (rest.trim(), TimeUnit::Seconds)
        } else {
            return Vec::new();
        };
        if arg.is_empty() {
            return Vec::new();
        }
        let arg = if arg.eq_ignore_ascii_case("now") {
            now_string(unit, Utc::now())
        } else {
            arg.to_string()
        };
        match convert(&arg, unit) {
            TimestampResult::Valid(view) => view
                .rows()
                .iter()
                .map(|(label, value)| Action {
                    label: value.to_string(),
                    desc: format!("Timestamp: {label}"),
                    action: format!("clipboard:{value}"),
                    args: None,
                })
                .collect(),
            TimestampResult::Invalid => vec![Action::new(
                "Invalid timestamp",
                "Timestamp",
                "query:ts ",
            )],
        }
    }

    fn name(&self) -> &str {
        "timestamp"
    }

    fn description(&self) -> &str {
        "Convert unix timestamps (prefix: `ts` seconds, `tsm` milliseconds)"
    }

    fn commands(&self) -> Vec<Action> {
        vec![
            Action::new("ts <value>", "Timestamp", "query:ts "),
            Action::new("tsm <value>", "Timestamp", "query:tsm "),
        ]
    }
}
