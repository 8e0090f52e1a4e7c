use chrono::{Local, TimeZone, Utc};
use multi_toolbox::plugin::Plugin;
use multi_toolbox::plugins::timestamp::{
    convert, TimeUnit, TimestampConverter, TimestampPlugin, TimestampResult,
};

#[test]
fn epoch_in_seconds() {
    let result = convert("0", TimeUnit::Seconds);
    let view = result.view().expect("valid");
    assert_eq!(view.iso, "1970-01-01T00:00:00.000Z");
    assert_eq!(view.utc, "Thu, 01 Jan 1970 00:00:00 GMT");
    assert_eq!(view.unix_seconds, "0");
    let expected_local = Local
        .timestamp_opt(0, 0)
        .single()
        .unwrap()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    assert_eq!(view.local, expected_local);
}

#[test]
fn milliseconds_keep_fraction() {
    let result = convert("1700000000123", TimeUnit::Milliseconds);
    let view = result.view().expect("valid");
    assert_eq!(view.iso, "2023-11-14T22:13:20.123Z");
    assert_eq!(view.unix_seconds, "1700000000");
}

#[test]
fn garbage_is_invalid() {
    assert_eq!(convert("abc", TimeUnit::Seconds), TimestampResult::Invalid);
    assert_eq!(convert("", TimeUnit::Milliseconds), TimestampResult::Invalid);
}

#[test]
fn plugin_lists_every_rendering() {
    let plugin = TimestampPlugin;
    let results = plugin.search("ts 0");
    assert_eq!(results.len(), 6);
    assert_eq!(results[1].label, "1970-01-01T00:00:00.000Z");
    assert_eq!(results[1].action, "clipboard:1970-01-01T00:00:00.000Z");
    assert_eq!(results[5].desc, "Timestamp: Unix (Seconds)");
}

#[test]
fn plugin_reports_invalid() {
    let plugin = TimestampPlugin;
    let results = plugin.search("tsm nope");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "Invalid timestamp");
}

#[test]
fn now_fills_selected_unit() {
    let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
    let mut conv = TimestampConverter::default();
    conv.fill_now(now);
    assert_eq!(conv.input, "1700000000");
    conv.set_unit(TimeUnit::Milliseconds);
    conv.fill_now(now);
    assert_eq!(conv.input, "1700000000000");
    assert!(conv.result().view().is_some());
}
