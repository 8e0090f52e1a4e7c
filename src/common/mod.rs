pub fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Current wall clock time in milliseconds since the unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::strip_prefix_ci;

    #[test]
    fn strips_case_insensitively() {
        assert_eq!(strip_prefix_ci("CONV ff", "conv "), Some("ff"));
        assert_eq!(strip_prefix_ci("co", "conv "), None);
        assert_eq!(strip_prefix_ci("é123", "e"), None);
    }
}
