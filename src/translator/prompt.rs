pub const AUTO_DETECT: &str = "auto";
pub const DEFAULT_SOURCE_LANG: &str = AUTO_DETECT;
pub const DEFAULT_TARGET_LANG: &str = "zh";

/// Selectable languages as `(code, display name)`.
pub const LANGUAGES: [(&str, &str); 8] = [
    ("auto", "Auto Detect"),
    ("en", "English"),
    ("zh", "Chinese (Simplified)"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
];

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Languages valid as a translation target.
pub fn target_languages() -> impl Iterator<Item = (&'static str, &'static str)> {
    LANGUAGES.into_iter().filter(|(c, _)| *c != AUTO_DETECT)
}

pub fn build_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    let target = language_name(target_lang).unwrap_or(target_lang);
    let hint = if source_lang == AUTO_DETECT {
        "detect automatically"
    } else {
        source_lang
    };
    format!(
        "Translate the following text to {target}.\nSource language hint: {hint}.\nProvide only the translated text.\nText: \"{text}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_target_and_hint() {
        let p = build_prompt("hello", "auto", "zh");
        assert!(p.starts_with("Translate the following text to Chinese (Simplified)."));
        assert!(p.contains("Source language hint: detect automatically."));
        assert!(p.ends_with("Text: \"hello\""));

        let p = build_prompt("bonjour", "fr", "en");
        assert!(p.contains("Source language hint: fr."));
    }

    #[test]
    fn auto_is_not_a_target() {
        assert!(target_languages().all(|(c, _)| c != "auto"));
        assert_eq!(target_languages().count(), 7);
    }
}
