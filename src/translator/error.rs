pub const QUOTA_MESSAGE: &str = "Translation failed: API Quota exceeded. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// No usable API key; the message is shown to the user as-is.
    #[error("{0}")]
    MissingApiKey(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
    #[error("request superseded by a newer one")]
    Cancelled,
}

/// Whether a failed request is worth retrying: rate limiting, an overloaded
/// or unavailable service.
pub fn is_transient(err: &TranslateError) -> bool {
    match err {
        TranslateError::Http { status: 429 | 503, .. } => true,
        TranslateError::MissingApiKey(_) | TranslateError::Cancelled => false,
        other => {
            let text = other.to_string().to_lowercase();
            ["429", "503", "overloaded", "unavailable"]
                .iter()
                .any(|needle| text.contains(needle))
        }
    }
}

/// Text placed in the translator's error slot.
pub fn user_message(err: &TranslateError) -> String {
    match err {
        TranslateError::MissingApiKey(msg) => msg.clone(),
        other => {
            let msg = other.to_string();
            if msg.to_lowercase().contains("quota") {
                QUOTA_MESSAGE.to_string()
            } else {
                format!("Translation failed: {msg}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> TranslateError {
        TranslateError::Http {
            status,
            message: message.into(),
        }
    }

    #[test]
    fn transient_by_status_or_text() {
        assert!(is_transient(&http(429, "slow down")));
        assert!(is_transient(&http(503, "")));
        assert!(is_transient(&http(500, "The model is OVERLOADED")));
        assert!(is_transient(&TranslateError::Transport("service unavailable".into())));
        assert!(!is_transient(&http(400, "bad request")));
        assert!(!is_transient(&TranslateError::MissingApiKey("503".into())));
    }

    #[test]
    fn messages_for_the_error_slot() {
        assert_eq!(user_message(&http(429, "Resource quota exhausted")), QUOTA_MESSAGE);
        assert_eq!(
            user_message(&TranslateError::MissingApiKey("No key".into())),
            "No key"
        );
        assert_eq!(user_message(&http(400, "bad model")), "Translation failed: bad model");
    }
}
