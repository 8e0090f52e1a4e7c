use super::config::{AiConfig, Provider};
use super::error::TranslateError;
use super::prompt::build_prompt;
use super::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use super::worker::RequestToken;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const BUILTIN_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];
pub const BUILTIN_MISSING_KEY: &str =
    "API Key is missing or invalid. Please set API_KEY or GEMINI_API_KEY in the environment.";
pub const CUSTOM_MISSING_KEY: &str =
    "API Key is missing. Please add it for the custom provider in Settings.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal blocking JSON POST used by the providers.
pub trait HttpTransport: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<HttpReply, TranslateError>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("multi-toolbox translator")
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<HttpReply, TranslateError> {
        let mut req = self.client.post(url).json(body);
        for (name, value) in headers {
            req = req.header(*name, value);
        }
        let resp = req
            .send()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

/// Everything one translation needs, including the provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub config: AiConfig,
}

impl TranslationRequest {
    pub fn prompt(&self) -> String {
        build_prompt(&self.text, &self.source_lang, &self.target_lang)
    }
}

pub trait TranslationBackend: Send + Sync {
    fn translate(
        &self,
        request: &TranslationRequest,
        token: &RequestToken,
    ) -> Result<String, TranslateError>;
}

/// Pull the provider's message out of an error body, else a generic one.
fn http_error(reply: &HttpReply) -> TranslateError {
    let message = serde_json::from_str::<Value>(&reply.body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error {}", reply.status));
    TranslateError::Http {
        status: reply.status,
        message,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// One request to an OpenAI-compatible `chat/completions` endpoint.
pub fn translate_custom(
    transport: &dyn HttpTransport,
    config: &AiConfig,
    prompt: &str,
) -> Result<String, TranslateError> {
    if config.api_key.trim().is_empty() {
        return Err(TranslateError::MissingApiKey(CUSTOM_MISSING_KEY.into()));
    }
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    let body = serde_json::to_value(ChatRequest {
        model: &config.model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        temperature: 0.3,
    })
    .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;
    let headers = [("Authorization", format!("Bearer {}", config.api_key))];
    tracing::debug!(%url, model = %config.model, "custom provider request");
    let reply = transport.post_json(&url, &headers, &body)?;
    if !reply.is_success() {
        return Err(http_error(&reply));
    }
    let parsed: ChatResponse = serde_json::from_str(&reply.body)
        .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| TranslateError::MalformedResponse("no choices returned".into()))
}

/// First non-empty key from [`BUILTIN_KEY_VARS`]; the literal `undefined`
/// counts as missing.
pub fn builtin_api_key_from_env() -> Option<String> {
    BUILTIN_KEY_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v != "undefined")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinProvider {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl BuiltinProvider {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.builtin_endpoint.clone(),
            model: settings.builtin_model.clone(),
            api_key: builtin_api_key_from_env(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// A single `generateContent` call, without retries.
    pub fn generate(
        &self,
        transport: &dyn HttpTransport,
        prompt: &str,
    ) -> Result<String, TranslateError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(TranslateError::MissingApiKey(BUILTIN_MISSING_KEY.into()));
        };
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });
        let headers = [("x-goog-api-key", key.to_string())];
        let reply = transport.post_json(&self.url(), &headers, &body)?;
        if !reply.is_success() {
            return Err(http_error(&reply));
        }
        let value: Value = serde_json::from_str(&reply.body)
            .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;
        let parts = value["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| TranslateError::MalformedResponse("no candidates returned".into()))?;
        Ok(parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<String>())
    }
}

/// Dispatches on [`AiConfig::provider`]; built-in requests are retried.
pub struct ProviderRouter {
    transport: Arc<dyn HttpTransport>,
    builtin: BuiltinProvider,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ProviderRouter {
    pub fn new(transport: Arc<dyn HttpTransport>, builtin: BuiltinProvider) -> Self {
        Self {
            transport,
            builtin,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(settings.request_timeout())?;
        Ok(Self::new(Arc::new(transport), BuiltinProvider::from_settings(settings))
            .with_retry(RetryPolicy::from_settings(settings)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

impl TranslationBackend for ProviderRouter {
    fn translate(
        &self,
        request: &TranslationRequest,
        token: &RequestToken,
    ) -> Result<String, TranslateError> {
        let prompt = request.prompt();
        match request.config.provider {
            Provider::Custom => translate_custom(self.transport.as_ref(), &request.config, &prompt),
            Provider::Builtin => {
                if self.builtin.api_key.is_none() {
                    return Err(TranslateError::MissingApiKey(BUILTIN_MISSING_KEY.into()));
                }
                self.retry.run(
                    self.sleeper.as_ref(),
                    &|| token.is_current(),
                    |attempt| {
                        tracing::debug!(attempt, "builtin provider request");
                        self.builtin.generate(self.transport.as_ref(), &prompt)
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_preferred() {
        let reply = HttpReply {
            status: 401,
            body: r#"{"error":{"message":"Invalid key"}}"#.into(),
        };
        assert_eq!(
            http_error(&reply),
            TranslateError::Http {
                status: 401,
                message: "Invalid key".into()
            }
        );
        let reply = HttpReply {
            status: 502,
            body: "<html>".into(),
        };
        assert_eq!(http_error(&reply).to_string(), "HTTP error 502");
    }
}
