use multi_toolbox::translator::provider::{
    translate_custom, BuiltinProvider, HttpReply, HttpTransport, BUILTIN_MISSING_KEY,
    CUSTOM_MISSING_KEY,
};
use multi_toolbox::translator::retry::{RetryPolicy, Sleeper};
use multi_toolbox::translator::{
    AiConfig, Generations, Provider, ProviderRouter, TranslateError, TranslationBackend,
    TranslationRequest,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Call {
    url: String,
    headers: Vec<(String, String)>,
    body: Value,
}

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply, TranslateError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<HttpReply, TranslateError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<HttpReply, TranslateError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: body.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TranslateError::Transport("no scripted reply".into())))
    }
}

#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn reply(status: u16, body: &str) -> Result<HttpReply, TranslateError> {
    Ok(HttpReply {
        status,
        body: body.to_string(),
    })
}

fn gemini_ok(text: &str) -> Result<HttpReply, TranslateError> {
    reply(
        200,
        &serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string(),
    )
}

fn builtin(key: Option<&str>) -> BuiltinProvider {
    BuiltinProvider {
        endpoint: "https://llm.example/v1beta".into(),
        model: "test-model".into(),
        api_key: key.map(str::to_string),
    }
}

fn request(config: AiConfig) -> TranslationRequest {
    TranslationRequest {
        text: "hello".into(),
        source_lang: "auto".into(),
        target_lang: "zh".into(),
        config,
    }
}

fn router(
    transport: Arc<ScriptedTransport>,
    key: Option<&str>,
    sleeper: Arc<RecordingSleeper>,
) -> ProviderRouter {
    ProviderRouter::new(transport, builtin(key))
        .with_retry(RetryPolicy::default())
        .with_sleeper(sleeper)
}

#[test]
fn transient_failures_back_off_then_succeed() {
    let transport = ScriptedTransport::new(vec![
        reply(503, r#"{"error":{"message":"The model is overloaded"}}"#),
        reply(503, ""),
        gemini_ok(" 你好 "),
    ]);
    let sleeper = Arc::new(RecordingSleeper::default());
    let r = router(transport.clone(), Some("k"), sleeper.clone());
    let token = Generations::default().next();

    let out = r.translate(&request(AiConfig::default()), &token).unwrap();
    assert_eq!(out, " 你好 ");
    assert_eq!(transport.calls().len(), 3);
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![Duration::from_millis(1500), Duration::from_millis(3000)]
    );
    let call = &transport.calls()[0];
    assert_eq!(call.url, "https://llm.example/v1beta/models/test-model:generateContent");
    assert_eq!(call.headers, vec![("x-goog-api-key".to_string(), "k".to_string())]);
    assert!(call.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Chinese (Simplified)"));
}

#[test]
fn non_transient_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![reply(400, r#"{"error":{"message":"bad"}}"#)]);
    let sleeper = Arc::new(RecordingSleeper::default());
    let r = router(transport.clone(), Some("k"), sleeper.clone());
    let token = Generations::default().next();

    let err = r.translate(&request(AiConfig::default()), &token).unwrap_err();
    assert_eq!(
        err,
        TranslateError::Http {
            status: 400,
            message: "bad".into()
        }
    );
    assert_eq!(transport.calls().len(), 1);
    assert!(sleeper.delays.lock().unwrap().is_empty());
}

#[test]
fn exhaustion_surfaces_last_error() {
    let transport = ScriptedTransport::new(vec![reply(429, ""), reply(429, ""), reply(429, "")]);
    let sleeper = Arc::new(RecordingSleeper::default());
    let r = router(transport.clone(), Some("k"), sleeper.clone());
    let token = Generations::default().next();

    let err = r.translate(&request(AiConfig::default()), &token).unwrap_err();
    assert_eq!(err.to_string(), "HTTP error 429");
    assert_eq!(transport.calls().len(), 3);
    assert_eq!(sleeper.delays.lock().unwrap().len(), 2);
}

#[test]
fn missing_builtin_key_fails_without_network() {
    let transport = ScriptedTransport::new(vec![]);
    let r = router(transport.clone(), None, Arc::new(RecordingSleeper::default()));
    let token = Generations::default().next();
    let err = r.translate(&request(AiConfig::default()), &token).unwrap_err();
    assert_eq!(err, TranslateError::MissingApiKey(BUILTIN_MISSING_KEY.into()));
    assert!(transport.calls().is_empty());
}

struct SupersedingSleeper {
    generations: Generations,
}

impl Sleeper for SupersedingSleeper {
    fn sleep(&self, _duration: Duration) {
        self.generations.supersede();
    }
}

#[test]
fn superseded_request_stops_at_backoff() {
    let transport = ScriptedTransport::new(vec![reply(503, ""), gemini_ok("late")]);
    let generations = Generations::default();
    let token = generations.next();
    let r = ProviderRouter::new(transport.clone(), builtin(Some("k"))).with_sleeper(Arc::new(
        SupersedingSleeper {
            generations: generations.clone(),
        },
    ));
    let err = r.translate(&request(AiConfig::default()), &token).unwrap_err();
    assert_eq!(err, TranslateError::Cancelled);
    assert_eq!(transport.calls().len(), 1);
}

fn custom_config(base_url: &str, key: &str) -> AiConfig {
    AiConfig {
        provider: Provider::Custom,
        base_url: base_url.into(),
        api_key: key.into(),
        model: "gpt-test".into(),
    }
}

#[test]
fn custom_provider_posts_chat_completion() {
    let transport = ScriptedTransport::new(vec![reply(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"你好"}}]}"#,
    )]);
    let cfg = custom_config("https://api.example.com/v1/", "sk-1");
    let out = translate_custom(transport.as_ref(), &cfg, "PROMPT").unwrap();
    assert_eq!(out, "你好");

    let call = &transport.calls()[0];
    assert_eq!(call.url, "https://api.example.com/v1/chat/completions");
    assert_eq!(
        call.headers,
        vec![("Authorization".to_string(), "Bearer sk-1".to_string())]
    );
    assert_eq!(call.body["model"], "gpt-test");
    assert_eq!(call.body["messages"][0]["role"], "user");
    assert_eq!(call.body["messages"][0]["content"], "PROMPT");
    assert!((call.body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn custom_provider_requires_key() {
    let transport = ScriptedTransport::new(vec![]);
    let cfg = custom_config("https://api.example.com/v1", "");
    let err = translate_custom(transport.as_ref(), &cfg, "p").unwrap_err();
    assert_eq!(err, TranslateError::MissingApiKey(CUSTOM_MISSING_KEY.into()));
    assert!(transport.calls().is_empty());
}

#[test]
fn custom_provider_is_not_retried() {
    let transport = ScriptedTransport::new(vec![reply(503, "")]);
    let sleeper = Arc::new(RecordingSleeper::default());
    let r = router(transport.clone(), None, sleeper.clone());
    let token = Generations::default().next();
    let cfg = custom_config("https://api.example.com/v1", "sk");
    let err = r.translate(&request(cfg), &token).unwrap_err();
    assert_eq!(err.to_string(), "HTTP error 503");
    assert_eq!(transport.calls().len(), 1);
    assert!(sleeper.delays.lock().unwrap().is_empty());
}
