use crate::actions::Action;
use crate::plugin::Plugin;
use crate::store::{KeyValueStore, Persisted, WEB_TOOLS_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_ICON: &str = "🔗";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    #[default]
    Iframe,
    Window,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebTool {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: String,
    #[serde(default)]
    pub open_mode: OpenMode,
}

/// Fields supplied by the user when adding a tool.
#[derive(Debug, Clone, Default)]
pub struct NewWebTool {
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub open_mode: OpenMode,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebToolError {
    #[error("a web tool needs a name")]
    MissingName,
    #[error("a web tool needs a URL")]
    MissingUrl,
    #[error("not a valid URL: {0}")]
    InvalidUrl(String),
}

pub fn default_web_tools() -> Vec<WebTool> {
    vec![
        WebTool {
            id: "1".into(),
            name: "Google (Search Only)".into(),
            url: "https://www.google.com/search?igu=1".into(),
            icon: "🔍".into(),
            open_mode: OpenMode::Iframe,
        },
        WebTool {
            id: "2".into(),
            name: "GitHub".into(),
            url: "https://github.com".into(),
            icon: "🐙".into(),
            open_mode: OpenMode::Iframe,
        },
    ]
}

/// Prefix `https://` unless the URL already has an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| crate::common::strip_prefix_ci(url, scheme).is_some());
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// The user-managed list of web tools, saved whole after every change.
pub struct WebToolRegistry {
    tools: Persisted<Vec<WebTool>>,
}

impl WebToolRegistry {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            tools: Persisted::load(store, WEB_TOOLS_KEY, default_web_tools()),
        }
    }

    pub fn tools(&self) -> &[WebTool] {
        self.tools.get()
    }

    pub fn get(&self, id: &str) -> Option<&WebTool> {
        self.tools().iter().find(|t| t.id == id)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Vec<WebTool>) + Send + 'static) {
        self.tools.subscribe(listener);
    }

    /// Validate and append a tool. `now_ms` becomes its id, bumped past any
    /// id already in use.
    pub fn add(
        &mut self,
        store: &dyn KeyValueStore,
        new: NewWebTool,
        now_ms: i64,
    ) -> anyhow::Result<WebTool> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(WebToolError::MissingName.into());
        }
        if new.url.trim().is_empty() {
            return Err(WebToolError::MissingUrl.into());
        }
        let url = normalize_url(&new.url);
        if url::Url::parse(&url).is_err() {
            return Err(WebToolError::InvalidUrl(url).into());
        }
        let mut id = now_ms;
        while self.get(&id.to_string()).is_some() {
            id += 1;
        }
        let icon = new
            .icon
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string());
        let tool = WebTool {
            id: id.to_string(),
            name: name.to_string(),
            url,
            icon,
            open_mode: new.open_mode,
        };
        let added = tool.clone();
        self.tools.update(store, move |list| list.push(tool))?;
        tracing::info!(id = %added.id, name = %added.name, "added web tool");
        Ok(added)
    }

    /// Remove the tool with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, store: &dyn KeyValueStore, id: &str) -> anyhow::Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        self.tools.update(store, |list| list.retain(|t| t.id != id))?;
        tracing::info!(id, "removed web tool");
        Ok(true)
    }
}

/// Lists registered web tools (prefix: `web`).
pub struct WebToolsPlugin {
    store: Arc<dyn KeyValueStore>,
}

impl WebToolsPlugin {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl Plugin for WebToolsPlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        let trimmed = query.trim_start();
        let Some(rest) = crate::common::strip_prefix_ci(trimmed, "web") else {
            return Vec::new();
        };
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Vec::new();
        }
        let filter = rest.trim().to_lowercase();
        let registry = WebToolRegistry::load(self.store.as_ref());
        registry
            .tools()
            .iter()
            .filter(|t| filter.is_empty() || t.name.to_lowercase().contains(&filter))
            .map(|t| Action {
                label: format!("{} {}", t.icon, t.name),
                desc: "Web Tool".into(),
                action: format!("tool:{}", t.id),
                args: Some(t.url.clone()),
            })
            .collect()
    }

    fn name(&self) -> &str {
        "web_tools"
    }

    fn description(&self) -> &str {
        "Open registered web tools (prefix: `web`)"
    }

    fn commands(&self) -> Vec<Action> {
        vec![Action::new("web", "Web Tool", "query:web ")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_open_mode_reads_as_iframe() {
        let json = r#"{"id":"9","name":"Docs","url":"https://docs.rs","icon":"📚"}"#;
        let tool: WebTool = serde_json::from_str(json).unwrap();
        assert_eq!(tool.open_mode, OpenMode::Iframe);
    }

    #[test]
    fn serialises_camel_case() {
        let tool = &default_web_tools()[0];
        let json = serde_json::to_string(tool).unwrap();
        assert!(json.contains("\"openMode\":\"iframe\""));
    }

    #[test]
    fn normalises_urls() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://a.b"), "http://a.b");
        assert_eq!(normalize_url("HTTPS://a.b"), "HTTPS://a.b");
        assert_eq!(normalize_url("http.cat"), "https://http.cat");
    }
}
