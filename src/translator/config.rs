use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Builtin,
    Custom,
}

/// Provider settings passed into every translation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Assign one field by its persisted name (`provider`, `baseUrl`,
    /// `apiKey`, `model`).
    pub fn set_field(&mut self, field: &str, value: &str) -> anyhow::Result<()> {
        match field {
            "provider" => {
                self.provider = match value.to_ascii_lowercase().as_str() {
                    "builtin" => Provider::Builtin,
                    "custom" => Provider::Custom,
                    other => anyhow::bail!("unknown provider: {other}"),
                }
            }
            "baseUrl" | "base_url" => self.base_url = value.to_string(),
            "apiKey" | "api_key" => self.api_key = value.to_string(),
            "model" => self.model = value.to_string(),
            other => anyhow::bail!("unknown AI config field: {other}"),
        }
        Ok(())
    }

    /// Copy safe for display, with the API key masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api_key.is_empty() {
            copy.api_key = "********".into();
        }
        copy
    }
}
