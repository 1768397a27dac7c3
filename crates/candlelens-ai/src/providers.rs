//! Provider registry: credentials, endpoints, and default models

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisError, Result};

/// The supported upstream chat-completion vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Aliyun,
    DeepSeek,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [Self::OpenAi, Self::Aliyun, Self::DeepSeek];

    /// Parse a provider identifier, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "aliyun" => Some(Self::Aliyun),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Aliyun => "qwen-turbo",
            Self::DeepSeek => "deepseek-chat",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Aliyun => "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions",
            Self::DeepSeek => "https://api.deepseek.com/chat/completions",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Aliyun => write!(f, "aliyun"),
            Self::DeepSeek => write!(f, "deepseek"),
        }
    }
}

/// Per-provider capability record, created once at startup and shared
/// read-only across calls
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: String,
    pub default_model: String,
}

impl ProviderConfig {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_model.into(),
        }
    }

    /// True iff an API key is configured (non-empty after trimming)
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// The API key is a secret; keep it out of Debug output and logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Static mapping from provider identifier to its capability record
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    openai: ProviderConfig,
    aliyun: ProviderConfig,
    deepseek: ProviderConfig,
}

impl ProviderRegistry {
    pub fn new(openai: ProviderConfig, aliyun: ProviderConfig, deepseek: ProviderConfig) -> Self {
        Self {
            openai,
            aliyun,
            deepseek,
        }
    }

    /// Build a registry from environment variables.
    ///
    /// Keys come from `OPENAI_API_KEY`, `DASHSCOPE_API_KEY`, and
    /// `DEEPSEEK_API_KEY`; endpoints fall back to each vendor's well-known
    /// URL unless `CANDLELENS_{OPENAI,ALIYUN,DEEPSEEK}_ENDPOINT` is set.
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();

        let config = |id: ProviderId, key_var: &str, endpoint_var: &str| {
            ProviderConfig::new(
                std::env::var(key_var).unwrap_or_default(),
                std::env::var(endpoint_var)
                    .unwrap_or_else(|_| id.default_endpoint().to_string()),
                id.default_model(),
            )
        };

        Self::new(
            config(
                ProviderId::OpenAi,
                "OPENAI_API_KEY",
                "CANDLELENS_OPENAI_ENDPOINT",
            ),
            config(
                ProviderId::Aliyun,
                "DASHSCOPE_API_KEY",
                "CANDLELENS_ALIYUN_ENDPOINT",
            ),
            config(
                ProviderId::DeepSeek,
                "DEEPSEEK_API_KEY",
                "CANDLELENS_DEEPSEEK_ENDPOINT",
            ),
        )
    }

    pub fn config(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Aliyun => &self.aliyun,
            ProviderId::DeepSeek => &self.deepseek,
        }
    }

    /// Look up a provider by identifier
    pub fn resolve(&self, provider: &str) -> Result<(ProviderId, &ProviderConfig)> {
        let id = ProviderId::parse(provider).ok_or_else(|| AnalysisError::UnsupportedProvider {
            provider: provider.to_string(),
        })?;
        Ok((id, self.config(id)))
    }

    pub fn default_model(&self, id: ProviderId) -> &str {
        &self.config(id).default_model
    }

    /// Credential-presence probe used by the provider-availability listing.
    /// Unknown providers are reported unavailable, not rejected.
    pub fn has_credential(&self, provider: &str) -> bool {
        ProviderId::parse(provider)
            .map(|id| self.config(id).has_credential())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(
            ProviderConfig::new(
                "sk-test",
                ProviderId::OpenAi.default_endpoint(),
                ProviderId::OpenAi.default_model(),
            ),
            ProviderConfig::new(
                "",
                ProviderId::Aliyun.default_endpoint(),
                ProviderId::Aliyun.default_model(),
            ),
            ProviderConfig::new(
                "   ",
                ProviderId::DeepSeek.default_endpoint(),
                ProviderId::DeepSeek.default_model(),
            ),
        )
    }

    #[test]
    fn resolves_all_known_providers() {
        let registry = registry();
        let mut models = Vec::new();
        for name in ["openai", "aliyun", "deepseek"] {
            let (_, config) = registry.resolve(name).unwrap();
            assert!(!config.endpoint.is_empty());
            models.push(config.default_model.clone());
        }
        // Each provider gets a distinct default model
        models.sort();
        models.dedup();
        assert_eq!(models.len(), 3);
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let registry = registry();
        let (id, _) = registry.resolve("OpenAI").unwrap();
        assert_eq!(id, ProviderId::OpenAi);
        let (id, _) = registry.resolve("DEEPSEEK").unwrap();
        assert_eq!(id, ProviderId::DeepSeek);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = registry().resolve("unknown").unwrap_err();
        assert!(err.to_string().contains("Unsupported provider"));
    }

    #[test]
    fn default_models_match_vendors() {
        assert_eq!(ProviderId::OpenAi.default_model(), "gpt-3.5-turbo");
        assert_eq!(ProviderId::Aliyun.default_model(), "qwen-turbo");
        assert_eq!(ProviderId::DeepSeek.default_model(), "deepseek-chat");
    }

    #[test]
    fn credential_probe_trims_whitespace() {
        let registry = registry();
        assert!(registry.has_credential("openai"));
        // Empty and whitespace-only keys count as absent
        assert!(!registry.has_credential("aliyun"));
        assert!(!registry.has_credential("deepseek"));
        // Unknown providers are unavailable rather than an error
        assert!(!registry.has_credential("unknown"));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = ProviderConfig::new("sk-secret", "https://example.test", "model");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
