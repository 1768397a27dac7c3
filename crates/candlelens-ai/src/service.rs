//! Analysis orchestration
//!
//! `AnalysisService` drives one call end to end: validate the request,
//! resolve the provider, build the prompt and payload, dispatch, extract.
//! Every failure along the way is folded into a `success = false` result;
//! nothing escapes `analyze` as an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::{extract_analysis, ChatCompletionRequest};
use crate::prompt;
use crate::providers::ProviderRegistry;
use crate::types::{
    AnalysisError, AnalysisIntent, AnalysisMetadata, AnalysisRequest, AnalysisResult, Language,
    Result,
};

/// Outbound timeout for one provider call. The upstream contract has no
/// retry; a hung request fails the call after this bound.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The single network seam: one POST with bearer auth, JSON in, parsed
/// JSON back
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(
        &self,
        endpoint: &str,
        api_key: &str,
        payload: &ChatCompletionRequest,
    ) -> Result<Value>;
}

/// `reqwest`-backed transport used in production
pub struct HttpChatTransport {
    client: reqwest::Client,
}

impl HttpChatTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to construct HTTP client");
        Self { client }
    }
}

impl Default for HttpChatTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn post_chat(
        &self,
        endpoint: &str,
        api_key: &str,
        payload: &ChatCompletionRequest,
    ) -> Result<Value> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| AnalysisError::Upstream {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        response.json().await.map_err(|e| AnalysisError::Upstream {
            message: e.to_string(),
        })
    }
}

/// Facade over the supported providers. Stateless per call; the registry
/// is the only shared data and is read-only.
pub struct AnalysisService {
    registry: ProviderRegistry,
    transport: Arc<dyn ChatTransport>,
}

impl AnalysisService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self::with_transport(registry, Arc::new(HttpChatTransport::new()))
    }

    pub fn with_transport(registry: ProviderRegistry, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run one analysis call. Always returns a populated result; failures
    /// are reported through the result envelope, never raised.
    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisResult {
        let started = Instant::now();

        match self.run(&request).await {
            Ok(outcome) => {
                let metadata = AnalysisMetadata::new(
                    request.data.len(),
                    request.i18n.clone(),
                    outcome.intent,
                );
                AnalysisResult::succeeded(
                    request.provider.clone(),
                    outcome.model,
                    outcome.analysis,
                    elapsed_ms(started),
                    metadata,
                )
            }
            Err(error) => {
                tracing::error!(provider = %request.provider, %error, "AI analysis failed");
                let language = if request.i18n.is_empty() {
                    "en".to_string()
                } else {
                    request.i18n.clone()
                };
                let metadata = AnalysisMetadata::new(0, language, AnalysisIntent::Comprehensive);
                AnalysisResult::failed(
                    request.provider.clone(),
                    error.to_string(),
                    elapsed_ms(started),
                    metadata,
                )
            }
        }
    }

    /// Credential-presence probe for the provider-status listing
    pub fn is_provider_available(&self, provider: &str) -> bool {
        self.registry.has_credential(provider)
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<Outcome> {
        let language = validate(request)?;

        let (_, config) = self.registry.resolve(&request.provider)?;
        let model = request
            .model_type
            .clone()
            .unwrap_or_else(|| config.default_model.clone());

        let intent = AnalysisIntent::resolve(request.analysis_type.as_deref());
        let system_prompt = prompt::system_prompt(intent, language);
        let user_message = prompt::user_message(&request.data, request.message.as_deref());

        let payload =
            ChatCompletionRequest::build(request, &model, system_prompt, user_message);

        tracing::debug!(provider = %request.provider, model = %model, "dispatching analysis request");
        let body = self
            .transport
            .post_chat(&config.endpoint, &config.api_key, &payload)
            .await?;

        let analysis = extract_analysis(Some(body))?;

        Ok(Outcome {
            model,
            analysis,
            intent,
        })
    }
}

struct Outcome {
    model: String,
    analysis: String,
    intent: AnalysisIntent,
}

fn validate(request: &AnalysisRequest) -> Result<Language> {
    if request.provider.trim().is_empty() {
        return Err(AnalysisError::invalid("Provider cannot be empty"));
    }
    if request.data.is_empty() {
        return Err(AnalysisError::invalid("Data cannot be empty"));
    }
    Language::parse(&request.i18n)
        .ok_or_else(|| AnalysisError::invalid("Language must be 'en' or 'cn'"))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
