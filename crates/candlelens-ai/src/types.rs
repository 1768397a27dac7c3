//! Common types for OHLCV analysis requests and results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while producing an analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Upstream request failed: {message}")]
    Upstream { message: String },

    #[error("AI response is empty")]
    EmptyResponse,

    #[error("Unable to parse AI response: {body}")]
    UnparsableResponse { body: String },
}

impl AnalysisError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A single OHLCV sample. No cross-field invariant is enforced; the
/// upstream model sees whatever the caller sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePeriod {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The caller's requested focus for the generated analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisIntent {
    Trend,
    Volume,
    Technical,
    Comprehensive,
}

impl AnalysisIntent {
    /// Resolve the wire literal. Unknown or absent values degrade to
    /// `Comprehensive`; an intent never fails a request.
    pub fn resolve(value: Option<&str>) -> Self {
        match value {
            Some("trend") => Self::Trend,
            Some("volume") => Self::Volume,
            Some("technical") => Self::Technical,
            _ => Self::Comprehensive,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Volume => "volume",
            Self::Technical => "technical",
            Self::Comprehensive => "comprehensive",
        }
    }
}

impl std::fmt::Display for AnalysisIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response language. Only the exact tags `en` and `cn` are accepted;
/// anything else is a validation failure, not a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Cn,
}

impl Language {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Self::En),
            "cn" => Some(Self::Cn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cn => "cn",
        }
    }
}

/// Optional sampling parameters forwarded verbatim to the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// An inbound analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Provider identifier (case-insensitive)
    #[serde(default)]
    pub provider: String,
    /// Ordered OHLCV series
    #[serde(default)]
    pub data: Vec<PricePeriod>,
    /// Response language tag (`en` or `cn`)
    #[serde(default)]
    pub i18n: String,
    /// Model override; the provider default is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Analysis focus (`trend`, `volume`, `technical`, `comprehensive`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    /// Free-text question appended to the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<AnalysisOptions>,
}

/// Per-call metadata echoed back with every result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub period_count: usize,
    pub language: String,
    pub analysis_type: AnalysisIntent,
    /// Set when the metadata record is constructed, not caller-supplied
    pub timestamp: DateTime<Utc>,
}

impl AnalysisMetadata {
    pub fn new(period_count: usize, language: impl Into<String>, analysis_type: AnalysisIntent) -> Self {
        Self {
            period_count,
            language: language.into(),
            analysis_type,
            timestamp: Utc::now(),
        }
    }
}

/// The outcome of one analysis call. Always populated; failures are
/// reported through `success = false` rather than an error return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    /// Echo of the requested provider identifier
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Elapsed wall-clock time in milliseconds
    pub duration: u64,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn succeeded(
        provider: impl Into<String>,
        model: impl Into<String>,
        analysis: impl Into<String>,
        duration: u64,
        metadata: AnalysisMetadata,
    ) -> Self {
        Self {
            success: true,
            provider: provider.into(),
            model: Some(model.into()),
            analysis: Some(analysis.into()),
            error: None,
            duration,
            metadata,
        }
    }

    pub fn failed(
        provider: impl Into<String>,
        error: impl Into<String>,
        duration: u64,
        metadata: AnalysisMetadata,
    ) -> Self {
        Self {
            success: false,
            provider: provider.into(),
            model: None,
            analysis: None,
            error: Some(error.into()),
            duration,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_resolution_degrades_to_comprehensive() {
        assert_eq!(AnalysisIntent::resolve(Some("trend")), AnalysisIntent::Trend);
        assert_eq!(AnalysisIntent::resolve(Some("volume")), AnalysisIntent::Volume);
        assert_eq!(
            AnalysisIntent::resolve(Some("technical")),
            AnalysisIntent::Technical
        );
        assert_eq!(
            AnalysisIntent::resolve(Some("comprehensive")),
            AnalysisIntent::Comprehensive
        );
        // Intent literals are case-sensitive; unknown values never fail
        assert_eq!(
            AnalysisIntent::resolve(Some("Trend")),
            AnalysisIntent::Comprehensive
        );
        assert_eq!(
            AnalysisIntent::resolve(Some("momentum")),
            AnalysisIntent::Comprehensive
        );
        assert_eq!(AnalysisIntent::resolve(None), AnalysisIntent::Comprehensive);
    }

    #[test]
    fn language_tags_are_exact() {
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse("cn"), Some(Language::Cn));
        assert_eq!(Language::parse("EN"), None);
        assert_eq!(Language::parse("english"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn request_deserializes_wire_names() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{
                "provider": "openai",
                "data": [{"open": 10.0, "high": 12.0, "low": 9.0, "close": 11.0, "volume": 1000.0}],
                "i18n": "en",
                "modelType": "gpt-4o-mini",
                "analysisType": "trend",
                "options": {"temperature": 0.2, "maxTokens": 512}
            }"#,
        )
        .unwrap();

        assert_eq!(request.provider, "openai");
        assert_eq!(request.data.len(), 1);
        assert_eq!(request.model_type.as_deref(), Some("gpt-4o-mini"));
        let options = request.options.unwrap();
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.max_tokens, Some(512));
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = AnalysisResult::failed(
            "openai",
            "boom",
            12,
            AnalysisMetadata::new(0, "en", AnalysisIntent::Comprehensive),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert_eq!(value["metadata"]["periodCount"], 0);
        assert_eq!(value["metadata"]["analysisType"], "comprehensive");
        // Absent fields are omitted, not serialized as null
        assert!(value.get("model").is_none());
        assert!(value.get("analysis").is_none());
    }
}
