// Gemini generateContent client
//
// One blocking POST per request, JSON mode with a response schema so the
// reply text is the InsightResult object itself.

use serde::{Deserialize, Serialize};
use serde_json::json;

use consolidator_config::ai::{AIConfigStatus, ResolvedAIConfig};
use consolidator_core::record::InsightResult;

use crate::error::InsightError;
use crate::provider::{parse_insight_json, InsightProvider, InsightRequest};

const REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Declared shape of the reply: all three fields required
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Um resumo breve dos dados."
            },
            "insights": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Uma lista de 3 insights principais."
            },
            "suggestedCategories": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Sugestões de categorias para classificar os dados."
            }
        },
        "required": ["summary", "insights", "suggestedCategories"]
    })
}

// ============================================================================
// Provider
// ============================================================================

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(
            api_key,
            model,
            consolidator_config::settings::AIProvider::Gemini
                .default_endpoint()
                .to_string(),
        )
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build from the resolved configuration, refusing when AI is off or unkeyed
    pub fn from_config(config: &ResolvedAIConfig) -> Result<Self, InsightError> {
        match config.status {
            AIConfigStatus::Disabled => Err(InsightError::Disabled),
            AIConfigStatus::MissingKey => Err(InsightError::MissingKey),
            AIConfigStatus::Ready => {
                let api_key = config.api_key.clone().ok_or(InsightError::MissingKey)?;
                Ok(Self::with_base_url(api_key, config.model.clone(), config.endpoint.clone()))
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl InsightProvider for GeminiProvider {
    fn generate(&self, request: &InsightRequest) -> Result<InsightResult, InsightError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: request.prompt.clone() }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        log::debug!("POST {} ({} values)", self.url(), request.sample_size);

        let response = client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let envelope: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;

        let reply = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| InsightError::MalformedResponse("no candidates in response".to_string()))?;

        parse_insight_json(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consolidator_config::settings::{AIProvider, AISettings};
    use consolidator_config::ai::{KeyLookup, KeySource};
    use httpmock::prelude::*;

    fn request() -> InsightRequest {
        InsightRequest {
            sample: "x, y".into(),
            sample_size: 2,
            prompt: "Dados: x, y".into(),
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[test]
    fn test_generate_success() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/test-model:generateContent")
                .header("x-goog-api-key", "secret")
                .body_includes("\"responseMimeType\":\"application/json\"")
                .body_includes("suggestedCategories")
                .body_includes("Dados: x, y");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(candidate_body(
                    r#"{"summary":"Duas letras","insights":["a","b","c"],"suggestedCategories":["Letras"]}"#,
                ));
        });

        let provider = GeminiProvider::with_base_url("secret".into(), "test-model".into(), server.base_url());
        let result = provider.generate(&request()).unwrap();

        mock.assert();
        assert_eq!(result.summary, "Duas letras");
        assert_eq!(result.insights, vec!["a", "b", "c"]);
        assert_eq!(result.suggested_categories, vec!["Letras"]);
    }

    #[test]
    fn test_server_error_is_unavailable() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1beta/models/test-model:generateContent");
            then.status(500).json_body(json!({
                "error": { "code": 500, "message": "internal", "status": "INTERNAL" }
            }));
        });

        let provider = GeminiProvider::with_base_url("secret".into(), "test-model".into(), server.base_url());
        let err = provider.generate(&request()).unwrap_err();

        assert_eq!(err, InsightError::Api { status: 500, message: "internal".into() });
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_non_json_reply_is_malformed() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1beta/models/test-model:generateContent");
            then.status(200).json_body(candidate_body("Aqui está um resumo em texto."));
        });

        let provider = GeminiProvider::with_base_url("secret".into(), "test-model".into(), server.base_url());
        assert!(provider.generate(&request()).unwrap_err().is_malformed());
    }

    #[test]
    fn test_no_candidates_is_malformed() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1beta/models/test-model:generateContent");
            then.status(200).json_body(json!({ "candidates": [] }));
        });

        let provider = GeminiProvider::with_base_url("secret".into(), "test-model".into(), server.base_url());
        assert!(provider.generate(&request()).unwrap_err().is_malformed());
    }

    #[test]
    fn test_unreachable_is_network_error() {
        let provider = GeminiProvider::with_base_url("secret".into(), "m".into(), "http://127.0.0.1:1".into());
        let err = provider.generate(&request()).unwrap_err();
        assert!(matches!(err, InsightError::Network(_)));
    }

    #[test]
    fn test_from_config() {
        let settings = AISettings::default();
        let ready = ResolvedAIConfig::from_settings_with_key(
            &settings,
            KeyLookup { key: Some("k".into()), source: KeySource::Environment },
        );
        let provider = GeminiProvider::from_config(&ready).unwrap();
        assert_eq!(provider.model(), "gemini-3-flash-preview");
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );

        let missing = ResolvedAIConfig::from_settings_with_key(&settings, KeyLookup::missing());
        assert_eq!(GeminiProvider::from_config(&missing).err(), Some(InsightError::MissingKey));

        let off = AISettings { provider: AIProvider::None, ..AISettings::default() };
        let disabled = ResolvedAIConfig::from_settings_with_key(&off, KeyLookup::missing());
        assert_eq!(GeminiProvider::from_config(&disabled).err(), Some(InsightError::Disabled));
    }
}
