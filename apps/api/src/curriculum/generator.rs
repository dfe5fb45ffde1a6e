//! Curriculum generation backends.
//!
//! `AppState` carries an `Arc<dyn CurriculumGenerator>` chosen at startup from
//! `GENERATOR_BACKEND`. Both backends take the same resolved parameters and
//! report failure through [`GenerationError`]; the HTTP layer turns that into
//! a `{"error": ...}` body.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::curriculum::defaults::{apply_defaults, empty_curriculum};
use crate::curriculum::models::{CurriculumEnvelope, CurriculumParams};
use crate::curriculum::prompts::{build_hosted_prompt, build_local_prompt, HOSTED_SYSTEM};
use crate::curriculum::repair::clean_model_json;
use crate::curriculum::schema::curriculum_format;
use crate::llm_client::ollama::OllamaClient;
use crate::llm_client::{InputMessage, LlmClient, LlmError};

/// Fixed sampling temperature for schema-constrained generation.
pub const HOSTED_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The local endpoint answered with a non-success status.
    #[error("Ollama API error")]
    Upstream,

    /// Transport failure, or output that stayed unparseable after repair.
    #[error("Invalid JSON structure from model")]
    InvalidJson,
}

#[async_trait]
pub trait CurriculumGenerator: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn generate(&self, params: &CurriculumParams) -> Result<Value, GenerationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Local backend
// ────────────────────────────────────────────────────────────────────────────

/// Free-text generation against a local Ollama model.
///
/// The parsed JSON is returned as-is: it is not checked against the schema
/// and no defaulting is applied.
pub struct LocalGenerator {
    client: OllamaClient,
}

impl LocalGenerator {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CurriculumGenerator for LocalGenerator {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, params: &CurriculumParams) -> Result<Value, GenerationError> {
        let prompt = build_local_prompt(params);
        info!(
            "Dispatching curriculum request to local model {}",
            self.client.model()
        );

        let raw = match self.client.generate(&prompt).await {
            Ok(raw) => raw,
            Err(LlmError::Api { status, message }) => {
                error!("Local model returned {status}: {message}");
                return Err(GenerationError::Upstream);
            }
            Err(e) => {
                error!("Local model call failed: {e}");
                return Err(GenerationError::InvalidJson);
            }
        };

        debug!("Raw model output:\n{raw}");

        let curriculum = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Direct parse failed ({e}), attempting cleanup");
                serde_json::from_str::<Value>(&clean_model_json(&raw)).map_err(|e| {
                    error!("Model output is not valid JSON after cleanup: {e}");
                    GenerationError::InvalidJson
                })?
            }
        };

        warn_if_over_budget(&curriculum);
        Ok(curriculum)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Hosted backend
// ────────────────────────────────────────────────────────────────────────────

/// Schema-constrained generation against the hosted provider.
///
/// Never fails: any error is logged and replaced by the defaulted empty
/// curriculum, so callers always receive a structurally complete document.
pub struct HostedGenerator {
    llm: LlmClient,
}

impl HostedGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn request(&self, params: &CurriculumParams) -> Result<Value, LlmError> {
        let user_prompt = build_hosted_prompt(params);
        let input = [
            InputMessage {
                role: "system",
                content: HOSTED_SYSTEM,
            },
            InputMessage {
                role: "user",
                content: &user_prompt,
            },
        ];

        self.llm
            .call_json(&input, &curriculum_format(), HOSTED_TEMPERATURE)
            .await
    }
}

#[async_trait]
impl CurriculumGenerator for HostedGenerator {
    fn backend(&self) -> &'static str {
        "hosted"
    }

    async fn generate(&self, params: &CurriculumParams) -> Result<Value, GenerationError> {
        info!(
            "Dispatching curriculum request to hosted model {}",
            crate::llm_client::MODEL
        );

        let curriculum = match self.request(params).await {
            Ok(value) if value.is_object() => apply_defaults(value),
            Ok(value) => {
                error!("Hosted model returned a non-object document: {value}");
                empty_curriculum()
            }
            Err(e) => {
                error!("Hosted model call failed: {e}");
                empty_curriculum()
            }
        };

        warn_if_over_budget(&curriculum);
        Ok(curriculum)
    }
}

/// Logs semesters whose course hours exceed the weekly budget. The budget is
/// only requested in the prompt, so violations are tolerated.
fn warn_if_over_budget(curriculum: &Value) {
    let Ok(envelope) = CurriculumEnvelope::deserialize(curriculum) else {
        return;
    };

    for (semester, hours) in envelope.curriculum.semesters_over_budget() {
        warn!(
            "Semester {semester} schedules {hours}h/week, over the {}h budget",
            envelope.curriculum.weekly_hours
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn robotics() -> CurriculumParams {
        CurriculumParams {
            domain: "Robotics".to_string(),
            level: "B.Tech".to_string(),
            semesters: 6,
            weekly_hours: 24,
            industry_focus: "Industry 4.0".to_string(),
        }
    }

    fn local_for(server: &MockServer) -> LocalGenerator {
        let client = OllamaClient::new(
            format!("{}/api/generate", server.uri()),
            "mistral".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        LocalGenerator::new(client)
    }

    fn hosted_for(base_url: String) -> HostedGenerator {
        let llm = LlmClient::new("sk-test".to_string(), base_url, Duration::from_secs(5)).unwrap();
        HostedGenerator::new(llm)
    }

    async fn mount_ollama(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn responses_body(text: &str) -> Value {
        json!({
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": text}]
            }]
        })
    }

    // ── local ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_local_http_500_is_upstream_error() {
        let server = MockServer::start().await;
        mount_ollama(&server, ResponseTemplate::new(500)).await;

        let err = local_for(&server).generate(&robotics()).await.unwrap_err();
        assert_eq!(err, GenerationError::Upstream);
        assert_eq!(err.to_string(), "Ollama API error");
    }

    #[tokio::test]
    async fn test_local_valid_json_returned_unchanged() {
        let server = MockServer::start().await;
        mount_ollama(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"response": "{\"curriculum\": {}}"})),
        )
        .await;

        let value = local_for(&server).generate(&robotics()).await.unwrap();
        // No defaulting on the local path.
        assert_eq!(value, json!({"curriculum": {}}));
    }

    #[tokio::test]
    async fn test_local_oversized_hours_do_not_panic_budget_check() {
        let server = MockServer::start().await;
        let text = json!({
            "curriculum": {
                "domain": "Robotics",
                "level": "B.Tech",
                "industryOrientation": "General",
                "semesters": 1,
                "weeklyHours": 24,
                "courses": [{
                    "semester": 1,
                    "courses": [
                        {"name": "A", "type": "theory", "hoursPerWeek": i64::MAX, "description": ""},
                        {"name": "B", "type": "lab", "hoursPerWeek": 1, "description": ""}
                    ]
                }]
            }
        });
        mount_ollama(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"response": text.to_string()})),
        )
        .await;

        let value = local_for(&server).generate(&robotics()).await.unwrap();
        assert_eq!(value, text);
    }

    #[tokio::test]
    async fn test_local_fenced_output_is_repaired() {
        let server = MockServer::start().await;
        mount_ollama(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"response": "```json\n{\"a\":1,}\n```"})),
        )
        .await;

        let value = local_for(&server).generate(&robotics()).await.unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_local_unrepairable_output_is_invalid_json() {
        let server = MockServer::start().await;
        mount_ollama(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"response": "I cannot help with that."})),
        )
        .await;

        let err = local_for(&server).generate(&robotics()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON structure from model");
    }

    #[tokio::test]
    async fn test_local_non_json_envelope_is_invalid_json() {
        let server = MockServer::start().await;
        mount_ollama(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let err = local_for(&server).generate(&robotics()).await.unwrap_err();
        assert_eq!(err, GenerationError::InvalidJson);
    }

    #[tokio::test]
    async fn test_local_prompt_carries_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "mistral", "stream": false, "format": "json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "{}"})))
            .expect(1)
            .mount(&server)
            .await;

        local_for(&server).generate(&robotics()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["prompt"].as_str().unwrap();
        assert!(prompt.contains("Skill Domain: Robotics"));
        assert!(prompt.contains("Industry Focus: Industry 4.0"));
    }

    // ── hosted ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_hosted_transport_failure_returns_default_shell() {
        // Nothing listens on port 9 of the loopback interface.
        let generator = hosted_for("http://127.0.0.1:9".to_string());

        let value = generator.generate(&robotics()).await.unwrap();
        assert_eq!(
            value,
            json!({
                "curriculum": {
                    "domain": "General",
                    "level": "B.Tech",
                    "industryOrientation": "General",
                    "semesters": 8,
                    "weeklyHours": 30,
                    "courses": []
                }
            })
        );
    }

    #[tokio::test]
    async fn test_hosted_error_status_returns_default_shell() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let value = hosted_for(server.uri()).generate(&robotics()).await.unwrap();
        assert_eq!(value, empty_curriculum());
    }

    #[tokio::test]
    async fn test_hosted_unparseable_output_returns_default_shell() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses_body("{not json")))
            .mount(&server)
            .await;

        let value = hosted_for(server.uri()).generate(&robotics()).await.unwrap();
        assert_eq!(value, empty_curriculum());
    }

    #[tokio::test]
    async fn test_hosted_array_output_returns_default_shell() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses_body("[1, 2]")))
            .mount(&server)
            .await;

        let value = hosted_for(server.uri()).generate(&robotics()).await.unwrap();
        assert_eq!(value, empty_curriculum());
    }

    #[tokio::test]
    async fn test_hosted_partial_output_is_defaulted() {
        let server = MockServer::start().await;
        let text = json!({
            "curriculum": {
                "domain": "Robotics",
                "courses": [{"semester": 1, "courses": [{"name": "Mechanics"}]}]
            }
        })
        .to_string();
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses_body(&text)))
            .mount(&server)
            .await;

        let value = hosted_for(server.uri()).generate(&robotics()).await.unwrap();
        assert_eq!(value["curriculum"]["domain"], "Robotics");
        assert_eq!(value["curriculum"]["weeklyHours"], 30);
        assert_eq!(
            value["curriculum"]["courses"][0]["courses"][0],
            json!({
                "name": "Mechanics",
                "type": "theory",
                "hoursPerWeek": 0,
                "description": ""
            })
        );
    }

    #[tokio::test]
    async fn test_hosted_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.2,
                "text": {"format": {"type": "json_schema", "name": "curriculum", "strict": true}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(responses_body("{}")))
            .expect(1)
            .mount(&server)
            .await;

        hosted_for(server.uri()).generate(&robotics()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body["input"][0],
            json!({"role": "system", "content": "You are an expert academic curriculum designer."})
        );
        assert_eq!(body["input"][1]["role"], "user");
        let user_prompt = body["input"][1]["content"].as_str().unwrap();
        for expected in [
            "Skill Domain: Robotics",
            "Level: B.Tech",
            "Semesters: 6",
            "Weekly Hours: 24",
            "Industry Focus: Industry 4.0",
        ] {
            assert!(user_prompt.contains(expected), "missing {expected:?}");
        }
    }
}
