//! Suggestion service backed by the Gemini `generateContent` API.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::{
    challenge::ChallengeService,
    config::SuggestionConfig,
    suggestion::{ServiceError, SuggestionRequest, SuggestionService},
};

const JSON_REPLY: &str = "application/json";
const TEXT_REPLY: &str = "text/plain";

/// Request body of `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, response_mime_type: &'static str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig { response_mime_type },
        }
    }
}

/// The parts of a `generateContent` reply that carry text.
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if there is any.
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Blocking client for a Gemini model.
///
/// The API key is sent in the `x-goog-api-key` header. Without a key every
/// request fails with [`ServiceError::MissingCredentials`] before any network
/// traffic.
pub struct GeminiClient {
    agent: Agent,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &SuggestionConfig, api_key: Option<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint().trim_end_matches('/'),
            config.model()
        );
        if api_key.is_none() {
            warn!("No API key configured, voicing suggestions are disabled");
        }
        Self {
            agent,
            url,
            api_key,
        }
    }

    /// The `generateContent` URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one prompt and returns the text of the first candidate.
    fn generate(
        &self,
        prompt: &str,
        response_mime_type: &'static str,
    ) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredentials)?;

        let body = GenerateContentRequest::new(prompt, response_mime_type);
        let mut response = self
            .agent
            .post(&self.url)
            .header("x-goog-api-key", api_key)
            .send_json(&body)
            .map_err(map_transport_error)?;

        let raw = response
            .body_mut()
            .read_to_string()
            .map_err(map_transport_error)?;
        let reply: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|err| ServiceError::Malformed(err.to_string()))?;

        let text = reply.text().ok_or(ServiceError::EmptyResponse)?;
        debug!(bytes = text.len(), response_mime_type; "Received model reply");
        Ok(text)
    }
}

impl SuggestionService for GeminiClient {
    fn suggest(&self, request: &SuggestionRequest) -> Result<String, ServiceError> {
        info!(url = self.url.as_str(), chords = request.chords().len(); "Requesting voicings");
        self.generate(&request.build_prompt(), JSON_REPLY)
    }
}

impl ChallengeService for GeminiClient {
    fn challenges(&self, prompt: &str) -> Result<String, ServiceError> {
        info!(url = self.url.as_str(); "Requesting challenges");
        self.generate(prompt, TEXT_REPLY)
    }
}

fn map_transport_error(err: ureq::Error) -> ServiceError {
    match err {
        ureq::Error::Timeout(_) => ServiceError::Timeout,
        other => ServiceError::Unavailable(other.to_string()),
    }
}
