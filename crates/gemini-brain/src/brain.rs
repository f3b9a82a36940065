//! GeminiBrain implementation using the Gemini generateContent API.

use brain_core::{async_trait, Brain, BrainError, ChatTurn};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{
    ApiErrorBody, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::config::GeminiConfig;

/// A brain implementation backed by the Google Gemini API.
///
/// Stateless between calls: conversation context is supplied per request by
/// the caller, which reconstructs it from the message store.
pub struct GeminiBrain {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBrain {
    /// Create a new GeminiBrain with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, BrainError> {
        if config.api_key.is_empty() {
            return Err(BrainError::Configuration(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder().build().map_err(|e| {
            BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!("GeminiBrain initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create a GeminiBrain from environment variables.
    ///
    /// See [`GeminiConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the request body from the system prompt, history, and new turn.
    fn build_request(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::turn(brain_core::TurnRole::User, message));

        let system_instruction = if system_prompt.trim().is_empty() {
            None
        } else {
            Some(Content::text(system_prompt))
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            }),
        }
    }
}

#[async_trait]
impl Brain for GeminiBrain {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, BrainError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url, self.config.model
        );
        let request = self.build_request(system_prompt, history, message);

        debug!(
            model = %self.config.model,
            turns = history.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BrainError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrainError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BrainError::Network(e.to_string()))?;

        body.first_text().ok_or(BrainError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "GeminiBrain"
    }
}

/// Extract a readable error message from a non-2xx response body, keeping
/// the API's own error code when the envelope parses. Unparseable bodies are
/// passed through as-is.
fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if parsed.error.code != 0 => {
            format!("{} (code {})", parsed.error.message, parsed.error.code)
        }
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::TurnRole;

    fn test_brain() -> GeminiBrain {
        GeminiBrain::new(GeminiConfig::builder().api_key("test-key").build()).unwrap()
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = GeminiBrain::new(GeminiConfig::default());
        assert!(matches!(result, Err(BrainError::Configuration(_))));
    }

    #[test]
    fn test_build_request_shape() {
        let brain = test_brain();
        let history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];
        let request = brain.build_request("Be helpful", &history, "what next?");

        assert!(request.system_instruction.is_some());
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
        assert_eq!(
            request.contents[2].role.as_deref(),
            Some(TurnRole::User.as_str())
        );
        assert_eq!(request.contents[2].parts[0].text, "what next?");
    }

    #[test]
    fn test_blank_system_prompt_omitted() {
        let brain = test_brain();
        let request = brain.build_request("   ", &[], "hello");
        assert!(request.system_instruction.is_none());
        assert_eq!(request.contents.len(), 1);
    }

    #[test]
    fn test_api_error_message_keeps_code() {
        let body = r#"{"error": {"code": 429, "message": "Resource exhausted"}}"#;
        assert_eq!(
            api_error_message(body.to_string()),
            "Resource exhausted (code 429)"
        );

        let codeless = r#"{"error": {"message": "Bad request"}}"#;
        assert_eq!(api_error_message(codeless.to_string()), "Bad request");
    }

    #[test]
    fn test_api_error_message_passes_through_unparseable_body() {
        assert_eq!(
            api_error_message("<html>502</html>".to_string()),
            "<html>502</html>"
        );
    }
}
