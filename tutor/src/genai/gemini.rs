//! Gemini REST API implementation of AnswerService
//!
//! Talks to the `generateContent` endpoint directly. Answer requests pin the
//! response to a JSON schema so the model cannot return free-form prose;
//! diagram requests take the first inline image part of the response.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{AnswerError, AnswerService};
use crate::config::GenAiConfig;
use crate::document::EncodedDocument;
use crate::prompts;
use historystore::StructuredAnswer;

/// Gemini API client
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    image_model: String,
    base_url: String,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &GenAiConfig) -> Result<Self, AnswerError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| AnswerError::MissingApiKey(config.api_key_env.clone()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(AnswerError::Network)?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            image_model: config.image_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Build the body for an answer request
    ///
    /// One user turn with the question text plus the document as inline
    /// data, the fixed tutoring instruction as system instruction, and a
    /// generation config that forces the four-field JSON schema.
    fn build_answer_request(&self, document: &EncodedDocument, question: &str) -> GenerateContentRequest {
        debug!(document = %document.name, question_len = question.len(), "build_answer_request: called");
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: format!("Question: {}", question),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: document.mime_type.clone(),
                            data: document.data.clone(),
                        },
                    },
                ],
            }],
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part::Text {
                    text: prompts::ANSWER_SYSTEM_PROMPT.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(answer_schema()),
                max_output_tokens: Some(self.max_output_tokens),
            }),
        }
    }

    /// Build the body for a diagram request
    fn build_diagram_request(&self, description: &str) -> GenerateContentRequest {
        debug!(description_len = description.len(), "build_diagram_request: called");
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text {
                    text: prompts::diagram_prompt(description),
                }],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }

    async fn send(&self, model: &str, body: &GenerateContentRequest) -> Result<GenerateContentResponse, AnswerError> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model, self.api_key);

        let response = self.http.post(url).json(body).send().await.map_err(AnswerError::Network)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            debug!(status, "send: API error");
            return Err(AnswerError::ApiError {
                status,
                message: error_message(&text),
            });
        }

        debug!(%model, "send: success");
        let text = response.text().await.map_err(AnswerError::Network)?;
        parse_response(&text)
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    async fn request_answer(
        &self,
        document: &EncodedDocument,
        question: &str,
    ) -> Result<StructuredAnswer, AnswerError> {
        let body = self.build_answer_request(document, question);
        let response = self.send(&self.model, &body).await?;

        let text = extract_text(response).ok_or(AnswerError::NoResponse)?;

        serde_json::from_str(&text).map_err(|e| AnswerError::MalformedResponse(e.to_string()))
    }

    async fn request_diagram(&self, description: &str) -> Result<Vec<u8>, AnswerError> {
        let body = self.build_diagram_request(description);
        let response = self.send(&self.image_model, &body).await?;

        let data = extract_inline_image(response).ok_or(AnswerError::NoImage)?;

        BASE64_STANDARD
            .decode(&data)
            .map_err(|e| AnswerError::MalformedResponse(format!("image payload is not valid base64: {}", e)))
    }
}

/// Response schema pinning the model to the four answer fields
fn answer_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "oneLine": {
                "type": "STRING",
                "description": "A concise answer in exactly one sentence.",
            },
            "twoLines": {
                "type": "STRING",
                "description": "A slightly more descriptive answer in about two sentences.",
            },
            "fiveLines": {
                "type": "STRING",
                "description": "A detailed explanation roughly five sentences long.",
            },
            "diagramDescription": {
                "type": "STRING",
                "description": "A text description of a diagram that would explain the concept visually.",
            },
        },
        "required": ["oneLine", "twoLines", "fiveLines", "diagramDescription"],
    })
}

/// Decode a success body into the response envelope
///
/// A truncated or otherwise unparsable body is a malformed response, not a
/// transport failure.
fn parse_response(body: &str) -> Result<GenerateContentResponse, AnswerError> {
    serde_json::from_str(body).map_err(|e| AnswerError::MalformedResponse(e.to_string()))
}

/// First text part of the first candidate, if any
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().find_map(|part| part.text))
}

/// First inline image payload anywhere in the response, if any
fn extract_inline_image(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .flatten()
        .filter_map(|candidate| candidate.content)
        .filter_map(|content| content.parts)
        .flatten()
        .find_map(|part| part.inline_data.and_then(|d| d.data))
}

/// Pull the human-readable message out of a Gemini error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status = wrapper.error.status.unwrap_or_default();
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status.is_empty() {
                message
            } else {
                format!("{}: {}", status, message)
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient {
            http: Client::new(),
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            base_url: "https://example.com/v1beta".to_string(),
            max_output_tokens: 8192,
        }
    }

    fn test_document() -> EncodedDocument {
        EncodedDocument {
            name: "chapter1.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            data: "JVBERi0=".to_string(),
        }
    }

    #[test]
    fn test_answer_request_body() {
        let client = test_client();
        let body = client.build_answer_request(&test_document(), "What is photosynthesis?");
        let json = serde_json::to_value(&body).unwrap();

        // One user turn: question text plus the attached document
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Question: What is photosynthesis?"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "JVBERi0=");

        // Fixed instruction rides as system instruction
        let instruction = json["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("STRICTLY"));

        // Schema-pinned JSON output
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        let required = json["generationConfig"]["responseSchema"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert!(required.contains(&serde_json::json!("diagramDescription")));
    }

    #[test]
    fn test_diagram_request_body() {
        let client = test_client();
        let body = client.build_diagram_request("leaf diagram");
        let json = serde_json::to_value(&body).unwrap();

        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("leaf diagram"));
        assert!(text.contains("White background"));

        // Diagram requests are plain: no schema, no system instruction
        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_takes_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "{\"oneLine\": \"a\"}"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "{\"oneLine\": \"a\"}");
    }

    #[test]
    fn test_extract_text_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(extract_text(response).is_none());

        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text(response).is_none());
    }

    #[test]
    fn test_extract_inline_image_skips_text_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "here is your diagram"},
                {"inlineData": {"mimeType": "image/png", "data": "aW1hZ2U="}}
            ]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_inline_image(response).unwrap(), "aW1hZ2U=");
    }

    #[test]
    fn test_extract_inline_image_none_found() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "no image, sorry"}]}}]}"#,
        )
        .unwrap();

        assert!(extract_inline_image(response).is_none());
    }

    #[test]
    fn test_error_message_parses_gemini_wrapper() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(body), "RESOURCE_EXHAUSTED: Quota exceeded");

        // Unparsable bodies pass through verbatim
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_truncated_envelope_is_malformed() {
        let truncated = r#"{"candidates": [{"content": {"parts": [{"te"#;
        assert!(matches!(
            parse_response(truncated),
            Err(AnswerError::MalformedResponse(_))
        ));

        assert!(parse_response(r#"{"candidates": []}"#).is_ok());
    }

    #[test]
    fn test_malformed_answer_is_rejected() {
        // Truncated JSON and missing fields both surface as malformed
        let truncated = "{\"oneLine\": \"a\", \"twoLi";
        assert!(serde_json::from_str::<StructuredAnswer>(truncated).is_err());

        let missing = r#"{"oneLine": "a", "twoLines": "b", "fiveLines": "c"}"#;
        let err = serde_json::from_str::<StructuredAnswer>(missing).unwrap_err();
        assert!(err.to_string().contains("diagramDescription"));

        let wrong_type = r#"{"oneLine": 1, "twoLines": "b", "fiveLines": "c", "diagramDescription": "d"}"#;
        assert!(serde_json::from_str::<StructuredAnswer>(wrong_type).is_err());
    }
}
