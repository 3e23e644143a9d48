//! Gemini `generateContent` client: payload construction, the single
//! outbound call, and image-part extraction.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{GenerateRequest, GenerateResponse};

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            model,
            api_key,
        }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Submit one generation request. Single best-effort attempt, no
    /// retries; any upstream problem surfaces as [`AppError::Upstream`].
    pub async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, AppError> {
        let payload = build_payload(req);

        tracing::debug!(
            model = %self.model,
            prompt_len = req.prompt.len(),
            image_count = req.images.len(),
            "sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to parse response: {}", e)))?;

        extract_image(body).ok_or(AppError::MissingImage)
    }
}

// Instruction sent ahead of the caller's reference images
fn instruction(prompt: &str, style: &str) -> String {
    format!("Generate a product image in {style} style. Description: {prompt}")
}

pub fn build_payload(req: &GenerateRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: instruction(&req.prompt, &req.style),
    }];
    parts.extend(req.images.iter().map(|img| Part::InlineData {
        inline_data: InlineData {
            mime_type: img.mime_type.clone(),
            data: img.data.clone(),
        },
    }));

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        },
    }
}

/// First candidate part carrying image data, passed through untouched.
pub fn extract_image(response: GenerateContentResponse) -> Option<GenerateResponse> {
    response
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .find_map(|part| match part {
            Part::InlineData { inline_data } if inline_data.mime_type.starts_with("image/") => {
                Some(GenerateResponse {
                    image_base64: inline_data.data,
                    mime_type: inline_data.mime_type,
                })
            }
            _ => None,
        })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    // parts the gateway does not model (function calls, thoughts, ...)
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}
