use serde::{Deserialize, Serialize};

// Gateway API request format
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub style: String,
    #[serde(default)]
    pub images: Vec<InlineImage>,
}

// Reference image attached to a request, forwarded upstream as-is
#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

// Gateway API response format
#[derive(Deserialize, Serialize, Clone)]
pub struct GenerateResponse {
    pub image_base64: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}
