use crate::config::KeyworderConfig;
use crate::image::{self, ImagePayload};
use crate::parser::{self, ParseError};
use crate::prompt;
use crate::types::{CaptionOutput, ResponseMode};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Something that turns an image file into caption metadata.
///
/// [`GeminiCaptioner`] is the real implementation; the batch loop only
/// depends on this trait.
#[allow(async_fn_in_trait)]
pub trait ImageCaptioner {
    async fn caption_image(&self, image_path: &Path) -> Result<CaptionOutput, CaptionError>;
}

/// Gemini `generateContent` client for stock captions.
#[derive(Debug, Clone)]
pub struct GeminiCaptioner {
    client: Client,
    config: KeyworderConfig,
}

impl GeminiCaptioner {
    /// Create a captioner. Fails before any network use if the key is blank.
    pub fn new(config: KeyworderConfig) -> Result<Self, CaptionError> {
        Self::with_client(Client::new(), config)
    }

    /// Create a captioner sharing an existing HTTP client.
    pub fn with_client(client: Client, config: KeyworderConfig) -> Result<Self, CaptionError> {
        if config.api_key.trim().is_empty() {
            return Err(CaptionError::MissingApiKey);
        }
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &KeyworderConfig {
        &self.config
    }

    /// Caption an image that is already base64-encoded (no file I/O).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The Gemini endpoint is unreachable
    /// - The API answers with a non-success status
    /// - The answer is empty, blocked, or (in JSON mode) not a valid caption
    pub async fn caption_base64(
        &self,
        image_b64: &str,
        mime_type: &str,
    ) -> Result<CaptionOutput, CaptionError> {
        let body = build_request_body(self.config.mode, image_b64, mime_type);
        let url = self.config.generate_url();

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::Connection(self.config.endpoint.clone(), e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(CaptionError::Api(status, api_error_message(&text)));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| CaptionError::InvalidResponse(e.to_string()))?;

        let text = extract_text(&json)?;
        tracing::debug!(chars = text.len(), "received caption response");

        interpret(self.config.mode, &text)
    }
}

impl ImageCaptioner for GeminiCaptioner {
    /// Load the image (rendering EPS when needed) and caption it.
    async fn caption_image(&self, image_path: &Path) -> Result<CaptionOutput, CaptionError> {
        let ImagePayload {
            mime_type,
            data_b64,
        } = image::load_image(image_path, &self.config.ghostscript).await?;

        tracing::info!(
            "[PROGRESS] Image is loaded: '{}'. Send to Gemini server",
            image_path.display()
        );

        self.caption_base64(&data_b64, mime_type).await
    }
}

/// JSON body for one `generateContent` call.
pub fn build_request_body(mode: ResponseMode, image_b64: &str, mime_type: &str) -> Value {
    let mut body = json!({
        "systemInstruction": {
            "parts": [{ "text": prompt::system_instruction(mode) }],
        },
        "contents": [{
            "role": "user",
            "parts": [{
                "inlineData": {
                    "mimeType": mime_type,
                    "data": image_b64,
                },
            }],
        }],
    });

    if mode == ResponseMode::Json {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": prompt::response_schema(),
        });
    }

    body
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(response: &Value) -> Result<String, CaptionError> {
    let Some(candidate) = response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    else {
        if let Some(reason) = response
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            return Err(CaptionError::Blocked(reason.to_string()));
        }
        return Err(CaptionError::EmptyResponse);
    };

    let text: String = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        if let Some(reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            if reason != "STOP" {
                return Err(CaptionError::Blocked(reason.to_string()));
            }
        }
        return Err(CaptionError::EmptyResponse);
    }

    Ok(text.to_string())
}

/// Turn the response text into a caption for the given mode.
pub fn interpret(mode: ResponseMode, text: &str) -> Result<CaptionOutput, CaptionError> {
    match mode {
        ResponseMode::Text => Ok(CaptionOutput::Text {
            raw: text.trim().to_string(),
            parsed: parser::parse_text_caption(text).ok(),
        }),
        ResponseMode::Json => Ok(CaptionOutput::Structured(parser::parse_json_caption(text)?)),
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Errors that can occur during image captioning.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("'GEMINI_API_KEY' not found")]
    MissingApiKey,

    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Failed to read image: {0}")]
    ImageRead(String),

    #[error("Failed to render EPS: {0}")]
    Render(String),

    #[error("failed to connect Gemini API at {0}: {1}")]
    Connection(String, String),

    #[error("Gemini API returned HTTP {0}: {1}")]
    Api(u16, String),

    #[error("Invalid response from Gemini: {0}")]
    InvalidResponse(String),

    #[error("Gemini blocked the request: {0}")]
    Blocked(String),

    #[error("failed get response server")]
    EmptyResponse,

    #[error("{0}")]
    Parse(#[from] ParseError),
}
