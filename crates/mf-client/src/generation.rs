//! AI image generation.

use crate::api::ApiClient;
use crate::error::ApiError;
use mf_core::GeneratedImageMetadata;
use serde::{Deserialize, Serialize};

pub const GENERATE_PATH: &str = "/ai/generate";
pub const DEFAULT_STYLE: &str = "realistic";
pub const DEFAULT_MODEL: &str = "stable-diffusion";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: DEFAULT_STYLE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.prompt.trim().is_empty() {
            return Err(ApiError::Validation("Prompt is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    image: GeneratedImageMetadata,
}

/// Validate locally, submit, and check the returned image metadata.
pub fn generate(
    client: &ApiClient,
    request: &GenerationRequest,
) -> Result<GeneratedImageMetadata, ApiError> {
    request.validate()?;
    let trimmed = GenerationRequest {
        prompt: request.prompt.trim().to_string(),
        ..request.clone()
    };
    log::debug!("generating {:?} ({}, {})", trimmed.prompt, trimmed.style, trimmed.model);
    let response: GenerateResponse = client.post(GENERATE_PATH, &trimmed)?;
    Ok(response.image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_prompt_is_rejected_locally() {
        let err = GenerationRequest::new("   ").validate().unwrap_err();
        assert_eq!(err.user_message(), "Prompt is required");
    }

    #[test]
    fn wire_shape() {
        let req = GenerationRequest::new("cat").style("cartoon").model("sdxl");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"prompt": "cat", "style": "cartoon", "model": "sdxl"})
        );
    }

    #[test]
    fn response_without_url_is_invalid() {
        let parsed: Result<GenerateResponse, _> =
            serde_json::from_str(r#"{"image":{"prompt":"cat"}}"#);
        assert!(parsed.is_err());
    }
}
