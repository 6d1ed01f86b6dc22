//! Metadata for AI-generated base images.
//!
//! The backend returns a loosely-shaped JSON object; it is validated into
//! [`GeneratedImageMetadata`] once, at the API boundary, and carried typed
//! from there on.

use crate::image_ref::ImageRef;
use serde::{Deserialize, Serialize};

/// A validated description of a generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImageMetadata {
    pub url: ImageRef,
    pub prompt: String,
    pub style: String,
    pub model_used: String,
}

/// The wire shape, before validation. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGeneratedImage {
    pub url: Option<String>,
    pub prompt: Option<String>,
    pub style: Option<String>,
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    MissingUrl,
    MissingPrompt,
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::MissingUrl => f.write_str("generated image has no url"),
            MetadataError::MissingPrompt => f.write_str("generated image has no prompt"),
        }
    }
}

impl std::error::Error for MetadataError {}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<RawGeneratedImage> for GeneratedImageMetadata {
    type Error = MetadataError;

    fn try_from(raw: RawGeneratedImage) -> Result<Self, Self::Error> {
        let url = non_empty(raw.url).ok_or(MetadataError::MissingUrl)?;
        let prompt = non_empty(raw.prompt).ok_or(MetadataError::MissingPrompt)?;
        Ok(Self {
            url: ImageRef::new(url),
            prompt,
            style: non_empty(raw.style).unwrap_or_default(),
            model_used: non_empty(raw.model_used).unwrap_or_default(),
        })
    }
}

impl<'de> Deserialize<'de> for GeneratedImageMetadata {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawGeneratedImage::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
