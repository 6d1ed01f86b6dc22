//! Saving a finished meme to the user's collection.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::transport::MultipartForm;
use mf_core::GeneratedImageMetadata;
use mf_render::export::DEFAULT_FILE_NAME;

pub const SAVE_PATH: &str = "/ai/save";

/// Multipart body: the PNG, the overlays as JSON and, for generated base
/// images, how the image was made.
pub fn save_form(
    png: Vec<u8>,
    overlays_json: String,
    generated: Option<&GeneratedImageMetadata>,
) -> MultipartForm {
    let mut form = MultipartForm::new()
        .file("image", png, DEFAULT_FILE_NAME, "image/png")
        .text("overlays", overlays_json);
    if let Some(meta) = generated {
        form = form
            .text("prompt", meta.prompt.clone())
            .text("style", meta.style.clone())
            .text("modelUsed", meta.model_used.clone());
    }
    form
}

/// Upload; returns the backend's confirmation body.
pub fn save_to_collection(
    client: &ApiClient,
    png: Vec<u8>,
    overlays_json: String,
    generated: Option<&GeneratedImageMetadata>,
) -> Result<serde_json::Value, ApiError> {
    log::debug!("saving meme ({} bytes)", png.len());
    client.post_multipart(SAVE_PATH, save_form(png, overlays_json, generated))
}
