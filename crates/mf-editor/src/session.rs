//! Editor session: the aggregate the UI binds to.
//!
//! Owns the base image reference, the overlay collection, the global text
//! settings and the gesture controller. The controller is the only source
//! of pointer-driven mutations; the session applies them and reports
//! whether the view needs to re-render.

use crate::gesture::{GestureController, OverlayMutation};
use crate::hit::hit_test;
use crate::input::InputEvent;
use mf_core::{
    GeneratedImageMetadata, ImageRef, OverlayDefaults, OverlayId, OverlayPatch, OverlaySet,
    SurfaceSize, TextOverlay, TextSettings,
};
use serde::{Deserialize, Serialize};

/// Everything the compositor needs, detached from interaction state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub base_image: ImageRef,
    pub surface: SurfaceSize,
    pub overlays: Vec<TextOverlay>,
}

impl ExportSnapshot {
    pub fn overlays_json(&self) -> String {
        serde_json::to_string(&self.overlays).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Why a session cannot be exported yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    NoBaseImage,
    NoSurface,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::NoBaseImage => f.write_str("Please select an image first"),
            SnapshotError::NoSurface => f.write_str("The editor preview has not been laid out yet"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Debug, Default)]
pub struct EditorSession {
    base_image: Option<ImageRef>,
    overlays: OverlaySet,
    settings: TextSettings,
    surface: Option<SurfaceSize>,
    generated: Option<GeneratedImageMetadata>,
    controller: GestureController,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            overlays: OverlaySet::new(),
            ..Self::default()
        }
    }

    /// Resume editing a saved meme.
    pub fn from_snapshot(snapshot: ExportSnapshot) -> Self {
        Self {
            base_image: Some(snapshot.base_image),
            overlays: OverlaySet::from_overlays(snapshot.overlays),
            surface: Some(snapshot.surface),
            ..Self::default()
        }
    }

    // ─── Base image ──────────────────────────────────────────────────────

    /// Use an uploaded or picked image. Clears AI metadata.
    pub fn set_base_image(&mut self, image: impl Into<ImageRef>) {
        let image = image.into();
        log::debug!("base image {image:?}");
        self.base_image = Some(image);
        self.generated = None;
    }

    /// Use a freshly generated image and remember how it was made.
    pub fn apply_generated_image(&mut self, meta: GeneratedImageMetadata) {
        log::debug!("generated image {:?} ({})", meta.url, meta.model_used);
        self.base_image = Some(meta.url.clone());
        self.generated = Some(meta);
    }

    pub fn base_image(&self) -> Option<&ImageRef> {
        self.base_image.as_ref()
    }

    pub fn generated(&self) -> Option<&GeneratedImageMetadata> {
        self.generated.as_ref()
    }

    /// Record the preview's rendered size (changes with layout).
    pub fn set_surface(&mut self, surface: SurfaceSize) {
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    // ─── Overlay model ───────────────────────────────────────────────────

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn settings(&self) -> &TextSettings {
        &self.settings
    }

    /// "Add Text": new overlay styled from the current settings.
    pub fn add_text(&mut self) -> OverlayId {
        let defaults = OverlayDefaults {
            settings: self.settings,
            surface: self.surface,
            ..OverlayDefaults::default()
        };
        self.overlays.add(&defaults)
    }

    pub fn update_overlay(&mut self, id: OverlayId, patch: &OverlayPatch) -> bool {
        self.overlays.update(id, patch)
    }

    pub fn remove_overlay(&mut self, id: OverlayId) -> bool {
        self.overlays.remove(id)
    }

    pub fn select(&mut self, id: Option<OverlayId>) -> bool {
        self.overlays.select(id)
    }

    /// Change the global text style; the selected overlay picks it up too.
    pub fn set_text_settings(&mut self, settings: TextSettings) {
        self.settings = settings;
        if let Some(id) = self.overlays.selected() {
            self.overlays.update(id, &OverlayPatch::style(&settings));
        }
    }

    // ─── Interaction ─────────────────────────────────────────────────────

    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    /// Hit-test (when the event needs it), run the controller, apply the
    /// resulting mutations. Returns whether anything visible changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let hit = match event.position() {
            Some((x, y)) if event.needs_hit_test() => hit_test(&self.overlays, x, y),
            _ => None,
        };
        let was_idle = self.controller.is_idle();
        let mutations = self.controller.handle(event, hit, &self.overlays);
        let mut changed = was_idle != self.controller.is_idle();
        for mutation in mutations {
            changed |= self.apply_mutation(mutation);
        }
        changed
    }

    pub fn apply_mutation(&mut self, mutation: OverlayMutation) -> bool {
        log::trace!("apply {mutation:?}");
        match mutation {
            OverlayMutation::Move { id, x, y } => {
                self.overlays.update(id, &OverlayPatch::position(x, y))
            }
            OverlayMutation::Resize { id, width, height } => {
                self.overlays.update(id, &OverlayPatch::size(width, height))
            }
            OverlayMutation::Rotate { id, rotation } => {
                self.overlays.update(id, &OverlayPatch::rotation(rotation))
            }
            OverlayMutation::Select(id) => {
                let before = self.overlays.selected();
                self.overlays.select(id) && before != id
            }
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<ExportSnapshot, SnapshotError> {
        let base_image = self.base_image.clone().ok_or(SnapshotError::NoBaseImage)?;
        let surface = self
            .surface
            .filter(|s| !s.is_empty())
            .ok_or(SnapshotError::NoSurface)?;
        Ok(ExportSnapshot {
            base_image,
            surface,
            overlays: self.overlays.snapshot(),
        })
    }

    pub fn overlays_json(&self) -> String {
        serde_json::to_string(&self.overlays).unwrap_or_else(|_| "[]".to_string())
    }
}
