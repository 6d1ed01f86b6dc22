//! WASM bridge for MemeForge: exposes the editor session to the browser.
//!
//! Built with `wasm-pack build --target web`. The page owns the DOM
//! (preview `<img>`, overlay elements, toolbar) and forwards pointer events
//! here in surface-local pixels; everything that decides what an overlay
//! looks like lives on the Rust side.

mod render2d;

use mf_core::{OverlayId, OverlayPatch, SurfaceSize, TextSettings};
use mf_editor::{EditorSession, EventScope, InputEvent};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Browser-facing editor controller.
///
/// Overlay ids cross the boundary as plain numbers; `0` means "none".
#[wasm_bindgen]
pub struct MemeEditor {
    session: EditorSession,
    /// Where relative template paths are served from.
    asset_base: String,
}

#[wasm_bindgen]
impl MemeEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let mut session = EditorSession::new();
        session.set_surface(surface_size(width, height));
        Self {
            session,
            asset_base: String::new(),
        }
    }

    pub fn set_asset_base(&mut self, base: &str) {
        self.asset_base = base.to_string();
    }

    /// Preview was laid out again (window resize, new image).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.set_surface(surface_size(width, height));
    }

    // ─── Base image ──────────────────────────────────────────────────────

    pub fn set_base_image(&mut self, url: &str) {
        self.session.set_base_image(url);
    }

    /// URL the preview `<img>` should load, or `undefined` before an image
    /// is chosen.
    pub fn resolve_base_url(&self) -> Option<String> {
        self.session
            .base_image()
            .map(|image| image.resolve(&self.asset_base))
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    pub fn add_text(&mut self) -> f64 {
        id_to_js(Some(self.session.add_text()))
    }

    /// Merge a JSON patch (`{"text": "...", "fontSize": 40, ...}`) into an
    /// overlay. Returns false for unknown ids and malformed patches.
    pub fn update_overlay(&mut self, id: f64, json: &str) -> bool {
        let Some(id) = id_from_js(id) else {
            return false;
        };
        match parse_patch(json) {
            Ok(patch) => self.session.update_overlay(id, &patch),
            Err(e) => {
                log::warn!("ignoring overlay patch for {id}: {e}");
                false
            }
        }
    }

    pub fn remove_overlay(&mut self, id: f64) -> bool {
        id_from_js(id).is_some_and(|id| self.session.remove_overlay(id))
    }

    pub fn select(&mut self, id: f64) -> bool {
        self.session.select(id_from_js(id))
    }

    pub fn selected_id(&self) -> f64 {
        id_to_js(self.session.overlays().selected())
    }

    /// Change color/font/size for new overlays and the selected one.
    pub fn set_text_settings(&mut self, json: &str) -> bool {
        match serde_json::from_str::<TextSettings>(json) {
            Ok(settings) => {
                self.session.set_text_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("ignoring text settings: {e}");
                false
            }
        }
    }

    pub fn overlays_json(&self) -> String {
        self.session.overlays_json()
    }

    // ─── Pointer input ───────────────────────────────────────────────────
    //
    // Each handler returns true when the page should re-read overlay state.

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.session.handle_input(&InputEvent::from_pointer_down(x, y))
    }

    /// `document` is true for moves observed on `document` rather than on
    /// the preview element.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32, document: bool) -> bool {
        let scope = if document {
            EventScope::Document
        } else {
            EventScope::Surface
        };
        self.session
            .handle_input(&InputEvent::from_pointer_move(x, y, scope))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.session.handle_input(&InputEvent::from_pointer_up(x, y))
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.session.handle_input(&InputEvent::PointerLeave)
    }

    pub fn handle_click(&mut self, x: f32, y: f32) -> bool {
        self.session.handle_input(&InputEvent::from_click(x, y))
    }

    /// True while a drag, resize or rotate is in progress.
    pub fn is_interacting(&self) -> bool {
        !self.session.controller().is_idle()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Flatten the meme onto `ctx`. `image` must already be loaded from
    /// [`resolve_base_url`](Self::resolve_base_url), otherwise the export
    /// rejects; the context's canvas should have the preview's size.
    pub fn export_to(
        &self,
        ctx: &CanvasRenderingContext2d,
        image: &HtmlImageElement,
    ) -> Result<(), JsValue> {
        let snapshot = self
            .session
            .snapshot()
            .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
        render2d::render_export(ctx, image, &snapshot)
    }
}

fn surface_size(width: f64, height: f64) -> SurfaceSize {
    // Layout sizes can be fractional; the export canvas is whole pixels.
    SurfaceSize::new(width.max(0.0).round() as u32, height.max(0.0).round() as u32)
}

fn id_from_js(raw: f64) -> Option<OverlayId> {
    (raw.is_finite() && raw >= 1.0 && raw.fract() == 0.0).then(|| OverlayId::from_raw(raw as u64))
}

fn id_to_js(id: Option<OverlayId>) -> f64 {
    id.map_or(0.0, |id| id.raw() as f64)
}

fn parse_patch(json: &str) -> Result<OverlayPatch, serde_json::Error> {
    serde_json::from_str(json)
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("MemeForge WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
