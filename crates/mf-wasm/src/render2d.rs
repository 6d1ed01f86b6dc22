//! Canvas2D export renderer.
//!
//! Draws the base image stretched to the preview size, then each overlay in
//! collection order. Overlays go through the same local frame as the native
//! compositor (`overlay_transform`, `line_offsets`), so a browser export and
//! a server-side one put text in the same place.

use mf_core::{TextOverlay, line_offsets, overlay_transform};
use mf_editor::ExportSnapshot;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Everything needed to paint one overlay, independent of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OverlayPaint {
    /// `[a, b, c, d, e, f]` for `CanvasRenderingContext2d::transform`.
    pub transform: [f64; 6],
    pub font: String,
    pub fill: String,
    /// Each line with its vertical offset from the box center.
    pub lines: Vec<(String, f64)>,
}

impl OverlayPaint {
    pub(crate) fn new(overlay: &TextOverlay) -> Self {
        let count = overlay.lines().count();
        let lines = overlay
            .lines()
            .zip(line_offsets(count, overlay.font_size))
            .map(|(line, dy)| (line.to_string(), dy))
            .collect();
        Self {
            transform: overlay_transform(overlay).as_coeffs(),
            font: overlay.font.css_font(overlay.font_size),
            fill: overlay.color.to_css(),
            lines,
        }
    }
}

/// Why an `<img>` cannot be drawn yet, if it cannot.
pub(crate) fn image_not_ready(complete: bool, natural_width: u32) -> Option<&'static str> {
    if !complete {
        Some("base image is still loading")
    } else if natural_width == 0 {
        Some("base image failed to load")
    } else {
        None
    }
}

pub fn render_export(
    ctx: &CanvasRenderingContext2d,
    image: &HtmlImageElement,
    snapshot: &ExportSnapshot,
) -> Result<(), JsValue> {
    // drawImage on a broken or pending image draws nothing and does not throw.
    if let Some(reason) = image_not_ready(image.complete(), image.natural_width()) {
        return Err(js_sys::Error::new(reason).into());
    }
    let w = snapshot.surface.width as f64;
    let h = snapshot.surface.height as f64;

    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, w, h)?;

    for overlay in &snapshot.overlays {
        draw_overlay(ctx, &OverlayPaint::new(overlay))?;
    }
    log::trace!("exported {} overlays at {w}x{h}", snapshot.overlays.len());
    Ok(())
}

fn draw_overlay(ctx: &CanvasRenderingContext2d, paint: &OverlayPaint) -> Result<(), JsValue> {
    ctx.save();
    let [a, b, c, d, e, f] = paint.transform;
    let drawn = ctx.transform(a, b, c, d, e, f).and_then(|()| {
        ctx.set_font(&paint.font);
        ctx.set_fill_style_str(&paint.fill);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        for (line, dy) in &paint.lines {
            ctx.fill_text(line, 0.0, *dy)?;
        }
        Ok(())
    });
    // Restore even when a call failed, or later overlays inherit the frame.
    ctx.restore();
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::{Color, FontFamily, OverlayId, TextSettings};
    use pretty_assertions::assert_eq;

    fn overlay(text: &str) -> TextOverlay {
        let settings = TextSettings {
            color: Color::rgba(255, 0, 0, 255),
            font: FontFamily::ComicSans,
            font_size: 20.0,
        };
        let mut o = TextOverlay::new(OverlayId::from_raw(1), 50.0, 80.0, &settings);
        o.text = text.to_string();
        o
    }

    #[test]
    fn only_decoded_images_are_drawn() {
        assert_eq!(image_not_ready(false, 0), Some("base image is still loading"));
        assert_eq!(image_not_ready(false, 640), Some("base image is still loading"));
        // `complete` is also true for a broken image or one without a src.
        assert_eq!(image_not_ready(true, 0), Some("base image failed to load"));
        assert_eq!(image_not_ready(true, 640), None);
    }

    #[test]
    fn unrotated_overlay_translates_to_center() {
        let paint = OverlayPaint::new(&overlay("TOP"));
        assert_eq!(paint.transform, [1.0, 0.0, 0.0, 1.0, 150.0, 100.0]);
        assert_eq!(paint.font, "20px \"Comic Sans MS\", sans-serif");
        assert_eq!(paint.fill, "rgba(255, 0, 0, 1.000)");
        assert_eq!(paint.lines, vec![("TOP".to_string(), 0.0)]);
    }

    #[test]
    fn lines_are_centered_as_a_block() {
        let paint = OverlayPaint::new(&overlay("A\n\nC"));
        let offsets: Vec<f64> = paint.lines.iter().map(|(_, dy)| *dy).collect();
        assert_eq!(offsets, vec![-24.0, 0.0, 24.0]);
        assert_eq!(paint.lines[1].0, "");
    }

    #[test]
    fn rotation_uses_overlay_transform() {
        let mut o = overlay("X");
        o.rotation = 90.0;
        let [a, b, c, d, e, f] = OverlayPaint::new(&o).transform;
        assert!(a.abs() < 1e-9 && (b - 1.0).abs() < 1e-9);
        assert!((c + 1.0).abs() < 1e-9 && d.abs() < 1e-9);
        assert_eq!((e, f), (150.0, 100.0));
    }
}
