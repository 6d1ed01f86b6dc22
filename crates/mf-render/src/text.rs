//! Overlay text rasterization using cosmic-text.
//!
//! Each overlay line is shaped on its own (the text is split on `\n`, never
//! wrapped), centered horizontally on the overlay origin and placed at its
//! `line_offsets` slot. The result is a single alpha mask in the overlay's
//! local frame, ready to be blended under the overlay transform.

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent, fontdb};
use image::{GrayImage, Luma};
use mf_core::layout::line_height;
use mf_core::{FontFamily, GenericFamily, Point, Rect, TextOverlay, Vec2, line_offsets};
use std::path::Path;

/// Coverage mask of an overlay's text block.
#[derive(Debug, Clone)]
pub struct TextMask {
    pub alpha: GrayImage,
    /// Local-frame position of pixel (0, 0); the frame origin is the box center.
    pub origin: Vec2,
}

impl TextMask {
    pub fn empty() -> Self {
        Self {
            alpha: GrayImage::new(0, 0),
            origin: Vec2::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.width() == 0 || self.alpha.height() == 0
    }

    pub fn local_bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.alpha.width() as f64,
            self.origin.y + self.alpha.height() as f64,
        )
    }

    /// Bilinear coverage in `0.0..=1.0` at a local-frame point.
    pub fn sample(&self, local: Point) -> f32 {
        let (w, h) = self.alpha.dimensions();
        if w == 0 || h == 0 {
            return 0.0;
        }
        let u = local.x - self.origin.x - 0.5;
        let v = local.y - self.origin.y - 0.5;
        let (x0, y0) = (u.floor(), v.floor());
        let (fx, fy) = (u - x0, v - y0);
        let at = |x: f64, y: f64| -> f64 {
            if x < 0.0 || y < 0.0 || x >= w as f64 || y >= h as f64 {
                0.0
            } else {
                self.alpha.get_pixel(x as u32, y as u32)[0] as f64 / 255.0
            }
        };
        let top = at(x0, y0) * (1.0 - fx) + at(x0 + 1.0, y0) * fx;
        let bottom = at(x0, y0 + 1.0) * (1.0 - fx) + at(x0 + 1.0, y0 + 1.0) * fx;
        (top * (1.0 - fy) + bottom * fy) as f32
    }
}

struct PlacedGlyph {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

/// Font system plus glyph cache.
pub struct FontBook {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl FontBook {
    /// System fonts, plus every font file under `fonts_dir` if given.
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        let mut font_system = FontSystem::new();
        if let Some(dir) = fonts_dir {
            font_system.db_mut().load_fonts_dir(dir);
        }
        let book = Self {
            font_system,
            swash_cache: SwashCache::new(),
        };
        log::debug!("font book ready: {} faces", book.face_count());
        book
    }

    /// No fonts at all; every overlay rasterizes to an empty mask.
    pub fn empty() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    /// Only the faces in `db`; no system fonts.
    pub fn from_database(db: fontdb::Database) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
            swash_cache: SwashCache::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.font_system.db().len()
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.font_system
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)))
    }

    /// The named face when installed, otherwise its generic fallback.
    fn family_for(&self, font: FontFamily) -> Family<'static> {
        if self.has_family(font.name()) {
            return Family::Name(font.name());
        }
        log::trace!("{} not installed, using generic family", font.name());
        match font.generic() {
            GenericFamily::SansSerif => Family::SansSerif,
            GenericFamily::Serif => Family::Serif,
            GenericFamily::Monospace => Family::Monospace,
        }
    }

    /// Rasterize the overlay's text block into its local frame.
    pub fn rasterize(&mut self, overlay: &TextOverlay) -> TextMask {
        // cosmic-text cannot shape anything without at least one face.
        if self.face_count() == 0 {
            log::warn!("no fonts available, overlay {} drawn without text", overlay.id);
            return TextMask::empty();
        }
        let font_size = overlay.font_size.max(1.0);
        let lh = line_height(font_size) as f32;
        let lines: Vec<&str> = overlay.lines().collect();
        let offsets = line_offsets(lines.len(), font_size);
        let attrs = Attrs::new().family(self.family_for(overlay.font));

        let mut glyphs = Vec::new();
        for (line, offset) in lines.iter().zip(offsets.iter()) {
            if line.trim().is_empty() {
                continue;
            }
            let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(font_size, lh));
            buffer.set_size(&mut self.font_system, None, None);
            buffer.set_text(&mut self.font_system, line, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(&mut self.font_system, false);

            let line_top = *offset as f32 - lh / 2.0;
            for run in buffer.layout_runs() {
                let left = -run.line_w / 2.0;
                for glyph in run.glyphs.iter() {
                    let physical = glyph.physical((0.0, 0.0), 1.0);
                    let Some(image) = self
                        .swash_cache
                        .get_image(&mut self.font_system, physical.cache_key)
                        .as_ref()
                    else {
                        continue;
                    };
                    let (width, height) = (image.placement.width, image.placement.height);
                    if width == 0 || height == 0 {
                        continue;
                    }
                    glyphs.push(PlacedGlyph {
                        x: (left + physical.x as f32).round() as i32 + image.placement.left,
                        y: (line_top + run.line_y).round() as i32 + physical.y - image.placement.top,
                        width,
                        height,
                        alpha: coverage(&image.data, image.content, width, height),
                    });
                }
            }
        }
        log::trace!("overlay {}: {} glyphs", overlay.id, glyphs.len());
        assemble(&glyphs)
    }
}

/// Per-pixel coverage from any swash content type.
fn coverage(data: &[u8], content: SwashContent, width: u32, height: u32) -> Vec<u8> {
    // (bytes per pixel, channel carrying coverage)
    let (stride, channel) = match content {
        SwashContent::Mask => (1, 0),
        SwashContent::SubpixelMask => (3, 0),
        SwashContent::Color => (4, 3),
    };
    (0..(width * height) as usize)
        .map(|i| data.get(i * stride + channel).copied().unwrap_or(0))
        .collect()
}

fn assemble(glyphs: &[PlacedGlyph]) -> TextMask {
    let Some(first) = glyphs.first() else {
        return TextMask::empty();
    };
    let (mut x0, mut y0) = (first.x, first.y);
    let (mut x1, mut y1) = (first.x + first.width as i32, first.y + first.height as i32);
    for g in &glyphs[1..] {
        x0 = x0.min(g.x);
        y0 = y0.min(g.y);
        x1 = x1.max(g.x + g.width as i32);
        y1 = y1.max(g.y + g.height as i32);
    }

    let mut alpha = GrayImage::new((x1 - x0) as u32, (y1 - y0) as u32);
    for g in glyphs {
        let (ox, oy) = ((g.x - x0) as u32, (g.y - y0) as u32);
        for row in 0..g.height {
            for col in 0..g.width {
                let a = g.alpha[(row * g.width + col) as usize];
                if a == 0 {
                    continue;
                }
                let px = alpha.get_pixel_mut(ox + col, oy + row);
                // Overlapping glyph edges keep the stronger coverage.
                *px = Luma([px[0].max(a)]);
            }
        }
    }
    TextMask {
        alpha,
        origin: Vec2::new(x0 as f64, y0 as f64),
    }
}
