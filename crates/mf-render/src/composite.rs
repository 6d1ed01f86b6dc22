//! Flattening a base image and its overlays into one bitmap.
//!
//! The canvas always has the preview's size, not the image's native size:
//! overlay coordinates were captured in preview pixels and must land 1:1.
//! Overlays are drawn in collection order, so later ones end up on top.

use crate::error::RenderError;
use crate::source::{AssetBase, ImageLoader, RemoteFetch};
use crate::text::{FontBook, TextMask};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use mf_core::layout::transformed_bounds;
use mf_core::{Affine, Color, ImageRef, Point, SurfaceSize, TextOverlay, overlay_transform};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the base image is stretched onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositorConfig {
    /// Directory or `http(s)` URL that relative image paths resolve against.
    pub asset_base: Option<String>,
    /// Extra font files (e.g. a bundled Impact) on top of the system fonts.
    pub fonts_dir: Option<PathBuf>,
    pub resize_filter: ResizeFilter,
}

#[derive(Debug)]
pub struct Compositor {
    loader: ImageLoader,
    fonts: FontBook,
    filter: ResizeFilter,
}

impl Compositor {
    pub fn new(config: &CompositorConfig) -> Self {
        Self {
            loader: ImageLoader::new(config.asset_base.as_deref().map(AssetBase::parse)),
            fonts: FontBook::new(config.fonts_dir.as_deref()),
            filter: config.resize_filter,
        }
    }

    pub fn from_parts(loader: ImageLoader, fonts: FontBook, filter: ResizeFilter) -> Self {
        Self {
            loader,
            fonts,
            filter,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn RemoteFetch>) -> Self {
        self.loader.set_fetcher(fetcher);
        self
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Load `base`, then flatten. A failed load is an error, never a blank
    /// canvas.
    pub fn composite(
        &mut self,
        base: &ImageRef,
        surface: SurfaceSize,
        overlays: &[TextOverlay],
    ) -> Result<RgbaImage, RenderError> {
        if surface.is_empty() {
            return Err(RenderError::EmptySurface {
                width: surface.width,
                height: surface.height,
            });
        }
        let image = self.loader.load(base)?;
        Ok(self.composite_image(&image, surface, overlays))
    }

    /// Flatten an already decoded base image.
    pub fn composite_image(
        &mut self,
        base: &DynamicImage,
        surface: SurfaceSize,
        overlays: &[TextOverlay],
    ) -> RgbaImage {
        let mut canvas = stretch(base, surface, self.filter.into());
        for overlay in overlays {
            let mask = self.fonts.rasterize(overlay);
            blend_mask(&mut canvas, &mask, overlay_transform(overlay), overlay.color);
        }
        log::debug!(
            "composited {} overlays onto {}x{}",
            overlays.len(),
            surface.width,
            surface.height
        );
        canvas
    }
}

fn stretch(base: &DynamicImage, surface: SurfaceSize, filter: FilterType) -> RgbaImage {
    let rgba = base.to_rgba8();
    if rgba.dimensions() == (surface.width, surface.height) {
        rgba
    } else {
        imageops::resize(&rgba, surface.width, surface.height, filter)
    }
}

/// Paint `color` through `mask` placed with `transform` (local → canvas).
///
/// Walks canvas pixels inside the transformed mask bounds and samples the
/// mask through the inverse transform, so rotated text stays solid.
pub fn blend_mask(canvas: &mut RgbaImage, mask: &TextMask, transform: Affine, color: Color) {
    if mask.is_empty() || color.a == 0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let bounds = transformed_bounds(transform, mask.local_bounds());
    let x0 = bounds.x0.floor().clamp(0.0, cw as f64) as u32;
    let x1 = bounds.x1.ceil().clamp(0.0, cw as f64) as u32;
    let y0 = bounds.y0.floor().clamp(0.0, ch as f64) as u32;
    let y1 = bounds.y1.ceil().clamp(0.0, ch as f64) as u32;

    let inverse = transform.inverse();
    for y in y0..y1 {
        for x in x0..x1 {
            let local = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let coverage = mask.sample(local);
            if coverage <= 0.0 {
                continue;
            }
            let alpha = coverage * color.a as f32 / 255.0;
            source_over(canvas.get_pixel_mut(x, y), color, alpha);
        }
    }
}

fn source_over(dst: &mut Rgba<u8>, color: Color, alpha: f32) {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for (i, src) in [color.r, color.g, color.b].into_iter().enumerate() {
        let mixed = (src as f32 * alpha + dst[i] as f32 * dst_a * (1.0 - alpha)) / out_a;
        dst[i] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}
