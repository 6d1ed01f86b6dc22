//! Geometry shared by hit testing, the native compositor and the Canvas2D
//! export path.
//!
//! Every overlay is drawn in its own frame: origin at the box center, axes
//! rotated by the overlay's rotation. Text lines are centered horizontally
//! and stacked as a block centered on the origin.

use crate::model::TextOverlay;
use kurbo::{Affine, Point, Rect, Vec2};
use smallvec::SmallVec;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

pub fn radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

pub fn line_height(font_size: f32) -> f64 {
    font_size as f64 * LINE_HEIGHT_FACTOR
}

/// Vertical offset of each of `count` lines from the block center:
/// line `i` sits at `(i - (count - 1) / 2) * line_height`.
pub fn line_offsets(count: usize, font_size: f32) -> SmallVec<[f64; 4]> {
    let lh = line_height(font_size);
    let mid = (count as f64 - 1.0) / 2.0;
    (0..count).map(|i| (i as f64 - mid) * lh).collect()
}

/// Axis-aligned box of the overlay, ignoring rotation.
pub fn overlay_rect(overlay: &TextOverlay) -> Rect {
    Rect::new(
        overlay.x as f64,
        overlay.y as f64,
        (overlay.x + overlay.width) as f64,
        (overlay.y + overlay.height) as f64,
    )
}

/// Center of the overlay box. Rotation is about this point, so it is also
/// the center of the rotated element's on-screen bounding box.
pub fn box_center(overlay: &TextOverlay) -> Point {
    overlay_rect(overlay).center()
}

/// Maps overlay-local coordinates (origin at box center, unrotated axes) to
/// surface coordinates.
pub fn overlay_transform(overlay: &TextOverlay) -> Affine {
    let c = box_center(overlay);
    Affine::translate(c.to_vec2()) * Affine::rotate(radians(overlay.rotation as f64))
}

/// Surface point → overlay-local point.
pub fn to_local(overlay: &TextOverlay, surface: Point) -> Point {
    overlay_transform(overlay).inverse() * surface
}

/// Half extents of the box in local coordinates.
pub fn half_extents(overlay: &TextOverlay) -> Vec2 {
    Vec2::new(overlay.width as f64 / 2.0, overlay.height as f64 / 2.0)
}

/// Axis-aligned bounds, in surface space, of a local rectangle after the
/// overlay transform is applied. Used to limit raster work to the pixels
/// a rotated layer can touch.
pub fn transformed_bounds(transform: Affine, local: Rect) -> Rect {
    let corners = [
        Point::new(local.x0, local.y0),
        Point::new(local.x1, local.y0),
        Point::new(local.x0, local.y1),
        Point::new(local.x1, local.y1),
    ];
    let mut out = Rect::from_points(transform * corners[0], transform * corners[0]);
    for &p in &corners[1..] {
        out = out.union_pt(transform * p);
    }
    out
}
