//! Hit testing: surface point → overlay part.
//!
//! Handles of the selected overlay are checked first, then overlay bodies
//! in reverse paint order (topmost first). All checks happen in the
//! overlay's local frame, so rotated boxes and handles hit where they are
//! drawn.

use mf_core::layout::{half_extents, overlay_transform, to_local};
use mf_core::{OverlayId, OverlaySet, Point, TextOverlay};

/// Side length of the square resize handles, in surface pixels.
pub const HANDLE_SIZE: f64 = 12.0;
/// Distance of the rotate handle above the top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Radius of the round rotate handle.
pub const ROTATE_HANDLE_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    Right,
    Bottom,
    Corner,
}

impl ResizeDirection {
    pub fn affects_width(self) -> bool {
        matches!(self, Self::Right | Self::Corner)
    }

    pub fn affects_height(self) -> bool {
        matches!(self, Self::Bottom | Self::Corner)
    }
}

/// The interactive part of an overlay under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Body(OverlayId),
    Resize(OverlayId, ResizeDirection),
    Rotate(OverlayId),
}

impl HitTarget {
    pub fn id(self) -> OverlayId {
        match self {
            Self::Body(id) | Self::Resize(id, _) | Self::Rotate(id) => id,
        }
    }
}

/// Handle centers in surface space, for drawing selection chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleLayout {
    pub right: Point,
    pub bottom: Point,
    pub corner: Point,
    pub rotate: Point,
}

fn local_handles(overlay: &TextOverlay) -> [(Point, Option<ResizeDirection>); 4] {
    let h = half_extents(overlay);
    [
        (Point::new(0.0, -h.y - ROTATE_HANDLE_OFFSET), None),
        (Point::new(h.x, h.y), Some(ResizeDirection::Corner)),
        (Point::new(h.x, 0.0), Some(ResizeDirection::Right)),
        (Point::new(0.0, h.y), Some(ResizeDirection::Bottom)),
    ]
}

pub fn handle_layout(overlay: &TextOverlay) -> HandleLayout {
    let t = overlay_transform(overlay);
    let [rotate, corner, right, bottom] = local_handles(overlay).map(|(p, _)| t * p);
    HandleLayout {
        right,
        bottom,
        corner,
        rotate,
    }
}

/// Find what is under `(px, py)`. Returns `None` for the background.
pub fn hit_test(overlays: &OverlaySet, px: f32, py: f32) -> Option<HitTarget> {
    let p = Point::new(px as f64, py as f64);

    if let Some(selected) = overlays.selected_overlay()
        && let Some(hit) = hit_handle(selected, p)
    {
        return Some(hit);
    }

    overlays
        .iter()
        .rev()
        .find(|o| body_contains(o, p))
        .map(|o| HitTarget::Body(o.id))
}

fn hit_handle(overlay: &TextOverlay, p: Point) -> Option<HitTarget> {
    let local = to_local(overlay, p);
    let half = HANDLE_SIZE / 2.0;
    for (center, dir) in local_handles(overlay) {
        let d = local - center;
        let hit = match dir {
            None => d.hypot() <= ROTATE_HANDLE_RADIUS,
            Some(_) => d.x.abs() <= half && d.y.abs() <= half,
        };
        if hit {
            return Some(match dir {
                None => HitTarget::Rotate(overlay.id),
                Some(dir) => HitTarget::Resize(overlay.id, dir),
            });
        }
    }
    None
}

fn body_contains(overlay: &TextOverlay, p: Point) -> bool {
    let local = to_local(overlay, p);
    let h = half_extents(overlay);
    local.x.abs() <= h.x && local.y.abs() <= h.y
}
