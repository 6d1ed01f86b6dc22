pub mod id;
pub mod image_ref;
pub mod layout;
pub mod meta;
pub mod model;
pub mod overlay;
pub mod parser;

pub use id::OverlayId;
pub use image_ref::{ImageRef, ImageUrlKind};
pub use layout::{LINE_HEIGHT_FACTOR, line_offsets, overlay_transform};
pub use meta::GeneratedImageMetadata;
pub use model::*;
pub use overlay::{OverlayDefaults, OverlaySet};
pub use parser::parse_color;

// Re-export kurbo geometry so downstream crates share one version.
pub use kurbo::{Affine, Point, Rect, Vec2};
