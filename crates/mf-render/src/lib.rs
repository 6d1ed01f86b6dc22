//! Native compositor: loads the base image, rasterizes overlay text and
//! flattens both into a PNG-ready bitmap.

pub mod composite;
pub mod error;
pub mod export;
pub mod source;
pub mod text;

pub use composite::{Compositor, CompositorConfig, ResizeFilter, blend_mask};
pub use error::RenderError;
pub use export::{ShareOutcome, ShareSheet, download, encode_png, share};
pub use source::{AssetBase, ImageLoader, RemoteFetch};
pub use text::{FontBook, TextMask};
