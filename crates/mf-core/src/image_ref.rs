//! Base image references.
//!
//! The editor accepts three URL forms: inline/local URLs (`data:`, `blob:`,
//! `file:`) that are used as-is, absolute `http(s)` URLs that are used as-is,
//! and anything else, which is a path relative to the configured asset base.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageUrlKind {
    /// `data:`, `blob:` or `file:`.
    Inline,
    /// `http://` or `https://`.
    Absolute,
    /// Resolved against the asset base.
    Relative,
}

/// A reference to the base image a meme is composed on.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> ImageUrlKind {
        let lower = self.0.trim_start().to_ascii_lowercase();
        if ["data:", "blob:", "file:"].iter().any(|p| lower.starts_with(p)) {
            ImageUrlKind::Inline
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            ImageUrlKind::Absolute
        } else {
            ImageUrlKind::Relative
        }
    }

    /// Final URL for this reference. Only relative references change: they
    /// are joined onto `asset_base` with exactly one `/` between the parts.
    pub fn resolve(&self, asset_base: &str) -> String {
        match self.kind() {
            ImageUrlKind::Inline | ImageUrlKind::Absolute => self.0.clone(),
            ImageUrlKind::Relative => join_url(asset_base, &self.0),
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data URLs can be megabytes long; keep logs readable.
        const MAX: usize = 64;
        if self.0.len() > MAX {
            let cut = (0..=MAX).rev().find(|&i| self.0.is_char_boundary(i)).unwrap_or(0);
            write!(f, "ImageRef({}…)", &self.0[..cut])
        } else {
            write!(f, "ImageRef({})", self.0)
        }
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches("./").trim_start_matches('/')
    )
}
