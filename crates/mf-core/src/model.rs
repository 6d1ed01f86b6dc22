//! Overlay data model.
//!
//! A meme is a base image plus an ordered list of [`TextOverlay`]s. Each
//! overlay is a box in surface-local pixel space carrying text, styling and
//! a rotation about its center.

use crate::id::OverlayId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Smallest width an overlay box may have, in surface pixels.
pub const MIN_OVERLAY_WIDTH: f32 = 40.0;
/// Smallest height an overlay box may have, in surface pixels.
pub const MIN_OVERLAY_HEIGHT: f32 = 20.0;

pub const DEFAULT_OVERLAY_WIDTH: f32 = 200.0;
pub const DEFAULT_OVERLAY_HEIGHT: f32 = 40.0;
pub const DEFAULT_OVERLAY_TEXT: &str = "YOUR TEXT";

// ─── Color ───────────────────────────────────────────────────────────────

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 | 4 => {
                let mut ch = [255u8; 4];
                for (slot, &b) in ch.iter_mut().zip(bytes) {
                    *slot = hex_val(b)? * 17;
                }
                Some(Self::rgba(ch[0], ch[1], ch[2], ch[3]))
            }
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS `rgba()` form, accepted by Canvas2D `fillStyle`.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::parser::parse_color(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Fonts ───────────────────────────────────────────────────────────────

/// Generic CSS family used when the named face is not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
}

/// The fixed set of fonts offered by the editor's font picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "Impact")]
    Impact,
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "Comic Sans MS")]
    ComicSans,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "Courier New")]
    CourierNew,
    #[serde(rename = "Georgia")]
    Georgia,
    #[serde(rename = "Verdana")]
    Verdana,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Impact,
        FontFamily::Arial,
        FontFamily::ComicSans,
        FontFamily::TimesNewRoman,
        FontFamily::CourierNew,
        FontFamily::Georgia,
        FontFamily::Verdana,
    ];

    /// Face name as installed on the system / used in CSS.
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Impact => "Impact",
            FontFamily::Arial => "Arial",
            FontFamily::ComicSans => "Comic Sans MS",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Georgia => "Georgia",
            FontFamily::Verdana => "Verdana",
        }
    }

    pub fn generic(self) -> GenericFamily {
        match self {
            FontFamily::TimesNewRoman | FontFamily::Georgia => GenericFamily::Serif,
            FontFamily::CourierNew => GenericFamily::Monospace,
            _ => GenericFamily::SansSerif,
        }
    }

    /// Canvas2D `font` shorthand, e.g. `32px "Comic Sans MS", sans-serif`.
    pub fn css_font(self, size_px: f32) -> String {
        let generic = match self.generic() {
            GenericFamily::SansSerif => "sans-serif",
            GenericFamily::Serif => "serif",
            GenericFamily::Monospace => "monospace",
        };
        format!("{size_px}px \"{}\", {generic}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────

/// Rendered size of the editor preview, in surface-local pixels.
///
/// Overlay coordinates are captured in this space, so the compositor sizes
/// its output to it rather than to the base image's native resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ─── Text settings ───────────────────────────────────────────────────────

/// Global styling applied to newly added overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    pub color: Color,
    pub font: FontFamily,
    pub font_size: f32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            font: FontFamily::Impact,
            font_size: 32.0,
        }
    }
}

// ─── Overlay ─────────────────────────────────────────────────────────────

/// One movable, resizable, rotatable text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub id: OverlayId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, about the box center.
    pub rotation: f32,
    pub color: Color,
    pub font: FontFamily,
    pub font_size: f32,
}

impl TextOverlay {
    /// Create an overlay with default geometry at `(x, y)` styled from `settings`.
    pub fn new(id: OverlayId, x: f32, y: f32, settings: &TextSettings) -> Self {
        Self {
            id,
            text: DEFAULT_OVERLAY_TEXT.to_string(),
            x,
            y,
            width: DEFAULT_OVERLAY_WIDTH,
            height: DEFAULT_OVERLAY_HEIGHT,
            rotation: 0.0,
            color: settings.color,
            font: settings.font,
            font_size: settings.font_size,
        }
    }

    /// Merge every field present in `patch`. Size writes are clamped to the
    /// minimum box, never rejected.
    pub fn apply(&mut self, patch: &OverlayPatch) {
        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(r) = patch.rotation {
            self.rotation = r;
        }
        if let Some(c) = patch.color {
            self.color = c;
        }
        if let Some(f) = patch.font {
            self.font = f;
        }
        if let Some(s) = patch.font_size {
            self.font_size = s;
        }
        self.clamp_size();
    }

    pub fn clamp_size(&mut self) {
        // `max` also replaces NaN with the floor.
        self.width = self.width.max(MIN_OVERLAY_WIDTH);
        self.height = self.height.max(MIN_OVERLAY_HEIGHT);
    }

    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.text.split('\n')
    }
}

/// A partial update for [`TextOverlay::apply`]. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayPatch {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub color: Option<Color>,
    pub font: Option<FontFamily>,
    pub font_size: Option<f32>,
}

impl OverlayPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn style(settings: &TextSettings) -> Self {
        Self {
            color: Some(settings.color),
            font: Some(settings.font),
            font_size: Some(settings.font_size),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_color_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#FF000080"), Some(Color::rgba(255, 0, 0, 128)));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#12"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn hex_color_emit() {
        assert_eq!(Color::rgb(255, 204, 0).to_hex(), "#FFCC00");
        assert_eq!(Color::rgba(0, 0, 0, 0).to_hex(), "#00000000");
    }

    #[test]
    fn apply_patch_clamps_size() {
        let mut o = TextOverlay::new(OverlayId::from_raw(1), 0.0, 0.0, &TextSettings::default());
        o.apply(&OverlayPatch::size(-500.0, 3.0));
        assert_eq!((o.width, o.height), (MIN_OVERLAY_WIDTH, MIN_OVERLAY_HEIGHT));
    }

    #[test]
    fn apply_patch_leaves_absent_fields() {
        let mut o = TextOverlay::new(OverlayId::from_raw(1), 10.0, 20.0, &TextSettings::default());
        o.apply(&OverlayPatch::text("TOP\nBOTTOM"));
        assert_eq!((o.x, o.y), (10.0, 20.0));
        assert_eq!(o.lines().collect::<Vec<_>>(), vec!["TOP", "BOTTOM"]);
    }

    #[test]
    fn overlay_json_shape() {
        let o = TextOverlay::new(OverlayId::from_raw(7), 1.0, 2.0, &TextSettings::default());
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["fontSize"], 32.0);
        assert_eq!(json["font"], "Impact");
        assert_eq!(json["color"], "#FFFFFF");
    }

    #[test]
    fn font_lookup_by_name() {
        assert_eq!(FontFamily::from_name("comic sans ms"), Some(FontFamily::ComicSans));
        assert_eq!(FontFamily::from_name("Wingdings"), None);
        assert_eq!(
            FontFamily::CourierNew.css_font(12.0),
            "12px \"Courier New\", monospace"
        );
    }
}
