//! Input abstraction layer.
//!
//! Normalizes browser/native pointer events into surface-local
//! `InputEvent`s consumed by the gesture controller. The adapter that owns
//! the real event subscriptions is responsible for converting client
//! coordinates into surface-local pixels before building these.

/// Where a pointer event was observed.
///
/// Drags only follow moves seen by the editor surface; resize and rotate
/// gestures also follow moves seen at the document level, because the
/// pointer may leave the surface mid-gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    Surface,
    Document,
}

/// A normalized pointer event in surface-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed over the surface.
    PointerDown { x: f32, y: f32 },

    /// Pointer moved.
    PointerMove { x: f32, y: f32, scope: EventScope },

    /// Pointer released, anywhere in the document.
    PointerUp { x: f32, y: f32 },

    /// Pointer left the surface element.
    PointerLeave,

    /// Press and release on the same element without an intervening drag
    /// threshold (the browser's `click`).
    Click { x: f32, y: f32 },
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn from_pointer_move(x: f32, y: f32, scope: EventScope) -> Self {
        Self::PointerMove { x, y, scope }
    }

    pub fn from_pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn from_click(x: f32, y: f32) -> Self {
        Self::Click { x, y }
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y }
            | Self::Click { x, y } => Some((*x, *y)),
            Self::PointerLeave => None,
        }
    }

    /// Whether the adapter should hit-test before dispatching this event.
    pub fn needs_hit_test(&self) -> bool {
        matches!(self, Self::PointerDown { .. } | Self::Click { .. })
    }
}
