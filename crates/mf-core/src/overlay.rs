//! The ordered overlay collection.
//!
//! Insertion order is z-order: later overlays paint on top. All operations
//! are forgiving: updating, removing or selecting an unknown id is a no-op.

use crate::id::{IdAllocator, OverlayId};
use crate::model::{
    DEFAULT_OVERLAY_HEIGHT, DEFAULT_OVERLAY_WIDTH, OverlayPatch, SurfaceSize, TextOverlay,
    TextSettings,
};
use serde::{Deserialize, Serialize};

/// Fallback spawn point when the surface size is not known yet.
const FALLBACK_SPAWN: (f32, f32) = (50.0, 50.0);

/// Values used by [`OverlaySet::add`].
#[derive(Debug, Clone, Default)]
pub struct OverlayDefaults {
    pub settings: TextSettings,
    /// Spawn position; `None` centers the default box on `surface`.
    pub position: Option<(f32, f32)>,
    pub surface: Option<SurfaceSize>,
    pub text: Option<String>,
}

impl OverlayDefaults {
    pub fn spawn_position(&self) -> (f32, f32) {
        if let Some(pos) = self.position {
            return pos;
        }
        match self.surface {
            Some(s) if !s.is_empty() => (
                ((s.width as f32 - DEFAULT_OVERLAY_WIDTH) / 2.0).max(0.0),
                ((s.height as f32 - DEFAULT_OVERLAY_HEIGHT) / 2.0).max(0.0),
            ),
            _ => FALLBACK_SPAWN,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    overlays: Vec<TextOverlay>,
    selected: Option<OverlayId>,
    ids: IdAllocator,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self {
            overlays: Vec::new(),
            selected: None,
            ids: IdAllocator::new(),
        }
    }

    /// Rebuild from serialized overlays (e.g. a saved meme being re-edited).
    /// Future ids continue after the largest restored id.
    pub fn from_overlays(overlays: Vec<TextOverlay>) -> Self {
        let mut set = Self::new();
        for mut overlay in overlays {
            set.ids.observe(overlay.id);
            overlay.clamp_size();
            set.overlays.push(overlay);
        }
        set
    }

    /// Append a new overlay on top; returns its id.
    pub fn add(&mut self, defaults: &OverlayDefaults) -> OverlayId {
        let id = self.ids.allocate();
        let (x, y) = defaults.spawn_position();
        let mut overlay = TextOverlay::new(id, x, y, &defaults.settings);
        if let Some(text) = &defaults.text {
            overlay.text.clone_from(text);
        }
        log::debug!("add overlay {id} at ({x}, {y})");
        self.overlays.push(overlay);
        id
    }

    /// Merge `patch` into the overlay with `id`. Returns whether it existed.
    pub fn update(&mut self, id: OverlayId, patch: &OverlayPatch) -> bool {
        match self.get_mut(id) {
            Some(overlay) => {
                overlay.apply(patch);
                log::trace!("update overlay {id}: {patch:?}");
                true
            }
            None => false,
        }
    }

    /// Delete the overlay with `id`. Returns whether it existed.
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let Some(pos) = self.overlays.iter().position(|o| o.id == id) else {
            return false;
        };
        self.overlays.remove(pos);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("remove overlay {id}");
        true
    }

    /// Set or clear the single selected overlay. Selecting an unknown id
    /// leaves the selection unchanged and returns `false`.
    pub fn select(&mut self, id: Option<OverlayId>) -> bool {
        match id {
            Some(id) if !self.contains(id) => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    pub fn selected_overlay(&self) -> Option<&TextOverlay> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: OverlayId) -> bool {
        self.selected == Some(id)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.overlays.iter().any(|o| o.id == id)
    }

    pub fn get(&self, id: OverlayId) -> Option<&TextOverlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: OverlayId) -> Option<&mut TextOverlay> {
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    /// Overlays in paint order (bottom first).
    pub fn iter(&self) -> std::slice::Iter<'_, TextOverlay> {
        self.overlays.iter()
    }

    pub fn as_slice(&self) -> &[TextOverlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Owned copy of the overlays, for export.
    pub fn snapshot(&self) -> Vec<TextOverlay> {
        self.overlays.clone()
    }
}

impl<'a> IntoIterator for &'a OverlaySet {
    type Item = &'a TextOverlay;
    type IntoIter = std::slice::Iter<'a, TextOverlay>;

    fn into_iter(self) -> Self::IntoIter {
        self.overlays.iter()
    }
}

/// Serialized form: just the overlays, in z-order.
impl Serialize for OverlaySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.overlays.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OverlaySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TextOverlay>::deserialize(deserializer).map(Self::from_overlays)
    }
}
