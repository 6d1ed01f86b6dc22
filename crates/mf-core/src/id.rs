use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for a text overlay.
///
/// Allocated by an [`IdAllocator`] owned by the overlay collection.
/// 8 bytes, Copy, Eq, Hash in O(1). Values are never handed out twice by
/// the same allocator, so an id stays unique for the whole editing session
/// even after the overlay it named is removed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Wrap a raw value (e.g. one that crossed the JS boundary).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source. Never compacts or rewinds.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> OverlayId {
        // `Default` starts at 0; skip it so raw 0 can mean "none" on the JS side.
        if self.next == 0 {
            self.next = 1;
        }
        let id = OverlayId(self.next);
        self.next += 1;
        id
    }

    /// Make sure future ids are strictly greater than `seen`.
    /// Used when a collection is rebuilt from serialized overlays.
    pub fn observe(&mut self, seen: OverlayId) {
        if seen.0 >= self.next {
            self.next = seen.0 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_ids_are_unique_and_increasing() {
        let mut alloc = IdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn default_allocator_never_yields_zero() {
        let mut alloc = IdAllocator::default();
        assert_eq!(alloc.allocate().raw(), 1);
    }

    #[test]
    fn observe_skips_past_restored_ids() {
        let mut alloc = IdAllocator::new();
        alloc.observe(OverlayId::from_raw(41));
        assert_eq!(alloc.allocate().raw(), 42);
    }
}
