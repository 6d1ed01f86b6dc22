//! Pointer gesture controller.
//!
//! Turns a stream of pointer events into overlay mutations. One pointer
//! drives everything, so at most one gesture is active at a time:
//!
//! | State | Entered on | Follows moves from | Ends on |
//! |-------|------------|--------------------|---------|
//! | `Dragging` | pointer-down on a body | surface only | pointer-up, pointer-leave |
//! | `Resizing` | pointer-down on a resize handle | surface + document | pointer-up |
//! | `Rotating` | pointer-down on the rotate handle | surface + document | pointer-up |
//!
//! Pointer-down never changes the selection; `Click` does. That keeps
//! press-to-drag and click-to-select from firing on the same event.
//!
//! The controller only reads overlays; it emits [`OverlayMutation`]s that
//! the session applies.

use crate::hit::{HitTarget, ResizeDirection};
use crate::input::{EventScope, InputEvent};
use mf_core::layout::{box_center, degrees};
use mf_core::{MIN_OVERLAY_HEIGHT, MIN_OVERLAY_WIDTH, OverlayId, OverlaySet, Point, TextOverlay, Vec2};

/// A discrete change produced by a gesture or click.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayMutation {
    Move { id: OverlayId, x: f32, y: f32 },
    Resize { id: OverlayId, width: f32, height: f32 },
    Rotate { id: OverlayId, rotation: f32 },
    Select(Option<OverlayId>),
}

/// Transient interaction state. Never persisted or exported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: OverlayId,
        /// Pointer position minus overlay position, fixed at gesture start.
        grab: Vec2,
    },
    Resizing {
        id: OverlayId,
        start_pointer: Point,
        start_width: f32,
        start_height: f32,
        direction: ResizeDirection,
    },
    Rotating {
        id: OverlayId,
        center: Point,
        /// Radians, pointer angle around `center` at gesture start.
        start_angle: f64,
        /// Degrees.
        start_rotation: f32,
    },
}

impl Gesture {
    pub fn target(&self) -> Option<OverlayId> {
        match *self {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. }
            | Gesture::Resizing { id, .. }
            | Gesture::Rotating { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: Gesture,
}

fn pointer_angle(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x)
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Gesture {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, Gesture::Idle)
    }

    // ─── Explicit begin/update/end API ───────────────────────────────────

    pub fn begin_drag(&mut self, overlay: &TextOverlay, pointer: Point) {
        let grab = pointer - point(overlay.x, overlay.y);
        self.state = Gesture::Dragging {
            id: overlay.id,
            grab,
        };
        log::debug!("drag start {} grab={grab:?}", overlay.id);
    }

    pub fn begin_resize(&mut self, overlay: &TextOverlay, direction: ResizeDirection, pointer: Point) {
        self.state = Gesture::Resizing {
            id: overlay.id,
            start_pointer: pointer,
            start_width: overlay.width,
            start_height: overlay.height,
            direction,
        };
        log::debug!("resize start {} {direction:?}", overlay.id);
    }

    pub fn begin_rotate(&mut self, overlay: &TextOverlay, pointer: Point) {
        let center = box_center(overlay);
        self.state = Gesture::Rotating {
            id: overlay.id,
            center,
            start_angle: pointer_angle(center, pointer),
            start_rotation: overlay.rotation,
        };
        log::debug!("rotate start {} about {center:?}", overlay.id);
    }

    /// Mutation for the active gesture at `pointer`, or `None` when idle.
    pub fn update(&self, pointer: Point) -> Option<OverlayMutation> {
        match self.state {
            Gesture::Idle => None,
            Gesture::Dragging { id, grab } => {
                let pos = pointer - grab;
                Some(OverlayMutation::Move {
                    id,
                    x: pos.x as f32,
                    y: pos.y as f32,
                })
            }
            Gesture::Resizing {
                id,
                start_pointer,
                start_width,
                start_height,
                direction,
            } => {
                let delta = pointer - start_pointer;
                let width = if direction.affects_width() {
                    (start_width + delta.x as f32).max(MIN_OVERLAY_WIDTH)
                } else {
                    start_width
                };
                let height = if direction.affects_height() {
                    (start_height + delta.y as f32).max(MIN_OVERLAY_HEIGHT)
                } else {
                    start_height
                };
                Some(OverlayMutation::Resize { id, width, height })
            }
            Gesture::Rotating {
                id,
                center,
                start_angle,
                start_rotation,
            } => {
                let current = pointer_angle(center, pointer);
                let rotation = start_rotation as f64 + degrees(current - start_angle);
                Some(OverlayMutation::Rotate {
                    id,
                    rotation: rotation as f32,
                })
            }
        }
    }

    /// Return to idle. Returns whether a gesture was active.
    pub fn end(&mut self) -> bool {
        let was_active = !self.is_idle();
        if was_active {
            log::debug!("gesture end {:?}", self.state.target());
        }
        self.state = Gesture::Idle;
        was_active
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Handle one input event. `hit` is what lies under the pointer for
    /// events that need it (see [`InputEvent::needs_hit_test`]).
    pub fn handle(
        &mut self,
        event: &InputEvent,
        hit: Option<HitTarget>,
        overlays: &OverlaySet,
    ) -> Vec<OverlayMutation> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                let pointer = point(x, y);
                self.state = Gesture::Idle;
                if let Some(target) = hit
                    && let Some(overlay) = overlays.get(target.id())
                {
                    match target {
                        HitTarget::Body(_) => self.begin_drag(overlay, pointer),
                        HitTarget::Resize(_, dir) => self.begin_resize(overlay, dir, pointer),
                        HitTarget::Rotate(_) => self.begin_rotate(overlay, pointer),
                    }
                }
                vec![]
            }
            InputEvent::PointerMove { x, y, scope } => {
                if let Some(id) = self.state.target()
                    && !overlays.contains(id)
                {
                    // Overlay removed mid-gesture.
                    self.end();
                    return vec![];
                }
                let follows = match self.state {
                    Gesture::Idle => false,
                    Gesture::Dragging { .. } => scope == EventScope::Surface,
                    Gesture::Resizing { .. } | Gesture::Rotating { .. } => true,
                };
                if !follows {
                    return vec![];
                }
                self.update(point(x, y)).into_iter().collect()
            }
            InputEvent::PointerUp { .. } => {
                self.end();
                vec![]
            }
            InputEvent::PointerLeave => {
                if matches!(self.state, Gesture::Dragging { .. }) {
                    self.end();
                }
                vec![]
            }
            InputEvent::Click { .. } => match hit {
                Some(HitTarget::Body(id)) => vec![OverlayMutation::Select(Some(id))],
                // Handle clicks don't reach the surface.
                Some(_) => vec![],
                None => vec![OverlayMutation::Select(None)],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::{OverlayDefaults, OverlayPatch};

    fn overlay_at(x: f32, y: f32) -> (OverlaySet, OverlayId) {
        let mut set = OverlaySet::new();
        let id = set.add(&OverlayDefaults {
            position: Some((x, y)),
            ..OverlayDefaults::default()
        });
        (set, id)
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::from_pointer_down(x, y)
    }

    fn surface_move(x: f32, y: f32) -> InputEvent {
        InputEvent::from_pointer_move(x, y, EventScope::Surface)
    }

    fn document_move(x: f32, y: f32) -> InputEvent {
        InputEvent::from_pointer_move(x, y, EventScope::Document)
    }

    #[test]
    fn press_alone_does_not_mutate_or_select() {
        let (set, id) = overlay_at(10.0, 10.0);
        let mut ctl = GestureController::new();
        let muts = ctl.handle(&down(20.0, 20.0), Some(HitTarget::Body(id)), &set);
        assert!(muts.is_empty());
        assert!(matches!(ctl.state(), Gesture::Dragging { .. }));
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let (set, id) = overlay_at(10.0, 10.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(30.0, 25.0), Some(HitTarget::Body(id)), &set);
        let muts = ctl.handle(&surface_move(130.0, 75.0), None, &set);
        assert_eq!(muts, vec![OverlayMutation::Move { id, x: 110.0, y: 60.0 }]);
    }

    #[test]
    fn drag_ignores_document_moves() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(5.0, 5.0), Some(HitTarget::Body(id)), &set);
        assert!(ctl.handle(&document_move(50.0, 50.0), None, &set).is_empty());
    }

    #[test]
    fn pointer_leave_releases_drag_only() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();

        ctl.handle(&down(5.0, 5.0), Some(HitTarget::Body(id)), &set);
        ctl.handle(&InputEvent::PointerLeave, None, &set);
        assert!(ctl.is_idle());
        assert!(ctl.handle(&surface_move(50.0, 50.0), None, &set).is_empty());

        ctl.handle(&down(200.0, 20.0), Some(HitTarget::Resize(id, ResizeDirection::Right)), &set);
        ctl.handle(&InputEvent::PointerLeave, None, &set);
        assert!(matches!(ctl.state(), Gesture::Resizing { .. }));
        let muts = ctl.handle(&document_move(260.0, 500.0), None, &set);
        assert_eq!(muts, vec![OverlayMutation::Resize { id, width: 260.0, height: 40.0 }]);
    }

    #[test]
    fn resize_bottom_keeps_width() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(100.0, 40.0), Some(HitTarget::Resize(id, ResizeDirection::Bottom)), &set);
        let muts = ctl.handle(&surface_move(400.0, 70.0), None, &set);
        assert_eq!(muts, vec![OverlayMutation::Resize { id, width: 200.0, height: 70.0 }]);
    }

    #[test]
    fn resize_clamps_to_floor() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(200.0, 40.0), Some(HitTarget::Resize(id, ResizeDirection::Corner)), &set);
        let muts = ctl.handle(&document_move(-5000.0, -5000.0), None, &set);
        assert_eq!(
            muts,
            vec![OverlayMutation::Resize {
                id,
                width: MIN_OVERLAY_WIDTH,
                height: MIN_OVERLAY_HEIGHT
            }]
        );
    }

    #[test]
    fn rotate_adds_angle_delta() {
        let (mut set, id) = overlay_at(0.0, 0.0);
        set.update(id, &OverlayPatch::rotation(10.0));
        // Center (100, 20). Start straight right of center, end straight below.
        let mut ctl = GestureController::new();
        ctl.handle(&down(200.0, 20.0), Some(HitTarget::Rotate(id)), &set);
        let muts = ctl.handle(&document_move(100.0, 120.0), None, &set);
        match muts.as_slice() {
            [OverlayMutation::Rotate { rotation, .. }] => {
                assert!((rotation - 100.0).abs() < 1e-4, "rotation={rotation}");
            }
            other => panic!("expected Rotate, got {other:?}"),
        }
    }

    #[test]
    fn pointer_up_ends_any_gesture() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(100.0, -45.0), Some(HitTarget::Rotate(id)), &set);
        ctl.handle(&InputEvent::from_pointer_up(900.0, 900.0), None, &set);
        assert!(ctl.is_idle());
    }

    #[test]
    fn click_selects_or_clears() {
        let (set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        assert_eq!(
            ctl.handle(&InputEvent::from_click(5.0, 5.0), Some(HitTarget::Body(id)), &set),
            vec![OverlayMutation::Select(Some(id))]
        );
        assert_eq!(
            ctl.handle(&InputEvent::from_click(500.0, 500.0), None, &set),
            vec![OverlayMutation::Select(None)]
        );
        assert!(
            ctl.handle(&InputEvent::from_click(200.0, 20.0), Some(HitTarget::Rotate(id)), &set)
                .is_empty()
        );
    }

    #[test]
    fn removed_target_stops_gesture() {
        let (mut set, id) = overlay_at(0.0, 0.0);
        let mut ctl = GestureController::new();
        ctl.handle(&down(5.0, 5.0), Some(HitTarget::Body(id)), &set);
        set.remove(id);
        assert!(ctl.handle(&surface_move(50.0, 50.0), None, &set).is_empty());
        assert!(ctl.is_idle());
    }
}
