//! Integration tests: pointer gestures driven through `EditorSession`.
//!
//! Every scenario goes through `handle_input`, i.e. hit testing, the
//! controller state machine and mutation application together.

use mf_core::{MIN_OVERLAY_HEIGHT, MIN_OVERLAY_WIDTH, OverlayId, OverlayPatch, Point, SurfaceSize};
use mf_editor::input::{EventScope, InputEvent};
use mf_editor::{EditorSession, Gesture, GestureController};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::test_runner::Config;

/// Session with one 200×40 overlay at (100, 100), selected.
/// Center (200, 120); right handle (300, 120); bottom (200, 140);
/// corner (300, 140); rotate handle (200, 75).
fn session() -> (EditorSession, OverlayId) {
    let mut s = EditorSession::new();
    s.set_surface(SurfaceSize::new(800, 600));
    let id = s.add_text();
    s.update_overlay(id, &OverlayPatch::position(100.0, 100.0));
    s.select(Some(id));
    (s, id)
}

fn mv(x: f32, y: f32) -> InputEvent {
    InputEvent::from_pointer_move(x, y, EventScope::Surface)
}

fn doc_mv(x: f32, y: f32) -> InputEvent {
    InputEvent::from_pointer_move(x, y, EventScope::Document)
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_then_release_on_surface() {
    let (mut s, id) = session();
    s.handle_input(&InputEvent::from_pointer_down(150.0, 110.0));
    assert!(s.handle_input(&mv(170.0, 95.0)));
    s.handle_input(&InputEvent::from_pointer_up(170.0, 95.0));

    let o = s.overlays().get(id).unwrap();
    assert_eq!((o.x, o.y), (120.0, 85.0));
    assert!(s.controller().is_idle());

    // Moves after release are ignored.
    assert!(!s.handle_input(&mv(400.0, 400.0)));
    assert_eq!(s.overlays().get(id).unwrap().x, 120.0);
}

#[test]
fn drag_released_by_leaving_surface() {
    let (mut s, id) = session();
    s.handle_input(&InputEvent::from_pointer_down(150.0, 110.0));
    s.handle_input(&mv(160.0, 110.0));
    s.handle_input(&InputEvent::PointerLeave);
    s.handle_input(&mv(500.0, 500.0));
    assert_eq!(s.overlays().get(id).unwrap().x, 110.0);
}

#[test]
fn press_on_unselected_overlay_does_not_select() {
    let (mut s, id) = session();
    s.select(None);
    s.handle_input(&InputEvent::from_pointer_down(150.0, 110.0));
    assert_eq!(s.overlays().selected(), None);
    s.handle_input(&InputEvent::from_pointer_up(150.0, 110.0));
    s.handle_input(&InputEvent::from_click(150.0, 110.0));
    assert_eq!(s.overlays().selected(), Some(id));
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn corner_resize_follows_document_moves() {
    let (mut s, id) = session();
    s.handle_input(&InputEvent::from_pointer_down(300.0, 140.0));
    assert!(matches!(s.controller().state(), Gesture::Resizing { .. }));
    s.handle_input(&InputEvent::PointerLeave);
    s.handle_input(&doc_mv(350.0, 200.0));
    s.handle_input(&InputEvent::from_pointer_up(350.0, 200.0));

    let o = s.overlays().get(id).unwrap();
    assert_eq!((o.width, o.height), (250.0, 100.0));
    assert_eq!((o.x, o.y), (100.0, 100.0), "resize must not move the box");
}

// ─── Rotate ─────────────────────────────────────────────────────────────

#[test]
fn rotate_quarter_turn() {
    let (mut s, id) = session();
    // Rotate handle sits straight above center: start angle -90°.
    s.handle_input(&InputEvent::from_pointer_down(200.0, 75.0));
    assert!(matches!(s.controller().state(), Gesture::Rotating { .. }));
    // Straight right of center: 0°.
    s.handle_input(&doc_mv(300.0, 120.0));
    s.handle_input(&InputEvent::from_pointer_up(300.0, 120.0));

    let r = s.overlays().get(id).unwrap().rotation;
    assert!((r - 90.0).abs() < 1e-3, "rotation={r}");
}

// ─── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn resize_never_breaks_floor(deltas in prop::collection::vec((-3000.0f32..3000.0, -3000.0f32..3000.0), 1..12)) {
        let (mut s, id) = session();
        s.handle_input(&InputEvent::from_pointer_down(300.0, 140.0));
        for (dx, dy) in deltas {
            s.handle_input(&doc_mv(300.0 + dx, 140.0 + dy));
            let o = s.overlays().get(id).unwrap();
            prop_assert!(o.width >= MIN_OVERLAY_WIDTH);
            prop_assert!(o.height >= MIN_OVERLAY_HEIGHT);
        }
    }

    #[test]
    fn drag_preserves_grab_offset(
        gx in 1.0f32..199.0,
        gy in 1.0f32..39.0,
        path in prop::collection::vec((-500.0f32..1500.0, -500.0f32..1500.0), 1..10),
    ) {
        let (mut s, id) = session();
        // Unselected, so the press can only land on the body.
        s.select(None);
        let (x0, y0) = (100.0f32, 100.0f32);
        let (p0x, p0y) = (x0 + gx, y0 + gy);
        s.handle_input(&InputEvent::from_pointer_down(p0x, p0y));
        for (p1x, p1y) in path {
            s.handle_input(&mv(p1x, p1y));
            let o = s.overlays().get(id).unwrap();
            prop_assert!((o.x - (x0 + (p1x - p0x))).abs() < 1e-2);
            prop_assert!((o.y - (y0 + (p1y - p0y))).abs() < 1e-2);
        }
    }

    #[test]
    fn rotation_is_start_plus_angle_delta(
        r0 in -720.0f32..720.0,
        theta in -179.0f64..179.0,
    ) {
        let (mut s, id) = session();
        s.update_overlay(id, &OverlayPatch::rotation(r0));
        let overlay = s.overlays().get(id).unwrap().clone();

        // Start on the +x axis through the center (200, 120), end at `theta`.
        let mut controller = GestureController::new();
        controller.begin_rotate(&overlay, Point::new(350.0, 120.0));
        let end = Point::new(
            200.0 + 150.0 * theta.to_radians().cos(),
            120.0 + 150.0 * theta.to_radians().sin(),
        );
        s.apply_mutation(controller.update(end).unwrap());
        controller.end();

        let r = s.overlays().get(id).unwrap().rotation as f64;
        let expected = r0 as f64 + theta;
        let diff = (r - expected).rem_euclid(360.0);
        prop_assert!(diff < 1e-2 || diff > 360.0 - 1e-2, "r={r} expected={expected}");
    }

    #[test]
    fn selection_stays_exclusive(clicks in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 1..20)) {
        let (mut s, _) = session();
        let b = s.add_text();
        s.update_overlay(b, &OverlayPatch::position(150.0, 110.0));
        for (x, y) in clicks {
            s.handle_input(&InputEvent::from_click(x, y));
            let selected = s
                .overlays()
                .iter()
                .filter(|o| s.overlays().is_selected(o.id))
                .count();
            prop_assert!(selected <= 1);
        }
    }
}
