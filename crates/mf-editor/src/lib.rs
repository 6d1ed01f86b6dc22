pub mod gesture;
pub mod hit;
pub mod input;
pub mod session;

pub use gesture::{Gesture, GestureController, OverlayMutation};
pub use hit::{HitTarget, ResizeDirection, hit_test};
pub use input::{EventScope, InputEvent};
pub use session::{EditorSession, ExportSnapshot, SnapshotError};
