pub mod edge;
pub mod machine;
pub mod registry;
pub mod resize;
pub mod transfer;

pub use edge::{CursorIcon, ResizeEdge, detect_edge};
pub use machine::{InteractionMode, OverlayEvent, OverlayMachine, OverlayState, PageContext};
pub use registry::OverlayRegistry;
pub use resize::apply_resize;
pub use transfer::{DragOutcome, apply_drag, resolve_page_transfer};
