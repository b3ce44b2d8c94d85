//! Moving a dragged signature onto the neighbouring page

use crate::geometry::{NormalizedDelta, NormalizedRect};

/// Result of applying a drag delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub rect: NormalizedRect,
    pub page_number: u32,
}

impl DragOutcome {
    pub fn changed_page(&self, from_page: u32) -> bool {
        self.page_number != from_page
    }
}

/// Decide which page a signature lands on after a vertical move.
///
/// Crossing the top of a page wraps the overshoot onto the bottom of the
/// previous page; crossing the bottom wraps it onto the top of the next.
/// Only one page is crossed per call. On the first or last page there is
/// nowhere to go and the position is returned unchanged for the caller to
/// clamp.
pub fn resolve_page_transfer(new_y: f32, height: f32, page_number: u32, total_pages: u32) -> (u32, f32) {
    if new_y < 0.0 && page_number > 1 {
        (page_number - 1, 1.0 + new_y)
    } else if new_y + height > 1.0 && page_number < total_pages {
        (page_number + 1, new_y - 1.0)
    } else {
        (page_number, new_y)
    }
}

/// Translate `initial` by `delta`, transferring pages when it crosses a page
/// boundary and clamping the result onto the page.
pub fn apply_drag(initial: NormalizedRect, delta: NormalizedDelta, page_number: u32, total_pages: u32) -> DragOutcome {
    let (page_number, y) = resolve_page_transfer(initial.y + delta.dy, initial.height, page_number, total_pages);

    let rect = NormalizedRect {
        x: initial.x + delta.dx,
        y,
        ..initial
    }
    .clamp_to_page();

    DragOutcome { rect, page_number }
}
