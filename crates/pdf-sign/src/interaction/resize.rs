use super::edge::ResizeEdge;
use crate::geometry::{NormalizedDelta, NormalizedRect};

/// Resize `initial` by dragging `edge` through `delta`.
///
/// The edge opposite the handle stays put. Width and height never shrink
/// below `min_size` and the rectangle never grows past the page.
pub fn apply_resize(initial: NormalizedRect, edge: ResizeEdge, delta: NormalizedDelta, min_size: f32) -> NormalizedRect {
    let mut rect = initial;

    if edge.moves_right() {
        rect.width = (initial.width + delta.dx).min(1.0 - initial.x).max(min_size);
    } else if edge.moves_left() {
        rect.width = (initial.width - delta.dx).min(initial.right()).max(min_size);
        rect.x = initial.right() - rect.width;
    }

    if edge.moves_bottom() {
        rect.height = (initial.height + delta.dy).min(1.0 - initial.y).max(min_size);
    } else if edge.moves_top() {
        rect.height = (initial.height - delta.dy).min(initial.bottom()).max(min_size);
        rect.y = initial.bottom() - rect.height;
    }

    // Only bites when the starting rectangle was already off the page
    rect.clamp_to_page()
}
