//! Conversions between pixel space, normalized page space and PDF user space
//!
//! All functions are total: degenerate inputs produce zero or degenerate
//! results instead of errors, and callers decide what to do with them.

use super::rect::{NormalizedRect, PdfRect, PixelRect, PointerPos};

/// A pointer movement expressed as a fraction of the rendered page width
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedDelta {
    pub dx: f32,
    pub dy: f32,
}

/// Convert a pixel movement into normalized units.
///
/// Both axes are divided by the rendered page *width*. Page overlays are
/// rendered at a fixed width so the horizontal scale is the one that stays
/// stable across pages of different aspect ratios.
pub fn pixel_delta_to_normalized(dx_px: f32, dy_px: f32, page_rendered_width_px: f32) -> NormalizedDelta {
    if !(page_rendered_width_px.is_finite() && page_rendered_width_px > 0.0) {
        return NormalizedDelta::default();
    }

    NormalizedDelta {
        dx: dx_px / page_rendered_width_px,
        dy: dy_px / page_rendered_width_px,
    }
}

/// Map a normalized rectangle to PDF user space on a page of the given size.
///
/// The result is clamped to the page's lower-left origin and trimmed so it
/// does not extend past the page. Non-finite input yields a degenerate
/// rectangle, which the export pass skips.
pub fn normalized_rect_to_pdf_space(rect: &NormalizedRect, page_width_pt: f32, page_height_pt: f32) -> PdfRect {
    if !rect.is_finite() || !page_width_pt.is_finite() || !page_height_pt.is_finite() {
        return PdfRect::default();
    }

    let x = (rect.x * page_width_pt).max(0.0);
    let y = (page_height_pt - rect.y * page_height_pt - rect.height * page_height_pt).max(0.0);
    let width = (rect.width * page_width_pt).min(page_width_pt - x);
    let height = (rect.height * page_height_pt).min(page_height_pt - y);

    PdfRect { x, y, width, height }
}

/// Inverse of [`normalized_rect_to_pdf_space`] for rectangles inside the page
pub fn pdf_space_to_normalized(rect: &PdfRect, page_width_pt: f32, page_height_pt: f32) -> NormalizedRect {
    if !(page_width_pt > 0.0 && page_height_pt > 0.0) {
        return NormalizedRect::default();
    }

    NormalizedRect {
        x: rect.x / page_width_pt,
        y: (page_height_pt - rect.y - rect.height) / page_height_pt,
        width: rect.width / page_width_pt,
        height: rect.height / page_height_pt,
    }
}

/// Position of a pointer relative to a page image, as page fractions.
///
/// Values fall outside `[0, 1]` when the pointer is off the page.
pub fn pointer_to_normalized(pointer: PointerPos, page_bounds: &PixelRect) -> (f32, f32) {
    if !(page_bounds.width > 0.0 && page_bounds.height > 0.0) {
        return (0.0, 0.0);
    }

    (
        (pointer.x - page_bounds.left) / page_bounds.width,
        (pointer.y - page_bounds.top) / page_bounds.height,
    )
}
