pub mod mapper;
pub mod rect;

pub use mapper::{
    NormalizedDelta, normalized_rect_to_pdf_space, pdf_space_to_normalized, pixel_delta_to_normalized,
    pointer_to_normalized,
};
pub use rect::{NormalizedRect, PageSize, PdfRect, PixelRect, PointerPos};
