pub mod composite;
pub mod constants;
pub mod creation;
pub mod geometry;
pub mod interaction;
pub mod io;
mod options;
pub mod payload;
pub mod render;
pub mod session;
mod signature;
pub mod state;
mod types;

pub use composite::{
    CompositeReport, DocumentHandle, LopdfDocument, SignedPdf, SkipReason, SkippedSignature, composite_signatures,
    export_signed_pdf, sign_pdf_bytes,
};
pub use geometry::{NormalizedRect, PageSize, PdfRect, PixelRect, PointerPos};
pub use interaction::{CursorIcon, InteractionMode, OverlayEvent, OverlayMachine, OverlayState, ResizeEdge};
pub use io::{LoadedDocument, load_document, load_document_bytes, save_pdf_bytes, signed_output_path};
pub use options::*;
pub use render::{LayoutRenderer, PageRenderer, RenderedPage};
pub use session::{PageLayout, SessionEffects, SigningSession};
pub use signature::*;
pub use state::{AppState, KeyCapture, LoadTicket, PagePoint};
pub use types::*;

#[cfg(feature = "pdfium")]
pub use render::PdfiumRenderer;
