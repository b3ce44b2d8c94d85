//! Shared constants for signature placement and compositing
//!
//! This module centralizes magic numbers used by the interaction layer,
//! the creation path and the export pass.

// =============================================================================
// Interaction
// =============================================================================

/// Distance in pixels from an overlay edge that activates a resize handle
pub const EDGE_THRESHOLD_PX: f32 = 8.0;

/// Smallest width/height a resize may produce, as a fraction of the page
pub const MIN_SIGNATURE_SIZE: f32 = 0.05;

/// Width of a newly placed signature, as a fraction of page width
pub const DEFAULT_SIGNATURE_WIDTH: f32 = 0.2;

/// Height of a newly placed signature, as a fraction of page height
pub const DEFAULT_SIGNATURE_HEIGHT: f32 = 0.1;

/// Pixel width pages are rendered at before the renderer reports otherwise
pub const DEFAULT_RENDER_WIDTH_PX: u32 = 600;

// =============================================================================
// Limits
// =============================================================================

/// Largest accepted PDF upload (50 MiB)
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Largest accepted signature image upload (5 MiB)
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Payloads shorter than this are suspicious but still accepted
pub const SHORT_PAYLOAD_WARNING_LEN: usize = 100;

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Signature Pad
// =============================================================================

/// Canvas size used for drawn signatures (pixels)
pub const SIGNATURE_PAD_SIZE: (u32, u32) = (400, 150);

/// Stroke width for drawn signatures (pixels)
pub const SIGNATURE_STROKE_WIDTH: f32 = 2.5;

// =============================================================================
// Output
// =============================================================================

/// Prefix added to the file name of an exported document
pub const SIGNED_FILE_PREFIX: &str = "signed_";

/// Fallback file name when the source document has none
pub const DEFAULT_FILE_NAME: &str = "document.pdf";
