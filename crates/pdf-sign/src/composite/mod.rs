//! Export pass: stamp signature images onto the document pages

mod document;
mod raster;

pub use document::{DocumentHandle, EmbeddedImage, LopdfDocument};
pub use raster::{PdfImage, decode_signature_image};

use crate::geometry::normalized_rect_to_pdf_space;
use crate::io::LoadedDocument;
use crate::signature::Signature;
use crate::types::*;

/// Why a signature was left out of the output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The signature sits on a page the document does not have
    PageOutOfRange { page_number: u32, page_count: u32 },
    /// The mapped rectangle has no area
    DegenerateRect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkippedSignature {
    pub id: SignatureId,
    pub reason: SkipReason,
}

/// Outcome of a compositing pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeReport {
    /// Signatures drawn, in the order they were drawn
    pub placed: Vec<SignatureId>,
    pub skipped: Vec<SkippedSignature>,
}

impl CompositeReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A signed copy of a document
#[derive(Debug, Clone)]
pub struct SignedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub report: CompositeReport,
}

/// Draw every signature onto `doc` in list order.
///
/// Signatures on missing pages or with no visible area are skipped and
/// reported. An image that cannot be decoded fails the whole pass.
pub fn composite_signatures<D: DocumentHandle>(doc: &mut D, signatures: &[Signature]) -> Result<CompositeReport> {
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(SignError::NoPages);
    }

    let mut report = CompositeReport::default();
    for signature in signatures {
        if signature.page_number == 0 || signature.page_number > page_count {
            log::info!(
                "Skipping signature {}: page {} is outside 1..={}",
                signature.id,
                signature.page_number,
                page_count
            );
            report.skipped.push(SkippedSignature {
                id: signature.id,
                reason: SkipReason::PageOutOfRange {
                    page_number: signature.page_number,
                    page_count,
                },
            });
            continue;
        }

        let image = decode_signature_image(signature)?;

        let Some(page) = doc.page_size(signature.page_number) else {
            return Err(SignError::InvalidDocument(format!(
                "page {} has no size",
                signature.page_number
            )));
        };
        let rect = normalized_rect_to_pdf_space(&signature.rect, page.width_pt, page.height_pt);
        if rect.is_degenerate() {
            log::info!("Skipping signature {}: nothing to draw at {:?}", signature.id, rect);
            report.skipped.push(SkippedSignature {
                id: signature.id,
                reason: SkipReason::DegenerateRect,
            });
            continue;
        }

        let embedded = doc.embed_image(image)?;
        doc.draw_image(signature.page_number, &embedded, &rect)?;
        log::debug!(
            "Placed signature {} on page {} at ({:.1}, {:.1}) {:.1}×{:.1}pt",
            signature.id,
            signature.page_number,
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
        report.placed.push(signature.id);
    }

    Ok(report)
}

/// Composite `signatures` onto a PDF held in memory and serialize the result
pub fn sign_pdf_bytes(bytes: &[u8], signatures: &[Signature]) -> Result<(Vec<u8>, CompositeReport)> {
    let mut doc = LopdfDocument::load_mem(bytes)?;
    let report = composite_signatures(&mut doc, signatures)?;
    let output = doc.serialize()?;
    Ok((output, report))
}

/// Produce the signed copy of a loaded document.
///
/// Nothing is produced unless every step succeeds.
pub async fn export_signed_pdf(document: &LoadedDocument, signatures: &[Signature]) -> Result<SignedPdf> {
    let bytes = std::sync::Arc::clone(&document.bytes);
    let signatures = signatures.to_vec();
    let file_name = document.signed_file_name();

    let (bytes, report) = tokio::task::spawn_blocking(move || sign_pdf_bytes(&bytes, &signatures)).await??;

    log::info!(
        "Exported {} ({} placed, {} skipped)",
        file_name,
        report.placed.len(),
        report.skipped.len()
    );
    Ok(SignedPdf {
        file_name,
        bytes,
        report,
    })
}
