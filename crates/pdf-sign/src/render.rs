//! Page rendering for on-screen placement
//!
//! The interaction layer only needs each page's pixel size; raster output is
//! optional and comes from Pdfium when the `pdfium` feature is enabled.

use crate::geometry::PageSize;
use crate::io::LoadedDocument;
use crate::types::*;

/// A page as drawn on screen
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page_number: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub page_size: PageSize,
    /// RGBA8 pixels, row-major, when the renderer produced a raster
    pub rgba: Option<Vec<u8>>,
}

impl RenderedPage {
    /// Rendered width, the scale pointer deltas are normalized against
    pub fn width_px(&self) -> f32 {
        self.pixel_width as f32
    }

    pub fn height_px(&self) -> f32 {
        self.pixel_height as f32
    }
}

pub trait PageRenderer {
    /// Render a 1-based page at `target_width_px` pixels wide
    fn render_page(&self, document: &LoadedDocument, page_number: u32, target_width_px: u32) -> Result<RenderedPage>;
}

fn page_size_or_err(document: &LoadedDocument, page_number: u32) -> Result<PageSize> {
    document.page_size(page_number).ok_or_else(|| {
        SignError::Render(format!(
            "page {} is outside 1..={}",
            page_number,
            document.page_count()
        ))
    })
}

/// Computes page pixel sizes from page geometry without rasterizing
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRenderer;

impl PageRenderer for LayoutRenderer {
    fn render_page(&self, document: &LoadedDocument, page_number: u32, target_width_px: u32) -> Result<RenderedPage> {
        let page_size = page_size_or_err(document, page_number)?;
        let pixel_height = (target_width_px as f32 * page_size.aspect_ratio()).round() as u32;
        Ok(RenderedPage {
            page_number,
            pixel_width: target_width_px,
            pixel_height,
            page_size,
            rgba: None,
        })
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::*;
    use pdfium_render::prelude::*;

    /// Rasterizes pages through the system Pdfium library
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfiumRenderer;

    impl PageRenderer for PdfiumRenderer {
        fn render_page(
            &self,
            document: &LoadedDocument,
            page_number: u32,
            target_width_px: u32,
        ) -> Result<RenderedPage> {
            let page_size = page_size_or_err(document, page_number)?;
            let render_err = |e: PdfiumError| SignError::Render(e.to_string());

            let pdfium = Pdfium::bind_to_system_library().map(Pdfium::new).map_err(render_err)?;
            let pdf = pdfium
                .load_pdf_from_byte_slice(&document.bytes, None)
                .map_err(render_err)?;
            let page = pdf.pages().get((page_number - 1) as u16).map_err(render_err)?;

            let config = PdfRenderConfig::new().set_target_width(target_width_px as i32);
            let bitmap = page.render_with_config(&config).map_err(render_err)?;

            Ok(RenderedPage {
                page_number,
                pixel_width: bitmap.width() as u32,
                pixel_height: bitmap.height() as u32,
                page_size,
                rgba: Some(bitmap.as_rgba_bytes().to_vec()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn document(sizes: Vec<PageSize>) -> LoadedDocument {
        LoadedDocument {
            name: "test.pdf".to_string(),
            bytes: Arc::new(Vec::new()),
            page_sizes: sizes,
            display_uri: String::new(),
        }
    }

    #[test]
    fn test_layout_keeps_aspect_ratio() {
        let doc = document(vec![PageSize::new(612.0, 792.0), PageSize::new(792.0, 612.0)]);
        let portrait = LayoutRenderer.render_page(&doc, 1, 600).unwrap();
        assert_eq!((portrait.pixel_width, portrait.pixel_height), (600, 776));

        let landscape = LayoutRenderer.render_page(&doc, 2, 600).unwrap();
        assert_eq!(landscape.pixel_height, 464);
        assert!(landscape.rgba.is_none());
    }

    #[test]
    fn test_layout_rejects_missing_page() {
        let doc = document(vec![PageSize::default()]);
        assert!(matches!(LayoutRenderer.render_page(&doc, 2, 600), Err(SignError::Render(_))));
        assert!(LayoutRenderer.render_page(&doc, 0, 600).is_err());
    }
}
