//! Document intake and output

use crate::constants::*;
use crate::geometry::PageSize;
use crate::options::Limits;
use crate::payload::encode_data_uri;
use crate::types::*;
use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parent links followed before giving up on an inherited page attribute
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A validated PDF ready for signing
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// File name shown to the user and used to derive the output name
    pub name: String,
    /// Original file contents; the export pass re-parses these
    pub bytes: Arc<Vec<u8>>,
    /// Size of each page in points, in page order
    pub page_sizes: Vec<PageSize>,
    /// The document as a `data:application/pdf` URI for display
    pub display_uri: String,
}

impl LoadedDocument {
    pub fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    /// Size of a 1-based page
    pub fn page_size(&self, page_number: u32) -> Option<PageSize> {
        let index = page_number.checked_sub(1)? as usize;
        self.page_sizes.get(index).copied()
    }

    pub fn signed_file_name(&self) -> String {
        signed_file_name(&self.name)
    }
}

/// Reject files that are too large or not PDFs before parsing
pub fn validate_document_bytes(bytes: &[u8], limits: &Limits) -> Result<()> {
    let size = bytes.len() as u64;
    if size > limits.max_document_bytes {
        return Err(SignError::DocumentTooLarge {
            size,
            limit: limits.max_document_bytes,
        });
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(SignError::InvalidDocument("missing %PDF- header".to_string()));
    }
    Ok(())
}

/// Load a PDF from disk
pub async fn load_document(path: impl AsRef<Path>, limits: &Limits) -> Result<LoadedDocument> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > limits.max_document_bytes {
        return Err(SignError::DocumentTooLarge {
            size: metadata.len(),
            limit: limits.max_document_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await?;
    load_document_bytes(name, bytes, limits).await
}

/// Validate and parse an in-memory PDF.
///
/// Page geometry extraction and display encoding run concurrently; either
/// failing fails the load.
pub async fn load_document_bytes(name: impl Into<String>, bytes: Vec<u8>, limits: &Limits) -> Result<LoadedDocument> {
    validate_document_bytes(&bytes, limits)?;
    let name = name.into();
    let bytes = Arc::new(bytes);

    let parse_bytes = Arc::clone(&bytes);
    let parse = async move {
        tokio::task::spawn_blocking(move || {
            let doc = Document::load_mem(&parse_bytes)?;
            Ok::<_, SignError>(page_sizes(&doc))
        })
        .await?
    };

    let encode_bytes = Arc::clone(&bytes);
    let encode = async move {
        let uri = tokio::task::spawn_blocking(move || encode_data_uri("application/pdf", &encode_bytes)).await?;
        Ok::<_, SignError>(uri)
    };

    let (page_sizes, display_uri) = tokio::try_join!(parse, encode)?;
    if page_sizes.is_empty() {
        return Err(SignError::NoPages);
    }

    log::info!("Loaded {} ({} pages)", name, page_sizes.len());
    Ok(LoadedDocument {
        name,
        bytes,
        page_sizes,
        display_uri,
    })
}

/// Write output bytes to disk
pub async fn save_pdf_bytes(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Name of the signed copy of `name`
pub fn signed_file_name(name: &str) -> String {
    let name = if name.is_empty() { DEFAULT_FILE_NAME } else { name };
    format!("{}{}", SIGNED_FILE_PREFIX, name)
}

/// Default output path next to `input`
pub fn signed_output_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(signed_file_name(&name))
}

// =============================================================================
// Page Geometry
// =============================================================================

/// A page's MediaBox: lower-left corner and extent in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    pub fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }
}

impl Default for PageBox {
    fn default() -> Self {
        Self {
            llx: 0.0,
            lly: 0.0,
            width: DEFAULT_PAGE_WIDTH_PT,
            height: DEFAULT_PAGE_HEIGHT_PT,
        }
    }
}

/// Size of every page in document order
pub fn page_sizes(doc: &Document) -> Vec<PageSize> {
    doc.get_pages().values().map(|&id| page_box(doc, id).size()).collect()
}

/// MediaBox of a page, inherited from the page tree when absent on the page.
///
/// Missing or malformed boxes fall back to US Letter.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let Some(Object::Array(values)) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return PageBox::default();
    };
    let numbers: Vec<f32> = values
        .iter()
        .filter_map(|obj| extract_number(resolve(doc, obj)))
        .collect();
    let &[x0, y0, x1, y1] = &numbers[..] else {
        return PageBox::default();
    };

    let width = (x1 - x0).abs();
    let height = (y1 - y0).abs();
    if width <= 0.0 || height <= 0.0 {
        return PageBox::default();
    }

    PageBox {
        llx: x0.min(x1),
        lly: y0.min(y1),
        width,
        height,
    }
}

/// Look up `key` on a page, walking up `Parent` links for inheritable attributes
pub(crate) fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
    }
    None
}

/// Follow a reference to its target; other objects are returned as-is
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
