//! Signature records and their validation

use crate::constants::SHORT_PAYLOAD_WARNING_LEN;
use crate::geometry::NormalizedRect;
use crate::types::{Result, SignError, SignatureId, SignatureKind};

/// A placed signature: an image payload pinned to a rectangle on one page
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Signature {
    pub id: SignatureId,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: SignatureKind,
    /// `data:image/...` URI holding the raster
    pub data: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: NormalizedRect,
    /// 1-based page index
    pub page_number: u32,
}

/// A signature that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SignatureDraft {
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub kind: SignatureKind,
    pub data: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: NormalizedRect,
    pub page_number: u32,
}

impl SignatureDraft {
    pub fn new(kind: SignatureKind, data: impl Into<String>, rect: NormalizedRect, page_number: u32) -> Self {
        Self {
            kind,
            data: data.into(),
            rect,
            page_number,
        }
    }

    /// Check the record is usable.
    ///
    /// Hard problems are errors; suspicious but usable values come back as
    /// warnings so the caller can log them.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>> {
        validate_record(&self.data, &self.rect, self.page_number)
    }

    pub fn into_signature(self) -> Signature {
        Signature {
            id: SignatureId::new(),
            kind: self.kind,
            data: self.data,
            rect: self.rect,
            page_number: self.page_number,
        }
    }
}

impl Signature {
    pub fn validate(&self) -> Result<Vec<ValidationWarning>> {
        validate_record(&self.data, &self.rect, self.page_number)
    }

    /// Apply the fields present in `patch`
    pub fn apply(&mut self, patch: &SignaturePatch) {
        if let Some(x) = patch.x {
            self.rect.x = x;
        }
        if let Some(y) = patch.y {
            self.rect.y = y;
        }
        if let Some(width) = patch.width {
            self.rect.width = width;
        }
        if let Some(height) = patch.height {
            self.rect.height = height;
        }
        if let Some(page_number) = patch.page_number {
            self.page_number = page_number;
        }
    }
}

/// Partial update for a signature; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignaturePatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub page_number: Option<u32>,
}

impl SignaturePatch {
    pub fn rect(rect: NormalizedRect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            page_number: None,
        }
    }

    pub fn page(page_number: u32) -> Self {
        Self {
            page_number: Some(page_number),
            ..Self::default()
        }
    }
}

/// Non-fatal findings from record validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Part of the rectangle lies outside the page
    OutOfBounds,
    /// The image payload is unusually short
    ShortPayload,
}

fn validate_record(data: &str, rect: &NormalizedRect, page_number: u32) -> Result<Vec<ValidationWarning>> {
    if !data.starts_with("data:image/") {
        return Err(SignError::InvalidSignature("image data must be a data:image/ URI".into()));
    }
    if !rect.is_finite() {
        return Err(SignError::InvalidSignature("position and size must be finite numbers".into()));
    }
    if !rect.has_positive_size() {
        return Err(SignError::InvalidSignature(format!(
            "size must be positive, got {}×{}",
            rect.width, rect.height
        )));
    }
    if page_number == 0 {
        return Err(SignError::InvalidSignature("page numbers start at 1".into()));
    }

    let mut warnings = Vec::new();
    if !rect.is_within_page() {
        warnings.push(ValidationWarning::OutOfBounds);
    }
    if data.len() < SHORT_PAYLOAD_WARNING_LEN {
        warnings.push(ValidationWarning::ShortPayload);
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_png_uri() -> String {
        format!("data:image/png;base64,{}", "A".repeat(200))
    }

    #[test]
    fn test_valid_draft_has_no_warnings() {
        let draft = SignatureDraft::new(
            SignatureKind::Drawn,
            long_png_uri(),
            NormalizedRect::new(0.1, 0.1, 0.2, 0.1),
            1,
        );
        assert!(draft.validate().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_image_uri() {
        let draft = SignatureDraft::new(
            SignatureKind::Typed,
            "data:text/plain;base64,AAAA",
            NormalizedRect::new(0.1, 0.1, 0.2, 0.1),
            1,
        );
        assert!(matches!(draft.validate(), Err(SignError::InvalidSignature(_))));
    }

    #[test]
    fn test_rejects_zero_size_and_page_zero() {
        let zero = SignatureDraft::new(SignatureKind::Drawn, long_png_uri(), NormalizedRect::new(0.1, 0.1, 0.0, 0.1), 1);
        assert!(zero.validate().is_err());

        let page_zero =
            SignatureDraft::new(SignatureKind::Drawn, long_png_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 0);
        assert!(page_zero.validate().is_err());
    }

    #[test]
    fn test_warnings_for_out_of_bounds_and_short_payload() {
        let draft = SignatureDraft::new(
            SignatureKind::Uploaded,
            "data:image/png;base64,AAAA",
            NormalizedRect::new(0.9, 0.1, 0.2, 0.1),
            1,
        );
        let warnings = draft.validate().unwrap();
        assert!(warnings.contains(&ValidationWarning::OutOfBounds));
        assert!(warnings.contains(&ValidationWarning::ShortPayload));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut sig = SignatureDraft::new(
            SignatureKind::Drawn,
            long_png_uri(),
            NormalizedRect::new(0.1, 0.2, 0.3, 0.4),
            2,
        )
        .into_signature();
        sig.apply(&SignaturePatch {
            x: Some(0.5),
            ..SignaturePatch::default()
        });
        assert_eq!(sig.rect, NormalizedRect::new(0.5, 0.2, 0.3, 0.4));
        assert_eq!(sig.page_number, 2);

        sig.apply(&SignaturePatch::page(3));
        assert_eq!(sig.page_number, 3);
    }
}
