use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SignError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("PDF has no pages")]
    NoPages,
    #[error("Not a PDF document: {0}")]
    InvalidDocument(String),
    #[error("Document too large: {size} bytes (limit {limit} bytes)")]
    DocumentTooLarge { size: u64, limit: u64 },
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Image too large: {size} bytes (limit {limit} bytes)")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("Failed to decode signature {id}: {reason}")]
    Decode { id: SignatureId, reason: String },
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, SignError>;

/// How a signature image was produced. Provenance only, never affects geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SignatureKind {
    /// Freehand strokes on a signature pad
    #[default]
    Drawn,
    /// Text rendered in a handwriting-style font
    Typed,
    /// An image file supplied by the user
    Uploaded,
}

/// Opaque signature identifier, assigned once at creation and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SignatureId(Uuid);

impl SignatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SignatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which screen the application is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// No document loaded yet
    #[default]
    Landing,
    /// Placing and editing signatures
    Signing,
    /// Read-only review before export
    Preview,
}

/// Keys the signing core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Other,
}

impl Key {
    pub fn removes_selection(self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}
