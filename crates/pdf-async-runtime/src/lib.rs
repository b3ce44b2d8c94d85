use std::path::PathBuf;

mod handlers;
mod store;
mod worker;

pub use store::DocumentStore;
pub use worker::{run_worker, worker_task};

// Re-export types from library crates
pub use pdf_sign::{CompositeReport, LoadedDocument, PageRenderer, RenderedPage, Signature};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum SignCommand {
    /// Load a PDF from disk. A newer queued load replaces an older one.
    LoadDocument {
        path: PathBuf,
    },
    /// Load a PDF the host already holds in memory, such as an upload
    LoadDocumentBytes {
        name: String,
        bytes: Vec<u8>,
    },
    RenderPage {
        doc_id: DocumentId,
        page_number: u32,
        target_width_px: u32,
    },
    /// Composite signatures and write the signed copy.
    ///
    /// Without an output path the copy is written next to the source file.
    Export {
        doc_id: DocumentId,
        signatures: Vec<Signature>,
        output_path: Option<PathBuf>,
    },
    CloseDocument {
        doc_id: DocumentId,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum SignUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    DocumentLoaded {
        doc_id: DocumentId,
        document: LoadedDocument,
    },
    PageRendered {
        doc_id: DocumentId,
        page: RenderedPage,
    },
    Exported {
        doc_id: DocumentId,
        path: PathBuf,
        report: CompositeReport,
    },
    DocumentClosed {
        doc_id: DocumentId,
    },
    Error {
        message: String,
    },
}

/// Handle to a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);
