use crate::store::DocumentStore;
use crate::{DocumentId, SignUpdate};
use pdf_sign::{Limits, PageRenderer, Signature, export_signed_pdf, load_document, load_document_bytes, save_pdf_bytes};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

fn send_error(update_tx: &mpsc::UnboundedSender<SignUpdate>, message: String) {
    log::error!("{}", message);
    let _ = update_tx.send(SignUpdate::Error { message });
}

pub async fn handle_load(
    path: PathBuf,
    limits: &Limits,
    store: &mut DocumentStore,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    match load_document(&path, limits).await {
        Ok(document) => {
            let doc_id = store.insert(document.clone(), Some(path));
            let _ = update_tx.send(SignUpdate::DocumentLoaded { doc_id, document });
        }
        Err(e) => send_error(update_tx, format!("Failed to load PDF: {e}")),
    }
}

pub async fn handle_load_bytes(
    name: String,
    bytes: Vec<u8>,
    limits: &Limits,
    store: &mut DocumentStore,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    match load_document_bytes(name, bytes, limits).await {
        Ok(document) => {
            let doc_id = store.insert(document.clone(), None);
            let _ = update_tx.send(SignUpdate::DocumentLoaded { doc_id, document });
        }
        Err(e) => send_error(update_tx, format!("Failed to load PDF: {e}")),
    }
}

pub async fn handle_render_page(
    doc_id: DocumentId,
    page_number: u32,
    target_width_px: u32,
    renderer: &Arc<dyn PageRenderer + Send + Sync>,
    store: &mut DocumentStore,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    // Check cache first
    if let Some(cached) = store.cached_page(doc_id, page_number, target_width_px) {
        let _ = update_tx.send(SignUpdate::PageRendered {
            doc_id,
            page: cached.clone(),
        });
        return;
    }

    let Some(document) = store.get(doc_id).cloned() else {
        send_error(update_tx, format!("Document not found: {:?}", doc_id));
        return;
    };

    let renderer = Arc::clone(renderer);
    match tokio::task::spawn_blocking(move || renderer.render_page(&document, page_number, target_width_px)).await {
        Ok(Ok(page)) => {
            store.cache_page(doc_id, target_width_px, page.clone());
            let _ = update_tx.send(SignUpdate::PageRendered { doc_id, page });
        }
        Ok(Err(e)) => send_error(update_tx, format!("Failed to render page: {e}")),
        Err(e) => send_error(update_tx, format!("Task join error: {e}")),
    }
}

pub async fn handle_export(
    doc_id: DocumentId,
    signatures: Vec<Signature>,
    output_path: Option<PathBuf>,
    store: &DocumentStore,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    let Some(document) = store.get(doc_id) else {
        send_error(update_tx, format!("Document not found: {:?}", doc_id));
        return;
    };

    let total = signatures.len();
    let _ = update_tx.send(SignUpdate::Progress {
        operation: "Signing".to_string(),
        current: 0,
        total,
    });

    let signed = match export_signed_pdf(document, &signatures).await {
        Ok(signed) => signed,
        Err(e) => {
            send_error(update_tx, format!("Failed to export PDF: {e}"));
            return;
        }
    };

    let path = output_path.unwrap_or_else(|| match store.source_path(doc_id) {
        Some(source) => source.with_file_name(&signed.file_name),
        None => PathBuf::from(&signed.file_name),
    });

    if let Err(e) = save_pdf_bytes(&signed.bytes, &path).await {
        send_error(update_tx, format!("Failed to save PDF: {e}"));
        return;
    }

    let _ = update_tx.send(SignUpdate::Progress {
        operation: "Signing".to_string(),
        current: total,
        total,
    });
    let _ = update_tx.send(SignUpdate::Exported {
        doc_id,
        path,
        report: signed.report,
    });
}

pub async fn handle_close(doc_id: DocumentId, store: &mut DocumentStore, update_tx: &mpsc::UnboundedSender<SignUpdate>) {
    if store.remove(doc_id).is_some() {
        let _ = update_tx.send(SignUpdate::DocumentClosed { doc_id });
    } else {
        send_error(update_tx, format!("Document not found: {:?}", doc_id));
    }
}
