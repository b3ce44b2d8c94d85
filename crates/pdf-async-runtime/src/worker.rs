use crate::handlers;
use crate::store::DocumentStore;
use crate::{SignCommand, SignUpdate};
use pdf_sign::{Limits, PageRenderer};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

#[cfg(feature = "pdfium")]
fn default_renderer() -> Arc<dyn PageRenderer + Send + Sync> {
    Arc::new(pdf_sign::PdfiumRenderer)
}

#[cfg(not(feature = "pdfium"))]
fn default_renderer() -> Arc<dyn PageRenderer + Send + Sync> {
    Arc::new(pdf_sign::LayoutRenderer)
}

/// Async worker task that processes signing commands and sends updates
pub async fn worker_task(
    command_rx: mpsc::UnboundedReceiver<SignCommand>,
    update_tx: mpsc::UnboundedSender<SignUpdate>,
) {
    run_worker(command_rx, update_tx, default_renderer(), Limits::default()).await;
}

/// Worker loop with an explicit page renderer and upload limits
pub async fn run_worker(
    mut command_rx: mpsc::UnboundedReceiver<SignCommand>,
    update_tx: mpsc::UnboundedSender<SignUpdate>,
    renderer: Arc<dyn PageRenderer + Send + Sync>,
    limits: Limits,
) {
    let mut ctx = WorkerContext {
        store: DocumentStore::new(),
        renderer,
        limits,
    };
    let mut backlog = VecDeque::new();

    loop {
        let cmd = match backlog.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        let cmd = coalesce_loads(cmd, &mut command_rx, &mut backlog);
        process_command(cmd, &mut ctx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

struct WorkerContext {
    store: DocumentStore,
    renderer: Arc<dyn PageRenderer + Send + Sync>,
    limits: Limits,
}

fn is_load(cmd: &SignCommand) -> bool {
    matches!(
        cmd,
        SignCommand::LoadDocument { .. } | SignCommand::LoadDocumentBytes { .. }
    )
}

/// Replace a load with any loads queued directly behind it.
///
/// The first non-load command stops the scan and is kept for the next turn.
fn coalesce_loads(
    mut cmd: SignCommand,
    command_rx: &mut mpsc::UnboundedReceiver<SignCommand>,
    backlog: &mut VecDeque<SignCommand>,
) -> SignCommand {
    if !is_load(&cmd) {
        return cmd;
    }
    while backlog.front().is_some_and(is_load) {
        if let Some(next_cmd) = backlog.pop_front() {
            log::debug!("Discarding queued document load, using newer request");
            cmd = next_cmd;
        }
    }
    if !backlog.is_empty() {
        return cmd;
    }
    while let Ok(next_cmd) = command_rx.try_recv() {
        if is_load(&next_cmd) {
            log::debug!("Discarding queued document load, using newer request");
            cmd = next_cmd;
        } else {
            backlog.push_back(next_cmd);
            break;
        }
    }
    cmd
}

async fn process_command(cmd: SignCommand, ctx: &mut WorkerContext, update_tx: &mpsc::UnboundedSender<SignUpdate>) {
    match cmd {
        SignCommand::LoadDocument { path } => {
            handlers::handle_load(path, &ctx.limits, &mut ctx.store, update_tx).await;
        }
        SignCommand::LoadDocumentBytes { name, bytes } => {
            handlers::handle_load_bytes(name, bytes, &ctx.limits, &mut ctx.store, update_tx).await;
        }
        SignCommand::RenderPage {
            doc_id,
            page_number,
            target_width_px,
        } => {
            handlers::handle_render_page(
                doc_id,
                page_number,
                target_width_px,
                &ctx.renderer,
                &mut ctx.store,
                update_tx,
            )
            .await;
        }
        SignCommand::Export {
            doc_id,
            signatures,
            output_path,
        } => {
            handlers::handle_export(doc_id, signatures, output_path, &ctx.store, update_tx).await;
        }
        SignCommand::CloseDocument { doc_id } => {
            handlers::handle_close(doc_id, &mut ctx.store, update_tx).await;
        }
    }
}
