//! Application state: the loaded document, placed signatures and selection
//!
//! All mutations go through [`AppState`] so the invariants that tie the
//! pieces together hold after every call: the selection always names a live
//! signature, keyboard capture is attached exactly while something is
//! selected, and a placement is armed only while a payload is pending.

use crate::geometry::NormalizedRect;
use crate::interaction::OverlayEvent;
use crate::io::LoadedDocument;
use crate::options::InteractionConfig;
use crate::signature::{Signature, SignatureDraft, SignaturePatch, ValidationWarning};
use crate::types::*;

// =============================================================================
// Document
// =============================================================================

/// Ticket handed out when a load starts; only the newest ticket is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct DocumentState {
    current: Option<LoadedDocument>,
    generation: u64,
}

impl DocumentState {
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Install a finished load; stale loads are dropped and return false
    pub fn finish_load(&mut self, ticket: LoadTicket, document: LoadedDocument) -> bool {
        if ticket.0 != self.generation {
            log::debug!("Dropping stale load of {}", document.name);
            return false;
        }
        self.current = Some(document);
        true
    }

    pub fn current(&self) -> Option<&LoadedDocument> {
        self.current.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.current.as_ref().map_or(0, LoadedDocument::page_count)
    }

    /// Forget the document and invalidate loads still in flight
    pub fn clear(&mut self) {
        self.current = None;
        self.generation += 1;
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// Placed signatures in insertion order, which is also draw order
#[derive(Debug, Clone, Default)]
pub struct SignatureList {
    items: Vec<Signature>,
}

impl SignatureList {
    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Signature] {
        &self.items
    }

    pub fn ids(&self) -> impl Iterator<Item = SignatureId> + '_ {
        self.items.iter().map(|sig| sig.id)
    }

    pub fn on_page(&self, page_number: u32) -> impl Iterator<Item = &Signature> {
        self.items.iter().filter(move |sig| sig.page_number == page_number)
    }

    pub fn get(&self, id: SignatureId) -> Option<&Signature> {
        self.items.iter().find(|sig| sig.id == id)
    }

    pub fn contains(&self, id: SignatureId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, signature: Signature) {
        self.items.push(signature);
    }

    fn update(&mut self, id: SignatureId, patch: &SignaturePatch) -> bool {
        match self.items.iter_mut().find(|sig| sig.id == id) {
            Some(sig) => {
                sig.apply(patch);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: SignatureId) -> Option<Signature> {
        let index = self.items.iter().position(|sig| sig.id == id)?;
        Some(self.items.remove(index))
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

// =============================================================================
// Selection and Placement
// =============================================================================

/// Whether the host should listen for Delete/Backspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCapture {
    Attach,
    Detach,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    selected: Option<SignatureId>,
    active_kind: SignatureKind,
    placing: bool,
    pending_drawn: Option<String>,
    pending_typed: Option<String>,
    pending_uploaded: Option<String>,
}

impl InteractionState {
    pub fn selected(&self) -> Option<SignatureId> {
        self.selected
    }

    pub fn active_kind(&self) -> SignatureKind {
        self.active_kind
    }

    pub fn is_placing(&self) -> bool {
        self.placing
    }

    pub fn key_capture_attached(&self) -> bool {
        self.selected.is_some()
    }

    pub fn pending_payload(&self, kind: SignatureKind) -> Option<&str> {
        match kind {
            SignatureKind::Drawn => self.pending_drawn.as_deref(),
            SignatureKind::Typed => self.pending_typed.as_deref(),
            SignatureKind::Uploaded => self.pending_uploaded.as_deref(),
        }
    }

    fn pending_slot(&mut self, kind: SignatureKind) -> &mut Option<String> {
        match kind {
            SignatureKind::Drawn => &mut self.pending_drawn,
            SignatureKind::Typed => &mut self.pending_typed,
            SignatureKind::Uploaded => &mut self.pending_uploaded,
        }
    }
}

/// A point on a page, in page fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub page_number: u32,
    pub x: f32,
    pub y: f32,
}

// =============================================================================
// AppState
// =============================================================================

#[derive(Debug, Default)]
pub struct AppState {
    view: View,
    config: InteractionConfig,
    document: DocumentState,
    signatures: SignatureList,
    interaction: InteractionState,
}

impl AppState {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.current()
    }

    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    /// Start loading a document; the ticket must accompany the result
    pub fn begin_load(&mut self) -> LoadTicket {
        self.document.begin_load()
    }

    pub fn signatures(&self) -> &SignatureList {
        &self.signatures
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn selected(&self) -> Option<SignatureId> {
        self.interaction.selected
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// A document is loaded and at least one signature is placed
    pub fn can_proceed(&self) -> bool {
        self.document.current().is_some() && !self.signatures.is_empty()
    }

    /// Install a finished load and move to the signing view
    pub fn document_loaded(&mut self, ticket: LoadTicket, document: LoadedDocument) -> bool {
        if !self.document.finish_load(ticket, document) {
            return false;
        }
        self.view = View::Signing;
        true
    }

    pub fn proceed_to_preview(&mut self) -> bool {
        if !self.can_proceed() {
            return false;
        }
        self.view = View::Preview;
        true
    }

    pub fn back_to_signing(&mut self) {
        if self.document.current().is_some() {
            self.view = View::Signing;
        }
    }

    /// Drop the document and every signature, returning to the landing view
    pub fn reset(&mut self) -> Option<KeyCapture> {
        let had_selection = self.interaction.selected.is_some();
        self.document.clear();
        self.signatures.clear();
        self.interaction = InteractionState::default();
        self.view = View::Landing;
        had_selection.then_some(KeyCapture::Detach)
    }

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    /// Validate and insert a new signature, which becomes the selection
    pub fn add_signature(&mut self, draft: SignatureDraft) -> Result<SignatureId> {
        let warnings = draft.validate()?;
        let page_count = self.document.page_count();
        if page_count > 0 && draft.page_number > page_count {
            return Err(SignError::InvalidSignature(format!(
                "page {} is outside 1..={}",
                draft.page_number, page_count
            )));
        }
        for warning in warnings {
            match warning {
                ValidationWarning::OutOfBounds => log::warn!("Signature extends past the page: {:?}", draft.rect),
                ValidationWarning::ShortPayload => log::warn!("Signature image data is unusually short"),
            }
        }

        let signature = draft.into_signature();
        let id = signature.id;
        log::debug!("Added {:?} signature {} on page {}", signature.kind, id, signature.page_number);
        self.signatures.push(signature);
        self.interaction.placing = false;
        self.select(Some(id));
        Ok(id)
    }

    pub fn update_signature(&mut self, id: SignatureId, patch: &SignaturePatch) -> bool {
        self.signatures.update(id, patch)
    }

    pub fn remove_signature(&mut self, id: SignatureId) -> Option<(Signature, Option<KeyCapture>)> {
        let removed = self.signatures.remove(id)?;
        let capture = if self.interaction.selected == Some(id) {
            self.select(None)
        } else {
            None
        };
        log::debug!("Removed signature {}", id);
        Some((removed, capture))
    }

    /// Change the selection.
    ///
    /// Returns the keyboard capture change the host must apply, if any.
    /// Ids that are not in the list clear the selection.
    pub fn select(&mut self, id: Option<SignatureId>) -> Option<KeyCapture> {
        let id = id.filter(|id| self.signatures.contains(*id));
        let was_attached = self.interaction.key_capture_attached();
        self.interaction.selected = id;
        match (was_attached, self.interaction.key_capture_attached()) {
            (false, true) => Some(KeyCapture::Attach),
            (true, false) => Some(KeyCapture::Detach),
            _ => None,
        }
    }

    /// Delete/Backspace removes the selected signature
    pub fn handle_key(&mut self, key: Key) -> Option<SignatureId> {
        if !key.removes_selection() || !self.interaction.key_capture_attached() {
            return None;
        }
        let id = self.interaction.selected?;
        self.remove_signature(id).map(|_| id)
    }

    /// Apply events produced by an overlay's state machine
    pub fn apply_overlay_events(&mut self, id: SignatureId, events: &[OverlayEvent]) -> Option<KeyCapture> {
        let mut capture = None;
        for event in events {
            match *event {
                OverlayEvent::Selected => capture = self.select(Some(id)).or(capture),
                OverlayEvent::PageChanged(page_number) => {
                    self.signatures.update(id, &SignaturePatch::page(page_number));
                }
                OverlayEvent::RectChanged(rect) => {
                    self.signatures.update(id, &SignaturePatch::rect(rect));
                }
                OverlayEvent::CaptureStarted | OverlayEvent::CaptureReleased => {}
            }
        }
        capture
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    pub fn set_active_kind(&mut self, kind: SignatureKind) {
        self.interaction.active_kind = kind;
    }

    /// Finish creating a signature.
    ///
    /// With a position the signature is placed there right away; otherwise
    /// the payload is held and the next page click places it.
    pub fn finalize_signature(
        &mut self,
        kind: SignatureKind,
        data: String,
        position: Option<PagePoint>,
    ) -> Result<Option<SignatureId>> {
        match position {
            Some(point) => self.add_signature(self.draft_at(kind, data, point)).map(Some),
            None => {
                *self.interaction.pending_slot(kind) = Some(data);
                self.interaction.active_kind = kind;
                self.interaction.placing = true;
                Ok(None)
            }
        }
    }

    /// Stop waiting for a placement click
    pub fn cancel_placement(&mut self) {
        self.interaction.placing = false;
    }

    /// A click on a page while a placement is armed.
    ///
    /// Does nothing unless a payload for the active kind is pending.
    pub fn place_at(&mut self, point: PagePoint) -> Result<Option<SignatureId>> {
        if !self.interaction.placing {
            return Ok(None);
        }
        let kind = self.interaction.active_kind;
        let Some(data) = self.interaction.pending_payload(kind).filter(|d| !d.is_empty()) else {
            return Ok(None);
        };
        let draft = self.draft_at(kind, data.to_string(), point);
        self.add_signature(draft).map(Some)
    }

    fn draft_at(&self, kind: SignatureKind, data: String, point: PagePoint) -> SignatureDraft {
        let rect = NormalizedRect::centered_at(point.x, point.y, self.config.default_width, self.config.default_height)
            .clamp_to_page();
        SignatureDraft::new(kind, data, rect, point.page_number)
    }
}
